//! Compiled translations (`.qm`), write only.
//!
//! Layout: a 16 byte magic number followed by tagged sections, each a tag
//! byte and a big-endian `u32` length.
//!
//! * `Language` (0xa7): the target language code.
//! * `Hashes` (0x42): `(hash, offset)` pairs sorted by hash, pointing into
//!   the message block. The hash is the ELF hash of source text + comment,
//!   or of the id for id based files.
//! * `Messages` (0x69): per message a run of tagged fields closed by `End`.
//!   Translations are UTF-16BE, everything else UTF-8.

use std::path::Path;

use tracing::info;

use super::{CatalogFormat, ConversionOptions};
use crate::catalog::Catalog;
use crate::error::{LinguistError, Result};
use crate::message::{MessageType, TranslatorMessage};

pub const QM_MAGIC: [u8; 16] = [
    0x3c, 0xb8, 0x64, 0x18, 0xca, 0xef, 0x9c, 0x95, 0xcd, 0x21, 0x1c, 0xbf, 0x60, 0xa1, 0xbd, 0xdd,
];

const SECTION_HASHES: u8 = 0x42;
const SECTION_MESSAGES: u8 = 0x69;
const SECTION_LANGUAGE: u8 = 0xa7;

const TAG_END: u8 = 1;
const TAG_TRANSLATION: u8 = 3;
const TAG_SOURCE_TEXT: u8 = 6;
const TAG_CONTEXT: u8 = 7;
const TAG_COMMENT: u8 = 8;

/// How much of each message goes into compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Translations plus source text, comment and context
    #[default]
    Everything,
    /// Translations and context only; lookups rely on the hash
    Stripped,
}

/// What a release wrote and what it skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub finished: usize,
    pub unfinished: usize,
    /// Unfinished messages without any translation
    pub untranslated: usize,
    /// Unfinished messages left out because of `ignore_unfinished`
    pub ignored_unfinished: usize,
    /// Messages without id in an id based release
    pub missing_ids: usize,
}

impl ReleaseReport {
    pub fn generated(&self) -> usize {
        self.finished + self.unfinished
    }
}

/// ELF hash as used for QM lookups. Zero is reserved, so it maps to 1.
pub fn elf_hash(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &c in bytes {
        h = (h << 4).wrapping_add(u32::from(c));
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    if h == 0 { 1 } else { h }
}

fn write_tagged(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn utf16_be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

fn write_message(out: &mut Vec<u8>, msg: &TranslatorMessage, options: &ConversionOptions) {
    for translation in &msg.translations {
        write_tagged(out, TAG_TRANSLATION, &utf16_be(translation));
    }
    if options.id_based {
        if options.save_mode == SaveMode::Everything {
            write_tagged(out, TAG_SOURCE_TEXT, msg.id.as_bytes());
        }
    } else {
        if options.save_mode == SaveMode::Everything {
            write_tagged(out, TAG_SOURCE_TEXT, msg.source_text.as_bytes());
            write_tagged(out, TAG_COMMENT, msg.comment.as_bytes());
        }
        write_tagged(out, TAG_CONTEXT, msg.context.as_bytes());
    }
    out.push(TAG_END);
}

/// Compiles the releasable messages of a catalog.
pub fn release(catalog: &Catalog, options: &ConversionOptions) -> (Vec<u8>, ReleaseReport) {
    let mut report = ReleaseReport::default();
    let mut messages: Vec<u8> = Vec::new();
    let mut hashes: Vec<(u32, u32)> = Vec::new();

    for msg in catalog.messages() {
        if msg.message_type.is_obsolete() || msg.is_context_comment() {
            continue;
        }
        if options.id_based && msg.id.is_empty() {
            report.missing_ids += 1;
            continue;
        }
        if msg.message_type == MessageType::Unfinished {
            if !msg.is_translated() && !options.id_based {
                report.untranslated += 1;
                continue;
            }
            if options.ignore_unfinished {
                report.ignored_unfinished += 1;
                continue;
            }
            report.unfinished += 1;
        } else {
            report.finished += 1;
        }

        let hash = if options.id_based {
            elf_hash(msg.id.as_bytes())
        } else {
            let mut key = msg.source_text.clone().into_bytes();
            key.extend_from_slice(msg.comment.as_bytes());
            elf_hash(&key)
        };
        hashes.push((hash, messages.len() as u32));
        write_message(&mut messages, msg, options);
    }
    hashes.sort_unstable();

    let mut out = QM_MAGIC.to_vec();
    if !catalog.language_code.is_empty() {
        write_tagged(&mut out, SECTION_LANGUAGE, catalog.language_code.as_bytes());
    }
    if !hashes.is_empty() {
        let table: Vec<u8> = hashes
            .iter()
            .flat_map(|&(hash, offset)| {
                let mut pair = hash.to_be_bytes().to_vec();
                pair.extend_from_slice(&offset.to_be_bytes());
                pair
            })
            .collect();
        write_tagged(&mut out, SECTION_HASHES, &table);
    }
    if !messages.is_empty() {
        write_tagged(&mut out, SECTION_MESSAGES, &messages);
    }

    if options.verbose {
        info!(
            "Generated {} translation(s) ({} finished and {} unfinished)",
            report.generated(),
            report.finished,
            report.unfinished
        );
        if report.untranslated > 0 {
            info!("Ignored {} untranslated source text(s)", report.untranslated);
        }
        if report.missing_ids > 0 {
            info!("Dropped {} message(s) which had no ID.", report.missing_ids);
        }
    }
    (out, report)
}

pub struct QmFormat;

impl CatalogFormat for QmFormat {
    fn extension(&self) -> &'static str {
        "qm"
    }

    fn description(&self) -> &'static str {
        "Compiled Qt translations"
    }

    fn can_load(&self) -> bool {
        false
    }

    fn load(&self, _data: &[u8], path: &Path) -> Result<Catalog> {
        Err(LinguistError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    fn save(&self, catalog: &Catalog, options: &ConversionOptions, _path: &Path) -> Result<Vec<u8>> {
        Ok(release(catalog, options).0)
    }
}
