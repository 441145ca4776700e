//! Qt Linguist phrase books (`.qph`).
//!
//! ```xml
//! <!DOCTYPE QPH>
//! <QPH language="de" sourcelanguage="en">
//! <phrase>
//!     <source>Open</source>
//!     <target>Öffnen</target>
//!     <definition>menu entry</definition>
//! </phrase>
//! </QPH>
//! ```

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{CatalogFormat, ConversionOptions};
use crate::catalog::{Catalog, LocationsType};
use crate::error::{LinguistError, Result};
use crate::message::{BINARY_VARIANT_SEPARATOR, TEXT_VARIANT_SEPARATOR, TranslatorMessage};
use crate::text::protect;

pub struct QphFormat;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DataField {
    NoField,
    Source,
    Target,
    Definition,
}

fn read_language_attributes(start: &BytesStart<'_>, catalog: &mut Catalog, path: &Path) -> Result<()> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| LinguistError::parse(path, e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| LinguistError::parse(path, e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"language" => catalog.language_code = value,
            b"sourcelanguage" => catalog.source_language_code = value,
            _ => {}
        }
    }
    Ok(())
}

fn flush_phrase(
    catalog: &mut Catalog,
    source: &mut String,
    target: &mut String,
    definition: &mut String,
) {
    let target_text = target.replace(TEXT_VARIANT_SEPARATOR, &BINARY_VARIANT_SEPARATOR.to_string());
    catalog.append(TranslatorMessage::new("", source, definition).with_translation(&target_text));
    source.clear();
    target.clear();
    definition.clear();
}

/// Parses a phrase book. Every `<phrase>` becomes one message in the empty
/// context; the whole `<target>` is kept as a single translation.
pub fn read_qph(content: &str, path: &Path) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    catalog.locations_type = LocationsType::NoLocations;

    let mut reader = Reader::from_str(content);
    let mut field = DataField::NoField;
    let mut source = String::new();
    let mut target = String::new();
    let mut definition = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            LinguistError::parse(
                path,
                format!("{} (at byte {})", e, reader.buffer_position()),
            )
        })?;
        match event {
            Event::Start(e) => {
                field = match e.name().as_ref() {
                    b"source" => DataField::Source,
                    b"target" => DataField::Target,
                    b"definition" => DataField::Definition,
                    b"QPH" => {
                        read_language_attributes(&e, &mut catalog, path)?;
                        DataField::NoField
                    }
                    _ => DataField::NoField,
                };
            }
            Event::Empty(e) => {
                match e.name().as_ref() {
                    b"QPH" => read_language_attributes(&e, &mut catalog, path)?,
                    b"phrase" => flush_phrase(&mut catalog, &mut source, &mut target, &mut definition),
                    _ => {}
                }
                field = DataField::NoField;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| LinguistError::parse(path, e.to_string()))?;
                // whitespace between elements
                if text.trim().is_empty() {
                    continue;
                }
                match field {
                    DataField::Source => source.push_str(&text),
                    DataField::Target => target.push_str(&text),
                    DataField::Definition => definition.push_str(&text),
                    DataField::NoField => {}
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                match field {
                    DataField::Source => source.push_str(&text),
                    DataField::Target => target.push_str(&text),
                    DataField::Definition => definition.push_str(&text),
                    DataField::NoField => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"phrase" => flush_phrase(&mut catalog, &mut source, &mut target, &mut definition),
                b"source" | b"target" | b"definition" => field = DataField::NoField,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(catalog)
}

/// Serializes a catalog as a phrase book. Numerus translations are joined
/// with `@`; context comment pseudo-messages have no phrase book form.
pub fn write_qph(catalog: &Catalog) -> String {
    let mut out = String::from("<!DOCTYPE QPH>\n<QPH");
    if !catalog.language_code.is_empty() && catalog.language_code != "C" {
        out.push_str(&format!(" language=\"{}\"", protect(&catalog.language_code)));
    }
    if !catalog.source_language_code.is_empty() && catalog.source_language_code != "C" {
        out.push_str(&format!(
            " sourcelanguage=\"{}\"",
            protect(&catalog.source_language_code)
        ));
    }
    out.push_str(">\n");
    for msg in catalog.messages() {
        if msg.is_context_comment() {
            continue;
        }
        out.push_str("<phrase>\n");
        out.push_str(&format!("    <source>{}</source>\n", protect(&msg.source_text)));
        let target = msg
            .translations
            .join("@")
            .replace(BINARY_VARIANT_SEPARATOR, &TEXT_VARIANT_SEPARATOR.to_string());
        out.push_str(&format!("    <target>{}</target>\n", protect(&target)));
        if !msg.comment.is_empty() {
            out.push_str(&format!(
                "    <definition>{}</definition>\n",
                protect(&msg.comment)
            ));
        }
        out.push_str("</phrase>\n");
    }
    out.push_str("</QPH>\n");
    out
}

impl CatalogFormat for QphFormat {
    fn extension(&self) -> &'static str {
        "qph"
    }

    fn description(&self) -> &'static str {
        "Qt Linguist 'Phrase Book'"
    }

    fn load(&self, data: &[u8], path: &Path) -> Result<Catalog> {
        let content = std::str::from_utf8(data)
            .map_err(|e| LinguistError::parse(path, format!("invalid UTF-8: {}", e)))?;
        read_qph(content, path)
    }

    fn save(&self, catalog: &Catalog, _options: &ConversionOptions, _path: &Path) -> Result<Vec<u8>> {
        Ok(write_qph(catalog).into_bytes())
    }
}
