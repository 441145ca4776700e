//! In-memory translation catalog: the flat message list a file format reads or writes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::message::TranslatorMessage;

/// How source code references are stored in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationsType {
    #[default]
    NoLocations,
    RelativeLocations,
    AbsoluteLocations,
}

/// Messages dropped by [`Catalog::resolve_duplicates`], keyed by the index of
/// the surviving message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplicates {
    pub by_id: BTreeSet<usize>,
    pub by_contents: BTreeSet<usize>,
}

impl Duplicates {
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_contents.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    messages: Vec<TranslatorMessage>,
    pub language_code: String,
    pub source_language_code: String,
    pub locations_type: LocationsType,
    /// File scoped key/value metadata
    pub extras: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn append(&mut self, message: TranslatorMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[TranslatorMessage] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut Vec<TranslatorMessage> {
        &mut self.messages
    }

    pub fn message(&self, index: usize) -> Option<&TranslatorMessage> {
        self.messages.get(index)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes repeated messages. Messages with an id are compared by id,
    /// the others by (context, source text, comment). The later occurrence's
    /// content replaces the earlier one, which keeps its position.
    pub fn resolve_duplicates(&mut self) -> Duplicates {
        let mut dupes = Duplicates::default();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut by_contents: HashMap<(String, String, String), usize> = HashMap::new();
        let mut kept: Vec<TranslatorMessage> = Vec::with_capacity(self.messages.len());

        for msg in self.messages.drain(..) {
            if msg.is_context_comment() {
                kept.push(msg);
                continue;
            }
            if !msg.id.is_empty() {
                if let Some(&idx) = by_id.get(&msg.id) {
                    debug!("Duplicate message id '{}'", msg.id);
                    kept[idx] = msg;
                    dupes.by_id.insert(idx);
                    continue;
                }
                by_id.insert(msg.id.clone(), kept.len());
            } else {
                let (context, source, comment) = msg.content_key();
                let key = (context.to_string(), source.to_string(), comment.to_string());
                if let Some(&idx) = by_contents.get(&key) {
                    debug!("Duplicate message '{}' in context '{}'", key.1, key.0);
                    kept[idx] = msg;
                    dupes.by_contents.insert(idx);
                    continue;
                }
                by_contents.insert(key, kept.len());
            }
            kept.push(msg);
        }
        self.messages = kept;
        dupes
    }

    /// Translations of `msg` resized to the number of plural forms of the
    /// target language. Singular messages always get exactly one.
    pub fn normalized_translations(msg: &TranslatorMessage, num_plurals: usize) -> Vec<String> {
        let count = if msg.plural { num_plurals.max(1) } else { 1 };
        let mut translations: Vec<String> = msg.translations.iter().take(count).cloned().collect();
        translations.resize(count, String::new());
        translations
    }

    pub fn normalize_translations(&mut self, num_plurals: usize) {
        for msg in &mut self.messages {
            msg.translations = Catalog::normalized_translations(msg, num_plurals);
        }
    }
}
