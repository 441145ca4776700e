//! Catalog-level message records as read from and written to translation files.

use std::collections::BTreeMap;

/// Source text marking a pseudo-message that carries a context comment
/// (or, for the empty context, the file header comment).
pub const CONTEXT_COMMENT: &str = "QT_LINGUIST_INTERNAL_CONTEXT_COMMENT";

/// Separates length variants inside a translation in memory
pub const BINARY_VARIANT_SEPARATOR: char = '\u{9c}';
/// Separates length variants inside a translation in text formats
pub const TEXT_VARIANT_SEPARATOR: char = '\u{2762}';

/// Lifecycle status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageType {
    #[default]
    Unfinished,
    Finished,
    /// Gone from the sources, detected by the extractor
    Vanished,
    /// Gone from the sources, confirmed
    Obsolete,
}

impl MessageType {
    pub fn is_obsolete(self) -> bool {
        matches!(self, MessageType::Vanished | MessageType::Obsolete)
    }

    /// Value of the TS `type` attribute, `None` for finished messages
    pub fn ts_attribute(self) -> Option<&'static str> {
        match self {
            MessageType::Unfinished => Some("unfinished"),
            MessageType::Finished => None,
            MessageType::Vanished => Some("vanished"),
            MessageType::Obsolete => Some("obsolete"),
        }
    }

    pub fn from_ts_attribute(value: Option<&str>) -> Self {
        match value {
            Some("unfinished") => MessageType::Unfinished,
            Some("vanished") => MessageType::Vanished,
            Some("obsolete") => MessageType::Obsolete,
            _ => MessageType::Finished,
        }
    }
}

/// A source code reference of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file_name: String,
    pub line: i32,
}

/// One translatable string with its translations, as the file formats see it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatorMessage {
    pub context: String,
    pub source_text: String,
    /// Plural source text (PO `msgid_plural`), empty when absent
    pub plural_source_text: String,
    pub old_source_text: String,
    /// Disambiguation comment, part of the message identity
    pub comment: String,
    pub old_comment: String,
    pub extra_comment: String,
    pub translator_comment: String,
    pub id: String,
    pub translations: Vec<String>,
    pub message_type: MessageType,
    pub plural: bool,
    pub locations: Vec<Location>,
    pub extras: BTreeMap<String, String>,
}

impl TranslatorMessage {
    pub fn new(context: &str, source_text: &str, comment: &str) -> Self {
        TranslatorMessage {
            context: context.to_string(),
            source_text: source_text.to_string(),
            comment: comment.to_string(),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: &str) -> Self {
        self.set_translation(translation);
        self
    }

    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// First translation, or the empty string
    pub fn translation(&self) -> &str {
        self.translations.first().map(String::as_str).unwrap_or("")
    }

    /// Replaces all translations with a single one
    pub fn set_translation(&mut self, translation: &str) {
        self.translations = vec![translation.to_string()];
    }

    pub fn is_translated(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }

    pub fn is_context_comment(&self) -> bool {
        self.source_text == CONTEXT_COMMENT
    }

    /// Key used for content based identity: (context, source text, comment)
    pub fn content_key(&self) -> (&str, &str, &str) {
        (&self.context, &self.source_text, &self.comment)
    }
}
