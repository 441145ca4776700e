//! One translation file in memory: contexts, messages, status counters and
//! language metadata.
//!
//! A [`DataModel`] is built from a [`Catalog`] and written back through the
//! format registry. Status changes go through the model so the per-context
//! counters always match the messages they summarize.
//!
//! # Example
//!
//! ```ignore
//! use linguist_model::DataModel;
//!
//! let outcome = DataModel::load(Path::new("app_de.ts"))?;
//! for warning in &outcome.warnings {
//!     eprintln!("{}", warning);
//! }
//! let stats = outcome.model.statistics();
//! println!("{}% done", stats.percent_finished());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use icu_locale::LanguageIdentifier;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Duplicates, LocationsType};
use crate::error::{LinguistError, Result};
use crate::file_names::prettify_file_name;
use crate::format::{self, ConversionOptions, ReleaseReport, SaveMode, qm};
use crate::message::{CONTEXT_COMMENT, Location, MessageType, TranslatorMessage};
use crate::numerus::{
    self, NumerusInfo, language_code, language_from_file_name, language_label,
    parse_language_code, system_language,
};
use crate::stats::StatisticalData;
use crate::text::{TextCounts, adjust_ncr_visibility, resolve_ncr};

/// Number of duplicates spelled out in a load warning
pub const MAX_DUPLICATE_EXAMPLES: usize = 5;

/// A message as the editor sees it
#[derive(Debug, Clone, PartialEq)]
pub struct MessageItem {
    message: TranslatorMessage,
    danger: bool,
    ncr_mode: bool,
}

impl MessageItem {
    pub fn new(mut message: TranslatorMessage) -> Self {
        if message.translations.is_empty() {
            message.translations.push(String::new());
        }
        MessageItem {
            message,
            danger: false,
            ncr_mode: false,
        }
    }

    pub fn message(&self) -> &TranslatorMessage {
        &self.message
    }

    pub fn context(&self) -> &str {
        &self.message.context
    }

    /// Source text, with references shown or resolved per the NCR mode
    pub fn text(&self) -> String {
        adjust_ncr_visibility(&self.message.source_text, self.ncr_mode)
    }

    pub fn plural_text(&self) -> String {
        adjust_ncr_visibility(&self.message.plural_source_text, self.ncr_mode)
    }

    pub fn comment(&self) -> &str {
        &self.message.comment
    }

    pub fn id(&self) -> &str {
        &self.message.id
    }

    pub fn extra_comment(&self) -> &str {
        &self.message.extra_comment
    }

    pub fn translator_comment(&self) -> &str {
        &self.message.translator_comment
    }

    pub fn set_translator_comment(&mut self, comment: &str) {
        self.message.translator_comment = comment.to_string();
    }

    pub fn old_source_text(&self) -> &str {
        &self.message.old_source_text
    }

    pub fn old_comment(&self) -> &str {
        &self.message.old_comment
    }

    pub fn locations(&self) -> &[Location] {
        &self.message.locations
    }

    pub fn translation(&self) -> String {
        adjust_ncr_visibility(self.message.translation(), self.ncr_mode)
    }

    pub fn translations(&self) -> Vec<String> {
        self.message
            .translations
            .iter()
            .map(|t| adjust_ncr_visibility(t, self.ncr_mode))
            .collect()
    }

    /// Stores a translation; numeric character references are resolved.
    pub fn set_translation(&mut self, translation: &str) {
        self.message.set_translation(&resolve_ncr(translation));
    }

    pub fn set_translations(&mut self, translations: &[String]) {
        self.message.translations = translations.iter().map(|t| resolve_ncr(t).into_owned()).collect();
        if self.message.translations.is_empty() {
            self.message.translations.push(String::new());
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message.message_type
    }

    pub(crate) fn set_type(&mut self, message_type: MessageType) {
        self.message.message_type = message_type;
    }

    pub fn is_finished(&self) -> bool {
        self.message.message_type == MessageType::Finished
    }

    pub fn is_unfinished(&self) -> bool {
        self.message.message_type == MessageType::Unfinished
    }

    pub fn is_obsolete(&self) -> bool {
        self.message.message_type.is_obsolete()
    }

    pub fn is_plural(&self) -> bool {
        self.message.plural
    }

    pub fn danger(&self) -> bool {
        self.danger
    }

    pub(crate) fn set_danger(&mut self, danger: bool) {
        self.danger = danger;
    }

    pub fn ncr_mode(&self) -> bool {
        self.ncr_mode
    }

    pub fn set_ncr_mode(&mut self, ncr_mode: bool) {
        self.ncr_mode = ncr_mode;
    }

    /// Matches the source text against a search string.
    pub fn compare(&self, find_text: &str, match_substring: bool, case_sensitive: bool) -> bool {
        let text = self.text();
        let (text, find_text) = if case_sensitive {
            (text, find_text.to_string())
        } else {
            (text.to_lowercase(), find_text.to_lowercase())
        };
        if match_substring {
            text.contains(&find_text)
        } else {
            text == find_text
        }
    }
}

/// Which cells a status change affects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The message already had the requested status
    Unchanged,
    /// Only the message itself changed
    Message,
    /// The message changed and so did its context's displayed status
    Context,
}

/// Messages sharing one context, with aggregate counters
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    context: String,
    comment: String,
    messages: Vec<MessageItem>,
    finished_count: usize,
    finished_danger_count: usize,
    unfinished_danger_count: usize,
    nonobsolete_count: usize,
}

impl ContextItem {
    pub fn new(context: &str) -> Self {
        ContextItem {
            context: context.to_string(),
            comment: String::new(),
            messages: Vec::new(),
            finished_count: 0,
            finished_danger_count: 0,
            unfinished_danger_count: 0,
            nonobsolete_count: 0,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Adds a paragraph to the context comment.
    pub fn append_to_comment(&mut self, text: &str) {
        if !self.comment.is_empty() {
            self.comment.push_str("\n\n");
        }
        self.comment.push_str(text);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[MessageItem] {
        &self.messages
    }

    pub fn message_item(&self, row: usize) -> Option<&MessageItem> {
        self.messages.get(row)
    }

    pub(crate) fn message_item_mut(&mut self, row: usize) -> Option<&mut MessageItem> {
        self.messages.get_mut(row)
    }

    pub fn find_message_index(&self, source_text: &str, comment: &str) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.text() == source_text && m.comment() == comment)
    }

    pub fn find_message(&self, source_text: &str, comment: &str) -> Option<&MessageItem> {
        self.find_message_index(source_text, comment)
            .map(|row| &self.messages[row])
    }

    pub fn finished_count(&self) -> usize {
        self.finished_count
    }

    pub fn finished_danger_count(&self) -> usize {
        self.finished_danger_count
    }

    pub fn unfinished_danger_count(&self) -> usize {
        self.unfinished_danger_count
    }

    pub fn nonobsolete_count(&self) -> usize {
        self.nonobsolete_count
    }

    pub fn unfinished_count(&self) -> usize {
        self.nonobsolete_count - self.finished_count
    }

    /// Every message is obsolete
    pub fn is_obsolete(&self) -> bool {
        self.nonobsolete_count == 0
    }

    pub fn is_finished(&self) -> bool {
        self.finished_count == self.nonobsolete_count
    }

    fn push(&mut self, item: MessageItem) {
        if item.is_finished() {
            self.finished_count += 1;
        }
        if !item.is_obsolete() {
            self.nonobsolete_count += 1;
        }
        self.messages.push(item);
    }

    fn set_message_finished(&mut self, row: usize, finished: bool) -> Option<StatusChange> {
        let item = self.messages.get_mut(row)?;
        let danger = item.danger();
        let context_changed = match (item.message_type(), finished) {
            (MessageType::Unfinished, true) => {
                item.set_type(MessageType::Finished);
                self.finished_count += 1;
                if danger {
                    self.finished_danger_count += 1;
                    self.unfinished_danger_count -= 1;
                    self.unfinished_danger_count == 0 || self.finished_count == self.nonobsolete_count
                } else {
                    self.finished_count == self.nonobsolete_count
                }
            }
            (MessageType::Finished, false) => {
                item.set_type(MessageType::Unfinished);
                self.finished_count -= 1;
                if danger {
                    self.finished_danger_count -= 1;
                    self.unfinished_danger_count += 1;
                    self.unfinished_danger_count == 1
                        || self.finished_count + 1 == self.nonobsolete_count
                } else {
                    self.finished_count + 1 == self.nonobsolete_count
                }
            }
            _ => return Some(StatusChange::Unchanged),
        };
        Some(if context_changed {
            StatusChange::Context
        } else {
            StatusChange::Message
        })
    }

    fn set_message_danger(&mut self, row: usize, danger: bool) -> Option<StatusChange> {
        let item = self.messages.get_mut(row)?;
        if item.danger() == danger {
            return Some(StatusChange::Unchanged);
        }
        let finished = item.is_finished();
        item.set_danger(danger);
        let counter = if finished {
            &mut self.finished_danger_count
        } else {
            &mut self.unfinished_danger_count
        };
        let context_changed = if danger {
            *counter += 1;
            *counter == 1
        } else {
            *counter -= 1;
            *counter == 0
        };
        Some(if context_changed {
            StatusChange::Context
        } else {
            StatusChange::Message
        })
    }
}

/// Position of a message inside a [`DataModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataIndex {
    pub context: usize,
    pub message: usize,
}

impl DataIndex {
    pub fn new(context: usize, message: usize) -> Self {
        DataIndex { context, message }
    }
}

/// One duplicate named in a [`LoadWarning::Duplicates`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateExample {
    Id(String),
    Contents {
        context: String,
        source: String,
        comment: String,
    },
}

/// Non-fatal problems found while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    Duplicates {
        file: PathBuf,
        examples: Vec<DuplicateExample>,
        /// More duplicates exist than are listed
        omitted: bool,
    },
    UnknownPluralRules {
        language: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::Duplicates {
                file,
                examples,
                omitted,
            } => {
                write!(f, "Duplicate messages found in '{}':", file.display())?;
                for example in examples {
                    match example {
                        DuplicateExample::Id(id) => write!(f, "\n* ID: {}", id)?,
                        DuplicateExample::Contents {
                            context,
                            source,
                            comment,
                        } => {
                            write!(f, "\n* Context: {}\n* Source: {}", context, source)?;
                            if !comment.is_empty() {
                                write!(f, "\n* Comment: {}", comment)?;
                            }
                        }
                    }
                }
                if *omitted {
                    write!(f, "\n[more duplicates omitted]")?;
                }
                Ok(())
            }
            LoadWarning::UnknownPluralRules { language } => write!(
                f,
                "Linguist does not know the plural rules for '{}'.\nWill assume a single universal form.",
                language
            ),
        }
    }
}

fn duplicates_warning(path: &Path, catalog: &Catalog, dupes: &Duplicates) -> LoadWarning {
    let mut examples = Vec::new();
    let mut omitted = false;
    let indices = dupes
        .by_id
        .iter()
        .map(|&i| (true, i))
        .chain(dupes.by_contents.iter().map(|&i| (false, i)));
    for (by_id, index) in indices {
        if examples.len() == MAX_DUPLICATE_EXAMPLES {
            omitted = true;
            break;
        }
        let Some(msg) = catalog.message(index) else {
            continue;
        };
        examples.push(if by_id {
            DuplicateExample::Id(msg.id.clone())
        } else {
            DuplicateExample::Contents {
                context: msg.context.clone(),
                source: msg.source_text.clone(),
                comment: msg.comment.clone(),
            }
        });
    }
    LoadWarning::Duplicates {
        file: path.to_path_buf(),
        examples,
        omitted,
    }
}

/// A freshly loaded file
#[derive(Debug)]
pub struct LoadOutcome {
    pub model: DataModel,
    /// The target language did not come from the file itself
    pub language_guessed: bool,
    pub warnings: Vec<LoadWarning>,
}

/// One translation file
#[derive(Debug, Clone)]
pub struct DataModel {
    contexts: Vec<ContextItem>,
    src_file_name: PathBuf,
    language: Option<LanguageIdentifier>,
    source_language: Option<LanguageIdentifier>,
    numerus: NumerusInfo,
    localized_language: String,
    writable: bool,
    modified: bool,
    relative_locations: bool,
    extras: BTreeMap<String, String>,
    message_count: usize,
    source_counts: TextCounts,
}

impl Default for DataModel {
    fn default() -> Self {
        DataModel {
            contexts: Vec::new(),
            src_file_name: PathBuf::new(),
            language: None,
            source_language: None,
            numerus: numerus::numerus_info(None),
            localized_language: language_label(None),
            writable: true,
            modified: false,
            relative_locations: false,
            extras: BTreeMap::new(),
            message_count: 0,
            source_counts: TextCounts::default(),
        }
    }
}

impl DataModel {
    pub fn new() -> Self {
        DataModel::default()
    }

    /// Loads a translation file in any registered format.
    pub fn load(path: &Path) -> Result<LoadOutcome> {
        let catalog = format::load_catalog(path)?;
        DataModel::from_catalog(catalog, path)
    }

    /// Builds a model from an already parsed catalog. `path` names the
    /// file in messages and serves the file name language guess.
    pub fn from_catalog(mut catalog: Catalog, path: &Path) -> Result<LoadOutcome> {
        if catalog.is_empty() {
            return Err(LinguistError::EmptyCatalog {
                path: path.to_path_buf(),
            });
        }

        let mut warnings = Vec::new();
        let dupes = catalog.resolve_duplicates();
        if !dupes.is_empty() {
            let warning = duplicates_warning(path, &catalog, &dupes);
            warn!("{}", warning);
            warnings.push(warning);
        }

        let mut model = DataModel::new();
        model.src_file_name = path.to_path_buf();
        model.relative_locations = catalog.locations_type == LocationsType::RelativeLocations;
        model.extras = std::mem::take(&mut catalog.extras);

        let mut positions: HashMap<String, usize> = HashMap::new();
        for msg in std::mem::take(catalog.messages_mut()) {
            let index = match positions.get(&msg.context) {
                Some(&index) => index,
                None => {
                    model.contexts.push(ContextItem::new(&msg.context));
                    positions.insert(msg.context.clone(), model.contexts.len() - 1);
                    model.contexts.len() - 1
                }
            };
            let context = &mut model.contexts[index];
            if msg.is_context_comment() {
                context.append_to_comment(&msg.comment);
                continue;
            }
            let item = MessageItem::new(msg);
            if !item.is_obsolete() {
                model.source_counts.add(&item.text());
                model.source_counts.add(&item.plural_text());
            }
            context.push(item);
            model.message_count += 1;
        }

        // language: file attribute, then file name, then system locale
        let mut language_guessed = false;
        let mut code = catalog.language_code.clone();
        if code.is_empty() {
            code = language_from_file_name(path).unwrap_or_default();
            language_guessed = true;
        }
        let mut language = parse_language_code(&code);
        if language.is_none() {
            language = system_language();
            language_guessed = true;
        }
        if !model.apply_language(language) {
            let warning = LoadWarning::UnknownPluralRules {
                language: model.localized_language.clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        model.source_language = parse_language_code(&catalog.source_language_code);
        model.modified = false;

        info!(
            "Loaded '{}': {} messages in {} contexts, language {}{}",
            path.display(),
            model.message_count,
            model.contexts.len(),
            model.localized_language,
            if language_guessed { " (guessed)" } else { "" }
        );
        Ok(LoadOutcome {
            model,
            language_guessed,
            warnings,
        })
    }

    fn to_catalog(&self) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.language_code = self.language_code();
        catalog.source_language_code = self.source_language_code();
        catalog.locations_type = if self.relative_locations {
            LocationsType::RelativeLocations
        } else {
            LocationsType::AbsoluteLocations
        };
        catalog.extras = self.extras.clone();
        for context in &self.contexts {
            if !context.comment.is_empty() {
                let mut msg = TranslatorMessage::new(&context.context, CONTEXT_COMMENT, "");
                msg.comment = context.comment.clone();
                catalog.append(msg);
            }
            for item in &context.messages {
                catalog.append(item.message.clone());
            }
        }
        catalog.normalize_translations(self.numerus.len());
        catalog
    }

    /// Writes the file. The modified flag is cleared only on success.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let catalog = self.to_catalog();
        format::save_catalog(&catalog, path, &ConversionOptions::default())?;
        self.modified = false;
        info!("Saved {} messages to '{}'", self.message_count, path.display());
        Ok(())
    }

    /// Saves under a new name, which the model then carries.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.save(path)?;
        self.src_file_name = path.to_path_buf();
        Ok(())
    }

    /// Writes compiled translations. Lookups go by id when every message
    /// has one.
    pub fn release(
        &self,
        path: &Path,
        verbose: bool,
        ignore_unfinished: bool,
        mode: SaveMode,
    ) -> Result<ReleaseReport> {
        let mut catalog = Catalog::new();
        catalog.language_code = self.language_code();
        for (_, item) in self.messages() {
            catalog.append(item.message.clone());
        }
        let options = ConversionOptions {
            verbose,
            ignore_unfinished,
            save_mode: mode,
            id_based: catalog.messages().iter().all(|m| !m.id.is_empty()),
        };
        let (data, report) = qm::release(&catalog, &options);
        fs::write(path, &data).map_err(|e| LinguistError::io(path, e))?;
        debug!("Released {} bytes to '{}'", data.len(), path.display());
        Ok(report)
    }

    fn apply_language(&mut self, language: Option<LanguageIdentifier>) -> bool {
        self.numerus = numerus::numerus_info(language.as_ref());
        self.localized_language = language_label(language.as_ref());
        self.language = language;
        self.numerus.known
    }

    /// Changes the target language. Returns whether its plural rules are
    /// known; if not, a single universal form is used.
    pub fn set_language_and_territory(&mut self, language: Option<LanguageIdentifier>) -> bool {
        if self.language == language {
            return self.numerus.known;
        }
        let known = self.apply_language(language);
        self.modified = true;
        known
    }

    pub fn set_source_language_and_territory(&mut self, language: Option<LanguageIdentifier>) {
        if self.source_language == language {
            return;
        }
        self.source_language = language;
        self.modified = true;
    }

    pub fn language(&self) -> Option<&LanguageIdentifier> {
        self.language.as_ref()
    }

    pub fn source_language(&self) -> Option<&LanguageIdentifier> {
        self.source_language.as_ref()
    }

    /// Language as written into files: `de`, `pt_BR`, empty for none
    pub fn language_code(&self) -> String {
        self.language.as_ref().map(language_code).unwrap_or_default()
    }

    pub fn source_language_code(&self) -> String {
        self.source_language.as_ref().map(language_code).unwrap_or_default()
    }

    pub fn localized_language(&self) -> &str {
        &self.localized_language
    }

    pub fn numerus_info(&self) -> &NumerusInfo {
        &self.numerus
    }

    pub fn numerus_forms(&self) -> Vec<&'static str> {
        self.numerus.names()
    }

    /// Per plural form, whether its translation should mention the count
    pub fn count_ref_needs(&self) -> Vec<bool> {
        self.numerus
            .forms
            .iter()
            .map(|f| f.needs_count_reference)
            .collect()
    }

    pub fn src_file_name(&self) -> &Path {
        &self.src_file_name
    }

    pub fn display_file_name(&self, pretty: bool) -> String {
        let name = self.src_file_name.to_string_lossy();
        if pretty {
            prettify_file_name(&name)
        } else {
            name.into_owned()
        }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn relative_locations(&self) -> bool {
        self.relative_locations
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn contexts(&self) -> &[ContextItem] {
        &self.contexts
    }

    pub fn context_item(&self, context: usize) -> Option<&ContextItem> {
        self.contexts.get(context)
    }

    /// Number of messages, context comments excluded
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn message_item(&self, index: DataIndex) -> Option<&MessageItem> {
        self.contexts.get(index.context)?.message_item(index.message)
    }

    fn message_item_mut(&mut self, index: DataIndex) -> Result<&mut MessageItem> {
        self.contexts
            .get_mut(index.context)
            .and_then(|c| c.message_item_mut(index.message))
            .ok_or_else(|| LinguistError::InvalidIndex(format!("{:?}", index)))
    }

    /// All messages in file order
    pub fn messages(&self) -> impl Iterator<Item = (DataIndex, &MessageItem)> + '_ {
        self.contexts.iter().enumerate().flat_map(|(c, context)| {
            context
                .messages
                .iter()
                .enumerate()
                .map(move |(m, item)| (DataIndex::new(c, m), item))
        })
    }

    pub fn find_context_index(&self, context: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.context == context)
    }

    pub fn find_context(&self, context: &str) -> Option<&ContextItem> {
        self.contexts.iter().find(|c| c.context == context)
    }

    pub fn find_message(&self, context: &str, source_text: &str, comment: &str) -> Option<&MessageItem> {
        self.find_context(context)?.find_message(source_text, comment)
    }

    /// Marks a message finished or unfinished. Obsolete messages keep
    /// their status.
    pub fn set_finished(&mut self, index: DataIndex, finished: bool) -> Result<StatusChange> {
        let change = self
            .contexts
            .get_mut(index.context)
            .and_then(|c| c.set_message_finished(index.message, finished))
            .ok_or_else(|| LinguistError::InvalidIndex(format!("{:?}", index)))?;
        if change != StatusChange::Unchanged {
            self.modified = true;
        }
        Ok(change)
    }

    /// Sets the failed-check flag. This is transient and does not modify
    /// the file.
    pub fn set_danger(&mut self, index: DataIndex, danger: bool) -> Result<StatusChange> {
        self.contexts
            .get_mut(index.context)
            .and_then(|c| c.set_message_danger(index.message, danger))
            .ok_or_else(|| LinguistError::InvalidIndex(format!("{:?}", index)))
    }

    /// Returns whether the translation changed.
    pub fn set_translation(&mut self, index: DataIndex, translation: &str) -> Result<bool> {
        let item = self.message_item_mut(index)?;
        if item.translation() == translation {
            return Ok(false);
        }
        item.set_translation(translation);
        self.modified = true;
        Ok(true)
    }

    pub fn set_translations(&mut self, index: DataIndex, translations: &[String]) -> Result<bool> {
        let item = self.message_item_mut(index)?;
        if item.translations() == translations {
            return Ok(false);
        }
        item.set_translations(translations);
        self.modified = true;
        Ok(true)
    }

    pub fn set_ncr_mode(&mut self, index: DataIndex, ncr_mode: bool) -> Result<()> {
        self.message_item_mut(index)?.set_ncr_mode(ncr_mode);
        Ok(())
    }

    /// Translations of a message resized to this language's plural forms
    pub fn normalized_translations(&self, item: &MessageItem) -> Vec<String> {
        Catalog::normalized_translations(&item.message, self.numerus.len())
            .iter()
            .map(|t| adjust_ncr_visibility(t, item.ncr_mode))
            .collect()
    }

    /// Word counts of all non-obsolete source texts, computed at load
    pub fn source_counts(&self) -> TextCounts {
        self.source_counts
    }

    pub fn statistics(&self) -> StatisticalData {
        let mut stats = StatisticalData {
            source: self.source_counts,
            ..Default::default()
        };
        for (_, item) in self.messages() {
            if item.is_obsolete() {
                stats.obsolete_msg += 1;
                continue;
            }
            let counts = if item.is_finished() {
                &mut stats.finished
            } else {
                &mut stats.unfinished
            };
            for translation in item.translations() {
                counts.add(&translation);
            }
            match (item.is_finished(), item.danger()) {
                (true, true) => stats.translated_msg_danger += 1,
                (true, false) => stats.translated_msg_no_danger += 1,
                (false, true) => stats.unfinished_msg_danger += 1,
                (false, false) => stats.unfinished_msg_no_danger += 1,
            }
        }
        stats
    }

    /// Whether the two files look like the same project in different
    /// languages. Files without messages always qualify.
    pub fn is_well_mergeable(&self, other: &DataModel) -> bool {
        if other.message_count() == 0 || self.message_count() == 0 {
            return true;
        }
        merge_score(self, other) + merge_score(other, self) > 90
    }
}

/// Percentage of `two`'s messages also found in `one`
fn merge_score(one: &DataModel, two: &DataModel) -> usize {
    let in_both: usize = two
        .contexts
        .iter()
        .filter_map(|theirs| one.find_context(&theirs.context).map(|ours| (ours, theirs)))
        .map(|(ours, theirs)| {
            theirs
                .messages
                .iter()
                .filter(|m| ours.find_message(&m.text(), m.comment()).is_some())
                .count()
        })
        .sum();
    in_both * 100 / two.message_count()
}
