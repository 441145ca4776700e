//! Several translation files edited side by side.
//!
//! Files are merged by context name, and within a context by message id or
//! else by (source text, comment). Each merged context keeps one column of
//! message handles per file; `None` marks a message the file lacks.
//!
//! Counters are maintained incrementally on [`MultiDataModel::append`] and
//! [`MultiDataModel::close`]:
//!
//! * per merged message: files that contain it, that contain it non-obsolete,
//!   that contain it editable, and editable ones where it is unfinished;
//! * per merged context and globally: editable messages and finished ones
//!   (editable everywhere it occurs and unfinished nowhere).
//!
//! Listeners registered with [`MultiDataModel::subscribe`] are called
//! synchronously for every change, before the mutating call returns.

use std::fmt;
use std::path::Path;

use icu_locale::LanguageIdentifier;
use tracing::{debug, info};

use crate::data_model::{ContextItem, DataIndex, DataModel, MessageItem, StatusChange};
use crate::error::{LinguistError, Result};
use crate::file_names::condense_file_names;
use crate::stats::StatisticalData;
use crate::style::ModelBrush;

/// Position of a message cell: file slot, merged context row, merged
/// message row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultiDataIndex {
    pub model: usize,
    pub context: usize,
    pub message: usize,
}

impl MultiDataIndex {
    pub fn new(model: usize, context: usize, message: usize) -> Self {
        MultiDataIndex {
            model,
            context,
            message,
        }
    }
}

/// Change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A file column was added at this slot
    ModelAppended { model: usize },
    ModelDeleted { model: usize },
    ModelMoved { from: usize, to: usize },
    AllModelsDeleted,
    ContextsInserted { first: usize, last: usize },
    ContextRemoved { context: usize },
    MessagesInserted { context: usize, first: usize, last: usize },
    MessageRemoved { context: usize, message: usize },
    ModifiedChanged(bool),
    LanguageChanged { model: usize },
    StatsChanged(StatisticalData),
    TranslationChanged(MultiDataIndex),
    /// The merged context's finished/editable totals changed
    MultiContextDataChanged(MultiDataIndex),
    /// The status of one file's context changed
    ContextDataChanged(MultiDataIndex),
    MessageDataChanged(MultiDataIndex),
}

/// Merge identity of a message shared across files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMessageItem {
    id: String,
    text: String,
    plural_text: String,
    comment: String,
    nonnull_count: usize,
    nonobsolete_count: usize,
    editable_count: usize,
    unfinished_count: usize,
}

impl MultiMessageItem {
    fn new(item: &MessageItem) -> Self {
        MultiMessageItem {
            id: item.id().to_string(),
            text: item.text(),
            plural_text: item.plural_text(),
            comment: item.comment().to_string(),
            nonnull_count: 0,
            nonobsolete_count: 0,
            editable_count: 0,
            unfinished_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn plural_text(&self) -> &str {
        &self.plural_text
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn nonnull_count(&self) -> usize {
        self.nonnull_count
    }

    pub fn nonobsolete_count(&self) -> usize {
        self.nonobsolete_count
    }

    pub fn editable_count(&self) -> usize {
        self.editable_count
    }

    pub fn unfinished_count(&self) -> usize {
        self.unfinished_count
    }

    /// No open file has this message any more
    pub fn is_empty(&self) -> bool {
        self.nonnull_count == 0
    }

    pub fn is_obsolete(&self) -> bool {
        self.nonobsolete_count == 0
    }

    pub fn is_unfinished(&self) -> bool {
        self.unfinished_count != 0
    }
}

/// One context merged across all open files
#[derive(Debug, Clone, PartialEq)]
pub struct MultiContextItem {
    context: String,
    comment: String,
    // [model][row] -> message row in that file's context
    message_lists: Vec<Vec<Option<usize>>>,
    // [model] -> context row in that file
    context_list: Vec<Option<usize>>,
    multi_messages: Vec<MultiMessageItem>,
    finished_count: usize,
    editable_count: usize,
    nonobsolete_count: usize,
}

impl MultiContextItem {
    fn new(model_count: usize, context_row: usize, context: &ContextItem) -> Self {
        let rows = context.message_count();
        let mut message_lists = vec![vec![None; rows]; model_count];
        message_lists.push((0..rows).map(Some).collect());
        let mut context_list = vec![None; model_count];
        context_list.push(Some(context_row));
        MultiContextItem {
            context: context.context().to_string(),
            comment: context.comment().to_string(),
            message_lists,
            context_list,
            multi_messages: context.messages().iter().map(MultiMessageItem::new).collect(),
            finished_count: 0,
            editable_count: 0,
            nonobsolete_count: 0,
        }
    }

    fn append_empty_model(&mut self) {
        self.message_lists.push(vec![None; self.multi_messages.len()]);
        self.context_list.push(None);
    }

    fn assign_last_model(&mut self, context_row: usize) {
        if let Some(last) = self.context_list.last_mut() {
            *last = Some(context_row);
        }
    }

    fn put_message_item(&mut self, row: usize, handle: usize) {
        if let Some(last) = self.message_lists.last_mut() {
            last[row] = Some(handle);
        }
    }

    fn append_message_items(&mut self, items: Vec<(usize, MultiMessageItem)>) {
        let last = self.message_lists.len() - 1;
        for (model, list) in self.message_lists.iter_mut().enumerate() {
            if model == last {
                list.extend(items.iter().map(|(handle, _)| Some(*handle)));
            } else {
                list.extend(std::iter::repeat_n(None, items.len()));
            }
        }
        self.multi_messages
            .extend(items.into_iter().map(|(_, item)| item));
    }

    fn remove_model(&mut self, model: usize) {
        self.message_lists.remove(model);
        self.context_list.remove(model);
    }

    fn move_model(&mut self, from: usize, to: usize) {
        let list = self.message_lists.remove(from);
        self.message_lists.insert(to, list);
        let context = self.context_list.remove(from);
        self.context_list.insert(to, context);
    }

    fn remove_multi_message_item(&mut self, row: usize) {
        for list in &mut self.message_lists {
            list.remove(row);
        }
        self.multi_messages.remove(row);
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn message_count(&self) -> usize {
        self.multi_messages.len()
    }

    pub fn multi_message_item(&self, row: usize) -> Option<&MultiMessageItem> {
        self.multi_messages.get(row)
    }

    /// Row of the message inside file `model`'s context, if the file has it
    pub fn message_handle(&self, model: usize, row: usize) -> Option<usize> {
        self.message_lists.get(model)?.get(row).copied().flatten()
    }

    /// Row of this context inside file `model`, if the file has it
    pub fn context_handle(&self, model: usize) -> Option<usize> {
        self.context_list.get(model).copied().flatten()
    }

    pub fn finished_count(&self) -> usize {
        self.finished_count
    }

    pub fn editable_count(&self) -> usize {
        self.editable_count
    }

    pub fn nonobsolete_count(&self) -> usize {
        self.nonobsolete_count
    }

    pub fn is_obsolete(&self) -> bool {
        self.nonobsolete_count == 0
    }

    pub fn find_message(&self, source_text: &str, comment: &str) -> Option<usize> {
        self.multi_messages
            .iter()
            .position(|m| m.text == source_text && m.comment == comment)
    }

    pub fn find_message_by_id(&self, id: &str) -> Option<usize> {
        self.multi_messages.iter().position(|m| m.id == id)
    }
}

/// Identifies a listener for [`MultiDataModel::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

type Listener = Box<dyn FnMut(&ModelEvent)>;

/// The set of open translation files
#[derive(Default)]
pub struct MultiDataModel {
    models: Vec<DataModel>,
    multi_contexts: Vec<MultiContextItem>,
    finished_count: usize,
    editable_count: usize,
    message_count: usize,
    modified: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: usize,
}

impl fmt::Debug for MultiDataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiDataModel")
            .field("models", &self.models.len())
            .field("contexts", &self.multi_contexts.len())
            .field("finished_count", &self.finished_count)
            .field("editable_count", &self.editable_count)
            .field("message_count", &self.message_count)
            .field("modified", &self.modified)
            .finish()
    }
}

impl MultiDataModel {
    pub fn new() -> Self {
        MultiDataModel::default()
    }

    /// Registers a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&ModelEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }

    fn emit(&mut self, event: ModelEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_all(&mut self, events: Vec<ModelEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn model(&self, model: usize) -> Option<&DataModel> {
        self.models.get(model)
    }

    pub fn models(&self) -> &[DataModel] {
        &self.models
    }

    pub fn is_model_writable(&self, model: usize) -> bool {
        self.models.get(model).is_some_and(DataModel::is_writable)
    }

    pub fn context_count(&self) -> usize {
        self.multi_contexts.len()
    }

    pub fn multi_context_item(&self, context: usize) -> Option<&MultiContextItem> {
        self.multi_contexts.get(context)
    }

    /// Merged messages
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn finished_count(&self) -> usize {
        self.finished_count
    }

    pub fn editable_count(&self) -> usize {
        self.editable_count
    }

    /// Whether `model` looks like a translation of the files already open.
    /// At least 45% of messages must match on average, in both directions.
    pub fn is_well_mergeable(&self, model: &DataModel) -> bool {
        if model.message_count() == 0 || self.message_count() == 0 {
            return true;
        }

        let in_both_new: usize = model
            .contexts()
            .iter()
            .filter_map(|c| self.find_context(c.context()).map(|mc| (c, mc)))
            .map(|(c, mc)| {
                c.messages()
                    .iter()
                    .filter(|m| mc.find_message(&m.text(), m.comment()).is_some())
                    .count()
            })
            .sum();
        let new_ratio = in_both_new * 100 / model.message_count();

        let in_both_old: usize = self
            .multi_contexts
            .iter()
            .filter_map(|mc| model.find_context(mc.context()).map(|c| (c, mc)))
            .map(|(c, mc)| {
                mc.multi_messages
                    .iter()
                    .filter(|m| c.find_message(&m.text, &m.comment).is_some())
                    .count()
            })
            .sum();
        let old_ratio = in_both_old * 100 / self.message_count();

        debug!(
            "Merge check for '{}': {}% new, {}% old",
            model.src_file_name().display(),
            new_ratio,
            old_ratio
        );
        new_ratio + old_ratio > 90
    }

    /// Opens a file as a new column. Read-only files take part in merging
    /// but reject edits.
    pub fn append(&mut self, mut model: DataModel, writable: bool) {
        let slot = self.models.len();
        model.set_writable(writable);
        self.models.push(model);
        for mc in &mut self.multi_contexts {
            mc.append_empty_model();
        }

        let mut events = vec![ModelEvent::ModelAppended { model: slot }];
        let first_new_context = self.multi_contexts.len();
        let dm = &self.models[slot];
        for (context_row, context) in dm.contexts().iter().enumerate() {
            let existing = self
                .multi_contexts
                .iter()
                .position(|mc| mc.context == context.context());
            let Some(mcx) = existing else {
                self.multi_contexts
                    .push(MultiContextItem::new(slot, context_row, context));
                self.message_count += context.message_count();
                continue;
            };

            let mc = &mut self.multi_contexts[mcx];
            mc.assign_last_model(context_row);
            let mut append_items = Vec::new();
            for (handle, item) in context.messages().iter().enumerate() {
                let mut row = None;
                if !item.id().is_empty() {
                    row = mc.find_message_by_id(item.id());
                }
                if row.is_none() {
                    row = mc.find_message(&item.text(), item.comment());
                }
                match row {
                    Some(row) => mc.put_message_item(row, handle),
                    None => append_items.push((handle, MultiMessageItem::new(item))),
                }
            }
            if !append_items.is_empty() {
                let first = mc.message_count();
                let count = append_items.len();
                mc.append_message_items(append_items);
                self.message_count += count;
                events.push(ModelEvent::MessagesInserted {
                    context: mcx,
                    first,
                    last: first + count - 1,
                });
            }
        }
        if self.multi_contexts.len() > first_new_context {
            events.push(ModelEvent::ContextsInserted {
                first: first_new_context,
                last: self.multi_contexts.len() - 1,
            });
        }

        self.update_counts_on_add(slot, writable);
        info!(
            "Opened '{}' as file #{}{}: {} merged messages in {} contexts",
            self.models[slot].src_file_name().display(),
            slot,
            if writable { "" } else { " (read-only)" },
            self.message_count,
            self.multi_contexts.len()
        );
        self.emit_all(events);
        self.on_modified_changed();
    }

    fn update_counts_on_add(&mut self, model: usize, writable: bool) {
        let MultiDataModel {
            models,
            multi_contexts,
            finished_count,
            editable_count,
            ..
        } = self;
        let dm = &models[model];
        for mc in multi_contexts.iter_mut() {
            let Some(context) = mc.context_handle(model).and_then(|c| dm.context_item(c)) else {
                continue;
            };
            for row in 0..mc.multi_messages.len() {
                let Some(m) = mc.message_handle(model, row).and_then(|h| context.message_item(h)) else {
                    continue;
                };
                let mm = &mut mc.multi_messages[row];
                mm.nonnull_count += 1;
                if m.is_obsolete() {
                    continue;
                }
                if writable {
                    if mm.editable_count == 0 {
                        mc.editable_count += 1;
                        *editable_count += 1;
                        if m.is_finished() {
                            mc.finished_count += 1;
                            *finished_count += 1;
                        } else {
                            mm.unfinished_count += 1;
                        }
                    } else if !m.is_finished() {
                        if !mm.is_unfinished() {
                            mc.finished_count -= 1;
                            *finished_count -= 1;
                        }
                        mm.unfinished_count += 1;
                    }
                    mm.editable_count += 1;
                }
                mc.nonobsolete_count += 1;
                mm.nonobsolete_count += 1;
            }
        }
    }

    fn update_counts_on_remove(&mut self, model: usize, writable: bool) {
        let MultiDataModel {
            models,
            multi_contexts,
            finished_count,
            editable_count,
            ..
        } = self;
        let dm = &models[model];
        for mc in multi_contexts.iter_mut() {
            let Some(context) = mc.context_handle(model).and_then(|c| dm.context_item(c)) else {
                continue;
            };
            for row in 0..mc.multi_messages.len() {
                let Some(m) = mc.message_handle(model, row).and_then(|h| context.message_item(h)) else {
                    continue;
                };
                let mm = &mut mc.multi_messages[row];
                mm.nonnull_count -= 1;
                if m.is_obsolete() {
                    continue;
                }
                mm.nonobsolete_count -= 1;
                mc.nonobsolete_count -= 1;
                if !writable {
                    continue;
                }
                mm.editable_count -= 1;
                if mm.editable_count == 0 {
                    mc.editable_count -= 1;
                    *editable_count -= 1;
                    if m.is_finished() {
                        mc.finished_count -= 1;
                        *finished_count -= 1;
                    } else {
                        mm.unfinished_count -= 1;
                    }
                } else if !m.is_finished() {
                    mm.unfinished_count -= 1;
                    if !mm.is_unfinished() {
                        mc.finished_count += 1;
                        *finished_count += 1;
                    }
                }
            }
        }
    }

    fn check_model(&self, model: usize) -> Result<()> {
        if model < self.models.len() {
            Ok(())
        } else {
            Err(LinguistError::InvalidIndex(format!("file #{}", model)))
        }
    }

    /// Closes one file and hands it back. Merged messages and contexts
    /// that no remaining file has are dropped.
    pub fn close(&mut self, model: usize) -> Result<DataModel> {
        self.check_model(model)?;
        if self.models.len() == 1 {
            let dm = self.models.remove(0);
            self.reset();
            return Ok(dm);
        }

        let writable = self.models[model].is_writable();
        self.update_counts_on_remove(model, writable);
        for mc in &mut self.multi_contexts {
            mc.remove_model(model);
        }
        let dm = self.models.remove(model);
        let mut events = vec![ModelEvent::ModelDeleted { model }];

        for context in (0..self.multi_contexts.len()).rev() {
            let mc = &mut self.multi_contexts[context];
            for message in (0..mc.multi_messages.len()).rev() {
                if mc.multi_messages[message].is_empty() {
                    mc.remove_multi_message_item(message);
                    self.message_count -= 1;
                    events.push(ModelEvent::MessageRemoved { context, message });
                }
            }
            if mc.multi_messages.is_empty() {
                self.multi_contexts.remove(context);
                events.push(ModelEvent::ContextRemoved { context });
            }
        }

        info!("Closed '{}'", dm.src_file_name().display());
        self.emit_all(events);
        self.on_modified_changed();
        Ok(dm)
    }

    fn reset(&mut self) {
        self.finished_count = 0;
        self.editable_count = 0;
        self.message_count = 0;
        self.models.clear();
        self.multi_contexts.clear();
        self.emit(ModelEvent::AllModelsDeleted);
        self.on_modified_changed();
    }

    pub fn close_all(&mut self) -> Vec<DataModel> {
        let models = std::mem::take(&mut self.models);
        self.reset();
        models
    }

    /// Moves a file column so it ends up before the column currently at
    /// `to` (or last, for `to == model_count()`).
    pub fn move_model(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_model(from)?;
        if to > self.models.len() {
            return Err(LinguistError::InvalidIndex(format!("file #{}", to)));
        }
        let target = if from < to { to - 1 } else { to };
        let dm = self.models.remove(from);
        self.models.insert(target, dm);
        for mc in &mut self.multi_contexts {
            mc.move_model(from, target);
        }
        self.emit(ModelEvent::ModelMoved { from, to: target });
        Ok(())
    }

    pub fn is_modified(&self) -> bool {
        self.models.iter().any(DataModel::is_modified)
    }

    fn on_modified_changed(&mut self) {
        let modified = self.is_modified();
        if modified != self.modified {
            self.modified = modified;
            self.emit(ModelEvent::ModifiedChanged(modified));
        }
    }

    pub fn set_modified(&mut self, model: usize, modified: bool) -> Result<()> {
        self.check_model(model)?;
        self.models[model].set_modified(modified);
        self.on_modified_changed();
        Ok(())
    }

    /// Slot of the file with this name
    pub fn is_file_loaded(&self, name: &Path) -> Option<usize> {
        self.models.iter().position(|m| m.src_file_name() == name)
    }

    pub fn find_context_index(&self, context: &str) -> Option<usize> {
        self.multi_contexts.iter().position(|mc| mc.context == context)
    }

    pub fn find_context(&self, context: &str) -> Option<&MultiContextItem> {
        self.multi_contexts.iter().find(|mc| mc.context == context)
    }

    fn data_index(&self, index: MultiDataIndex) -> Option<DataIndex> {
        let mc = self.multi_contexts.get(index.context)?;
        Some(DataIndex::new(
            mc.context_handle(index.model)?,
            mc.message_handle(index.model, index.message)?,
        ))
    }

    fn editable_data_index(&self, index: MultiDataIndex) -> Result<DataIndex> {
        self.check_model(index.model)?;
        if !self.models[index.model].is_writable() {
            return Err(LinguistError::ReadOnlyModel(index.model));
        }
        self.data_index(index)
            .ok_or_else(|| LinguistError::InvalidIndex(format!("{:?}", index)))
    }

    pub fn message_item(&self, index: MultiDataIndex) -> Option<&MessageItem> {
        let data_index = self.data_index(index)?;
        self.models.get(index.model)?.message_item(data_index)
    }

    pub fn context_item(&self, index: MultiDataIndex) -> Option<&ContextItem> {
        let mc = self.multi_contexts.get(index.context)?;
        self.models
            .get(index.model)?
            .context_item(mc.context_handle(index.model)?)
    }

    /// First file holding the merged message as non-obsolete
    pub fn first_nonobsolete_model(&self, context: usize, message: usize) -> Option<usize> {
        (0..self.models.len()).find(|&model| {
            self.message_item(MultiDataIndex::new(model, context, message))
                .is_some_and(|m| !m.is_obsolete())
        })
    }

    pub fn set_translation(&mut self, index: MultiDataIndex, translation: &str) -> Result<()> {
        let data_index = self.editable_data_index(index)?;
        if self.models[index.model].set_translation(data_index, translation)? {
            self.emit(ModelEvent::TranslationChanged(index));
            self.on_modified_changed();
        }
        Ok(())
    }

    pub fn set_translations(&mut self, index: MultiDataIndex, translations: &[String]) -> Result<()> {
        let data_index = self.editable_data_index(index)?;
        if self.models[index.model].set_translations(data_index, translations)? {
            self.emit(ModelEvent::TranslationChanged(index));
            self.on_modified_changed();
        }
        Ok(())
    }

    /// Changes a message's finished state. Notifies the message cell, plus
    /// the context cell and merged context totals when those change.
    pub fn set_finished(&mut self, index: MultiDataIndex, finished: bool) -> Result<()> {
        let data_index = self.editable_data_index(index)?;
        let change = self.models[index.model].set_finished(data_index, finished)?;
        if change == StatusChange::Unchanged {
            return Ok(());
        }

        let mut events = Vec::with_capacity(3);
        let mc = &mut self.multi_contexts[index.context];
        let mm = &mut mc.multi_messages[index.message];
        if finished {
            mm.unfinished_count -= 1;
            if mm.unfinished_count == 0 {
                self.finished_count += 1;
                mc.finished_count += 1;
                events.push(ModelEvent::MultiContextDataChanged(index));
            }
        } else {
            mm.unfinished_count += 1;
            if mm.unfinished_count == 1 {
                self.finished_count -= 1;
                mc.finished_count -= 1;
                events.push(ModelEvent::MultiContextDataChanged(index));
            }
        }
        if change == StatusChange::Context {
            events.push(ModelEvent::ContextDataChanged(index));
        }
        events.push(ModelEvent::MessageDataChanged(index));
        self.emit_all(events);
        self.on_modified_changed();
        Ok(())
    }

    /// Sets the failed-check flag of a message.
    pub fn set_danger(&mut self, index: MultiDataIndex, danger: bool) -> Result<()> {
        let data_index = self.editable_data_index(index)?;
        let change = self.models[index.model].set_danger(data_index, danger)?;
        if change == StatusChange::Context {
            self.emit(ModelEvent::ContextDataChanged(index));
        }
        if change != StatusChange::Unchanged {
            self.emit(ModelEvent::MessageDataChanged(index));
        }
        Ok(())
    }

    /// Changes a file's target language. Returns whether its plural rules
    /// are known.
    pub fn set_language_and_territory(
        &mut self,
        model: usize,
        language: Option<LanguageIdentifier>,
    ) -> Result<bool> {
        self.check_model(model)?;
        let dm = &mut self.models[model];
        let before = dm.language().cloned();
        let known = dm.set_language_and_territory(language);
        if self.models[model].language() != before.as_ref() {
            self.emit(ModelEvent::LanguageChanged { model });
            self.on_modified_changed();
        }
        Ok(known)
    }

    pub fn save(&mut self, model: usize) -> Result<()> {
        self.check_model(model)?;
        let path = self.models[model].src_file_name().to_path_buf();
        let result = self.models[model].save(&path);
        self.on_modified_changed();
        result
    }

    pub fn save_as(&mut self, model: usize, path: &Path) -> Result<()> {
        self.check_model(model)?;
        let result = self.models[model].save_as(path);
        self.on_modified_changed();
        result
    }

    /// Recomputes one file's statistics and notifies listeners.
    pub fn update_statistics(&mut self, model: usize) -> Result<StatisticalData> {
        self.check_model(model)?;
        let stats = self.models[model].statistics();
        self.emit(ModelEvent::StatsChanged(stats));
        Ok(stats)
    }

    /// Statistics summed over all open files
    pub fn statistics(&self) -> StatisticalData {
        self.models.iter().map(DataModel::statistics).sum()
    }

    /// Every merged message row with file `model`'s message, if any
    pub fn iter(&self, model: usize) -> impl Iterator<Item = (MultiDataIndex, Option<&MessageItem>)> + '_ {
        self.multi_contexts
            .iter()
            .enumerate()
            .flat_map(move |(context, mc)| {
                (0..mc.message_count()).map(move |message| {
                    let index = MultiDataIndex::new(model, context, message);
                    (index, self.message_item(index))
                })
            })
    }

    /// File names, read-only ones prefixed with `=`
    pub fn src_file_names(&self, pretty: bool) -> Vec<String> {
        self.models
            .iter()
            .map(|m| {
                let marker = if m.is_writable() { "" } else { "=" };
                format!("{}{}", marker, m.display_file_name(pretty))
            })
            .collect()
    }

    pub fn condensed_src_file_names(&self, pretty: bool) -> String {
        condense_file_names(&self.src_file_names(pretty))
    }

    pub fn brush_for_model(&self, model: usize) -> ModelBrush {
        ModelBrush::for_model(model, self.is_model_writable(model))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::message::{MessageType, TranslatorMessage};

    fn data_model(file: &str, entries: &[(&str, &str, &str, MessageType)]) -> DataModel {
        let mut catalog = Catalog::new();
        catalog.language_code = "de".to_string();
        for &(context, id, source, message_type) in entries {
            catalog.append(
                TranslatorMessage::new(context, source, "")
                    .with_id(id)
                    .with_translation("t")
                    .with_type(message_type),
            );
        }
        DataModel::from_catalog(catalog, Path::new(file)).unwrap().model
    }

    fn recorder(multi: &mut MultiDataModel) -> Rc<RefCell<Vec<ModelEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        multi.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    use MessageType::{Finished, Obsolete, Unfinished};

    #[test]
    fn test_append_merges_by_id_before_text() {
        let mut multi = MultiDataModel::new();
        multi.append(
            data_model("a_de.ts", &[("C", "greet", "Hello", Finished), ("C", "", "Bye", Finished)]),
            true,
        );
        // renamed source text, same id: must land in the same row
        multi.append(
            data_model("a_fr.ts", &[("C", "greet", "Hello!", Unfinished), ("C", "", "Bye", Finished)]),
            true,
        );
        assert_eq!(multi.context_count(), 1);
        assert_eq!(multi.message_count(), 2);
        let mc = multi.multi_context_item(0).unwrap();
        assert_eq!(mc.message_handle(1, 0), Some(0));
        assert_eq!(mc.multi_message_item(0).unwrap().text(), "Hello");
        assert_eq!(mc.multi_message_item(0).unwrap().unfinished_count(), 1);
        assert_eq!(mc.finished_count(), 1);
        assert_eq!(mc.editable_count(), 2);
        assert_eq!(multi.finished_count(), 1);
    }

    #[test]
    fn test_unmatched_messages_get_empty_cells_in_other_columns() {
        let mut multi = MultiDataModel::new();
        multi.append(data_model("a_de.ts", &[("C", "", "One", Finished)]), true);
        let events = recorder(&mut multi);
        multi.append(
            data_model("a_fr.ts", &[("C", "", "Two", Finished), ("D", "", "Three", Finished)]),
            false,
        );
        let mc = multi.multi_context_item(0).unwrap();
        assert_eq!(mc.message_count(), 2);
        assert_eq!(mc.message_handle(0, 1), None);
        assert_eq!(mc.message_handle(1, 0), None);
        assert_eq!(mc.message_handle(1, 1), Some(0));
        let d = multi.multi_context_item(1).unwrap();
        assert_eq!(d.context_handle(0), None);
        assert_eq!(d.context_handle(1), Some(1));

        let events = events.borrow();
        assert_eq!(events[0], ModelEvent::ModelAppended { model: 1 });
        assert!(events.contains(&ModelEvent::MessagesInserted { context: 0, first: 1, last: 1 }));
        assert!(events.contains(&ModelEvent::ContextsInserted { first: 1, last: 1 }));
    }

    #[test]
    fn test_read_only_files_reject_edits() {
        let mut multi = MultiDataModel::new();
        multi.append(data_model("a_de.ts", &[("C", "", "One", Unfinished)]), false);
        let index = MultiDataIndex::new(0, 0, 0);
        assert!(matches!(
            multi.set_finished(index, true),
            Err(LinguistError::ReadOnlyModel(0))
        ));
        assert!(matches!(
            multi.set_translation(index, "x"),
            Err(LinguistError::ReadOnlyModel(0))
        ));
        // read-only files count nothing as editable
        assert_eq!(multi.editable_count(), 0);
        assert!(multi.brush_for_model(0).textured);
        assert_eq!(multi.src_file_names(false), vec!["=a_de.ts".to_string()]);
    }

    #[test]
    fn test_set_finished_notifies_affected_cells_only() {
        let mut multi = MultiDataModel::new();
        multi.append(
            data_model("a_de.ts", &[("C", "", "One", Unfinished), ("C", "", "Two", Unfinished)]),
            true,
        );
        let events = recorder(&mut multi);
        let index = MultiDataIndex::new(0, 0, 0);
        multi.set_finished(index, true).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::MultiContextDataChanged(index),
                ModelEvent::MessageDataChanged(index),
                ModelEvent::ModifiedChanged(true),
            ]
        );
        events.borrow_mut().clear();

        // finishing the last one also completes the context
        let second = MultiDataIndex::new(0, 0, 1);
        multi.set_finished(second, true).unwrap();
        assert!(events.borrow().contains(&ModelEvent::ContextDataChanged(second)));
        assert_eq!(multi.finished_count(), 2);

        events.borrow_mut().clear();
        multi.set_finished(second, true).unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_set_danger() {
        let mut multi = MultiDataModel::new();
        multi.append(
            data_model("a_de.ts", &[("C", "", "One", Finished), ("C", "", "Two", Finished)]),
            true,
        );
        let events = recorder(&mut multi);
        let one = MultiDataIndex::new(0, 0, 0);
        let two = MultiDataIndex::new(0, 0, 1);
        multi.set_danger(one, true).unwrap();
        multi.set_danger(two, true).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::ContextDataChanged(one),
                ModelEvent::MessageDataChanged(one),
                ModelEvent::MessageDataChanged(two),
            ]
        );
        assert_eq!(multi.context_item(one).unwrap().finished_danger_count(), 2);
        assert!(!multi.is_modified());
    }

    #[test]
    fn test_close_drops_orphaned_rows() {
        let mut multi = MultiDataModel::new();
        multi.append(data_model("a_de.ts", &[("C", "", "One", Finished)]), true);
        multi.append(
            data_model("a_fr.ts", &[("C", "", "One", Finished), ("D", "", "Two", Unfinished)]),
            true,
        );
        assert_eq!(multi.message_count(), 2);
        let events = recorder(&mut multi);

        let closed = multi.close(1).unwrap();
        assert_eq!(closed.src_file_name(), Path::new("a_fr.ts"));
        assert_eq!(multi.model_count(), 1);
        assert_eq!(multi.context_count(), 1);
        assert_eq!(multi.message_count(), 1);
        assert_eq!(multi.editable_count(), 1);
        assert_eq!(multi.finished_count(), 1);
        assert!(events.borrow().contains(&ModelEvent::ContextRemoved { context: 1 }));

        multi.close(0).unwrap();
        assert_eq!(multi.model_count(), 0);
        assert_eq!(multi.message_count(), 0);
        assert!(events.borrow().contains(&ModelEvent::AllModelsDeleted));
        assert!(matches!(multi.close(0), Err(LinguistError::InvalidIndex(_))));
    }

    #[test]
    fn test_obsolete_messages_are_not_editable() {
        let mut multi = MultiDataModel::new();
        multi.append(
            data_model("a_de.ts", &[("C", "", "Old", Obsolete), ("C", "", "New", Unfinished)]),
            true,
        );
        let mc = multi.multi_context_item(0).unwrap();
        assert_eq!(mc.nonobsolete_count(), 1);
        assert_eq!(mc.editable_count(), 1);
        assert!(mc.multi_message_item(0).unwrap().is_obsolete());
        assert_eq!(multi.first_nonobsolete_model(0, 0), None);
        assert_eq!(multi.first_nonobsolete_model(0, 1), Some(0));
    }

    #[test]
    fn test_move_model() {
        let mut multi = MultiDataModel::new();
        multi.append(data_model("a_de.ts", &[("C", "", "One", Finished)]), true);
        multi.append(data_model("a_fr.ts", &[("C", "", "Two", Finished)]), true);
        multi.append(data_model("a_it.ts", &[("C", "", "One", Finished)]), true);

        multi.move_model(0, 3).unwrap();
        let names: Vec<String> = multi.src_file_names(false);
        assert_eq!(names, vec!["a_fr.ts", "a_it.ts", "a_de.ts"]);
        let mc = multi.multi_context_item(0).unwrap();
        // row 0 is "One", now held by columns 1 and 2
        assert_eq!(mc.message_handle(0, 0), None);
        assert_eq!(mc.message_handle(2, 0), Some(0));
        assert_eq!(multi.condensed_src_file_names(false), "a_{fr,it,de}.ts");
        assert!(multi.move_model(0, 4).is_err());
    }

    #[test]
    fn test_language_change_and_lookup() {
        let mut multi = MultiDataModel::new();
        multi.append(data_model("a_de.ts", &[("C", "", "One", Finished)]), true);
        let events = recorder(&mut multi);
        let known = multi
            .set_language_and_territory(0, crate::numerus::parse_language_code("fr"))
            .unwrap();
        assert!(known);
        assert!(events.borrow().contains(&ModelEvent::LanguageChanged { model: 0 }));
        assert!(multi.is_modified());

        assert_eq!(multi.is_file_loaded(Path::new("a_de.ts")), Some(0));
        assert_eq!(multi.is_file_loaded(Path::new("b.ts")), None);
        assert_eq!(multi.find_context_index("C"), Some(0));
        let rows: Vec<_> = multi.iter(0).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.map(|m| m.text()), Some("One".to_string()));
    }
}
