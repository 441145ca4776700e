//! Two-level tree view over a [`MultiDataModel`]: contexts at the top,
//! their merged messages below.
//!
//! Column 0 holds the label (context name or source text), columns
//! `1..=N` hold one status mark per open file and column `N + 1` the
//! context's "finished/editable" count.

use crate::data_model::{ContextItem, MessageItem};
use crate::multi_model::{ModelEvent, MultiDataIndex, MultiDataModel};
use crate::style::{ModelBrush, OBSOLETE_FOREGROUND, Rgb, TranslationMark, UNNAMED_FOREGROUND};
use crate::text::{simplified, sort_text};

/// Row of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewItem {
    Context { row: usize },
    Message { context: usize, row: usize },
}

/// Cell of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewIndex {
    pub item: ViewItem,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Display,
    ToolTip,
    Decoration,
    Sort,
    Foreground,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellData {
    Text(String),
    Number(i64),
    Mark(TranslationMark),
    Brush(ModelBrush),
    Color(Rgb),
}

// Message sort bits
const TRANSLATED: i64 = 1;
const NO_DANGER: i64 = 2;
const FINISHED: i64 = 4;
const OBSOLETE: i64 = 8;

// Context sort bits, above the completion percentage
const CONTEXT_NO_DANGER: i64 = 1 << 28;
const CONTEXT_FINISHED: i64 = 1 << 29;
const CONTEXT_OBSOLETE: i64 = 1 << 30;
const PERCENT_SCALE: i64 = (1 << 28) - 1;

pub struct MessageModel<'a> {
    data: &'a MultiDataModel,
}

impl<'a> MessageModel<'a> {
    pub fn new(data: &'a MultiDataModel) -> Self {
        MessageModel { data }
    }

    pub fn data_model(&self) -> &'a MultiDataModel {
        self.data
    }

    pub fn column_count(&self) -> usize {
        self.data.model_count() + 2
    }

    fn count_column(&self) -> usize {
        self.data.model_count() + 1
    }

    /// Children of `parent`; the root when `None`
    pub fn row_count(&self, parent: Option<ViewItem>) -> usize {
        match parent {
            None => self.data.context_count(),
            Some(ViewItem::Context { row }) => self
                .data
                .multi_context_item(row)
                .map_or(0, |mc| mc.message_count()),
            Some(ViewItem::Message { .. }) => 0,
        }
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<ViewItem>) -> Option<ViewIndex> {
        if row >= self.row_count(parent) || column >= self.column_count() {
            return None;
        }
        let item = match parent {
            None => ViewItem::Context { row },
            Some(ViewItem::Context { row: context }) => ViewItem::Message { context, row },
            Some(ViewItem::Message { .. }) => return None,
        };
        Some(ViewIndex { item, column })
    }

    pub fn parent(&self, index: ViewIndex) -> Option<ViewIndex> {
        match index.item {
            ViewItem::Context { .. } => None,
            ViewItem::Message { context, .. } => Some(ViewIndex {
                item: ViewItem::Context { row: context },
                column: 0,
            }),
        }
    }

    fn file_column(&self, column: usize) -> Option<usize> {
        (1..=self.data.model_count())
            .contains(&column)
            .then(|| column - 1)
    }

    pub fn data(&self, index: ViewIndex, role: Role) -> Option<CellData> {
        match index.item {
            ViewItem::Context { row } => self.context_data(row, index.column, role),
            ViewItem::Message { context, row } => {
                self.message_data(context, row, index.column, role)
            }
        }
    }

    fn background(&self, model: usize, odd_context_row: bool) -> Option<CellData> {
        // a single file gets no column tint
        if self.data.model_count() == 1 {
            return None;
        }
        let brush = self.data.brush_for_model(model);
        Some(CellData::Brush(if odd_context_row {
            brush.darker(108)
        } else {
            brush
        }))
    }

    fn context_data(&self, row: usize, column: usize, role: Role) -> Option<CellData> {
        let mc = self.data.multi_context_item(row)?;
        if column >= self.column_count() {
            return None;
        }
        let file = self.file_column(column);
        let context_of = |model: usize| {
            self.data
                .context_item(MultiDataIndex::new(model, row, 0))
        };

        match role {
            Role::Display if column == 0 => Some(CellData::Text(if mc.context().is_empty() {
                "<unnamed context>".to_string()
            } else {
                simplified(mc.context())
            })),
            Role::Display if column == self.count_column() => Some(CellData::Text(format!(
                "{}/{}",
                mc.finished_count(),
                mc.editable_count()
            ))),
            Role::ToolTip if column == self.count_column() => {
                let left = mc.editable_count() - mc.finished_count();
                Some(CellData::Text(format!(
                    "{} unfinished message{} left.",
                    left,
                    if left == 1 { "" } else { "s" }
                )))
            }
            Role::ToolTip => file.map(|model| self.completion_tooltip(model)),
            Role::Decoration => file.map(|model| {
                CellData::Mark(context_of(model).map_or(TranslationMark::Empty, context_mark))
            }),
            Role::Sort if column == 0 => Some(CellData::Text(simplified(mc.context()))),
            Role::Sort if column == self.count_column() => {
                Some(CellData::Number(mc.editable_count() as i64))
            }
            Role::Sort => file.map(|model| {
                CellData::Number(context_of(model).map_or(i64::from(i32::MAX), context_sort_value))
            }),
            Role::Foreground if column == 0 && mc.context().is_empty() => {
                Some(CellData::Color(UNNAMED_FOREGROUND))
            }
            Role::Foreground if mc.is_obsolete() => Some(CellData::Color(OBSOLETE_FOREGROUND)),
            Role::Background => file.and_then(|model| self.background(model, row % 2 == 1)),
            _ => None,
        }
    }

    fn message_data(&self, context: usize, row: usize, column: usize, role: Role) -> Option<CellData> {
        let mc = self.data.multi_context_item(context)?;
        let mm = mc.multi_message_item(row)?;
        if column >= self.column_count() {
            return None;
        }
        let file = self.file_column(column);
        let message_of =
            |model: usize| self.data.message_item(MultiDataIndex::new(model, context, row));

        match role {
            Role::Display if column == 0 => Some(CellData::Text(if !mm.text().is_empty() {
                simplified(mm.text())
            } else if !mm.id().is_empty() {
                simplified(mm.id())
            } else if mc.context().is_empty() {
                "<file header>".to_string()
            } else {
                "<context comment>".to_string()
            })),
            Role::ToolTip => file.map(|model| self.completion_tooltip(model)),
            Role::Decoration => file.map(|model| {
                CellData::Mark(match message_of(model) {
                    Some(m) => message_mark(m),
                    None => TranslationMark::Empty,
                })
            }),
            Role::Sort if column == 0 => Some(CellData::Text(sort_text(if mm.text().is_empty() {
                mm.id()
            } else {
                mm.text()
            }))),
            Role::Sort => file.map(|model| {
                CellData::Number(message_of(model).map_or(i64::from(i32::MAX), message_sort_value))
            }),
            Role::Foreground if column == 0 && mm.text().is_empty() && mm.id().is_empty() => {
                Some(CellData::Color(UNNAMED_FOREGROUND))
            }
            Role::Foreground if mm.is_obsolete() => Some(CellData::Color(OBSOLETE_FOREGROUND)),
            Role::Background => file.and_then(|model| self.background(model, context % 2 == 1)),
            _ => None,
        }
    }

    fn completion_tooltip(&self, model: usize) -> CellData {
        let language = self
            .data
            .model(model)
            .map_or_else(String::new, |m| m.localized_language().to_string());
        CellData::Text(format!("Completion status for {}", language))
    }

    /// Sort key of a context row for one file: state bits and completion,
    /// then message count, then name
    pub fn context_sort_key(&self, row: usize, model: usize) -> Option<(i64, usize, String)> {
        let mc = self.data.multi_context_item(row)?;
        let value = self
            .data
            .context_item(MultiDataIndex::new(model, row, 0))
            .map_or(i64::from(i32::MAX), context_sort_value);
        Some((value, mc.message_count(), simplified(mc.context())))
    }

    /// Domain coordinates of a view cell for file `model`
    pub fn data_index(&self, index: ViewIndex, model: usize) -> Option<MultiDataIndex> {
        if model >= self.data.model_count() {
            return None;
        }
        match index.item {
            ViewItem::Context { row } => {
                (row < self.data.context_count()).then(|| MultiDataIndex::new(model, row, 0))
            }
            ViewItem::Message { context, row } => {
                (row < self.row_count(Some(ViewItem::Context { row: context })))
                    .then(|| MultiDataIndex::new(model, context, row))
            }
        }
    }

    /// Label cell of a message
    pub fn model_index(&self, index: MultiDataIndex) -> Option<ViewIndex> {
        self.index(index.message, 0, Some(ViewItem::Context { row: index.context }))
    }

    /// Cells whose data a model event invalidates
    pub fn view_changes(&self, event: &ModelEvent) -> Vec<ViewIndex> {
        let column = |index: &MultiDataIndex| index.model + 1;
        match event {
            ModelEvent::MessageDataChanged(index) | ModelEvent::TranslationChanged(index) => vec![
                ViewIndex {
                    item: ViewItem::Message {
                        context: index.context,
                        row: index.message,
                    },
                    column: column(index),
                },
            ],
            ModelEvent::ContextDataChanged(index) => vec![ViewIndex {
                item: ViewItem::Context { row: index.context },
                column: column(index),
            }],
            ModelEvent::MultiContextDataChanged(index) => vec![ViewIndex {
                item: ViewItem::Context { row: index.context },
                column: self.count_column(),
            }],
            _ => Vec::new(),
        }
    }
}

fn message_mark(m: &MessageItem) -> TranslationMark {
    if m.is_obsolete() {
        TranslationMark::Obsolete
    } else if m.is_finished() {
        if m.danger() {
            TranslationMark::Warning
        } else {
            TranslationMark::On
        }
    } else if m.translation().is_empty() {
        TranslationMark::Empty
    } else if m.danger() {
        TranslationMark::Danger
    } else {
        TranslationMark::Off
    }
}

fn context_mark(c: &ContextItem) -> TranslationMark {
    if c.is_obsolete() {
        TranslationMark::Obsolete
    } else if c.is_finished() {
        if c.finished_danger_count() > 0 {
            TranslationMark::Warning
        } else {
            TranslationMark::On
        }
    } else if c.unfinished_danger_count() > 0 {
        TranslationMark::Danger
    } else {
        TranslationMark::Off
    }
}

fn message_sort_value(m: &MessageItem) -> i64 {
    let mut value = 0;
    if m.is_obsolete() {
        value |= OBSOLETE;
    }
    if m.is_finished() {
        value |= FINISHED;
    }
    if !m.danger() {
        value |= NO_DANGER;
    }
    if !m.translation().is_empty() {
        value |= TRANSLATED;
    }
    value
}

fn context_sort_value(c: &ContextItem) -> i64 {
    let total = c.nonobsolete_count() as i64;
    let percent = if total == 0 {
        100
    } else {
        c.finished_count() as i64 * 100 / total
    };
    let mut value = percent * (PERCENT_SCALE / 100) + total;
    if c.is_obsolete() {
        value |= CONTEXT_OBSOLETE;
    } else if c.is_finished() {
        value |= CONTEXT_FINISHED;
        if c.finished_danger_count() == 0 {
            value |= CONTEXT_NO_DANGER;
        }
    } else if c.unfinished_danger_count() == 0 {
        value |= CONTEXT_NO_DANGER;
    }
    value
}
