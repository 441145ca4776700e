//! Translation catalog model for Qt Linguist files.
//!
//! * [`DataModel`] holds one loaded translation file, grouped by context,
//!   with the per-context status counters an editor needs.
//! * [`MultiDataModel`] merges several files side by side so the same
//!   message can be translated into many languages at once.
//! * [`MessageModel`] exposes the merged set as a two-level tree of rows
//!   and columns.
//!
//! TS and QPH files can be read and written; QM files can be released.
//!
//! ```ignore
//! use linguist_model::{DataModel, MultiDataModel};
//! use std::path::Path;
//!
//! let outcome = DataModel::load(Path::new("app_de.ts"))?;
//! let mut session = MultiDataModel::new();
//! session.append(outcome.model, true);
//! println!("{}/{} finished", session.finished_count(), session.editable_count());
//! ```

pub mod catalog;
pub mod data_model;
pub mod error;
pub mod file_names;
pub mod format;
pub mod message;
pub mod message_model;
pub mod multi_model;
pub mod numerus;
pub mod stats;
pub mod style;
pub mod text;

#[cfg(test)]
mod integration_tests;

pub use catalog::{Catalog, LocationsType};
pub use data_model::{
    ContextItem, DataIndex, DataModel, DuplicateExample, LoadOutcome, LoadWarning, MessageItem,
    StatusChange,
};
pub use error::{LinguistError, Result};
pub use file_names::{condense_file_names, prettify_file_name, prettify_file_names};
pub use format::{CatalogFormat, ConversionOptions, ReleaseReport, SaveMode};
pub use message::{Location, MessageType, TranslatorMessage};
pub use message_model::{CellData, MessageModel, Role, ViewIndex, ViewItem};
pub use multi_model::{
    ListenerId, ModelEvent, MultiContextItem, MultiDataIndex, MultiDataModel, MultiMessageItem,
};
pub use numerus::{NumerusForm, NumerusInfo};
pub use stats::StatisticalData;
pub use style::{ModelBrush, Rgb, TranslationMark};
pub use text::TextCounts;
