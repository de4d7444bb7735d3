//! Dex Core - Domain logic for markdown-file task tracking
//!
//! Each task is one markdown file whose last line carries a compact metadata
//! tag (the dexcode). Projects are directories of such files, and the ranking
//! engine orders tasks across any set of projects.

pub mod codec;
pub mod collection;
pub mod config;
pub mod date;
pub mod editor;
pub mod error;
pub mod model;
pub mod project;
pub mod project_set;
pub mod rank;
pub mod task;

pub use codec::DexCode;
pub use collection::TaskCollection;
pub use config::DexConfig;
pub use editor::{CommandEditor, Editor};
pub use error::{DexError, Result};
pub use model::{Effort, Flag, Importance, RecurrenceDays, Status, TaskId};
pub use project::Project;
pub use project_set::ProjectSet;
pub use rank::{RankOptions, TaskSort, rank, sort_tasks};
pub use task::{NewTask, StatusChange, Task};
