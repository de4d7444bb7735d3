//! User configuration, loaded with confy from the platform config directory

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{self, DEFAULT_DUE_HORIZON_DAYS};
use crate::editor::CommandEditor;
use crate::error::Result;
use crate::model::{Effort, Importance};
use crate::task::NewTask;

pub const APP_NAME: &str = "dex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    /// Directory whose subdirectories are projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Editor command; falls back to `$EDITOR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    /// Days from today used as the due date when none is given.
    pub due_horizon_days: u64,
    /// Subdirectory names under the root that are not projects.
    pub ignored_dirs: Vec<String>,
    /// Move tasks whose id names another project into the project they live in.
    pub coerce_id_mismatches: bool,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            root: None,
            editor: None,
            due_horizon_days: DEFAULT_DUE_HORIZON_DAYS,
            ignored_dirs: Vec::new(),
            coerce_id_mismatches: false,
        }
    }
}

impl DexConfig {
    /// Load from the default location, writing defaults on first use.
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(confy::load_path(path)?)
    }

    pub fn store(&self) -> Result<()> {
        Ok(confy::store(APP_NAME, None, self)?)
    }

    pub fn store_path(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(confy::store_path(path, self)?)
    }

    pub fn editor(&self) -> CommandEditor {
        CommandEditor::resolve(self.editor.as_deref())
    }

    pub fn default_due(&self, today: NaiveDate) -> NaiveDate {
        date::default_due(today, self.due_horizon_days)
    }

    /// A [`NewTask`] whose due date follows the configured horizon.
    pub fn new_task(
        &self,
        name: impl Into<String>,
        effort: Effort,
        importance: Importance,
        today: NaiveDate,
    ) -> NewTask {
        NewTask::new(name, effort, importance).with_due(self.default_due(today))
    }

    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == dir_name)
    }
}
