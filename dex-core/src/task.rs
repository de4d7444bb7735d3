//! Task entity and its file lifecycle
//!
//! A [`Task`] is always backed by one markdown file. Every mutating method
//! writes the file before returning, so the in-memory value and the file never
//! disagree once a call has completed.
//!
//! Active tasks (hold, todo, in-progress) live directly in a project's task
//! directory; inactive ones (done, abandoned) live in its `inactive/`
//! subdirectory. Moving between the two renames the file first and rewrites
//! the metadata second.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::codec::{self, DexCode};
use crate::date::{self, DEFAULT_DUE_HORIZON_DAYS};
use crate::editor::Editor;
use crate::error::{DexError, Result};
use crate::model::{Effort, Flag, Importance, Status, TaskId, validate_name};

/// Extension of task files, without the dot.
pub const TASK_EXTENSION: &str = "md";

/// Subdirectory of a task directory holding done and abandoned tasks.
pub const INACTIVE_SUBDIR: &str = "inactive";

/// Attributes for a task that has not been written yet
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub effort: Effort,
    pub importance: Importance,
    pub status: Status,
    pub due: NaiveDate,
    pub flags: BTreeSet<Flag>,
    pub content: String,
}

impl NewTask {
    /// A todo task due [`DEFAULT_DUE_HORIZON_DAYS`] from today, not recurring.
    pub fn new(name: impl Into<String>, effort: Effort, importance: Importance) -> Self {
        Self {
            name: name.into(),
            effort,
            importance,
            status: Status::Todo,
            due: date::default_due(date::today(), DEFAULT_DUE_HORIZON_DAYS),
            flags: BTreeSet::from([Flag::NonRecurring]),
            content: String::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due = due;
        self
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags = flags.into_iter().collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Outcome of [`Task::set_status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Status was already the requested one; nothing was touched.
    Unchanged,
    /// Metadata rewritten, file left where it was.
    InPlace,
    /// File moved across the active/inactive boundary, then rewritten.
    Relocated { from: PathBuf, to: PathBuf },
}

/// A single task backed by a markdown file
#[derive(Debug, Clone)]
pub struct Task {
    path: PathBuf,
    name: String,
    content: String,
    code: DexCode,
}

impl Task {
    /// Load a task from an existing file.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = check_task_path(&path)?;
        let text = fs::read_to_string(&path)?;
        let (content, code) = codec::parse_file_content(&text)?;
        Ok(Self {
            path,
            name,
            content,
            code,
        })
    }

    /// Write a file for a brand new task in `dir` and return it.
    ///
    /// Inactive statuses are rejected before anything touches the disk. When an
    /// editor is given it is opened on the new file and the edited content is
    /// picked up afterwards.
    pub fn create(
        id: TaskId,
        new: NewTask,
        dir: &Path,
        editor: Option<&dyn Editor>,
    ) -> Result<Self> {
        if new.status.is_inactive() {
            return Err(DexError::validation(
                "status",
                format!("a task cannot be created as {}", new.status),
            ));
        }

        let name = validate_name(&new.name)?;
        let path = dir.join(file_name_for(&name));
        if path.exists() {
            return Err(DexError::Overwrite(path));
        }

        let mut task = Self {
            path,
            name,
            content: new.content.trim_end().to_string(),
            code: DexCode {
                id,
                effort: new.effort,
                due: new.due,
                importance: new.importance,
                status: new.status,
                flags: new.flags,
            },
        };
        task.write_state()?;
        tracing::debug!(id = %task.code.id, path = %task.path.display(), "created task");

        if let Some(editor) = editor {
            task.edit(editor)?;
        }
        Ok(task)
    }

    /// Give an existing file without metadata a dexcode.
    ///
    /// The whole current file becomes the task's content. A file outside the
    /// area its status belongs to is moved there before the tag is written.
    pub fn adopt(path: impl Into<PathBuf>, code: DexCode) -> Result<Self> {
        let path = path.into();
        let name = check_task_path(&path)?;
        let text = fs::read_to_string(&path)?;
        match codec::extract(&text) {
            Err(e) if e.is_no_metadata() => {}
            Err(e) => return Err(e),
            Ok(_) => {
                return Err(DexError::validation(
                    "metadata",
                    format!("'{}' already has a dexcode", path.display()),
                ));
            }
        }

        let mut task = Self {
            path,
            name,
            content: text.trim_end().to_string(),
            code,
        };
        task.move_for(task.code.status)?;
        task.write_state()?;
        Ok(task)
    }

    pub fn id(&self) -> TaskId {
        self.code.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File content without the metadata line.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn effort(&self) -> Effort {
        self.code.effort
    }

    pub fn importance(&self) -> Importance {
        self.code.importance
    }

    pub fn status(&self) -> Status {
        self.code.status
    }

    pub fn due(&self) -> NaiveDate {
        self.code.due
    }

    pub fn flags(&self) -> &BTreeSet<Flag> {
        &self.code.flags
    }

    pub fn code(&self) -> &DexCode {
        &self.code
    }

    fn write_state(&self) -> Result<()> {
        self.write_file(&self.content, &self.code)
    }

    fn write_file(&self, content: &str, code: &DexCode) -> Result<()> {
        fs::write(&self.path, codec::render_file_content(content, code))?;
        tracing::debug!(id = %code.id, path = %self.path.display(), "wrote task file");
        Ok(())
    }

    /// Write `code` to the file and only then keep it in memory.
    fn commit(&mut self, code: DexCode) -> Result<()> {
        self.write_file(&self.content, &code)?;
        self.code = code;
        Ok(())
    }

    /// Apply `change` to a copy of the metadata and commit the copy.
    fn update(&mut self, change: impl FnOnce(&mut DexCode) -> Result<()>) -> Result<()> {
        let mut code = self.code.clone();
        change(&mut code)?;
        self.commit(code)
    }

    /// Change status, relocating the file when it crosses the active/inactive boundary.
    pub fn set_status(&mut self, status: Status) -> Result<StatusChange> {
        if status == self.code.status {
            return Ok(StatusChange::Unchanged);
        }

        let change = self.move_for(status)?;
        self.update(|code| {
            code.status = status;
            Ok(())
        })?;
        Ok(change)
    }

    /// Rename the file into the area `status` belongs to, if it is not there yet.
    fn move_for(&mut self, status: Status) -> Result<StatusChange> {
        let target = self.placement_for(status)?;
        if target == self.path {
            return Ok(StatusChange::InPlace);
        }

        // Fails with the OS error if the file vanished underneath us
        fs::metadata(&self.path)?;
        if target.exists() {
            return Err(DexError::Overwrite(target));
        }
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::rename(&self.path, &target)?;
        tracing::debug!(
            id = %self.code.id,
            from = %self.path.display(),
            to = %target.display(),
            "relocated task file"
        );
        let from = std::mem::replace(&mut self.path, target.clone());
        Ok(StatusChange::Relocated { from, to: target })
    }

    /// Where the file belongs once it has `status`.
    fn placement_for(&self, status: Status) -> Result<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            DexError::file_type(&self.path, "task path has no file name")
        })?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        let in_inactive_dir = dir.file_name() == Some(OsStr::new(INACTIVE_SUBDIR));

        let target_dir = match (status.is_active(), in_inactive_dir) {
            (false, false) => dir.join(INACTIVE_SUBDIR),
            (true, true) => dir.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
            _ => dir.to_path_buf(),
        };
        Ok(target_dir.join(file_name))
    }

    pub fn start(&mut self) -> Result<StatusChange> {
        self.set_status(Status::InProgress)
    }

    pub fn complete(&mut self) -> Result<StatusChange> {
        self.set_status(Status::Done)
    }

    pub fn put_on_hold(&mut self) -> Result<StatusChange> {
        self.set_status(Status::Hold)
    }

    pub fn mark_todo(&mut self) -> Result<StatusChange> {
        self.set_status(Status::Todo)
    }

    pub fn abandon(&mut self) -> Result<StatusChange> {
        self.set_status(Status::Abandoned)
    }

    pub fn set_effort(&mut self, effort: u8) -> Result<()> {
        let effort = Effort::new(effort)?;
        self.update(|code| {
            code.effort = effort;
            Ok(())
        })
    }

    pub fn set_importance(&mut self, importance: u8) -> Result<()> {
        let importance = Importance::new(importance)?;
        self.update(|code| {
            code.importance = importance;
            Ok(())
        })
    }

    pub fn set_due(&mut self, due: NaiveDate) -> Result<()> {
        self.update(|code| {
            code.due = due;
            Ok(())
        })
    }

    pub fn add_flag(&mut self, flag: Flag) -> Result<()> {
        self.update(|code| {
            if !code.flags.insert(flag) {
                return Err(DexError::DuplicateFlag(flag.to_string()));
            }
            Ok(())
        })
    }

    pub fn remove_flag(&mut self, flag: &Flag) -> Result<()> {
        self.update(|code| {
            if !code.flags.remove(flag) {
                return Err(DexError::MissingFlag(flag.to_string()));
            }
            Ok(())
        })
    }

    /// Replace any recurrence flag: `Some(days)` recurs, `None` is non-recurring.
    pub fn set_recurrence(&mut self, days: Option<u16>) -> Result<()> {
        let flag = match days {
            Some(days) => Flag::recurring_after(days)?,
            None => Flag::NonRecurring,
        };
        self.update(|code| {
            code.flags
                .retain(|f| !matches!(f, Flag::NonRecurring | Flag::RecurringAfter(_)));
            code.flags.insert(flag);
            Ok(())
        })
    }

    /// Rename the backing file within its directory. Returns false if the name was unchanged.
    pub fn rename(&mut self, new_name: &str) -> Result<bool> {
        let new_name = validate_name(new_name)?;
        if new_name == self.name {
            return Ok(false);
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        let target = dir.join(file_name_for(&new_name));
        if target.exists() {
            return Err(DexError::Overwrite(target));
        }
        fs::rename(&self.path, &target)?;

        self.path = target;
        self.name = new_name;
        Ok(true)
    }

    /// Move the task to another project id. Only the metadata changes.
    pub fn set_id(&mut self, id: TaskId) -> Result<()> {
        self.update(|code| {
            code.id = id;
            Ok(())
        })
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        let content = content.into().trim_end().to_string();
        self.write_file(&content, &self.code)?;
        self.content = content;
        Ok(())
    }

    /// Open the file in an editor and pick up the new content.
    ///
    /// The metadata line belongs to dex: if the user changed or removed it, the
    /// in-memory attributes are written back.
    pub fn edit(&mut self, editor: &dyn Editor) -> Result<()> {
        editor.open(&self.path)?;

        let text = fs::read_to_string(&self.path)?;
        let content = match codec::extract(&text) {
            Ok((body, _)) => body.to_string(),
            Err(e) if e.is_no_metadata() => {
                tracing::warn!(id = %self.code.id, "metadata line removed during edit; restoring it");
                text.trim_end().to_string()
            }
            Err(e) => return Err(e),
        };
        self.write_file(&content, &self.code)?;
        self.content = content;
        Ok(())
    }

    /// Days until due as of today; negative when overdue. Recomputed on every call.
    pub fn days_until_due(&self) -> i64 {
        self.days_until_due_from(date::today())
    }

    pub fn days_until_due_from(&self, today: NaiveDate) -> i64 {
        date::days_until(self.code.due, today)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_active() && self.days_until_due() < 0
    }

    pub fn is_hold(&self) -> bool {
        self.code.status == Status::Hold
    }

    pub fn is_todo(&self) -> bool {
        self.code.status == Status::Todo
    }

    pub fn is_in_progress(&self) -> bool {
        self.code.status == Status::InProgress
    }

    pub fn is_done(&self) -> bool {
        self.code.status == Status::Done
    }

    pub fn is_abandoned(&self) -> bool {
        self.code.status == Status::Abandoned
    }

    pub fn is_active(&self) -> bool {
        self.code.status.is_active()
    }

    /// Recurrence interval in days, if the task recurs.
    pub fn recurrence(&self) -> Option<u16> {
        self.code.flags.iter().find_map(|f| match f {
            Flag::RecurringAfter(days) => Some(days.get()),
            Flag::NonRecurring => None,
        })
    }

    pub fn modification_time(&self) -> Result<SystemTime> {
        Ok(fs::metadata(&self.path)?.modified()?)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} (due {}, effort {}, importance {})",
            self.code.id,
            self.code.status,
            self.name,
            self.code.due.format(codec::DATE_FORMAT),
            self.code.effort,
            self.code.importance
        )
    }
}

fn file_name_for(name: &str) -> String {
    format!("{}.{}", name, TASK_EXTENSION)
}

/// Check the path names a markdown file and return the task name from its stem.
fn check_task_path(path: &Path) -> Result<String> {
    if path.is_dir() {
        return Err(DexError::file_type(path, "task cannot be a directory"));
    }
    if path.extension() != Some(OsStr::new(TASK_EXTENSION)) {
        return Err(DexError::file_type(
            path,
            format!("task files must end in '.{}'", TASK_EXTENSION),
        ));
    }
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| DexError::file_type(path, "file name is not valid UTF-8"))?;
    validate_name(stem)
}
