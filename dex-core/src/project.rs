//! A project: one directory of task files identified by a single letter
//!
//! ```text
//! <project>/
//!     tasks/            active tasks (hold, todo, in-progress)
//!         inactive/     done and abandoned tasks
//!     notes/
//! ```

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::DexCode;
use crate::collection::TaskCollection;
use crate::editor::Editor;
use crate::error::{DexError, Result};
use crate::model::{TaskId, validate_name, validate_project_id};
use crate::rank::{self, RankOptions};
use crate::task::{INACTIVE_SUBDIR, NewTask, TASK_EXTENSION, Task};

pub const TASKS_SUBDIR: &str = "tasks";
pub const NOTES_SUBDIR: &str = "notes";

/// A project and the tasks loaded from its directories
#[derive(Debug)]
pub struct Project {
    id: char,
    name: String,
    path: PathBuf,
    tasks: Vec<Task>,
    untracked: Vec<PathBuf>,
    coerce_id_mismatches: bool,
}

impl Project {
    /// Load every task file of the project at `path`.
    ///
    /// Markdown files without a dexcode are not an error; they are listed in
    /// [`Project::untracked`]. Tasks whose id belongs to another project are
    /// logged, and moved to this project when `coerce_id_mismatches` is set.
    pub fn open(path: impl Into<PathBuf>, id: char, coerce_id_mismatches: bool) -> Result<Self> {
        let id = validate_project_id(id)?;
        let path = path.into();
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .map(str::to_string)
            .ok_or_else(|| DexError::file_type(&path, "project directory has no usable name"))?;

        let tasks_dir = path.join(TASKS_SUBDIR);
        let inactive_dir = tasks_dir.join(INACTIVE_SUBDIR);

        let mut tasks = Vec::new();
        let mut untracked = Vec::new();
        for (dir, holds_active) in [(&tasks_dir, true), (&inactive_dir, false)] {
            // inactive/ is created on first completion
            if !holds_active && !dir.is_dir() {
                continue;
            }
            for file in task_files(dir)? {
                match Task::from_file(&file) {
                    Ok(task) => {
                        if task.is_active() != holds_active {
                            tracing::warn!(
                                task = %task.id(),
                                status = %task.status(),
                                path = %file.display(),
                                "task file is in the wrong area for its status"
                            );
                        }
                        tasks.push(task);
                    }
                    Err(e) if e.is_no_metadata() => {
                        tracing::warn!(path = %file.display(), "task file has no dexcode; skipping");
                        untracked.push(file);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let mut project = Self {
            id,
            name,
            path,
            tasks,
            untracked,
            coerce_id_mismatches,
        };
        project.check_ids()?;
        Ok(project)
    }

    fn check_ids(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id()) {
                tracing::warn!(task = %task.id(), project = %self.id, "duplicate task id in project");
            }
        }

        let mismatched: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id().project() != self.id)
            .map(|(i, _)| i)
            .collect();

        for i in mismatched {
            let old = self.tasks[i].id();
            tracing::warn!(
                task = %old,
                project = %self.id,
                path = %self.tasks[i].path().display(),
                "task id does not match its project"
            );
            if !self.coerce_id_mismatches {
                continue;
            }

            let wanted = old.with_project(self.id)?;
            let new = if self.tasks.iter().any(|t| t.id() == wanted) {
                self.next_task_id()?
            } else {
                wanted
            };
            tracing::warn!(from = %old, to = %new, "reassigning task to project");
            self.tasks[i].set_id(new)?;
        }
        Ok(())
    }

    pub fn id(&self) -> char {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.path.join(TASKS_SUBDIR)
    }

    pub fn inactive_dir(&self) -> PathBuf {
        self.tasks_dir().join(INACTIVE_SUBDIR)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.path.join(NOTES_SUBDIR)
    }

    /// Markdown files found without metadata.
    pub fn untracked(&self) -> &[PathBuf] {
        &self.untracked
    }

    /// Fresh status-partitioned view of this project's tasks.
    pub fn tasks(&self) -> TaskCollection<'_> {
        TaskCollection::from_tasks(&self.tasks)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        let name = name.trim();
        self.tasks.iter().find(|t| t.name() == name)
    }

    /// One past the highest task number used in this project.
    pub fn next_task_id(&self) -> Result<TaskId> {
        let max = self
            .tasks
            .iter()
            .map(Task::id)
            .filter(|id| id.project() == self.id)
            .map(|id| id.number())
            .max()
            .unwrap_or(0);
        let next = max.checked_add(1).ok_or_else(|| {
            DexError::validation(
                "task id",
                format!("project {} has no task numbers left after {}", self.id, max),
            )
        })?;
        TaskId::new(self.id, next)
    }

    /// Create a task in this project's active area with the next free id.
    pub fn create_task(&mut self, new: NewTask, editor: Option<&dyn Editor>) -> Result<&Task> {
        let name = validate_name(&new.name)?;
        if let Some(existing) = self.task_by_name(&name) {
            return Err(DexError::Overwrite(existing.path().to_path_buf()));
        }

        let id = self.next_task_id()?;
        let task = Task::create(id, new, &self.tasks_dir(), editor)?;
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Give an untracked file a dexcode built from `attrs` and the next free id.
    ///
    /// Only the attribute fields of `attrs` are used; the name and content come
    /// from the file. The file moves to the area its status belongs to.
    pub fn adopt(&mut self, path: &Path, attrs: NewTask) -> Result<&Task> {
        let pos = self
            .untracked
            .iter()
            .position(|p| p == path)
            .ok_or_else(|| {
                DexError::validation(
                    "path",
                    format!("'{}' is not an untracked file of project {}", path.display(), self.id),
                )
            })?;

        let code = DexCode {
            id: self.next_task_id()?,
            effort: attrs.effort,
            due: attrs.due,
            importance: attrs.importance,
            status: attrs.status,
            flags: attrs.flags,
        };
        let task = Task::adopt(path, code)?;
        self.untracked.remove(pos);
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Rename the project directory and reload it from its new location.
    ///
    /// If the reload fails the directory is moved back and `self` is unchanged.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        let new_name = validate_name(new_name)?;
        if new_name == self.name {
            return Ok(());
        }
        let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
        let target = parent.join(&new_name);
        if target.exists() {
            return Err(DexError::Overwrite(target));
        }
        fs::rename(&self.path, &target)?;
        match Project::open(&target, self.id, self.coerce_id_mismatches) {
            Ok(project) => {
                *self = project;
                Ok(())
            }
            Err(e) => {
                fs::rename(&target, &self.path)?;
                Err(e)
            }
        }
    }

    /// This project's tasks in work order.
    pub fn rank(&self, options: &RankOptions) -> Vec<&Task> {
        rank::rank(&self.tasks(), options)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Project {}: {} ({} tasks)",
            self.id,
            self.name,
            self.tasks.len()
        )
    }
}

/// Markdown files directly inside `dir`, sorted by file name.
fn task_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension() == Some(OsStr::new(TASK_EXTENSION)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
