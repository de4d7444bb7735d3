//! All projects under one root directory

use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::TaskCollection;
use crate::config::DexConfig;
use crate::error::{DexError, Result};
use crate::model::TaskId;
use crate::project::Project;
use crate::rank::{self, RankOptions};
use crate::task::Task;

/// Projects found under a root, lettered `a`, `b`, ... in directory-name order.
#[derive(Debug)]
pub struct ProjectSet {
    root: PathBuf,
    projects: Vec<Project>,
}

impl ProjectSet {
    pub fn open(root: impl Into<PathBuf>, config: &DexConfig) -> Result<Self> {
        Self::open_with(root, &config.ignored_dirs, config.coerce_id_mismatches)
    }

    /// Every non-hidden subdirectory of `root` not named in `ignored` is a project.
    pub fn open_with(
        root: impl Into<PathBuf>,
        ignored: &[String],
        coerce_id_mismatches: bool,
    ) -> Result<Self> {
        let root = root.into();
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || ignored.contains(&name) {
                continue;
            }
            dirs.push((name, entry.path()));
        }
        dirs.sort();

        if dirs.len() > 26 {
            return Err(DexError::validation(
                "projects",
                format!("{} projects under '{}'; at most 26 are supported", dirs.len(), root.display()),
            ));
        }

        let projects = ('a'..='z')
            .zip(dirs)
            .map(|(id, (_, path))| Project::open(path, id, coerce_id_mismatches))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(root = %root.display(), count = projects.len(), "opened projects");

        Ok(Self { root, projects })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: char) -> Option<&Project> {
        let id = id.to_ascii_lowercase();
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn project_mut(&mut self, id: char) -> Option<&mut Project> {
        let id = id.to_ascii_lowercase();
        self.projects.iter_mut().find(|p| p.id() == id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }

    /// Look a task up in the project its id names.
    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.project(id.project())?.task(id)
    }

    pub fn find_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.project_mut(id.project())?.task_mut(id)
    }

    /// Tasks of the selected projects, or all projects when `selection` is `None`.
    pub fn collection(&self, selection: Option<&[char]>) -> Result<TaskCollection<'_>> {
        let Some(selection) = selection else {
            return Ok(TaskCollection::merge(self.projects.iter().map(Project::tasks)));
        };

        let mut chosen = Vec::with_capacity(selection.len());
        for &id in selection {
            let project = self.project(id).ok_or_else(|| {
                DexError::validation("project id", format!("no project '{}'", id))
            })?;
            if !chosen.iter().any(|p: &&Project| p.id() == project.id()) {
                chosen.push(project);
            }
        }
        Ok(TaskCollection::merge(chosen.into_iter().map(Project::tasks)))
    }

    /// Rank across the selected projects as one pool.
    pub fn rank(&self, selection: Option<&[char]>, options: &RankOptions) -> Result<Vec<&Task>> {
        Ok(rank::rank(&self.collection(selection)?, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Effort, Importance};
    use crate::project::TASKS_SUBDIR;
    use crate::task::NewTask;
    use tempfile::tempdir;

    fn make_root(names: &[&str]) -> tempfile::TempDir {
        let root = tempdir().unwrap();
        for name in names {
            fs::create_dir_all(root.path().join(name).join(TASKS_SUBDIR)).unwrap();
        }
        root
    }

    #[test]
    fn test_letters_follow_name_order() {
        let root = make_root(&["work", "home", "garden"]);
        let set = ProjectSet::open_with(root.path(), &[], false).unwrap();
        let names: Vec<(char, &str)> = set.projects().iter().map(|p| (p.id(), p.name())).collect();
        assert_eq!(names, vec![('a', "garden"), ('b', "home"), ('c', "work")]);
    }

    #[test]
    fn test_ignored_and_hidden_dirs_are_skipped() {
        let root = make_root(&["home", "archive", ".git"]);
        fs::write(root.path().join("README.md"), "not a project").unwrap();

        let set = ProjectSet::open_with(root.path(), &["archive".to_string()], false).unwrap();
        assert_eq!(set.projects().len(), 1);
        assert_eq!(set.project('a').unwrap().name(), "home");
        assert!(set.project_by_name("archive").is_none());
    }

    #[test]
    fn test_find_task_and_selection() {
        let root = make_root(&["a-proj", "b-proj"]);
        let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();

        for id in ['a', 'b'] {
            let project = set.project_mut(id).unwrap();
            project
                .create_task(NewTask::new("t", Effort::new(1).unwrap(), Importance::new(1).unwrap()), None)
                .unwrap();
        }

        let b1: TaskId = "b1".parse().unwrap();
        assert!(set.find_task(b1).unwrap().path().starts_with(root.path().join("b-proj")));
        assert!(set.find_task("c1".parse().unwrap()).is_none());

        set.find_task_mut(b1).unwrap().start().unwrap();
        assert!(set.find_task(b1).unwrap().is_in_progress());

        assert_eq!(set.collection(None).unwrap().len(), 2);
        assert_eq!(set.collection(Some(&['b'][..])).unwrap().len(), 1);
        assert_eq!(set.collection(Some(&['a', 'a'][..])).unwrap().len(), 1);
        assert!(set.collection(Some(&['z'][..])).is_err());
    }

    #[test]
    fn test_too_many_projects() {
        let names: Vec<String> = (0..27).map(|i| format!("p{:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let root = make_root(&refs);
        assert!(matches!(
            ProjectSet::open_with(root.path(), &[], false),
            Err(DexError::Validation { .. })
        ));
    }
}
