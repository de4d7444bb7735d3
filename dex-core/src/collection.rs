//! Status-partitioned view over a set of tasks
//!
//! A collection borrows its tasks and is never updated in place: when the
//! underlying tasks change, build a new one. That keeps every task in exactly
//! one status bucket.

use crate::model::Status;
use crate::task::Task;

/// Tasks grouped by status, plus all of them in input order
#[derive(Debug, Clone, Default)]
pub struct TaskCollection<'a> {
    hold: Vec<&'a Task>,
    todo: Vec<&'a Task>,
    in_progress: Vec<&'a Task>,
    done: Vec<&'a Task>,
    abandoned: Vec<&'a Task>,
    all: Vec<&'a Task>,
}

impl<'a> TaskCollection<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition tasks by their current status.
    pub fn from_tasks(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut collection = Self::new();
        for task in tasks {
            collection.bucket_mut(task.status()).push(task);
            collection.all.push(task);
        }
        collection
    }

    /// Combine several collections, e.g. one per project, into one.
    pub fn merge(collections: impl IntoIterator<Item = TaskCollection<'a>>) -> Self {
        Self::from_tasks(collections.into_iter().flat_map(|c| c.all))
    }

    fn bucket_mut(&mut self, status: Status) -> &mut Vec<&'a Task> {
        match status {
            Status::Hold => &mut self.hold,
            Status::Todo => &mut self.todo,
            Status::InProgress => &mut self.in_progress,
            Status::Done => &mut self.done,
            Status::Abandoned => &mut self.abandoned,
        }
    }

    pub fn bucket(&self, status: Status) -> &[&'a Task] {
        match status {
            Status::Hold => &self.hold,
            Status::Todo => &self.todo,
            Status::InProgress => &self.in_progress,
            Status::Done => &self.done,
            Status::Abandoned => &self.abandoned,
        }
    }

    pub fn hold(&self) -> &[&'a Task] {
        &self.hold
    }

    pub fn todo(&self) -> &[&'a Task] {
        &self.todo
    }

    pub fn in_progress(&self) -> &[&'a Task] {
        &self.in_progress
    }

    pub fn done(&self) -> &[&'a Task] {
        &self.done
    }

    pub fn abandoned(&self) -> &[&'a Task] {
        &self.abandoned
    }

    /// Every task, unordered.
    pub fn all(&self) -> &[&'a Task] {
        &self.all
    }

    /// Hold, todo and in-progress tasks.
    pub fn active(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.all.iter().copied().filter(|t| t.is_active())
    }

    /// Done and abandoned tasks.
    pub fn inactive(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.all.iter().copied().filter(|t| !t.is_active())
    }

    /// Task count for each status, in the fixed status order.
    pub fn counts(&self) -> [(Status, usize); 5] {
        Status::ALL.map(|s| (s, self.bucket(s).len()))
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

impl<'a> FromIterator<&'a Task> for TaskCollection<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Task>>(iter: I) -> Self {
        Self::from_tasks(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Effort, Importance};
    use crate::task::NewTask;
    use tempfile::tempdir;

    fn make_tasks(dir: &std::path::Path, statuses: &[Status]) -> Vec<Task> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let id = format!("a{}", i + 1).parse().unwrap();
                let new = NewTask::new(
                    format!("task {}", i + 1),
                    Effort::new(1).unwrap(),
                    Importance::new(1).unwrap(),
                );
                let mut task = Task::create(id, new, dir, None).unwrap();
                task.set_status(*status).unwrap();
                task
            })
            .collect()
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let dir = tempdir().unwrap();
        let tasks = make_tasks(
            dir.path(),
            &[
                Status::Todo,
                Status::Done,
                Status::Hold,
                Status::InProgress,
                Status::Todo,
                Status::Abandoned,
            ],
        );
        let collection = TaskCollection::from_tasks(&tasks);

        assert_eq!(collection.len(), tasks.len());
        let bucket_total: usize = collection.counts().iter().map(|(_, n)| n).sum();
        assert_eq!(bucket_total, tasks.len());

        for task in &tasks {
            let homes = Status::ALL
                .iter()
                .filter(|s| {
                    collection
                        .bucket(**s)
                        .iter()
                        .any(|t| std::ptr::eq(*t, task))
                })
                .count();
            assert_eq!(homes, 1, "{} should be in exactly one bucket", task.id());
            assert!(collection.all().iter().any(|t| std::ptr::eq(*t, task)));
        }

        assert_eq!(collection.todo().len(), 2);
        assert_eq!(collection.active().count(), 4);
        assert_eq!(collection.inactive().count(), 2);
    }

    #[test]
    fn test_merge_keeps_every_task() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let a = make_tasks(dir_a.path(), &[Status::Todo, Status::Hold]);
        let b = make_tasks(dir_b.path(), &[Status::Todo, Status::Done]);

        let merged = TaskCollection::merge([
            TaskCollection::from_tasks(&a),
            TaskCollection::from_tasks(&b),
        ]);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.todo().len(), 2);
        assert_eq!(merged.hold().len(), 1);
        assert_eq!(merged.done().len(), 1);
    }

    #[test]
    fn test_empty() {
        let collection = TaskCollection::new();
        assert!(collection.is_empty());
        assert!(collection.bucket(Status::Todo).is_empty());
    }
}
