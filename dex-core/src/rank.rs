//! Work ordering
//!
//! [`rank`] turns a [`TaskCollection`] into one sequence, most pressing first:
//!
//! 1. todo and in-progress tasks, by [`priority_score`] (highest first)
//! 2. hold tasks, by importance
//! 3. done and abandoned tasks, by importance, only if asked for
//!
//! Equal scores fall back to the least recently modified file, then task id,
//! so repeated runs over unchanged files give the same order.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::str::FromStr;
use std::time::SystemTime;

use crate::collection::TaskCollection;
use crate::date;
use crate::error::{DexError, Result};
use crate::model::Status;
use crate::task::Task;

/// Score multiplier for in-progress tasks over todo ones.
pub const IN_PROGRESS_BOOST: f64 = 1.2;
/// How strongly due-date urgency raises the score.
pub const URGENCY_WEIGHT: f64 = 4.0;
/// How strongly effort lowers the score.
pub const EFFORT_WEIGHT: f64 = 0.25;

/// Options for [`rank`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    /// Maximum number of tasks returned; 0 means no limit.
    pub limit: usize,
    /// Append done and abandoned tasks at the tail.
    pub include_inactive: bool,
    /// Date due-date urgency is measured from.
    pub today: NaiveDate,
}

impl RankOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            limit: 0,
            include_inactive: false,
            today,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_inactive(mut self, include_inactive: bool) -> Self {
        self.include_inactive = include_inactive;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self::new(date::today())
    }
}

/// Due-date urgency. Strictly decreasing in `days_until_due`.
///
/// Tasks due today score 1; later tasks approach 0; overdue tasks keep
/// climbing by 1/7 per day late.
pub fn urgency(days_until_due: i64) -> f64 {
    if days_until_due >= 0 {
        1.0 / (1.0 + days_until_due as f64)
    } else {
        1.0 + (-days_until_due) as f64 / 7.0
    }
}

/// Computed priority of an active task. Higher is more pressing.
///
/// `status_factor * importance² * (1 + URGENCY_WEIGHT * urgency) / (1 + EFFORT_WEIGHT * effort)`
pub fn priority_score(task: &Task, today: NaiveDate) -> f64 {
    let status_factor = if task.is_in_progress() {
        IN_PROGRESS_BOOST
    } else {
        1.0
    };
    let importance = f64::from(task.importance().get());
    let effort = f64::from(task.effort().get());
    let urgency = urgency(task.days_until_due_from(today));

    status_factor * importance * importance * (1.0 + URGENCY_WEIGHT * urgency)
        / (1.0 + EFFORT_WEIGHT * effort)
}

/// Order a collection for work selection. Index 0 is the task to do next.
pub fn rank<'a>(collection: &TaskCollection<'a>, options: &RankOptions) -> Vec<&'a Task> {
    let mut scored: Vec<(f64, Option<SystemTime>, &'a Task)> = collection
        .todo()
        .iter()
        .chain(collection.in_progress())
        .map(|t| {
            (
                priority_score(t, options.today),
                t.modification_time().ok(),
                *t,
            )
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| oldest_first(a.1, b.1))
            .then_with(|| a.2.id().cmp(&b.2.id()))
    });

    let mut ordered: Vec<&'a Task> = scored.into_iter().map(|(_, _, t)| t).collect();
    ordered.extend(by_importance(collection.hold().iter().copied()));

    if options.include_inactive {
        ordered.extend(by_importance(
            collection
                .done()
                .iter()
                .chain(collection.abandoned())
                .copied(),
        ));
    }

    if options.limit > 0 {
        ordered.truncate(options.limit);
    }
    ordered
}

fn oldest_first(a: Option<SystemTime>, b: Option<SystemTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by descending importance.
fn by_importance<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<&'a Task> {
    let mut tasks: Vec<&'a Task> = tasks.collect();
    tasks.sort_by(|a, b| b.importance().cmp(&a.importance()));
    tasks
}

/// Alternative orderings for listing tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Same order as [`rank`], inactive tasks included
    #[default]
    Priority,
    /// Most important first
    Importance,
    /// Least effort first
    Effort,
    /// Soonest due first
    Due,
    /// Grouped by status (in-progress, todo, hold, done, abandoned), priority within
    Status,
}

impl FromStr for TaskSort {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "priority" | "p" => Ok(Self::Priority),
            "importance" | "i" => Ok(Self::Importance),
            "effort" | "e" => Ok(Self::Effort),
            "due" | "d" => Ok(Self::Due),
            "status" | "s" => Ok(Self::Status),
            other => Err(DexError::validation(
                "sort",
                format!(
                    "'{}' is not a sort key; use priority, importance, effort, due or status",
                    other
                ),
            )),
        }
    }
}

/// Sort a collection by `sort`. Ties keep priority order.
pub fn sort_tasks<'a>(
    collection: &TaskCollection<'a>,
    sort: TaskSort,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut tasks = rank(collection, &RankOptions::new(today).with_inactive(true));

    match sort {
        TaskSort::Priority => {}
        TaskSort::Importance => tasks.sort_by(|a, b| b.importance().cmp(&a.importance())),
        TaskSort::Effort => tasks.sort_by_key(|t| t.effort()),
        TaskSort::Due => tasks.sort_by_key(|t| t.due()),
        TaskSort::Status => tasks.sort_by_key(|t| status_rank(t.status())),
    }
    tasks
}

fn status_rank(status: Status) -> u8 {
    match status {
        Status::InProgress => 0,
        Status::Todo => 1,
        Status::Hold => 2,
        Status::Done => 3,
        Status::Abandoned => 4,
    }
}
