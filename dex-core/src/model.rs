//! Value types shared by the codec, tasks and projects.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{DexError, Result};

// Pattern is a constant; a failure here is a programming error
static TASK_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z])([1-9][0-9]*)$").expect("Invalid task id regex pattern")
});

static RECURRING_FLAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^r([0-9]+)$").expect("Invalid recurring flag regex pattern")
});

/// Characters that may never appear in a task or project name.
///
/// Covers every character of the dexcode delimiters plus path separators.
pub const RESERVED_NAME_CHARS: [char; 8] = ['{', '}', '[', ']', '|', ';', '/', '\\'];

/// Valid number of days for a recurrence flag.
pub const RECURRENCE_MIN_DAYS: u16 = 1;
pub const RECURRENCE_MAX_DAYS: u16 = 365;

/// Lifecycle status of a task
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Hold,
    #[default]
    Todo,
    InProgress,
    Done,
    Abandoned,
}

impl Status {
    /// Fixed status ordering. A status is encoded as its index here.
    pub const ALL: [Status; 5] = [
        Status::Hold,
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Abandoned,
    ];

    pub fn ordinal(self) -> usize {
        match self {
            Self::Hold => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Done => 3,
            Self::Abandoned => 4,
        }
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Abandoned => "abandoned",
        }
    }

    /// Hold, todo and in-progress tasks live in the active area.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Hold | Self::Todo | Self::InProgress)
    }

    pub fn is_inactive(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hold" => Ok(Self::Hold),
            "todo" => Ok(Self::Todo),
            "in-progress" | "in_progress" | "ip" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(DexError::validation(
                "status",
                format!(
                    "'{}' is not a status; valid statuses are {:?}",
                    other,
                    Status::ALL.map(Status::as_str)
                ),
            )),
        }
    }
}

/// Effort estimate, 1 (trivial) through 5 (huge)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Effort(u8);

impl Effort {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        check_level("effort", value, Self::MIN, Self::MAX)?;
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Importance, 1 (least) through 5 (most)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        check_level("importance", value, Self::MIN, Self::MAX)?;
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

fn check_level(field: &str, value: u8, min: u8, max: u8) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DexError::validation(
            field,
            format!(
                "{} is invalid; valid values are {:?}",
                value,
                (min..=max).collect::<Vec<_>>()
            ),
        ))
    }
}

macro_rules! level_conversions {
    ($ty:ident) => {
        impl TryFrom<u8> for $ty {
            type Error = DexError;

            fn try_from(value: u8) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$ty> for u8 {
            fn from(level: $ty) -> u8 {
                level.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

level_conversions!(Effort);
level_conversions!(Importance);

/// Days between recurrences. Always within
/// [`RECURRENCE_MIN_DAYS`]..=[`RECURRENCE_MAX_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecurrenceDays(u16);

impl RecurrenceDays {
    pub fn new(days: u16) -> Result<Self> {
        if (RECURRENCE_MIN_DAYS..=RECURRENCE_MAX_DAYS).contains(&days) {
            Ok(Self(days))
        } else {
            Err(DexError::validation(
                "recurrence",
                format!(
                    "{} days is invalid; recurrence must be between {} and {} days",
                    days, RECURRENCE_MIN_DAYS, RECURRENCE_MAX_DAYS
                ),
            ))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for RecurrenceDays {
    type Error = DexError;

    fn try_from(days: u16) -> Result<Self> {
        Self::new(days)
    }
}

impl fmt::Display for RecurrenceDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task flag. Encoded as a one-character prefix plus an optional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// `n`
    NonRecurring,
    /// `r<days>`
    RecurringAfter(RecurrenceDays),
}

impl Flag {
    /// Recognized flag prefix characters
    pub const PREFIXES: [char; 2] = ['n', 'r'];

    pub fn recurring_after(days: u16) -> Result<Self> {
        Ok(Self::RecurringAfter(RecurrenceDays::new(days)?))
    }

    /// Compact form used inside the dexcode.
    pub fn code(&self) -> String {
        match self {
            Self::NonRecurring => "n".to_string(),
            Self::RecurringAfter(days) => format!("r{}", days),
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        if code == "n" {
            return Ok(Self::NonRecurring);
        }
        if let Some(caps) = RECURRING_FLAG_REGEX.captures(code) {
            let days = caps[1].parse::<u16>().map_err(|e| {
                DexError::validation("flags", format!("bad recurrence in '{}': {}", code, e))
            })?;
            return Self::recurring_after(days);
        }
        Err(DexError::validation(
            "flags",
            format!(
                "'{}' is not a recognized flag; flags must start with one of {:?}",
                code,
                Self::PREFIXES
            ),
        ))
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonRecurring => f.write_str("non-recurring"),
            Self::RecurringAfter(days) => write!(f, "recurring after {} days", days),
        }
    }
}

impl FromStr for Flag {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

/// Project letter plus per-project task number, e.g. `c3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    project: char,
    number: u32,
}

impl TaskId {
    pub fn new(project: char, number: u32) -> Result<Self> {
        let project = validate_project_id(project)?;
        if number == 0 {
            return Err(DexError::validation(
                "task id",
                "task numbers start at 1",
            ));
        }
        Ok(Self { project, number })
    }

    pub fn project(&self) -> char {
        self.project
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Same number under another project letter.
    pub fn with_project(&self, project: char) -> Result<Self> {
        Self::new(project, self.number)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.project, self.number)
    }
}

impl FromStr for TaskId {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = TASK_ID_REGEX.captures(s.trim()).ok_or_else(|| {
            DexError::validation(
                "task id",
                format!("'{}' is not a project letter followed by a task number", s),
            )
        })?;
        let project = caps[1].chars().next().unwrap_or_default();
        let number = caps[2]
            .parse::<u32>()
            .map_err(|e| DexError::validation("task id", format!("'{}': {}", s, e)))?;
        Self::new(project, number)
    }
}

impl TryFrom<String> for TaskId {
    type Error = DexError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Project ids are single lowercase ASCII letters. Uppercase input is folded.
pub fn validate_project_id(id: char) -> Result<char> {
    let id = id.to_ascii_lowercase();
    if id.is_ascii_lowercase() {
        Ok(id)
    } else {
        Err(DexError::validation(
            "project id",
            format!("'{}' is not a single letter a-z", id),
        ))
    }
}

/// Trim a task or project name and reject empty names or reserved characters.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DexError::validation("name", "name cannot be empty"));
    }
    if let Some(bad) = trimmed.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(DexError::validation(
            "name",
            format!(
                "'{}' contains '{}'; the characters {:?} are not allowed in names",
                trimmed, bad, RESERVED_NAME_CHARS
            ),
        ));
    }
    Ok(trimmed.to_string())
}
