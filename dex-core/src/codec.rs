//! Dexcode: the metadata tag stored as the last line of every task file
//!
//! A task file looks like:
//!
//! ```text
//! Whatever markdown the user wrote.
//! [dexcode]: # {[c3|e2|d2024-03-01|i4|s3|fn]}
//! ```
//!
//! Fields, in order: task id, effort (`e`), due date (`d`), importance (`i`),
//! status ordinal (`s`) and flags (`f`, joined by `;`).

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::error::{DexError, Result};
use crate::model::{Effort, Flag, Importance, Status, TaskId};

pub const LEFT: &str = "{[";
pub const RIGHT: &str = "]}";
pub const MID: &str = "|";
pub const FLAG_SEP: &str = ";";

/// Prefix of the metadata line, a markdown link-reference comment.
pub const DEXCODE_HEADER: &str = "[dexcode]: # ";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const EFFORT_TAG: char = 'e';
pub const DUE_TAG: char = 'd';
pub const IMPORTANCE_TAG: char = 'i';
pub const STATUS_TAG: char = 's';
pub const FLAGS_TAG: char = 'f';

/// Number of fields in a dexcode, the task id included.
pub const FIELD_COUNT: usize = 6;

const FIELD_NAMES: [&str; FIELD_COUNT] = ["id", "effort", "due", "importance", "status", "flags"];

/// Structured attributes carried by a dexcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexCode {
    pub id: TaskId,
    pub effort: Effort,
    pub due: NaiveDate,
    pub importance: Importance,
    pub status: Status,
    pub flags: BTreeSet<Flag>,
}

/// Encode validated attributes into a tag.
pub fn encode(code: &DexCode) -> String {
    let flags = code
        .flags
        .iter()
        .map(Flag::code)
        .collect::<Vec<_>>()
        .join(FLAG_SEP);

    format!(
        "{LEFT}{id}{MID}{EFFORT_TAG}{effort}{MID}{DUE_TAG}{due}{MID}{IMPORTANCE_TAG}{importance}{MID}{STATUS_TAG}{status}{MID}{FLAGS_TAG}{flags}{RIGHT}",
        id = code.id,
        effort = code.effort,
        due = code.due.format(DATE_FORMAT),
        importance = code.importance,
        status = code.status.ordinal(),
    )
}

/// Validate raw attribute values and encode them.
///
/// Fails with [`DexError::Validation`] naming the first offending field.
pub fn encode_raw(
    id: &str,
    effort: u8,
    due: NaiveDate,
    importance: u8,
    status: &str,
    flags: &[&str],
) -> Result<String> {
    let code = DexCode {
        id: id.parse()?,
        effort: Effort::new(effort)?,
        due,
        importance: Importance::new(importance)?,
        status: status.parse()?,
        flags: flags
            .iter()
            .map(|f| Flag::from_code(f))
            .collect::<Result<_>>()?,
    };
    Ok(encode(&code))
}

/// Decode a tag produced by [`encode`].
pub fn decode(tag: &str) -> Result<DexCode> {
    let tag = tag.trim();

    let lefts = tag.matches(LEFT).count();
    let rights = tag.matches(RIGHT).count();
    if lefts != 1 || rights != 1 || !tag.starts_with(LEFT) || !tag.ends_with(RIGHT) {
        return Err(DexError::decode(
            "delimiters",
            format!(
                "'{}' must start with '{}' and end with '{}', each appearing once",
                tag, LEFT, RIGHT
            ),
        ));
    }

    let inner = &tag[LEFT.len()..tag.len() - RIGHT.len()];
    let mids = inner.matches(MID).count();
    if mids != FIELD_COUNT - 1 {
        return Err(DexError::decode(
            "delimiters",
            format!(
                "'{}' has {} '{}' separators, expected {}",
                tag,
                mids,
                MID,
                FIELD_COUNT - 1
            ),
        ));
    }

    let tokens: Vec<&str> = inner.split(MID).collect();
    for (token, field) in tokens.iter().zip(FIELD_NAMES) {
        if token.chars().any(char::is_whitespace) {
            return Err(DexError::decode(
                field,
                format!("token '{}' must not contain whitespace", token),
            ));
        }
    }

    let id = tokens[0]
        .parse::<TaskId>()
        .map_err(|e| DexError::decode("id", format!("'{}': {}", tokens[0], e)))?;

    let effort = parse_level(tokens[1], EFFORT_TAG, "effort")
        .and_then(|v| Effort::new(v).map_err(|e| DexError::decode("effort", e.to_string())))?;

    let due_raw = field_value(tokens[2], DUE_TAG, "due")?;
    let due = NaiveDate::parse_from_str(due_raw, DATE_FORMAT)
        .map_err(|e| DexError::decode("due", format!("'{}': {}", due_raw, e)))?;
    if due.format(DATE_FORMAT).to_string() != due_raw {
        return Err(DexError::decode(
            "due",
            format!("'{}' is not a zero-padded YYYY-MM-DD date", due_raw),
        ));
    }

    let importance = parse_level(tokens[3], IMPORTANCE_TAG, "importance").and_then(|v| {
        Importance::new(v).map_err(|e| DexError::decode("importance", e.to_string()))
    })?;

    let status_raw = digits(field_value(tokens[4], STATUS_TAG, "status")?, "status")?;
    let ordinal = status_raw
        .parse::<usize>()
        .map_err(|e| DexError::decode("status", format!("'{}': {}", status_raw, e)))?;
    let status = Status::from_ordinal(ordinal).ok_or_else(|| {
        DexError::decode(
            "status",
            format!(
                "ordinal {} is out of range 0..{}",
                ordinal,
                Status::ALL.len()
            ),
        )
    })?;

    let flags_raw = field_value(tokens[5], FLAGS_TAG, "flags")?;
    let flags = if flags_raw.is_empty() {
        BTreeSet::new()
    } else {
        flags_raw
            .split(FLAG_SEP)
            .map(|f| Flag::from_code(f).map_err(|e| DexError::decode("flags", e.to_string())))
            .collect::<Result<BTreeSet<_>>>()?
    };

    Ok(DexCode {
        id,
        effort,
        due,
        importance,
        status,
        flags,
    })
}

fn field_value<'a>(token: &'a str, tag: char, field: &str) -> Result<&'a str> {
    token.strip_prefix(tag).ok_or_else(|| {
        DexError::decode(field, format!("token '{}' is missing its '{}' tag", token, tag))
    })
}

/// Numbers in a tag are bare ASCII digits; no sign, no padding spaces.
fn digits<'a>(raw: &'a str, field: &str) -> Result<&'a str> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DexError::decode(
            field,
            format!("'{}' is not a plain decimal number", raw),
        ));
    }
    Ok(raw)
}

fn parse_level(token: &str, tag: char, field: &str) -> Result<u8> {
    let raw = digits(field_value(token, tag, field)?, field)?;
    raw.parse::<u8>()
        .map_err(|e| DexError::decode(field, format!("'{}': {}", raw, e)))
}

/// The full metadata line: header followed by the tag.
pub fn metadata_line(code: &DexCode) -> String {
    format!("{}{}", DEXCODE_HEADER, encode(code))
}

/// Split file content into its body and raw tag.
///
/// Fails with [`DexError::NoMetadata`] when the last line is not a metadata
/// line. The tag itself is not validated here.
pub fn extract(content: &str) -> Result<(&str, &str)> {
    let trimmed = content.trim_end_matches(['\n', '\r']);
    let (body, last) = match trimmed.rfind('\n') {
        Some(i) => (&trimmed[..i], &trimmed[i + 1..]),
        None => ("", trimmed),
    };

    let tag = last
        .trim_end()
        .strip_prefix(DEXCODE_HEADER)
        .ok_or_else(|| {
            DexError::no_metadata(format!("last line does not start with '{}'", DEXCODE_HEADER.trim_end()))
        })?
        .trim();

    if !tag.starts_with(LEFT) || !tag.ends_with(RIGHT) {
        return Err(DexError::no_metadata(format!(
            "metadata line is not delimited by '{}' and '{}'",
            LEFT, RIGHT
        )));
    }

    Ok((body.trim_end_matches(['\n', '\r']), tag))
}

/// Extract and decode in one step.
pub fn parse_file_content(content: &str) -> Result<(String, DexCode)> {
    let (body, tag) = extract(content)?;
    Ok((body.to_string(), decode(tag)?))
}

/// Inverse of [`parse_file_content`].
pub fn render_file_content(body: &str, code: &DexCode) -> String {
    let body = body.trim_end_matches(['\n', '\r']);
    if body.is_empty() {
        format!("{}\n", metadata_line(code))
    } else {
        format!("{}\n{}\n", body, metadata_line(code))
    }
}
