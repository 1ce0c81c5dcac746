//! Flat, typed rows destined for one history table

use chrono::{DateTime, Datelike, Utc};

/// Column holding the moment a row was projected. Ignored when comparing rows.
pub const SYNC_TIME_COLUMN: &str = "sync_time";

/// Delimiter framing every serialized list column
pub const LIST_DELIMITER: char = ',';

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ColumnValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<usize> for ColumnValue {
    fn from(n: usize) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<bool> for ColumnValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Years a four-digit RFC 3339 timestamp column can hold
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Instants outside years 0 to 9999 cannot be read back, so they become null
impl From<DateTime<Utc>> for ColumnValue {
    fn from(t: DateTime<Utc>) -> Self {
        if STORABLE_YEARS.contains(&t.year()) {
            Self::Timestamp(t)
        } else {
            Self::Null
        }
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Ordered mapping of column name to value
///
/// Insertion order is preserved; setting an existing column replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    columns: Vec<(String, ColumnValue)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A row stamped with the current time in the `sync_time` column
    pub fn stamped() -> Self {
        let mut row = Self::new();
        row.set(SYNC_TIME_COLUMN, Utc::now());
        row
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<ColumnValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Serialize a list as `,a,b,`. An empty list yields `,,`.
pub fn frame_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut framed = String::new();
    framed.push(LIST_DELIMITER);
    let mut empty = true;
    for item in items {
        framed.push_str(item.as_ref());
        framed.push(LIST_DELIMITER);
        empty = false;
    }
    if empty {
        framed.push(LIST_DELIMITER);
    }
    framed
}
