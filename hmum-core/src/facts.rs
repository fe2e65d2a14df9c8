//! Product fact sheets: the raw, per-product input to scoring.
//!
//! Facts are a nested map of raw values addressed by dotted [`FieldPath`]s
//! such as `"display.peak_nits"`. The engine only reads fact sheets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw value found in a product fact sheet.
///
/// `null` is accepted on input and treated the same as an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Explicit JSON `null`.
    Null,
    /// Boolean flag, e.g. `"hdmi_2_1": true`.
    Bool(bool),
    /// Numeric measurement.
    Number(f64),
    /// Enumerated or free-form text.
    Text(String),
    /// Ordered list of values.
    List(Vec<FactValue>),
    /// Nested group of facts.
    Group(BTreeMap<String, FactValue>),
}

impl FactValue {
    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Group(_) => "object",
        }
    }

    /// Report whether the value is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Interpret the value as a number.
    ///
    /// Numeric strings such as `"120"` parse; everything else yields `None`.
    ///
    /// # Examples
    /// ```
    /// use hmum_core::FactValue;
    ///
    /// assert_eq!(FactValue::from(42.0).as_number(), Some(42.0));
    /// assert_eq!(FactValue::from(" 7.5 ").as_number(), Some(7.5));
    /// assert_eq!(FactValue::from(true).as_number(), None);
    /// ```
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Borrow the value as the input type consumed by normalization curves.
    #[must_use]
    pub fn as_input(&self) -> RawInput<'_> {
        match self {
            Self::Null => RawInput::Absent,
            Self::Bool(flag) => RawInput::Bool(*flag),
            Self::Number(value) => RawInput::Number(*value),
            Self::Text(text) => RawInput::Text(text.as_str()),
            Self::List(_) | Self::Group(_) => RawInput::Structured { kind: self.kind() },
        }
    }

    /// Compare two values, treating numbers by value and everything else
    /// structurally.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(_), _) | (_, Self::Number(_)) => {
                matches!((self.as_number(), other.as_number()), (Some(a), Some(b)) if a == b)
            }
            _ => self == other,
        }
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Borrowed view of a raw value as seen by a normalization curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput<'a> {
    /// No value was supplied.
    Absent,
    /// Boolean flag.
    Bool(bool),
    /// Numeric measurement.
    Number(f64),
    /// Text value.
    Text(&'a str),
    /// A list or nested group; only meaningful as "present".
    Structured {
        /// Kind of structured value (`"list"` or `"object"`).
        kind: &'static str,
    },
}

impl RawInput<'_> {
    /// Short name of the input's kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Structured { kind } => *kind,
        }
    }
}

/// Errors returned by [`FieldPath::parse`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldPathError {
    /// The path was empty or whitespace.
    #[error("field path must not be empty")]
    Empty,
    /// A dotted segment was empty, e.g. `"display..nits"`.
    #[error("field path `{path}` contains an empty segment")]
    EmptySegment {
        /// Offending path.
        path: String,
    },
}

/// Dotted path into a product's nested facts.
///
/// # Examples
/// ```
/// use hmum_core::FieldPath;
///
/// let path = FieldPath::parse("display.peak_nits").unwrap();
/// assert_eq!(path.segments().collect::<Vec<_>>(), vec!["display", "peak_nits"]);
/// assert!(FieldPath::parse("display..nits").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
}

impl FieldPath {
    /// Validate and construct a [`FieldPath`].
    pub fn parse(raw: impl Into<String>) -> Result<Self, FieldPathError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(FieldPathError::Empty);
        }
        if raw.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(FieldPathError::EmptySegment { path: raw });
        }
        Ok(Self { raw })
    }

    /// Iterate over the dotted segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }

    /// Borrow the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FieldPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Raw per-product input owned by the product-data collaborator.
///
/// # Examples
/// ```
/// use hmum_core::{FactValue, FieldPath, ProductFactSheet};
///
/// let product = ProductFactSheet::new("tv-1")
///     .with_fact("display.peak_nits", 1500.0)
///     .with_fact("smart.os", "webOS")
///     .with_base_score(8.2);
///
/// let path = FieldPath::parse("display.peak_nits").unwrap();
/// assert_eq!(product.lookup(&path), Some(&FactValue::Number(1500.0)));
/// assert_eq!(product.base_score, Some(8.2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFactSheet {
    /// Stable product identifier; also the final ranking tie-break.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Nested raw facts.
    #[serde(default)]
    pub facts: BTreeMap<String, FactValue>,
    /// Optional pre-computed editorial score on the `0.0..=10.0` scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,
}

impl ProductFactSheet {
    /// Construct an empty fact sheet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            facts: BTreeMap::new(),
            base_score: None,
        }
    }

    /// Insert a fact at a dotted path, creating intermediate groups.
    ///
    /// A non-group value sitting on an intermediate segment is replaced.
    pub fn insert_fact(&mut self, path: &str, value: impl Into<FactValue>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut map = &mut self.facts;
        for segment in segments {
            let slot = map
                .entry(segment.to_owned())
                .or_insert_with(|| FactValue::Group(BTreeMap::new()));
            if !matches!(slot, FactValue::Group(_)) {
                *slot = FactValue::Group(BTreeMap::new());
            }
            let FactValue::Group(inner) = slot else {
                return;
            };
            map = inner;
        }
        map.insert(last.to_owned(), value.into());
    }

    /// Insert a fact while returning `self` for chaining.
    #[must_use]
    pub fn with_fact(mut self, path: &str, value: impl Into<FactValue>) -> Self {
        self.insert_fact(path, value);
        self
    }

    /// Set the editorial base score while returning `self` for chaining.
    #[must_use]
    pub const fn with_base_score(mut self, score: f64) -> Self {
        self.base_score = Some(score);
        self
    }

    /// Resolve a dotted path. `null` values resolve to `None`.
    #[must_use]
    pub fn lookup(&self, path: &FieldPath) -> Option<&FactValue> {
        let mut segments = path.segments();
        let first = segments.next()?;
        let mut current = self.facts.get(first)?;
        for segment in segments {
            let FactValue::Group(map) = current else {
                return None;
            };
            current = map.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }
}
