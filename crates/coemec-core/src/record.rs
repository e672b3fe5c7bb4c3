//! Flat, name-keyed record of everything the user has typed so far.
//!
//! Each change event carries the input's kind, and the kind alone decides
//! how the raw value is stored. A later event for the same name replaces
//! the earlier value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// The HTML input kind a change event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    TextArea,
    Date,
    Tel,
    Radio,
    Number,
    Checkbox,
    File,
}

/// One entry from a file picker. Contents are never read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: Option<String>,
}

impl FileHandle {
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64, media_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: media_type.map(str::to_string),
        }
    }
}

/// Snapshot of a change event target: its name and kind plus whichever of
/// `value`, `checked` or `files` the kind makes meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEvent {
    pub name: String,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
    pub files: Vec<FileHandle>,
}

impl FieldEvent {
    #[must_use]
    pub fn with_kind(name: impl Into<String>, kind: InputKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            checked: false,
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_kind(name, InputKind::Text, value)
    }

    #[must_use]
    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_kind(name, InputKind::Number, value)
    }

    #[must_use]
    pub fn radio(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_kind(name, InputKind::Radio, value)
    }

    /// Checkbox change. Browsers report `"on"` as the value of an unvalued box.
    #[must_use]
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::with_kind(name, InputKind::Checkbox, "on")
        }
    }

    #[must_use]
    pub fn files(name: impl Into<String>, files: Vec<FileHandle>) -> Self {
        Self {
            files,
            ..Self::with_kind(name, InputKind::File, "")
        }
    }
}

/// A stored field value after kind-specific coercion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Files(Vec<FileHandle>),
    Text(String),
    /// A numeric input that has been cleared. Serializes as `""`.
    #[serde(skip)]
    Empty,
}

impl FieldValue {
    /// Apply the coercion rule for `event.kind`.
    ///
    /// Number inputs that are blank or hold text that does not parse store
    /// [`FieldValue::Empty`]; a browser number control reports `""` in both
    /// cases.
    #[must_use]
    pub fn coerce(event: &FieldEvent) -> Self {
        match event.kind {
            InputKind::Checkbox => Self::Bool(event.checked),
            InputKind::File => Self::Files(event.files.clone()),
            InputKind::Number => match event.value.trim() {
                "" => Self::Empty,
                raw => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map_or(Self::Empty, Self::Number),
            },
            InputKind::Text
            | InputKind::TextArea
            | InputKind::Date
            | InputKind::Tel
            | InputKind::Radio => Self::Text(event.value.clone()),
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Files(files) => files.serialize(serializer),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Empty => serializer.serialize_str(""),
        }
    }
}

/// Key under which a checklist option is stored, e.g. `necesidad_Agua`.
#[must_use]
pub fn option_key(prefix: &str, label: &str) -> String {
    format!("{prefix}_{label}")
}

/// Open-ended name → value record, last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFieldRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FormFieldRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce `event` and store it under `event.name`, returning the value
    /// it replaced.
    pub fn apply(&mut self, event: &FieldEvent) -> Option<FieldValue> {
        self.insert(event.name.clone(), FieldValue::coerce(event))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
