//! Declarative draft schema and the pure validation function built on it.
//!
//! A [`DraftSchema`] is plain data: one [`FieldConstraint`] per [`DraftField`].
//! It can be loaded from configuration, printed, and compared, and
//! [`validate`] is the only place that interprets it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::posts::CreatePostRequest;

const DEFAULT_TITLE_MAX_LEN: usize = 120;
const DEFAULT_PREVIEW_MAX_LEN: usize = 500;

/// Fields of a draft post, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Title,
    Preview,
    Content,
    SubmitterKey,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Title,
        DraftField::Preview,
        DraftField::Content,
        DraftField::SubmitterKey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Preview => "preview",
            DraftField::Content => "content",
            DraftField::SubmitterKey => "submitterKey",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint applied to a single string field.
///
/// Lengths are counted in Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConstraint {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    /// Strip surrounding whitespace before measuring and storing the value.
    pub trim: bool,
}

impl Default for FieldConstraint {
    fn default() -> Self {
        Self {
            required: true,
            min_len: None,
            max_len: None,
            trim: false,
        }
    }
}

impl FieldConstraint {
    pub fn required() -> Self {
        Self::default()
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    fn check(&self, value: Option<&str>, errors: &mut Vec<String>) -> Option<String> {
        let Some(raw) = value else {
            if self.required {
                errors.push("Required".to_string());
            }
            return None;
        };

        let value = if self.trim { raw.trim() } else { raw };
        let len = value.chars().count();

        if let Some(min) = self.min_len.filter(|min| len < *min) {
            errors.push(format!("String must contain at least {min} character(s)"));
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            errors.push(format!("String must contain at most {max} character(s)"));
        }

        Some(value.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("constraint for `{field}` has min_len {min} greater than max_len {max}")]
    InvertedBounds {
        field: DraftField,
        min: usize,
        max: usize,
    },
}

/// Constraints for every draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftSchema {
    fields: BTreeMap<DraftField, FieldConstraint>,
}

impl Default for DraftSchema {
    fn default() -> Self {
        let fields = BTreeMap::from([
            (
                DraftField::Title,
                FieldConstraint::required()
                    .min_len(1)
                    .max_len(DEFAULT_TITLE_MAX_LEN),
            ),
            (
                DraftField::Preview,
                FieldConstraint::required()
                    .min_len(1)
                    .max_len(DEFAULT_PREVIEW_MAX_LEN),
            ),
            (DraftField::Content, FieldConstraint::required().min_len(1)),
            (
                DraftField::SubmitterKey,
                FieldConstraint::required().min_len(1),
            ),
        ]);
        Self { fields }
    }
}

impl DraftSchema {
    /// Schema with no constraints at all; every field is optional.
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: DraftField, constraint: FieldConstraint) -> Self {
        self.fields.insert(field, constraint);
        self
    }

    pub fn constraint(&self, field: DraftField) -> Option<&FieldConstraint> {
        self.fields.get(&field)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (DraftField, &FieldConstraint)> {
        self.fields.iter().map(|(field, constraint)| (*field, constraint))
    }

    /// Replace the constraints named in `overrides`, keeping the rest.
    pub fn overlay(mut self, overrides: DraftSchema) -> Self {
        self.fields.extend(overrides.fields);
        self
    }

    /// Reject schemas that no value could ever satisfy.
    pub fn check(&self) -> Result<(), SchemaError> {
        for (field, constraint) in self.constraints() {
            if let (Some(min), Some(max)) = (constraint.min_len, constraint.max_len) {
                if min > max {
                    return Err(SchemaError::InvertedBounds { field, min, max });
                }
            }
        }
        Ok(())
    }
}

/// The unsaved, client-held candidate post. Every field is optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftPost {
    pub title: Option<String>,
    pub preview: Option<String>,
    pub content: Option<String>,
    pub submitter_key: Option<String>,
}

impl DraftPost {
    pub fn for_submitter(key: impl Into<String>) -> Self {
        Self {
            submitter_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::Title => self.title.as_deref(),
            DraftField::Preview => self.preview.as_deref(),
            DraftField::Content => self.content.as_deref(),
            DraftField::SubmitterKey => self.submitter_key.as_deref(),
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::Title => &mut self.title,
            DraftField::Preview => &mut self.preview,
            DraftField::Content => &mut self.content,
            DraftField::SubmitterKey => &mut self.submitter_key,
        };
        *slot = Some(value.into());
    }
}

impl From<CreatePostRequest> for DraftPost {
    fn from(request: CreatePostRequest) -> Self {
        Self {
            title: Some(request.title),
            preview: Some(request.preview),
            content: Some(request.content),
            submitter_key: Some(request.submitter_key),
        }
    }
}

/// Per-field validation messages, in the order the constraints were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<DraftField, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self, field: DraftField) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }

    /// An error set holding one message for one field.
    pub fn single(field: DraftField, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.record(field, vec![message.into()]);
        errors
    }

    fn record(&mut self, field: DraftField, messages: Vec<String>) {
        if !messages.is_empty() {
            self.0.insert(field, messages);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Parse a draft against the schema.
///
/// Either every field satisfies its constraint and the submittable request is
/// returned, or the full error set is returned. Fields without a constraint
/// are accepted as-is, with a missing value becoming an empty string.
pub fn validate(draft: &DraftPost, schema: &DraftSchema) -> Result<CreatePostRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut values: BTreeMap<DraftField, String> = BTreeMap::new();

    for field in DraftField::ALL {
        let raw = draft.get(field);
        let value = match schema.constraint(field) {
            Some(constraint) => {
                let mut messages = Vec::new();
                let value = constraint.check(raw, &mut messages);
                errors.record(field, messages);
                value
            }
            None => raw.map(str::to_string),
        };
        values.insert(field, value.unwrap_or_default());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut take = |field: DraftField| values.remove(&field).unwrap_or_default();
    Ok(CreatePostRequest {
        title: take(DraftField::Title),
        preview: take(DraftField::Preview),
        content: take(DraftField::Content),
        submitter_key: take(DraftField::SubmitterKey),
    })
}
