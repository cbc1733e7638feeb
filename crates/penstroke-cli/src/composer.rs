//! Draft composer: owns the draft being written and its current error set.
//!
//! Every edit revalidates the whole draft synchronously. There is no
//! debouncing and no incremental diffing of errors.

use penstroke_api_types::{
    CreatePostRequest, DraftField, DraftPost, DraftSchema, FieldErrors, validate,
};

/// Draft fields the user may edit. The submitter key is pre-filled and fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Title,
    Preview,
    Content,
}

impl From<EditableField> for DraftField {
    fn from(field: EditableField) -> Self {
        match field {
            EditableField::Title => DraftField::Title,
            EditableField::Preview => DraftField::Preview,
            EditableField::Content => DraftField::Content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Composer {
    schema: DraftSchema,
    draft: DraftPost,
    errors: Option<FieldErrors>,
}

impl Composer {
    /// Start an empty draft for an already-verified submitter key.
    pub fn new(submitter_key: impl Into<String>, schema: DraftSchema) -> Self {
        let mut composer = Self {
            schema,
            draft: DraftPost::for_submitter(submitter_key),
            errors: None,
        };
        composer.revalidate();
        composer
    }

    pub fn update_field(&mut self, field: EditableField, value: impl Into<String>) {
        self.draft.set(field.into(), value);
        self.revalidate();
    }

    pub fn draft(&self) -> &DraftPost {
        &self.draft
    }

    pub fn schema(&self) -> &DraftSchema {
        &self.schema
    }

    /// Current error set; `None` when the draft satisfies the schema.
    pub fn errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Error lines for one field, one per message, in validator order.
    pub fn error_lines(&self, field: DraftField) -> Vec<String> {
        self.errors
            .as_ref()
            .map(|errors| {
                errors
                    .messages(field)
                    .iter()
                    .map(|message| format!("• {message}"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The submittable form of the draft, when it validates.
    pub fn request(&self) -> Option<CreatePostRequest> {
        if self.errors.is_some() {
            return None;
        }
        validate(&self.draft, &self.schema).ok()
    }

    fn revalidate(&mut self) {
        self.errors = validate(&self.draft, &self.schema).err();
    }
}
