use time::{OffsetDateTime, UtcOffset, macros::format_description};
use uuid::Uuid;

use super::error::DomainError;

/// A stored post. Posts are written once and never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    pub fn created_at_http(&self) -> Result<String, DomainError> {
        http_date(self.created_at)
    }
}

/// A stored post without its content, as read for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummaryRecord {
    pub slug: String,
    pub title: String,
    pub preview: String,
    pub created_at: OffsetDateTime,
}

impl From<PostRecord> for PostSummaryRecord {
    fn from(record: PostRecord) -> Self {
        Self {
            slug: record.slug,
            title: record.title,
            preview: record.preview,
            created_at: record.created_at,
        }
    }
}

/// Format a timestamp the way HTTP dates are written: `Sun, 01 Jan 2023 00:00:00 GMT`.
pub fn http_date(at: OffsetDateTime) -> Result<String, DomainError> {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    at.to_offset(UtcOffset::UTC)
        .format(&format)
        .map_err(|err| DomainError::invariant(format!("timestamp `{at}` not formattable: {err}")))
}
