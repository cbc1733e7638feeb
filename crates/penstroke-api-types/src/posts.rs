use serde::{Deserialize, Serialize};

/// Body accepted by `POST /api/post`.
///
/// This is also the validated form of a [`DraftPost`](crate::DraftPost):
/// every field is present and satisfied the draft schema when produced by
/// [`validate`](crate::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub preview: String,
    pub content: String,
    pub submitter_key: String,
}

/// Body returned by `POST /api/post` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub slug: String,
    pub title: String,
    pub preview: String,
    pub created_at: String,
}

/// Listing projection. Carries no post content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryView {
    pub slug: String,
    pub title: String,
    pub preview: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_uses_camel_case_keys() {
        let request = CreatePostRequest {
            title: "T".into(),
            preview: "P".into(),
            content: "C".into(),
            submitter_key: "secret".into(),
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["submitterKey"], "secret");
        assert!(value.get("submitter_key").is_none());
    }

    #[test]
    fn create_response_tolerates_extra_fields() {
        let body = r#"{"slug":"hello-world","title":"Hello","preview":"p","createdAt":"x","id":"ignored"}"#;
        let response: CreatePostResponse = serde_json::from_str(body).expect("deserialize");
        assert_eq!(response.slug, "hello-world");
    }
}
