use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outbound email message value object.
///
/// Built once per successful submission, handed to the dispatcher, then dropped.
/// Each dispatch owns its notification exclusively; nothing is shared or retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub recipients: Vec<String>,
    pub body_text: String,
    pub body_html: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        recipients: Vec<String>,
        body_text: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            recipients,
            body_text: body_text.into(),
            body_html: body_html.into(),
            created_at: Utc::now(),
        }
    }
}
