use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::richtext::RichTextSpan;

/// Opaque continuation marker handed out by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(pub String);

impl ContinuationToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContinuationToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Summary of a post as shown on the list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// One page of list results. `continuation_token == None` means no further pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    pub entries: Vec<ListEntry>,
    pub continuation_token: Option<ContinuationToken>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: Option<String>,
    pub paragraphs: Vec<RichTextSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub content: Vec<ContentBlock>,
}
