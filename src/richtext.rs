//! Prismic structured text and its plain-text projection.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured-text unit (paragraph, list item, preformatted block...).
/// Inline formatting lives in `spans` and is ignored by the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextSpan {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Value>,
}

impl RichTextSpan {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.into(),
            spans: Vec::new(),
        }
    }
}

/// Projection of a formatted unit to the text a reader sees.
pub trait PlainText {
    fn plain_text(&self) -> &str;
}

impl PlainText for RichTextSpan {
    fn plain_text(&self) -> &str {
        // Embeds and images carry no `text`; they project to nothing.
        &self.text
    }
}

/// Join the plain text of every unit, one line per unit.
pub fn as_text<T: PlainText>(units: &[T]) -> String {
    units
        .iter()
        .map(PlainText::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}
