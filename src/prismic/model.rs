//! Wire shapes of the Prismic REST API (v2) and their mapping onto the
//! domain model. Documents missing fields are defaulted, never rejected.
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{Article, ContentBlock, ContinuationToken, ListEntry, ListPage};
use crate::richtext::{self, RichTextSpan};

#[derive(Deserialize, Debug)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Deserialize, Debug)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    pub results: Vec<Document>,
}

impl SearchResponse {
    pub fn into_list_page(self) -> ListPage {
        ListPage {
            entries: self.results.into_iter().map(Document::into_list_entry).collect(),
            continuation_token: self
                .next_page
                .filter(|url| !url.trim().is_empty())
                .map(ContinuationToken),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

#[derive(Deserialize, Debug, Default)]
pub struct PostData {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub subtitle: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub banner: Option<Banner>,
    #[serde(default)]
    pub content: Option<Vec<RawBlock>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RawBlock {
    #[serde(default)]
    pub heading: Option<Value>,
    #[serde(default)]
    pub body: Option<Vec<RichTextSpan>>,
}

impl Document {
    /// The `uid` is the public identity of a post; fall back to the
    /// document id when a post was published without one.
    pub fn key(&self) -> String {
        self.uid
            .as_deref()
            .filter(|uid| !uid.trim().is_empty())
            .unwrap_or(&self.id)
            .to_string()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.first_publication_date.as_deref()?;
        let parsed = parse_publication_date(raw);
        if parsed.is_none() {
            warn!(id = %self.id, raw, "unparseable first_publication_date");
        }
        parsed
    }

    pub fn into_list_entry(self) -> ListEntry {
        ListEntry {
            id: self.key(),
            published_at: self.published_at(),
            title: field_text(self.data.title.as_ref()),
            subtitle: field_text(self.data.subtitle.as_ref()),
            author: field_text(self.data.author.as_ref()),
        }
    }

    pub fn into_article(self) -> Article {
        let id = self.key();
        let published_at = self.published_at();
        let data = self.data;
        let content = data
            .content
            .unwrap_or_default()
            .into_iter()
            .map(|block| ContentBlock {
                heading: block
                    .heading
                    .as_ref()
                    .map(|h| field_text(Some(h)))
                    .filter(|h| !h.is_empty()),
                paragraphs: block.body.unwrap_or_default(),
            })
            .collect();
        Article {
            id,
            published_at,
            title: field_text(data.title.as_ref()),
            subtitle: field_text(data.subtitle.as_ref()),
            banner_url: data
                .banner
                .and_then(|b| b.url)
                .filter(|url| !url.is_empty()),
            author: field_text(data.author.as_ref()),
            content,
        }
    }
}

/// Prismic sends offsets without a colon (`2021-03-15T19:25:28+0000`).
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Key-text fields arrive as strings; older models store them as rich text.
fn field_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(_)) => v
            .cloned()
            .and_then(|arr| serde_json::from_value::<Vec<RichTextSpan>>(arr).ok())
            .map(|units| richtext::as_text(&units))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_search() -> Value {
        json!({
            "page": 1,
            "results_per_page": 3,
            "total_pages": 2,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?ref=X&page=2&pageSize=3",
            "results": [
                {
                    "id": "YFH1",
                    "uid": "como-utilizar-hooks",
                    "type": "post",
                    "first_publication_date": "2021-03-15T19:25:28+0000",
                    "data": {
                        "title": "Como utilizar Hooks",
                        "subtitle": "Pensando em sincronização",
                        "author": "Joseph Oliveira"
                    }
                },
                { "id": "YFH2", "type": "post", "data": {} }
            ]
        })
    }

    #[test]
    fn search_response_maps_to_list_page() {
        let resp: SearchResponse = serde_json::from_value(sample_search()).unwrap();
        assert_eq!(resp.total_pages, 2);
        let page = resp.into_list_page();
        assert_eq!(page.entries.len(), 2);
        let first = &page.entries[0];
        assert_eq!(first.id, "como-utilizar-hooks");
        assert_eq!(first.author, "Joseph Oliveira");
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
        let second = &page.entries[1];
        assert_eq!(second.id, "YFH2");
        assert_eq!(second.title, "");
        assert!(second.published_at.is_none());
        assert!(page.continuation_token.unwrap().as_str().contains("page=2"));
    }

    #[test]
    fn null_next_page_ends_pagination() {
        let resp: SearchResponse =
            serde_json::from_value(json!({ "next_page": null, "results": [] })).unwrap();
        assert!(resp.into_list_page().continuation_token.is_none());
    }

    #[test]
    fn article_keeps_block_order_and_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "id": "X1",
            "uid": "post-1",
            "first_publication_date": "2021-03-25T19:27:35+00:00",
            "data": {
                "title": "Title",
                "banner": { "url": "https://images.prismic.io/banner.png" },
                "author": "Ana",
                "content": [
                    { "heading": "First", "body": [{ "type": "paragraph", "text": "one", "spans": [] }] },
                    { "heading": null, "body": [] },
                    { "heading": "Third" }
                ]
            }
        }))
        .unwrap();
        let article = doc.into_article();
        assert_eq!(article.id, "post-1");
        assert_eq!(article.subtitle, "");
        assert_eq!(article.banner_url.as_deref(), Some("https://images.prismic.io/banner.png"));
        let headings: Vec<_> = article.content.iter().map(|b| b.heading.clone()).collect();
        assert_eq!(
            headings,
            vec![Some("First".to_string()), None, Some("Third".to_string())]
        );
        assert_eq!(article.content[0].paragraphs[0].text, "one");
        assert!(article.content[2].paragraphs.is_empty());
    }

    #[test]
    fn missing_content_is_empty() {
        let doc: Document =
            serde_json::from_value(json!({ "id": "X2", "data": { "title": "t" } })).unwrap();
        assert!(doc.into_article().content.is_empty());
    }

    #[test]
    fn rich_text_title_is_flattened() {
        let doc: Document = serde_json::from_value(json!({
            "id": "X3",
            "data": { "title": [{ "type": "heading1", "text": "Rich", "spans": [] }] }
        }))
        .unwrap();
        assert_eq!(doc.into_list_entry().title, "Rich");
    }

    #[test]
    fn master_ref_is_selected() {
        let info: ApiInfo = serde_json::from_value(json!({
            "refs": [
                { "id": "preview", "ref": "P", "isMasterRef": false },
                { "id": "master", "ref": "M", "isMasterRef": true }
            ]
        }))
        .unwrap();
        assert_eq!(info.master_ref(), Some("M"));
    }

    #[test]
    fn refs_and_documents_need_only_mapped_fields() {
        let info: ApiInfo =
            serde_json::from_value(json!({ "refs": [{ "ref": "M", "isMasterRef": true }] }))
                .unwrap();
        assert_eq!(info.master_ref(), Some("M"));

        let doc: Document = serde_json::from_value(json!({ "id": "X4" })).unwrap();
        assert_eq!(doc.into_list_entry().id, "X4");
    }

    #[test]
    fn parse_publication_date_variants() {
        assert!(parse_publication_date("2021-03-15T19:25:28+0000").is_some());
        assert!(parse_publication_date("2021-03-15T19:25:28Z").is_some());
        assert!(parse_publication_date("yesterday").is_none());
    }
}
