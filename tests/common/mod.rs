#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use spacetraveling::error::FetchError;
use spacetraveling::model::{Article, ContentBlock, ContinuationToken, ListEntry, ListPage};
use spacetraveling::prismic::ContentFetcher;
use spacetraveling::richtext::RichTextSpan;
use tokio::sync::Mutex;

pub fn entry(id: &str) -> ListEntry {
    ListEntry {
        id: id.to_string(),
        published_at: None,
        title: format!("Post {id}"),
        subtitle: format!("Subtitle {id}"),
        author: "Ana".to_string(),
    }
}

pub fn page(ids: &[&str], token: Option<&str>) -> ListPage {
    ListPage {
        entries: ids.iter().map(|id| entry(id)).collect(),
        continuation_token: token.map(ContinuationToken::from),
    }
}

pub fn article(id: &str, words: usize) -> Article {
    Article {
        id: id.to_string(),
        published_at: None,
        title: format!("Post {id}"),
        subtitle: String::new(),
        banner_url: None,
        author: "Ana".to_string(),
        content: vec![ContentBlock {
            heading: None,
            paragraphs: vec![RichTextSpan::paragraph(vec!["word"; words].join(" "))],
        }],
    }
}

/// Fake store: queued pages for `query`/`next`, a map of articles, and a log
/// of every call made.
#[derive(Clone, Default)]
pub struct RecordingFetcher {
    pages: Arc<Mutex<VecDeque<Result<ListPage, FetchError>>>>,
    articles: Arc<Mutex<HashMap<String, Article>>>,
    pub query_calls: Arc<Mutex<Vec<(u32, Option<u32>)>>>,
    pub next_calls: Arc<Mutex<Vec<String>>>,
    pub uid_calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingFetcher {
    pub fn with_pages(pages: Vec<Result<ListPage, FetchError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(VecDeque::from(pages))),
            ..Default::default()
        }
    }

    pub async fn add_article(&self, article: Article) {
        self.articles.lock().await.insert(article.id.clone(), article);
    }

    async fn pop_page(&self) -> Result<ListPage, FetchError> {
        let mut guard = self.pages.lock().await;
        guard.pop_front().unwrap_or_else(|| Ok(ListPage::default()))
    }

    pub async fn next_calls(&self) -> Vec<String> {
        self.next_calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ContentFetcher for RecordingFetcher {
    async fn query(&self, page_size: u32, page: Option<u32>) -> Result<ListPage, FetchError> {
        self.query_calls.lock().await.push((page_size, page));
        self.pop_page().await
    }

    async fn next(&self, token: &ContinuationToken) -> Result<ListPage, FetchError> {
        self.next_calls.lock().await.push(token.as_str().to_string());
        self.pop_page().await
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Article, FetchError> {
        self.uid_calls.lock().await.push(uid.to_string());
        self.articles
            .lock()
            .await
            .get(uid)
            .cloned()
            .ok_or_else(|| FetchError::NotFound { uid: uid.to_string() })
    }
}
