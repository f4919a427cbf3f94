use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::config::PrismicConfig;
use crate::error::FetchError;
use crate::model::{Article, ContinuationToken, ListPage};
use crate::prismic::model::{ApiInfo, SearchResponse};

pub mod model;

const PUBLICATION_ORDERING: &str = "[document.first_publication_date desc]";

/// Read access to the content store, as needed by the list and article views.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// One page of posts, newest first. `page` is 1-based; `None` means the first.
    async fn query(&self, page_size: u32, page: Option<u32>) -> Result<ListPage, FetchError>;

    /// Resolve a continuation token handed out by a previous page.
    async fn next(&self, token: &ContinuationToken) -> Result<ListPage, FetchError>;

    async fn get_by_uid(&self, uid: &str) -> Result<Article, FetchError>;
}

#[derive(Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
}

impl fmt::Debug for PrismicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismicClient")
            .field("endpoint", &self.endpoint)
            .field("document_type", &self.document_type)
            .finish_non_exhaustive()
    }
}

/// Parameters of a `documents/search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub predicate: String,
    pub orderings: Option<&'static str>,
    pub page_size: u32,
    pub page: Option<u32>,
}

impl PrismicClient {
    pub fn from_config(cfg: &PrismicConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(cfg.endpoint.trim()).context("invalid Prismic endpoint")?;
        Self::with_endpoint(
            endpoint,
            cfg.token().map(str::to_string),
            cfg.document_type.clone(),
        )
    }

    pub fn with_endpoint(
        mut endpoint: Url,
        access_token: Option<String>,
        document_type: String,
    ) -> anyhow::Result<Self> {
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let http = Client::builder()
            .user_agent("spacetraveling/0.1")
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            access_token,
            document_type,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn type_predicate(&self) -> String {
        format!("[[at(document.type, \"{}\")]]", self.document_type)
    }

    pub fn uid_predicate(&self, uid: &str) -> String {
        format!(
            "[[at(my.{}.uid, \"{}\")]]",
            self.document_type,
            uid.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }

    pub fn build_api_request(&self) -> Result<reqwest::Request, FetchError> {
        let mut url = self.endpoint.clone();
        self.append_token(&mut url);
        Ok(self.http.get(url).header("Accept", "application/json").build()?)
    }

    pub fn build_search_request(
        &self,
        master_ref: &str,
        query: &SearchQuery,
    ) -> Result<reqwest::Request, FetchError> {
        let mut url = self
            .endpoint
            .join("documents/search")
            .map_err(|e| FetchError::Endpoint(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", master_ref);
            pairs.append_pair("q", &query.predicate);
            if let Some(orderings) = query.orderings {
                pairs.append_pair("orderings", orderings);
            }
            pairs.append_pair("pageSize", &query.page_size.to_string());
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
        }
        self.append_token(&mut url);
        Ok(self.http.get(url).header("Accept", "application/json").build()?)
    }

    /// Continuation tokens are `next_page` URLs. Only URLs on the configured
    /// host are followed, so the access token never leaves the repository.
    pub fn build_next_request(
        &self,
        token: &ContinuationToken,
    ) -> Result<reqwest::Request, FetchError> {
        let mut url = Url::parse(token.as_str())
            .map_err(|_| FetchError::ForeignToken(token.as_str().to_string()))?;
        if url.scheme() != self.endpoint.scheme()
            || url.host_str() != self.endpoint.host_str()
            || url.port_or_known_default() != self.endpoint.port_or_known_default()
        {
            return Err(FetchError::ForeignToken(token.as_str().to_string()));
        }
        if !url.query_pairs().any(|(k, _)| k == "access_token") {
            self.append_token(&mut url);
        }
        Ok(self.http.get(url).header("Accept", "application/json").build()?)
    }

    fn append_token(&self, url: &mut Url) {
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, FetchError> {
        // The query string may carry the access token; log the path only.
        debug!(path = %request.url().path(), "sending prismic request");
        let res = self.http.execute(request).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "prismic request failed");
            return Err(FetchError::Status { status, body });
        }
        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip_all)]
    pub async fn master_ref(&self) -> Result<String, FetchError> {
        let info: ApiInfo = self.execute(self.build_api_request()?).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(FetchError::NoMasterRef)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, FetchError> {
        let master_ref = self.master_ref().await?;
        let request = self.build_search_request(&master_ref, query)?;
        self.execute(request).await
    }

    pub fn list_query(&self, page_size: u32, page: Option<u32>) -> SearchQuery {
        SearchQuery {
            predicate: self.type_predicate(),
            orderings: Some(PUBLICATION_ORDERING),
            page_size,
            page,
        }
    }
}

#[async_trait]
impl ContentFetcher for PrismicClient {
    #[instrument(skip(self))]
    async fn query(&self, page_size: u32, page: Option<u32>) -> Result<ListPage, FetchError> {
        let resp = self.search(&self.list_query(page_size, page)).await?;
        debug!(page = resp.page, total_pages = resp.total_pages, "fetched list page");
        Ok(resp.into_list_page())
    }

    #[instrument(skip_all)]
    async fn next(&self, token: &ContinuationToken) -> Result<ListPage, FetchError> {
        let request = self.build_next_request(token)?;
        let resp: SearchResponse = self.execute(request).await?;
        debug!(page = resp.page, total_pages = resp.total_pages, "fetched continuation page");
        Ok(resp.into_list_page())
    }

    #[instrument(skip(self))]
    async fn get_by_uid(&self, uid: &str) -> Result<Article, FetchError> {
        let query = SearchQuery {
            predicate: self.uid_predicate(uid),
            orderings: None,
            page_size: 1,
            page: None,
        };
        let resp = self.search(&query).await?;
        resp.results
            .into_iter()
            .next()
            .map(model::Document::into_article)
            .ok_or_else(|| FetchError::NotFound { uid: uid.to_string() })
    }
}
