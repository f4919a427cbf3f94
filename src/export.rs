//! Static export: every list page as the reader would see it after each
//! "load more", plus one page per listed post.
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::error::FetchError;
use crate::paginator::{load_more, PaginationState};
use crate::prismic::ContentFetcher;
use crate::reading_time;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub list_pages: usize,
    pub posts: usize,
    pub missing: usize,
}

pub fn list_page_name(n: usize) -> String {
    if n <= 1 {
        "index.html".to_string()
    } else {
        format!("page-{}.html", n)
    }
}

#[instrument(skip(fetcher))]
pub async fn export_site<F>(
    fetcher: &F,
    out_dir: &Path,
    page_size: u32,
    concurrency: usize,
) -> Result<ExportSummary>
where
    F: ContentFetcher + ?Sized,
{
    let post_dir = out_dir.join("post");
    tokio::fs::create_dir_all(&post_dir)
        .await
        .with_context(|| format!("failed to create {}", post_dir.display()))?;

    let first = fetcher
        .query(page_size, None)
        .await
        .context("failed to fetch first list page")?;
    let mut state = PaginationState::initialize(first);

    // Tokens already followed; seeing one again means the store is cycling.
    let mut followed = HashSet::new();
    let mut n = 1;
    loop {
        let next_href = state.has_more().then(|| list_page_name(n + 1));
        let html = render::render_list(state.entries(), next_href.as_deref());
        write(&out_dir.join(list_page_name(n)), html).await?;
        let Some(previous) = state.continuation_token().cloned() else {
            break;
        };
        followed.insert(previous);
        load_more(&mut state, fetcher)
            .await
            .with_context(|| format!("failed to load list page {}", n + 1))?;
        n += 1;
        if state.continuation_token().is_some_and(|t| followed.contains(t)) {
            warn!(page = n, "content store repeated a continuation token; stopping");
            let html = render::render_list(state.entries(), None);
            write(&out_dir.join(list_page_name(n)), html).await?;
            break;
        }
    }

    let mut posts = 0;
    let mut missing = 0;
    let mut fetched = stream::iter(state.entries().iter().map(|e| e.id.clone()))
        .map(|id| async move {
            let res = fetcher.get_by_uid(&id).await;
            (id, res)
        })
        .buffered(concurrency.max(1));

    while let Some((id, res)) = fetched.next().await {
        match res {
            Ok(article) => {
                let reading = reading_time::estimate(&article);
                let html = render::render_article(&article, reading);
                write(&out_dir.join(render::post_path(&id)), html).await?;
                posts += 1;
            }
            Err(FetchError::NotFound { uid }) => {
                warn!(%uid, "listed post no longer exists; skipping");
                missing += 1;
            }
            Err(err) => return Err(err).with_context(|| format!("failed to fetch post {}", id)),
        }
    }

    info!(list_pages = n, posts, missing, "export finished");
    Ok(ExportSummary {
        list_pages: n,
        posts,
        missing,
    })
}

async fn write(path: &Path, html: String) -> Result<()> {
    tokio::fs::write(path, html)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
