//! Incremental accumulation of list pages.
//!
//! A `PaginationState` only ever grows: entries are appended in the order the
//! store delivers them, ids already seen are dropped, and once the store says
//! there is no next page the state stays exhausted. At most one continuation
//! fetch is outstanding at a time (`pending`).
use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::model::{ContinuationToken, ListEntry, ListPage};
use crate::prismic::ContentFetcher;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page for token {0:?} arrived after the state moved on")]
pub struct StalePage(pub ContinuationToken);

/// Result of one user-triggered "load more".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// No continuation token left; nothing was fetched.
    Exhausted,
    /// Another continuation fetch is already pending; nothing was fetched.
    InFlight,
    /// A page was fetched and this many new entries were appended.
    Appended(usize),
}

#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    accumulated: Vec<ListEntry>,
    seen: HashSet<String>,
    continuation_token: Option<ContinuationToken>,
    pending: Option<ContinuationToken>,
}

impl PaginationState {
    pub fn initialize(first_page: ListPage) -> Self {
        let mut state = Self {
            continuation_token: first_page.continuation_token,
            ..Default::default()
        };
        state.append(first_page.entries);
        state
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.accumulated
    }

    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref()
    }

    pub fn pending(&self) -> Option<&ContinuationToken> {
        self.pending.as_ref()
    }

    /// Whether the view should offer a "load more" trigger.
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }

    /// Mark the current continuation token as pending and hand it to the
    /// caller for fetching. Returns `None` when exhausted or when a fetch is
    /// already pending; re-entrant calls are ignored, not queued.
    pub fn request_more(&mut self) -> Option<ContinuationToken> {
        if self.pending.is_some() {
            return None;
        }
        let token = self.continuation_token.clone()?;
        self.pending = Some(token.clone());
        Some(token)
    }

    /// Merge a fetched page and clear `pending`. Returns how many entries were
    /// new.
    pub fn apply_page(&mut self, page: ListPage) -> usize {
        let added = self.append(page.entries);
        if self.continuation_token.is_some() {
            self.continuation_token = page.continuation_token;
        }
        self.pending = None;
        added
    }

    /// Apply `page` only if it answers the request still pending for `token`.
    pub fn resolve(
        &mut self,
        token: &ContinuationToken,
        page: ListPage,
    ) -> Result<usize, StalePage> {
        if self.pending.as_ref() != Some(token) {
            return Err(StalePage(token.clone()));
        }
        Ok(self.apply_page(page))
    }

    /// Drop the pending mark after a failed fetch so the same token can be
    /// requested again. Returns false if `token` was not the pending one.
    pub fn abandon(&mut self, token: &ContinuationToken) -> bool {
        if self.pending.as_ref() == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn append(&mut self, entries: Vec<ListEntry>) -> usize {
        let before = self.accumulated.len();
        for entry in entries {
            if self.seen.insert(entry.id.clone()) {
                self.accumulated.push(entry);
            } else {
                debug!(id = %entry.id, "dropping duplicate list entry");
            }
        }
        self.accumulated.len() - before
    }
}

/// Fetch and merge the next page, once per call.
#[instrument(skip_all)]
pub async fn load_more<F>(
    state: &mut PaginationState,
    fetcher: &F,
) -> Result<LoadMore, FetchError>
where
    F: ContentFetcher + ?Sized,
{
    if state.pending().is_some() {
        return Ok(LoadMore::InFlight);
    }
    let Some(token) = state.request_more() else {
        return Ok(LoadMore::Exhausted);
    };

    match fetcher.next(&token).await {
        Ok(page) => match state.resolve(&token, page) {
            Ok(added) => {
                debug!(added, total = state.entries().len(), "merged continuation page");
                Ok(LoadMore::Appended(added))
            }
            Err(stale) => {
                warn!(%stale, "discarding continuation page");
                Ok(LoadMore::Appended(0))
            }
        },
        Err(err) => {
            state.abandon(&token);
            Err(err)
        }
    }
}
