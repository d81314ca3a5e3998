//! Page walking over bounded, resumable range reads.
//!
//! Stores in this model have no OFFSET. A page is reached either by one
//! bounded read from a continuation token, or by walking the preceding
//! pages in `limit`-sized chunks and carrying the last clustering key
//! forward. No read ever asks for more than `limit + 1` rows.

use std::future::Future;

use crate::messaging::domain::{ContinuationToken, PageRequest, ResumeKey};
use crate::messaging::ports::StoreResult;

/// Rows for one page plus the token for the page after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageSlice<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) next_token: Option<ContinuationToken>,
}

impl<T> PageSlice<T> {
    const fn empty() -> Self {
        Self {
            rows: Vec::new(),
            next_token: None,
        }
    }
}

fn row_budget(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Reads the page described by `request`.
///
/// `read(resume, limit)` must return at most `limit` rows strictly below
/// `resume` (or from the top when `resume` is `None`) in descending key
/// order. `key_of` extracts a row's clustering key.
pub(crate) async fn fetch_page<T, K, R, Fut>(
    request: PageRequest,
    key_of: K,
    mut read: R,
) -> StoreResult<PageSlice<T>>
where
    K: Fn(&T) -> ResumeKey,
    R: FnMut(Option<ResumeKey>, u32) -> Fut,
    Fut: Future<Output = StoreResult<Vec<T>>>,
{
    let limit = request.limit();
    let mut resume = request.token().map(ContinuationToken::key);

    if resume.is_none() {
        for _ in 1..request.page() {
            let chunk = read(resume, limit).await?;
            if chunk.len() < row_budget(limit) {
                return Ok(PageSlice::empty());
            }
            resume = chunk.last().map(&key_of);
        }
    }

    let mut rows = read(resume, limit.saturating_add(1)).await?;
    let next_token = if rows.len() > row_budget(limit) {
        rows.truncate(row_budget(limit));
        rows.last().map(|row| ContinuationToken::from_key(key_of(row)))
    } else {
        None
    };
    Ok(PageSlice { rows, next_token })
}
