//! Pagination types: page requests, resume keys, continuation tokens, and
//! the paginated response envelope.
//!
//! The backing stores have no OFFSET. Every listing is a bounded range read
//! that starts just below a clustering key, so the position of a page is
//! carried as a [`ResumeKey`] and handed to clients as an opaque
//! [`ContinuationToken`].

use super::PaginationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clustering position of a row: a timestamp plus an integer tiebreaker.
///
/// Keys order by timestamp first, then by id. Listings run in descending
/// key order and resume strictly below the last key returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResumeKey {
    at: DateTime<Utc>,
    id: i32,
}

impl ResumeKey {
    /// Creates a resume key.
    #[must_use]
    pub const fn new(at: DateTime<Utc>, id: i32) -> Self {
        Self { at, id }
    }

    /// Returns the timestamp component.
    #[must_use]
    pub const fn at(self) -> DateTime<Utc> {
        self.at
    }

    /// Returns the tiebreaker component.
    #[must_use]
    pub const fn id(self) -> i32 {
        self.id
    }
}

/// Opaque marker for resuming a listing after the last row a client saw.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use duologue::messaging::domain::{ContinuationToken, ResumeKey};
///
/// let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("valid time");
/// let token = ContinuationToken::from_key(ResumeKey::new(at, 42));
/// let parsed: ContinuationToken = token.to_string().parse().expect("round trip");
/// assert_eq!(parsed.key(), ResumeKey::new(at, 42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContinuationToken(ResumeKey);

impl ContinuationToken {
    /// Wraps a resume key.
    #[must_use]
    pub const fn from_key(key: ResumeKey) -> Self {
        Self(key)
    }

    /// Returns the resume key.
    #[must_use]
    pub const fn key(self) -> ResumeKey {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.at.timestamp_micros(), self.0.id)
    }
}

impl FromStr for ContinuationToken {
    type Err = PaginationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || PaginationError::MalformedToken(raw.to_owned());
        let (micros, id) = raw.split_once('.').ok_or_else(malformed)?;
        let micros_value = micros.parse::<i64>().map_err(|_| malformed())?;
        let id_value = id.parse::<i32>().map_err(|_| malformed())?;
        let at = DateTime::from_timestamp_micros(micros_value).ok_or_else(malformed)?;
        Ok(Self(ResumeKey::new(at, id_value)))
    }
}

impl From<ContinuationToken> for String {
    fn from(token: ContinuationToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for ContinuationToken {
    type Error = PaginationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// A validated request for one page of a listing.
///
/// Pages are numbered from 1. When a continuation token is attached the
/// listing resumes directly from it and the page number is only echoed back
/// in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
    token: Option<ContinuationToken>,
}

impl PageRequest {
    /// Validates raw page and limit values.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] when `page < 1` (or too large
    /// to represent) and [`PaginationError::InvalidLimit`] when `limit < 1`.
    pub fn new(page: i64, limit: i64) -> Result<Self, PaginationError> {
        let valid_page = u32::try_from(page)
            .ok()
            .filter(|value| *value >= 1)
            .ok_or(PaginationError::InvalidPage(page))?;
        let valid_limit = u32::try_from(limit)
            .ok()
            .filter(|value| *value >= 1)
            .ok_or(PaginationError::InvalidLimit(limit))?;
        Ok(Self {
            page: valid_page,
            limit: valid_limit,
            token: None,
        })
    }

    /// Attaches a continuation token from a previous response.
    #[must_use]
    pub const fn resuming(mut self, token: ContinuationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the continuation token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<ContinuationToken> {
        self.token
    }

    /// Returns the request for the following page, resuming from `token`.
    #[must_use]
    pub const fn next(&self, token: ContinuationToken) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
            token: Some(token),
        }
    }
}

/// Best-effort row count for a partition or partition range.
///
/// Counting requires a partition scan; adapters stop after a configured cap
/// and report the result as inexact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalEstimate {
    /// Number of rows counted.
    pub count: u64,
    /// `false` when the scan stopped at the cap.
    pub exact: bool,
}

impl TotalEstimate {
    /// Interprets the result of a scan that read at most `cap + 1` rows.
    #[must_use]
    pub const fn from_bounded_scan(seen: u64, cap: u64) -> Self {
        if seen > cap {
            Self {
                count: cap,
                exact: false,
            }
        } else {
            Self {
                count: seen,
                exact: true,
            }
        }
    }
}

/// Paginated response envelope: `{total, page, limit, data, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Best-effort total number of rows in the listing.
    pub total: u64,
    /// Page number echoed from the request.
    pub page: u32,
    /// Page size echoed from the request.
    pub limit: u32,
    /// Rows on this page, newest first.
    pub data: Vec<T>,
    /// Whether `total` is an exact count.
    pub total_exact: bool,
    /// Token for the next page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<ContinuationToken>,
}

impl<T> Page<T> {
    /// Transforms every row, keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            page: self.page,
            limit: self.limit,
            data: self.data.into_iter().map(f).collect(),
            total_exact: self.total_exact,
            next_token: self.next_token,
        }
    }
}
