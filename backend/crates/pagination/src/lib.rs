//! Page-number pagination primitives shared by storefront endpoints.
//!
//! [`PageRequest`] validates the `page` and `limit` query parameters a client
//! sends, [`Page`] carries one slice of results together with the total match
//! count, and [`PageEnvelope`] is the serialised `{ items, pagination }` shape
//! returned over HTTP.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 12;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// The page size is zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The page size exceeds [`MAX_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// The maximum accepted page size.
        max: u32,
    },
}

/// A validated request for one page of results.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(Some(3), Some(20))?;
/// assert_eq!(request.offset(), 40);
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from optional client-supplied values.
    ///
    /// Missing values fall back to page one and [`DEFAULT_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is zero or the limit is
    /// larger than [`MAX_LIMIT`].
    pub const fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => 1,
        };
        let limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the information needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Wrap the items fetched for `request` alongside the total match count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// Cut the requested page out of an already filtered and ordered list.
    #[must_use]
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, total, request)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total number of matches across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Number of pages needed to show every match.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.request.limit as u64)
    }

    /// Transform every item while keeping the paging information.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Navigation metadata serialised next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matches.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Number of pages needed to show every match.
    pub total_pages: u64,
}

/// Wire shape for a page of results.
///
/// # Examples
/// ```
/// use pagination::{Page, PageEnvelope, PageRequest};
///
/// let page = Page::new(vec!["a", "b"], 5, PageRequest::new(Some(1), Some(2))?);
/// let envelope = PageEnvelope::from(page);
/// assert_eq!(envelope.pagination.total_pages, 3);
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Navigation metadata.
    pub pagination: PageMeta,
}

impl<T> From<Page<T>> for PageEnvelope<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = PageMeta {
            total: page.total,
            page: page.request.page,
            limit: page.request.limit,
            total_pages: page.total_pages(),
        };
        Self {
            items: page.items,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page requests and envelopes.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_LIMIT)]
    #[case(Some(2), None, 2, DEFAULT_LIMIT)]
    #[case(None, Some(MAX_LIMIT), 1, MAX_LIMIT)]
    fn new_applies_defaults(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::new(page, limit).expect("valid request");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::ZeroPage)]
    #[case(None, Some(0), PageRequestError::ZeroLimit)]
    #[case(None, Some(MAX_LIMIT + 1), PageRequestError::LimitTooLarge { max: MAX_LIMIT })]
    fn new_rejects_out_of_range_values(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, limit), Err(expected));
    }

    #[rstest]
    fn from_sorted_slices_requested_window() {
        let request = PageRequest::new(Some(2), Some(3)).expect("valid request");
        let page = Page::from_sorted((1..=8).collect::<Vec<u32>>(), request);
        assert_eq!(page.items(), &[4, 5, 6]);
        assert_eq!(page.total(), 8);
        assert_eq!(page.total_pages(), 3);
    }

    #[rstest]
    fn from_sorted_past_the_end_is_empty() {
        let request = PageRequest::new(Some(5), Some(3)).expect("valid request");
        let page = Page::from_sorted(vec![1, 2], request);
        assert!(page.items().is_empty());
        assert_eq!(page.total(), 2);
    }

    #[rstest]
    fn envelope_serialises_camel_case_metadata() {
        let request = PageRequest::new(Some(1), Some(2)).expect("valid request");
        let envelope = PageEnvelope::from(Page::new(vec!["a"], 0, request).map(str::to_owned));
        let value = serde_json::to_value(&envelope).expect("serialise envelope");
        assert_eq!(value["pagination"]["totalPages"], 0);
        assert_eq!(value["pagination"]["limit"], 2);
        assert_eq!(value["items"][0], "a");
    }
}
