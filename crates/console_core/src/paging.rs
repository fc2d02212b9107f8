use std::collections::BTreeMap;

use shared::protocol::ListEnvelope;

use crate::error::ValidationError;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Page sizes offered to operators.
pub const PAGE_LIMIT_CHOICES: [u32; 4] = [10, 25, 50, 100];

/// Paging, filtering and sorting parameters for one list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
    filters: BTreeMap<String, String>,
    sort: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            filters: BTreeMap::new(),
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        let mut request = Self::default();
        request.set_limit(limit)?;
        request.set_page(page)?;
        Ok(request)
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.apply_filters(FilterPatch::new().set(key, value));
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        self.page = page;
        Ok(())
    }

    /// Changing the page size always returns to the first page.
    pub fn set_limit(&mut self, limit: u32) -> Result<(), ValidationError> {
        if limit == 0 {
            return Err(ValidationError::InvalidLimit);
        }
        self.limit = limit;
        self.page = 1;
        Ok(())
    }

    /// Merges `patch` into the active filters and returns to the first page.
    pub fn apply_filters(&mut self, patch: FilterPatch) {
        for (key, value) in patch.entries {
            match value {
                Some(value) if !value.is_empty() => {
                    self.filters.insert(key, value);
                }
                _ => {
                    self.filters.remove(&key);
                }
            }
        }
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<String>) {
        self.sort = sort.filter(|value| !value.is_empty());
        self.page = 1;
    }

    /// Query pairs in wire order: `page`, `limit`, filters, then `sort`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        pairs
    }
}

/// Partial filter update. `None` (or an empty value) removes the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    entries: BTreeMap<String, Option<String>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), Some(value.into()));
        self
    }

    pub fn clear(mut self, key: impl Into<String>) -> Self {
        self.entries.insert(key.into(), None);
        self
    }

    pub fn maybe(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self.clear(key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One page of a list resource, replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl<T> PageResult<T> {
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page(),
            limit: request.limit(),
            total_pages: 0,
        }
    }

    /// Builds the page from a list envelope. Without a `pagination` block the
    /// returned items are taken as the whole result set.
    pub fn from_envelope(envelope: ListEnvelope<T>, request: &PageRequest) -> Self {
        let ListEnvelope { data, pagination } = envelope;
        let (total, page, limit) = match pagination {
            Some(pagination) => (
                pagination.total,
                pagination.page.max(1),
                if pagination.limit == 0 {
                    request.limit()
                } else {
                    pagination.limit
                },
            ),
            None => (data.len() as u64, request.page(), request.limit()),
        };
        Self {
            items: data,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based inclusive bounds of the rows shown, as in "Showing 11 to 20 of 25".
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let first = u64::from(self.page - 1) * u64::from(self.limit) + 1;
        let last = (u64::from(self.page) * u64::from(self.limit)).min(self.total);
        Some((first, last.max(first)))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::Pagination;

    use super::*;

    #[test]
    fn filter_and_limit_changes_return_to_first_page() {
        let mut request = PageRequest::default();
        request.set_page(3).expect("page");
        request.apply_filters(FilterPatch::new().set("name", "x"));
        assert_eq!(request.page(), 1);
        assert_eq!(request.filter("name"), Some("x"));

        request.set_page(4).expect("page");
        request.set_limit(25).expect("limit");
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn rejects_non_positive_paging() {
        let mut request = PageRequest::default();
        assert_eq!(request.set_page(0), Err(ValidationError::InvalidPage));
        assert_eq!(request.set_limit(0), Err(ValidationError::InvalidLimit));
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn empty_filter_values_are_omitted_from_query() {
        let mut request = PageRequest::default().with_sort("asc");
        request.apply_filters(
            FilterPatch::new()
                .set("serviceType", "")
                .set("status", "open"),
        );
        assert_eq!(
            request.query_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("status".to_string(), "open".to_string()),
                ("sort".to_string(), "asc".to_string()),
            ]
        );
        request.apply_filters(FilterPatch::new().clear("status"));
        assert!(request.filters().is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn beyond_last_page_is_an_empty_page_not_an_error() {
        let request = PageRequest::new(4, 10).expect("request");
        let page = PageResult::<u32>::from_envelope(
            ListEnvelope {
                data: Vec::new(),
                pagination: Some(Pagination {
                    page: 4,
                    limit: 10,
                    total: 25,
                    total_pages: 3,
                }),
            },
            &request,
        );
        assert!(page.is_empty());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.showing_range(), None);
        assert!(!page.has_next());
    }

    #[test]
    fn missing_pagination_is_derived_from_request() {
        let request = PageRequest::default();
        let page = PageResult::from_envelope(
            ListEnvelope {
                data: vec![1, 2, 3],
                pagination: None,
            },
            &request,
        );
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.showing_range(), Some((1, 3)));
    }
}
