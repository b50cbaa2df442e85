//! List filter state and query-string construction.
//!
//! A [`FilterState`] is the set of user-adjustable parameters behind a list
//! view. Only values that differ from their defaults are sent to the
//! backend: an empty search, the default sort, the `all` sentinel for
//! status/category, and page 1 are all omitted.

use serde::Serialize;

/// Sentinel meaning "no restriction" for status and category selects.
pub const FILTER_ALL: &str = "all";

/// Sort key used when the user has not picked one.
pub const DEFAULT_SORT: &str = "recent";

/// Known sort keys for catalog lists.
pub const SORT_KEYS: &[&str] = &[DEFAULT_SORT, "popular", "price_asc", "price_desc", "title"];

/// First page number; pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

/// User-adjustable list parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub search: String,
    pub sort: String,
    pub status: String,
    pub category: String,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: DEFAULT_SORT.to_string(),
            status: FILTER_ALL.to_string(),
            category: FILTER_ALL.to_string(),
            page: FIRST_PAGE,
        }
    }
}

/// A single edit to a [`FilterState`], as produced by one form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    Sort(String),
    Status(String),
    Category(String),
    Page(u32),
    /// Restore every parameter to its default.
    Reset,
}

impl FilterChange {
    /// Free-text edits arrive once per keystroke and are debounced.
    pub fn is_debounced(&self) -> bool {
        matches!(self, FilterChange::Search(_))
    }
}

impl FilterState {
    /// Filter pinned to a single category, everything else at defaults.
    pub fn for_category(category: impl ToString) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    /// Filter pinned to a single status, everything else at defaults.
    pub fn for_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Apply one change. Any change other than a page change resets the
    /// page to the first one, since the result set is different.
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Search(search) => {
                self.search = search;
                self.page = FIRST_PAGE;
            }
            FilterChange::Sort(sort) => {
                self.sort = sort;
                self.page = FIRST_PAGE;
            }
            FilterChange::Status(status) => {
                self.status = status;
                self.page = FIRST_PAGE;
            }
            FilterChange::Category(category) => {
                self.category = category;
                self.page = FIRST_PAGE;
            }
            FilterChange::Page(page) => self.page = page.max(FIRST_PAGE),
            FilterChange::Reset => *self = Self::default(),
        }
    }

    /// Copy of this filter asking for `page`.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(FIRST_PAGE),
            ..self.clone()
        }
    }

    /// Query parameters for the non-default values, in a stable order.
    ///
    /// Values are returned raw; URL-encoding happens when the pairs are
    /// attached to a request URL.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        if !is_default(&self.sort, DEFAULT_SORT) {
            pairs.push(("sort", self.sort.clone()));
        }
        if !is_default(&self.status, FILTER_ALL) {
            pairs.push(("status", self.status.clone()));
        }
        if !is_default(&self.category, FILTER_ALL) {
            pairs.push(("category", self.category.clone()));
        }
        if self.page > FIRST_PAGE {
            pairs.push(("page", self.page.to_string()));
        }

        pairs
    }

    /// Whether every parameter is at its default.
    pub fn is_default(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn is_default(value: &str, default: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == default
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_no_parameters() {
        let filter = FilterState::default();
        assert!(filter.query_pairs().is_empty());
        assert!(filter.is_default());
    }

    #[test]
    fn sentinels_and_blanks_are_omitted() {
        let filter = FilterState {
            search: "   ".into(),
            sort: "".into(),
            status: "all".into(),
            category: "".into(),
            page: 1,
        };
        assert!(filter.query_pairs().is_empty());
    }

    #[test]
    fn non_default_values_appear_in_order() {
        let filter = FilterState {
            search: " afro beat ".into(),
            sort: "popular".into(),
            status: "pending".into(),
            category: "5".into(),
            page: 3,
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("search", "afro beat".to_string()),
                ("sort", "popular".to_string()),
                ("status", "pending".to_string()),
                ("category", "5".to_string()),
                ("page", "3".to_string()),
            ]
        );
    }

    #[test]
    fn non_page_changes_reset_page() {
        let mut filter = FilterState::default().with_page(4);
        filter.apply(FilterChange::Sort("title".into()));
        assert_eq!(filter.page, 1);

        filter.apply(FilterChange::Page(2));
        assert_eq!(filter.page, 2);
        filter.apply(FilterChange::Search("x".into()));
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn page_zero_is_clamped() {
        let mut filter = FilterState::default();
        filter.apply(FilterChange::Page(0));
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut filter = FilterState::for_category(5);
        filter.apply(FilterChange::Search("abc".into()));
        filter.apply(FilterChange::Reset);
        assert_eq!(filter, FilterState::default());
    }

    #[test]
    fn only_search_is_debounced() {
        assert!(FilterChange::Search("a".into()).is_debounced());
        assert!(!FilterChange::Sort("title".into()).is_debounced());
        assert!(!FilterChange::Page(2).is_debounced());
    }
}
