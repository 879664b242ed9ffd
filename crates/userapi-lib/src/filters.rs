//! Pagination and sorting for list queries.
//!
//! [`Filters`] carries the caller-supplied page, page size and sort key along
//! with the safelist of sortable columns. Validation records every violation on
//! a [`Validator`]; the derivations (`sort_column`, `limit`, ...) are only
//! meaningful once validation has passed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validator::Validator;

/// Largest page number a client may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Paging and sorting inputs for a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// 1-indexed page number.
    pub page: i64,
    /// Records per page.
    pub page_size: i64,
    /// Sort key; a leading `-` requests descending order.
    pub sort: String,
    /// Sort keys the caller is allowed to use.
    pub sort_safelist: Vec<String>,
}

impl Filters {
    /// Record every filter violation on `v`.
    ///
    /// Each rule is evaluated independently so all failures surface together.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );

        let wanted = strip_direction(&self.sort);
        let permitted = self
            .sort_safelist
            .iter()
            .any(|safe| strip_direction(safe) == wanted);
        v.check(permitted, "sort", "invalid sort value");
    }

    /// Column named by the sort key, without the direction prefix.
    ///
    /// # Panics
    ///
    /// Panics if the full sort key is not in the safelist. Validation is
    /// expected to have rejected such keys already, so reaching this means the
    /// safelist and validation disagree.
    pub fn sort_column(&self) -> &str {
        if self.sort_safelist.iter().any(|safe| *safe == self.sort) {
            return strip_direction(&self.sort);
        }

        panic!("unsafe sort parameter: {}", self.sort);
    }

    /// Order requested by the sort key.
    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Maximum number of records to return.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Number of records to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn strip_direction(key: &str) -> &str {
    key.strip_prefix('-').unwrap_or(key)
}

/// Paging information returned alongside a list of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Derive paging metadata for a result set of `total_records` rows.
///
/// An empty result set yields all-zero metadata.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(page: i64, page_size: i64, sort: &str, safelist: &[&str]) -> Filters {
        Filters {
            page,
            page_size,
            sort: sort.to_string(),
            sort_safelist: safelist.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn validate(f: &Filters) -> Validator {
        let mut v = Validator::new();
        f.validate(&mut v);
        v
    }

    #[test]
    fn test_valid_filters() {
        for (page, page_size) in [(1, 1), (1, 20), (MAX_PAGE, MAX_PAGE_SIZE), (500, 50)] {
            let v = validate(&filters(page, page_size, "name", &["name"]));
            assert!(v.valid(), "page={page} page_size={page_size}: {:?}", v.errors());
        }
    }

    #[test]
    fn test_page_too_small() {
        let v = validate(&filters(0, 20, "name", &["name"]));
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["page"], "must be greater than zero");
    }

    #[test]
    fn test_page_too_large() {
        let v = validate(&filters(10_000_001, 20, "name", &["name"]));
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["page"], "must be a maximum of 10 million");
    }

    #[test]
    fn test_page_size_too_small() {
        let v = validate(&filters(1, 0, "name", &["name"]));
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["page_size"], "must be greater than zero");
    }

    #[test]
    fn test_page_size_too_large() {
        let v = validate(&filters(1, 101, "name", &["name"]));
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["page_size"], "must be a maximum of 100");
    }

    #[test]
    fn test_invalid_sort_value() {
        let v = validate(&filters(1, 20, "email", &["name"]));
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["sort"], "invalid sort value");
    }

    #[test]
    fn test_sort_compares_without_direction_prefix() {
        assert!(validate(&filters(1, 20, "-name", &["-name"])).valid());
        assert!(validate(&filters(1, 20, "name", &["-name"])).valid());
        assert!(validate(&filters(1, 20, "-name", &["name"])).valid());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let v = validate(&filters(0, 101, "password", &["id", "-id"]));
        assert_eq!(v.errors().len(), 3);
    }

    #[test]
    fn test_sort_column_and_direction_descending() {
        let f = filters(1, 20, "-name", &["-name"]);
        assert_eq!(f.sort_column(), "name");
        assert_eq!(f.sort_direction(), SortDirection::Desc);
        assert_eq!(f.sort_direction().to_string(), "DESC");
    }

    #[test]
    fn test_sort_direction_ascending() {
        let f = filters(1, 20, "name", &["name"]);
        assert_eq!(f.sort_column(), "name");
        assert_eq!(f.sort_direction(), SortDirection::Asc);
        assert_eq!(f.sort_direction().as_sql(), "ASC");
    }

    #[test]
    #[should_panic(expected = "unsafe sort parameter: -name")]
    fn test_sort_column_outside_safelist_panics() {
        let f = filters(1, 20, "-name", &["name"]);
        let _ = f.sort_column();
    }

    #[test]
    fn test_limit_and_offset() {
        let f = filters(3, 25, "id", &["id"]);
        assert_eq!(f.limit(), 25);
        assert_eq!(f.offset(), 50);

        let first = filters(1, 20, "id", &["id"]);
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn test_calculate_metadata() {
        let meta = calculate_metadata(183, 2, 20);
        assert_eq!(
            meta,
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 10,
                total_records: 183,
            }
        );
    }

    #[test]
    fn test_calculate_metadata_exact_multiple() {
        assert_eq!(calculate_metadata(40, 1, 20).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 20).last_page, 1);
    }

    #[test]
    fn test_calculate_metadata_empty() {
        assert_eq!(calculate_metadata(0, 1, 20), Metadata::default());
    }

    #[test]
    fn test_metadata_serialization() {
        let json = serde_json::to_string(&calculate_metadata(183, 2, 20)).unwrap();
        assert_eq!(
            json,
            r#"{"current_page":2,"page_size":20,"first_page":1,"last_page":10,"total_records":183}"#
        );
    }
}
