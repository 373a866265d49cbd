//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    /// SQL OFFSET for this page (pages are 1-based)
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Metadata for one page of a listing whose full size is `total_items`
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = pagination.per_page.max(1) as u64;
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: ((total_items + per_page - 1) / per_page) as u32,
        }
    }
}

/// Optional date range for report and listing queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

impl DateRange {
    /// True when the range is ordered (or unbounded on either side)
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination {
            page: 1,
            per_page: 20,
        };
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            page: 3,
            per_page: 25,
        };
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_pagination_page_zero_clamped() {
        let p = Pagination {
            page: 0,
            per_page: 20,
        };
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_meta_rounds_up() {
        let p = Pagination {
            page: 2,
            per_page: 20,
        };
        let meta = PaginationMeta::new(&p, 41);
        assert_eq!(meta.page, 2);
        assert_eq!(meta.total_items, 41);
        assert_eq!(meta.total_pages, 3);

        let meta = PaginationMeta::new(&p, 40);
        assert_eq!(meta.total_pages, 2);

        let meta = PaginationMeta::new(&p, 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn test_pagination_meta_survives_zero_per_page() {
        let p = Pagination {
            page: 1,
            per_page: 0,
        };
        let meta = PaginationMeta::new(&p, 7);
        assert_eq!(meta.total_pages, 7);
    }

    #[test]
    fn test_date_range_validity() {
        use chrono::NaiveDate;

        let range = DateRange {
            from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        };
        assert!(range.is_valid());

        let inverted = DateRange {
            from: range.to,
            to: range.from,
        };
        assert!(!inverted.is_valid());

        assert!(DateRange::default().is_valid());
    }
}
