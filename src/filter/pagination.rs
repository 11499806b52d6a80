use serde::{Deserialize, Serialize};

use super::types::ListParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Requested page window, normalized so both values are at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            number: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn from_params(params: &ListParams) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(&params.page), parse(&params.limit))
    }

    pub fn capped(mut self, max_limit: Option<i64>) -> Self {
        if let Some(max) = max_limit.filter(|m| *m > 0) {
            if self.limit > max {
                tracing::debug!("limit {} exceeds max {}, capping", self.limit, max);
                self.limit = max;
            }
        }
        self
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
    pub first_page: i64,
    pub last_page: i64,
}

impl Pagination {
    /// `total_items` must come from the filtered COUNT, not the page itself.
    pub fn calculate(total_items: i64, page: Page) -> Self {
        let total_items = total_items.max(0);
        let total_pages = total_items / page.limit + i64::from(total_items % page.limit != 0);
        let next_page = if page.offset().saturating_add(page.limit) < total_items {
            page.number.checked_add(1)
        } else {
            None
        };
        let previous_page = (page.number > 1).then(|| page.number - 1);

        Self {
            total_items,
            total_pages,
            current_page: page.number,
            next_page,
            previous_page,
            first_page: 1,
            last_page: total_pages,
        }
    }
}

/// List envelope; this is also exactly what gets cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_non_positive_values() {
        assert_eq!(Page::new(Some(0), Some(-5)), Page { number: 1, limit: 10 });
        assert_eq!(Page::new(Some(-3), None), Page { number: 1, limit: 10 });
        assert_eq!(Page::new(None, Some(0)).limit, 10);
    }

    #[test]
    fn non_numeric_params_behave_as_absent() {
        let params = ListParams {
            page: Some("two".into()),
            limit: Some("".into()),
            ..Default::default()
        };
        assert_eq!(Page::from_params(&params), Page::default());
    }

    #[test]
    fn offset_follows_page_number() {
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(Page::default().offset(), 0);
    }

    #[test]
    fn first_page_of_twenty_five() {
        let p = Pagination::calculate(25, Page::new(Some(1), Some(10)));
        assert_eq!(p.total_items, 25);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 1);
        assert_eq!(p.next_page, Some(2));
        assert_eq!(p.previous_page, None);
        assert_eq!(p.first_page, 1);
        assert_eq!(p.last_page, 3);
    }

    #[test]
    fn last_page_has_no_next() {
        let p = Pagination::calculate(25, Page::new(Some(3), Some(10)));
        assert_eq!(p.next_page, None);
        assert_eq!(p.previous_page, Some(2));
    }

    #[test]
    fn exact_multiple_has_no_extra_page() {
        let p = Pagination::calculate(20, Page::new(Some(2), Some(10)));
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.next_page, None);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let p = Pagination::calculate(0, Page::default());
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.last_page, 0);
        assert_eq!(p.next_page, None);
    }

    #[test]
    fn page_math_holds_across_a_grid() {
        for total in 0..60i64 {
            for limit in 1..12i64 {
                for number in 1..8i64 {
                    let p = Pagination::calculate(total, Page::new(Some(number), Some(limit)));
                    let expected_pages = (total as f64 / limit as f64).ceil() as i64;
                    assert_eq!(p.total_pages, expected_pages);
                    assert_eq!(p.next_page.is_some(), number * limit < total);
                    assert_eq!(p.previous_page.is_some(), number > 1);
                }
            }
        }
    }

    #[test]
    fn caps_limit_when_configured() {
        assert_eq!(Page::new(None, Some(500)).capped(Some(100)).limit, 100);
        assert_eq!(Page::new(None, Some(50)).capped(Some(100)).limit, 50);
        assert_eq!(Page::new(None, Some(500)).capped(None).limit, 500);
    }

    #[test]
    fn extreme_page_and_limit_do_not_overflow() {
        let huge = ListParams {
            page: Some(i64::MAX.to_string()),
            limit: Some("10".into()),
            ..Default::default()
        };
        let p = Pagination::calculate(25, Page::from_params(&huge).capped(Some(1000)));
        assert_eq!(p.current_page, i64::MAX);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.next_page, None);
        assert_eq!(p.previous_page, Some(i64::MAX - 1));

        let wide = ListParams {
            limit: Some(i64::MAX.to_string()),
            ..Default::default()
        };
        let p = Pagination::calculate(25, Page::from_params(&wide).capped(None));
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.next_page, None);

        let both = ListParams {
            page: Some(i64::MAX.to_string()),
            limit: Some(i64::MAX.to_string()),
            ..Default::default()
        };
        let page = Page::from_params(&both);
        assert_eq!(page.offset(), i64::MAX);
        assert_eq!(Pagination::calculate(i64::MAX, page).next_page, None);
    }

    #[test]
    fn serializes_missing_pages_as_null() {
        let p = Pagination::calculate(5, Page::default());
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["next_page"].is_null());
        assert!(json["previous_page"].is_null());
    }
}
