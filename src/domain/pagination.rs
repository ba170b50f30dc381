//! Page-number and page-size normalization.
//!
//! Bad input is never an error: non-numeric or non-positive page numbers
//! become page 1, numbers past the end become the last page, and page sizes
//! outside the allow-list become the default.

use serde::Serialize;

pub const DEFAULT_PER_PAGE: u64 = 12;
pub const PER_PAGE_CHOICES: [u64; 3] = [12, 24, 48];

/// Single-valued query keys may still repeat; the last occurrence wins.
pub fn last_value(values: Vec<String>) -> Option<String> {
    values.into_iter().next_back()
}

pub fn per_page_from_param(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| PER_PAGE_CHOICES.contains(n))
        .unwrap_or(DEFAULT_PER_PAGE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub per_page: u64,
    /// Raw page number as received; resolved against the item count.
    pub page: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: None,
        }
    }
}

impl PageRequest {
    pub fn new(per_page: u64, page: Option<String>) -> Self {
        Self {
            per_page: per_page.max(1),
            page,
        }
    }

    /// An empty result still has one (empty) page.
    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.per_page).max(1)
    }

    /// 1-based page number clamped into `1..=total_pages`.
    pub fn resolve(&self, total_items: u64) -> u64 {
        let last = self.total_pages(total_items);
        match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<i64>() {
                // numeric but too large for i64 is still past the end
                Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => last,
                Err(_) => 1,
                Ok(n) if n < 1 => 1,
                Ok(n) if n as u64 > last => last,
                Ok(n) => n as u64,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub total_pages: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
    /// 1-based index of the first item on this page (0 when empty).
    pub start_index: u64,
    pub end_index: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, per_page: u64, total_items: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        let (start_index, end_index) = if total_items == 0 {
            (0, 0)
        } else if number == total_pages {
            (per_page * (number - 1) + 1, total_items)
        } else {
            (per_page * (number - 1) + 1, number * per_page)
        };

        Self {
            items,
            number,
            total_pages,
            per_page,
            total_items,
            has_next: number < total_pages,
            has_previous: number > 1,
            start_index,
            end_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(page: &str) -> PageRequest {
        PageRequest::new(12, Some(page.to_string()))
    }

    #[test]
    fn per_page_allow_list() {
        assert_eq!(per_page_from_param(None), 12);
        assert_eq!(per_page_from_param(Some("24")), 24);
        assert_eq!(per_page_from_param(Some("48")), 48);
        assert_eq!(per_page_from_param(Some("13")), 12);
        assert_eq!(per_page_from_param(Some("-24")), 12);
        assert_eq!(per_page_from_param(Some("all")), 12);
    }

    #[test]
    fn page_numbers_clamp() {
        // 20 items at 12 per page -> 2 pages
        assert_eq!(req("1").resolve(20), 1);
        assert_eq!(req("2").resolve(20), 2);
        assert_eq!(req("0").resolve(20), 1);
        assert_eq!(req("-3").resolve(20), 1);
        assert_eq!(req("abc").resolve(20), 1);
        assert_eq!(req("9999").resolve(20), 2);
        assert_eq!(req("99999999999999999999999").resolve(20), 2);
        assert_eq!(req("-99999999999999999999999").resolve(20), 1);
        assert_eq!(PageRequest::new(12, None).resolve(20), 1);
    }

    #[test]
    fn repeated_keys_take_the_last_value() {
        assert_eq!(last_value(vec![]), None);
        assert_eq!(last_value(vec!["1".into(), "2".into()]).as_deref(), Some("2"));
    }

    #[test]
    fn empty_result_has_one_page() {
        assert_eq!(req("5").resolve(0), 1);
        let page: Page<u8> = Page::new(vec![], 1, 12, 0);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn page_indices() {
        let page = Page::new(vec![0u8; 8], 2, 12, 20);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!((page.start_index, page.end_index), (13, 20));

        let first = Page::new(vec![0u8; 12], 1, 12, 20);
        assert_eq!((first.start_index, first.end_index), (1, 12));
    }
}
