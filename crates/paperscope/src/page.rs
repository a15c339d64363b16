//! Pagination arithmetic and paged-result accumulation.
//!
//! [`total_pages`] and [`page_window`] back the stateless HTTP responses.
//! [`PagedAccumulator`] and [`Generation`] are session-side primitives for
//! a "load more" surface: the accumulator grows one logical result set
//! across pages, and the generation guard drops fetches that finish after
//! a newer request has started. They belong to whatever owns per-session
//! fetch state; the per-request route handlers have none to guard.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::Paper;

/// Number of pages needed for `total` items at `per_page` each.
///
/// Zero items need zero pages.
#[must_use]
pub const fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 { 0 } else { total.div_ceil(per_page) }
}

/// Contiguous window of page numbers (1-indexed) around `current`.
///
/// The window is centered when possible and clamped at the edges, so it
/// always has `min(width, total)` entries.
#[must_use]
pub fn page_window(current: usize, total: usize, width: usize) -> Vec<usize> {
    if total == 0 || width == 0 {
        return Vec::new();
    }
    if total <= width {
        return (1..=total).collect();
    }

    let half = width / 2;
    let start = current.saturating_sub(half).clamp(1, total - width + 1);
    (start..start + width).collect()
}

/// Accumulates "load more" pages, de-duplicating by paper id.
///
/// The first occurrence of an id wins; accumulation order is preserved.
#[derive(Debug, Default)]
pub struct PagedAccumulator {
    seen: HashSet<String>,
    papers: Vec<Paper>,
}

impl PagedAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page, skipping papers already accumulated.
    ///
    /// Returns the number of papers actually added.
    pub fn push_page(&mut self, page: Vec<Paper>) -> usize {
        let mut added = 0;
        for paper in page {
            if self.seen.insert(paper.id.clone()) {
                self.papers.push(paper);
                added += 1;
            }
        }
        added
    }

    /// All accumulated papers in arrival order.
    #[must_use]
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// Number of accumulated papers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// True when nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Drop everything (e.g. when the logical resource changes).
    pub fn reset(&mut self) {
        self.seen.clear();
        self.papers.clear();
    }
}

/// Stale-response guard for in-flight fetches of one logical resource.
///
/// `begin()` invalidates every earlier token; a finished fetch applies its
/// result only while its token `is_current`. Stale responses are dropped
/// silently, not merged.
#[derive(Debug, Default)]
pub struct Generation {
    counter: AtomicU64,
}

impl Generation {
    /// Create a fresh guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request generation, invalidating all previous tokens.
    pub fn begin(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` still belongs to the newest generation.
    #[must_use]
    pub fn is_current(&self, token: u64) -> bool {
        self.counter.load(Ordering::SeqCst) == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str) -> Paper {
        Paper { id: id.to_string(), ..Default::default() }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(7, 5), 2);
    }

    #[test]
    fn test_page_window_small_total() {
        assert_eq!(page_window(1, 3, 5), vec![1, 2, 3]);
        assert!(page_window(1, 0, 5).is_empty());
    }

    #[test]
    fn test_page_window_centered_and_clamped() {
        assert_eq!(page_window(5, 10, 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_accumulator_dedupes_across_pages() {
        let mut acc = PagedAccumulator::new();
        assert_eq!(acc.push_page(vec![paper("A"), paper("B")]), 2);
        assert_eq!(acc.push_page(vec![paper("B"), paper("C")]), 1);

        let ids: Vec<&str> = acc.papers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn test_accumulator_reset() {
        let mut acc = PagedAccumulator::new();
        acc.push_page(vec![paper("A")]);
        acc.reset();
        assert!(acc.is_empty());
        assert_eq!(acc.push_page(vec![paper("A")]), 1);
    }

    #[test]
    fn test_generation_invalidates_older_tokens() {
        let generation = Generation::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
