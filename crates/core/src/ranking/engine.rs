//! Ranking and pagination of an already-fetched result list.

use serde::Serialize;

use super::compare::{compare_optional, sort_value};
use super::{PageState, SortDirective};
use crate::record::ResultRecord;

/// Order `results` under `directive` without touching the input.
///
/// The sort is stable: records that compare equal keep their input order.
pub fn rank(results: &[ResultRecord], directive: SortDirective) -> Vec<ResultRecord> {
    rank_refs(results, directive).into_iter().cloned().collect()
}

/// Borrowing variant of [`rank`].
pub fn rank_refs(results: &[ResultRecord], directive: SortDirective) -> Vec<&ResultRecord> {
    // Extract each key once; dates would otherwise be re-parsed per comparison
    let mut keyed: Vec<_> = results
        .iter()
        .map(|record| (sort_value(record, directive.key), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_optional(a.as_ref(), b.as_ref(), directive.direction));

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Number of pages needed for `total_items`; zero for an empty list.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// One visible page of a ranked list, with the metadata needed to
/// render "Showing X to Y of Z" and previous/next controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based position of the first visible item, 0 when nothing is visible.
    pub first_item: usize,
    /// 1-based position of the last visible item, 0 when nothing is visible.
    pub last_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Convert the visible items, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_items: self.total_items,
            first_item: self.first_item,
            last_item: self.last_item,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

/// Slice out the page described by `page`.
///
/// A page number outside `[1, total_pages]` yields an empty page rather
/// than an error.
pub fn paginate<T: Clone>(ranked: &[T], page: PageState) -> Page<T> {
    let page_size = page.page_size.max(1);
    let total_items = ranked.len();
    let total_pages = total_pages(total_items, page_size);

    let items: Vec<T> = if page.current_page == 0 {
        Vec::new()
    } else {
        let start = page.offset();
        if start >= total_items {
            Vec::new()
        } else {
            let end = start.saturating_add(page_size).min(total_items);
            ranked[start..end].to_vec()
        }
    };

    let (first_item, last_item) = if items.is_empty() {
        (0, 0)
    } else {
        let start = page.offset();
        (start + 1, start + items.len())
    };

    Page {
        current_page: page.current_page,
        page_size,
        total_pages,
        total_items,
        first_item,
        last_item,
        has_previous: page.current_page > 1 && total_pages > 0,
        has_next: page.current_page < total_pages,
        items,
    }
}

/// Rank then paginate in one step.
pub fn present(
    results: &[ResultRecord],
    directive: SortDirective,
    page: PageState,
) -> Page<ResultRecord> {
    let ranked = rank_refs(results, directive);
    paginate(&ranked, page).map(ResultRecord::clone)
}
