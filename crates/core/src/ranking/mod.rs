//! Result ranking and pagination.
//!
//! Everything here is a pure function of its inputs: a fetched list of
//! [`ResultRecord`](crate::ResultRecord)s, the active [`SortDirective`] and
//! the caller's [`PageState`]. Nothing is cached between calls.

mod compare;
mod engine;
mod types;

pub use compare::{compare_records, natural_cmp, sort_value, SortValue};
pub use engine::{paginate, present, rank, rank_refs, total_pages, Page};
pub use types::*;
