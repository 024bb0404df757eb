//! Pure query pipeline: filter → sort → paginate.

mod filter;
mod paginate;
mod sort;

pub use filter::{filter_questions, matches};
pub use paginate::{clamp_page, paginate, total_pages, Page, PAGE_SIZE};
pub use sort::{
    compare_questions, compare_values, sort_questions, sort_value, SortContext, SortValue,
    NO_MATCH_FREQUENCY,
};
