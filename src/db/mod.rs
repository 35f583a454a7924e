pub mod categories;
pub mod favorites;
pub mod history;
pub mod notifications;
pub mod recipes;
pub mod suggestions;
pub mod tags;
pub mod users;

pub use categories::*;
pub use favorites::*;
pub use history::*;
pub use notifications::*;
pub use recipes::*;
pub use suggestions::*;
pub use tags::*;
pub use users::*;

/// Page size shared by every paginated listing.
pub const PER_PAGE: i64 = 10;

pub(crate) fn page_offset(page: i64) -> (i64, i64) {
    let page = page.max(1);
    (page, (page - 1) * PER_PAGE)
}
