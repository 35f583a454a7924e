mod api;
mod users;
mod utils;

pub use utils::test_utils;
