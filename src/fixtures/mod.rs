//! Static sample data for the demo database.
//!
//! Users are complete records. Posts and orders name their owner by
//! username; the seeder resolves that to the stored user id before insert.

mod orders;
mod posts;
mod users;

pub use orders::{orders, OrderFixture};
pub use posts::{posts, PostFixture};
pub use users::users;
