pub mod store;
pub mod tags;

pub use store::{Admission, CacheStore};
pub use tags::{QueryKey, Tag};
