//! HTTP client side of the rental catalog: fetches, suggestions, and a
//! periodic refresh that never lets an older response win.

pub mod client;
pub mod error;
pub mod poller;
pub mod store;

pub use client::CatalogClient;
pub use error::ClientError;
pub use poller::CatalogPoller;
pub use store::{CatalogSnapshot, CatalogStore};
