//! Remote reasoning backend: bounded transport plus deterministic fallback
//! content for when the transport fails.

pub mod cache;
pub mod fallback;
pub mod gateway;
pub mod http;
pub mod types;

pub use cache::CachingGateway;
pub use fallback::{FallbackProvider, Welcome};
pub use gateway::{BackendGateway, GatewayError, OfflineGateway};
pub use http::HttpBackendGateway;
pub use types::{BackendRequest, BackendResponse, HistoryEntry, RequestKind};
