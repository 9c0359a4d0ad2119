//! Agent catalog, hierarchy, enablement and classification resolution.

pub mod catalog;
pub mod enablement;
pub mod registry;
pub mod resolver;
pub mod validation;

pub use enablement::{EnablementStore, FileEnablementStore, MemoryEnablementStore};
pub use registry::AgentRegistry;
pub use resolver::{AgentResolver, Classification, MatchKind, Resolution};
