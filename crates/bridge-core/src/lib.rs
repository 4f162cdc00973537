//! # bridge-core
//!
//! Typed seams between a paywall/subscription bridge and its host page:
//! an analytics data layer model and sink, a deferred SDK command queue,
//! storage and cookie traits, and a page-context snapshot.
//!
//! The bridge's domain logic lives in the `paywall-bridge` crate; this crate
//! holds the leaf abstractions it publishes through, each with an in-memory
//! implementation for tests.

pub mod analytics;
pub mod commands;
pub mod error;
pub mod page;
pub mod storage;

pub use analytics::{AnalyticsSink, DataLayerEvent, MemoryAnalyticsSink};
pub use commands::{
    CommandQueue, CommandSink, ConsentMode, ConsentPurpose, ConsentQueue, MemoryCommandSink,
    SdkCommand,
};
pub use error::{BridgeError, Result};
pub use page::PageContext;
pub use storage::{CookieJar, KeyValueStore, MemoryCookieJar, MemoryStore};
