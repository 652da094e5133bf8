//! Payload stores for offloaded message bodies.
//!
//! [`PayloadStore`] is the seam the publish client writes bodies through; it
//! returns the pointer JSON ([`PayloadPointer`]) that replaces the body on the
//! wire. [`MemoryPayloadStore`] keeps bodies in process for tests and local runs.

pub mod error;
pub mod memory;
pub mod pointer;
pub mod store;

pub use error::PayloadStoreError;
pub use memory::MemoryPayloadStore;
pub use pointer::PayloadPointer;
pub use store::{PayloadStore, generate_key};
