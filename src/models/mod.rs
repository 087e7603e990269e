//! Data models shared by the gateway and the inventory report.
//!
//! All of them are transient views of state that lives in the object store.
//! They serialize as JSON via `serde` for the HTTP surface.

pub mod bucket;
pub mod object;
pub mod report;
