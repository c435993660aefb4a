//! Common utilities shared by the Marten crates.
//!
//! This crate provides shared infrastructure used by both engines:
//! - **Warning System** - deduplicated notices routed through `tracing`

pub mod warning;
