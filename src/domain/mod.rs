//! Domain layer containing the realtime vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, ids, errors)
//! - `realtime` - Domain events and the wire frames that carry them

pub mod foundation;
pub mod realtime;
