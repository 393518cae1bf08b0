//! GoSOTRAL Realtime - live change notifications for the GoSOTRAL apps.
//!
//! The server side is a broadcast hub that keeps one Server-Sent Events
//! stream per connected app and fans published events out to all of them.
//! The client side is an event consumer that subscribes, reconnects with
//! backoff, and dispatches events to callbacks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
