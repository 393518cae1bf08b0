//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `operator` - Bearer-token gate for administrative endpoints

pub mod operator;

pub use operator::{require_operator, OperatorGate, OperatorRejection};
