//! Schema structures driving form generation.
//!
//! A form is described by a JSON Schema-like value: a `properties` mapping
//! of field names to per-field configuration plus a `required` name list.
//! This module provides:
//!
//! - Typed views over that structure ([`Schema`], [`PropertyConfig`])
//! - The closed set of supported field kinds ([`PropertyKind`])
//! - The ordering rule applied before fields are instantiated

/// Field ordering with composite tie-breaks.
pub mod order;

/// Property configuration and supported field kinds.
pub mod property;

pub use property::{CollapseConfig, PropertyConfig, PropertyKind, Schema};
