//! # jkform
//!
//! A schema-driven HTML form engine.
//!
//! JKForm walks a JSON Schema-like description into a tree of typed form
//! elements, renders the tree to self-contained HTML markup, and
//! collects, restores, and resets values through a pluggable host
//! surface.
//!
//! ## Features
//!
//! - JSON Schema driven form generation (string, integer, boolean, json,
//!   object, array)
//! - Nested object groups and dynamically repeatable array groups
//! - `get_value` / `set_value` / `reset` round-tripping of arbitrarily
//!   nested data as [`serde_json::Value`]
//! - Deterministic field ordering with `order` hints and composite
//!   tie-breaks
//! - Per-form element registry for scripted access from host UI
//!   affordances
//! - Typed-config entry point via [schemars](https://docs.rs/schemars)
//! - Headless [`MemorySurface`] for tests and non-browser hosts
//!
//! ## Quick Start
//!
//! ```rust
//! use jkform::{Form, FormConfig, MemorySurface};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "properties": {
//!         "host": { "type": "string", "title": "Host", "order": 1 },
//!         "port": { "type": "integer", "title": "Port", "order": 2 }
//!     },
//!     "required": ["host"]
//! });
//!
//! let form = Form::new(FormConfig::new("net", "network", schema)).unwrap();
//! let html = form.render();
//!
//! // Mount the markup in a host, or drive it headless:
//! let mut dom = MemorySurface::new();
//! dom.attach_input("net-host", "example.com");
//! dom.attach_input("net-port", "8080");
//!
//! let value = form.get_value(&dom);
//! assert_eq!(value, json!({ "host": "example.com", "port": 8080 }));
//! # let _ = html;
//! ```
//!
//! ## Modules
//!
//! - [`form`] - Root form, schema interpretation, and submit
//! - [`element`] - Element tree: inputs, groups, repeatable groups
//! - [`schema`] - Schema structures and field ordering
//! - [`registry`] - Per-form element registry
//! - [`surface`] - Render-surface abstraction and headless surface
//! - [`emitter`] - Event channel for submitted values
//! - [`error`] - Error types

#[macro_use]
extern crate log;

/// Form element tree: inputs, groups, repeatable groups.
pub mod element;

/// Event channel used to publish submitted form values.
pub mod emitter;

/// Error types for form construction and value distribution.
pub mod error;

/// Root form, schema interpretation, and submit.
pub mod form;

/// Per-form element registry.
pub mod registry;

/// Schema structures and field ordering.
pub mod schema;

/// Render-surface abstraction and the headless in-memory surface.
pub mod surface;

mod html;

// Re-export main types for convenience
pub use element::{ArrayGroup, Column, Control, Element, ElementKind, ElementOptions, Group, Input};
pub use emitter::{Emitter, HandlerId};
pub use error::FormError;
pub use form::{Form, FormConfig, FormOptions};
pub use registry::ElementRegistry;
pub use schema::{CollapseConfig, PropertyConfig, PropertyKind, Schema};
pub use surface::{MemorySurface, Surface};
