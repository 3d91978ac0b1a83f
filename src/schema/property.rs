use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, json_type_name};

/// Root schema shape consumed by a form: a `properties` mapping plus the
/// names that are required.
///
/// Property insertion order is preserved and is the fallback ordering for
/// fields without an explicit `order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Optional schema title.
    pub title: Option<String>,
    /// Field name to per-field configuration.
    pub properties: Map<String, Value>,
    /// Names of required fields.
    pub required: Vec<String>,
}

impl Schema {
    /// Parse a schema from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] when the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, FormError> {
        if !value.is_object() {
            return Err(FormError::InvalidData {
                path: "schema".to_string(),
                expected: "object".to_string(),
                actual: json_type_name(value).to_string(),
            });
        }
        serde_json::from_value(value.clone()).map_err(|err| FormError::InvalidData {
            path: "schema".to_string(),
            expected: "properties/required object".to_string(),
            actual: err.to_string(),
        })
    }
}

/// Configuration of a single schema property.
///
/// Unknown fields are ignored so that schemas carrying extra JSON Schema
/// keywords still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
    /// Declared type name; unknown names mean the property is skipped.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Display label. Primitive fields without a title fail construction.
    pub title: Option<String>,
    /// Description, used as the input placeholder.
    pub description: Option<String>,
    /// Initial value.
    pub default: Option<Value>,
    /// Help text rendered next to the field.
    #[serde(rename = "help-text")]
    pub help_text: Option<String>,
    /// Explicit sort position; fields without one sort last.
    pub order: Option<i64>,
    /// Required child names (object properties only).
    pub required: Vec<String>,
    /// Nested properties (object properties only).
    pub properties: Map<String, Value>,
    /// Item configuration (array properties only).
    pub items: Option<Box<PropertyConfig>>,
    /// Collapsibility of the generated group (object/array only).
    pub collapse: Option<CollapseConfig>,
    /// Fields that must be non-empty for an array entry to be exported.
    #[serde(rename = "primary-keys")]
    pub primary_keys: Vec<String>,
    /// Layout hint for the generated column cell.
    #[serde(rename = "col-position")]
    pub col_position: Option<String>,
}

impl PropertyConfig {
    /// Parse one property's configuration out of a schema `properties`
    /// entry. `None` means the entry was malformed and should be skipped.
    pub fn from_entry(name: &str, value: &Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!("skipping malformed property `{name}`: {err}");
                None
            }
        }
    }

    /// Resolved kind of this property, if the declared type is supported.
    pub fn kind(&self) -> Option<PropertyKind> {
        self.type_name.as_deref().and_then(PropertyKind::parse)
    }
}

/// Collapse behavior of a generated group. Presentation only; has no
/// effect on value semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Whether the group renders collapsible chrome.
    pub enabled: bool,
    /// Whether the group starts expanded.
    pub show: bool,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show: false,
        }
    }
}

/// The closed set of property kinds the interpreter understands.
///
/// Dispatching over this enum (instead of raw type strings) guarantees at
/// compile time that every kind is handled wherever elements are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Plain string input.
    String,
    /// Base-10 integer input.
    Integer,
    /// Binary checked/unchecked input.
    Boolean,
    /// Free-form JSON textarea.
    Json,
    /// Nested object group.
    Object,
    /// Repeatable or primitive-valued array.
    Array,
}

impl PropertyKind {
    /// Parse a declared type name. Unknown names yield `None`; callers
    /// skip the property with a diagnostic rather than failing the form.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "json" => Some(Self::Json),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// Canonical type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Json => "json",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}
