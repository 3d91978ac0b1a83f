use thiserror::Error;

/// Errors raised by form construction and value distribution.
///
/// Recoverable conditions (detached render surfaces, unparsable input,
/// missing nodes during group add/remove) are deliberately *not* part of
/// this taxonomy; they are logged and degrade gracefully so that value
/// collection never aborts over a partially rendered tree.
#[derive(Debug, Error)]
pub enum FormError {
    /// Required identity fields were missing at construction time.
    #[error("invalid configuration for element `{element}`: {reason}")]
    InvalidConfiguration {
        /// Id of the element under construction (may itself be empty).
        element: String,
        /// Which field was missing or malformed.
        reason: String,
    },

    /// `set_value` received a structurally wrong shape.
    #[error("invalid data for `{path}`: expected {expected}, got {actual}")]
    InvalidData {
        /// Id of the element that rejected the data.
        path: String,
        /// Expected JSON shape.
        expected: String,
        /// What was actually provided.
        actual: String,
    },
}

impl FormError {
    /// Shorthand for a missing-identity construction failure.
    pub(crate) fn missing_field(element: &str, field: &str) -> Self {
        FormError::InvalidConfiguration {
            element: element.to_string(),
            reason: format!("`{field}` is required and must not be empty"),
        }
    }

    /// Shorthand for a shape mismatch in `set_value`.
    pub(crate) fn bad_shape(path: &str, expected: &str, actual: &serde_json::Value) -> Self {
        FormError::InvalidData {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: json_type_name(actual).to_string(),
        }
    }
}

/// Human-readable JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
