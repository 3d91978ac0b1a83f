use serde_json::Value;

use crate::element::input::{Control, Input};
use crate::element::{Element, ElementOptions};
use crate::error::FormError;
use crate::schema::{PropertyConfig, PropertyKind};

/// Classes applied to every generated input control.
pub(crate) const COMMON_INPUT_CLASSES: &str = "form-control form-control-sm w-100";

/// Build the primitive input for a schema property.
///
/// Returns `None` when the kind has no primitive representation (objects
/// and unknown kinds); callers treat that as "skip this property", not an
/// error. An `array` kind is represented as a single JSON control whose
/// value is the whole array; repeated object rows are handled by
/// [`ArrayGroup`](crate::element::ArrayGroup) instead.
///
/// The merged options are: the common control classes, `required` when
/// the property name appears in the enclosing schema's required list,
/// the description as placeholder, and the property's help text. The
/// label comes from the property title; a property without one fails
/// construction and is skipped by the caller with a diagnostic.
pub fn input_for_property(
    parent_id: &str,
    name: &str,
    config: &PropertyConfig,
    required_names: &[String],
    form_id: Option<&str>,
) -> Option<Result<Input, FormError>> {
    let control = match config.kind()? {
        PropertyKind::String => Control::Text,
        PropertyKind::Integer => Control::Integer,
        PropertyKind::Boolean => Control::Boolean,
        PropertyKind::Json => Control::json(),
        PropertyKind::Array => Control::json(),
        PropertyKind::Object => return None,
    };

    let style = match control {
        Control::Json { .. } => "font-family: monospace;".to_string(),
        _ => String::new(),
    };
    let options = ElementOptions {
        required: required_names.iter().any(|required| required == name),
        placeholder: config.description.clone().unwrap_or_default(),
        help_text: config.help_text.clone().unwrap_or_default(),
        class_names: COMMON_INPUT_CLASSES.to_string(),
        style,
        form_id: form_id.map(str::to_string),
    };

    let id = format!("{parent_id}-{name}");
    let label = config.title.clone().unwrap_or_default();
    let value = config
        .default
        .clone()
        .unwrap_or_else(|| Value::String(String::new()));

    Some(Input::new(control, id, name, label, value, options))
}

/// Convenience wrapper building the input as a tree [`Element`].
pub fn element_for_property(
    parent_id: &str,
    name: &str,
    config: &PropertyConfig,
    required_names: &[String],
    form_id: Option<&str>,
) -> Option<Result<Element, FormError>> {
    Some(input_for_property(parent_id, name, config, required_names, form_id)?.map(Element::Input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use serde_json::json;

    fn config(value: serde_json::Value) -> PropertyConfig {
        PropertyConfig::from_entry("field", &value).expect("config should parse")
    }

    #[test]
    fn test_kinds_map_to_controls() {
        for (type_name, kind) in [
            ("string", ElementKind::Text),
            ("integer", ElementKind::Integer),
            ("boolean", ElementKind::Boolean),
            ("json", ElementKind::Json),
        ] {
            let config = config(json!({ "type": type_name, "title": "Field" }));
            let input = input_for_property("f", "field", &config, &[], None)
                .expect("a primitive kind must map to an input")
                .expect("construction should succeed");
            assert_eq!(input.kind(), kind);
            assert_eq!(input.base().id(), "f-field");
        }
    }

    #[test]
    fn test_unsupported_kinds_yield_none() {
        let object = config(json!({ "type": "object", "title": "Field" }));
        assert!(input_for_property("f", "field", &object, &[], None).is_none());

        let unknown = config(json!({ "type": "unsupported", "title": "Field" }));
        assert!(input_for_property("f", "field", &unknown, &[], None).is_none());
    }

    #[test]
    fn test_primitive_array_becomes_json_control() {
        let config = config(json!({
            "type": "array",
            "title": "Tags",
            "items": { "type": "string" },
            "default": ["a", "b"]
        }));
        let input = input_for_property("f", "tags", &config, &[], None)
            .unwrap()
            .unwrap();
        assert_eq!(input.kind(), ElementKind::Json);
        assert_eq!(
            input.base().value(),
            &json!("[\n  \"a\",\n  \"b\"\n]"),
            "the array default is stored as formatted JSON text"
        );
    }

    #[test]
    fn test_options_are_merged() {
        let config = config(json!({
            "type": "string",
            "title": "Host",
            "description": "host to bind",
            "help-text": "IPv4 or IPv6"
        }));
        let required = vec!["field".to_string()];
        let input = input_for_property("f", "field", &config, &required, Some("f"))
            .unwrap()
            .unwrap();

        let options = input.base().options();
        assert!(options.required);
        assert_eq!(options.placeholder, "host to bind");
        assert_eq!(options.help_text, "IPv4 or IPv6");
        assert_eq!(options.class_names, COMMON_INPUT_CLASSES);
        assert_eq!(options.form_id.as_deref(), Some("f"));
    }

    #[test]
    fn test_missing_title_fails_construction() {
        let config = config(json!({ "type": "string" }));
        let result = input_for_property("f", "field", &config, &[], None).unwrap();
        assert!(
            matches!(result, Err(FormError::InvalidConfiguration { .. })),
            "a primitive without a title has no label and must be rejected"
        );
    }
}
