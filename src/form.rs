//! Root form: schema interpretation, rendering, and submit.
//!
//! A [`Form`] walks a JSON Schema-like value once at construction,
//! building its element tree through the factory in sorted property
//! order. Rendering composes children bottom-up into a single markup
//! fragment; value collection and restoration walk the same tree in
//! insertion order, which matches render order.

use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::element::factory;
use crate::element::group::{
    Child, collect_values, distribute_values, make_child, render_children, reset_children,
};
use crate::element::{ArrayGroup, Element, ElementBase, ElementOptions, Group};
use crate::emitter::Emitter;
use crate::error::FormError;
use crate::html;
use crate::registry::{ElementRegistry, SharedRegistry};
use crate::schema::order::sort_properties;
use crate::schema::{CollapseConfig, PropertyConfig, PropertyKind, Schema};
use crate::surface::Surface;

/// Presentation options of a form.
#[derive(Debug, Clone)]
pub struct FormOptions {
    /// Form action URL; omitted from markup when empty.
    pub action: String,
    /// Form method; omitted from markup when empty.
    pub method: String,
    /// Label of the submit control.
    pub submit_label: String,
    /// CSS classes of the form node.
    pub class_names: String,
    /// Inline style of the form node.
    pub style: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: String::new(),
            submit_label: "Submit".to_string(),
            class_names: String::new(),
            style: String::new(),
        }
    }
}

/// Everything needed to construct a [`Form`].
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Unique form id; element ids are derived from it.
    pub id: String,
    /// Form name.
    pub name: String,
    /// JSON Schema-like description (`properties` + `required`).
    pub schema: Value,
    /// Presentation options.
    pub options: FormOptions,
}

impl FormConfig {
    /// Config with default presentation options.
    pub fn new(id: impl Into<String>, name: impl Into<String>, schema: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schema,
            options: FormOptions::default(),
        }
    }
}

/// Root of one schema instance's element tree.
///
/// The form owns its elements and the per-form registry; external
/// collaborators resolve element ids through [`Form::element`] /
/// [`Form::element_mut`] and drive repeatable groups through
/// [`Form::add_group`] / [`Form::remove_group`].
#[derive(Debug)]
pub struct Form {
    base: ElementBase,
    options: FormOptions,
    schema: Schema,
    children: Vec<Child>,
    registry: SharedRegistry,
}

impl Form {
    /// Build a form by interpreting the schema in `config`.
    ///
    /// An empty or invalid schema is not fatal: the form renders an
    /// empty field area with a diagnostic and still submits an empty
    /// payload. Malformed individual properties are skipped with a
    /// diagnostic and never abort their siblings.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id` or `name`
    /// is empty.
    pub fn new(config: FormConfig) -> Result<Self, FormError> {
        let base = ElementBase::new(
            config.id.clone(),
            config.name.clone(),
            config.name,
            Value::Object(Map::new()),
            ElementOptions {
                class_names: config.options.class_names.clone(),
                style: config.options.style.clone(),
                form_id: Some(config.id),
                ..ElementOptions::default()
            },
        )?;

        let schema = match Schema::from_value(&config.schema) {
            Ok(schema) => schema,
            Err(err) => {
                warn!("schema for form `{}` is invalid, rendering no fields: {err}", base.id());
                Schema::default()
            }
        };

        let registry = ElementRegistry::shared(base.id());
        let children = interpret_properties(
            base.id(),
            base.id(),
            &schema.properties,
            &schema.required,
            &registry,
        )
        .into_iter()
        .map(|(element, config)| make_child(element, &config))
        .collect();

        debug!("form `{}` created from schema", base.id());
        Ok(Self {
            base,
            options: config.options,
            schema,
            children,
            registry,
        })
    }

    /// Build a form whose schema is derived from a Rust type.
    ///
    /// Field labels come from `#[schemars(title = "...")]` attributes;
    /// primitive fields without a title are skipped with a diagnostic,
    /// like any other unlabeled schema property.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id` or `name`
    /// is empty.
    pub fn from_type<C: JsonSchema>(
        id: impl Into<String>,
        name: impl Into<String>,
        options: FormOptions,
    ) -> Result<Self, FormError> {
        // 从类型生成 JSON Schema，嵌套类型内联展开
        let settings =
            schemars::generate::SchemaSettings::default().with(|s| s.inline_subschemas = true);
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<C>();
        let schema = serde_json::to_value(&schema).unwrap_or(Value::Null);

        Self::new(FormConfig {
            id: id.into(),
            name: name.into(),
            schema,
            options,
        })
    }

    /// Unique form id.
    pub fn id(&self) -> &str {
        self.base.id()
    }

    /// Form name.
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// The schema this form was built from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Handle to the per-form element registry.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Top-level children in render order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Event name submitted values are published under.
    pub fn submit_event(&self) -> String {
        format!("form:{}:submit", self.base.id())
    }

    /// Resolve an element id against the live tree.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| child.element.find(id))
    }

    /// Resolve an element id against the live tree, mutably.
    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .find_map(|child| child.element.find_mut(id))
    }

    /// Add a row to the array group `element_id`, appending its markup
    /// through the surface. Returns the new row's markup, or `None` with
    /// a diagnostic when the id does not resolve to an array group.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from row instantiation.
    pub fn add_group(
        &mut self,
        element_id: &str,
        dom: &mut dyn Surface,
    ) -> Result<Option<String>, FormError> {
        match self.element_mut(element_id) {
            Some(Element::Array(array)) => array.add_group(dom).map(Some),
            Some(_) => {
                warn!("element `{element_id}` is not an array group");
                Ok(None)
            }
            None => {
                warn!("element `{element_id}` not found in form `{}`", self.base.id());
                Ok(None)
            }
        }
    }

    /// Remove the row `row_id` from the array group `element_id`.
    /// Missing elements or rows are logged and the operation is a no-op.
    pub fn remove_group(&mut self, element_id: &str, row_id: &str, dom: &mut dyn Surface) {
        match self.element_mut(element_id) {
            Some(Element::Array(array)) => array.remove_group(dom, row_id),
            Some(_) => warn!("element `{element_id}` is not an array group"),
            None => warn!("element `{element_id}` not found in form `{}`", self.base.id()),
        }
    }

    /// Aggregate the whole tree into an object keyed by child name.
    pub fn get_value(&self, dom: &dyn Surface) -> Value {
        let data = Value::Object(collect_values(&self.children, dom));
        debug!("exported data from form `{}`", self.base.id());
        data
    }

    /// Distribute an object to the whole tree by name, silently skipping
    /// children whose name is absent.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] when the value is not an
    /// object, or when a nested composite receives a wrong shape.
    pub fn set_value(&mut self, dom: &mut dyn Surface, value: &Value) -> Result<(), FormError> {
        let Some(data) = value.as_object() else {
            return Err(FormError::bad_shape(self.base.id(), "object", value));
        };
        debug!("importing data into form `{}`", self.base.id());
        distribute_values(&mut self.children, dom, data)
    }

    /// Reset every element to its construction-time value.
    pub fn reset(&mut self, dom: &mut dyn Surface) {
        debug!("resetting form `{}`", self.base.id());
        reset_children(&mut self.children, dom);
    }

    /// Gather the whole tree's value and publish it on the form's
    /// submit channel. Fire-and-forget; the collected value is also
    /// returned.
    pub fn submit(&self, dom: &dyn Surface, emitter: &mut Emitter) -> Value {
        debug!("submitting form `{}`", self.base.id());
        let data = self.get_value(dom);
        emitter.emit(&self.submit_event(), &data);
        data
    }

    /// Render the form: children in sorted order inside a layout
    /// wrapper, followed by the submit control.
    pub fn render(&self) -> String {
        if self.children.is_empty() {
            warn!("form `{}` has no elements to render", self.base.id());
        }

        let mut attrs = String::new();
        let class = if self.base.options().class_names.is_empty() {
            "app-form".to_string()
        } else {
            format!("{} app-form", self.base.options().class_names)
        };
        html::attr(&mut attrs, "class", &class);
        html::attr(&mut attrs, "id", self.base.id());
        html::attr_opt(&mut attrs, "action", &self.options.action);
        html::attr_opt(&mut attrs, "method", &self.options.method);
        html::attr_opt(&mut attrs, "style", &self.base.options().style);

        format!(
            "<form{attrs}>\n\
             <div class=\"row\">\n\
             {children}\n\
             </div>\n\
             <div class=\"row mt-1\"><div class=\"col text-center\">\n\
             <input type=\"submit\" class=\"btn btn-primary fw-bold\" value=\"{submit}\">\n\
             </div></div>\n\
             </form>",
            children = render_children(&self.children),
            submit = htmlize::escape_attribute(&self.options.submit_label),
        )
    }
}

/// Interpret a `properties` mapping into ordered elements.
///
/// Entries are parsed, sorted (explicit `order` ascending, arrays then
/// objects last, missing orders last in declaration order), and
/// dispatched by kind. Malformed or unsupported entries are skipped with
/// a diagnostic.
fn interpret_properties(
    form_id: &str,
    parent_id: &str,
    properties: &Map<String, Value>,
    required: &[String],
    registry: &SharedRegistry,
) -> Vec<(Element, PropertyConfig)> {
    let mut entries: Vec<(String, PropertyConfig)> = properties
        .iter()
        .filter_map(|(name, value)| {
            PropertyConfig::from_entry(name, value).map(|config| (name.clone(), config))
        })
        .collect();
    sort_properties(&mut entries);

    let mut elements = Vec::new();
    for (name, config) in entries {
        if let Some(element) = build_property(form_id, parent_id, &name, &config, required, registry)
        {
            registry.borrow_mut().register(element.id(), element.kind());
            elements.push((element, config));
        }
    }
    elements
}

/// Build the element for one property, or `None` when it is skipped.
fn build_property(
    form_id: &str,
    parent_id: &str,
    name: &str,
    config: &PropertyConfig,
    required: &[String],
    registry: &SharedRegistry,
) -> Option<Element> {
    match config.kind() {
        Some(PropertyKind::Object) => build_group(form_id, name, config, registry),
        Some(PropertyKind::Array) => build_array(form_id, parent_id, name, config, required, registry),
        Some(_) => build_input(parent_id, name, config, required, form_id),
        None => {
            warn!(
                "skipping property `{name}` with unsupported type {:?}",
                config.type_name.as_deref().unwrap_or("<missing>")
            );
            None
        }
    }
}

fn build_input(
    parent_id: &str,
    name: &str,
    config: &PropertyConfig,
    required: &[String],
    form_id: &str,
) -> Option<Element> {
    match factory::element_for_property(parent_id, name, config, required, Some(form_id))? {
        Ok(element) => Some(element),
        Err(err) => {
            warn!("skipping property `{name}`: {err}");
            None
        }
    }
}

fn build_group(
    form_id: &str,
    name: &str,
    config: &PropertyConfig,
    registry: &SharedRegistry,
) -> Option<Element> {
    let collapse = config.collapse.unwrap_or_default();
    let mut group = match Group::new(
        format!("g-{form_id}-{name}"),
        name,
        collapse.enabled,
        collapse.show,
        ElementOptions {
            form_id: Some(form_id.to_string()),
            ..ElementOptions::default()
        },
    ) {
        Ok(group) => group,
        Err(err) => {
            warn!("skipping property `{name}`: {err}");
            return None;
        }
    };

    let group_id = group.base().id().to_string();
    for (element, child_config) in
        interpret_properties(form_id, &group_id, &config.properties, &config.required, registry)
    {
        group.add_element(element, &child_config);
    }
    Some(Element::Group(group))
}

fn build_array(
    form_id: &str,
    parent_id: &str,
    name: &str,
    config: &PropertyConfig,
    required: &[String],
    registry: &SharedRegistry,
) -> Option<Element> {
    let Some(items) = config.items.as_deref() else {
        warn!("array property `{name}` has no items, skipping");
        return None;
    };

    if items.kind() != Some(PropertyKind::Object) {
        // Primitive item types collect as a single JSON-valued field.
        return build_input(parent_id, name, config, required, form_id);
    }

    let rows_collapsible = config
        .collapse
        .unwrap_or(CollapseConfig {
            enabled: false,
            show: false,
        })
        .enabled;
    let mut array = match ArrayGroup::new(
        format!("ag-{form_id}-{name}"),
        name,
        config.primary_keys.clone(),
        rows_collapsible,
        ElementOptions {
            form_id: Some(form_id.to_string()),
            ..ElementOptions::default()
        },
        registry.clone(),
    ) {
        Ok(array) => array,
        Err(err) => {
            warn!("skipping property `{name}`: {err}");
            return None;
        }
    };

    let array_id = array.base().id().to_string();
    for (element, child_config) in
        interpret_properties(form_id, &array_id, &items.properties, &items.required, registry)
    {
        array.add_template_element(element, child_config);
    }

    // Seed one editable row so the rendered form starts with an entry.
    if let Err(err) = array.push_row() {
        warn!("could not seed array group `{array_id}`: {err}");
    }
    Some(Element::Array(array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::surface::MemorySurface;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn primitive_form() -> Form {
        let schema = json!({
            "properties": {
                "host": { "type": "string", "title": "Host", "order": 1 },
                "port": { "type": "integer", "title": "Port", "order": 2 },
                "debug": { "type": "boolean", "title": "Debug", "order": 3 }
            },
            "required": ["host"]
        });
        Form::new(FormConfig::new("f", "settings", schema)).expect("form should build")
    }

    fn attach_primitives(dom: &mut MemorySurface) {
        dom.attach_input("f-host", "");
        dom.attach_input("f-port", "");
        dom.attach_checkbox("f-debug", false);
    }

    #[test]
    fn test_empty_identity_is_rejected() {
        let err = Form::new(FormConfig::new("", "settings", json!({}))).unwrap_err();
        assert!(matches!(err, FormError::InvalidConfiguration { .. }));

        let err = Form::new(FormConfig::new("f", "", json!({}))).unwrap_err();
        assert!(matches!(err, FormError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_render_order_follows_sort_rule() {
        init_logs();
        let schema = json!({
            "properties": {
                "a": { "type": "string", "title": "A", "order": 2 },
                "b": {
                    "type": "object",
                    "properties": { "x": { "type": "string", "title": "X" } }
                },
                "c": { "type": "string", "title": "C", "order": 1 },
                "d": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "y": { "type": "string", "title": "Y" } }
                    }
                }
            }
        });
        let form = Form::new(FormConfig::new("f", "ordered", schema)).unwrap();
        let markup = form.render();

        let position = |needle: &str| {
            markup
                .find(needle)
                .unwrap_or_else(|| panic!("`{needle}` missing from markup"))
        };
        let c = position("id=\"f-c\"");
        let a = position("id=\"f-a\"");
        let d = position("id=\"ag-f-d\"");
        let b = position("id=\"g-f-b\"");
        assert!(c < a && a < d && d < b, "expected order c, a, d, b");
    }

    #[test]
    fn test_roundtrip_is_idempotent() {
        let mut dom = MemorySurface::new();
        attach_primitives(&mut dom);
        let mut form = primitive_form();

        form.set_value(
            &mut dom,
            &json!({ "host": "localhost", "port": 8080, "debug": true }),
        )
        .unwrap();

        let first = form.get_value(&dom);
        form.set_value(&mut dom, &first).unwrap();
        let second = form.get_value(&dom);

        assert_eq!(first, json!({ "host": "localhost", "port": 8080, "debug": true }));
        assert_eq!(first, second, "set_value(get_value()) must be idempotent");
    }

    #[test]
    fn test_set_value_rejects_non_object() {
        let mut dom = MemorySurface::new();
        let mut form = primitive_form();
        let err = form.set_value(&mut dom, &json!([1])).unwrap_err();
        assert!(matches!(err, FormError::InvalidData { .. }));
    }

    #[test]
    fn test_submit_publishes_on_form_channel() {
        let mut dom = MemorySurface::new();
        attach_primitives(&mut dom);
        dom.attach_input("f-host", "example.com");

        let form = primitive_form();
        let mut emitter = Emitter::new();
        let seen = Rc::new(RefCell::new(None));

        let sink = seen.clone();
        emitter.on(form.submit_event(), move |payload| {
            *sink.borrow_mut() = Some(payload.clone());
        });

        let returned = form.submit(&dom, &mut emitter);
        assert_eq!(form.submit_event(), "form:f:submit");
        assert_eq!(seen.borrow().as_ref(), Some(&returned));
        assert_eq!(returned["host"], json!("example.com"));
    }

    #[test]
    fn test_empty_schema_still_submits() {
        init_logs();
        let form = Form::new(FormConfig::new("f", "empty", json!({}))).unwrap();
        let markup = form.render();
        assert!(markup.contains("type=\"submit\""), "an empty form still renders a submit control");

        let dom = MemorySurface::new();
        let mut emitter = Emitter::new();
        assert_eq!(form.submit(&dom, &mut emitter), json!({}));
    }

    #[test]
    fn test_invalid_schema_is_not_fatal() {
        let form = Form::new(FormConfig::new("f", "broken", json!("not a schema"))).unwrap();
        assert!(form.children().is_empty());
    }

    #[test]
    fn test_unknown_type_skips_only_that_property() {
        let schema = json!({
            "properties": {
                "weird": { "type": "unsupported", "title": "Weird" },
                "host": { "type": "string", "title": "Host" }
            }
        });
        let form = Form::new(FormConfig::new("f", "partial", schema)).unwrap();

        assert_eq!(form.children().len(), 1);
        assert!(form.element("f-host").is_some());
        assert!(form.element("f-weird").is_none());
    }

    #[test]
    fn test_untitled_primitive_is_skipped() {
        let schema = json!({
            "properties": {
                "untitled": { "type": "string" },
                "host": { "type": "string", "title": "Host" }
            }
        });
        let form = Form::new(FormConfig::new("f", "partial", schema)).unwrap();
        assert_eq!(form.children().len(), 1, "a primitive without a title cannot be labeled");
    }

    #[test]
    fn test_nested_group_values() {
        let schema = json!({
            "properties": {
                "net": {
                    "type": "object",
                    "properties": {
                        "host": { "type": "string", "title": "Host" },
                        "port": { "type": "integer", "title": "Port" }
                    },
                    "required": ["host"]
                }
            }
        });
        let mut form = Form::new(FormConfig::new("f", "nested", schema)).unwrap();
        let mut dom = MemorySurface::new();
        dom.attach_input("g-f-net-host", "");
        dom.attach_input("g-f-net-port", "");

        form.set_value(&mut dom, &json!({ "net": { "host": "h", "port": 1 } }))
            .unwrap();
        assert_eq!(form.get_value(&dom), json!({ "net": { "host": "h", "port": 1 } }));

        // The required flag comes from the nested schema's required list.
        let host = form.element("g-f-net-host").unwrap();
        match host {
            Element::Input(input) => assert!(input.base().options().required),
            other => panic!("expected an input, got {other:?}"),
        }
    }

    #[test]
    fn test_array_group_lifecycle_through_form() {
        init_logs();
        let schema = json!({
            "properties": {
                "servers": {
                    "type": "array",
                    "primary-keys": ["name"],
                    "items": {
                        "type": "object",
                        "properties": { "name": { "type": "string", "title": "Name" } }
                    }
                }
            }
        });
        let mut form = Form::new(FormConfig::new("f", "cluster", schema)).unwrap();

        // 解析 schema 时会预置一个空行
        match form.element("ag-f-servers").unwrap() {
            Element::Array(array) => assert_eq!(array.len(), 1),
            other => panic!("expected an array group, got {other:?}"),
        }

        let mut dom = MemorySurface::new();
        dom.attach_container("ag-f-servers");

        let markup = form.add_group("ag-f-servers", &mut dom).unwrap();
        assert!(markup.unwrap().contains("id=\"ag-f-servers-1\""));

        // The seeded row is blank, so the primary-key filter drops it.
        assert!(dom.set_input_value("ag-f-servers-name-1", "web-1"));
        assert_eq!(form.get_value(&dom), json!({ "servers": [{ "name": "web-1" }] }));

        form.remove_group("ag-f-servers", "ag-f-servers-1", &mut dom);
        assert_eq!(form.get_value(&dom), json!({ "servers": [] }));

        form.set_value(
            &mut dom,
            &json!({ "servers": [{ "name": "a" }, { "name": "b" }] }),
        )
        .unwrap();
        assert_eq!(
            form.get_value(&dom),
            json!({ "servers": [{ "name": "a" }, { "name": "b" }] })
        );
    }

    #[test]
    fn test_add_group_on_wrong_element_is_a_noop() {
        let mut form = primitive_form();
        let mut dom = MemorySurface::new();

        assert!(form.add_group("f-host", &mut dom).unwrap().is_none());
        assert!(form.add_group("f-missing", &mut dom).unwrap().is_none());
    }

    #[test]
    fn test_registry_records_all_elements() {
        let form = primitive_form();
        let registry = form.registry();
        let registry = registry.borrow();
        assert!(registry.contains("f-host"));
        assert!(registry.contains("f-port"));
        assert!(registry.contains("f-debug"));
        assert_eq!(registry.form_id(), "f");
    }

    #[test]
    fn test_from_type_derives_the_schema() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct NetConfig {
            #[schemars(title = "Host")]
            host: String,
            #[schemars(title = "Port")]
            port: i64,
            #[schemars(title = "Debug")]
            debug: bool,
        }

        let form = Form::from_type::<NetConfig>("net", "network", FormOptions::default())
            .expect("derived schema should build");

        assert_eq!(form.children().len(), 3);
        assert_eq!(form.element("net-host").map(Element::kind), Some(ElementKind::Text));
        assert_eq!(form.element("net-port").map(Element::kind), Some(ElementKind::Integer));
        assert_eq!(form.element("net-debug").map(Element::kind), Some(ElementKind::Boolean));

        // Non-optional fields are required in the derived schema.
        match form.element("net-host").unwrap() {
            Element::Input(input) => assert!(input.base().options().required),
            other => panic!("expected an input, got {other:?}"),
        }
    }

    #[test]
    fn test_render_includes_form_chrome() {
        let form = primitive_form();
        let markup = form.render();
        assert!(markup.starts_with("<form"));
        assert!(markup.contains("id=\"f\""));
        assert!(markup.contains("value=\"Submit\""));
    }
}
