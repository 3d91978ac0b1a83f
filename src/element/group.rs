use serde_json::{Map, Value};

use crate::element::{Element, ElementBase, ElementOptions};
use crate::error::FormError;
use crate::html;
use crate::schema::PropertyConfig;
use crate::surface::Surface;

/// Layout cell wrapping a primitive child inside a container row.
///
/// The position hint comes from the property's `col-position`: `occupy`
/// and `full` take the whole row, `pre-empty`/`post-empty` pad with an
/// empty cell, any other value is passed through as the column class.
#[derive(Debug, Clone, Default)]
pub struct Column {
    position: Option<String>,
    class_names: String,
}

impl Column {
    /// Build a cell from a property's layout hint.
    pub fn new(position: Option<String>) -> Self {
        Self {
            position,
            class_names: "px-1 py-1".to_string(),
        }
    }

    /// Wrap rendered child markup in this cell.
    pub fn render(&self, inner: &str) -> String {
        const DEFAULT_COL: &str = "col-lg-6 col-md-6 col-sm-12 col-12";

        let mut col_class = DEFAULT_COL.to_string();
        let mut row_break = "";
        match self.position.as_deref() {
            Some("occupy") => {
                col_class = "col".to_string();
                row_break = "<div class=\"w-100\"></div>";
            }
            Some("full") => col_class = "col-12".to_string(),
            Some("pre-empty") | Some("post-empty") | None => {}
            Some(custom) => {
                col_class = format!("{custom} col-sm-12");
                row_break = "<div class=\"w-100 d-lg-none d-md-none d-sm-block\"></div>";
            }
        }

        let empty_cell = format!(
            "<div class=\"{}\" style=\"min-height: 74px\"></div>",
            self.class_names
        );
        let mut markup = format!(
            "<div class=\"{col_class} {}\">{inner}</div>{row_break}",
            self.class_names
        );
        match self.position.as_deref() {
            Some("pre-empty") => markup = format!("{empty_cell}{markup}"),
            Some("post-empty") => markup.push_str(&empty_cell),
            _ => {}
        }
        markup
    }
}

/// One contained child: the element plus its layout cell, when primitive.
#[derive(Debug)]
pub struct Child {
    /// Cell wrapper; present only for primitive children.
    pub(crate) column: Option<Column>,
    /// The contained element.
    pub(crate) element: Element,
}

impl Child {
    /// The contained element.
    pub fn element(&self) -> &Element {
        &self.element
    }
}

/// Ordered container aggregating children into an object keyed by child
/// name. Collapsibility is presentation only and never affects values.
#[derive(Debug)]
pub struct Group {
    base: ElementBase,
    collapse: bool,
    show: bool,
    children: Vec<Child>,
}

impl Group {
    /// Build an empty group. The label is the group name.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id` or `name` is
    /// empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        collapse: bool,
        show: bool,
        options: ElementOptions,
    ) -> Result<Self, FormError> {
        let name = name.into();
        Ok(Self {
            base: ElementBase::new(id, name.clone(), name, Value::Object(Map::new()), options)?,
            collapse,
            show,
            children: Vec::new(),
        })
    }

    /// Shared identity and options.
    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    /// Contained children in insertion order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Child] {
        &mut self.children
    }

    /// Append a child. Primitive children are wrapped in a layout cell
    /// derived from the property's `col-position`; composites are
    /// contained directly. Children render in insertion order.
    pub fn add_element(&mut self, element: Element, config: &PropertyConfig) {
        self.children.push(make_child(element, config));
    }

    /// Rebuild an empty group under a new id with the same name, flags,
    /// and options. Children are not carried over.
    pub fn clone_with_id(&self, new_id: impl Into<String>) -> Result<Self, FormError> {
        let mut clone = Self::new(
            new_id,
            self.base.name(),
            self.collapse,
            self.show,
            self.base.options().clone(),
        )?;
        clone.base.track_value(self.base.value().clone());
        Ok(clone)
    }

    /// Aggregate children into an object keyed by child name.
    pub fn get_value(&self, dom: &dyn Surface) -> Value {
        Value::Object(collect_values(&self.children, dom))
    }

    /// Distribute an object to children by name, silently skipping
    /// children whose name is absent.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] when the value is not an
    /// object.
    pub fn set_value(&mut self, dom: &mut dyn Surface, value: &Value) -> Result<(), FormError> {
        let Some(data) = value.as_object() else {
            return Err(FormError::bad_shape(self.base.id(), "object", value));
        };
        debug!("importing data into group `{}`", self.base.id());
        distribute_values(&mut self.children, dom, data)
    }

    /// Reset every child unconditionally.
    pub fn reset(&mut self, dom: &mut dyn Surface) {
        debug!("resetting group `{}`", self.base.id());
        reset_children(&mut self.children, dom);
    }

    /// Render children in insertion order, inside collapsible chrome
    /// when enabled.
    pub fn render(&self) -> String {
        let inner = render_children(&self.children);
        if !self.collapse {
            return inner;
        }

        let show = if self.show { " show" } else { "" };
        format!(
            "<div class=\"col-12\">\n\
             <div class=\"row form-group-box rounded\">\n\
             <span class=\"group-header{class}\" data-toggle=\"collapse\" data-target=\"#{id}\">{name} config</span>\n\
             <div class=\"collapse{show} form-input-group\" id=\"{id}\">\n\
             <div class=\"row group-item\"><div class=\"col-12\"><div class=\"row\">\n\
             {inner}\n\
             </div></div></div>\n\
             </div>\n\
             </div>\n\
             </div>",
            class = if self.base.options().class_names.is_empty() {
                String::new()
            } else {
                format!(" {}", self.base.options().class_names)
            },
            id = self.base.id(),
            name = html::text(self.base.name()),
        )
    }
}

/// Wrap an element for containment: primitives get a layout cell derived
/// from the property's `col-position`, composites are contained directly.
pub(crate) fn make_child(element: Element, config: &PropertyConfig) -> Child {
    let column = element
        .is_primitive()
        .then(|| Column::new(config.col_position.clone()));
    Child { column, element }
}

/// Render a child sequence in insertion order, applying layout cells to
/// primitive children.
pub(crate) fn render_children(children: &[Child]) -> String {
    children
        .iter()
        .map(|child| match &child.column {
            Some(column) => column.render(&child.element.render()),
            None => child.element.render(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collect a child sequence into an object keyed by child name.
pub(crate) fn collect_values(children: &[Child], dom: &dyn Surface) -> Map<String, Value> {
    let mut data = Map::new();
    for child in children {
        data.insert(child.element.name().to_string(), child.element.get_value(dom));
    }
    data
}

/// Distribute an object to a child sequence by name, skipping absent
/// names.
pub(crate) fn distribute_values(
    children: &mut [Child],
    dom: &mut dyn Surface,
    data: &Map<String, Value>,
) -> Result<(), FormError> {
    for child in children {
        if let Some(value) = data.get(child.element.name()) {
            child.element.set_value(dom, value)?;
        }
    }
    Ok(())
}

/// Reset every child in a sequence.
pub(crate) fn reset_children(children: &mut [Child], dom: &mut dyn Surface) {
    for child in children {
        child.element.reset(dom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::input::{Control, Input};
    use crate::surface::MemorySurface;
    use serde_json::json;

    fn group_with_inputs() -> Group {
        let mut group = Group::new("g-f-net", "net", true, false, ElementOptions::default()).unwrap();
        let host = Input::new(
            Control::Text,
            "g-f-net-host",
            "host",
            "Host",
            Value::String(String::new()),
            ElementOptions::default(),
        )
        .unwrap();
        let port = Input::new(
            Control::Integer,
            "g-f-net-port",
            "port",
            "Port",
            Value::Null,
            ElementOptions::default(),
        )
        .unwrap();
        group.add_element(Element::Input(host), &PropertyConfig::default());
        group.add_element(Element::Input(port), &PropertyConfig::default());
        group
    }

    fn attached_dom() -> MemorySurface {
        let mut dom = MemorySurface::new();
        dom.attach_input("g-f-net-host", "");
        dom.attach_input("g-f-net-port", "");
        dom
    }

    #[test]
    fn test_empty_identity_is_rejected() {
        let err = Group::new("", "net", true, false, ElementOptions::default()).unwrap_err();
        assert!(matches!(err, FormError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_value_roundtrip_is_idempotent() {
        let mut dom = attached_dom();
        let mut group = group_with_inputs();

        group
            .set_value(&mut dom, &json!({ "host": "localhost", "port": 8080 }))
            .unwrap();

        let first = group.get_value(&dom);
        group.set_value(&mut dom, &first).unwrap();
        let second = group.get_value(&dom);

        assert_eq!(first, json!({ "host": "localhost", "port": 8080 }));
        assert_eq!(first, second, "set_value(get_value()) must be idempotent");
    }

    #[test]
    fn test_set_value_skips_absent_names() {
        let mut dom = attached_dom();
        let mut group = group_with_inputs();

        group
            .set_value(&mut dom, &json!({ "host": "a", "port": 1 }))
            .unwrap();
        group.set_value(&mut dom, &json!({ "host": "b" })).unwrap();

        assert_eq!(
            group.get_value(&dom),
            json!({ "host": "b", "port": 1 }),
            "children absent from the input keep their value"
        );
    }

    #[test]
    fn test_set_value_rejects_non_object() {
        let mut dom = attached_dom();
        let mut group = group_with_inputs();

        let err = group.set_value(&mut dom, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, FormError::InvalidData { .. }));
    }

    #[test]
    fn test_reset_recurses_to_all_children() {
        let mut dom = attached_dom();
        let mut group = group_with_inputs();

        group
            .set_value(&mut dom, &json!({ "host": "x", "port": 9 }))
            .unwrap();
        group.reset(&mut dom);

        assert_eq!(group.get_value(&dom), json!({ "host": "", "port": null }));
    }

    #[test]
    fn test_render_collapsible_chrome() {
        let group = group_with_inputs();
        let markup = group.render();
        assert!(markup.contains("data-target=\"#g-f-net\""));
        assert!(markup.contains("id=\"g-f-net\""));
        assert!(markup.contains("net config"));
    }

    #[test]
    fn test_render_without_collapse_is_bare_children() {
        let mut group = Group::new("g-f-net", "net", false, false, ElementOptions::default()).unwrap();
        let host = Input::new(
            Control::Text,
            "g-f-net-host",
            "host",
            "Host",
            Value::Null,
            ElementOptions::default(),
        )
        .unwrap();
        group.add_element(Element::Input(host), &PropertyConfig::default());

        let markup = group.render();
        assert!(!markup.contains("group-header"));
        assert!(markup.contains("data-type=\"text\""));
    }

    #[test]
    fn test_column_positions() {
        assert!(Column::new(None).render("x").contains("col-lg-6"));
        assert!(Column::new(Some("full".into())).render("x").contains("col-12"));
        assert!(Column::new(Some("occupy".into())).render("x").contains("w-100"));
        assert!(
            Column::new(Some("pre-empty".into()))
                .render("x")
                .starts_with("<div class=\"px-1 py-1\" style=\"min-height: 74px\">"),
            "pre-empty pads with a leading cell"
        );
        assert!(Column::new(Some("col-3".into())).render("x").contains("col-3 col-sm-12"));
    }
}
