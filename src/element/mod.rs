//! Form element tree.
//!
//! Every node of a form implements the same capability set: render to
//! markup, collect a value, restore a value, reset, and rebuild under a
//! new id. The node kinds form a closed set:
//!
//! - [`Input`] - primitive leaf bound to one input surface
//! - [`Group`] - ordered container aggregating children by name
//! - [`ArrayGroup`] - repeatable container instantiating a template
//!
//! Dispatch is an exhaustive match over [`Element`], so adding a kind
//! forces every operation to handle it.

use serde_json::Value;

use crate::error::FormError;
use crate::surface::Surface;

/// Repeatable array-of-objects container.
pub mod array_group;

/// Schema-kind to input construction.
pub mod factory;

/// Ordered object container and its layout cell.
pub mod group;

/// Primitive input elements and their coercion rules.
pub mod input;

pub use array_group::ArrayGroup;
pub use group::{Column, Group};
pub use input::{Control, Input};

/// Concrete kind of an element, used for registry diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain string input.
    Text,
    /// Base-10 integer input.
    Integer,
    /// Checked/unchecked input.
    Boolean,
    /// JSON textarea.
    Json,
    /// Object container.
    Group,
    /// Repeatable array container.
    Array,
}

/// Presentation and behavior options shared by every element.
///
/// Options are fixed at construction; elements never mutate them.
#[derive(Debug, Clone, Default)]
pub struct ElementOptions {
    /// Whether the field is required.
    pub required: bool,
    /// Input placeholder; falls back to the element name when empty.
    pub placeholder: String,
    /// Help text rendered under the field.
    pub help_text: String,
    /// CSS classes passed through to the rendered control.
    pub class_names: String,
    /// Inline style passed through to the rendered control.
    pub style: String,
    /// Id of the owning form, when built by one.
    pub form_id: Option<String>,
}

/// Identity and value state shared by every element.
///
/// `id` and `name` are validated non-empty at construction and immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct ElementBase {
    id: String,
    name: String,
    label: String,
    value: Value,
    original_value: Value,
    options: ElementOptions,
}

impl ElementBase {
    /// Validate identity fields and capture the initial value for reset.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id`, `name`, or
    /// `label` is empty.
    pub(crate) fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
        value: Value,
        options: ElementOptions,
    ) -> Result<Self, FormError> {
        let id = id.into();
        let name = name.into();
        let label = label.into();
        if id.is_empty() {
            return Err(FormError::missing_field(&id, "id"));
        }
        if name.is_empty() {
            return Err(FormError::missing_field(&id, "name"));
        }
        if label.is_empty() {
            return Err(FormError::missing_field(&id, "label"));
        }
        Ok(Self {
            id,
            name,
            label,
            original_value: value.clone(),
            value,
            options,
        })
    }

    /// Unique id within the owning form.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Schema property key this element answers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Last value written through `set_value` (or the initial value).
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Construction-time value restored by `reset`.
    pub fn original_value(&self) -> &Value {
        &self.original_value
    }

    /// Shared options.
    pub fn options(&self) -> &ElementOptions {
        &self.options
    }

    /// Update the internally tracked value.
    pub(crate) fn track_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Restore the internally tracked value to the construction value.
    pub(crate) fn restore_value(&mut self) {
        self.value = self.original_value.clone();
    }
}

/// A node in the form tree.
#[derive(Debug)]
pub enum Element {
    /// Primitive leaf input.
    Input(Input),
    /// Object container.
    Group(Group),
    /// Repeatable array container.
    Array(ArrayGroup),
}

impl Element {
    fn base(&self) -> &ElementBase {
        match self {
            Element::Input(input) => input.base(),
            Element::Group(group) => group.base(),
            Element::Array(array) => array.base(),
        }
    }

    /// Unique id within the owning form.
    pub fn id(&self) -> &str {
        self.base().id()
    }

    /// Schema property key this element answers to.
    pub fn name(&self) -> &str {
        self.base().name()
    }

    /// Display label.
    pub fn label(&self) -> &str {
        self.base().label()
    }

    /// Concrete kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Input(input) => input.kind(),
            Element::Group(_) => ElementKind::Group,
            Element::Array(_) => ElementKind::Array,
        }
    }

    /// Whether this element is a leaf bound to a single input surface.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Element::Input(_))
    }

    /// Render this element and its subtree to a self-contained markup
    /// fragment.
    pub fn render(&self) -> String {
        match self {
            Element::Input(input) => input.render(),
            Element::Group(group) => group.render(),
            Element::Array(array) => array.render(),
        }
    }

    /// Collect this element's current value from the surface.
    pub fn get_value(&self, dom: &dyn Surface) -> Value {
        match self {
            Element::Input(input) => input.get_value(dom),
            Element::Group(group) => group.get_value(dom),
            Element::Array(array) => array.get_value(dom),
        }
    }

    /// Distribute a value into this element and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] when a composite receives a
    /// structurally wrong shape. Primitive writes never fail.
    pub fn set_value(&mut self, dom: &mut dyn Surface, value: &Value) -> Result<(), FormError> {
        match self {
            Element::Input(input) => {
                input.set_value(dom, value);
                Ok(())
            }
            Element::Group(group) => group.set_value(dom, value),
            Element::Array(array) => array.set_value(dom, value),
        }
    }

    /// Restore this element and its subtree to construction-time values.
    pub fn reset(&mut self, dom: &mut dyn Surface) {
        match self {
            Element::Input(input) => input.reset(dom),
            Element::Group(group) => group.reset(dom),
            Element::Array(array) => array.reset(dom),
        }
    }

    /// Rebuild an element of the same kind, label, name, value, and
    /// options under a new id. Children of composites are not carried
    /// over; repeatable groups re-instantiate their own rows.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `new_id` is empty.
    pub fn clone_with_id(&self, new_id: impl Into<String>) -> Result<Element, FormError> {
        match self {
            Element::Input(input) => Ok(Element::Input(input.clone_with_id(new_id)?)),
            Element::Group(group) => Ok(Element::Group(group.clone_with_id(new_id)?)),
            Element::Array(array) => Ok(Element::Array(array.clone_with_id(new_id)?)),
        }
    }

    /// Depth-first search for an element by id, this node included.
    pub(crate) fn find(&self, id: &str) -> Option<&Element> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Element::Input(_) => None,
            Element::Group(group) => group.children().iter().find_map(|child| child.element.find(id)),
            Element::Array(array) => array.find(id),
        }
    }

    /// Depth-first search for a mutable element by id, this node included.
    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Element::Input(_) => None,
            Element::Group(group) => group
                .children_mut()
                .iter_mut()
                .find_map(|child| child.element.find_mut(id)),
            Element::Array(array) => array.find_mut(id),
        }
    }
}
