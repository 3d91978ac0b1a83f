use serde_json::Value;

use crate::element::{Element, ElementBase, ElementKind, ElementOptions, group::Group};
use crate::error::FormError;
use crate::html;
use crate::registry::SharedRegistry;
use crate::schema::PropertyConfig;
use crate::surface::Surface;

/// A template element and the property configuration it was built from,
/// used to instantiate each repeated row.
#[derive(Debug)]
struct TemplateEntry {
    element: Element,
    config: PropertyConfig,
}

/// One instantiated row: the issued index and the group holding the
/// cloned template elements.
#[derive(Debug)]
struct Row {
    index: usize,
    element: Element,
}

/// Repeatable container over a template of prototype elements.
///
/// Each `add_group` clones the template with an `-{index}` id suffix into
/// a fresh sub-group. Indices come from a monotonically increasing
/// generator: removing a row neither renumbers its siblings nor rewinds
/// the generator, so visible indices may have gaps but a new row can
/// never collide with a removed id. `set_value` clears all rows and
/// rewinds the generator before re-instantiating from the imported data.
#[derive(Debug)]
pub struct ArrayGroup {
    base: ElementBase,
    primary_keys: Vec<String>,
    rows_collapsible: bool,
    registry: SharedRegistry,
    template: Vec<TemplateEntry>,
    rows: Vec<Row>,
    next_index: usize,
}

impl ArrayGroup {
    /// Build an empty array group. The label is the group name.
    ///
    /// When `primary_keys` is non-empty, a row is exported by `get_value`
    /// only if every named field holds a non-null, non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id` or `name` is
    /// empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_keys: Vec<String>,
        rows_collapsible: bool,
        options: ElementOptions,
        registry: SharedRegistry,
    ) -> Result<Self, FormError> {
        let name = name.into();
        Ok(Self {
            base: ElementBase::new(id, name.clone(), name, Value::Array(Vec::new()), options)?,
            primary_keys,
            rows_collapsible,
            registry,
            template: Vec::new(),
            rows: Vec::new(),
            next_index: 0,
        })
    }

    /// Shared identity and options.
    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    /// Number of instantiated rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are instantiated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Instantiated row groups in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &Element> {
        self.rows.iter().map(|row| &row.element)
    }

    /// Append a prototype element to the template. Template elements are
    /// never collected directly; they exist to be cloned into rows.
    pub fn add_template_element(&mut self, element: Element, config: PropertyConfig) {
        self.template.push(TemplateEntry { element, config });
    }

    /// Instantiate one row from the template and return its markup.
    ///
    /// Used during the initial render pass, when there is no live
    /// container to append to yet.
    pub(crate) fn push_row(&mut self) -> Result<String, FormError> {
        let index = self.next_index;
        let row_id = format!("{}-{index}", self.base.id());

        let mut group = Group::new(
            format!("ag-{row_id}"),
            row_id.clone(),
            self.rows_collapsible,
            false,
            ElementOptions {
                form_id: self.base.options().form_id.clone(),
                ..ElementOptions::default()
            },
        )?;
        for entry in &self.template {
            let clone = entry
                .element
                .clone_with_id(format!("{}-{index}", entry.element.id()))?;
            self.registry.borrow_mut().register(clone.id(), clone.kind());
            group.add_element(clone, &entry.config);
        }
        self.registry
            .borrow_mut()
            .register(group.base().id(), ElementKind::Group);

        let element = Element::Group(group);
        let markup = render_row(&row_id, self.base.id(), &element);
        self.rows.push(Row { index, element });
        self.next_index += 1;
        debug!(
            "array group `{}` now has {} rows (next index {})",
            self.base.id(),
            self.rows.len(),
            self.next_index
        );
        Ok(markup)
    }

    /// Add a row to the live form: instantiate from the template and
    /// append the markup to this group's container node. A missing
    /// container is logged and skipped; the row still exists and renders
    /// on the next full render.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] only when a template
    /// id concatenation produces an invalid clone id, which cannot happen
    /// for ids issued by a form.
    pub fn add_group(&mut self, dom: &mut dyn Surface) -> Result<String, FormError> {
        let markup = self.push_row()?;
        if !dom.append_markup(self.base.id(), &markup) {
            warn!("container for array group `{}` not found", self.base.id());
        }
        Ok(markup)
    }

    /// Remove the row whose container node is `row_id` (the id issued as
    /// `{arrayGroupId}-{index}`).
    ///
    /// A missing node is logged and the operation is a no-op. Remaining
    /// rows keep their indices.
    pub fn remove_group(&mut self, dom: &mut dyn Surface, row_id: &str) {
        if !dom.remove_node(row_id) {
            warn!("group element `{row_id}` not found, nothing removed");
            return;
        }
        let group_id = format!("ag-{row_id}");
        let before = self.rows.len();
        self.rows.retain(|row| row.element.id() != group_id);
        if self.rows.len() == before {
            warn!(
                "no instantiated group `{group_id}` in array group `{}`",
                self.base.id()
            );
        } else {
            debug!("removed group `{group_id}` from array group `{}`", self.base.id());
        }
    }

    /// Collect one object per row, filtered by the primary-key
    /// predicate.
    pub fn get_value(&self, dom: &dyn Surface) -> Value {
        let mut data = Vec::new();
        for row in &self.rows {
            let value = row.element.get_value(dom);
            if self.has_primary_key_values(&value) {
                data.push(value);
            }
        }
        debug!(
            "exported {} of {} rows from array group `{}`",
            data.len(),
            self.rows.len(),
            self.base.id()
        );
        Value::Array(data)
    }

    /// Replace all rows with one per entry of the imported array,
    /// skipping null entries. Existing row nodes are removed through the
    /// surface and the index generator rewinds to zero.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidData`] when the value is not an
    /// array.
    pub fn set_value(&mut self, dom: &mut dyn Surface, value: &Value) -> Result<(), FormError> {
        let Some(entries) = value.as_array() else {
            return Err(FormError::bad_shape(self.base.id(), "array", value));
        };

        for row in &self.rows {
            let row_id = format!("{}-{}", self.base.id(), row.index);
            if !dom.remove_node(&row_id) {
                debug!("row `{row_id}` was not attached during rebuild");
            }
        }
        self.rows.clear();
        self.next_index = 0;

        debug!(
            "importing {} entries into array group `{}`",
            entries.len(),
            self.base.id()
        );
        for entry in entries {
            if entry.is_null() {
                continue;
            }
            self.add_group(dom)?;
            if let Some(row) = self.rows.last_mut() {
                row.element.set_value(dom, entry)?;
            }
        }
        Ok(())
    }

    /// Reset every instantiated row.
    pub fn reset(&mut self, dom: &mut dyn Surface) {
        debug!("resetting array group `{}`", self.base.id());
        for row in &mut self.rows {
            row.element.reset(dom);
        }
    }

    /// Rebuild an empty array group under a new id with the same name,
    /// primary keys, flags, and options, sharing this group's registry.
    /// The template and rows are not carried over.
    pub fn clone_with_id(&self, new_id: impl Into<String>) -> Result<Self, FormError> {
        Self::new(
            new_id,
            self.base.name(),
            self.primary_keys.clone(),
            self.rows_collapsible,
            self.base.options().clone(),
            self.registry.clone(),
        )
    }

    /// Render the group chrome, the add-row control, and every
    /// instantiated row inside the container node markup.
    pub fn render(&self) -> String {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let row_id = format!("{}-{}", self.base.id(), row.index);
                render_row(&row_id, self.base.id(), &row.element)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<div class=\"col-12\">\n\
             <div class=\"row array-group-box rounded\">\n\
             <span class=\"group-header{class}\" data-toggle=\"collapse\" data-target=\"#{id}\">{name} config</span>\n\
             <button type=\"button\" class=\"array-group-add\" data-action=\"add-group\" data-element=\"{id}\">+</button>\n\
             <div class=\"collapse show form-input-group\" id=\"{id}\">\n\
             {rows}\n\
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

    fn has_primary_key_values(&self, value: &Value) -> bool {
        if self.primary_keys.is_empty() {
            return true;
        }
        let Some(map) = value.as_object() else {
            return false;
        };
        self.primary_keys.iter().all(|key| match map.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        })
    }

    pub(crate) fn find(&self, id: &str) -> Option<&Element> {
        self.template
            .iter()
            .find_map(|entry| entry.element.find(id))
            .or_else(|| self.rows.iter().find_map(|row| row.element.find(id)))
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if let Some(pos) = self
            .template
            .iter()
            .position(|entry| entry.element.find(id).is_some())
        {
            return self.template[pos].element.find_mut(id);
        }
        self.rows.iter_mut().find_map(|row| row.element.find_mut(id))
    }
}

/// Wrap a rendered row group in its removable container node.
fn render_row(row_id: &str, array_id: &str, group: &Element) -> String {
    format!(
        "<div class=\"row array-group-item\" id=\"{row_id}\">\n\
         <div class=\"col-11\"><div class=\"row\">{inner}</div></div>\n\
         <div class=\"col-1\"><button type=\"button\" class=\"array-group-remove\" \
         data-action=\"remove-group\" data-element=\"{array_id}\" data-group=\"{row_id}\">-</button></div>\n\
         </div>",
        inner = group.render(),
    )
}
