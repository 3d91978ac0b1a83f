use serde_json::Value;

use crate::element::{ElementBase, ElementKind, ElementOptions};
use crate::error::FormError;
use crate::html;
use crate::surface::Surface;

/// Per-kind state and coercion policy of a primitive input.
#[derive(Debug, Clone)]
pub enum Control {
    /// Plain string input; no coercion.
    Text,
    /// Base-10 integer input; unparsable content collects as null.
    Integer,
    /// Checked/unchecked input with permissive write coercion.
    Boolean,
    /// JSON textarea; content is kept as formatted text and parsed on
    /// collection.
    Json {
        /// Textarea rows.
        rows: u32,
        /// Textarea columns.
        cols: u32,
    },
}

impl Control {
    /// JSON control with the default textarea geometry.
    pub fn json() -> Self {
        Control::Json { rows: 4, cols: 50 }
    }
}

/// Primitive leaf element bound to a single input surface by id.
///
/// The input keeps an internal copy of its value. The surface is
/// authoritative while attached; when it is not (`get_value` before the
/// markup is mounted, a removed node), operations fall back to the
/// internal copy with a logged warning and never fail.
#[derive(Debug, Clone)]
pub struct Input {
    base: ElementBase,
    control: Control,
}

impl Input {
    /// Build a primitive input.
    ///
    /// The initial value is normalized per kind (booleans coerce, JSON
    /// values are formatted to text) and becomes the reset target.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidConfiguration`] when `id`, `name`, or
    /// `label` is empty.
    pub fn new(
        control: Control,
        id: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
        value: Value,
        options: ElementOptions,
    ) -> Result<Self, FormError> {
        let value = match &control {
            Control::Boolean => Value::Bool(coerce_bool(&value)),
            Control::Json { .. } => Value::String(json_text(&value)),
            Control::Text | Control::Integer => value,
        };
        Ok(Self {
            base: ElementBase::new(id, name, label, value, options)?,
            control,
        })
    }

    /// Shared identity and options.
    pub fn base(&self) -> &ElementBase {
        &self.base
    }

    /// The control driving this input's behavior.
    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Concrete kind of this input.
    pub fn kind(&self) -> ElementKind {
        match self.control {
            Control::Text => ElementKind::Text,
            Control::Integer => ElementKind::Integer,
            Control::Boolean => ElementKind::Boolean,
            Control::Json { .. } => ElementKind::Json,
        }
    }

    /// Rebuild this input under a new id with the same name, label,
    /// current value, and options.
    pub fn clone_with_id(&self, new_id: impl Into<String>) -> Result<Self, FormError> {
        Ok(Self {
            base: ElementBase::new(
                new_id,
                self.base.name(),
                self.base.label(),
                self.base.value().clone(),
                self.base.options().clone(),
            )?,
            control: self.control.clone(),
        })
    }

    /// Collect the current value, coerced per kind.
    ///
    /// Detached surfaces fall back to the internal value; parse failures
    /// degrade to null (integer) or the raw string (JSON), never an
    /// error.
    pub fn get_value(&self, dom: &dyn Surface) -> Value {
        match &self.control {
            Control::Text => Value::String(self.surface_text(dom)),
            Control::Integer => {
                let raw = self.surface_text(dom);
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Value::Null;
                }
                match trimmed.parse::<i64>() {
                    Ok(parsed) => Value::Number(parsed.into()),
                    Err(_) => {
                        warn!("invalid integer value for `{}`: {raw:?}", self.base.id());
                        Value::Null
                    }
                }
            }
            Control::Boolean => match dom.checked(self.base.id()) {
                Some(checked) => Value::Bool(checked),
                None => {
                    warn!("element `{}` is not attached, using last known value", self.base.id());
                    self.base.value().clone()
                }
            },
            Control::Json { .. } => {
                let raw = self.surface_text(dom);
                if raw.trim().is_empty() {
                    return Value::Null;
                }
                match serde_json::from_str(&raw) {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        warn!("invalid JSON in `{}`, returning raw text", self.base.id());
                        Value::String(raw)
                    }
                }
            }
        }
    }

    /// Write a value to this input.
    ///
    /// The internal copy always updates; the surface write is skipped
    /// with a warning when the node is detached. Booleans coerce
    /// permissively, JSON values are formatted with indentation, text and
    /// integer inputs store the value uncoerced.
    pub fn set_value(&mut self, dom: &mut dyn Surface, value: &Value) {
        match &self.control {
            Control::Text | Control::Integer => {
                self.base.track_value(value.clone());
                self.write_text(dom, &display_text(value));
            }
            Control::Boolean => {
                let checked = coerce_bool(value);
                self.base.track_value(Value::Bool(checked));
                if !dom.set_checked(self.base.id(), checked) {
                    warn!("element `{}` is not attached, skipping surface write", self.base.id());
                }
            }
            Control::Json { .. } => {
                let text = json_text(value);
                self.write_text(dom, &text);
                self.base.track_value(Value::String(text));
            }
        }
    }

    /// Restore the construction-time value.
    pub fn reset(&mut self, dom: &mut dyn Surface) {
        self.base.restore_value();
        match &self.control {
            Control::Boolean => {
                let checked = coerce_bool(self.base.value());
                if !dom.set_checked(self.base.id(), checked) {
                    warn!("element `{}` is not attached, skipping surface write", self.base.id());
                }
            }
            _ => {
                let text = display_text(self.base.value());
                self.write_text(dom, &text);
            }
        }
    }

    /// Re-format the JSON text on the surface in place. A no-op for
    /// non-JSON controls, empty content, and unparsable content (which is
    /// left untouched for the user to fix).
    pub fn format_surface(&self, dom: &mut dyn Surface) {
        if !matches!(self.control, Control::Json { .. }) {
            return;
        }
        let Some(raw) = dom.input_value(self.base.id()) else {
            warn!("element `{}` is not attached, nothing to format", self.base.id());
            return;
        };
        if raw.trim().is_empty() {
            return;
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => {
                let text = json_text(&parsed);
                dom.set_input_value(self.base.id(), &text);
            }
            Err(_) => warn!("invalid JSON in `{}`, leaving text as-is", self.base.id()),
        }
    }

    /// Render this input as a self-contained markup fragment.
    pub fn render(&self) -> String {
        match &self.control {
            Control::Text => self.render_text_like("text", "text"),
            Control::Integer => self.render_text_like("number", "integer"),
            Control::Boolean => self.render_checkbox(),
            Control::Json { rows, cols } => self.render_textarea(*rows, *cols),
        }
    }

    fn surface_text(&self, dom: &dyn Surface) -> String {
        match dom.input_value(self.base.id()) {
            Some(text) => text,
            None => {
                warn!("element `{}` is not attached, using last known value", self.base.id());
                display_text(self.base.value())
            }
        }
    }

    fn write_text(&self, dom: &mut dyn Surface, text: &str) {
        if !dom.set_input_value(self.base.id(), text) {
            warn!("element `{}` is not attached, skipping surface write", self.base.id());
        }
    }

    fn placeholder(&self) -> &str {
        let configured = self.base.options().placeholder.as_str();
        if configured.is_empty() { self.base.name() } else { configured }
    }

    fn render_help(&self) -> String {
        let help = &self.base.options().help_text;
        if help.is_empty() {
            return String::new();
        }
        format!(
            "<div id=\"{}-help\" class=\"form-text help-text\">{}</div>",
            self.base.id(),
            html::text(help)
        )
    }

    fn render_text_like(&self, input_type: &str, data_type: &str) -> String {
        let options = self.base.options();
        let mut attrs = String::new();
        html::attr(&mut attrs, "type", input_type);
        html::attr(&mut attrs, "id", self.base.id());
        html::attr(&mut attrs, "name", self.base.name());
        html::attr_opt(&mut attrs, "class", &options.class_names);
        html::attr(&mut attrs, "placeholder", self.placeholder());
        html::attr(&mut attrs, "data-type", data_type);
        let value = display_text(self.base.value());
        html::attr_opt(&mut attrs, "value", &value);
        html::attr_opt(&mut attrs, "style", &options.style);
        if !options.help_text.is_empty() {
            html::attr(&mut attrs, "aria-describedby", &format!("{}-help", self.base.id()));
        }
        html::flag(&mut attrs, "required", options.required);

        format!(
            "<div class=\"form-floating\">\n\
             <input{attrs}>\n\
             <label class=\"input-label text-label\" for=\"{id}\">{label}</label>\n\
             {help}\
             </div>",
            id = self.base.id(),
            label = html::text(self.base.label()),
            help = self.render_help(),
        )
    }

    fn render_checkbox(&self) -> String {
        let options = self.base.options();
        let mut attrs = String::new();
        html::attr(&mut attrs, "type", "checkbox");
        html::attr(&mut attrs, "class", "form-check-input");
        html::attr(&mut attrs, "id", self.base.id());
        html::attr(&mut attrs, "name", self.base.name());
        html::attr(&mut attrs, "data-type", "boolean");
        html::attr_opt(&mut attrs, "style", &options.style);
        html::flag(&mut attrs, "checked", coerce_bool(self.base.value()));
        html::flag(&mut attrs, "required", options.required);

        format!(
            "<div class=\"form-group mb-3\">\n\
             <div class=\"form-check\">\n\
             <input{attrs}>\n\
             <label for=\"{id}\" class=\"form-check-label fw-bold\">{label}</label>\n\
             </div>\n\
             {help}\
             </div>",
            id = self.base.id(),
            label = html::text(self.base.label()),
            help = self.render_help(),
        )
    }

    fn render_textarea(&self, rows: u32, cols: u32) -> String {
        let options = self.base.options();
        let mut attrs = String::new();
        html::attr(&mut attrs, "id", self.base.id());
        html::attr(&mut attrs, "name", self.base.name());
        html::attr_opt(&mut attrs, "class", &options.class_names);
        html::attr_opt(&mut attrs, "style", &options.style);
        html::attr(&mut attrs, "rows", &rows.to_string());
        html::attr(&mut attrs, "cols", &cols.to_string());
        html::attr(&mut attrs, "data-type", "json");
        html::attr(&mut attrs, "placeholder", self.placeholder());
        html::flag(&mut attrs, "required", options.required);

        format!(
            "<div class=\"form-floating\">\n\
             <textarea{attrs}>{value}</textarea>\n\
             <label class=\"input-label object-label\" for=\"{id}\">{label}</label>\n\
             {help}\
             </div>",
            value = html::text(&display_text(self.base.value())),
            id = self.base.id(),
            label = html::text(self.base.label()),
            help = self.render_help(),
        )
    }
}

/// Permissive boolean write coercion: null is false, the strings "true"
/// and "1" are true, any other string is false, numbers follow
/// truthiness, structured values are true.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text representation written to the surface for text-like controls.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Text stored in a JSON control: raw strings pass through unchanged,
/// everything else is formatted with indentation.
fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}
