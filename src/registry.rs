//! Per-form element registry.
//!
//! Every element registers its id here as it is constructed, so external
//! collaborators (an "add row" control, scripted access from the host) can
//! resolve ids against the live tree through [`Form::element`]. The
//! registry is owned by its form and threaded through construction; it is
//! never global state, so ids in different forms can never collide.
//!
//! [`Form::element`]: crate::form::Form::element

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::element::ElementKind;

/// Registry handle shared between a form and its repeatable groups, which
/// register freshly cloned elements as rows are added at runtime.
pub type SharedRegistry = Rc<RefCell<ElementRegistry>>;

/// Bookkeeping for the element ids registered to a single form.
#[derive(Debug)]
pub struct ElementRegistry {
    form_id: String,
    entries: HashMap<String, ElementKind>,
}

impl ElementRegistry {
    /// Create an empty registry scoped to one form id.
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            entries: HashMap::new(),
        }
    }

    /// Create a registry already wrapped for sharing.
    pub(crate) fn shared(form_id: impl Into<String>) -> SharedRegistry {
        Rc::new(RefCell::new(Self::new(form_id)))
    }

    /// Id of the form this registry belongs to.
    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Record an element id.
    ///
    /// A colliding id overwrites the previous entry and logs a diagnostic;
    /// this is not fatal, matching the behavior callers rely on when a
    /// schema reuses a key.
    pub fn register(&mut self, id: &str, kind: ElementKind) {
        if let Some(previous) = self.entries.insert(id.to_string(), kind) {
            warn!(
                "element `{id}` is already registered to form `{}` as {previous:?}, overwriting",
                self.form_id
            );
        } else {
            debug!("registered element `{id}` ({kind:?}) to form `{}`", self.form_id);
        }
    }

    /// Whether an id has ever been registered to this form.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered kind for an id, if any.
    pub fn kind(&self, id: &str) -> Option<ElementKind> {
        self.entries.get(id).copied()
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no ids.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
