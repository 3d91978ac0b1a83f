//! Event channel used to publish submitted form values.
//!
//! Consumers subscribe to named events; the form publishes its aggregated
//! value on `form:<formId>:submit` and does not expect a response. The
//! emitter is caller-owned, single-threaded, and fire-and-forget.

use std::collections::HashMap;

use serde_json::Value;

/// Handle returned by [`Emitter::on`], used to detach a handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&Value)>;

/// Minimal publish/subscribe emitter keyed by event name.
#[derive(Default)]
pub struct Emitter {
    next_id: u64,
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
}

impl Emitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to an event name.
    pub fn on(&mut self, event: impl Into<String>, handler: impl FnMut(&Value) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(event.into())
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Publish a payload to every handler subscribed to `event`.
    pub fn emit(&mut self, event: &str, payload: &Value) {
        if let Some(handlers) = self.handlers.get_mut(event) {
            for (_, handler) in handlers.iter_mut() {
                handler(payload);
            }
        }
    }

    /// Detach a single handler from an event.
    pub fn off(&mut self, event: &str, id: HandlerId) {
        if let Some(handlers) = self.handlers.get_mut(event) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
        }
    }

    /// Drop every handler subscribed to an event.
    pub fn clear(&mut self, event: &str) {
        self.handlers.remove(event);
    }

    /// Drop all handlers for all events.
    pub fn clear_all(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        f.debug_struct("Emitter").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_subscribers() {
        let mut emitter = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        emitter.on("form:f1:submit", move |payload| {
            sink.borrow_mut().push(payload.clone());
        });

        emitter.emit("form:f1:submit", &serde_json::json!({ "a": 1 }));
        emitter.emit("form:other:submit", &serde_json::json!({ "b": 2 }));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1, "only the subscribed event should be delivered");
        assert_eq!(seen[0], serde_json::json!({ "a": 1 }));
    }

    #[test]
    fn test_off_detaches_handler() {
        let mut emitter = Emitter::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        let id = emitter.on("tick", move |_| *sink.borrow_mut() += 1);

        emitter.emit("tick", &Value::Null);
        emitter.off("tick", id);
        emitter.emit("tick", &Value::Null);

        assert_eq!(*count.borrow(), 1, "detached handler must not fire again");
    }

    #[test]
    fn test_clear_drops_all_handlers_for_event() {
        let mut emitter = Emitter::new();
        let count = Rc::new(RefCell::new(0));

        for _ in 0..3 {
            let sink = count.clone();
            emitter.on("tick", move |_| *sink.borrow_mut() += 1);
        }

        emitter.clear("tick");
        emitter.emit("tick", &Value::Null);
        assert_eq!(*count.borrow(), 0);
    }
}
