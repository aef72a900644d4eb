//! History backend abstraction
//!
//! The router never touches a global history object. It talks to a
//! [`History`] implementation and receives back/forward and link clicks as
//! [`NavigationEvent`]s that the host forwards from its own listeners.
//! [`MemoryHistory`] is the in-process backend used by tests and by hosts
//! without a browser.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Native history stack, as the router needs it
pub trait History: Send + Sync {
    /// Current location (path and query, or a full href)
    fn location(&self) -> String;

    /// Adds an entry and makes it current
    fn push_state(&self, url: &str);

    /// Called once when the router starts listening
    fn attach(&self) {}

    /// Called when the router stops listening
    fn detach(&self) {}
}

/// Events the host forwards to the router
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// Back/forward moved the current entry
    PopState,
    /// A click landed on an element
    Click(AnchorClick),
}

/// The parts of a click target the router inspects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorClick {
    /// Element tag name (`"A"`, `"a"`, `"BUTTON"`…)
    pub tag: String,
    pub href: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl AnchorClick {
    /// Click on `<a href="...">`
    pub fn anchor(href: impl Into<String>) -> Self {
        Self {
            tag: "A".to_string(),
            href: Some(href.into()),
            attributes: HashMap::new(),
        }
    }

    /// Click on some other element
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is_anchor(&self) -> bool {
        self.tag.eq_ignore_ascii_case("a")
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// What the router did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not ours; for a click the browser's default behaviour applies
    Ignored,
    /// Taken over by the router. `navigated` is false when a click pointed
    /// at the current URL or the target was refused as unsafe.
    Handled { navigated: bool },
}

impl EventOutcome {
    /// Whether the host should cancel the native click
    pub fn prevents_default(&self) -> bool {
        matches!(self, EventOutcome::Handled { .. })
    }
}

/// In-memory history stack
pub struct MemoryHistory {
    inner: Mutex<MemoryStack>,
}

struct MemoryStack {
    entries: Vec<String>,
    index: usize,
    listeners: usize,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryStack {
                entries: vec![initial.into()],
                index: 0,
                listeners: 0,
            }),
        }
    }

    fn stack(&self) -> MutexGuard<'_, MemoryStack> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves one entry back; false at the start of the stack
    pub fn back(&self) -> bool {
        let mut stack = self.stack();
        if stack.index == 0 {
            return false;
        }
        stack.index -= 1;
        true
    }

    /// Moves one entry forward; false at the end of the stack
    pub fn forward(&self) -> bool {
        let mut stack = self.stack();
        if stack.index + 1 >= stack.entries.len() {
            return false;
        }
        stack.index += 1;
        true
    }

    /// Entries up to and including the forward tail
    pub fn entries(&self) -> Vec<String> {
        self.stack().entries.clone()
    }

    /// Number of currently attached routers
    pub fn listener_count(&self) -> usize {
        self.stack().listeners
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        let stack = self.stack();
        stack.entries[stack.index].clone()
    }

    fn push_state(&self, url: &str) {
        let mut stack = self.stack();
        let next = stack.index + 1;
        // A push discards the forward tail
        stack.entries.truncate(next);
        stack.entries.push(url.to_string());
        stack.index = next;
    }

    fn attach(&self) {
        self.stack().listeners += 1;
    }

    fn detach(&self) {
        let mut stack = self.stack();
        stack.listeners = stack.listeners.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_back_forward() {
        let history = MemoryHistory::new("/");
        history.push_state("/a");
        history.push_state("/b");
        assert_eq!(history.location(), "/b");

        assert!(history.back());
        assert_eq!(history.location(), "/a");
        assert!(history.forward());
        assert_eq!(history.location(), "/b");
        assert!(!history.forward());
    }

    #[test]
    fn test_push_discards_forward_tail() {
        let history = MemoryHistory::new("/");
        history.push_state("/a");
        history.push_state("/b");
        history.back();
        history.push_state("/c");
        assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
        assert!(!history.forward());
    }

    #[test]
    fn test_back_at_start() {
        let history = MemoryHistory::default();
        assert!(!history.back());
        assert_eq!(history.location(), "/");
    }

    #[test]
    fn test_listener_count() {
        let history = MemoryHistory::default();
        history.attach();
        assert_eq!(history.listener_count(), 1);
        history.detach();
        history.detach();
        assert_eq!(history.listener_count(), 0);
    }

    #[test]
    fn test_anchor_click_helpers() {
        let click = AnchorClick::anchor("/about").with_attribute("data-router-ignore", "");
        assert!(click.is_anchor());
        assert!(click.has_attribute("data-router-ignore"));
        assert!(!AnchorClick::element("BUTTON").is_anchor());
        assert!(EventOutcome::Handled { navigated: false }.prevents_default());
        assert!(!EventOutcome::Ignored.prevents_default());
    }
}
