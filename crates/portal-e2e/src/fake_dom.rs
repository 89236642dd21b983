//! In-memory document for exercising the resolver without a browser.
//!
//! Elements are flat: each carries its own attributes and text, so the
//! role+name match compares against that text directly. Timing behaviour
//! (elements appearing late, becoming visible or clickable after a few checks)
//! is counted in calls rather than wall-clock time, which keeps tests
//! deterministic.

use crate::driver::{Document, ElementHandle};
use crate::locator::Selector;
use crate::result::{PortalError, PortalResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Element description for `FakeDocument`
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    tag_name: String,
    attributes: HashMap<String, String>,
    text: String,
    displayed: bool,
    enabled: bool,
    appears_after_polls: u32,
    hidden_checks: u32,
    disabled_checks: u32,
    navigates_to: Option<String>,
    click_error: Option<String>,
}

impl FakeElement {
    /// Create a displayed, enabled element
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set `aria-label`
    #[must_use]
    pub fn aria_label(self, label: impl Into<String>) -> Self {
        self.attr("aria-label", label)
    }

    /// Set `data-testid`
    #[must_use]
    pub fn test_id(self, id: impl Into<String>) -> Self {
        self.attr("data-testid", id)
    }

    /// Set `role`
    #[must_use]
    pub fn role(self, role: impl Into<String>) -> Self {
        self.attr("role", role)
    }

    /// Set text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Never displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Never enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Absent from the document for the first `polls` lookups
    #[must_use]
    pub const fn appears_after(mut self, polls: u32) -> Self {
        self.appears_after_polls = polls;
        self
    }

    /// Reports hidden for the first `checks` visibility checks
    #[must_use]
    pub const fn visible_after(mut self, checks: u32) -> Self {
        self.hidden_checks = checks;
        self
    }

    /// Reports not interactable for the first `checks` interactability checks
    #[must_use]
    pub const fn clickable_after(mut self, checks: u32) -> Self {
        self.disabled_checks = checks;
        self
    }

    /// Clicking moves the document to `url`
    #[must_use]
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.navigates_to = Some(url.into());
        self
    }

    /// Clicking fails with a driver error
    #[must_use]
    pub fn fails_click(mut self, message: impl Into<String>) -> Self {
        self.click_error = Some(message.into());
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::AriaLabel(label) => self.attribute("aria-label") == Some(label.as_str()),
            Selector::TestId(id) => self.attribute("data-testid") == Some(id.as_str()),
            Selector::RoleName { role, name } => {
                self.attribute("role") == Some(role.as_str()) && normalize_space(&self.text) == *name
            }
            Selector::TextContains(text) => self.text.contains(text.as_str()),
        }
    }
}

/// Collapse runs of whitespace and trim, like XPath `normalize-space()`
fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug)]
struct Slot {
    element: FakeElement,
    visibility_checks: Cell<u32>,
    interactable_checks: Cell<u32>,
}

/// In-memory `Document`
#[derive(Debug)]
pub struct FakeDocument {
    url: RefCell<String>,
    slots: Vec<Slot>,
    lookups: Cell<u32>,
    queries: RefCell<Vec<Selector>>,
    clicks: RefCell<Vec<String>>,
}

impl FakeDocument {
    /// Create an empty document at `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: RefCell::new(url.into()),
            slots: Vec::new(),
            lookups: Cell::new(0),
            queries: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
        }
    }

    /// Add an element; ids are assigned in insertion order (`el-0`, `el-1`, ...)
    #[must_use]
    pub fn with_element(mut self, element: FakeElement) -> Self {
        self.slots.push(Slot {
            element,
            visibility_checks: Cell::new(0),
            interactable_checks: Cell::new(0),
        });
        self
    }

    /// Move the document to another location
    pub fn navigate(&self, url: impl Into<String>) {
        *self.url.borrow_mut() = url.into();
    }

    /// Every selector queried so far, in order
    #[must_use]
    pub fn queries(&self) -> Vec<Selector> {
        self.queries.borrow().clone()
    }

    /// Ids of every clicked element, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    fn slot(&self, element: &ElementHandle) -> PortalResult<&Slot> {
        element
            .id
            .strip_prefix("el-")
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.slots.get(index))
            .ok_or_else(|| PortalError::driver(format!("stale element reference: {element}")))
    }
}

impl Document for FakeDocument {
    fn find_all(&self, selector: &Selector) -> PortalResult<Vec<ElementHandle>> {
        let lookup = self.lookups.get();
        self.lookups.set(lookup + 1);
        self.queries.borrow_mut().push(selector.clone());

        Ok(self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| lookup >= slot.element.appears_after_polls)
            .filter(|(_, slot)| slot.element.matches(selector))
            .map(|(index, slot)| {
                ElementHandle::new(format!("el-{index}"), slot.element.tag_name.clone())
                    .with_text(slot.element.text.clone())
            })
            .collect())
    }

    fn current_url(&self) -> PortalResult<String> {
        Ok(self.url.borrow().clone())
    }

    fn is_interactable(&self, element: &ElementHandle) -> PortalResult<bool> {
        let slot = self.slot(element)?;
        let checks = slot.interactable_checks.get();
        slot.interactable_checks.set(checks + 1);
        Ok(slot.element.displayed && slot.element.enabled && checks >= slot.element.disabled_checks)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PortalResult<bool> {
        let slot = self.slot(element)?;
        let checks = slot.visibility_checks.get();
        slot.visibility_checks.set(checks + 1);
        Ok(slot.element.displayed && checks >= slot.element.hidden_checks)
    }

    fn click(&self, element: &ElementHandle) -> PortalResult<()> {
        let slot = self.slot(element)?;
        if let Some(ref message) = slot.element.click_error {
            return Err(PortalError::driver(message.clone()));
        }
        self.clicks.borrow_mut().push(element.id.clone());
        if let Some(ref url) = slot.element.navigates_to {
            self.navigate(url.clone());
        }
        Ok(())
    }
}
