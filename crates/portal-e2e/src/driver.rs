//! Document - the live page the resolver polls
//!
//! The resolver only needs five capabilities from a page, so any backend that
//! provides them can stand in: a real browser over CDP, or the in-memory
//! `FakeDocument` used by the tests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Document (trait)                                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐    ┌───────────────────────┐  │
//! │  │  BrowserDocument     │    │  FakeDocument         │  │
//! │  │  (feature "browser") │    │  (in-memory DOM)      │  │
//! │  │  chromiumoxide / CDP │    │  tests, offline runs  │  │
//! │  └──────────────────────┘    └───────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Selector;
use crate::result::PortalResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an element located in a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Backend-specific identifier, stable for the element's lifetime
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Element text content, when the backend reports it
    pub text_content: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: None,
        }
    }

    /// Attach text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} #{}>", self.tag_name, self.id)
    }
}

/// Capabilities the element resolver needs from a live page
pub trait Document {
    /// All elements matching `selector`, in document order; empty when none match
    fn find_all(&self, selector: &Selector) -> PortalResult<Vec<ElementHandle>>;

    /// Current location of the document
    fn current_url(&self) -> PortalResult<String>;

    /// Whether the element is displayed and enabled
    fn is_interactable(&self, element: &ElementHandle) -> PortalResult<bool>;

    /// Whether the element is displayed
    fn is_displayed(&self, element: &ElementHandle) -> PortalResult<bool>;

    /// Click the element
    fn click(&self, element: &ElementHandle) -> PortalResult<()>;

    /// First element matching `selector`
    fn find_first(&self, selector: &Selector) -> PortalResult<Option<ElementHandle>> {
        Ok(self.find_all(selector)?.into_iter().next())
    }
}

impl<D: Document + ?Sized> Document for &D {
    fn find_all(&self, selector: &Selector) -> PortalResult<Vec<ElementHandle>> {
        (**self).find_all(selector)
    }

    fn current_url(&self) -> PortalResult<String> {
        (**self).current_url()
    }

    fn is_interactable(&self, element: &ElementHandle) -> PortalResult<bool> {
        (**self).is_interactable(element)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PortalResult<bool> {
        (**self).is_displayed(element)
    }

    fn click(&self, element: &ElementHandle) -> PortalResult<()> {
        (**self).click(element)
    }
}
