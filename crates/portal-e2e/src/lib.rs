//! portal-e2e: end-to-end suite for the portal dashboard
//!
//! Page objects describe what a test wants to touch; the element finder
//! decides how to find it, trying cheap, stable selectors before brittle ones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌────────┐ │
//! │   │ Test       │   │ Page       │   │ Element    │   │Document│ │
//! │   │ script     │──►│ object     │──►│ finder     │──►│ (CDP / │ │
//! │   │            │   │            │   │            │   │  fake) │ │
//! │   └────────────┘   └─────┬──────┘   └────────────┘   └────────┘ │
//! │                          │ descriptor                           │
//! │                          ▼                                      │
//! │                    ┌────────────┐                               │
//! │                    │ Candidate  │ aria-label > data-testid >    │
//! │                    │ builder    │ role+name > visible text      │
//! │                    └────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use portal_e2e::{DashboardPage, FakeDocument, FakeElement, WaitOptions};
//!
//! let doc = FakeDocument::new("https://portal.test/")
//!     .with_element(FakeElement::new("section").aria_label("Welcome Banner"));
//! let page = DashboardPage::with_options(&doc, WaitOptions::new().with_timeout(50));
//! page.assert_welcome_banner().unwrap();
//! ```

#[cfg(feature = "browser")]
mod browser;
mod config;
mod driver;
mod fake_dom;
mod finder;
mod locator;
mod page_object;
mod result;
pub mod tracing_support;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{BrowserDocument, HANDLE_ATTRIBUTE};
pub use config::{
    env_keys, BrowserOptions, PortalConfig, DEFAULT_BASE_URL, DEFAULT_STAGE_URL,
};
pub use driver::{Document, ElementHandle};
pub use fake_dom::{FakeDocument, FakeElement};
pub use finder::{ElementFinder, ResolutionContext, UNKNOWN_PAGE};
pub use locator::{
    build_locator_strategy, parse_role_name, CandidateList, LocatorCandidate, LocatorDescriptor,
    LocatorType, Selector, SelectorKind, Strategy,
};
pub use page_object::{DashboardElement, DashboardPage, PageObject};
pub use result::{PortalError, PortalResult};
pub use wait::{
    CancellationToken, PollOutcome, Poller, WaitOptions, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS, MIN_POLL_INTERVAL_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::BrowserDocument;
    pub use super::{
        build_locator_strategy, BrowserOptions, CancellationToken, DashboardPage, Document,
        ElementFinder, ElementHandle, FakeDocument, FakeElement, LocatorDescriptor, PageObject,
        PortalConfig, PortalError, PortalResult, WaitOptions,
    };
}
