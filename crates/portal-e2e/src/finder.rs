//! Element resolution with layered fallback.
//!
//! `ElementFinder` walks a candidate list strictly in order. Each candidate gets
//! its own poll window; the first candidate that matches wins and later ones
//! are never queried. When every window closes empty-handed the error lists
//! the element, page, location and every selector that was tried.

use tracing::{debug, error, info};

use crate::driver::{Document, ElementHandle};
use crate::locator::{CandidateList, LocatorDescriptor};
use crate::result::{PortalError, PortalResult};
use crate::wait::{CancellationToken, PollOutcome, Poller, WaitOptions};

/// Page context shown when the caller gives none
pub const UNKNOWN_PAGE: &str = "Unknown";

/// Everything one resolution call reports about itself
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Logical element name
    pub element_name: &'a str,
    /// Page or component the element lives on
    pub page_context: Option<&'a str>,
    /// Candidates in priority order
    pub candidates: &'a CandidateList,
}

impl<'a> ResolutionContext<'a> {
    /// Create a context
    #[must_use]
    pub const fn new(
        element_name: &'a str,
        candidates: &'a CandidateList,
        page_context: Option<&'a str>,
    ) -> Self {
        Self {
            element_name,
            page_context,
            candidates,
        }
    }

    /// Page context, or `Unknown`
    #[must_use]
    pub fn page(&self) -> &'a str {
        self.page_context.unwrap_or(UNKNOWN_PAGE)
    }
}

/// Resolves candidate lists against a document
#[derive(Debug, Clone)]
pub struct ElementFinder<D> {
    document: D,
    poller: Poller,
}

impl<D: Document> ElementFinder<D> {
    /// Create a finder with default timeout and poll interval
    #[must_use]
    pub fn new(document: D) -> Self {
        Self::with_options(document, WaitOptions::default())
    }

    /// Create a finder with explicit wait options
    #[must_use]
    pub fn with_options(document: D, options: WaitOptions) -> Self {
        Self {
            document,
            poller: Poller::new(options),
        }
    }

    /// Abort in-flight polls when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(token);
        self
    }

    /// The underlying document
    pub const fn document(&self) -> &D {
        &self.document
    }

    /// Wait options applied to every poll
    pub const fn options(&self) -> &WaitOptions {
        self.poller.options()
    }

    /// Locate an element by trying each candidate in order
    ///
    /// # Errors
    ///
    /// `ElementNotFound` when no candidate matches within its window; backend
    /// errors and cancellation end the scan early.
    pub fn resolve(
        &self,
        element_name: &str,
        candidates: &CandidateList,
        page_context: Option<&str>,
    ) -> PortalResult<ElementHandle> {
        let ctx = ResolutionContext::new(element_name, candidates, page_context);
        info!(
            element = element_name,
            page = ctx.page(),
            url = %self.location(),
            "finding element"
        );

        for candidate in candidates {
            let waited_for = format!("'{element_name}' via {candidate}");
            let outcome = self
                .poller
                .poll(&waited_for, || self.document.find_first(&candidate.selector))?;

            match outcome {
                PollOutcome::Found(element) => {
                    debug!(
                        element = element_name,
                        strategy = %candidate.strategy,
                        selector = %candidate.selector,
                        "found element"
                    );
                    return Ok(element);
                }
                PollOutcome::TimedOut { elapsed } => {
                    debug!(
                        element = element_name,
                        strategy = %candidate.strategy,
                        selector = %candidate.selector,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "candidate not found"
                    );
                }
            }
        }

        let err = PortalError::ElementNotFound {
            element: element_name.to_string(),
            page: ctx.page().to_string(),
            url: self.location(),
            candidates: candidates.to_string(),
        };
        error!(
            element = element_name,
            page = ctx.page(),
            candidates = %candidates,
            "{err}"
        );
        Err(err)
    }

    /// Build candidates for `descriptor` and resolve them
    pub fn find_by_descriptor(
        &self,
        element_name: &str,
        descriptor: &LocatorDescriptor,
        page_context: Option<&str>,
    ) -> PortalResult<ElementHandle> {
        let candidates = descriptor.candidates()?;
        self.resolve(element_name, &candidates, page_context)
    }

    /// Resolve, wait until clickable, then click
    ///
    /// # Errors
    ///
    /// `ElementNotFound` when no candidate matches; `InteractionFailed`
    /// wrapping the cause for any other failure, including backend errors and
    /// cancellation during resolution.
    pub fn click(
        &self,
        element_name: &str,
        candidates: &CandidateList,
        page_context: Option<&str>,
    ) -> PortalResult<()> {
        let ctx = ResolutionContext::new(element_name, candidates, page_context);
        let element = self.resolve_for("click", &ctx)?;

        self.poller
            .wait_until("element to be clickable", || {
                self.document.is_interactable(&element)
            })
            .and_then(|()| {
                info!(element = element_name, page = ctx.page(), "clicking element");
                self.document.click(&element)
            })
            .map_err(|source| self.interaction_failure("click", &ctx, source))
    }

    /// Resolve, wait until displayed, then assert it is displayed
    ///
    /// # Errors
    ///
    /// `ElementNotFound` when no candidate matches; `InteractionFailed`
    /// wrapping the cause for any other failure, including backend errors and
    /// cancellation during resolution.
    pub fn assert_visible(
        &self,
        element_name: &str,
        candidates: &CandidateList,
        page_context: Option<&str>,
    ) -> PortalResult<()> {
        let ctx = ResolutionContext::new(element_name, candidates, page_context);
        let element = self.resolve_for("assert visible", &ctx)?;

        self.poller
            .wait_until("element to be visible", || self.document.is_displayed(&element))
            .and_then(|()| {
                if self.document.is_displayed(&element)? {
                    Ok(())
                } else {
                    Err(PortalError::AssertionFailed {
                        message: format!("{element_name} not visible on {}", ctx.page()),
                    })
                }
            })
            .map_err(|source| self.interaction_failure("assert visible", &ctx, source))?;

        info!(element = element_name, page = ctx.page(), "asserted visible");
        Ok(())
    }

    /// Wait until the document location contains `fragment`
    ///
    /// # Errors
    ///
    /// `Timeout` naming the last location seen
    pub fn wait_for_url_contains(&self, fragment: &str) -> PortalResult<String> {
        let mut last_seen = String::new();
        let outcome = self.poller.poll("url change", || {
            let url = self.document.current_url()?;
            if url.contains(fragment) {
                Ok(Some(url))
            } else {
                last_seen = url;
                Ok(None)
            }
        })?;

        match outcome {
            PollOutcome::Found(url) => {
                debug!(url = %url, fragment, "url matched");
                Ok(url)
            }
            PollOutcome::TimedOut { .. } => {
                let err = PortalError::Timeout {
                    ms: self.options().timeout_ms,
                    waited_for: format!("url containing '{fragment}' (last seen {last_seen})"),
                };
                error!("{err}");
                Err(err)
            }
        }
    }

    /// Resolve on behalf of `action`; only `ElementNotFound` passes through bare
    fn resolve_for(&self, action: &str, ctx: &ResolutionContext<'_>) -> PortalResult<ElementHandle> {
        self.resolve(ctx.element_name, ctx.candidates, ctx.page_context)
            .map_err(|source| match source {
                PortalError::ElementNotFound { .. } => source,
                other => self.interaction_failure(action, ctx, other),
            })
    }

    fn location(&self) -> String {
        self.document
            .current_url()
            .unwrap_or_else(|e| format!("<unavailable: {e}>"))
    }

    fn interaction_failure(
        &self,
        action: &str,
        ctx: &ResolutionContext<'_>,
        source: PortalError,
    ) -> PortalError {
        let err = PortalError::InteractionFailed {
            action: action.to_string(),
            element: ctx.element_name.to_string(),
            page: ctx.page().to_string(),
            url: self.location(),
            source: Box::new(source),
        };
        error!(element = ctx.element_name, page = ctx.page(), "{err}");
        err
    }
}
