//! Browser-backed document over the Chrome `DevTools` Protocol.
//!
//! `BrowserDocument` owns a private tokio runtime and blocks on it for every
//! call, so the resolver above stays synchronous. Matched elements are tagged
//! with a `data-portal-e2e-id` attribute; handles carry that id and later calls
//! look the element up by it.
//!
//! Do not call these methods from inside another tokio runtime.

use crate::config::BrowserOptions;
use crate::driver::{Document, ElementHandle};
use crate::locator::Selector;
use crate::result::{PortalError, PortalResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Attribute used to keep element handles addressable between calls
pub const HANDLE_ATTRIBUTE: &str = "data-portal-e2e-id";

/// A single Chromium tab driven over CDP
#[derive(Debug)]
pub struct BrowserDocument {
    runtime: tokio::runtime::Runtime,
    browser: CdpBrowser,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl BrowserDocument {
    /// Launch Chromium and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunch` if the runtime, browser, or tab cannot be created
    pub fn launch(options: &BrowserOptions) -> PortalResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| PortalError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let (browser, page, handler) = runtime.block_on(async {
            let mut builder = CdpConfig::builder()
                .window_size(options.viewport_width, options.viewport_height);

            if !options.headless {
                builder = builder.with_head();
            }

            if !options.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = options.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let config = builder
                .build()
                .map_err(|message| PortalError::BrowserLaunch { message })?;

            let (browser, mut handler) = CdpBrowser::launch(config).await.map_err(|e| {
                PortalError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| PortalError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            Ok::<_, PortalError>((browser, page, handle))
        })?;

        tracing::info!(headless = options.headless, "browser launched");
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
        })
    }

    /// Navigate the tab and wait for the load to finish
    ///
    /// # Errors
    ///
    /// Returns `Navigation` if the page fails to load
    pub fn goto(&self, url: &str) -> PortalResult<()> {
        tracing::info!(url, "navigating");
        self.block(async {
            self.page
                .goto(url)
                .await
                .map_err(|e| PortalError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        })
    }

    /// Close the browser
    pub fn close(mut self) -> PortalResult<()> {
        let result = self.runtime.block_on(self.browser.close());
        self.handler.abort();
        result.map(|_| ()).map_err(|e| PortalError::driver(e.to_string()))
    }

    fn block<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn eval<T: DeserializeOwned>(&self, script: String) -> PortalResult<T> {
        self.block(async {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| PortalError::driver(e.to_string()))?;
            Ok(result.into_value()?)
        })
    }

    fn handle_selector(element: &ElementHandle) -> String {
        format!("[{HANDLE_ATTRIBUTE}={:?}]", element.id)
    }

    /// Evaluate a predicate over a tagged element; `None` from the page means the element is gone
    fn check(&self, element: &ElementHandle, predicate: &str) -> PortalResult<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({selector:?}); \
             if (!el) return null; return ({predicate})(el); }})()",
            selector = Self::handle_selector(element),
        );
        self.eval::<Option<bool>>(script)?
            .ok_or_else(|| PortalError::driver(format!("stale element reference: {element}")))
    }
}

const DISPLAYED_JS: &str = "(el) => { const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
     return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0; }";

impl Document for BrowserDocument {
    fn find_all(&self, selector: &Selector) -> PortalResult<Vec<ElementHandle>> {
        let script = format!(
            "(() => {{ const els = {query}; \
             return els.filter(Boolean).map(el => {{ \
               if (!el.getAttribute({attr:?})) {{ \
                 window.__portalE2eSeq = (window.__portalE2eSeq || 0) + 1; \
                 el.setAttribute({attr:?}, String(window.__portalE2eSeq)); \
               }} \
               return {{ id: el.getAttribute({attr:?}), tag_name: el.tagName.toLowerCase(), \
                        text_content: el.textContent }}; \
             }}); }})()",
            query = selector.to_query(),
            attr = HANDLE_ATTRIBUTE,
        );
        self.eval(script)
    }

    fn current_url(&self) -> PortalResult<String> {
        self.block(async {
            self.page
                .url()
                .await
                .map(|url| url.unwrap_or_else(|| "about:blank".to_string()))
                .map_err(|e| PortalError::driver(e.to_string()))
        })
    }

    fn is_interactable(&self, element: &ElementHandle) -> PortalResult<bool> {
        let predicate = format!("(el) => ({DISPLAYED_JS})(el) && !el.disabled");
        self.check(element, &predicate)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PortalResult<bool> {
        self.check(element, DISPLAYED_JS)
    }

    fn click(&self, element: &ElementHandle) -> PortalResult<()> {
        let selector = Self::handle_selector(element);
        self.block(async {
            let found = self
                .page
                .find_element(selector.as_str())
                .await
                .map_err(|e| PortalError::driver(e.to_string()))?;
            found
                .click()
                .await
                .map_err(|e| PortalError::driver(e.to_string()))?;
            Ok(())
        })
    }
}
