//! Result and error types for the portal suite.

use thiserror::Error;

/// Result type for portal suite operations
pub type PortalResult<T> = Result<T, PortalError>;

/// Errors that can occur while driving the portal
#[derive(Debug, Error)]
pub enum PortalError {
    /// No candidate locator matched within its allotted timeout
    #[error(
        "Could not locate '{element}' using any strategy. Page: {page} | Element: {element} | URL: {url} | Tried: [{candidates}]"
    )]
    ElementNotFound {
        /// Logical element name
        element: String,
        /// Page context, `Unknown` when absent
        page: String,
        /// Document location at the time of failure
        url: String,
        /// Rendered list of every candidate attempted
        candidates: String,
    },

    /// Element was located but the follow-up interaction failed
    #[error("Failed to {action} '{element}' on {page} | URL: {url} | Cause: {source}")]
    InteractionFailed {
        /// Interaction that failed (`click`, `assert visible`)
        action: String,
        /// Logical element name
        element: String,
        /// Page context, `Unknown` when absent
        page: String,
        /// Document location at the time of failure
        url: String,
        /// Underlying cause
        #[source]
        source: Box<PortalError>,
    },

    /// Locator descriptor could not be turned into candidates
    #[error("Invalid locator '{value}': {message}")]
    InvalidLocator {
        /// Offending locator value
        value: String,
        /// What is wrong with it
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// A poll was aborted through its cancellation token
    #[error("Cancelled while waiting for {waited_for}")]
    Cancelled {
        /// Description of the awaited condition
        waited_for: String,
    },

    /// The document backend reported a failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PortalError {
    /// Shorthand for a backend failure
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this error (or the cause it wraps) means the element was never found
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ElementNotFound { .. } => true,
            Self::InteractionFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_context() {
        let err = PortalError::ElementNotFound {
            element: "Learn More Link".to_string(),
            page: "Dashboard".to_string(),
            url: "https://portal.test/".to_string(),
            candidates: "aria-label [aria-label=\"Learn More\"]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Learn More Link"));
        assert!(msg.contains("Page: Dashboard"));
        assert!(msg.contains("URL: https://portal.test/"));
        assert!(msg.contains("[aria-label=\"Learn More\"]"));
    }

    #[test]
    fn test_interaction_failure_keeps_source() {
        let err = PortalError::InteractionFailed {
            action: "click".to_string(),
            element: "Download Now Link".to_string(),
            page: "Unknown".to_string(),
            url: "about:blank".to_string(),
            source: Box::new(PortalError::Timeout {
                ms: 10,
                waited_for: "clickable".to_string(),
            }),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Timed out after 10ms waiting for clickable")
        );
        assert!(err.to_string().contains("Failed to click 'Download Now Link'"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_malformed_page_payload_is_json_error() {
        fn decode(payload: &str) -> PortalResult<Vec<crate::driver::ElementHandle>> {
            Ok(serde_json::from_str(payload)?)
        }

        let err = decode("[{\"id\": 7}]").unwrap_err();
        assert!(matches!(err, PortalError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_is_not_found_sees_through_wrapping() {
        let inner = PortalError::ElementNotFound {
            element: "x".to_string(),
            page: "Unknown".to_string(),
            url: String::new(),
            candidates: String::new(),
        };
        let outer = PortalError::InteractionFailed {
            action: "assert visible".to_string(),
            element: "x".to_string(),
            page: "Unknown".to_string(),
            url: String::new(),
            source: Box::new(inner),
        };
        assert!(outer.is_not_found());
    }
}
