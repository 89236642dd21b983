//! Locator descriptors and the layered candidate builder.
//!
//! # Design Philosophy
//!
//! - **Priority Order**: accessibility label, then test id, then role+name
//! - **Visible Text Last**: the brittle substring match is always the final fallback
//! - **Tagged Selectors**: every selector kind is a `Selector` variant, never a bare string

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{PortalError, PortalResult};

/// How a page object identifies an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorType {
    /// `aria-label` attribute
    #[serde(rename = "aria-label")]
    AriaLabel,
    /// `data-testid` attribute
    #[serde(rename = "data-testid")]
    DataTestId,
    /// ARIA role plus accessible name, encoded as `role[name]`
    #[serde(rename = "role+name")]
    RoleName,
}

impl LocatorType {
    /// Wire name of the locator type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AriaLabel => "aria-label",
            Self::DataTestId => "data-testid",
            Self::RoleName => "role+name",
        }
    }
}

impl fmt::Display for LocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocatorType {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aria-label" => Ok(Self::AriaLabel),
            "data-testid" => Ok(Self::DataTestId),
            "role+name" => Ok(Self::RoleName),
            other => Err(PortalError::InvalidLocator {
                value: other.to_string(),
                message: "unknown locator type".to_string(),
            }),
        }
    }
}

/// Input to the candidate builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    /// Locator type
    pub locator_type: LocatorType,
    /// Value interpreted according to `locator_type`
    pub locator_value: String,
}

impl LocatorDescriptor {
    /// Create a descriptor
    #[must_use]
    pub fn new(locator_type: LocatorType, value: impl Into<String>) -> Self {
        Self {
            locator_type,
            locator_value: value.into(),
        }
    }

    /// Descriptor matching an `aria-label`
    #[must_use]
    pub fn aria_label(label: impl Into<String>) -> Self {
        Self::new(LocatorType::AriaLabel, label)
    }

    /// Descriptor matching a `data-testid`
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::new(LocatorType::DataTestId, id)
    }

    /// Descriptor matching a role and its exact accessible name
    #[must_use]
    pub fn role_name(role: &str, name: &str) -> Self {
        Self::new(LocatorType::RoleName, format!("{role}[{name}]"))
    }

    /// Build the prioritised candidate list for this descriptor
    pub fn candidates(&self) -> PortalResult<CandidateList> {
        build_locator_strategy(self)
    }
}

/// Query language a selector renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css => f.write_str("css selector"),
            Self::XPath => f.write_str("xpath"),
        }
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Element whose `aria-label` equals the value
    AriaLabel(String),
    /// Element whose `data-testid` equals the value
    TestId(String),
    /// Element with the given `role` whose normalised text equals `name`
    RoleName {
        /// ARIA role
        role: String,
        /// Exact accessible name
        name: String,
    },
    /// Element with an own text node containing the value
    TextContains(String),
}

impl Selector {
    /// Query language this selector renders to
    #[must_use]
    pub const fn kind(&self) -> SelectorKind {
        match self {
            Self::AriaLabel(_) | Self::TestId(_) => SelectorKind::Css,
            Self::RoleName { .. } | Self::TextContains(_) => SelectorKind::XPath,
        }
    }

    /// Render to CSS or XPath, depending on `kind()`
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::AriaLabel(label) => format!("[aria-label={}]", css_string(label)),
            Self::TestId(id) => format!("[data-testid={}]", css_string(id)),
            Self::RoleName { role, name } => format!(
                "//*[@role={} and normalize-space()={}]",
                xpath_literal(role),
                xpath_literal(name)
            ),
            Self::TextContains(text) => {
                format!("//*[contains(text(), {})]", xpath_literal(text))
            }
        }
    }

    /// JavaScript expression evaluating to an array of every matching element
    #[must_use]
    pub fn to_query(&self) -> String {
        let expr = self.expression();
        match self.kind() {
            SelectorKind::Css => format!("Array.from(document.querySelectorAll({expr:?}))"),
            SelectorKind::XPath => format!(
                "(() => {{ const r = document.evaluate({expr:?}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()"
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.kind(), self.expression())
    }
}

/// Quote a CSS attribute value
fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Quote an XPath string literal; XPath 1.0 has no escapes, so mixed quotes need `concat()`
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let parts: Vec<String> = value
        .split('"')
        .map(|part| format!("\"{part}\""))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}

/// Named strategy a candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Accessibility label
    AriaLabel,
    /// Test id attribute
    DataTestId,
    /// Role and accessible name
    RoleName,
    /// Substring of visible text
    VisibleText,
}

impl Strategy {
    /// Human-readable strategy name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AriaLabel => "aria-label",
            Self::DataTestId => "data-testid",
            Self::RoleName => "role+name",
            Self::VisibleText => "visible text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selector paired with the strategy it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorCandidate {
    /// Selector to poll for
    pub selector: Selector,
    /// Strategy name for diagnostics
    pub strategy: Strategy,
}

impl LocatorCandidate {
    /// Create a candidate
    #[must_use]
    pub const fn new(selector: Selector, strategy: Strategy) -> Self {
        Self { selector, strategy }
    }
}

impl fmt::Display for LocatorCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.strategy, self.selector)
    }
}

/// Ordered, non-empty list of candidates; earlier entries are tried first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LocatorCandidate>")]
pub struct CandidateList(Vec<LocatorCandidate>);

impl CandidateList {
    /// Wrap an explicit candidate order
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator` when `candidates` is empty
    pub fn from_candidates(candidates: Vec<LocatorCandidate>) -> PortalResult<Self> {
        if candidates.is_empty() {
            return Err(PortalError::InvalidLocator {
                value: String::new(),
                message: "candidate list must not be empty".to_string(),
            });
        }
        Ok(Self(candidates))
    }

    /// Candidates in priority order
    #[must_use]
    pub fn as_slice(&self) -> &[LocatorCandidate] {
        &self.0
    }

    /// Iterate in priority order
    pub fn iter(&self) -> std::slice::Iter<'_, LocatorCandidate> {
        self.0.iter()
    }

    /// Number of candidates (always at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; every constructor rejects an empty list
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<LocatorCandidate>> for CandidateList {
    type Error = PortalError;

    fn try_from(candidates: Vec<LocatorCandidate>) -> PortalResult<Self> {
        Self::from_candidates(candidates)
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a LocatorCandidate;
    type IntoIter = std::slice::Iter<'a, LocatorCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CandidateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}

/// Split a `role[name]` value into its role and name
///
/// # Errors
///
/// Returns `InvalidLocator` when there is no `[` or the role is empty
pub fn parse_role_name(value: &str) -> PortalResult<(String, String)> {
    let Some((role, rest)) = value.split_once('[') else {
        return Err(PortalError::InvalidLocator {
            value: value.to_string(),
            message: "role+name must be encoded as role[name]".to_string(),
        });
    };
    if role.is_empty() {
        return Err(PortalError::InvalidLocator {
            value: value.to_string(),
            message: "role+name is missing the role".to_string(),
        });
    }
    Ok((role.to_string(), rest.trim_end_matches(']').to_string()))
}

/// Build the prioritised candidate list for a descriptor
///
/// The type-specific candidate comes first; a visible-text candidate is always
/// appended last.
///
/// # Errors
///
/// Returns `InvalidLocator` for a malformed `role+name` value
pub fn build_locator_strategy(descriptor: &LocatorDescriptor) -> PortalResult<CandidateList> {
    let value = &descriptor.locator_value;
    let primary = match descriptor.locator_type {
        LocatorType::AriaLabel => {
            LocatorCandidate::new(Selector::AriaLabel(value.clone()), Strategy::AriaLabel)
        }
        LocatorType::DataTestId => {
            LocatorCandidate::new(Selector::TestId(value.clone()), Strategy::DataTestId)
        }
        LocatorType::RoleName => {
            let (role, name) = parse_role_name(value)?;
            LocatorCandidate::new(Selector::RoleName { role, name }, Strategy::RoleName)
        }
    };
    let fallback = LocatorCandidate::new(Selector::TextContains(value.clone()), Strategy::VisibleText);
    Ok(CandidateList(vec![primary, fallback]))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod locator_type_tests {
        use super::*;

        #[test]
        fn test_parse_known_types() {
            assert_eq!("aria-label".parse::<LocatorType>().unwrap(), LocatorType::AriaLabel);
            assert_eq!("data-testid".parse::<LocatorType>().unwrap(), LocatorType::DataTestId);
            assert_eq!("role+name".parse::<LocatorType>().unwrap(), LocatorType::RoleName);
        }

        #[test]
        fn test_parse_unknown_type() {
            let err = "xpath".parse::<LocatorType>().unwrap_err();
            assert!(matches!(err, PortalError::InvalidLocator { .. }));
        }

        #[test]
        fn test_display_round_trips_wire_name() {
            for ty in [LocatorType::AriaLabel, LocatorType::DataTestId, LocatorType::RoleName] {
                assert_eq!(ty.to_string().parse::<LocatorType>().unwrap(), ty);
            }
        }

        #[test]
        fn test_serde_uses_wire_names() {
            let json = serde_json::to_string(&LocatorDescriptor::test_id("x")).unwrap();
            assert!(json.contains("\"data-testid\""));
        }
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_aria_label_css() {
            let selector = Selector::AriaLabel("Welcome Banner".to_string());
            assert_eq!(selector.kind(), SelectorKind::Css);
            assert_eq!(selector.expression(), "[aria-label=\"Welcome Banner\"]");
        }

        #[test]
        fn test_test_id_css() {
            let selector = Selector::TestId("install-hp-smart-app-btn".to_string());
            assert_eq!(selector.expression(), "[data-testid=\"install-hp-smart-app-btn\"]");
        }

        #[test]
        fn test_role_name_xpath() {
            let selector = Selector::RoleName {
                role: "button".to_string(),
                name: "Manage Printer".to_string(),
            };
            assert_eq!(selector.kind(), SelectorKind::XPath);
            assert_eq!(
                selector.expression(),
                "//*[@role=\"button\" and normalize-space()=\"Manage Printer\"]"
            );
        }

        #[test]
        fn test_text_contains_xpath() {
            let selector = Selector::TextContains("Learn More".to_string());
            assert_eq!(selector.expression(), "//*[contains(text(), \"Learn More\")]");
        }

        #[test]
        fn test_css_value_is_escaped() {
            let selector = Selector::AriaLabel("say \"hi\"".to_string());
            assert_eq!(selector.expression(), "[aria-label=\"say \\\"hi\\\"\"]");
        }

        #[test]
        fn test_xpath_literal_quotes() {
            assert_eq!(xpath_literal("plain"), "\"plain\"");
            assert_eq!(xpath_literal("a \"b\""), "'a \"b\"'");
            assert_eq!(xpath_literal("it's \"x\""), "concat(\"it's \", '\"', \"x\", '\"', \"\")");
        }

        #[test]
        fn test_queries_return_arrays() {
            let css = Selector::TestId("score".to_string()).to_query();
            assert!(css.contains("querySelectorAll"));
            assert!(css.contains("data-testid"));
            let xpath = Selector::TextContains("Start".to_string()).to_query();
            assert!(xpath.contains("document.evaluate"));
            assert!(xpath.contains("snapshotItem"));
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_aria_label_candidates() {
            let list = build_locator_strategy(&LocatorDescriptor::aria_label("Download Now")).unwrap();
            assert_eq!(list.len(), 2);
            assert_eq!(list.as_slice()[0].strategy, Strategy::AriaLabel);
            assert_eq!(list.as_slice()[0].selector, Selector::AriaLabel("Download Now".to_string()));
            assert_eq!(list.as_slice()[1].strategy, Strategy::VisibleText);
        }

        #[test]
        fn test_data_testid_candidates() {
            let list = LocatorDescriptor::test_id("install-hp-smart-app-btn").candidates().unwrap();
            let strategies: Vec<_> = list.iter().map(|c| c.strategy).collect();
            assert_eq!(strategies, vec![Strategy::DataTestId, Strategy::VisibleText]);
        }

        #[test]
        fn test_role_name_split() {
            let descriptor = LocatorDescriptor::new(LocatorType::RoleName, "button[Manage Printer]");
            let list = build_locator_strategy(&descriptor).unwrap();
            assert_eq!(
                list.as_slice()[0].selector,
                Selector::RoleName {
                    role: "button".to_string(),
                    name: "Manage Printer".to_string(),
                }
            );
            assert_eq!(list.as_slice()[0].strategy, Strategy::RoleName);
            assert_eq!(
                list.as_slice()[1].selector,
                Selector::TextContains("button[Manage Printer]".to_string())
            );
        }

        #[test]
        fn test_role_name_helper_encodes() {
            let descriptor = LocatorDescriptor::role_name("link", "Learn More");
            assert_eq!(descriptor.locator_value, "link[Learn More]");
        }

        #[test]
        fn test_role_name_splits_on_first_bracket() {
            let (role, name) = parse_role_name("cell[a[b]]").unwrap();
            assert_eq!(role, "cell");
            assert_eq!(name, "a[b");
        }

        #[test]
        fn test_role_name_without_bracket_is_rejected() {
            let descriptor = LocatorDescriptor::new(LocatorType::RoleName, "button Manage Printer");
            let err = build_locator_strategy(&descriptor).unwrap_err();
            assert!(matches!(err, PortalError::InvalidLocator { .. }));
        }

        #[test]
        fn test_role_name_without_role_is_rejected() {
            assert!(parse_role_name("[Manage Printer]").is_err());
        }

        #[test]
        fn test_empty_candidate_list_rejected() {
            assert!(CandidateList::from_candidates(Vec::new()).is_err());
        }

        #[test]
        fn test_empty_candidate_list_rejected_when_deserialized() {
            let err = serde_json::from_str::<CandidateList>("[]").unwrap_err();
            assert!(err.to_string().contains("must not be empty"));
        }

        #[test]
        fn test_candidate_list_deserializes_in_order() {
            let list = LocatorDescriptor::test_id("install-hp-smart-app-btn")
                .candidates()
                .unwrap();
            let json = serde_json::to_string(&list).unwrap();
            let back: CandidateList = serde_json::from_str(&json).unwrap();
            assert_eq!(back, list);
            assert!(!back.is_empty());
        }

        #[test]
        fn test_candidate_list_display() {
            let list = LocatorDescriptor::aria_label("Learn More").candidates().unwrap();
            let rendered = list.to_string();
            assert_eq!(
                rendered,
                "aria-label (css selector, [aria-label=\"Learn More\"]); \
                 visible text (xpath, //*[contains(text(), \"Learn More\")])"
            );
        }
    }

    mod property_tests {
        use super::{
            build_locator_strategy, LocatorDescriptor, LocatorType, Selector,
            Strategy as CandidateStrategy,
        };
        use proptest::prelude::*;

        fn any_descriptor() -> impl Strategy<Value = LocatorDescriptor> {
            let plain = (
                prop_oneof![Just(LocatorType::AriaLabel), Just(LocatorType::DataTestId)],
                "[ -~]{0,24}",
            )
                .prop_map(|(ty, value)| LocatorDescriptor::new(ty, value));
            let role_name = ("[a-z]{1,10}", "[^\\[\\]]{0,20}")
                .prop_map(|(role, name)| LocatorDescriptor::role_name(&role, &name));
            prop_oneof![plain, role_name]
        }

        proptest! {
            #[test]
            fn prop_visible_text_is_last_and_unique(descriptor in any_descriptor()) {
                let list = build_locator_strategy(&descriptor).unwrap();
                let last = list.as_slice().last().unwrap();
                prop_assert_eq!(last.strategy, CandidateStrategy::VisibleText);
                let visible = list
                    .iter()
                    .filter(|c| c.strategy == CandidateStrategy::VisibleText)
                    .count();
                prop_assert_eq!(visible, 1);
                prop_assert!(list.len() >= 2);
            }

            #[test]
            fn prop_visible_text_targets_value(descriptor in any_descriptor()) {
                let list = build_locator_strategy(&descriptor).unwrap();
                let last = list.as_slice().last().unwrap();
                prop_assert_eq!(
                    &last.selector,
                    &Selector::TextContains(descriptor.locator_value.clone())
                );
            }
        }
    }
}
