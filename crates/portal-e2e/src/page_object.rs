//! Page Object Model support
//!
//! Page objects map a screen's user-facing actions to locator descriptors and
//! hand them to an `ElementFinder`. They hold no control flow of their own.

use crate::driver::Document;
use crate::finder::ElementFinder;
use crate::locator::LocatorDescriptor;
use crate::result::PortalResult;
use crate::wait::WaitOptions;

/// A page or component in the portal UI
pub trait PageObject {
    /// Name used as page context in diagnostics
    fn page_name(&self) -> &str;

    /// URL fragment identifying this page (e.g. "/dashboard")
    fn url_pattern(&self) -> &str;

    /// Whether `url` belongs to this page
    fn matches_url(&self, url: &str) -> bool {
        url.contains(self.url_pattern())
    }
}

/// Elements the dashboard tests touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardElement {
    /// Greeting banner at the top of the page
    WelcomeBanner,
    /// Sustainability summary card
    SustainabilityCard,
    /// Button opening the HP Smart app store listing
    InstallHpSmartApp,
    /// Store download link
    DownloadNow,
    /// Sustainability "learn more" link
    LearnMore,
}

impl DashboardElement {
    /// All dashboard elements
    pub const ALL: [Self; 5] = [
        Self::WelcomeBanner,
        Self::SustainabilityCard,
        Self::InstallHpSmartApp,
        Self::DownloadNow,
        Self::LearnMore,
    ];

    /// Logical name used in logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WelcomeBanner => "Welcome Banner",
            Self::SustainabilityCard => "Sustainability Card",
            Self::InstallHpSmartApp => "Install HP Smart App Button",
            Self::DownloadNow => "Download Now Link",
            Self::LearnMore => "Learn More Link",
        }
    }

    /// How the element is located
    #[must_use]
    pub fn descriptor(&self) -> LocatorDescriptor {
        match self {
            Self::WelcomeBanner => LocatorDescriptor::aria_label("Welcome Banner"),
            Self::SustainabilityCard => LocatorDescriptor::aria_label("Sustainability"),
            Self::InstallHpSmartApp => LocatorDescriptor::test_id("install-hp-smart-app-btn"),
            Self::DownloadNow => LocatorDescriptor::aria_label("Download Now"),
            Self::LearnMore => LocatorDescriptor::aria_label("Learn More"),
        }
    }
}

/// Portal dashboard
#[derive(Debug, Clone)]
pub struct DashboardPage<D> {
    finder: ElementFinder<D>,
}

impl<D: Document> DashboardPage<D> {
    /// Page context reported in diagnostics
    pub const PAGE_NAME: &'static str = "Dashboard";

    /// Create the page object with default waits
    #[must_use]
    pub fn new(document: D) -> Self {
        Self::with_options(document, WaitOptions::default())
    }

    /// Create the page object with explicit waits
    #[must_use]
    pub fn with_options(document: D, options: WaitOptions) -> Self {
        Self {
            finder: ElementFinder::with_options(document, options),
        }
    }

    /// Wrap an existing finder
    #[must_use]
    pub fn from_finder(finder: ElementFinder<D>) -> Self {
        Self { finder }
    }

    /// The finder all actions go through
    pub const fn finder(&self) -> &ElementFinder<D> {
        &self.finder
    }

    /// Assert the greeting banner is shown
    pub fn assert_welcome_banner(&self) -> PortalResult<()> {
        self.assert_visible(DashboardElement::WelcomeBanner)
    }

    /// Assert the sustainability card is shown
    pub fn assert_sustainability_card(&self) -> PortalResult<()> {
        self.assert_visible(DashboardElement::SustainabilityCard)
    }

    /// Open the HP Smart store listing through the install button
    pub fn click_install_hp_smart_app(&self) -> PortalResult<()> {
        self.click(DashboardElement::InstallHpSmartApp)
    }

    /// Follow the store download link
    pub fn click_download_now(&self) -> PortalResult<()> {
        self.click(DashboardElement::DownloadNow)
    }

    /// Follow the sustainability "learn more" link
    pub fn click_learn_more(&self) -> PortalResult<()> {
        self.click(DashboardElement::LearnMore)
    }

    fn click(&self, element: DashboardElement) -> PortalResult<()> {
        let candidates = element.descriptor().candidates()?;
        self.finder
            .click(element.name(), &candidates, Some(Self::PAGE_NAME))
    }

    fn assert_visible(&self, element: DashboardElement) -> PortalResult<()> {
        let candidates = element.descriptor().candidates()?;
        self.finder
            .assert_visible(element.name(), &candidates, Some(Self::PAGE_NAME))
    }
}

impl<D: Document> PageObject for DashboardPage<D> {
    fn page_name(&self) -> &str {
        Self::PAGE_NAME
    }

    fn url_pattern(&self) -> &str {
        "portalshell"
    }
}
