//! AutomationDriver - Abstract Browser Automation Trait
//!
//! The dispatch core consumes a browser through this trait only.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  AutomationDriver (Abstract Trait)                                         │
//! ├───────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐                      ┌─────────────────────┐     │
//! │  │  ChromiumDriver     │                      │  MockDriver         │     │
//! │  │  (feature=browser)  │                      │  (Unit Tests)       │     │
//! │  │  CDP via            │                      │  In-memory elements │     │
//! │  │  chromiumoxide      │                      │  + call history     │     │
//! │  └─────────────────────┘                      └─────────────────────┘     │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are blocking: a scenario step holds its thread until the driver
//! answers. [`DriverHandle`] is the shared, release-once wrapper that screens
//! hold on to.

use crate::locator::Locator;
use crate::result::{DispatchError, DispatchResult, DriverError, DriverResult};
use crate::wait::{poll_until, DEFAULT_DRIVER_POLL_MS, DEFAULT_ELEMENT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Handle to a live element found by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementHandle {
    /// Locator the element was found with
    pub locator: Locator,
    /// Element tag name, when the driver reports it
    pub tag_name: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self {
            locator,
            tag_name: None,
        }
    }

    /// Attach the element's tag name
    #[must_use]
    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }
}

/// Browser configuration for driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Bound for visibility/clickability waits, in milliseconds
    pub element_timeout_ms: u64,
    /// Interval between probes of the visibility/clickability waits, in milliseconds
    pub poll_interval_ms: u64,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_DRIVER_POLL_MS,
            executable_path: None,
            sandbox: true,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the element wait bound
    #[must_use]
    pub const fn element_timeout(mut self, timeout_ms: u64) -> Self {
        self.element_timeout_ms = timeout_ms;
        self
    }

    /// Set the interval between element wait probes
    #[must_use]
    pub const fn poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the executable path
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Element wait bound as Duration
    #[must_use]
    pub const fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Element wait probe interval as Duration
    #[must_use]
    pub const fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Abstract driver trait for browser automation
///
/// Implementations answer one command at a time. The wait methods have
/// polling implementations built on [`find_element`](Self::find_element),
/// probing every `interval` until `timeout`, and only need overriding when the
/// driver has a native equivalent.
pub trait AutomationDriver: Send + Sync + fmt::Debug {
    /// Find the first element matching the locator
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle>;

    /// Click element
    fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Clear an input element
    fn clear(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Type text into element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Visible text of element
    fn text(&self, element: &ElementHandle) -> DriverResult<String>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Whether the element accepts interaction
    fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        let _ = element;
        Ok(true)
    }

    /// Navigate to URL
    fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Get current URL
    fn current_url(&self) -> DriverResult<String>;

    /// Get page title
    fn title(&self) -> DriverResult<String>;

    /// Serialized markup of the current document
    fn page_source(&self) -> DriverResult<String>;

    /// Close the browser
    fn quit(&self) -> DriverResult<()>;

    /// Wait until the element is present and displayed
    fn wait_until_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
        interval: Duration,
    ) -> DriverResult<ElementHandle> {
        let found = poll_until(timeout, interval, || match self.find_element(locator) {
            Ok(element) => Ok(self.is_displayed(&element)?.then_some(element)),
            Err(err) if err.is_absent() => Ok(None),
            Err(err) => Err(err),
        })?;
        found.ok_or_else(|| DriverError::Timeout {
            selector: locator.to_string(),
            ms: millis(timeout),
        })
    }

    /// Wait until the element is displayed and enabled
    fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
        interval: Duration,
    ) -> DriverResult<ElementHandle> {
        let found = poll_until(timeout, interval, || match self.find_element(locator) {
            Ok(element) => {
                let ready = self.is_displayed(&element)? && self.is_enabled(&element)?;
                Ok(ready.then_some(element))
            }
            Err(err) if err.is_absent() => Ok(None),
            Err(err) => Err(err),
        })?;
        found.ok_or_else(|| DriverError::Timeout {
            selector: locator.to_string(),
            ms: millis(timeout),
        })
    }
}

// ============================================================================
// Driver handle
// ============================================================================

struct HandleInner {
    driver: Box<dyn AutomationDriver>,
    config: DriverConfig,
    released: AtomicBool,
}

/// Shared handle to one scenario's driver
///
/// Cloning shares the same driver. After [`release`](Self::release) every
/// command fails with [`DispatchError::SessionReleased`] without reaching the
/// driver.
#[derive(Clone)]
pub struct DriverHandle {
    inner: Arc<HandleInner>,
}

impl fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverHandle")
            .field("driver", &self.inner.driver)
            .field("released", &self.is_released())
            .finish()
    }
}

impl DriverHandle {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: Box<dyn AutomationDriver>, config: DriverConfig) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                driver,
                config,
                released: AtomicBool::new(false),
            }),
        }
    }

    /// Driver configuration
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.inner.config
    }

    /// Whether the driver has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Whether both handles share one driver
    #[must_use]
    pub fn same_session(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn live(&self) -> DispatchResult<&dyn AutomationDriver> {
        if self.is_released() {
            return Err(DispatchError::SessionReleased);
        }
        Ok(self.inner.driver.as_ref())
    }

    /// Find the first element matching the locator
    pub fn find_element(&self, locator: &Locator) -> DispatchResult<ElementHandle> {
        tracing::debug!(%locator, "find_element");
        Ok(self.live()?.find_element(locator)?)
    }

    /// Wait, bounded by the configured element timeout, for visibility
    pub fn wait_until_visible(&self, locator: &Locator) -> DispatchResult<ElementHandle> {
        let config = self.config();
        tracing::debug!(
            %locator,
            timeout_ms = config.element_timeout_ms,
            poll_ms = config.poll_interval_ms,
            "wait_until_visible"
        );
        Ok(self
            .live()?
            .wait_until_visible(locator, config.element_wait(), config.poll_wait())?)
    }

    /// Wait, bounded by the configured element timeout, for clickability
    pub fn wait_until_clickable(&self, locator: &Locator) -> DispatchResult<ElementHandle> {
        let config = self.config();
        tracing::debug!(
            %locator,
            timeout_ms = config.element_timeout_ms,
            poll_ms = config.poll_interval_ms,
            "wait_until_clickable"
        );
        Ok(self
            .live()?
            .wait_until_clickable(locator, config.element_wait(), config.poll_wait())?)
    }

    /// Click element
    pub fn click(&self, element: &ElementHandle) -> DispatchResult<()> {
        Ok(self.live()?.click(element)?)
    }

    /// Clear element
    pub fn clear(&self, element: &ElementHandle) -> DispatchResult<()> {
        Ok(self.live()?.clear(element)?)
    }

    /// Type text into element
    pub fn send_keys(&self, element: &ElementHandle, text: &str) -> DispatchResult<()> {
        Ok(self.live()?.send_keys(element, text)?)
    }

    /// Visible text of element
    pub fn text(&self, element: &ElementHandle) -> DispatchResult<String> {
        Ok(self.live()?.text(element)?)
    }

    /// Attribute value of element
    pub fn attribute(&self, element: &ElementHandle, name: &str) -> DispatchResult<Option<String>> {
        Ok(self.live()?.attribute(element, name)?)
    }

    /// Whether element is displayed
    pub fn is_displayed(&self, element: &ElementHandle) -> DispatchResult<bool> {
        Ok(self.live()?.is_displayed(element)?)
    }

    /// Navigate to URL
    pub fn navigate(&self, url: &str) -> DispatchResult<()> {
        tracing::debug!(url, "navigate");
        Ok(self.live()?.navigate(url)?)
    }

    /// Current URL
    pub fn current_url(&self) -> DispatchResult<String> {
        Ok(self.live()?.current_url()?)
    }

    /// Page title
    pub fn title(&self) -> DispatchResult<String> {
        Ok(self.live()?.title()?)
    }

    /// Markup of the current document
    pub fn page_source(&self) -> DispatchResult<String> {
        Ok(self.live()?.page_source()?)
    }

    /// Quit the driver if no one has yet.
    ///
    /// Returns `true` when this call performed the release.
    pub fn release(&self) -> DispatchResult<bool> {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        self.inner.driver.quit()?;
        Ok(true)
    }
}

// ============================================================================
// Mock driver
// ============================================================================

/// An element held by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Locator that finds this element
    pub locator: Locator,
    /// Tag name
    pub tag_name: String,
    /// Visible text
    pub text: String,
    /// Input value
    pub value: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Whether the element renders
    pub displayed: bool,
    /// Whether the element accepts interaction
    pub enabled: bool,
    /// Number of visibility probes that still report hidden
    pub hidden_probes: usize,
}

impl MockElement {
    /// Visible, enabled element
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            tag_name: "div".to_string(),
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            hidden_probes: 0,
        }
    }

    /// Set tag name
    #[must_use]
    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Present but never displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Present but disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Report hidden for the first `probes` visibility checks
    #[must_use]
    pub const fn visible_after(mut self, probes: usize) -> Self {
        self.hidden_probes = probes;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    elements: Vec<MockElement>,
    current_url: String,
    title: String,
    page_source: String,
    history: Vec<String>,
    quit_count: usize,
}

/// Mock driver for unit testing
///
/// Clones share state, so a test can keep one clone as a probe while the
/// other is owned by a [`DriverHandle`].
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock element (builder form)
    #[must_use]
    pub fn with_element(self, element: MockElement) -> Self {
        self.add_element(element);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a mock element, replacing any element with the same locator
    pub fn add_element(&self, element: MockElement) {
        let mut state = self.state();
        state.elements.retain(|e| e.locator != element.locator);
        state.elements.push(element);
    }

    /// Remove the element with this locator
    pub fn remove_element(&self, locator: &Locator) {
        self.state().elements.retain(|e| e.locator != *locator);
    }

    /// Snapshot of the element with this locator
    #[must_use]
    pub fn element(&self, locator: &Locator) -> Option<MockElement> {
        self.state().elements.iter().find(|e| e.locator == *locator).cloned()
    }

    /// Set page title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Set the markup returned by `page_source`
    pub fn set_page_source(&self, source: impl Into<String>) {
        self.state().page_source = source.into();
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// History entries starting with `prefix`
    #[must_use]
    pub fn calls(&self, prefix: &str) -> Vec<String> {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    /// How many times `quit` reached the driver
    #[must_use]
    pub fn quit_count(&self) -> usize {
        self.state().quit_count
    }

    fn with_element_mut<T>(
        &self,
        call: String,
        locator: &Locator,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> DriverResult<T> {
        let mut state = self.state();
        state.history.push(call);
        state
            .elements
            .iter_mut()
            .find(|e| e.locator == *locator)
            .map(f)
            .ok_or_else(|| DriverError::NotFound {
                selector: locator.to_string(),
            })
    }
}

impl AutomationDriver for MockDriver {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle> {
        self.with_element_mut(format!("find:{locator}"), locator, |e| {
            ElementHandle::new(e.locator).with_tag(e.tag_name.clone())
        })
    }

    fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let locator = element.locator;
        self.with_element_mut(format!("click:{locator}"), &locator, |_| ())
    }

    fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        let locator = element.locator;
        self.with_element_mut(format!("clear:{locator}"), &locator, |e| e.value.clear())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let locator = element.locator;
        self.with_element_mut(format!("send_keys:{locator}:{text}"), &locator, |e| {
            e.value.push_str(text);
        })
    }

    fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        let locator = element.locator;
        self.with_element_mut(format!("text:{locator}"), &locator, |e| e.text.clone())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let locator = element.locator;
        self.with_element_mut(format!("attribute:{locator}:{name}"), &locator, |e| {
            e.attributes
                .get(name)
                .cloned()
                .or_else(|| (name == "value").then(|| e.value.clone()))
        })
    }

    fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        let locator = element.locator;
        self.with_element_mut(format!("is_displayed:{locator}"), &locator, |e| {
            if e.hidden_probes > 0 {
                e.hidden_probes -= 1;
                false
            } else {
                e.displayed
            }
        })
    }

    fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        let locator = element.locator;
        self.with_element_mut(format!("is_enabled:{locator}"), &locator, |e| e.enabled)
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state();
        state.history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.state().current_url.clone())
    }

    fn title(&self) -> DriverResult<String> {
        Ok(self.state().title.clone())
    }

    fn page_source(&self) -> DriverResult<String> {
        let mut state = self.state();
        state.history.push("page_source".to_string());
        Ok(state.page_source.clone())
    }

    fn quit(&self) -> DriverResult<()> {
        let mut state = self.state();
        state.history.push("quit".to_string());
        state.quit_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const USERNAME: Locator = Locator::id("user-name");
    const SUBMIT: Locator = Locator::id("login-button");

    const PROBE_EVERY: Duration = Duration::from_millis(1);

    fn handle_for(mock: &MockDriver, timeout_ms: u64) -> DriverHandle {
        DriverHandle::new(
            Box::new(mock.clone()),
            DriverConfig::default().element_timeout(timeout_ms).poll_interval(1),
        )
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.viewport_width, 1920);
            assert_eq!(config.element_wait(), Duration::from_secs(10));
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(800, 600)
                .element_timeout(250)
                .executable_path("/usr/bin/chromium")
                .no_sandbox();

            assert!(!config.headless);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.viewport_height, 600);
            assert_eq!(config.element_timeout_ms, 250);
            assert_eq!(config.executable_path.as_deref(), Some("/usr/bin/chromium"));
            assert!(!config.sandbox);
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[test]
        fn test_find_missing_element() {
            let mock = MockDriver::new();
            let err = mock.find_element(&USERNAME).unwrap_err();
            assert!(err.is_absent());
            assert!(mock.was_called("find:id=user-name"));
        }

        #[test]
        fn test_clear_and_type() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME).with_tag("input"));
            let element = mock.find_element(&USERNAME).unwrap();
            assert_eq!(element.tag_name.as_deref(), Some("input"));

            mock.send_keys(&element, "old").unwrap();
            mock.clear(&element).unwrap();
            mock.send_keys(&element, "standard_user").unwrap();

            assert_eq!(mock.element(&USERNAME).unwrap().value, "standard_user");
            assert_eq!(
                mock.attribute(&element, "value").unwrap().as_deref(),
                Some("standard_user")
            );
        }

        #[test]
        fn test_visible_after_counts_probes() {
            let mock = MockDriver::new().with_element(MockElement::new(SUBMIT).visible_after(2));
            let element = mock.find_element(&SUBMIT).unwrap();
            assert!(!mock.is_displayed(&element).unwrap());
            assert!(!mock.is_displayed(&element).unwrap());
            assert!(mock.is_displayed(&element).unwrap());
        }

        #[test]
        fn test_clones_share_state() {
            let mock = MockDriver::new();
            let probe = mock.clone();
            mock.navigate("https://www.saucedemo.com/").unwrap();
            assert_eq!(probe.current_url().unwrap(), "https://www.saucedemo.com/");
            assert_eq!(probe.calls("navigate").len(), 1);
        }
    }

    mod wait_tests {
        use super::*;

        #[test]
        fn test_wait_until_visible_polls() {
            let mock = MockDriver::new().with_element(MockElement::new(SUBMIT).visible_after(3));
            let element = mock.wait_until_visible(&SUBMIT, Duration::from_secs(2), PROBE_EVERY).unwrap();
            assert_eq!(element.locator, SUBMIT);
            assert_eq!(mock.calls("is_displayed").len(), 4);
        }

        #[test]
        fn test_wait_until_visible_times_out() {
            let mock = MockDriver::new().with_element(MockElement::new(SUBMIT).hidden());
            let err = mock.wait_until_visible(&SUBMIT, Duration::from_millis(5), PROBE_EVERY).unwrap_err();
            assert!(matches!(err, DriverError::Timeout { ms: 5, .. }));
        }

        #[test]
        fn test_wait_until_clickable_requires_enabled() {
            let mock = MockDriver::new().with_element(MockElement::new(SUBMIT).disabled());
            let err = mock.wait_until_clickable(&SUBMIT, Duration::from_millis(5), PROBE_EVERY).unwrap_err();
            assert!(err.is_absent());
        }
    }

    mod handle_tests {
        use super::*;

        #[test]
        fn test_handle_delegates() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME));
            let handle = handle_for(&mock, 50);
            let element = handle.wait_until_visible(&USERNAME).unwrap();
            handle.send_keys(&element, "u").unwrap();
            assert_eq!(mock.element(&USERNAME).unwrap().value, "u");
        }

        #[test]
        fn test_handle_probes_at_configured_interval() {
            let mock = MockDriver::new().with_element(MockElement::new(SUBMIT).hidden());
            let handle = DriverHandle::new(
                Box::new(mock.clone()),
                DriverConfig::default().element_timeout(200).poll_interval(100),
            );
            let err = handle.wait_until_visible(&SUBMIT).unwrap_err();
            assert!(matches!(err, DispatchError::Driver(DriverError::Timeout { ms: 200, .. })));
            let probes = mock.calls("is_displayed").len();
            assert!((2..=4).contains(&probes), "{probes} probes");
        }

        #[test]
        fn test_release_once() {
            let mock = MockDriver::new();
            let handle = handle_for(&mock, 50);
            let shared = handle.clone();

            assert!(handle.release().unwrap());
            assert!(!shared.release().unwrap());
            assert_eq!(mock.quit_count(), 1);
            assert!(shared.is_released());
            assert!(handle.same_session(&shared));
        }

        #[test]
        fn test_released_handle_refuses_commands() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME));
            let handle = handle_for(&mock, 50);
            let _ = handle.release().unwrap();

            let err = handle.find_element(&USERNAME).unwrap_err();
            assert!(matches!(err, DispatchError::SessionReleased));
            assert!(!mock.was_called("find"));
        }
    }
}
