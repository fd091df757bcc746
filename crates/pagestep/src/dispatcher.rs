//! Action Dispatcher
//!
//! The verbs a scenario step calls. Every verb takes plain strings: an element
//! name, a screen name and, where needed, text or an expected value. The screen
//! is looked up in the registry; the element work goes to the resolver.
//!
//! Only two verbs tolerate failure: `verify_not_displayed` (through
//! `is_displayed`, which reports `false` for anything missing) and `navigate`
//! (a missing behavior is logged and skipped). Everything else propagates.
//!
//! ## Toyota Way Application
//!
//! - **Andon**: Assertion failures carry both expected and actual values
//! - **Jidoka**: Polling waits stop after a fixed number of attempts

use crate::registry::ScreenRegistry;
use crate::resolver::ElementResolver;
use crate::result::{DispatchError, DispatchResult};
use crate::screen::Screen;
use crate::wait::{poll_attempts, PollOptions, PollOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ABSENT: &str = "(absent)";

/// Scenario-facing verb set
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    registry: ScreenRegistry,
    resolver: Arc<ElementResolver>,
    wait: PollOptions,
}

impl ActionDispatcher {
    /// Dispatch over `registry`, resolving through `resolver`
    #[must_use]
    pub fn new(registry: ScreenRegistry, resolver: Arc<ElementResolver>) -> Self {
        Self {
            registry,
            resolver,
            wait: PollOptions::default(),
        }
    }

    /// Set the options used by [`wait_for_displayed_default`](Self::wait_for_displayed_default)
    #[must_use]
    pub const fn with_wait_options(mut self, wait: PollOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Screens this dispatcher can reach
    #[must_use]
    pub const fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    /// Resolver in use
    #[must_use]
    pub fn resolver(&self) -> &ElementResolver {
        &self.resolver
    }

    fn screen(&self, name: &str) -> DispatchResult<Arc<Screen>> {
        self.registry.get(name)
    }

    fn assertion(
        check: &str,
        element: &str,
        screen: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> DispatchError {
        DispatchError::Assertion {
            check: check.to_string(),
            element: element.to_string(),
            screen: screen.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Type `text` into the element, replacing its contents
    pub fn enter_text(&self, text: &str, element: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, element, "enter text");
        let target = self.screen(screen)?;
        self.resolver.perform_enter(&target, element, text)
    }

    /// Empty the element
    pub fn clear(&self, element: &str, screen: &str) -> DispatchResult<()> {
        self.enter_text("", element, screen)
    }

    /// Click the element
    pub fn click(&self, element: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, element, "click");
        let target = self.screen(screen)?;
        self.resolver.perform_click(&target, element)
    }

    /// Read the element's visible text
    pub fn read_text(&self, element: &str, screen: &str) -> DispatchResult<String> {
        let target = self.screen(screen)?;
        let text = self.resolver.read_text(&target, element)?;
        info!(screen, element, text = %text, "read text");
        Ok(text)
    }

    /// Assert the element is displayed
    pub fn verify_displayed(&self, element: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, element, "verify displayed");
        let target = self.screen(screen)?;
        if self.resolver.is_displayed(&target, element) {
            Ok(())
        } else {
            Err(Self::assertion("displayed", element, screen, "displayed", "not displayed"))
        }
    }

    /// Assert the element is displayed after a change elsewhere on the screen.
    ///
    /// Shown-ness is the only observable signal: a recomputed value (a cart
    /// total, a badge count) must still be rendered.
    pub fn verify_updated(&self, element: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, element, "verify updated");
        let target = self.screen(screen)?;
        if self.resolver.is_displayed(&target, element) {
            Ok(())
        } else {
            Err(Self::assertion("updated", element, screen, "displayed", "not displayed"))
        }
    }

    /// Assert the element is not displayed
    pub fn verify_not_displayed(&self, element: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, element, "verify not displayed");
        let target = self.screen(screen)?;
        if self.resolver.is_displayed(&target, element) {
            Err(Self::assertion("not displayed", element, screen, "not displayed", "displayed"))
        } else {
            Ok(())
        }
    }

    /// Assert the element's text equals `expected`
    pub fn verify_text_equals(&self, element: &str, screen: &str, expected: &str) -> DispatchResult<()> {
        info!(screen, element, expected, "verify text equals");
        let target = self.screen(screen)?;
        let actual = self.resolver.read_text(&target, element)?;
        if actual == expected {
            Ok(())
        } else {
            Err(Self::assertion("text equals", element, screen, expected, actual))
        }
    }

    /// Assert the element's text contains `expected`
    pub fn verify_text_contains(&self, element: &str, screen: &str, expected: &str) -> DispatchResult<()> {
        info!(screen, element, expected, "verify text contains");
        let target = self.screen(screen)?;
        let actual = self.resolver.read_text(&target, element)?;
        if actual.contains(expected) {
            Ok(())
        } else {
            Err(Self::assertion("text contains", element, screen, expected, actual))
        }
    }

    /// Assert an attribute equals `expected`. An absent attribute fails.
    pub fn verify_attribute_equals(
        &self,
        element: &str,
        screen: &str,
        attribute: &str,
        expected: &str,
    ) -> DispatchResult<()> {
        info!(screen, element, attribute, expected, "verify attribute equals");
        let target = self.screen(screen)?;
        match self.resolver.read_attribute(&target, element, attribute)? {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(Self::assertion(
                &format!("attribute '{attribute}' equals"),
                element,
                screen,
                expected,
                actual,
            )),
            None => Err(Self::assertion(
                &format!("attribute '{attribute}' equals"),
                element,
                screen,
                expected,
                ABSENT,
            )),
        }
    }

    /// Assert an attribute contains `expected`. An absent attribute fails.
    pub fn verify_attribute_contains(
        &self,
        element: &str,
        screen: &str,
        attribute: &str,
        expected: &str,
    ) -> DispatchResult<()> {
        info!(screen, element, attribute, expected, "verify attribute contains");
        let target = self.screen(screen)?;
        let check = format!("attribute '{attribute}' contains");
        match self.resolver.read_attribute(&target, element, attribute)? {
            Some(actual) if actual.contains(expected) => Ok(()),
            Some(actual) => Err(Self::assertion(&check, element, screen, expected, actual)),
            None => Err(Self::assertion(&check, element, screen, expected, ABSENT)),
        }
    }

    /// Poll until the element is displayed or the attempts run out
    pub fn wait_for_displayed(&self, element: &str, screen: &str, options: PollOptions) -> DispatchResult<()> {
        info!(
            screen,
            element,
            max_attempts = options.effective_attempts(),
            poll_interval_ms = options.poll_interval_ms,
            worst_case = ?options.worst_case_sleep(),
            "wait for displayed"
        );
        let target = self.screen(screen)?;
        let outcome = poll_attempts(&options, |attempt| {
            let displayed = self.resolver.is_displayed(&target, element);
            debug!(screen, element, attempt, displayed, "visibility poll");
            displayed
        });
        match outcome {
            PollOutcome::Satisfied { .. } => Ok(()),
            PollOutcome::Exhausted { attempts } => Err(DispatchError::Timeout {
                element: element.to_string(),
                screen: screen.to_string(),
                attempts,
                interval_ms: options.poll_interval_ms,
            }),
        }
    }

    /// [`wait_for_displayed`](Self::wait_for_displayed) with this dispatcher's options
    pub fn wait_for_displayed_default(&self, element: &str, screen: &str) -> DispatchResult<()> {
        self.wait_for_displayed(element, screen, self.wait)
    }

    /// Enter username and password, then click the login button
    pub fn perform_login(&self, username: &str, password: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, "perform login");
        self.enter_text(username, "username", screen)?;
        self.enter_text(password, "password", screen)?;
        self.click("loginButton", screen)
    }

    /// Run the screen's `navigate` behavior; skipped if it has none
    pub fn navigate(&self, screen: &str) -> DispatchResult<()> {
        info!(screen, "navigate");
        let target = self.screen(screen)?;
        match self.resolver.invoke_behavior(&target, "navigate") {
            Err(DispatchError::BehaviorNotFound { .. }) => {
                warn!(screen, "screen has no navigate behavior; skipping");
                Ok(())
            }
            other => other,
        }
    }

    /// Run any named behavior of the screen
    pub fn invoke(&self, behavior: &str, screen: &str) -> DispatchResult<()> {
        info!(screen, behavior, "invoke behavior");
        let target = self.screen(screen)?;
        self.resolver.invoke_behavior(&target, behavior)
    }
}
