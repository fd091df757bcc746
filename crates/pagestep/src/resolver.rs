//! Element Resolver
//!
//! Turns a scenario-level element name ("loginButton") into the locator a
//! screen type declares for it (`LOGIN_BUTTON`), then performs one primitive
//! action on the live element.
//!
//! Resolution is pure and memoized per `(screen type, requested name)`, where
//! the type is identified by its declaration table rather than its name.
//! Execution always goes to the driver.
//!
//! ## Toyota Way Application
//!
//! - **Muda**: A hierarchy search happens at most once per name and type
//! - **Jidoka**: Unknown names fail loudly; there is no fallback locator

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::{DispatchError, DispatchResult};
use crate::screen::{Screen, ScreenType};
use regex::Regex;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Map a scenario element name onto the declared field convention.
///
/// An underscore goes between every lowercase ASCII letter and the uppercase
/// ASCII letter right after it, then the whole name is uppercased:
/// `loginButton` becomes `LOGIN_BUTTON`, `sortAtoZ` becomes `SORT_ATO_Z`.
#[must_use]
pub fn canonical_field_name(name: &str) -> String {
    static WORD_BOUNDARY: OnceLock<Regex> = OnceLock::new();
    let boundary = WORD_BOUNDARY.get_or_init(|| Regex::new("([a-z])([A-Z])").expect("valid regex"));
    boundary.replace_all(name, "${1}_${2}").to_uppercase()
}

/// Identity of a declaration table, so same-named types never share entries
#[derive(Debug, Clone, Copy)]
struct KindKey(&'static ScreenType);

impl PartialEq for KindKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.is(other.0)
    }
}

impl Eq for KindKey {}

impl Hash for KindKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

type CacheKey = (KindKey, String);

/// Resolves element names against screen declarations and drives the result
#[derive(Debug, Default)]
pub struct ElementResolver {
    cache: RwLock<HashMap<CacheKey, Locator>>,
    searches: AtomicUsize,
}

impl ElementResolver {
    /// Create a resolver with an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Locator>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Locator>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `element` on the screen's concrete type
    pub fn resolve(&self, screen: &Screen, element: &str) -> DispatchResult<Locator> {
        self.resolve_in(screen.kind(), element)
    }

    /// Resolve `element` on `kind`, searching own declarations then ancestors
    pub fn resolve_in(&self, kind: &'static ScreenType, element: &str) -> DispatchResult<Locator> {
        let key = (KindKey(kind), element.to_string());
        let cached = self.read_cache().get(&key).copied();
        if let Some(locator) = cached {
            debug!(screen = kind.name, element, %locator, "resolver cache hit");
            return Ok(locator);
        }

        let _ = self.searches.fetch_add(1, Ordering::Relaxed);
        let field = canonical_field_name(element);
        let Some((owner, locator)) = kind.find_locator(&field) else {
            return Err(DispatchError::Resolution {
                element: element.to_string(),
                field,
                screen: kind.name.to_string(),
            });
        };

        debug!(
            screen = kind.name,
            declared_on = owner.name,
            element,
            field = %field,
            %locator,
            "resolved element"
        );
        let _ = self.write_cache().insert(key, locator);
        Ok(locator)
    }

    fn present(
        screen: &Screen,
        element: &str,
        found: DispatchResult<ElementHandle>,
    ) -> DispatchResult<ElementHandle> {
        match found {
            Err(DispatchError::Driver(source)) if source.is_absent() => Err(DispatchError::ElementNotFound {
                element: element.to_string(),
                screen: screen.name().to_string(),
                source,
            }),
            other => other,
        }
    }

    /// Clear the element and type `text` into it
    pub fn perform_enter(&self, screen: &Screen, element: &str, text: &str) -> DispatchResult<()> {
        let locator = self.resolve(screen, element)?;
        let driver = screen.driver();
        let handle = Self::present(screen, element, driver.find_element(&locator))?;
        driver.clear(&handle)?;
        driver.send_keys(&handle, text)
    }

    /// Wait until the element is clickable, then click it
    pub fn perform_click(&self, screen: &Screen, element: &str) -> DispatchResult<()> {
        let locator = self.resolve(screen, element)?;
        let driver = screen.driver();
        let handle = Self::present(screen, element, driver.wait_until_clickable(&locator))?;
        driver.click(&handle)
    }

    /// Wait until the element is visible, then read its text
    pub fn read_text(&self, screen: &Screen, element: &str) -> DispatchResult<String> {
        let locator = self.resolve(screen, element)?;
        let driver = screen.driver();
        let handle = Self::present(screen, element, driver.wait_until_visible(&locator))?;
        driver.text(&handle)
    }

    /// Wait until the element is visible, then read one attribute
    pub fn read_attribute(&self, screen: &Screen, element: &str, attribute: &str) -> DispatchResult<Option<String>> {
        let locator = self.resolve(screen, element)?;
        let driver = screen.driver();
        let handle = Self::present(screen, element, driver.wait_until_visible(&locator))?;
        driver.attribute(&handle, attribute)
    }

    /// Whether the element is displayed right now. Never fails.
    #[must_use]
    pub fn is_displayed(&self, screen: &Screen, element: &str) -> bool {
        let locator = match self.resolve(screen, element) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(screen = screen.name(), element, error = %err, "treating unresolvable element as not displayed");
                return false;
            }
        };

        let driver = screen.driver();
        match driver.find_element(&locator).and_then(|handle| driver.is_displayed(&handle)) {
            Ok(displayed) => displayed,
            Err(err) => {
                debug!(screen = screen.name(), element, error = %err, "element not displayed");
                false
            }
        }
    }

    /// Run the named behavior declared on the screen's type or an ancestor
    pub fn invoke_behavior(&self, screen: &Screen, behavior: &str) -> DispatchResult<()> {
        let decl = screen
            .kind()
            .find_behavior(behavior)
            .ok_or_else(|| DispatchError::BehaviorNotFound {
                screen: screen.name().to_string(),
                behavior: behavior.to_string(),
            })?;
        debug!(screen = screen.name(), behavior, "invoking behavior");
        (decl.run)(screen)
    }

    /// Drop every memoized resolution
    pub fn clear_cache(&self) {
        self.write_cache().clear();
    }

    /// Number of memoized resolutions
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.read_cache().len()
    }

    /// Number of hierarchy searches performed so far
    #[must_use]
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, DriverHandle, MockDriver, MockElement};
    use crate::screen::{BehaviorDecl, LocatorDecl};

    const USERNAME: Locator = Locator::id("user-name");
    const PASSWORD: Locator = Locator::id("password");
    const LOGIN_BUTTON: Locator = Locator::id("login-button");
    const ERROR_MESSAGE: Locator = Locator::css("[data-test='error']");

    fn broken(_: &Screen) -> DispatchResult<()> {
        Err(DispatchError::Config {
            message: "behavior failed".into(),
        })
    }

    static SHELL: ScreenType = ScreenType {
        name: "Shell",
        parent: None,
        locators: &[
            LocatorDecl::new("PAGE_TITLE", Locator::class_name("title")),
            LocatorDecl::new("ERROR_MESSAGE", Locator::id("shell-error")),
        ],
        behaviors: &[BehaviorDecl::new("reset", broken)],
    };

    static LOGIN: ScreenType = ScreenType {
        name: "Login",
        parent: Some(&SHELL),
        locators: &[
            LocatorDecl::new("USERNAME", USERNAME),
            LocatorDecl::new("PASSWORD", PASSWORD),
            LocatorDecl::new("LOGIN_BUTTON", LOGIN_BUTTON),
            LocatorDecl::new("ERROR_MESSAGE", ERROR_MESSAGE),
        ],
        behaviors: &[],
    };

    fn login_screen(mock: &MockDriver) -> Screen {
        let config = DriverConfig::default().element_timeout(20).poll_interval(1);
        let driver = DriverHandle::new(Box::new(mock.clone()), config);
        Screen::new(&LOGIN, driver)
    }

    mod naming_tests {
        use super::*;

        #[test]
        fn test_camel_case() {
            assert_eq!(canonical_field_name("loginButton"), "LOGIN_BUTTON");
            assert_eq!(canonical_field_name("errorMessage"), "ERROR_MESSAGE");
        }

        #[test]
        fn test_single_word() {
            assert_eq!(canonical_field_name("username"), "USERNAME");
        }

        #[test]
        fn test_already_canonical() {
            assert_eq!(canonical_field_name("USERNAME"), "USERNAME");
            assert_eq!(canonical_field_name("LOGIN_BUTTON"), "LOGIN_BUTTON");
        }

        #[test]
        fn test_adjacent_capitals() {
            assert_eq!(canonical_field_name("sortAtoZ"), "SORT_ATO_Z");
            assert_eq!(canonical_field_name("addToCartBTN"), "ADD_TO_CART_BTN");
        }

        #[test]
        fn test_digits_do_not_split() {
            assert_eq!(canonical_field_name("item2Name"), "ITEM2NAME");
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolves_own_declaration() {
            let resolver = ElementResolver::new();
            assert_eq!(resolver.resolve_in(&LOGIN, "loginButton").unwrap(), LOGIN_BUTTON);
        }

        #[test]
        fn test_resolves_inherited_declaration() {
            let resolver = ElementResolver::new();
            assert_eq!(
                resolver.resolve_in(&LOGIN, "pageTitle").unwrap(),
                Locator::class_name("title")
            );
        }

        #[test]
        fn test_subtype_shadows_ancestor() {
            let resolver = ElementResolver::new();
            assert_eq!(resolver.resolve_in(&LOGIN, "errorMessage").unwrap(), ERROR_MESSAGE);
            assert_eq!(
                resolver.resolve_in(&SHELL, "errorMessage").unwrap(),
                Locator::id("shell-error")
            );
        }

        #[test]
        fn test_second_resolution_skips_search() {
            let resolver = ElementResolver::new();
            let first = resolver.resolve_in(&LOGIN, "username").unwrap();
            let second = resolver.resolve_in(&LOGIN, "username").unwrap();
            assert_eq!(first, second);
            assert_eq!(resolver.search_count(), 1);
            assert_eq!(resolver.cached_len(), 1);
        }

        #[test]
        fn test_cache_keyed_by_requested_name() {
            let resolver = ElementResolver::new();
            let camel = resolver.resolve_in(&LOGIN, "username").unwrap();
            let upper = resolver.resolve_in(&LOGIN, "USERNAME").unwrap();
            assert_eq!(camel, upper);
            assert_eq!(resolver.cached_len(), 2);
        }

        #[test]
        fn test_unknown_name_is_not_memoized() {
            let resolver = ElementResolver::new();
            for _ in 0..2 {
                let err = resolver.resolve_in(&LOGIN, "rememberMe").unwrap_err();
                match err {
                    DispatchError::Resolution { element, field, screen } => {
                        assert_eq!(element, "rememberMe");
                        assert_eq!(field, "REMEMBER_ME");
                        assert_eq!(screen, "Login");
                    }
                    other => panic!("unexpected error: {other}"),
                }
            }
            assert_eq!(resolver.search_count(), 2);
            assert_eq!(resolver.cached_len(), 0);
        }

        #[test]
        fn test_same_named_types_do_not_share_entries() {
            static OTHER_LOGIN: ScreenType = ScreenType {
                name: "Login",
                parent: None,
                locators: &[LocatorDecl::new("USERNAME", Locator::css("input[name='email']"))],
                behaviors: &[],
            };

            let resolver = ElementResolver::new();
            assert_eq!(resolver.resolve_in(&LOGIN, "username").unwrap(), USERNAME);
            assert_eq!(
                resolver.resolve_in(&OTHER_LOGIN, "username").unwrap(),
                Locator::css("input[name='email']")
            );
            assert_eq!(resolver.resolve_in(&LOGIN, "username").unwrap(), USERNAME);
            assert_eq!(resolver.search_count(), 2);
            assert_eq!(resolver.cached_len(), 2);
        }

        #[test]
        fn test_clear_cache_keeps_results() {
            let resolver = ElementResolver::new();
            let before = resolver.resolve_in(&LOGIN, "password").unwrap();
            resolver.clear_cache();
            assert_eq!(resolver.cached_len(), 0);
            assert_eq!(resolver.resolve_in(&LOGIN, "password").unwrap(), before);
            assert_eq!(resolver.search_count(), 2);
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_enter_clears_then_types() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME).with_tag("input"));
            let screen = login_screen(&mock);
            let resolver = ElementResolver::new();

            resolver.perform_enter(&screen, "username", "first").unwrap();
            resolver.perform_enter(&screen, "username", "standard_user").unwrap();

            assert_eq!(mock.element(&USERNAME).unwrap().value, "standard_user");
            let clears = mock.calls("clear:");
            assert_eq!(clears.len(), 2);
        }

        #[test]
        fn test_enter_missing_element() {
            let mock = MockDriver::new();
            let screen = login_screen(&mock);
            let err = ElementResolver::new()
                .perform_enter(&screen, "username", "x")
                .unwrap_err();
            assert!(matches!(
                err,
                DispatchError::ElementNotFound { ref element, ref screen, .. }
                    if element == "username" && screen == "Login"
            ));
        }

        #[test]
        fn test_click_waits_for_clickable() {
            let mock = MockDriver::new().with_element(MockElement::new(LOGIN_BUTTON).visible_after(2));
            let screen = login_screen(&mock);
            ElementResolver::new().perform_click(&screen, "loginButton").unwrap();
            assert_eq!(mock.calls("click:"), vec!["click:id=login-button".to_string()]);
        }

        #[test]
        fn test_click_on_hidden_element_times_out() {
            let mock = MockDriver::new().with_element(MockElement::new(LOGIN_BUTTON).hidden());
            let screen = login_screen(&mock);
            let err = ElementResolver::new()
                .perform_click(&screen, "loginButton")
                .unwrap_err();
            assert!(matches!(err, DispatchError::ElementNotFound { .. }));
            assert!(!mock.was_called("click:"));
        }

        #[test]
        fn test_read_text_and_attribute() {
            let mock = MockDriver::new().with_element(
                MockElement::new(ERROR_MESSAGE)
                    .with_text("Epic sadface: Username is required")
                    .with_attribute("data-test", "error"),
            );
            let screen = login_screen(&mock);
            let resolver = ElementResolver::new();

            assert_eq!(
                resolver.read_text(&screen, "errorMessage").unwrap(),
                "Epic sadface: Username is required"
            );
            assert_eq!(
                resolver.read_attribute(&screen, "errorMessage", "data-test").unwrap().as_deref(),
                Some("error")
            );
            assert_eq!(resolver.read_attribute(&screen, "errorMessage", "href").unwrap(), None);
        }
    }

    mod is_displayed_tests {
        use super::*;

        #[test]
        fn test_visible_element() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME));
            assert!(ElementResolver::new().is_displayed(&login_screen(&mock), "username"));
        }

        #[test]
        fn test_absent_element_is_false() {
            let mock = MockDriver::new();
            assert!(!ElementResolver::new().is_displayed(&login_screen(&mock), "username"));
        }

        #[test]
        fn test_hidden_element_is_false() {
            let mock = MockDriver::new().with_element(MockElement::new(USERNAME).hidden());
            assert!(!ElementResolver::new().is_displayed(&login_screen(&mock), "username"));
        }

        #[test]
        fn test_unresolvable_name_is_false() {
            let mock = MockDriver::new();
            assert!(!ElementResolver::new().is_displayed(&login_screen(&mock), "rememberMe"));
            assert!(!mock.was_called("find"));
        }
    }

    mod behavior_tests {
        use super::*;

        #[test]
        fn test_missing_behavior() {
            let mock = MockDriver::new();
            let err = ElementResolver::new()
                .invoke_behavior(&login_screen(&mock), "navigate")
                .unwrap_err();
            assert!(matches!(
                err,
                DispatchError::BehaviorNotFound { ref screen, ref behavior }
                    if screen == "Login" && behavior == "navigate"
            ));
        }

        #[test]
        fn test_inherited_behavior_error_propagates() {
            let mock = MockDriver::new();
            let err = ElementResolver::new()
                .invoke_behavior(&login_screen(&mock), "reset")
                .unwrap_err();
            assert!(matches!(err, DispatchError::Config { .. }));
        }
    }
}
