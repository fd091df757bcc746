//! Pagestep: String-Dispatched UI Test Steps
//!
//! Scenario steps name a screen, an element and a verb as plain text
//! ("enter `standard_user` into username on LoginPage"). Pagestep resolves
//! those names at run time against static screen declarations and performs
//! the action through a blocking browser driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PAGESTEP Dispatch Flow                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Action     │    │ Screen     │    │ Element    │            │
//! │   │ Dispatcher │───►│ Registry   │───►│ Resolver   │──► driver  │
//! │   │ (verbs)    │    │ (by name)  │    │ (cached)   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │          ▲                                                       │
//! │   ┌──────┴─────────────────────────────────────────┐            │
//! │   │ ScenarioContext: driver handle + screen catalog │            │
//! │   └────────────────────────────────────────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pagestep::{ElementResolver, MockDriver, ScenarioContext, ScreenCatalog, DriverConfig};
//! use std::sync::Arc;
//!
//! # fn main() -> pagestep::DispatchResult<()> {
//! let context = ScenarioContext::new(
//!     Box::new(MockDriver::new()),
//!     &DriverConfig::default(),
//!     &ScreenCatalog::saucedemo(),
//! )?;
//! let verbs = context.dispatcher(Arc::new(ElementResolver::new()));
//! verbs.navigate("LoginPage")?;
//! verbs.perform_login("standard_user", "secret_sauce", "LoginPage")?;
//! verbs.verify_text_equals("pageTitle", "InventoryPage", "Products")?;
//! context.cleanup()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod browser;
#[allow(clippy::missing_errors_doc)]
mod config;
#[allow(clippy::missing_errors_doc)]
mod context;
#[allow(clippy::missing_errors_doc)]
mod dispatcher;
#[allow(clippy::missing_errors_doc)]
mod driver;
mod locator;
mod logging;
#[allow(clippy::missing_errors_doc)]
mod registry;
#[allow(clippy::missing_errors_doc)]
mod resolver;
mod result;
#[allow(clippy::missing_errors_doc)]
mod screen;
/// Reference screens for the Sauce Demo storefront
pub mod screens;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumFactory};
pub use config::{HarnessConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE};
pub use context::{DriverFactory, ScenarioContext, ScreenCatalog};
pub use dispatcher::ActionDispatcher;
pub use driver::{AutomationDriver, DriverConfig, DriverHandle, ElementHandle, MockDriver, MockElement};
pub use locator::{Locator, Selector};
pub use logging::{init_tracing, LogFormat, LoggingConfig};
pub use registry::ScreenRegistry;
pub use resolver::{canonical_field_name, ElementResolver};
pub use result::{DispatchError, DispatchResult, DriverError, DriverResult};
pub use screen::{BehaviorDecl, BehaviorFn, LocatorDecl, Screen, ScreenType};
pub use wait::{
    poll_attempts, poll_until, PollOptions, PollOutcome, DEFAULT_DRIVER_POLL_MS, DEFAULT_ELEMENT_TIMEOUT_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL,
};
