//! Scenario Context
//!
//! One context per scenario: it owns the driver handle, builds every screen in
//! the catalog against it, and releases the driver when the scenario ends.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Catalog problems stop the scenario before any driver call
//! - **Muda**: Screens are built once per scenario and shared by `Arc`
//! - **Poka-Yoke**: A released driver refuses every command

use crate::config::HarnessConfig;
use crate::dispatcher::ActionDispatcher;
use crate::driver::{AutomationDriver, DriverConfig, DriverHandle};
use crate::registry::ScreenRegistry;
use crate::resolver::ElementResolver;
use crate::result::{DispatchError, DispatchResult, DriverResult};
use crate::screen::{Screen, ScreenType};
use crate::wait::PollOptions;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Creates the driver for a new scenario
pub trait DriverFactory {
    /// Start a driver configured by `config`
    fn create(&self, config: &DriverConfig) -> DriverResult<Box<dyn AutomationDriver>>;
}

impl<F> DriverFactory for F
where
    F: Fn(&DriverConfig) -> DriverResult<Box<dyn AutomationDriver>>,
{
    fn create(&self, config: &DriverConfig) -> DriverResult<Box<dyn AutomationDriver>> {
        self(config)
    }
}

/// Ordered set of screen types a scenario knows about
#[derive(Debug, Clone, Default)]
pub struct ScreenCatalog {
    kinds: Vec<&'static ScreenType>,
}

impl ScreenCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a screen type
    #[must_use]
    pub fn with(mut self, kind: &'static ScreenType) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Built-in catalog for the Sauce Demo storefront
    #[must_use]
    pub fn saucedemo() -> Self {
        crate::screens::saucedemo_catalog()
    }

    /// Screen types in declaration order
    #[must_use]
    pub fn kinds(&self) -> &[&'static ScreenType] {
        &self.kinds
    }

    /// Whether `kind` is part of the catalog
    #[must_use]
    pub fn contains(&self, kind: &ScreenType) -> bool {
        self.kinds.iter().any(|known| known.is(kind))
    }

    /// Number of screen types
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Reject duplicate screen names and duplicate sibling fields.
    ///
    /// Screens are registered by name, so two types sharing a name would
    /// shadow each other in the registry.
    pub fn validate(&self) -> DispatchResult<()> {
        let mut names = HashSet::new();
        for kind in &self.kinds {
            if !names.insert(kind.name) {
                return Err(DispatchError::InvalidCatalog {
                    message: format!("screen name '{}' is declared twice", kind.name),
                });
            }
            for ancestor in kind.lineage() {
                let duplicates = ancestor.duplicate_fields();
                if !duplicates.is_empty() {
                    return Err(DispatchError::InvalidCatalog {
                        message: format!(
                            "{} declares {} more than once",
                            ancestor.name,
                            duplicates.join(", ")
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Driver and screens for one running scenario
#[derive(Debug)]
pub struct ScenarioContext {
    id: Uuid,
    driver: DriverHandle,
    screens: Vec<Arc<Screen>>,
    registry: ScreenRegistry,
    wait: PollOptions,
}

impl ScenarioContext {
    /// Build every catalog screen over an already started driver
    pub fn new(
        driver: Box<dyn AutomationDriver>,
        config: &DriverConfig,
        catalog: &ScreenCatalog,
    ) -> DispatchResult<Self> {
        catalog.validate()?;
        Ok(Self::build(driver, config, catalog))
    }

    fn build(driver: Box<dyn AutomationDriver>, config: &DriverConfig, catalog: &ScreenCatalog) -> Self {
        let id = Uuid::new_v4();
        let driver = DriverHandle::new(driver, config.clone());
        let screens = catalog
            .kinds()
            .iter()
            .map(|&kind| Arc::new(Screen::new(kind, driver.clone())))
            .collect::<Vec<_>>();
        let mut registry = ScreenRegistry::new();
        for screen in &screens {
            registry.register(screen.name(), Arc::clone(screen));
        }
        info!(scenario = %id, screens = screens.len(), "scenario started");
        Self {
            id,
            driver,
            screens,
            registry,
            wait: PollOptions::default(),
        }
    }

    /// Start a driver through `factory`, then build the context
    pub fn start<F>(factory: &F, config: &HarnessConfig, catalog: &ScreenCatalog) -> DispatchResult<Self>
    where
        F: DriverFactory + ?Sized,
    {
        catalog.validate()?;
        let driver = factory.create(&config.driver)?;
        Ok(Self::build(driver, &config.driver, catalog).with_wait_options(config.wait))
    }

    /// Set the defaults for the polling wait verb
    #[must_use]
    pub fn with_wait_options(mut self, wait: PollOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Scenario id recorded on log events
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Shared driver handle
    #[must_use]
    pub const fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    /// Every catalog screen, in catalog order
    #[must_use]
    pub fn screens(&self) -> &[Arc<Screen>] {
        &self.screens
    }

    /// Screen by registered name
    pub fn screen(&self, name: &str) -> DispatchResult<Arc<Screen>> {
        self.registry.get(name)
    }

    /// Known screen of exactly this type
    #[must_use]
    pub fn screen_of(&self, kind: &ScreenType) -> Option<Arc<Screen>> {
        self.screens.iter().find(|screen| screen.kind().is(kind)).cloned()
    }

    /// Known screen of this type, or a fresh unregistered one
    #[must_use]
    pub fn get_or_create(&self, kind: &'static ScreenType) -> Arc<Screen> {
        self.screen_of(kind).unwrap_or_else(|| {
            info!(scenario = %self.id, screen = kind.name, "constructing unregistered screen");
            Arc::new(Screen::new(kind, self.driver.clone()))
        })
    }

    /// Registry of every catalog screen plus anything registered since
    #[must_use]
    pub const fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    /// Make `screen` reachable by `name` from dispatchers created afterwards.
    ///
    /// The screen must run on this scenario's driver.
    pub fn register(&mut self, name: impl Into<String>, screen: Arc<Screen>) -> DispatchResult<()> {
        let name = name.into();
        if !screen.driver().same_session(&self.driver) {
            return Err(DispatchError::InvalidCatalog {
                message: format!("screen '{name}' is bound to another scenario's driver"),
            });
        }
        info!(scenario = %self.id, screen = %name, kind = screen.name(), "registering screen");
        self.registry.register(name, screen);
        Ok(())
    }

    /// Verb dispatcher over this scenario's registered screens
    #[must_use]
    pub fn dispatcher(&self, resolver: Arc<ElementResolver>) -> ActionDispatcher {
        ActionDispatcher::new(self.registry.clone(), resolver).with_wait_options(self.wait)
    }

    /// Whether the driver has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.driver.is_released()
    }

    /// Release the driver. Later calls do nothing.
    pub fn cleanup(&self) -> DispatchResult<()> {
        if self.driver.release()? {
            info!(scenario = %self.id, "scenario driver released");
        }
        Ok(())
    }
}

impl Drop for ScenarioContext {
    fn drop(&mut self) {
        if self.driver.is_released() {
            return;
        }
        if let Err(err) = self.driver.release() {
            warn!(scenario = %self.id, error = %err, "failed to release driver on drop");
        }
    }
}
