//! Screen Definitions
//!
//! A screen type is a static declaration table: its name, an optional parent
//! type, the element locators it declares and the named behaviors it offers.
//! Declaration tables exist once per type; [`Screen`] is the live instance
//! bound to one scenario's driver.
//!
//! ```ignore
//! pub static LOGIN_PAGE: ScreenType = ScreenType {
//!     name: "LoginPage",
//!     parent: None,
//!     locators: &[
//!         LocatorDecl::new("USERNAME", Locator::id("user-name")),
//!         LocatorDecl::new("LOGIN_BUTTON", Locator::id("login-button")),
//!     ],
//!     behaviors: &[BehaviorDecl::new("navigate", open_login)],
//! };
//! ```
//!
//! ## Toyota Way Application
//!
//! - **Poka-Yoke**: Declarations are `static`, so a locator cannot change after
//!   the type is defined
//! - **Genchi Genbutsu**: Lookup walks the actual declared hierarchy, own
//!   declarations first

use crate::driver::DriverHandle;
use crate::locator::Locator;
use crate::result::DispatchResult;
use std::collections::HashSet;
use std::fmt;

/// A zero-argument screen behavior
pub type BehaviorFn = fn(&Screen) -> DispatchResult<()>;

/// One declared element: canonical field name plus locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorDecl {
    /// Canonical name (upper snake case, e.g. `LOGIN_BUTTON`)
    pub field: &'static str,
    /// How to find the element
    pub locator: Locator,
}

impl LocatorDecl {
    /// Declare a locator under a canonical field name
    #[must_use]
    pub const fn new(field: &'static str, locator: Locator) -> Self {
        Self { field, locator }
    }
}

/// One declared behavior
#[derive(Clone, Copy)]
pub struct BehaviorDecl {
    /// Behavior name as used by scenario steps
    pub name: &'static str,
    /// Routine to run
    pub run: BehaviorFn,
}

impl BehaviorDecl {
    /// Declare a named behavior
    #[must_use]
    pub const fn new(name: &'static str, run: BehaviorFn) -> Self {
        Self { name, run }
    }
}

impl fmt::Debug for BehaviorDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorDecl").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Static declaration table for one kind of screen
#[derive(Debug)]
pub struct ScreenType {
    /// Registered name (e.g. "LoginPage")
    pub name: &'static str,
    /// Ancestor type, searched after this one
    pub parent: Option<&'static ScreenType>,
    /// Own element declarations
    pub locators: &'static [LocatorDecl],
    /// Own behavior declarations
    pub behaviors: &'static [BehaviorDecl],
}

impl ScreenType {
    /// This type followed by each ancestor, nearest first
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static Self> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }

    /// Locator declared by this type itself, ignoring ancestors
    #[must_use]
    pub fn own_locator(&self, field: &str) -> Option<Locator> {
        self.locators
            .iter()
            .find(|decl| decl.field == field)
            .map(|decl| decl.locator)
    }

    /// First declaration of `field` in the lineage, with the declaring type
    #[must_use]
    pub fn find_locator(&'static self, field: &str) -> Option<(&'static Self, Locator)> {
        self.lineage()
            .find_map(|kind| kind.own_locator(field).map(|locator| (kind, locator)))
    }

    /// First declaration of behavior `name` in the lineage
    #[must_use]
    pub fn find_behavior(&'static self, name: &str) -> Option<&'static BehaviorDecl> {
        self.lineage()
            .find_map(|kind| kind.behaviors.iter().find(|b| b.name == name))
    }

    /// Field names declared more than once in this type's own table
    #[must_use]
    pub fn duplicate_fields(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for decl in self.locators {
            if !seen.insert(decl.field) && !duplicates.contains(&decl.field) {
                duplicates.push(decl.field);
            }
        }
        duplicates
    }

    /// Whether `self` and `other` are the same declaration
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// A live screen bound to a scenario's driver
#[derive(Debug, Clone)]
pub struct Screen {
    kind: &'static ScreenType,
    driver: DriverHandle,
}

impl Screen {
    /// Construct a screen of `kind` over `driver`
    #[must_use]
    pub const fn new(kind: &'static ScreenType, driver: DriverHandle) -> Self {
        Self { kind, driver }
    }

    /// Declaration table
    #[must_use]
    pub const fn kind(&self) -> &'static ScreenType {
        self.kind
    }

    /// Registered name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name
    }

    /// Driver this screen was built with
    #[must_use]
    pub const fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    /// Navigate the browser to `url`
    pub fn navigate_to(&self, url: &str) -> DispatchResult<()> {
        self.driver.navigate(url)
    }

    /// Current browser URL
    pub fn current_url(&self) -> DispatchResult<String> {
        self.driver.current_url()
    }

    /// Current page title
    pub fn title(&self) -> DispatchResult<String> {
        self.driver.title()
    }

    /// Markup of the current page
    pub fn page_source(&self) -> DispatchResult<String> {
        self.driver.page_source()
    }
}
