//! Screen Registry
//!
//! Per-scenario map from screen name to the live [`Screen`] built for it.
//! The registry never creates screens; a miss is an error that lists what is
//! registered.

use crate::result::{DispatchError, DispatchResult};
use crate::screen::Screen;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of live screens by name
#[derive(Debug, Clone, Default)]
pub struct ScreenRegistry {
    screens: HashMap<String, Arc<Screen>>,
}

impl ScreenRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen, replacing any previous entry under `name`
    pub fn register(&mut self, name: impl Into<String>, screen: Arc<Screen>) {
        let name = name.into();
        tracing::debug!(screen = %name, kind = screen.name(), "registering screen");
        let _ = self.screens.insert(name, screen);
    }

    /// Look up a screen by name
    pub fn get(&self, name: &str) -> DispatchResult<Arc<Screen>> {
        self.screens
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownScreen {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Check if a screen is registered
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.screens.contains_key(name)
    }

    /// Snapshot of every entry
    #[must_use]
    pub fn all(&self) -> HashMap<String, Arc<Screen>> {
        self.screens.clone()
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.screens.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.screens.clear();
    }

    /// Number of registered screens
    #[must_use]
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}
