//! Result and error types for Pagestep.

use thiserror::Error;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type reported by [`AutomationDriver`](crate::AutomationDriver) implementations
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by an automation driver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// No live element matches the selector right now
    #[error("no element matches {selector}")]
    NotFound {
        /// Selector that was queried
        selector: String,
    },

    /// A bounded driver wait expired
    #[error("timed out after {ms}ms waiting for {selector}")]
    Timeout {
        /// Selector that was awaited
        selector: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Browser could not be started
    #[error("failed to launch browser: {message}")]
    Launch {
        /// Error message
        message: String,
    },

    /// Any other command failure
    #[error("driver command '{command}' failed: {message}")]
    Command {
        /// Command name
        command: String,
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Whether the failure means "the element is not there at this moment"
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Timeout { .. })
    }

    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    pub(crate) fn command(command: &str, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while dispatching a verb
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Element name is not declared anywhere in the screen's type hierarchy
    #[error("no locator '{element}' (field {field}) declared on {screen} or its ancestors")]
    Resolution {
        /// Name as written by the scenario author
        element: String,
        /// Normalized declaration name that was searched
        field: String,
        /// Concrete screen type that was searched
        screen: String,
    },

    /// Screen name was never registered
    #[error("screen '{name}' is not registered; known screens: [{}]", .known.join(", "))]
    UnknownScreen {
        /// Requested screen name
        name: String,
        /// Currently registered names, sorted
        known: Vec<String>,
    },

    /// Locator resolved but the live element is absent
    #[error("element '{element}' on {screen} is not present: {source}")]
    ElementNotFound {
        /// Element name
        element: String,
        /// Screen name
        screen: String,
        /// Underlying driver failure
        #[source]
        source: DriverError,
    },

    /// A verification verb's expectation did not hold
    #[error("{check} failed for '{element}' on {screen}: expected {expected:?}, actual {actual:?}")]
    Assertion {
        /// Which verification ran (e.g. "text equals")
        check: String,
        /// Element name
        element: String,
        /// Screen name
        screen: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Named behavior is absent from the screen's type hierarchy
    #[error("screen type {screen} has no behavior '{behavior}'")]
    BehaviorNotFound {
        /// Screen type name
        screen: String,
        /// Requested behavior
        behavior: String,
    },

    /// Polling wait exhausted its attempts
    #[error("element '{element}' on {screen} not displayed after {attempts} polls ({interval_ms}ms apart)")]
    Timeout {
        /// Element name
        element: String,
        /// Screen name
        screen: String,
        /// Polls performed
        attempts: u32,
        /// Interval between polls
        interval_ms: u64,
    },

    /// Driver handle was used after scenario cleanup
    #[error("driver session already released")]
    SessionReleased,

    /// Screen catalog violates a declaration invariant
    #[error("invalid screen catalog: {message}")]
    InvalidCatalog {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Driver failure not covered above
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Whether this is an assertion failure (a test verdict, not a harness fault)
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }
}
