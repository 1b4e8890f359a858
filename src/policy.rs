//! Verification policy consumed by the verifier.
//!
//! The policy carries the configuration surface of the core: which identity
//! field names the peer, whether extension-based lookup is allowed, and the
//! depth limits applied on top of the library's standard chain validation.
//!
//! # Examples
//!
//! ```rust
//! use tunnel_verify::{RenegotiationGrowth, VerifyPolicy};
//!
//! // Username from the subject common name, chains at most 4 deep.
//! let policy = VerifyPolicy::new("CN").with_max_depth(4);
//!
//! // Username from the subjectAltName email entry.
//! let policy = VerifyPolicy::new("ext:subjectAltName")
//!     .with_extension_lookup(true)
//!     .with_renegotiation_growth(RenegotiationGrowth::Extend);
//! ```

/// How to treat a renegotiated chain deeper than the locked baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenegotiationGrowth {
    /// Reject the pass. The lock covers the whole chain; a chain that grows
    /// mid-session is not accepted without explicit opt-in.
    #[default]
    Reject,
    /// Append the new depth to the baseline. Locked depths are still never
    /// replaced.
    Extend,
}

/// Default capacity of the internal username buffer, terminator included.
pub const DEFAULT_USERNAME_CAPACITY: usize = 64;

/// Policy checks layered on top of standard chain validation.
#[derive(Debug, Clone)]
pub struct VerifyPolicy {
    username_field: String,
    extension_lookup: bool,
    max_depth: Option<usize>,
    renegotiation_growth: RenegotiationGrowth,
    username_capacity: usize,
}

impl VerifyPolicy {
    /// Creates a policy extracting `username_field` from the leaf subject DN.
    ///
    /// A field name carrying the `ext:` prefix selects X.509-extension
    /// lookup instead, which additionally requires
    /// [`with_extension_lookup`](Self::with_extension_lookup).
    pub fn new(username_field: impl Into<String>) -> Self {
        Self {
            username_field: username_field.into(),
            extension_lookup: false,
            max_depth: None,
            renegotiation_growth: RenegotiationGrowth::default(),
            username_capacity: DEFAULT_USERNAME_CAPACITY,
        }
    }

    /// Enables or disables extension-based username lookup.
    ///
    /// An `ext:`-prefixed field while this is disabled fails verification
    /// explicitly; it never falls back to a subject lookup.
    #[must_use]
    pub fn with_extension_lookup(mut self, enabled: bool) -> Self {
        self.extension_lookup = enabled;
        self
    }

    /// Rejects certificates deeper than `max` (depth 0 = leaf).
    #[must_use]
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = Some(max);
        self
    }

    /// Sets the renegotiation growth policy (default:
    /// [`RenegotiationGrowth::Reject`]).
    #[must_use]
    pub fn with_renegotiation_growth(mut self, growth: RenegotiationGrowth) -> Self {
        self.renegotiation_growth = growth;
        self
    }

    /// Sets the internal username buffer capacity in bytes, terminator
    /// included. Longer values are truncated, never rejected.
    #[must_use]
    pub fn with_username_capacity(mut self, capacity: usize) -> Self {
        self.username_capacity = capacity;
        self
    }

    /// Configured username field name.
    pub fn username_field(&self) -> &str {
        &self.username_field
    }

    /// Whether extension-based username lookup is enabled.
    pub fn extension_lookup(&self) -> bool {
        self.extension_lookup
    }

    /// Configured maximum chain depth, if any.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Configured renegotiation growth policy.
    pub fn renegotiation_growth(&self) -> RenegotiationGrowth {
        self.renegotiation_growth
    }

    /// Username buffer capacity in bytes, terminator included.
    pub fn username_capacity(&self) -> usize {
        self.username_capacity
    }
}

impl Default for VerifyPolicy {
    /// Common-name username, no extension lookup, no depth limit.
    fn default() -> Self {
        Self::new("CN")
    }
}
