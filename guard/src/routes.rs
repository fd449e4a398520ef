//! Route classification.
//!
//! The portal declares which paths are reachable without a session and
//! which belong to the login flow. Everything else is protected, so a
//! newly added page can never be accidentally public.

use std::collections::HashSet;

use crate::error::{GuardError, Result};

/// Access class of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Reachable without a session.
    Public,

    /// Part of the login flow. Entry paths are public too, but an
    /// already-authenticated visitor gets bounced off them.
    Entry,

    /// Requires a valid session.
    Protected,
}

impl RouteAccess {
    /// Returns `true` if this path can only be viewed with a valid session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(self, Self::Protected)
    }

    /// Returns `true` if this path belongs to the login flow.
    #[must_use]
    pub const fn is_entry(&self) -> bool {
        matches!(self, Self::Entry)
    }
}

/// Static route table built once at application start.
///
/// Classification is by exact match on the normalized path: query string,
/// fragment, and trailing slashes are ignored. Unlisted paths classify as
/// [`RouteAccess::Protected`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: HashSet<String>,
    entry: HashSet<String>,
}

impl RouteTable {
    /// Create a new route table builder.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder {
            public: Vec::new(),
            entry: Vec::new(),
        }
    }

    /// Classify `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_guard::{RouteAccess, RouteTable};
    /// # fn main() -> portal_guard::Result<()> {
    /// let routes = RouteTable::builder()
    ///     .public("/pricing")
    ///     .entry("/login")
    ///     .build()?;
    ///
    /// assert_eq!(routes.classify("/pricing?ref=footer"), RouteAccess::Public);
    /// assert_eq!(routes.classify("/login/"), RouteAccess::Entry);
    /// assert_eq!(routes.classify("/billing"), RouteAccess::Protected);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteAccess {
        let normalized = normalize(path);

        if self.entry.contains(normalized) {
            RouteAccess::Entry
        } else if self.public.contains(normalized) {
            RouteAccess::Public
        } else {
            RouteAccess::Protected
        }
    }
}

/// Builder for [`RouteTable`].
#[derive(Debug, Clone, Default)]
pub struct RouteTableBuilder {
    public: Vec<String>,
    entry: Vec<String>,
}

impl RouteTableBuilder {
    /// Declare a path reachable without a session.
    #[must_use]
    pub fn public(mut self, path: impl Into<String>) -> Self {
        self.public.push(path.into());
        self
    }

    /// Declare a login-flow path. Entry paths are implicitly public.
    #[must_use]
    pub fn entry(mut self, path: impl Into<String>) -> Self {
        self.entry.push(path.into());
        self
    }

    /// Build the [`RouteTable`].
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRoutePattern`] if any declared path is
    /// empty or does not start with `/`.
    pub fn build(self) -> Result<RouteTable> {
        let mut public = HashSet::new();
        let mut entry = HashSet::new();

        for pattern in &self.public {
            public.insert(validated(pattern)?);
        }

        for pattern in &self.entry {
            let normalized = validated(pattern)?;
            public.insert(normalized.clone());
            entry.insert(normalized);
        }

        Ok(RouteTable { public, entry })
    }
}

/// Validate a declared pattern and return its normalized form.
fn validated(pattern: &str) -> Result<String> {
    if pattern.is_empty() || !pattern.starts_with('/') {
        return Err(GuardError::InvalidRoutePattern {
            pattern: pattern.to_string(),
        });
    }

    Ok(normalize(pattern).to_string())
}

/// Strip query string, fragment, and trailing slashes.
///
/// The root path stays `/` rather than collapsing to an empty string.
fn normalize(path: &str) -> &str {
    let path = path.find(['?', '#']).map_or(path, |cut| &path[..cut]);
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() { "/" } else { trimmed }
}
