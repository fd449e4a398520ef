//! # Portal Guard
//!
//! Client-side session guard for the account portal: decides on every
//! navigation whether the visitor holds a valid session, collapses
//! concurrent validation into a single remote call, reacts to
//! server-signaled expiry from background requests, and keeps repeated
//! error toasts quiet.
//!
//! ## Components
//!
//! - [`SessionValidator`]: single-flight remote validation. Overlapping
//!   callers share one probe call and one verdict; any invalid outcome
//!   clears the stored token.
//! - [`NavigationGuard`]: debounces route changes, classifies the settled
//!   path through the [`RouteTable`], and issues at most one corrective
//!   replace-navigation.
//! - [`ExpiryInterceptor`]: global fetch-error hook. A burst of
//!   authorization failures becomes exactly one sign-out; other errors
//!   are deduplicated before they reach the visitor.
//!
//! ## Architecture
//!
//! The guard owns no UI and no transport. It talks to the host through
//! the traits in [`providers`] (token store, navigator, notifier, fetch
//! hub) and is wired once at the application root:
//!
//! ```text
//! Router events ──▶ NavigationGuard ──▶ SessionValidator ──▶ probe
//! Fetch failures ─▶ ExpiryInterceptor ─▶ token clear + notice + redirect
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use portal_guard::{GuardConfig, GuardEnvironment, RouteTable, SessionGuard};
//! use portal_guard::providers::HttpSessionProbe;
//!
//! let routes = RouteTable::builder()
//!     .public("/")
//!     .public("/pricing")
//!     .entry("/login")
//!     .build()?;
//!
//! let env = GuardEnvironment::new(token_store, router, toaster);
//! let tokens = env.token_store.clone();
//! let guard = SessionGuard::mount(GuardConfig::new(), routes, env);
//!
//! let probe = HttpSessionProbe::new("https://api.example.com".into());
//! guard.register_probe(move || {
//!     let probe = probe.clone();
//!     let token = tokens.token().unwrap_or_default();
//!     async move { probe.check_session(&token).await }
//! });
//! guard.install_interceptor(&fetch_hub);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod error;
pub mod interceptor;
pub mod mount;
pub mod navigation;
pub mod noise;
pub mod providers;
pub mod retry;
pub mod routes;
pub mod validator;

// Mock collaborators for testing
#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::GuardConfig;
pub use error::{FetchFailure, GuardError, Result};
pub use interceptor::{ExpiryInterceptor, InterceptorMetrics};
pub use mount::{GuardEnvironment, SessionGuard};
pub use navigation::NavigationGuard;
pub use noise::NoiseFilter;
pub use providers::{
    FetchErrorHook, FetchErrorHub, NavigationMode, Navigator, NoticeLevel, Notifier,
    SessionStatus, TokenStore,
};
pub use routes::{RouteAccess, RouteTable};
pub use validator::{SessionValidator, SessionVerdict, ValidatorMetrics};
