//! Mock collaborator implementations for testing.
//!
//! This module provides simple, in-memory implementations of all
//! collaborator traits for use in unit and integration tests. Every mock
//! is a cheap clone sharing interior state, so a test can keep a handle
//! for assertions while the guard owns another.

pub mod fetch;
pub mod navigator;
pub mod notifier;
pub mod token_store;

pub use fetch::MockFetchHub;
pub use navigator::MockNavigator;
pub use notifier::MockNotifier;
pub use token_store::MockTokenStore;
