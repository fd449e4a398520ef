//! Session guard demo binary
//!
//! Wires the guard into in-memory collaborators and walks through the
//! flows a real portal shell would see: anonymous browsing, a burst of
//! redirects, concurrent validations sharing one probe call, an expiry
//! storm, and noisy duplicate errors.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use portal_guard::mocks::{MockFetchHub, MockNavigator, MockNotifier, MockTokenStore};
use portal_guard::{
    FetchFailure, GuardConfig, GuardEnvironment, RouteTable, SessionGuard, SessionStatus,
    TokenStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_demo=debug,portal_guard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Portal Session Guard Demo ===\n");

    let routes = RouteTable::builder()
        .public("/")
        .public("/pricing")
        .entry("/login")
        .build()?;

    let config = GuardConfig::new()
        .with_debounce_window(Duration::from_millis(50))
        .with_expiry_reset_window(Duration::from_millis(400))
        .with_noise_window(Duration::from_millis(300));

    let store = MockTokenStore::new();
    let navigator = MockNavigator::new();
    let notifier = MockNotifier::new();
    let env = GuardEnvironment::new(store.clone(), navigator.clone(), notifier.clone());

    let guard = SessionGuard::mount(config, routes, env);

    // Scripted identity service: counts calls, always says "logged in".
    let probe_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&probe_calls);
    guard.register_probe(move || {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(80)).await;
            Ok(SessionStatus { logged_in: true })
        }
    });

    let hub = MockFetchHub::new();
    guard.install_interceptor(&hub);

    // Anonymous visitor browses a public page, then tries a protected one.
    println!(">>> Anonymous visitor opens /pricing");
    navigator.set_current_path("/pricing");
    guard.route_changed();
    tokio::time::sleep(Duration::from_millis(120)).await;
    println!("    navigations so far: {:?}", navigator.navigations());

    println!("\n>>> Anonymous visitor opens /billing");
    navigator.set_current_path("/billing");
    guard.route_changed();
    tokio::time::sleep(Duration::from_millis(120)).await;
    println!("    navigations so far: {:?}", navigator.navigations());
    println!("    probe calls: {} (none needed without a token)", probe_calls.load(Ordering::SeqCst));

    // The visitor signs in; a redirect burst lands them on /billing.
    println!("\n>>> Visitor signs in, redirect burst settles on /billing");
    store.set_token("tok_demo");
    for path in ["/dashboard", "/dashboard/setup", "/billing"] {
        navigator.set_current_path(path);
        guard.route_changed();
    }
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!("    probe calls: {} (burst collapsed to one)", probe_calls.load(Ordering::SeqCst));

    // Three widgets validate concurrently; the flight is shared.
    println!("\n>>> Three widgets validate the session at once");
    let before = probe_calls.load(Ordering::SeqCst);
    let mut handles = Vec::new();
    for _ in 0..3 {
        let validator = guard.validator().clone();
        handles.push(tokio::spawn(async move { validator.validate().await }));
    }
    for handle in handles {
        let verdict = handle.await??;
        println!("    verdict: {verdict:?}");
    }
    println!(
        "    probe calls for all three: {}",
        probe_calls.load(Ordering::SeqCst) - before
    );

    // Every background request fails at once when the session dies.
    println!("\n>>> Session expires server-side, five fetches fail together");
    for _ in 0..5 {
        hub.fire(&FetchFailure::Status {
            status: 401,
            message: "unauthorized".to_string(),
        });
    }
    println!("    notices shown: {:?}", notifier.notices());
    println!("    navigations: {:?}", navigator.navigations());
    println!("    token now: {:?}", store.token());

    // Repeated server errors collapse into one toast per window.
    println!("\n>>> The billing widget fails the same way three times");
    for _ in 0..3 {
        hub.fire(&FetchFailure::Status {
            status: 500,
            message: "billing sync failed".to_string(),
        });
    }
    println!("    total notices shown: {}", notifier.notices().len());

    guard.detach();

    println!("\n=== Demo Complete ===");
    println!("\nWhat just happened:");
    println!("  • Public routes never touched the network");
    println!("  • An anonymous visitor was bounced off /billing without a probe call");
    println!("  • A redirect burst produced one evaluation, not three");
    println!("  • Three concurrent validations shared one probe call");
    println!("  • Five simultaneous 401s became one sign-out and one toast");
    println!("  • Three identical 500s became one toast");

    Ok(())
}
