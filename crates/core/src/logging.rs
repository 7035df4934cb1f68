//! Process-wide logging setup and the isolation filter.
//!
//! The HTTP stacks underneath the bridge clients are extremely verbose.
//! While an [`IsolationGuard`] is live, records whose target does not
//! belong to the harness are dropped before they reach any handler;
//! releasing the guard restores the previous behavior exactly. Guards
//! nest: suppression stays active until the last live guard is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{Level, Metadata};
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Targets beginning with this prefix count as operator-authored. All
/// workspace crates are named `scaffold_*`, so their events pass the
/// filter; `hyper`, `reqwest` and friends do not.
const ROOT_TARGET_PREFIX: &str = "scaffold";

static SUPPRESS_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Scoped activation of the isolation filter.
///
/// Dropping the guard releases exactly its own activation, independent of
/// how many other guards are live.
#[must_use = "suppression ends as soon as the guard is dropped"]
pub struct IsolationGuard(());

/// Activate the isolation filter for the lifetime of the returned guard.
pub fn isolate() -> IsolationGuard {
    SUPPRESS_DEPTH.fetch_add(1, Ordering::SeqCst);
    IsolationGuard(())
}

impl Drop for IsolationGuard {
    fn drop(&mut self) {
        SUPPRESS_DEPTH.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Whether any isolation guard is currently live.
pub fn isolation_active() -> bool {
    SUPPRESS_DEPTH.load(Ordering::SeqCst) > 0
}

/// Filter predicate applied to every record on its way to a handler.
///
/// Exposed so test subscribers can attach the same predicate the
/// process-wide subscriber uses.
pub fn record_allowed(metadata: &Metadata<'_>) -> bool {
    !isolation_active() || metadata.target().starts_with(ROOT_TARGET_PREFIX)
}

/// Install the process-wide subscriber at the requested level.
///
/// Records go to stderr; stdout is reserved for run results. Calling this
/// again after a subscriber is installed is a no-op, so repeated runs in
/// one process (test harnesses) are safe.
pub fn init(level: Level) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::from_level(level))
        .with_filter(filter_fn(|metadata| record_allowed(metadata)));

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
