use tracing_subscriber::EnvFilter;

/// HTTP plumbing under the store and hub clients logs per-request detail at
/// INFO; keep them at WARN unless RUST_LOG says otherwise.
const NOISY_SUBSYSTEMS: &[&str] = &["hyper", "reqwest"];

/// Initialize process-wide logging
///
/// INFO default with the noisy subsystems raised to WARN, timestamp + level
/// + message on stderr. `RUST_LOG` overrides the built-in directives.
/// Idempotent: calling again after a subscriber is installed is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let already_set = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err();

    if already_set {
        // Already-installed subscriber keeps its configuration
        tracing::debug!("logging already initialized, keeping existing setup");
    }
}

fn default_filter() -> EnvFilter {
    let mut directives = vec!["info".to_owned()];
    directives.extend(NOISY_SUBSYSTEMS.iter().map(|name| format!("{name}=warn")));
    EnvFilter::new(directives.join(","))
}
