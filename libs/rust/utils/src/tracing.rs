use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives that silence the HTTP and RPC transport crates, which log every
/// request at debug level and drown out the service's own events.
const QUIET_TARGETS: &[&str] = &[
    "hyper_util=off",
    "alloy_rpc_client=off",
    "alloy_transport_http=off",
    "reqwest=off",
];

pub fn env_filter() -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    for directive in QUIET_TARGETS {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Installs JSON logging to stdout. Safe to call more than once; later calls
/// are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .try_init();
}
