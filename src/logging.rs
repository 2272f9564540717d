use tracing_subscriber::EnvFilter;

/// Stderr subscriber filtered by `RUST_LOG`, `info` when unset.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
