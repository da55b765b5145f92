use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Installs a stderr subscriber once per process. `RUST_LOG` overrides the
/// default `info` filter. Does nothing if another subscriber is already set.
pub fn init_tracing() {
    init_tracing_with("info");
}

pub fn init_tracing_with(default_filter: &str) {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
