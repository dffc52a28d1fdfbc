use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a formatting subscriber filtered by `RUST_LOG`, e.g.
/// `RUST_LOG=plotscript=debug`. Does nothing when `RUST_LOG` is unset, and
/// only the first call has any effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
