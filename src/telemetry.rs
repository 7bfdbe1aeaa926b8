//! Telemetry helpers for applications embedding `digitizer-rs`.
//!
//! Tracing setup stays explicit and opt-in: hosts either call
//! [`init_default_tracing`] once at startup or install their own subscriber
//! and filters before touching the engine.

/// Installs a compact stderr `tracing` subscriber when the `telemetry`
/// feature is enabled, honoring `RUST_LOG` when set.
///
/// Returns `true` when initialization succeeds, `false` when the feature is
/// disabled or another subscriber was already installed by the host.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("digitizer_rs=info"));

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
