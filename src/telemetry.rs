//! Optional log output for hosts of the timeline controller.
//!
//! Controller events are emitted under the `timeline_rs::api` and
//! `timeline_rs::runtime` targets: fetch issue, apply and discard, clock
//! failures and driver lifecycle.

/// Installs a compact fmt subscriber filtered by `RUST_LOG`, falling back to
/// `timeline_rs=info`.
///
/// Returns `false` without the `telemetry` feature or when a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timeline_rs=info"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::init_default_tracing;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
