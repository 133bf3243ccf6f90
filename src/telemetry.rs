//! `tracing` subscriber installation for hosts embedding the manager.

use crate::config::LogFilter;
use tracing_subscriber::EnvFilter;

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to `fallback`.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one is kept.
#[must_use]
pub fn init_tracing(fallback: &LogFilter) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_keeps_existing_subscriber() {
        let filter = LogFilter("container_manager=debug".to_owned());
        let _first = init_tracing(&filter);

        assert!(!init_tracing(&filter));
    }
}
