pub mod build_info;

use std::sync::OnceLock;

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

const DEFAULT_DIRECTIVE: &str = "wizard_core=info";

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber on first call. Later calls carrying `extra` swap the
/// filter in place, so a settings directive still applies after a plain [`crate::init`].
pub fn init_tracing(extra: Option<&str>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), extra);

    if let Some(handle) = FILTER_HANDLE.get() {
        if extra.is_some() {
            if let Err(err) = handle.reload(filter) {
                tracing::warn!(error = %err, "failed to apply log filter");
            }
        }
        return;
    }

    let (layer, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    // Another subscriber may already be installed (tests, embedding apps).
    if installed.is_ok() && FILTER_HANDLE.set(handle).is_ok() {
        tracing::debug!("Wizard Core tracing initialized.");
    }
}

/// A non-empty, parseable `RUST_LOG` is used as is. Otherwise the default directive
/// applies, with `extra` layered on top when it parses.
fn build_filter(env: Option<&str>, extra: Option<&str>) -> EnvFilter {
    if let Some(filter) = env
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
    {
        return filter;
    }

    let filter = EnvFilter::new(DEFAULT_DIRECTIVE);
    match extra.and_then(|raw| raw.parse().ok()) {
        Some(directive) => filter.add_directive(directive),
        None => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{filter::LevelFilter, Layer};

    fn max_level(filter: &EnvFilter) -> Option<LevelFilter> {
        <EnvFilter as Layer<Registry>>::max_level_hint(filter)
    }

    #[test]
    fn default_filter_is_info() {
        assert_eq!(max_level(&build_filter(None, None)), Some(LevelFilter::INFO));
        assert_eq!(max_level(&build_filter(Some("  "), None)), Some(LevelFilter::INFO));
    }

    #[test]
    fn rust_log_is_not_overridden_by_the_default() {
        let filter = build_filter(Some("wizard_core=debug"), None);
        assert_eq!(max_level(&filter), Some(LevelFilter::DEBUG));

        let filter = build_filter(Some("warn"), Some("wizard_core=trace"));
        assert_eq!(max_level(&filter), Some(LevelFilter::WARN));
    }

    #[test]
    fn settings_directive_applies_without_rust_log() {
        let filter = build_filter(None, Some("wizard_core::wizard=trace"));
        assert_eq!(max_level(&filter), Some(LevelFilter::TRACE));

        let filter = build_filter(Some("wizard_core=loud"), Some("wizard_core=chatty"));
        assert_eq!(max_level(&filter), Some(LevelFilter::INFO));
    }
}
