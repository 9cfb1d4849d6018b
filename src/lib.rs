#![doc(test(attr(deny(warnings))))]

//! Wizard Core is a generic multi-step form engine: ordered steps, conditional
//! visibility, per-step validation, derived values, drafts and guarded submission,
//! plus ready-made flows and a terminal front-end.

pub mod cli;
pub mod config;
pub mod errors;
pub mod flows;
pub mod utils;
pub mod wizard;

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Same as [`init`] with an additional `EnvFilter` directive. Safe to call after
/// [`init`]; the directive replaces the installed filter unless `RUST_LOG` is set.
pub fn init_with_filter(extra: Option<&str>) {
    utils::init_tracing(extra);
}
