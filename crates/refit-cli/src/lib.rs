#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! Library half of the `refit` binary: reading sources and rule files,
//! running rules over a unit, and rendering what they report.

pub mod check;
pub mod render;

pub use check::{check_source, load_rules, read_source, CheckReport, MAX_SOURCE_SIZE};

/// Installs a formatting subscriber filtered by `RUST_LOG`, or by
/// `refit=warn` when it is unset.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("refit=warn"));
    // A subscriber installed earlier (tests) wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
