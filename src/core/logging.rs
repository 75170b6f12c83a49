//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=gridpaint=debug`
/// to see tool switches and brush gestures.
///
/// # Example
/// ```no_run
/// gridpaint::core::logging::init();
/// log::info!("Editor opened");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}
