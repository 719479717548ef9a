use crate::sync::util::env_flag;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays reserved for command reports.
pub fn init() {
    let filter =
        EnvFilter::try_from_env("SAVE_SYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let result = if env_flag("SAVE_SYNC_LOG_JSON", false) {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(err) = result {
        eprintln!("save-sync: logging already initialized: {err}");
    }
}
