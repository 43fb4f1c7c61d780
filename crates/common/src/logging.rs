//! Logging and tracing initialization.
//!
//! Logs go to stderr so that commands printing JSON (`render --dry-run`)
//! keep a clean stdout.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Workspace crates that a bare level applies to.
const INSTAVID_TARGETS: [&str; 5] = [
    "instavid_common",
    "instavid_project_model",
    "instavid_audio",
    "instavid_render_engine",
    "instavid_editor",
];

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Expand a configured level into a filter directive.
///
/// A bare level such as `debug` is applied to the InstaVid crates and the
/// binary, with every other target held at `warn`. Anything else (`RUST_LOG`
/// style directives) is passed through untouched.
pub fn filter_directive(level: &str) -> String {
    let level = level.trim();
    let bare = level.to_ascii_lowercase();
    if !LEVELS.contains(&bare.as_str()) {
        return level.to_string();
    }
    let mut directive = String::from("warn");
    for target in INSTAVID_TARGETS.iter().chain(["instavid"].iter()) {
        directive.push(',');
        directive.push_str(target);
        directive.push('=');
        directive.push_str(&bare);
    }
    directive
}

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.level)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        let subscriber = builder
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };
    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
