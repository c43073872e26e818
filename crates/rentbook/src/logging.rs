//! Logging setup for rentbook.
//!
//! Library code logs through `tracing` macros; the binary installs a
//! `tracing-subscriber` formatter writing to stderr so command output on
//! stdout stays clean for piping.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log target of everything this crate emits.
const LOG_TARGET: &str = "rentbook";

/// How much the binary reports on stderr, from `-q` up to `-vvv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings, such as dangling apartment references.
    #[default]
    Normal,
    /// Progress notes, such as the opened database.
    Verbose,
    /// Every record write.
    Debug,
    /// Raw key reads and writes.
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive enabling this crate's logs at this verbosity.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = self.to_level_filter().to_string().to_ascii_lowercase();
        format!("{LOG_TARGET}={level}")
    }
}

/// Picks the filter directives: a non-empty `RUST_LOG` value wins over the
/// verbosity flags.
fn directives(verbosity: Verbosity, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(env) if !env.is_empty() => env.to_string(),
        _ => verbosity.directive(),
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` overrides `verbosity`; an unparsable
/// `RUST_LOG` falls back to the verbosity default. A second call is a no-op.
///
/// # Examples
///
/// ```no_run
/// use rentbook::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = EnvFilter::try_new(directives(verbosity, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbosity >= Verbosity::Debug)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}
