use std::path::PathBuf;
use std::sync::Once;

pub mod prelude {
    pub use crate::{Builder, LogLevel};
    pub use googletest::{assert_that, matchers::*};
    pub use similar_asserts::assert_eq as sim_assert_eq;
}

/// Returns the workspace root directory via the `CARGO_WORKSPACE_DIR` env var
/// set in `.cargo/config.toml`.
///
/// # Panics
///
/// Panics if `CARGO_WORKSPACE_DIR` is not set.
#[must_use]
pub fn workspace_root() -> PathBuf {
    PathBuf::from(
        std::env::var("CARGO_WORKSPACE_DIR")
            .expect("CARGO_WORKSPACE_DIR must be set in .cargo/config.toml"),
    )
}

/// Returns the path to the workspace `testdata/` directory.
#[must_use]
pub fn workspace_testdata() -> PathBuf {
    workspace_root().join("testdata")
}

/// Reads a file relative to the workspace `testdata/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn read_testdata(relative_path: &str) -> String {
    let path = workspace_testdata().join(relative_path);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub type LogLevel = tracing::metadata::Level;

static INIT_EYRE: Once = Once::new();
static INIT_TRACING: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    env_filter: Option<String>,
    log_level: LogLevel,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            env_filter: None,
            log_level: LogLevel::DEBUG,
        }
    }
}

impl Builder {
    /// Initialize test.
    ///
    /// This ensures `color_eyre` and the tracing subscriber are set up once per
    /// test binary. `RUST_LOG` takes precedence over the configured filter.
    ///
    /// # Panics
    ///
    /// Panics if `color_eyre` installation fails.
    pub fn build(self) {
        INIT_EYRE.call_once(|| {
            color_eyre::install().expect("failed to install eyre");
        });
        INIT_TRACING.call_once(|| self.setup_tracing());
    }

    fn setup_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let default_directive = self
            .env_filter
            .clone()
            .unwrap_or_else(|| self.log_level.to_string().to_ascii_lowercase());
        let env_filter = match std::env::var("RUST_LOG") {
            Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
                eprintln!("invalid log filter: {err}");
                eprintln!("falling back to default logging");
                EnvFilter::new(&default_directive)
            }),
            Err(_) => EnvFilter::new(&default_directive),
        };

        // another harness may already have installed a subscriber
        let _ = tracing_subscriber::fmt()
            .compact()
            .without_time()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    }

    /// Toggle log level for tracing inside the test.
    #[must_use]
    pub fn with_log_level(mut self, log_level: impl Into<LogLevel>) -> Self {
        self.log_level = log_level.into();
        self
    }

    /// Configure the tracing subscribers env filter, overriding the log level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}
