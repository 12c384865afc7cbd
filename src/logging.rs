/// Tracing subscriber setup for the CLI
///
/// The subscriber is installed before the configuration is read so config
/// loading can log. The filter starts at `DEFAULT_FILTER` and is swapped for
/// the configured level once the config is known.
use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Filter used until a configuration has been loaded
pub const DEFAULT_FILTER: &str = "exercise_segment_sync=info,warn";

/// Filter for `--verbose`: debug for this crate only, dependencies stay at info
pub const VERBOSE_FILTER: &str = "exercise_segment_sync=debug,info";

/// Pick the filter directive for the current run
pub fn filter_directive(verbose: bool, logging: Option<&LoggingConfig>) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    logging.map_or_else(|| DEFAULT_FILTER.to_string(), |l| l.log_level.clone())
}

/// Handle for swapping the installed filter
pub struct LogHandle {
    verbose: bool,
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Apply the configured log level; `--verbose` keeps precedence
    pub fn apply(&self, logging: &LoggingConfig) -> Result<()> {
        let directive = filter_directive(self.verbose, Some(logging));
        self.filter.reload(EnvFilter::try_new(&directive)?)?;
        tracing::debug!("🔧 Log filter set to {}", directive);
        Ok(())
    }
}

/// Install the global subscriber
pub fn init(verbose: bool) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(EnvFilter::try_new(filter_directive(verbose, None))?);
    tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init()?;
    Ok(LogHandle { verbose, filter: handle })
}
