use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Environment variable overriding the configured log level
pub const LOG_LEVEL_ENV: &str = "PHASH_LOG";

static LOGGER: OnceCell<log4rs::Handle> = OnceCell::new();

/// Initialize the logger with timestamp, log level, and module path.
///
/// Logs are written to `<log_dir>/phash.log`, rotated at 10MB with five
/// archives kept. Calling this more than once is a no-op after the first
/// successful call.
pub fn init_logger<P: AsRef<Path>>(
    log_dir: P,
    level: LevelFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("phash.log");
    let archived_logs_pattern = format!("{}/phash.{{}}.log", log_dir.display());

    let file_trigger = SizeTrigger::new(10 * 1024 * 1024); // 10MB

    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| format!("Failed to create log roller: {}", e))?;

    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{T}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| format!("Failed to create log appender: {}", e))?;

    let level = resolve_level(level, std::env::var(LOG_LEVEL_ENV).ok().as_deref());

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(level))
        .map_err(|e| format!("Failed to build log config: {}", e))?;

    let handle =
        log4rs::init_config(config).map_err(|e| format!("Failed to initialize log4rs: {}", e))?;
    let _ = LOGGER.set(handle);

    info!("Logging to file: {}", log_file_path.display());
    Ok(())
}

/// Level named by the environment override, or `configured` when the
/// variable is unset or not a level name
fn resolve_level(configured: LevelFilter, env_value: Option<&str>) -> LevelFilter {
    env_value
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(configured)
}

/// Log hash computation error
pub fn log_hash_error(path: &Path, error: &dyn std::error::Error) {
    error!(
        "Hash computation failed - Path: {}, Error: {}",
        path.display(),
        error
    );
}
