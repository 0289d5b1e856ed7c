use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Logs this crate only to stdout, at `Debug` when verbose
pub fn setup_simple_logger(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("whatsapp_cloud")
        .add_filter_allow_str("wa_cloud")
        .build();

    Ok(SimpleLogger::init(level, logger_config)?)
}
