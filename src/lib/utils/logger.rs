use color_eyre::{eyre::Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// [`config_logger`] The configuration for `env_logger`
///
/// The step logs at Info by default; the verbose input raises the filter to
/// Debug so every settings query and candidate artifact path gets traced
pub fn config_logger(verbose: bool, target: Target) -> Result<()> {
    let mut builder = Builder::from_default_env();

    builder
        .target(target)
        .format_indent(Some(4))
        .format_module_path(false)
        .format_timestamp_millis();

    if verbose {
        builder.filter(None, LevelFilter::Debug);
    } else {
        builder.filter(None, LevelFilter::Info);
    }

    builder
        .try_init()
        .with_context(|| "simbuild wasn't able to set up the logger")
}
