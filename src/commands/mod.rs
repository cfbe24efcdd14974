//! Command handlers module.
//!
//! - `io.rs`: `import` and `export`
//! - `parse.rs`: single-line check
//! - `config.rs`: configuration display

mod config;
mod io;
mod parse;

pub use config::cmd_config;
pub use io::{cmd_export, cmd_import};
pub use parse::cmd_parse;

use user_import::config::parse_delimiter;
use user_import::{ImportConfig, Layout, Result};

/// Applies `--layout` and `--delimiter` flags on top of the loaded config.
///
/// `--layout delimiter` keeps a separator already set in the config file or
/// environment; `--delimiter` replaces it.
pub fn apply_layout_flags(
    config: ImportConfig,
    layout: Option<&str>,
    delimiter: Option<&str>,
) -> Result<ImportConfig> {
    let mut selected = match layout {
        Some(flag) => keep_delimiter(config.layout, flag.parse()?),
        None => config.layout,
    };
    if let Some(delimiter) = delimiter {
        selected = selected.with_delimiter(parse_delimiter(delimiter)?)?;
    }
    Ok(config.with_layout(selected))
}

fn keep_delimiter(current: Layout, requested: Layout) -> Layout {
    match current {
        Layout::Delimiter { .. } if requested == Layout::delimiter() => current,
        _ => requested,
    }
}
