//! Config command handler.

use user_import::ImportConfig;
use user_import::io::Layout;

/// Config command.
pub fn cmd_config(config: &ImportConfig, show: bool) {
    if !show {
        println!("Use 'user-import config --show' to display the current configuration.");
        if let Some(path) = ImportConfig::default_path() {
            println!("Default config file: {}", path.display());
        }
        return;
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Config Files Loaded:");
    if config.config_sources.is_empty() {
        println!("  (none - using defaults)");
    } else {
        for source in &config.config_sources {
            println!("  - {}", source.display());
        }
    }
    println!();

    println!("Import:");
    println!("  Layout: {}", config.layout);
    if let Layout::Delimiter { delimiter } = config.layout {
        println!("  Delimiter: {:?}", char::from(delimiter));
    }
    println!("  Batch Size: {}", config.batch_size);
    println!();

    println!("Store:");
    println!("  Path: {}", config.store_path.display());
    println!();

    println!("Context:");
    println!("  App: {}", config.app);
    println!("  Env: {}", config.env);
    println!();

    println!("Logging:");
    println!("  Format: {}", config.logging.format);
    println!("  Level: {}", config.logging.level);
    println!(
        "  File: {}",
        config
            .logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );
}
