//! Show or write the configuration.

use std::path::Path;

use mousekeys_common::config::AppConfig;

pub fn run(config: &AppConfig, path: &Path, write: bool) -> anyhow::Result<()> {
    if write {
        if path.exists() {
            anyhow::bail!(
                "{} already exists; remove it first to write defaults",
                path.display()
            );
        }
        AppConfig::default().save_to(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
