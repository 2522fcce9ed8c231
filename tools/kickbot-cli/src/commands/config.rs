//! Show, validate, or initialize configuration.

use std::path::PathBuf;

use kickbot_common::config::AppConfig;

pub fn run(
    config: AppConfig,
    path: PathBuf,
    init: bool,
    force: bool,
    print_path: bool,
) -> anyhow::Result<()> {
    if print_path {
        println!("{}", path.display());
        return Ok(());
    }

    if init {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        AppConfig::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&config)?);

    match config.validate() {
        Ok(()) => {
            eprintln!("[OK] Configuration is valid");
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] {e}");
            Err(e.into())
        }
    }
}
