use std::path::Path;

/// `qd install`: install without asking; already-installed is success.
pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let handle = super::provisioner(&config).install()?;
    println!("{} ready: {handle}", config.tool.name);
    Ok(())
}
