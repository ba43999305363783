use std::path::Path;

/// Ctrl+C ends the preview and counts as success.
pub fn run(config_path: Option<&Path>, file: &Path) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    super::provisioner(&config).preview(file)?;
    Ok(())
}
