use qd_core::provision::ExportTarget;
use std::path::Path;

pub fn run(config_path: Option<&Path>, file: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    super::provisioner(&config).export(file, output_dir, ExportTarget::Pdf)?;
    Ok(())
}
