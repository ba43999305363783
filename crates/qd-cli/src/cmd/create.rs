use anyhow::Context;
use qd_core::scaffold::{self, DocType};

/// `qd create <name> [doc_type]`: scaffold in the current directory.
pub fn run(name: &str, doc_type: DocType) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    println!("Creating project: {name}");
    let project = scaffold::create_project(&cwd, name, doc_type)?;
    println!("Project created: {}", project.display());
    println!();
    println!("{}", scaffold::summary(name));
    Ok(())
}
