use crate::output::print_json;
use std::path::Path;

/// `qd status`: exit code reflects the compiler only, never the runtime.
pub fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let provisioner = super::provisioner(&config);

    let status = provisioner.status();
    let runtime = provisioner.runtime_status();

    if json {
        print_json(&serde_json::json!({
            "tool": status,
            "runtime": runtime,
        }))?;
    } else {
        println!("{}", "=".repeat(50));
        println!("{} Installation Status", display_name(&status.tool));
        println!("{}", "=".repeat(50));

        match &status.path {
            Some(path) => {
                println!("[OK] {} found: {}", status.tool, path.display());
                if let Some(version) = &status.version {
                    println!("     Version: {version}");
                }
            }
            None => {
                println!("[X] {} not found", status.tool);
                println!("\nTo install, run: qd install");
            }
        }

        match (&runtime.path, &runtime.version) {
            (Some(_), Some(version)) => println!("{} found: {version}", runtime.runtime),
            (Some(path), None) => println!("{} found: {}", runtime.runtime, path.display()),
            (None, _) => println!(
                "Warning: {} not found. {} requires {} 17+",
                runtime.runtime,
                display_name(&status.tool),
                display_name(&runtime.runtime)
            ),
        }
    }

    if !status.is_installed() {
        anyhow::bail!("{} is not installed", status.tool);
    }
    Ok(())
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
