use slimpack_core::{MANIFEST_FILE, RootManifest, config::CONFIG_FILE};
use std::path::Path;

/// Add slimpack to the Node.js project in the current directory.
pub fn init_project() -> anyhow::Result<()> {
    if !Path::new(MANIFEST_FILE).exists() {
        anyhow::bail!("{MANIFEST_FILE} not found. Run this command from a Node.js project root.");
    }

    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        println!("{CONFIG_FILE} already exists, skipping");
        return Ok(());
    }

    let manifest = RootManifest::load(Path::new("."))?;
    let name_line = match &manifest.name {
        Some(name) => format!("# name = \"{name}\""),
        None => "name = \"my-function\"".to_owned(),
    };

    let template = format!(
        r#"[package]
{name_line}
# entry = "index.js"
# execution_file = "index.js"
# runtime_config = "config.json"
# additional_files = []
# remove_directories = []

# Packages to bundle even if no import names them
[package.required_modules]
# aws-sdk = "*"

[build]
# output_dir = "dist"
# clear_output_dir = true
# delete_workspace = true
# include_packages = true

[deploy]
# runtime = "nodejs20.x"
# handler = "index.handler"
# role = "arn:aws:iam::123456789012:role/lambda-exec"
# region = "us-east-1"
# profile = "default"

# [[functions]]
# name = "my-function"
# memory = 128
# timeout = 3
"#
    );
    std::fs::write(config_path, template)?;
    println!("Created {CONFIG_FILE}");

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Put runtime settings in config.json (exported as config.js)");
    println!();
    println!("  2. Inspect what will be packaged:");
    println!("     slimpack graph");
    println!();
    println!("  3. Build an archive:");
    println!("     slimpack build");
    println!();
    println!("  4. Add [[functions]] entries and publish:");
    println!("     slimpack deploy");

    Ok(())
}
