use super::Project;
use std::path::Path;

/// Print the dependency graph without building anything.
pub fn graph(config_path: Option<&Path>) -> anyhow::Result<()> {
    let project = Project::load(config_path)?;
    let request = project.request()?;

    let graph = slimpack_build::walk(
        request.entry_file(),
        request.app_root(),
        request.required_modules(),
    )?;

    println!("Files ({}):", graph.local_files.len());
    for file in graph.relative_files() {
        println!("  {}", file.display());
    }

    println!();
    println!("Packages ({}):", graph.externals.len());
    for (name, version) in &graph.externals {
        println!("  {name} {version}");
    }

    if graph.has_diagnostics() {
        println!();
        println!("Warnings:");
        for path in &graph.missing {
            println!("  missing: {}", path.display());
        }
        for path in &graph.outside_root {
            println!("  outside root: {}", path.display());
        }
        for path in &graph.unreadable {
            println!("  unreadable: {}", path.display());
        }
    }

    Ok(())
}
