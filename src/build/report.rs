//! Operator-facing progress text.

use std::path::{Path, PathBuf};

use super::steps::{Step, StepCommand};
use crate::config::BuildConfig;

const RULE_WIDTH: usize = 60;

pub fn banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule);
    println!("{}", title);
    println!("{}", rule);
}

pub fn intro(config: &BuildConfig) {
    banner("Wikitext Simplified Frontend Build");
    println!("Project root: {}", config.project_root.display());
    println!("Frontend dir: {}", config.frontend_dir().display());
}

pub fn skipped(step: Step) {
    match step {
        Step::WasmPack => println!("\nSkipping WASM build (--skip-wasm)"),
        Step::Install => println!("\nSkipping dependency installation (--skip-install)"),
        Step::ProductionBuild | Step::DevServer => {}
    }
}

/// Echo a step before it runs
pub fn command(description: Option<&str>, command: &StepCommand) {
    if let Some(description) = description {
        println!("\n{}...", description);
    }
    println!("$ {}", command.display_line());
}

pub fn step_ok(message: &str) {
    println!("[OK] {}", message);
}

pub fn dev_server_hint() {
    println!("\nPress Ctrl+C to stop the server\n");
}

pub fn dev_server_stopped() {
    println!("\n\nDevelopment server stopped.");
}

pub fn production_complete(config: &BuildConfig) {
    banner("Build Complete!");
    println!(
        "\nProduction build available in: {}",
        config.dist_dir().display()
    );
    println!("\nTo preview the production build:");
    println!("  cd {}", display_dir(&config.frontend_dir()));
    println!("  npm run preview");
}

pub fn setup_complete(config: &BuildConfig) {
    banner("Setup Complete!");
    println!("\nNext steps:");
    println!("  cd {}", display_dir(&config.frontend_dir()));
    println!("  npm run dev        # Start development server");
    println!("  npm run build      # Build for production");
    println!("\nOr use this tool:");
    println!("  frontend-build --dev     # Start dev server");
    println!("  frontend-build --build   # Production build");
}

/// Render `dir` relative to the current directory when that is shorter,
/// so `cd` suggestions stay copy-pasteable.
fn display_dir(dir: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| relative_to(dir, &cwd))
        .unwrap_or_else(|| dir.to_path_buf())
        .display()
        .to_string()
}

fn relative_to(dir: &Path, base: &Path) -> Option<PathBuf> {
    let rel = pathdiff::diff_paths(dir, base)?;
    if rel.as_os_str().is_empty() {
        return Some(PathBuf::from("."));
    }
    let shorter = rel.as_os_str().len() < dir.as_os_str().len();
    // Climbing out of the cwd is harder to read than the absolute path
    let climbs = rel.starts_with("..");
    (shorter && !climbs).then_some(rel)
}
