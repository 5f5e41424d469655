use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{BuildConfig, Mode};

/// Marker that identifies the project root
const WASM_MANIFEST: &str = "wikitext-wasm/Cargo.toml";

/// Nearest ancestor of `start` (inclusive) holding the wasm crate, or `start` itself.
pub fn discover_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(WASM_MANIFEST).is_file())
        .unwrap_or(start)
        .to_path_buf()
}

/// Resolve the project root from an explicit path or the current directory.
pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            discover_root(&cwd)
        }
    };

    // Keep relative paths as given if the directory is not there yet; the
    // steps will report the real problem.
    Ok(root.canonicalize().unwrap_or(root))
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: String,
    version: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

fn read_cargo_manifest(path: &Path) -> Result<CargoManifest> {
    let content = std::fs::read_to_string(path).context("Failed to read Cargo.toml")?;
    toml::from_str(&content).context("Failed to parse Cargo.toml")
}

fn read_package_json(path: &Path) -> Result<PackageJson> {
    let content = std::fs::read_to_string(path).context("Failed to read package.json")?;
    serde_json::from_str(&content).context("Failed to parse package.json")
}

/// npm script the mode relies on, if any
fn required_script(mode: Mode) -> Option<&'static str> {
    match mode {
        Mode::Production => Some("build"),
        Mode::DevServer => Some("dev"),
        Mode::Setup => None,
    }
}

/// Look at the wasm crate and frontend manifests and log what stands out.
///
/// Purely advisory: nothing here changes which steps run.
pub fn inspect(config: &BuildConfig) {
    match read_cargo_manifest(&config.wasm_crate_dir().join("Cargo.toml")) {
        Ok(CargoManifest {
            package: Some(package),
        }) => {
            let version = package
                .version
                .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                .unwrap_or_else(|| "?".to_string());
            debug!("WASM crate: {} {}", package.name, version);
        }
        Ok(_) => debug!("wikitext-wasm/Cargo.toml has no [package] section"),
        Err(e) => debug!("Could not inspect wasm crate: {:#}", e),
    }

    let package_json = match read_package_json(&config.frontend_dir().join("package.json")) {
        Ok(package_json) => package_json,
        Err(e) => {
            debug!("Could not inspect frontend package: {:#}", e);
            return;
        }
    };

    if let Some(name) = &package_json.name {
        debug!("Frontend package: {}", name);
    }
    for warning in missing_scripts(&package_json, config.mode) {
        warn!("{}", warning);
    }
}

fn missing_scripts(package_json: &PackageJson, mode: Mode) -> Vec<String> {
    required_script(mode)
        .filter(|script| !package_json.scripts.contains_key(*script))
        .map(|script| format!("frontend/package.json does not define a \"{}\" script", script))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_root_walks_up() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("wikitext-wasm")).unwrap();
        std::fs::write(root.join(WASM_MANIFEST), "[package]\nname = \"wikitext-wasm\"\n").unwrap();
        let nested = root.join("frontend/src");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_root(&nested), root);
        assert_eq!(discover_root(root), root);
    }

    #[test]
    fn test_discover_root_falls_back_to_start() {
        let temp = tempfile::tempdir().unwrap();
        let start = temp.path().join("somewhere");
        std::fs::create_dir_all(&start).unwrap();

        assert_eq!(discover_root(&start), start);
    }

    #[test]
    fn test_missing_scripts() {
        let package_json: PackageJson =
            serde_json::from_str(r#"{"name": "frontend", "scripts": {"dev": "vite"}}"#).unwrap();

        assert!(missing_scripts(&package_json, Mode::Setup).is_empty());
        assert!(missing_scripts(&package_json, Mode::DevServer).is_empty());
        assert_eq!(
            missing_scripts(&package_json, Mode::Production),
            vec!["frontend/package.json does not define a \"build\" script"]
        );
    }

    #[test]
    fn test_package_json_without_scripts() {
        let package_json: PackageJson = serde_json::from_str(r#"{"name": "frontend"}"#).unwrap();
        assert_eq!(missing_scripts(&package_json, Mode::DevServer).len(), 1);
    }

    #[test]
    fn test_read_cargo_manifest() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Cargo.toml");
        std::fs::write(
            &path,
            "[package]\nname = \"wikitext-wasm\"\nversion = \"0.1.0\"\n\n[lib]\ncrate-type = [\"cdylib\"]\n",
        )
        .unwrap();

        let manifest = read_cargo_manifest(&path).unwrap();
        assert_eq!(manifest.package.unwrap().name, "wikitext-wasm");
    }
}
