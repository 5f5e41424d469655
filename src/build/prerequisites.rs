use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::runner::StepRunner;
use crate::error::BuildError;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?").unwrap());

/// Check that every tool answers `--version`.
///
/// All tools are probed even after one fails, so the operator sees the
/// complete list of what is missing in a single run.
pub fn check(runner: &mut dyn StepRunner, tools: &[&str]) -> Result<(), BuildError> {
    let mut missing = Vec::new();

    for tool in tools {
        match runner.probe(tool) {
            Some(output) => match parse_version(&output) {
                Some(version) => debug!("Found {} {}", tool, version),
                None => debug!("Found {} (unrecognized version output)", tool),
            },
            None => missing.push(tool.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BuildError::MissingPrerequisites(missing))
    }
}

/// Pull the first semver-looking token out of `--version` output
/// (`wasm-pack 0.13.1` -> `0.13.1`).
fn parse_version(output: &str) -> Option<&str> {
    VERSION_RE.find(output).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::runner::StepOutcome;
    use crate::build::steps::StepCommand;

    struct Probes {
        installed: Vec<&'static str>,
        probed: Vec<String>,
    }

    impl StepRunner for Probes {
        fn probe(&mut self, tool: &str) -> Option<String> {
            self.probed.push(tool.to_string());
            self.installed
                .iter()
                .any(|t| *t == tool)
                .then(|| format!("{} 1.2.3\n", tool))
        }

        fn run(&mut self, _: &StepCommand, _: bool) -> Result<StepOutcome, BuildError> {
            panic!("prerequisite check must not run steps");
        }
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("wasm-pack 0.13.1\n"), Some("0.13.1"));
        assert_eq!(parse_version("10.9.2\n"), Some("10.9.2"));
        assert_eq!(parse_version("1.0.0-rc.1"), Some("1.0.0-rc.1"));
        assert_eq!(parse_version("unknown"), None);
    }

    #[test]
    fn test_all_present() {
        let mut runner = Probes {
            installed: vec!["wasm-pack", "npm"],
            probed: vec![],
        };
        assert!(check(&mut runner, &["wasm-pack", "npm"]).is_ok());
    }

    #[test]
    fn test_reports_every_missing_tool() {
        let mut runner = Probes {
            installed: vec![],
            probed: vec![],
        };

        let err = check(&mut runner, &["wasm-pack", "npm"]).unwrap_err();

        // Both tools were probed despite the first failing
        assert_eq!(runner.probed, vec!["wasm-pack", "npm"]);
        match err {
            BuildError::MissingPrerequisites(missing) => {
                assert_eq!(missing, vec!["wasm-pack", "npm"])
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
