//! Declarative definitions of every external step the build can run.
//!
//! Each `Step` knows the program it launches, the arguments it passes, the
//! directory it runs in and how it is announced. The pipeline in `mod.rs`
//! only decides *which* steps run; everything about *how* a step looks on the
//! command line lives here.

use std::fmt;
use std::path::PathBuf;

use crate::config::{BuildConfig, Mode};

/// wasm-pack target for the frontend (ES modules loaded by the browser).
pub const WASM_PACK_TARGET: &str = "web";

/// Tools that must answer `--version` before anything runs.
pub const PREREQUISITES: &[&str] = &["wasm-pack", "npm"];

/// One external command invocation in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `wasm-pack build <crate> --target web --out-dir <frontend/src/wasm>`
    WasmPack,
    /// `npm install`
    Install,
    /// `npm run build`
    ProductionBuild,
    /// `npm run dev`
    DevServer,
}

impl Step {
    /// Every step in pipeline order
    pub fn all() -> &'static [Step] {
        &[
            Self::WasmPack,
            Self::Install,
            Self::ProductionBuild,
            Self::DevServer,
        ]
    }

    /// Section heading printed before the step runs
    pub fn heading(&self) -> &'static str {
        match self {
            Self::WasmPack => "Building WASM Module",
            Self::Install => "Installing Frontend Dependencies",
            Self::ProductionBuild => "Building Frontend",
            Self::DevServer => "Starting Development Server",
        }
    }

    /// Short description echoed just above the command line.
    ///
    /// The dev server is announced by its heading and the Ctrl+C hint alone.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::WasmPack => Some("Building WASM module with wasm-pack"),
            Self::Install => Some("Installing npm packages"),
            Self::ProductionBuild => Some("Building production bundle"),
            Self::DevServer => None,
        }
    }

    /// Message printed once the step finished successfully
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            Self::WasmPack => Some("WASM module built successfully"),
            Self::Install => Some("Dependencies installed successfully"),
            Self::ProductionBuild => Some("Frontend built successfully"),
            Self::DevServer => None,
        }
    }

    /// Whether the step hands the terminal to the tool until the operator
    /// interrupts it.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::DevServer)
    }

    /// Resolve the concrete command for this step.
    pub fn command(&self, config: &BuildConfig) -> StepCommand {
        match self {
            Self::WasmPack => StepCommand {
                program: "wasm-pack".to_string(),
                args: vec![
                    "build".to_string(),
                    config.wasm_crate_dir().display().to_string(),
                    "--target".to_string(),
                    WASM_PACK_TARGET.to_string(),
                    "--out-dir".to_string(),
                    config.wasm_out_dir().display().to_string(),
                ],
                cwd: config.project_root.clone(),
            },
            Self::Install => npm(config, &["install"]),
            Self::ProductionBuild => npm(config, &["run", "build"]),
            Self::DevServer => npm(config, &["run", "dev"]),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WasmPack => "wasm",
            Self::Install => "install",
            Self::ProductionBuild => "build",
            Self::DevServer => "dev",
        };
        write!(f, "{}", name)
    }
}

fn npm(config: &BuildConfig, args: &[&str]) -> StepCommand {
    StepCommand {
        program: "npm".to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        cwd: config.frontend_dir(),
    }
}

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl StepCommand {
    /// The command as echoed to the operator: `wasm-pack build ...`
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The steps a configuration runs, in order.
pub fn plan(config: &BuildConfig) -> Vec<Step> {
    let mut steps = Vec::new();

    if !config.skip_wasm {
        steps.push(Step::WasmPack);
    }
    if !config.skip_install {
        steps.push(Step::Install);
    }
    match config.mode {
        Mode::Production => steps.push(Step::ProductionBuild),
        Mode::DevServer => steps.push(Step::DevServer),
        Mode::Setup => {}
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: Mode, skip_wasm: bool, skip_install: bool) -> BuildConfig {
        BuildConfig {
            project_root: PathBuf::from("/work/wikitext"),
            mode,
            skip_wasm,
            skip_install,
            dry_run: false,
        }
    }

    #[test]
    fn test_setup_plan() {
        assert_eq!(
            plan(&config(Mode::Setup, false, false)),
            vec![Step::WasmPack, Step::Install]
        );
        assert!(plan(&config(Mode::Setup, true, true)).is_empty());
    }

    #[test]
    fn test_production_plan_never_starts_dev_server() {
        let steps = plan(&config(Mode::from_flags(true, true), false, true));
        assert_eq!(steps, vec![Step::WasmPack, Step::ProductionBuild]);
        assert!(!steps.contains(&Step::DevServer));
    }

    #[test]
    fn test_dev_plan_ends_with_dev_server() {
        let steps = plan(&config(Mode::DevServer, true, false));
        assert_eq!(steps.last(), Some(&Step::DevServer));
        assert!(steps.last().unwrap().is_interactive());
    }

    #[test]
    fn test_wasm_pack_command() {
        let cmd = Step::WasmPack.command(&config(Mode::Setup, false, false));
        assert_eq!(cmd.cwd, PathBuf::from("/work/wikitext"));
        assert_eq!(
            cmd.display_line(),
            "wasm-pack build /work/wikitext/wikitext-wasm --target web --out-dir /work/wikitext/frontend/src/wasm"
        );
    }

    #[test]
    fn test_npm_commands_run_in_frontend() {
        let config = config(Mode::Setup, false, false);
        for (step, line) in [
            (Step::Install, "npm install"),
            (Step::ProductionBuild, "npm run build"),
            (Step::DevServer, "npm run dev"),
        ] {
            let cmd = step.command(&config);
            assert_eq!(cmd.display_line(), line);
            assert_eq!(cmd.cwd, PathBuf::from("/work/wikitext/frontend"));
        }
    }
}
