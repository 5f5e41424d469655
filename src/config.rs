use std::path::PathBuf;

/// What happens after the setup steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prepare the wasm module and node_modules, then print guidance
    Setup,
    /// `npm run build`
    Production,
    /// `npm run dev`, attached to the terminal
    DevServer,
}

impl Mode {
    /// Production wins when both flags are given.
    pub fn from_flags(build: bool, dev: bool) -> Self {
        if build {
            Self::Production
        } else if dev {
            Self::DevServer
        } else {
            Self::Setup
        }
    }
}

/// Configuration for a build run
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub project_root: PathBuf,
    pub mode: Mode,
    pub skip_wasm: bool,
    pub skip_install: bool,
    pub dry_run: bool,
}

impl BuildConfig {
    pub fn frontend_dir(&self) -> PathBuf {
        self.project_root.join("frontend")
    }

    pub fn wasm_crate_dir(&self) -> PathBuf {
        self.project_root.join("wikitext-wasm")
    }

    /// Where wasm-pack writes the generated bindings
    pub fn wasm_out_dir(&self) -> PathBuf {
        self.frontend_dir().join("src").join("wasm")
    }

    /// Where `npm run build` leaves the production bundle
    pub fn dist_dir(&self) -> PathBuf {
        self.frontend_dir().join("dist")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_takes_priority_over_dev() {
        assert_eq!(Mode::from_flags(true, true), Mode::Production);
        assert_eq!(Mode::from_flags(true, false), Mode::Production);
        assert_eq!(Mode::from_flags(false, true), Mode::DevServer);
        assert_eq!(Mode::from_flags(false, false), Mode::Setup);
    }

    #[test]
    fn test_derived_paths_hang_off_project_root() {
        let config = BuildConfig {
            project_root: PathBuf::from("/work/wikitext"),
            mode: Mode::Setup,
            skip_wasm: false,
            skip_install: false,
            dry_run: false,
        };

        assert_eq!(config.frontend_dir(), PathBuf::from("/work/wikitext/frontend"));
        assert_eq!(
            config.wasm_crate_dir(),
            PathBuf::from("/work/wikitext/wikitext-wasm")
        );
        assert_eq!(
            config.wasm_out_dir(),
            PathBuf::from("/work/wikitext/frontend/src/wasm")
        );
        assert_eq!(config.dist_dir(), PathBuf::from("/work/wikitext/frontend/dist"));
    }
}
