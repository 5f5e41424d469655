use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use tracing::{debug, warn};

use super::steps::StepCommand;
use crate::error::BuildError;

/// Exit code `cmd.exe` uses for "is not recognized as an internal or external command".
const SHELL_NOT_FOUND_CODE: i32 = 9009;

/// How long to wait for a Ctrl+C after the dev server died on its own.
/// The terminal signals the whole process group, so the child may notice first.
const INTERRUPT_GRACE: Duration = Duration::from_millis(200);

/// How long the dev server gets to shut down after Ctrl+C before it is killed.
/// It never sees the signal when only the orchestrator was interrupted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Result of running one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Ran, but exited non-zero. `-1` when killed without an exit code.
    Failed { code: i32 },
    /// The executable is not on the search path
    NotFound,
    /// The operator pressed Ctrl+C while an interactive step was running
    Interrupted,
}

/// Launches external tools on behalf of the pipeline.
pub trait StepRunner {
    /// Run `<tool> --version` with output captured.
    /// Returns the version output when the tool answered with exit status zero.
    fn probe(&mut self, tool: &str) -> Option<String>;

    /// Run a step with inherited stdio and wait for it to exit.
    fn run(&mut self, command: &StepCommand, interactive: bool) -> Result<StepOutcome, BuildError>;
}

/// How commands are handed to the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStrategy {
    /// Spawn the program directly
    Direct,
    /// Go through the command interpreter (`cmd /C`), so `npm.cmd` and friends resolve
    Shell,
}

impl ExecStrategy {
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Shell
        } else {
            Self::Direct
        }
    }

    /// Program and arguments as passed to the OS
    pub fn argv(&self, program: &str, args: &[String]) -> (String, Vec<String>) {
        match self {
            Self::Direct => (program.to_string(), args.to_vec()),
            Self::Shell => {
                let mut wrapped = vec!["/C".to_string(), program.to_string()];
                wrapped.extend(args.iter().cloned());
                ("cmd".to_string(), wrapped)
            }
        }
    }

    pub fn command(&self, program: &str, args: &[String]) -> Command {
        let (program, args) = self.argv(program, args);
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    }

    /// Map an exit status onto the uniform outcome.
    pub fn classify(&self, code: Option<i32>) -> StepOutcome {
        match (self, code) {
            (_, Some(0)) => StepOutcome::Success,
            (Self::Shell, Some(SHELL_NOT_FOUND_CODE)) => StepOutcome::NotFound,
            (_, Some(code)) => StepOutcome::Failed { code },
            (_, None) => StepOutcome::Failed { code: -1 },
        }
    }

    fn classify_status(&self, status: ExitStatus) -> StepOutcome {
        self.classify(status.code())
    }
}

/// Runs steps as real child processes.
#[derive(Debug)]
pub struct SystemRunner {
    strategy: ExecStrategy,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            strategy: ExecStrategy::native(),
        }
    }

    fn spawn_error(command: &StepCommand, err: io::Error) -> Result<StepOutcome, BuildError> {
        if err.kind() == io::ErrorKind::NotFound {
            Ok(StepOutcome::NotFound)
        } else {
            Err(BuildError::Spawn {
                program: command.program.clone(),
                source: err,
            })
        }
    }

    /// A missing working directory also surfaces as `NotFound` from spawn;
    /// catch it first so it is not blamed on the PATH.
    fn check_cwd(command: &StepCommand) -> Result<(), BuildError> {
        if command.cwd.is_dir() {
            return Ok(());
        }
        Err(BuildError::Spawn {
            program: command.program.clone(),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!("working directory {} does not exist", command.cwd.display()),
            ),
        })
    }

    fn run_blocking(&self, command: &StepCommand) -> Result<StepOutcome, BuildError> {
        let status = self
            .strategy
            .command(&command.program, &command.args)
            .current_dir(&command.cwd)
            .status();

        match status {
            Ok(status) => Ok(self.strategy.classify_status(status)),
            Err(err) => Self::spawn_error(command, err),
        }
    }

    /// Run a step that stays in the foreground until the operator stops it.
    fn run_interactive(&self, command: &StepCommand) -> Result<StepOutcome, BuildError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| BuildError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        runtime.block_on(async {
            let mut std_cmd = self.strategy.command(&command.program, &command.args);
            std_cmd.current_dir(&command.cwd);

            let mut child = match tokio::process::Command::from(std_cmd).spawn() {
                Ok(child) => child,
                Err(err) => return Self::spawn_error(command, err),
            };

            let interrupt = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!("Cannot listen for Ctrl+C: {}", err);
                    std::future::pending::<()>().await;
                }
            };
            tokio::pin!(interrupt);

            let exited = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                status = child.wait() => Some(status),
            };

            let wait_error = |source| BuildError::Spawn {
                program: command.program.clone(),
                source,
            };

            match exited {
                None => {
                    debug!("Interrupt received, waiting for {} to exit", command.program);
                    let shutdown = tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await;
                    match shutdown {
                        Ok(status) => {
                            status.map_err(wait_error)?;
                        }
                        Err(_) => {
                            debug!("{} still running, killing it", command.program);
                            if let Err(err) = child.kill().await {
                                debug!("Failed to kill {}: {}", command.program, err);
                            }
                        }
                    }
                    Ok(StepOutcome::Interrupted)
                }
                Some(status) => {
                    let outcome = self.strategy.classify_status(status.map_err(wait_error)?);
                    if outcome == StepOutcome::Success {
                        return Ok(outcome);
                    }
                    match tokio::time::timeout(INTERRUPT_GRACE, &mut interrupt).await {
                        Ok(()) => Ok(StepOutcome::Interrupted),
                        Err(_) => Ok(outcome),
                    }
                }
            }
        })
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRunner for SystemRunner {
    fn probe(&mut self, tool: &str) -> Option<String> {
        let output = self
            .strategy
            .command(tool, &["--version".to_string()])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                debug!("{} --version exited with {}", tool, output.status);
                None
            }
            Err(err) => {
                debug!("{} --version could not be started: {}", tool, err);
                None
            }
        }
    }

    fn run(&mut self, command: &StepCommand, interactive: bool) -> Result<StepOutcome, BuildError> {
        Self::check_cwd(command)?;
        if interactive {
            self.run_interactive(command)
        } else {
            self.run_blocking(command)
        }
    }
}
