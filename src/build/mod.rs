use tracing::debug;

use crate::config::{BuildConfig, Mode};
use crate::error::BuildError;

mod prerequisites;
pub mod project;
mod report;
pub mod runner;
pub mod steps;

use runner::{StepOutcome, StepRunner, SystemRunner};
use steps::Step;

/// Main build orchestrator
pub fn run(config: &BuildConfig) -> Result<(), BuildError> {
    run_with(config, &mut SystemRunner::new())
}

/// Run the pipeline against any runner:
/// prerequisites, [wasm-pack], [npm install], then build, dev server or guidance.
pub fn run_with(config: &BuildConfig, runner: &mut dyn StepRunner) -> Result<(), BuildError> {
    if config.dry_run {
        print_plan(config);
        return Ok(());
    }

    prerequisites::check(runner, steps::PREREQUISITES)?;

    report::intro(config);
    project::inspect(config);

    let plan = steps::plan(config);
    debug!(
        "Planned steps: {}",
        plan.iter().map(Step::to_string).collect::<Vec<_>>().join(", ")
    );

    for step in Step::all() {
        if plan.contains(step) {
            run_step(config, runner, *step)?;
        } else {
            report::skipped(*step);
        }
    }

    match config.mode {
        Mode::Production => report::production_complete(config),
        Mode::Setup => report::setup_complete(config),
        Mode::DevServer => {}
    }

    Ok(())
}

fn run_step(
    config: &BuildConfig,
    runner: &mut dyn StepRunner,
    step: Step,
) -> Result<(), BuildError> {
    report::banner(step.heading());
    if step.is_interactive() {
        report::dev_server_hint();
    }

    let command = step.command(config);
    report::command(step.description(), &command);
    debug!("Running {} in {}", step, command.cwd.display());

    match runner.run(&command, step.is_interactive())? {
        StepOutcome::Success => {
            if let Some(message) = step.success_message() {
                report::step_ok(message);
            }
            Ok(())
        }
        StepOutcome::Interrupted => {
            report::dev_server_stopped();
            Ok(())
        }
        StepOutcome::Failed { code } => Err(BuildError::CommandFailed { code }),
        StepOutcome::NotFound => Err(BuildError::CommandNotFound {
            program: command.program,
        }),
    }
}

fn print_plan(config: &BuildConfig) {
    let plan = steps::plan(config);
    println!("Dry run: {} step(s) would run", plan.len());
    for step in plan {
        let command = step.command(config);
        println!("$ {}", command.display_line());
        println!("    (in {})", command.cwd.display());
    }
}
