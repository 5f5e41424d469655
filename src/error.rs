use std::io;

/// Everything that can abort a build run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(
        "Missing required tools:\n{}\n\nPlease install the missing tools and try again.",
        bullet_list(.0)
    )]
    MissingPrerequisites(Vec<String>),

    #[error("Command not found: {program}\nMake sure {program} is installed and in your PATH")]
    CommandNotFound { program: String },

    #[error("Command failed with exit code {code}")]
    CommandFailed { code: i32 },

    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
