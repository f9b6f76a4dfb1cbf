//! Clap adapter for promptenv.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`Cli`] is
//! the full command line of the `promptenv` binary; the only bridge to the
//! core is [`Cli::into_invocation()`], which produces a framework-agnostic
//! [`Invocation`]. Everything after that flows through
//! [`PromptenvBuilder::handle()`](crate::PromptenvBuilder::handle).
//!
//! An unknown first word is taken as the program to run, so
//! `promptenv npm start` is the same as `promptenv run -- npm start`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{Action, ClusterTarget, ExportFormat, Invocation};

/// Prompt for a project's declared environment variables, remember the
/// answers, and run commands with them.
#[derive(Debug, Parser)]
#[command(name = "promptenv", version)]
pub struct Cli {
    /// Use this named setting for this invocation only.
    #[arg(long, short, global = true)]
    pub setting: Option<String>,

    /// Project directory containing the manifest (default: current directory).
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the environment and run a program with it.
    Run(RunArgs),
    /// Prompt for every declared variable, offering the stored values.
    Edit,
    /// Print the resolved environment in another format.
    Export(ExportArgs),
    /// Make a named setting the project's active one.
    Use {
        /// Setting name (e.g. "default", "staging").
        setting: String,
    },
    /// List the project's named settings.
    Settings,
    /// Any other command is run with the resolved environment.
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Use a blob printed by `export base64` instead of prompting.
    #[arg(long)]
    pub import: Option<String>,

    /// Program and its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub program: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub format: ExportFormat,

    /// Cluster application name (asked for when missing).
    #[arg(long, short)]
    pub application: Option<String>,

    /// Cluster environment name (asked for when missing).
    #[arg(long = "cluster-env", short = 'e')]
    pub cluster_environment: Option<String>,
}

impl Cli {
    /// Convert clap-parsed args into a framework-agnostic `Invocation`.
    pub fn into_invocation(self) -> Invocation {
        let action = match self.command {
            Command::Run(RunArgs { import, program }) => Action::Run { program, import },
            Command::External(program) => Action::Run {
                program,
                import: None,
            },
            Command::Edit => Action::Edit,
            Command::Export(ExportArgs {
                format,
                application,
                cluster_environment,
            }) => Action::Export {
                format,
                cluster: ClusterTarget {
                    application,
                    environment: cluster_environment,
                },
            },
            Command::Use { setting } => Action::Use { setting },
            Command::Settings => Action::Settings,
        };
        Invocation {
            action,
            setting: self.setting,
            project: self.project,
        }
    }
}
