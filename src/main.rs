use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptenv::{Cli, Outcome, Promptenv, PromptenvError, TerminalPrompter, ToolConfig};

fn main() {
    let invocation = Cli::parse().into_invocation();
    match run(invocation) {
        Ok(outcome) => {
            let _ = std::io::stdout().flush();
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("promptenv: {e}");
            std::process::exit(1);
        }
    }
}

fn run(invocation: promptenv::Invocation) -> Result<Outcome, PromptenvError> {
    let config = ToolConfig::load_layered()?;
    init_logging(&config.log);

    let mut builder = Promptenv::builder()
        .config(&config)
        .setting(invocation.setting.as_deref());
    if let Some(project) = invocation.project {
        builder = builder.project_dir(project);
    }

    let outcome = builder.handle(&invocation.action, &mut TerminalPrompter)?;
    match &outcome {
        Outcome::NoDeclaration { .. } => eprint!("{outcome}"),
        _ => print!("{outcome}"),
    }
    Ok(outcome)
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
