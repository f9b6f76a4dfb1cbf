//! Results of handled actions.

use std::fmt;
use std::path::PathBuf;

/// Result of an action. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The child program exited with `code`.
    Exited { code: i32 },
    /// Exported text, printed verbatim.
    Exported(String),
    /// Edit mode finished; `variables` is the number of values now stored.
    Edited { setting: String, variables: usize },
    /// `setting` is now the project's active setting.
    Activated { setting: String },
    /// The project's settings, with the active one.
    Settings { active: String, names: Vec<String> },
    /// The manifest declares no environment; nothing to do.
    NoDeclaration { manifest: PathBuf },
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Exited { code } => *code,
            _ => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Exited { .. } => Ok(()),
            Outcome::Exported(text) => write!(f, "{text}"),
            Outcome::Edited { setting, variables } => {
                writeln!(f, "Saved {variables} variable(s) to setting '{setting}'")
            }
            Outcome::Activated { setting } => writeln!(f, "Active setting: {setting}"),
            Outcome::Settings { active, names } => {
                for name in names {
                    let marker = if name == active { "*" } else { " " };
                    writeln!(f, "{marker} {name}")?;
                }
                Ok(())
            }
            Outcome::NoDeclaration { manifest } => {
                writeln!(f, "No environment found in '{}'", manifest.display())
            }
        }
    }
}
