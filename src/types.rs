use std::path::PathBuf;

/// What a resolver decided for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Store this value and export it.
    Value(String),
    /// Forget any stored value and leave the variable out of the environment.
    Omit,
}

/// Everything a resolver gets to see about the leaf being visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedLeaf {
    /// Human-readable prompt from the manifest.
    pub prompt: String,
    pub is_number: bool,
    /// Value stored for this leaf in the active setting, if it is a string.
    pub current_value: Option<String>,
    pub default_value: Option<String>,
    pub environment_name: String,
}

/// Output formats for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExportFormat {
    /// `KEY="value"` lines.
    Shell,
    /// `export KEY="value"` lines.
    Dotenv,
    /// Base64 JSON blob, accepted by `run --import`.
    Base64,
    /// Kubernetes container `env` list.
    Kubernetes,
    /// Flat JSON object.
    Json,
    /// Cluster CLI `var set` commands.
    Cluster,
}

/// Target of the `cluster` export. Missing parts are asked for interactively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterTarget {
    pub application: Option<String>,
    pub environment: Option<String>,
}

/// An operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Resolve the environment (or decode an imported blob) and run `program`.
    Run {
        program: Vec<String>,
        import: Option<String>,
    },
    /// Prompt for every declared variable, offering the stored values.
    Edit,
    Export {
        format: ExportFormat,
        cluster: ClusterTarget,
    },
    /// Make `setting` the project's active setting.
    Use { setting: String },
    /// List the project's settings.
    Settings,
}

/// A parsed command line: the action plus the per-invocation overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    /// Setting to use for this invocation only.
    pub setting: Option<String>,
    /// Project directory (defaults to the working directory).
    pub project: Option<PathBuf>,
}
