//! Settings of the tool itself.
//!
//! Layers, lowest first: compiled defaults, `promptenv.toml` in the platform
//! config directory, `PROMPTENV_*` environment variables.

use std::path::PathBuf;

use confique::Config;

use crate::error::PromptenvError;

pub const APP_NAME: &str = "promptenv";

/// Config file looked up in the platform config directory.
pub const CONFIG_FILE: &str = "promptenv.toml";

/// Store file name under the home directory when `store` is not set.
pub const DEFAULT_STORE_FILE: &str = ".promptenv";

#[derive(Config, Debug, Clone, PartialEq)]
pub struct ToolConfig {
    /// Location of the settings store. Defaults to `~/.promptenv`.
    #[config(env = "PROMPTENV_STORE")]
    pub store: Option<PathBuf>,

    /// Manifest file read from the project directory.
    #[config(env = "PROMPTENV_MANIFEST", default = "package.json")]
    pub manifest: String,

    /// Manifest field holding the declarations.
    #[config(default = "environment")]
    pub manifest_field: String,

    /// Executable named in `export cluster` commands.
    #[config(env = "PROMPTENV_CLUSTER_CLI", default = "vlc2")]
    pub cluster_cli: String,

    /// Log filter, in `tracing-subscriber` `EnvFilter` syntax.
    #[config(env = "PROMPTENV_LOG", default = "warn")]
    pub log: String,
}

impl ToolConfig {
    /// Load defaults, the platform config file (if any), then env vars.
    pub fn load_layered() -> Result<Self, PromptenvError> {
        let mut builder = Self::builder().env();
        if let Some(dirs) = directories::ProjectDirs::from("", "", APP_NAME) {
            builder = builder.file(dirs.config_dir().join(CONFIG_FILE));
        }
        Ok(builder.load()?)
    }
}

/// `~/.promptenv`
pub fn default_store_path() -> Result<PathBuf, PromptenvError> {
    let user = directories::UserDirs::new().ok_or(PromptenvError::HomeDirUnavailable)?;
    Ok(user.home_dir().join(DEFAULT_STORE_FILE))
}
