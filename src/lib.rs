//! Declare a project's environment variables once, answer the prompts once,
//! and run commands with them.
//!
//! A project lists its variables as a tree in its manifest (by default the
//! `environment` field of `package.json`). Leaves are prompts; their
//! position in the tree names the variable:
//!
//! ```json
//! {
//!   "environment": {
//!     "db": {
//!       "host": "Database host",
//!       "port+?5432": "Database port"
//!     }
//!   }
//! }
//! ```
//!
//! declares `DB_HOST` and `DB_PORT`. Answers are remembered per project and
//! per named setting in a store file (`~/.promptenv`), so the next run asks
//! nothing.
//!
//! ```ignore
//! let outcome = Promptenv::builder()
//!     .project_dir("/work/shop")
//!     .handle(&Action::Edit, &mut TerminalPrompter)?;
//! ```
//!
//! # Leaf keys
//!
//! A leaf key may carry two markers, `name+?default`:
//!
//! - **`+`** marks the value as numeric. Answers must parse as a finite
//!   number and are stored normalized (`"08"` becomes `"8"`).
//! - **`?default`** is offered when nothing is stored yet. A blank answer
//!   takes it.
//!
//! Markers are stripped before the name is turned into a variable name:
//! path segments are joined with `_`, camelCase boundaries get a `_`, and
//! the result is uppercased (`apiKey` under `stripe` is `STRIPE_API_KEY`).
//!
//! # The walk
//!
//! [`ConfigurationWalker`] visits the declaration tree depth-first in
//! declaration order, keeping the persisted tree of the selected setting in
//! step with it. Each leaf goes to a [`Resolver`], which decides its value:
//!
//! - [`ReusePolicy`] returns the stored value silently and prompts only for
//!   missing ones (`run`, `export`).
//! - [`EditPolicy`] prompts for every leaf, suggesting the stored value
//!   (`edit`).
//!
//! The walk yields a [`ResolvedEnvironment`] in visit order. A declaration
//! that is `null`, or that is neither a string nor an object, aborts the walk
//! and nothing is saved.
//!
//! # Settings
//!
//! Each project keeps any number of named settings, one of them active
//! (`default` at first). `use NAME` switches the active one; `--setting
//! NAME` selects one for a single invocation.
//!
//! # Exports
//!
//! `export` renders the environment as shell or dotenv lines, a base64 blob
//! (which `run --import` accepts on another machine), a Kubernetes `env`
//! list, JSON, or a series of cluster CLI `var set` commands. See
//! [`ExportFormat`].
//!
//! # Tool configuration
//!
//! The tool's own settings ([`ToolConfig`]) come from compiled defaults,
//! then `promptenv.toml` in the platform config directory, then
//! `PROMPTENV_*` environment variables.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default) the `cli` module provides the
//! full command line of the `promptenv` binary. [`Cli::into_invocation()`]
//! converts it into a framework-agnostic [`Invocation`].
//!
//! # Error handling
//!
//! All fallible operations return [`PromptenvError`].

pub mod error;
pub mod types;

#[cfg(feature = "clap")]
pub mod cli;
pub mod config;
mod env;
mod export;
mod launch;
mod leaf;
mod manifest;
mod ops;
mod persist;
mod prompt;
mod session;
pub(crate) mod tree;
mod walker;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::Cli;
pub use config::ToolConfig;
pub use env::{ResolvedEnvironment, environment_name};
pub use error::PromptenvError;
pub use export::{ClusterCommand, import_blob, render, to_blob};
pub use leaf::LeafKey;
pub use ops::Outcome;
pub use persist::{ProjectSettings, SettingsStore};
pub use prompt::{EditPolicy, Prompter, ReusePolicy, TerminalPrompter};
pub use session::{Promptenv, PromptenvBuilder};
pub use tree::{PersistedNode, PersistedSection};
pub use types::{Action, ClusterTarget, ExportFormat, Invocation, Resolution, WalkedLeaf};
pub use walker::{ConfigurationWalker, Resolver};
