//! Loading the declaration tree from the project manifest.
//!
//! The manifest is a JSON file in the project directory (`package.json` by
//! default) whose `environment` field holds the declaration tree. Key order
//! is kept as written, since it decides the prompting order.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::PromptenvError;

/// Pure function: extract the declaration tree from manifest content.
///
/// An absent, null, or otherwise empty field means the project declares
/// nothing and yields `None`.
pub fn parse_declaration(
    content: &str,
    field: &str,
    path: &Path,
) -> Result<Option<Map<String, Value>>, PromptenvError> {
    let manifest: Value =
        serde_json::from_str(content).map_err(|e| PromptenvError::ManifestReadFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match manifest.get(field) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::Object(declaration)) => Ok(Some(declaration.clone())),
        Some(_) => Err(PromptenvError::ManifestReadFailure {
            path: path.to_path_buf(),
            reason: format!("'{field}' must be an object"),
        }),
    }
}

/// I/O wrapper: read `{project_dir}/{file_name}` and extract `field`.
pub fn load_declaration(
    project_dir: &Path,
    file_name: &str,
    field: &str,
) -> Result<Option<Map<String, Value>>, PromptenvError> {
    let path = project_dir.join(file_name);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PromptenvError::ManifestMissing {
                file_name: file_name.to_string(),
                dir: project_dir.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(PromptenvError::ManifestReadFailure {
                path,
                reason: e.to_string(),
            });
        }
    };
    parse_declaration(&content, field, &path)
}
