//! Export formatters for a resolved environment.
//!
//! Every formatter is a pure function of the [`ResolvedEnvironment`]; the
//! cluster format also needs a target, which the session asks for when the
//! command line did not give one.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::env::ResolvedEnvironment;
use crate::error::PromptenvError;
use crate::types::ExportFormat;

/// Application and environment names for the cluster CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterCommand<'a> {
    pub cli: &'a str,
    pub application: &'a str,
    pub environment: &'a str,
}

/// Format `env` as `format`. `cluster` is only used by [`ExportFormat::Cluster`].
pub fn render(
    env: &ResolvedEnvironment,
    format: ExportFormat,
    cluster: Option<&ClusterCommand<'_>>,
) -> Result<String, PromptenvError> {
    match format {
        ExportFormat::Shell => Ok(shell_lines(env, "")),
        ExportFormat::Dotenv => Ok(shell_lines(env, "export ")),
        ExportFormat::Base64 => to_blob(env),
        ExportFormat::Kubernetes => kubernetes(env),
        ExportFormat::Json => serde_json::to_string_pretty(env)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| PromptenvError::SerializeFailure {
                what: "environment",
                reason: e.to_string(),
            }),
        ExportFormat::Cluster => match cluster {
            Some(target) => cluster_commands(env, target),
            None => Err(PromptenvError::SerializeFailure {
                what: "cluster commands",
                reason: "no application or environment given".into(),
            }),
        },
    }
}

/// `{prefix}KEY="value"` per variable.
fn shell_lines(env: &ResolvedEnvironment, prefix: &str) -> String {
    env.iter()
        .map(|(name, value)| format!("{prefix}{name}=\"{}\"\n", shell_escape(value)))
        .collect()
}

/// Escape the characters that stay special inside double quotes.
fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Base64 of the compact JSON object, the form `run --import` accepts.
pub fn to_blob(env: &ResolvedEnvironment) -> Result<String, PromptenvError> {
    let json = serde_json::to_string(env).map_err(|e| PromptenvError::SerializeFailure {
        what: "environment",
        reason: e.to_string(),
    })?;
    let mut blob = STANDARD.encode(json);
    blob.push('\n');
    Ok(blob)
}

/// Decode a blob produced by [`to_blob`].
pub fn import_blob(blob: &str) -> Result<ResolvedEnvironment, PromptenvError> {
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|e| PromptenvError::InvalidImport(e.to_string()))?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| PromptenvError::InvalidImport(e.to_string()))?;

    object
        .into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(value) => Ok((name, value)),
            other => Err(PromptenvError::InvalidImport(format!(
                "{name} must be a string, found {other}"
            ))),
        })
        .collect()
}

#[derive(Serialize)]
struct EnvVar<'a> {
    name: &'a str,
    value: &'a str,
}

/// A container `env:` list.
fn kubernetes(env: &ResolvedEnvironment) -> Result<String, PromptenvError> {
    let vars: Vec<EnvVar<'_>> = env
        .iter()
        .map(|(name, value)| EnvVar { name, value })
        .collect();
    serde_yaml::to_string(&vars).map_err(|e| PromptenvError::SerializeFailure {
        what: "kubernetes env list",
        reason: e.to_string(),
    })
}

/// One `var set` command per variable, names and values JSON-quoted.
fn cluster_commands(
    env: &ResolvedEnvironment,
    target: &ClusterCommand<'_>,
) -> Result<String, PromptenvError> {
    let mut out = String::new();
    for (name, value) in env.iter() {
        let quote = |s: &str| {
            serde_json::to_string(s).map_err(|e| PromptenvError::SerializeFailure {
                what: "cluster commands",
                reason: e.to_string(),
            })
        };
        out.push_str(&format!(
            "{} var set -a {} -e {} -n {} -v {}\n",
            target.cli,
            target.application,
            target.environment,
            quote(name)?,
            quote(value)?
        ));
    }
    Ok(out)
}
