use std::path::{Path, PathBuf};

use crate::config::{self, ToolConfig};
use crate::env::ResolvedEnvironment;
use crate::error::PromptenvError;
use crate::export::{self, ClusterCommand};
use crate::launch;
use crate::manifest;
use crate::ops::Outcome;
use crate::persist::{ProjectSettings, SettingsStore};
use crate::prompt::{EditPolicy, Prompter, ReusePolicy};
use crate::types::{Action, ClusterTarget, ExportFormat};
use crate::walker::{ConfigurationWalker, Resolver};

/// Entry point for building a session.
pub struct Promptenv;

impl Promptenv {
    pub fn builder() -> PromptenvBuilder {
        PromptenvBuilder::new()
    }
}

/// Builder for one invocation: which project, which store, which setting.
///
/// Everything defaults sensibly: the working directory, `~/.promptenv`, the
/// project's active setting, and `package.json`'s `environment` field.
pub struct PromptenvBuilder {
    project_dir: Option<PathBuf>,
    store_path: Option<PathBuf>,
    setting: Option<String>,
    manifest: String,
    manifest_field: String,
    cluster_cli: String,
}

/// What a walk over the project's declarations produced.
enum Walked {
    NoDeclaration(PathBuf),
    Resolved {
        setting: String,
        environment: ResolvedEnvironment,
    },
}

impl PromptenvBuilder {
    fn new() -> Self {
        Self {
            project_dir: None,
            store_path: None,
            setting: None,
            manifest: "package.json".to_string(),
            manifest_field: "environment".to_string(),
            cluster_cli: "vlc2".to_string(),
        }
    }

    /// Take manifest, store and cluster settings from a loaded [`ToolConfig`].
    pub fn config(mut self, config: &ToolConfig) -> Self {
        if let Some(store) = &config.store {
            self.store_path = Some(store.clone());
        }
        self.manifest = config.manifest.clone();
        self.manifest_field = config.manifest_field.clone();
        self.cluster_cli = config.cluster_cli.clone();
        self
    }

    /// Project directory (default: the working directory).
    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Settings store file (default: `~/.promptenv`).
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Use `setting` for this invocation instead of the project's active one.
    /// `None` is ignored.
    pub fn setting(mut self, setting: Option<&str>) -> Self {
        if let Some(setting) = setting {
            self.setting = Some(setting.to_string());
        }
        self
    }

    pub fn manifest(mut self, file_name: &str, field: &str) -> Self {
        self.manifest = file_name.to_string();
        self.manifest_field = field.to_string();
        self
    }

    pub fn cluster_cli(mut self, cli: &str) -> Self {
        self.cluster_cli = cli.to_string();
        self
    }

    /// Canonical project directory, so every spelling of it maps to one store key.
    ///
    /// A directory that cannot be canonicalized (e.g. it does not exist) is
    /// made absolute and stripped of `.` segments and trailing separators.
    fn effective_project_dir(&self) -> Result<PathBuf, PromptenvError> {
        let cwd = || {
            std::env::current_dir().map_err(|e| PromptenvError::IoError {
                path: PathBuf::from("."),
                source: e,
            })
        };
        let dir = match &self.project_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd()?.join(dir),
            None => cwd()?,
        };
        Ok(dir
            .canonicalize()
            .unwrap_or_else(|_| dir.components().collect()))
    }

    fn effective_store_path(&self) -> Result<PathBuf, PromptenvError> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => config::default_store_path(),
        }
    }

    /// Handle an [`Action`], prompting through `prompter` where needed.
    pub fn handle<P: Prompter>(
        &self,
        action: &Action,
        prompter: &mut P,
    ) -> Result<Outcome, PromptenvError> {
        match action {
            Action::Run { program, import } => {
                let Some((name, args)) = program.split_first() else {
                    return Err(PromptenvError::NoProgram);
                };
                let environment = match import {
                    Some(blob) => export::import_blob(blob)?,
                    None => match self.walk(&mut ReusePolicy::new(&mut *prompter), false)? {
                        Walked::Resolved { environment, .. } => environment,
                        Walked::NoDeclaration(manifest) => {
                            return Ok(Outcome::NoDeclaration { manifest });
                        }
                    },
                };
                let code = launch::launch(name, args, &environment)?;
                Ok(Outcome::Exited { code })
            }
            Action::Edit => match self.walk(&mut EditPolicy::new(&mut *prompter), true)? {
                Walked::Resolved {
                    setting,
                    environment,
                } => Ok(Outcome::Edited {
                    setting,
                    variables: environment.len(),
                }),
                Walked::NoDeclaration(manifest) => Ok(Outcome::NoDeclaration { manifest }),
            },
            Action::Export { format, cluster } => {
                let environment = match self.walk(&mut ReusePolicy::new(&mut *prompter), false)? {
                    Walked::Resolved { environment, .. } => environment,
                    Walked::NoDeclaration(manifest) => {
                        return Ok(Outcome::NoDeclaration { manifest });
                    }
                };
                self.export(&environment, *format, cluster, prompter)
                    .map(Outcome::Exported)
            }
            Action::Use { setting } => {
                let project_dir = self.effective_project_dir()?;
                let store_path = self.effective_store_path()?;
                let (mut store, _) = SettingsStore::load(&store_path)?;
                store.project_mut(&project_key(&project_dir)).activate(setting);
                store.save(&store_path)?;
                tracing::info!(setting = %setting, "activated setting");
                Ok(Outcome::Activated {
                    setting: setting.clone(),
                })
            }
            Action::Settings => {
                let project_dir = self.effective_project_dir()?;
                let (store, _) = SettingsStore::load(&self.effective_store_path()?)?;
                let project = store
                    .project(&project_key(&project_dir))
                    .cloned()
                    .unwrap_or_default();
                Ok(Outcome::Settings {
                    names: project.setting_names(),
                    active: project.active,
                })
            }
        }
    }

    /// Walk the project's declarations against the selected setting.
    ///
    /// The store is saved when the walk changed the setting, when it did not
    /// exist yet, or when `always_save` is set.
    fn walk<R: Resolver>(&self, resolver: &mut R, always_save: bool) -> Result<Walked, PromptenvError> {
        let project_dir = self.effective_project_dir()?;
        let Some(declaration) =
            manifest::load_declaration(&project_dir, &self.manifest, &self.manifest_field)?
        else {
            let manifest = project_dir.join(&self.manifest);
            tracing::debug!(manifest = %manifest.display(), "no environment declared");
            return Ok(Walked::NoDeclaration(manifest));
        };

        let store_path = self.effective_store_path()?;
        let (mut store, seeded) = SettingsStore::load(&store_path)?;
        let project: &mut ProjectSettings = store.project_mut(&project_key(&project_dir));
        let setting = self.setting.clone().unwrap_or_else(|| project.active.clone());

        let persisted = project.setting_mut(&setting);
        let before = persisted.clone();
        let environment = ConfigurationWalker::new(persisted).walk(&declaration, resolver)?;
        let changed = *persisted != before;

        if changed || seeded || always_save {
            store.save(&store_path)?;
        }
        tracing::debug!(setting = %setting, variables = environment.len(), changed, "walk finished");
        Ok(Walked::Resolved {
            setting,
            environment,
        })
    }

    fn export<P: Prompter>(
        &self,
        environment: &ResolvedEnvironment,
        format: ExportFormat,
        cluster: &ClusterTarget,
        prompter: &mut P,
    ) -> Result<String, PromptenvError> {
        if format != ExportFormat::Cluster {
            return export::render(environment, format, None);
        }
        let application = match &cluster.application {
            Some(application) => application.clone(),
            None => prompter.ask("Cluster Application Name: ")?.trim().to_string(),
        };
        let target_environment = match &cluster.environment {
            Some(environment) => environment.clone(),
            None => prompter.ask("Cluster Environment: ")?.trim().to_string(),
        };
        let command = ClusterCommand {
            cli: &self.cluster_cli,
            application: &application,
            environment: &target_environment,
        };
        export::render(environment, format, Some(&command))
    }
}

/// Store key of a project: its absolute path.
fn project_key(project_dir: &Path) -> String {
    project_dir.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{ScriptedPrompter, TestProject};
    use crate::tree::PersistedSection;
    use confique::Config;

    const DB_MANIFEST: &str =
        r#"{"name": "app", "environment": {"db": {"host": "DB host", "port+?5432": "DB port"}}}"#;

    fn export_action(format: ExportFormat) -> Action {
        Action::Export {
            format,
            cluster: ClusterTarget::default(),
        }
    }

    fn active_setting(project: &TestProject) -> PersistedSection {
        let (store, _) = SettingsStore::load(&project.store_path()).unwrap();
        let mut entry = store.project(&project.key()).unwrap().clone();
        entry.active_settings_mut().clone()
    }

    #[test]
    fn export_prompts_and_persists() {
        let project = TestProject::new(DB_MANIFEST);
        let mut prompter = ScriptedPrompter::new(&["localhost", ""]);

        let outcome = project
            .builder()
            .handle(&export_action(ExportFormat::Shell), &mut prompter)
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Exported("DB_HOST=\"localhost\"\nDB_PORT=\"5432\"\n".into())
        );
        let saved = active_setting(&project);
        let expected: PersistedSection =
            serde_json::from_str(r#"{"db": {"host": "localhost", "port": "5432"}}"#).unwrap();
        assert_eq!(saved, expected);
    }

    #[test]
    fn second_run_reuses_stored_values() {
        let project = TestProject::new(DB_MANIFEST);
        let mut first = ScriptedPrompter::new(&["localhost", "6000"]);
        project
            .builder()
            .handle(&export_action(ExportFormat::Json), &mut first)
            .unwrap();

        let mut second = ScriptedPrompter::new(&[]);
        let outcome = project
            .builder()
            .handle(&export_action(ExportFormat::Dotenv), &mut second)
            .unwrap();

        assert!(second.questions.is_empty());
        assert_eq!(
            outcome,
            Outcome::Exported("export DB_HOST=\"localhost\"\nexport DB_PORT=\"6000\"\n".into())
        );
    }

    #[test]
    fn unchanged_walk_does_not_rewrite_store() {
        let project = TestProject::new(DB_MANIFEST);
        let mut prompter = ScriptedPrompter::new(&["localhost", ""]);
        project
            .builder()
            .handle(&export_action(ExportFormat::Shell), &mut prompter)
            .unwrap();

        // Replace the file with equivalent but differently formatted content.
        let compact = std::fs::read_to_string(project.store_path())
            .unwrap()
            .replace(['\n', '\t'], "");
        std::fs::write(project.store_path(), &compact).unwrap();

        project
            .builder()
            .handle(&export_action(ExportFormat::Shell), &mut ScriptedPrompter::new(&[]))
            .unwrap();
        assert_eq!(std::fs::read_to_string(project.store_path()).unwrap(), compact);
    }

    #[test]
    fn edit_prompts_for_everything() {
        let project = TestProject::new(DB_MANIFEST);
        project
            .builder()
            .handle(
                &export_action(ExportFormat::Shell),
                &mut ScriptedPrompter::new(&["localhost", ""]),
            )
            .unwrap();

        let mut prompter = ScriptedPrompter::new(&["db.internal", ""]);
        let outcome = project.builder().handle(&Action::Edit, &mut prompter).unwrap();

        assert_eq!(
            outcome,
            Outcome::Edited {
                setting: "default".into(),
                variables: 2,
            }
        );
        assert_eq!(
            prompter.questions,
            ["DB host (DB_HOST) [localhost]: ", "DB port (DB_PORT) [5432]: "]
        );
        let saved = active_setting(&project);
        let expected: PersistedSection =
            serde_json::from_str(r#"{"db": {"host": "db.internal", "port": "5432"}}"#).unwrap();
        assert_eq!(saved, expected);
    }

    #[test]
    fn setting_override_uses_separate_values() {
        let project = TestProject::new(DB_MANIFEST);
        project
            .builder()
            .handle(
                &export_action(ExportFormat::Shell),
                &mut ScriptedPrompter::new(&["localhost", ""]),
            )
            .unwrap();

        let mut prompter = ScriptedPrompter::new(&["staging.db", "7000"]);
        let outcome = project
            .builder()
            .setting(Some("staging"))
            .handle(&export_action(ExportFormat::Shell), &mut prompter)
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Exported("DB_HOST=\"staging.db\"\nDB_PORT=\"7000\"\n".into())
        );
        let (store, _) = SettingsStore::load(&project.store_path()).unwrap();
        let entry = store.project(&project.key()).unwrap();
        assert_eq!(entry.active, "default");
        assert!(entry.settings.contains_key("staging"));
    }

    #[test]
    fn use_switches_active_setting() {
        let project = TestProject::new(DB_MANIFEST);
        let mut prompter = ScriptedPrompter::new(&[]);

        let outcome = project
            .builder()
            .handle(
                &Action::Use {
                    setting: "prod".into(),
                },
                &mut prompter,
            )
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Activated {
                setting: "prod".into()
            }
        );

        let listing = project
            .builder()
            .handle(&Action::Settings, &mut prompter)
            .unwrap();
        assert_eq!(
            listing,
            Outcome::Settings {
                active: "prod".into(),
                names: vec!["prod".into()],
            }
        );
    }

    #[test]
    fn settings_for_unknown_project() {
        let project = TestProject::new(DB_MANIFEST);
        let outcome = project
            .builder()
            .handle(&Action::Settings, &mut ScriptedPrompter::new(&[]))
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Settings {
                active: "default".into(),
                names: vec!["default".into()],
            }
        );
    }

    #[test]
    fn missing_declaration_is_not_an_error() {
        let project = TestProject::new(r#"{"name": "app"}"#);
        let outcome = project
            .builder()
            .handle(&export_action(ExportFormat::Shell), &mut ScriptedPrompter::new(&[]))
            .unwrap();
        assert!(matches!(outcome, Outcome::NoDeclaration { .. }));
        assert!(!project.store_path().exists());
    }

    #[test]
    fn invalid_declaration_aborts_without_saving() {
        let project = TestProject::new(r#"{"environment": {"ok": "Fine", "bad": null}}"#);
        let result = project.builder().handle(
            &export_action(ExportFormat::Shell),
            &mut ScriptedPrompter::new(&["value"]),
        );
        assert!(matches!(result, Err(PromptenvError::NullSection { ref name }) if name == "BAD"));
        assert!(!project.store_path().exists());
    }

    #[test]
    fn cluster_export_asks_for_target() {
        let project = TestProject::new(r#"{"environment": {"token": "Token"}}"#);
        let mut prompter = ScriptedPrompter::new(&["abc", "shop", "staging"]);
        let outcome = project
            .builder()
            .handle(&export_action(ExportFormat::Cluster), &mut prompter)
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Exported("vlc2 var set -a shop -e staging -n \"TOKEN\" -v \"abc\"\n".into())
        );
        assert_eq!(
            prompter.questions[1..],
            ["Cluster Application Name: ", "Cluster Environment: "]
        );
    }

    #[test]
    fn cluster_export_uses_given_target_and_cli() {
        let project = TestProject::new(r#"{"environment": {"token": "Token"}}"#);
        let action = Action::Export {
            format: ExportFormat::Cluster,
            cluster: ClusterTarget {
                application: Some("shop".into()),
                environment: Some("prod".into()),
            },
        };
        let outcome = project
            .builder()
            .cluster_cli("kv")
            .handle(&action, &mut ScriptedPrompter::new(&["abc"]))
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Exported("kv var set -a shop -e prod -n \"TOKEN\" -v \"abc\"\n".into())
        );
    }

    #[cfg(unix)]
    #[test]
    fn run_injects_environment() {
        let project = TestProject::new(DB_MANIFEST);
        let action = Action::Run {
            program: vec![
                "sh".into(),
                "-c".into(),
                r#"test "$DB_HOST:$DB_PORT" = "localhost:5432""#.into(),
            ],
            import: None,
        };
        let outcome = project
            .builder()
            .handle(&action, &mut ScriptedPrompter::new(&["localhost", ""]))
            .unwrap();
        assert_eq!(outcome, Outcome::Exited { code: 0 });
    }

    #[cfg(unix)]
    #[test]
    fn run_with_import_skips_store() {
        let project = TestProject::new(DB_MANIFEST);
        let env: ResolvedEnvironment = [("TOKEN".to_string(), "abc".to_string())]
            .into_iter()
            .collect();
        let blob = export::to_blob(&env).unwrap();
        let action = Action::Run {
            program: vec!["sh".into(), "-c".into(), r#"test "$TOKEN" = abc"#.into()],
            import: Some(blob),
        };

        let outcome = project
            .builder()
            .handle(&action, &mut ScriptedPrompter::new(&[]))
            .unwrap();

        assert_eq!(outcome, Outcome::Exited { code: 0 });
        assert!(!project.store_path().exists());
    }

    #[test]
    fn run_without_program_fails() {
        let project = TestProject::new(DB_MANIFEST);
        let action = Action::Run {
            program: vec![],
            import: None,
        };
        let result = project
            .builder()
            .handle(&action, &mut ScriptedPrompter::new(&[]));
        assert!(matches!(result, Err(PromptenvError::NoProgram)));
    }

    #[test]
    fn project_dir_spellings_share_settings() {
        let project = TestProject::new(r#"{"environment": {"token": "Token"}}"#);
        project
            .builder()
            .handle(
                &export_action(ExportFormat::Shell),
                &mut ScriptedPrompter::new(&["abc"]),
            )
            .unwrap();

        let dotted = project.project_dir().join(".");
        let mut trailing = project.project_dir().into_os_string();
        trailing.push("/");
        for dir in [dotted, PathBuf::from(trailing)] {
            let mut prompter = ScriptedPrompter::new(&["zzz"]);
            let outcome = Promptenv::builder()
                .project_dir(dir)
                .store_path(project.store_path())
                .handle(&export_action(ExportFormat::Shell), &mut prompter)
                .unwrap();
            assert!(prompter.questions.is_empty());
            assert_eq!(outcome, Outcome::Exported("TOKEN=\"abc\"\n".into()));
        }

        let (store, _) = SettingsStore::load(&project.store_path()).unwrap();
        assert_eq!(store.projects.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn missing_project_dir_is_normalized() {
        let builder = Promptenv::builder().project_dir("/no/such/./dir/");
        assert_eq!(
            builder.effective_project_dir().unwrap(),
            PathBuf::from("/no/such/dir")
        );
    }

    #[test]
    fn relative_project_dir_is_made_absolute() {
        let builder = Promptenv::builder().project_dir("some/app");
        let dir = builder.effective_project_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("some/app"));
    }

    #[test]
    fn config_sets_manifest_and_store() {
        let mut config = ToolConfig::builder().load().unwrap();
        config.store = Some("/data/store.json".into());
        config.manifest = "env.json".into();
        let builder = Promptenv::builder().config(&config);
        assert_eq!(
            builder.effective_store_path().unwrap(),
            PathBuf::from("/data/store.json")
        );
        assert_eq!(builder.manifest, "env.json");
    }
}
