#[cfg(test)]
pub mod test {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use serde_json::{Map, Value};
    use tempfile::TempDir;

    use crate::error::PromptenvError;
    use crate::prompt::Prompter;
    use crate::session::{Promptenv, PromptenvBuilder};
    use crate::types::{Resolution, WalkedLeaf};

    /// Parse a declaration tree, keeping key order.
    pub fn declaration(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    /// Pin a closure to the resolver signature so its types are inferred.
    pub fn resolver_fn<F>(f: F) -> F
    where
        F: FnMut(&WalkedLeaf) -> Result<Resolution, PromptenvError>,
    {
        f
    }

    /// Resolver answering each leaf with the next value from `answers`.
    pub fn answers(answers: &[&str]) -> impl FnMut(&WalkedLeaf) -> Result<Resolution, PromptenvError> {
        let mut queue: VecDeque<String> = answers.iter().map(|a| a.to_string()).collect();
        move |leaf: &WalkedLeaf| {
            let answer = queue
                .pop_front()
                .unwrap_or_else(|| panic!("no answer left for {}", leaf.environment_name));
            Ok(Resolution::Value(answer))
        }
    }

    /// Prompter replaying scripted answers and recording what it was asked.
    ///
    /// Running out of answers behaves like a closed stdin.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub questions: Vec<String>,
        pub warnings: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &str) -> Result<String, PromptenvError> {
            self.questions.push(question.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| PromptenvError::PromptInputClosed(question.to_string()))
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    /// A project directory with a manifest, and a store path next to it.
    pub struct TestProject {
        dir: TempDir,
    }

    impl TestProject {
        pub fn new(manifest: &str) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::create_dir(dir.path().join("project")).unwrap();
            std::fs::write(dir.path().join("project").join("package.json"), manifest).unwrap();
            Self { dir }
        }

        pub fn project_dir(&self) -> PathBuf {
            self.dir.path().join("project")
        }

        pub fn store_path(&self) -> PathBuf {
            self.dir.path().join("store.json")
        }

        /// Key of this project in the store.
        pub fn key(&self) -> String {
            let dir = self.project_dir().canonicalize().unwrap();
            dir.to_string_lossy().into_owned()
        }

        pub fn builder(&self) -> PromptenvBuilder {
            Promptenv::builder()
                .project_dir(self.project_dir())
                .store_path(self.store_path())
        }
    }

    #[test]
    fn scripted_prompter_replays_answers() {
        let mut prompter = ScriptedPrompter::new(&["a"]);
        assert_eq!(prompter.ask("Q1: ").unwrap(), "a");
        assert!(matches!(
            prompter.ask("Q2: "),
            Err(PromptenvError::PromptInputClosed(_))
        ));
        assert_eq!(prompter.questions, ["Q1: ", "Q2: "]);
    }

    #[test]
    fn test_project_layout() {
        let project = TestProject::new("{}");
        assert!(project.project_dir().join("package.json").exists());
        assert!(!project.store_path().exists());
    }
}
