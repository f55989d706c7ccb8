//! Command handlers. Each handler prints its own output and returns an
//! error for the caller to report.

pub mod ai;
pub mod config;
pub mod history;
pub mod manage;
pub mod organize;
pub mod sync;
pub mod template;
pub mod transfer;
pub mod workspace;

use crate::config::Config;
use crate::generator::Generator;
use crate::skill::Skill;
use crate::skills::{SkillStore, VersionHistory};
use crate::vendors::build_provider;
use anyhow::{bail, Context, Result};
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// Everything a command needs, resolved once from configuration.
pub struct App {
    pub config: Config,
    pub store: SkillStore,
    pub history: VersionHistory,
    pub workspace_file: PathBuf,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = SkillStore::new(config.storage.skills_dir());
        let history = VersionHistory::new(config.storage.history_dir());
        let workspace_file = config.storage.workspace_file();
        Self {
            config,
            store,
            history,
            workspace_file,
        }
    }

    /// Generator for the active provider, or an error telling the user how
    /// to configure one.
    pub fn generator(&self) -> Result<Generator> {
        let kind = self.config.active_provider();
        let generator = Generator::new(build_provider(self.config.provider_settings(kind)));
        if !generator.is_available() {
            bail!(
                "no AI provider configured. Set a key with:\n\n  skillforge config set {}-api-key\n\nor choose another provider with 'skillforge config set provider <name>'",
                kind
            );
        }
        Ok(generator)
    }

    /// Load a skill, mapping a missing one to the message users see.
    pub(crate) fn load(&self, name: &str) -> Result<Skill> {
        match self.store.get(name) {
            Ok(skill) => Ok(skill),
            Err(e) if e.is_not_found() => bail!("skill '{}' not found", name),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot the current document before a mutation. A failed snapshot
    /// is reported but does not block the edit.
    pub(crate) fn snapshot(&self, name: &str) {
        match self.history.save_version(&self.store, name) {
            Ok(snapshot) => tracing::debug!(skill = %name, version = snapshot.version, "Snapshot saved"),
            Err(e) => {
                tracing::warn!(skill = %name, error = %e, "Could not save version");
                eprintln!("Warning: could not save version history: {}", e);
            }
        }
    }

    /// Write an edited record, moving its history along when it was renamed.
    /// Nothing is written when the new name already has history left
    /// behind by a removed skill.
    pub(crate) fn save_edit(&self, name: &str, skill: &Skill) -> Result<()> {
        if let Err(e) = self.history.needs_move(name, &skill.name) {
            return Err(e).with_context(|| {
                format!(
                    "version history for '{}' already exists at {}; move it aside before renaming",
                    skill.name,
                    self.history.root().display()
                )
            });
        }
        self.store.edit(name, skill)?;
        self.history.rename(name, &skill.name)?;
        Ok(())
    }
}

/// Read one line from the terminal. `None` on Ctrl-C, Ctrl-D or an empty
/// answer.
pub(crate) fn prompt(message: &str) -> Result<Option<String>> {
    let mut editor = rustyline::DefaultEditor::new()?;
    match editor.readline(message) {
        Ok(line) => {
            let line = line.trim();
            Ok((!line.is_empty()).then(|| line.to_string()))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn print_rules(rules: &[String], indent: &str) {
    for (i, rule) in rules.iter().enumerate() {
        println!("{}{}. {}", indent, i + 1, rule);
    }
}

/// Shorten to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::App;
    use crate::config::{Config, StorageConfig};
    use tempfile::TempDir;

    /// An app rooted in a temporary directory.
    pub fn app() -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                skills_dir: Some(tmp.path().join("skills")),
                history_dir: None,
                workspace_file: Some(tmp.path().join("workspace.yaml")),
            },
            ..Default::default()
        };
        (tmp, App::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::ProviderKind;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("ünïcødé text", 6), "ünï...");
    }

    #[test]
    fn test_history_follows_skills_dir() {
        let (tmp, app) = testing::app();
        assert_eq!(app.store.root(), tmp.path().join("skills"));
        assert_eq!(app.history.root(), tmp.path().join("skills").join(".history"));
    }

    #[test]
    fn test_generator_requires_key() {
        let (_tmp, mut app) = testing::app();
        app.config.provider = Some(ProviderKind::Anthropic);
        let err = app.generator().err().unwrap();
        assert!(err.to_string().contains("anthropic-api-key"));
    }

    #[test]
    fn test_save_edit_moves_history() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("old", "Old skill")).unwrap();
        app.snapshot("old");

        let renamed = Skill::new("new", "Old skill");
        app.save_edit("old", &renamed).unwrap();

        assert!(app.store.exists("new"));
        assert_eq!(app.history.list_versions("new").unwrap().len(), 1);
        assert!(app.history.list_versions("old").unwrap().is_empty());
    }

    #[test]
    fn test_save_edit_onto_leftover_history_changes_nothing() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("b", "Removed skill")).unwrap();
        app.snapshot("b");
        app.store.remove("b").unwrap();

        app.store.add(&Skill::new("a", "Live skill")).unwrap();
        app.snapshot("a");

        let err = app.save_edit("a", &Skill::new("b", "Live skill")).unwrap_err();
        assert!(err.to_string().contains("version history for 'b'"));

        assert!(app.store.exists("a"));
        assert!(!app.store.exists("b"));
        assert_eq!(app.history.list_versions("a").unwrap().len(), 1);
        assert_eq!(app.history.list_versions("b").unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_skill() {
        let (_tmp, app) = testing::app();
        let err = app.load("ghost").unwrap_err();
        assert_eq!(err.to_string(), "skill 'ghost' not found");
    }
}
