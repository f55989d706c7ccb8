//! Directory-backed skill store.
//!
//! Each skill lives in its own subdirectory of the store root, named by the
//! normalized skill name, holding a single `SKILL.md` document.

use super::document;
use crate::error::{Result, SkillError};
use crate::skill::{normalize_name, Skill};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the current document inside a skill directory
pub const SKILL_FILE: &str = "SKILL.md";

/// Directory names under the root that never hold a skill: the default
/// history location and git metadata.
pub const RESERVED_DIRS: &[&str] = &[".history", ".git"];

/// Result of a bulk listing: the skills that loaded and the ones that did not.
#[derive(Debug, Default)]
pub struct ListOutcome {
    pub skills: Vec<Skill>,
    /// Directory name and error for every skill that failed to load
    pub failures: Vec<(String, SkillError)>,
}

impl ListOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// CRUD over a directory of skills.
#[derive(Debug, Clone)]
pub struct SkillStore {
    root: PathBuf,
}

impl SkillStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a skill
    pub fn skill_dir(&self, name: &str) -> PathBuf {
        self.root.join(normalize_name(name))
    }

    /// Path of a skill's current document
    pub fn skill_path(&self, name: &str) -> PathBuf {
        self.skill_dir(name).join(SKILL_FILE)
    }

    /// True when a current document exists for the name
    pub fn exists(&self, name: &str) -> bool {
        self.skill_path(name).is_file()
    }

    /// Create a new skill. Fails if the normalized name is already taken.
    pub fn add(&self, skill: &Skill) -> Result<()> {
        check_name(&skill.name)?;
        fs::create_dir_all(&self.root).map_err(|e| SkillError::io(&skill.name, &self.root, e))?;

        let dir = self.skill_dir(&skill.name);
        if dir.exists() {
            return Err(SkillError::AlreadyExists {
                name: skill.name.clone(),
            });
        }

        fs::create_dir(&dir).map_err(|e| SkillError::io(&skill.name, &dir, e))?;
        self.save(skill)?;

        tracing::info!(skill = %skill.name, path = %dir.display(), "Added skill");
        Ok(())
    }

    /// Load and decode a skill.
    pub fn get(&self, name: &str) -> Result<Skill> {
        let content = self.read_raw(name)?;
        let skill = document::decode(&content).map_err(|e| e.with_name(name))?;
        tracing::debug!(skill = %name, "Loaded skill");
        Ok(skill)
    }

    /// Replace a skill's content, renaming its directory first when the new
    /// record's name maps to a different key.
    ///
    /// The rename and the following write are not atomic together: a crash
    /// in between leaves the skill under the new key with its old content.
    pub fn edit(&self, name: &str, skill: &Skill) -> Result<()> {
        let dir = self.skill_dir(name);
        if !dir.is_dir() {
            return Err(SkillError::NotFound {
                name: name.to_string(),
            });
        }

        check_name(&skill.name)?;
        let new_dir = self.skill_dir(&skill.name);
        if new_dir != dir {
            if new_dir.exists() {
                return Err(SkillError::AlreadyExists {
                    name: skill.name.clone(),
                });
            }
            fs::rename(&dir, &new_dir).map_err(|e| SkillError::io(name, &dir, e))?;
            tracing::info!(from = %name, to = %skill.name, "Renamed skill");
        }

        self.save(skill)?;
        tracing::info!(skill = %skill.name, "Updated skill");
        Ok(())
    }

    /// Delete a skill directory and everything in it.
    pub fn remove(&self, name: &str) -> Result<()> {
        let dir = self.skill_dir(name);
        if !dir.is_dir() {
            return Err(SkillError::NotFound {
                name: name.to_string(),
            });
        }

        fs::remove_dir_all(&dir).map_err(|e| SkillError::io(name, &dir, e))?;
        tracing::info!(skill = %name, "Removed skill");
        Ok(())
    }

    /// Load every skill under the root.
    ///
    /// Directories without a document and the reserved history and git
    /// directories are skipped. Decode failures are collected, not
    /// returned as an error, so one corrupt skill does not hide the rest.
    pub fn list(&self) -> Result<ListOutcome> {
        let mut outcome = ListOutcome::default();
        if !self.root.exists() {
            return Ok(outcome);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| SkillError::io("*", &self.root, e))?;

        let mut dirs: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let name = entry.file_name().to_str()?.to_string();
                (path.is_dir() && !RESERVED_DIRS.contains(&name.as_str())).then_some((name, path))
            })
            .collect();
        dirs.sort();

        for (dir_name, path) in dirs {
            let skill_md = path.join(SKILL_FILE);
            if !skill_md.is_file() {
                continue;
            }

            match fs::read_to_string(&skill_md)
                .map_err(|e| SkillError::io(&dir_name, &skill_md, e))
                .and_then(|content| document::decode(&content).map_err(|e| e.with_name(&dir_name)))
            {
                Ok(skill) => outcome.skills.push(skill),
                Err(e) => {
                    tracing::debug!(skill = %dir_name, error = %e, "Skipping unreadable skill");
                    outcome.failures.push((dir_name, e));
                }
            }
        }

        Ok(outcome)
    }

    /// Raw bytes of a skill's current document.
    pub fn read_raw(&self, name: &str) -> Result<String> {
        let path = self.skill_path(name);
        if !path.is_file() {
            return Err(SkillError::NotFound {
                name: name.to_string(),
            });
        }
        fs::read_to_string(&path).map_err(|e| SkillError::io(name, &path, e))
    }

    /// Overwrite a skill's current document with raw content.
    pub fn write_raw(&self, name: &str, content: &str) -> Result<()> {
        let dir = self.skill_dir(name);
        if !dir.is_dir() {
            return Err(SkillError::NotFound {
                name: name.to_string(),
            });
        }
        write_document(name, &dir.join(SKILL_FILE), content)
    }

    fn save(&self, skill: &Skill) -> Result<()> {
        let content = document::encode(skill)?;
        write_document(&skill.name, &self.skill_path(&skill.name), &content)
    }
}

/// Reject names whose storage key is empty, a relative path component or
/// one of the reserved directories.
fn check_name(name: &str) -> Result<()> {
    let key = normalize_name(name.trim());
    let reason = if key.is_empty() {
        "name cannot be empty"
    } else if key.chars().all(|c| c == '.') {
        "name cannot consist only of dots"
    } else if RESERVED_DIRS.contains(&key.as_str()) {
        "name is reserved"
    } else {
        return Ok(());
    };
    Err(SkillError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Write through a sibling temp file and rename it over the target, so a
/// reader never sees a half-written document.
fn write_document(name: &str, path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("md.tmp");
    fs::write(&tmp, content).map_err(|e| SkillError::io(name, &tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| SkillError::io(name, path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SkillStore) {
        let tmp = TempDir::new().unwrap();
        let store = SkillStore::new(tmp.path().join("skills"));
        (tmp, store)
    }

    #[test]
    fn test_add_then_get() {
        let (_tmp, store) = store();
        let skill = Skill::new("Code Review", "Reviews code").with_rules(["Check nulls"]);
        store.add(&skill).unwrap();

        let loaded = store.get("code-review").unwrap();
        assert_eq!(loaded.name, "Code Review");
        assert_eq!(loaded.description, "Reviews code");
        assert_eq!(loaded.rules, vec!["Check nulls"]);
        assert_eq!(loaded, skill);

        assert!(store.root().join("code-review").join(SKILL_FILE).is_file());
        assert_eq!(store.get("CODE REVIEW").unwrap(), skill);
    }

    #[test]
    fn test_add_creates_root() {
        let (_tmp, store) = store();
        assert!(!store.root().exists());
        store.add(&Skill::new("a", "b")).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_add_duplicate() {
        let (_tmp, store) = store();
        store.add(&Skill::new("Code Review", "one")).unwrap();
        let err = store.add(&Skill::new("code-review", "two")).unwrap_err();
        assert!(matches!(err, SkillError::AlreadyExists { .. }));
        assert_eq!(store.get("code-review").unwrap().description, "one");
    }

    #[test]
    fn test_missing_skill_is_not_found() {
        let (_tmp, store) = store();
        let skill = Skill::new("ghost", "boo");
        assert!(matches!(store.get("ghost"), Err(SkillError::NotFound { .. })));
        assert!(matches!(store.edit("ghost", &skill), Err(SkillError::NotFound { .. })));
        assert!(matches!(store.remove("ghost"), Err(SkillError::NotFound { .. })));
    }

    #[test]
    fn test_edit_in_place() {
        let (_tmp, store) = store();
        store.add(&Skill::new("linter", "old")).unwrap();

        let updated = Skill::new("Linter", "new").with_rules(["Be strict about style"]);
        store.edit("linter", &updated).unwrap();

        assert_eq!(store.get("linter").unwrap(), updated);
    }

    #[test]
    fn test_edit_renames_directory() {
        let (_tmp, store) = store();
        store.add(&Skill::new("old name", "desc")).unwrap();

        let renamed = Skill::new("New Name", "desc");
        store.edit("old name", &renamed).unwrap();

        assert!(!store.skill_dir("old name").exists());
        assert_eq!(store.get("new-name").unwrap(), renamed);
    }

    #[test]
    fn test_edit_rename_onto_existing() {
        let (_tmp, store) = store();
        store.add(&Skill::new("a", "first")).unwrap();
        store.add(&Skill::new("b", "second")).unwrap();

        let err = store.edit("a", &Skill::new("b", "clobber")).unwrap_err();
        assert!(matches!(err, SkillError::AlreadyExists { .. }));
        assert_eq!(store.get("b").unwrap().description, "second");
        assert_eq!(store.get("a").unwrap().description, "first");
    }

    #[test]
    fn test_remove() {
        let (_tmp, store) = store();
        store.add(&Skill::new("temp", "gone soon")).unwrap();
        store.remove("Temp").unwrap();
        assert!(!store.exists("temp"));
        assert!(matches!(store.get("temp"), Err(SkillError::NotFound { .. })));
    }

    #[test]
    fn test_list_collects_failures() {
        let (_tmp, store) = store();
        store.add(&Skill::new("good", "fine")).unwrap();
        store.add(&Skill::new("also good", "fine")).unwrap();

        let broken = store.root().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(SKILL_FILE), "no frontmatter here").unwrap();

        let outcome = store.list().unwrap();
        let names: Vec<_> = outcome.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["also good", "good"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "broken");
        assert!(outcome.failures[0].1.is_malformed());
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_dot_prefixed_skill_is_listed() {
        let (_tmp, store) = store();
        let skill = Skill::new(".NET Tips", "Idioms for .NET code").with_tags(["dotnet"]);
        store.add(&skill).unwrap();

        let outcome = store.list().unwrap();
        assert_eq!(outcome.skills, vec![skill]);
        assert!(outcome.is_clean());
        assert_eq!(crate::skills::query::list_by_tag(&store, "dotnet").unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_unusable_names() {
        let (_tmp, store) = store();
        for name in ["", "   ", ".", "..", ".history", ".GIT"] {
            let err = store.add(&Skill::new(name, "desc")).unwrap_err();
            assert!(matches!(err, SkillError::InvalidName { .. }), "{:?}", name);
        }
        assert!(!store.root().exists());

        store.add(&Skill::new("kept", "desc")).unwrap();
        let err = store.edit("kept", &Skill::new("..", "desc")).unwrap_err();
        assert!(matches!(err, SkillError::InvalidName { .. }));
        assert!(store.exists("kept"));
    }

    #[test]
    fn test_list_skips_reserved_and_empty_dirs() {
        let (_tmp, store) = store();
        store.add(&Skill::new("real", "skill")).unwrap();

        let history = store.root().join(".history").join("real");
        fs::create_dir_all(&history).unwrap();
        fs::write(history.join(SKILL_FILE), "---\nname: shadow\n---\n").unwrap();
        let git = store.root().join(".git");
        fs::create_dir_all(&git).unwrap();
        fs::write(git.join(SKILL_FILE), "---\nname: shadow\n---\n").unwrap();
        fs::create_dir_all(store.root().join("no-document")).unwrap();
        fs::write(store.root().join("stray.md"), "loose file").unwrap();

        let outcome = store.list().unwrap();
        assert_eq!(outcome.skills.len(), 1);
        assert_eq!(outcome.skills[0].name, "real");
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_list_missing_root() {
        let (_tmp, store) = store();
        let outcome = store.list().unwrap();
        assert!(outcome.skills.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_raw_round_trip() {
        let (_tmp, store) = store();
        store.add(&Skill::new("raw", "bytes")).unwrap();

        let original = store.read_raw("raw").unwrap();
        store.write_raw("raw", "---\nname: raw\ndescription: replaced\n---\n").unwrap();
        assert_eq!(store.get("raw").unwrap().description, "replaced");
        assert_ne!(store.read_raw("raw").unwrap(), original);
        assert!(!store.skill_dir("raw").join("SKILL.md.tmp").exists());
    }
}
