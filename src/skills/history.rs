//! Linear version history of skill documents.
//!
//! Snapshots live at `<root>/<normalized>/SKILL.v<N>.md`. Each file holds a
//! single header line recording the version and save time, followed by the
//! exact bytes of the document as it was when saved.

use super::store::SkillStore;
use crate::error::{Result, SkillError};
use crate::skill::normalize_name;
use chrono::{DateTime, SubsecRound, Utc};
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_PREFIX: &str = "SKILL.v";
const SNAPSHOT_SUFFIX: &str = ".md";

/// One saved copy of a skill document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSnapshot {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    /// Document bytes without the header line
    pub content: String,
}

/// A single line-level difference from [`compare_lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    /// Line present only on the left side at this index
    Removed(String),
    /// Line present only on the right side at this index
    Added(String),
}

/// Snapshot storage rooted at a directory separate from the skill store.
#[derive(Debug, Clone)]
pub struct VersionHistory {
    root: PathBuf,
}

impl VersionHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn skill_dir(&self, name: &str) -> PathBuf {
        self.root.join(normalize_name(name))
    }

    fn snapshot_path(&self, name: &str, version: u32) -> PathBuf {
        self.skill_dir(name)
            .join(format!("{}{}{}", SNAPSHOT_PREFIX, version, SNAPSHOT_SUFFIX))
    }

    /// Copy the skill's current document into a new snapshot.
    pub fn save_version(&self, store: &SkillStore, name: &str) -> Result<VersionSnapshot> {
        let content = store.read_raw(name)?;

        let dir = self.skill_dir(name);
        fs::create_dir_all(&dir).map_err(|e| SkillError::io(name, &dir, e))?;

        let version = match self.latest_version(name)? {
            None => 1,
            Some(latest) => latest.checked_add(1).ok_or_else(|| SkillError::VersionLimit {
                name: name.to_string(),
            })?,
        };
        let timestamp = Utc::now().trunc_subsecs(0);
        let path = self.snapshot_path(name, version);

        let mut data = header(version, &timestamp);
        data.push_str(&content);
        fs::write(&path, data).map_err(|e| SkillError::io(name, &path, e))?;

        tracing::info!(skill = %name, version, "Saved skill version");
        Ok(VersionSnapshot {
            version,
            timestamp,
            content,
        })
    }

    /// All snapshots for a skill, newest first. Empty when none exist.
    pub fn list_versions(&self, name: &str) -> Result<Vec<VersionSnapshot>> {
        let mut versions = Vec::new();
        for version in self.version_numbers(name)? {
            versions.push(self.get_version(name, version)?);
        }
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    /// A single snapshot.
    pub fn get_version(&self, name: &str, version: u32) -> Result<VersionSnapshot> {
        let path = self.snapshot_path(name, version);
        if !path.is_file() {
            return Err(SkillError::VersionNotFound {
                name: name.to_string(),
                version,
            });
        }

        let data = fs::read_to_string(&path).map_err(|e| SkillError::io(name, &path, e))?;
        let (saved_at, content) = split_header(&data);
        let timestamp = match saved_at {
            Some(ts) => ts,
            None => modified_time(&path).map_err(|e| SkillError::io(name, &path, e))?,
        };

        Ok(VersionSnapshot {
            version,
            timestamp,
            content: content.to_string(),
        })
    }

    /// Restore a snapshot as the current document.
    ///
    /// The current document is snapshotted first; if that fails nothing is
    /// overwritten. Returns the version number of that safety snapshot.
    pub fn rollback(&self, store: &SkillStore, name: &str, version: u32) -> Result<u32> {
        let target = self.get_version(name, version)?;
        let backup = self.save_version(store, name)?;

        store.write_raw(name, &target.content)?;
        tracing::info!(
            skill = %name,
            restored = version,
            backup = backup.version,
            "Rolled back skill"
        );
        Ok(backup.version)
    }

    /// Contents of two versions for comparison. Version 0 is the current
    /// document.
    pub fn diff(&self, store: &SkillStore, name: &str, v1: u32, v2: u32) -> Result<(String, String)> {
        let left = self.content_at(store, name, v1)?;
        let right = self.content_at(store, name, v2)?;
        Ok((left, right))
    }

    /// Move a skill's snapshots to follow a rename. A skill with no history
    /// is left alone.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        if !self.needs_move(old, new)? {
            return Ok(());
        }
        let from = self.skill_dir(old);
        let to = self.skill_dir(new);
        fs::rename(&from, &to).map_err(|e| SkillError::io(old, &from, e))?;
        tracing::debug!(from = %old, to = %new, "Moved skill history");
        Ok(())
    }

    /// Whether [`rename`](Self::rename) would move anything, failing with
    /// `AlreadyExists` when `new` already has snapshots of its own. Lets a
    /// caller check before it renames the skill itself.
    pub fn needs_move(&self, old: &str, new: &str) -> Result<bool> {
        let from = self.skill_dir(old);
        let to = self.skill_dir(new);
        if from == to || !from.is_dir() {
            return Ok(false);
        }
        if to.exists() {
            return Err(SkillError::AlreadyExists {
                name: new.to_string(),
            });
        }
        Ok(true)
    }

    fn content_at(&self, store: &SkillStore, name: &str, version: u32) -> Result<String> {
        if version == 0 {
            store.read_raw(name)
        } else {
            Ok(self.get_version(name, version)?.content)
        }
    }

    fn latest_version(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.version_numbers(name)?.into_iter().max())
    }

    fn version_numbers(&self, name: &str) -> Result<Vec<u32>> {
        let dir = self.skill_dir(name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| SkillError::io(name, &dir, e))?;
        Ok(entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| parse_version(e.file_name().to_str()?))
            .collect())
    }
}

/// Naive line comparison: line `i` of `a` is compared with line `i` of `b`,
/// with no alignment. Each differing non-empty line yields a change.
pub fn compare_lines(a: &str, b: &str) -> Vec<LineChange> {
    let left: Vec<&str> = a.split('\n').collect();
    let right: Vec<&str> = b.split('\n').collect();
    let len = left.len().max(right.len());

    let mut changes = Vec::new();
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or("");
        let r = right.get(i).copied().unwrap_or("");
        if l == r {
            continue;
        }
        if !l.is_empty() {
            changes.push(LineChange::Removed(l.to_string()));
        }
        if !r.is_empty() {
            changes.push(LineChange::Added(r.to_string()));
        }
    }
    changes
}

fn header(version: u32, timestamp: &DateTime<Utc>) -> String {
    format!(
        "<!-- Version {} saved at {} -->\n",
        version,
        timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}

/// Separate the header line from the document bytes. Files without a header
/// are returned whole.
fn split_header(data: &str) -> (Option<DateTime<Utc>>, &str) {
    let Some(rest) = data.strip_prefix("<!--") else {
        return (None, data);
    };
    let Some(end) = rest.find("-->\n") else {
        return (None, data);
    };

    let saved_at = rest[..end]
        .split_once(" saved at ")
        .and_then(|(_, ts)| DateTime::parse_from_rfc3339(ts.trim()).ok())
        .map(|ts| ts.with_timezone(&Utc));

    (saved_at, &rest[end + 4..])
}

fn parse_version(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_SUFFIX)?
        .parse()
        .ok()
}

fn modified_time(path: &Path) -> std::io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}
