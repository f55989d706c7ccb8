//! Per-project workspace: which skills and groups are enabled, and variable
//! overrides for them.

use super::query;
use super::store::SkillStore;
use crate::skill::{same_label, same_skill, Skill};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Skills enabled in this workspace
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    /// Groups whose members are all enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Variable overrides keyed by skill, then variable
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Workspace for {}", name),
            ..Default::default()
        }
    }

    /// Read a workspace file. `None` when no workspace has been created.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspace file {}", path.display()))?;
        let workspace = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse workspace file {}", path.display()))?;
        Ok(Some(workspace))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize workspace")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write workspace file {}", path.display()))?;
        tracing::info!(workspace = %self.name, path = %path.display(), "Saved workspace");
        Ok(())
    }

    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|s| same_label(s, name))
    }

    pub fn add_skill(&mut self, name: &str) -> Result<()> {
        if self.has_skill(name) {
            bail!("skill '{}' is already in the workspace", name);
        }
        self.skills.push(name.to_string());
        Ok(())
    }

    pub fn remove_skill(&mut self, name: &str) -> Result<()> {
        let before = self.skills.len();
        self.skills.retain(|s| !same_label(s, name));
        if self.skills.len() == before {
            bail!("skill '{}' not in workspace", name);
        }
        Ok(())
    }

    pub fn add_group(&mut self, group: &str) -> Result<()> {
        if self.groups.iter().any(|g| same_label(g, group)) {
            bail!("group '{}' is already in the workspace", group);
        }
        self.groups.push(group.to_string());
        Ok(())
    }

    pub fn set_override(&mut self, skill: &str, variable: &str, value: &str) {
        self.overrides
            .entry(skill.to_string())
            .or_default()
            .insert(variable.to_string(), value.to_string());
    }

    /// Skills enabled directly or through a group, each once, with workspace
    /// overrides merged into their variables. Enabled names that no longer
    /// resolve to a skill are logged and skipped.
    pub fn active_skills(&self, store: &SkillStore) -> Result<Vec<Skill>> {
        let mut active: Vec<Skill> = Vec::new();

        for name in &self.skills {
            match store.get(name) {
                Ok(skill) => active.push(skill),
                Err(e) => tracing::warn!(skill = %name, error = %e, "Workspace skill unavailable"),
            }
        }

        for group in &self.groups {
            for skill in query::list_by_group(store, group)? {
                if !active.iter().any(|s| same_skill(&s.name, &skill.name)) {
                    active.push(skill);
                }
            }
        }

        for skill in &mut active {
            if let Some((_, vars)) = self
                .overrides
                .iter()
                .find(|(name, _)| same_skill(name, &skill.name))
            {
                skill
                    .variables
                    .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Ok(active)
    }
}
