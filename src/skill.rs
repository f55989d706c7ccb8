//! The skill record and its naming rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Context a skill asks the assistant to gather before running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
}

impl ContextConfig {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.globs.is_empty()
            && self.commands.is_empty()
            && self.urls.is_empty()
            && self.environment.is_empty()
    }
}

/// Commands to run around skill execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<String>,
}

impl HooksConfig {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

/// A named behavioral specification: description, ordered rules and
/// organizational metadata.
///
/// `extends`, `includes` and `chain` name other skills but are stored only;
/// nothing here resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

impl Skill {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Storage key for this skill.
    pub fn id(&self) -> String {
        normalize_name(&self.name)
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| same_label(t, tag))
    }

    /// Case-insensitive group membership.
    pub fn in_group(&self, group: &str) -> bool {
        self.group
            .as_deref()
            .is_some_and(|g| same_label(g, group))
    }

    /// Add tags not already present (case-insensitively). Returns the ones
    /// that were actually added, in the order given.
    pub fn add_tags<'a>(&mut self, tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut added = Vec::new();
        for tag in tags {
            if !self.has_tag(tag) {
                self.tags.push(tag.to_string());
                added.push(tag.to_string());
            }
        }
        added
    }

    /// Remove tags (case-insensitively). Returns the ones removed, with the
    /// spelling stored on the skill.
    pub fn remove_tags(&mut self, tags: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        self.tags.retain(|t| {
            let hit = tags.iter().any(|r| same_label(r, t));
            if hit {
                removed.push(t.clone());
            }
            !hit
        });
        removed
    }

    /// Rules numbered from 1, the way they are shown to users and models.
    pub fn numbered_rules(&self) -> String {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}\n", i + 1, r))
            .collect()
    }
}

/// Map a display name to its filesystem-safe storage key.
///
/// Lowercases, and replaces spaces and path separators with hyphens so a
/// name can never address a location outside the storage root. Idempotent.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            c => c,
        })
        .collect()
}

/// Case-insensitive comparison for tags and groups, using the same Unicode
/// lowercasing as the tag catalogue.
pub fn same_label(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// True when two names address the same skill.
pub fn same_skill(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Code Review"), "code-review");
        assert_eq!(normalize_name("code-review"), "code-review");
        assert_eq!(normalize_name("API  Design"), "api--design");
        assert_eq!(normalize_name("a/b\\c"), "a-b-c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["Code Review", "Ünïcode Skill", "x/../y", "already-fine", ""] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn test_same_skill() {
        assert!(same_skill("Code Review", "code-review"));
        assert!(same_skill("CODE REVIEW", "code review"));
        assert!(!same_skill("code-review", "code-reviews"));
    }

    #[test]
    fn test_tag_helpers() {
        let mut skill = Skill::new("linter", "Lints code").with_tags(["Quality"]);
        assert!(skill.has_tag("quality"));

        let added = skill.add_tags(["quality", "style", "Style"]);
        assert_eq!(added, vec!["style"]);
        assert_eq!(skill.tags, vec!["Quality", "style"]);

        let removed = skill.remove_tags(&["QUALITY".to_string(), "missing".to_string()]);
        assert_eq!(removed, vec!["Quality"]);
        assert_eq!(skill.tags, vec!["style"]);
    }

    #[test]
    fn test_group_membership() {
        let skill = Skill::new("linter", "Lints code").with_group("Development");
        assert!(skill.in_group("development"));
        assert!(!skill.in_group("security"));
        assert!(!Skill::new("x", "y").in_group(""));
    }

    #[test]
    fn test_labels_fold_non_ascii() {
        let mut skill = Skill::new("tutor", "Teaches").with_tags(["Éducation"]).with_group("Ünterricht");
        assert!(skill.has_tag("éducation"));
        assert!(skill.in_group("ÜNTERRICHT"));
        assert!(skill.add_tags(["ÉDUCATION"]).is_empty());
        assert_eq!(skill.remove_tags(&["éducation".to_string()]), vec!["Éducation"]);
        assert!(same_label("Straße", "straße"));
        assert!(!same_label("éducation", "education"));
    }

    #[test]
    fn test_numbered_rules() {
        let skill = Skill::new("x", "y").with_rules(["First", "Second"]);
        assert_eq!(skill.numbered_rules(), "1. First\n2. Second\n");
    }
}
