//! Import and export of skills in external formats.
//!
//! JSON and YAML carry the full record. Markdown is the native SKILL.md
//! document, with a looser reading for hand-written markdown that has no
//! metadata block.

use super::document;
use crate::error::{Result, SkillError};
use crate::skill::Skill;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+").expect("valid numbered list pattern"));

/// A serialization a skill can be exported to or imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Markdown,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Markdown => "markdown",
        }
    }

    /// Conventional file extension for exports
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Markdown => "md",
        }
    }

    /// Detect a format from a file name, path or URL by its extension.
    pub fn from_source(source: &str) -> Option<Format> {
        let ext = Path::new(source).extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "markdown" | "md" => Ok(Format::Markdown),
            other => Err(SkillError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Serialize a skill.
pub fn export(skill: &Skill, format: Format) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(skill).map_err(|e| payload_error(format, e)),
        Format::Yaml => serde_yaml::to_string(skill).map_err(|e| payload_error(format, e)),
        Format::Markdown => document::encode(skill),
    }
}

/// Deserialize a skill.
pub fn import(content: &str, format: Format) -> Result<Skill> {
    let skill = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| payload_error(format, e))?,
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| payload_error(format, e))?,
        Format::Markdown => import_markdown(content)?,
    };
    tracing::debug!(format = %format, skill = %skill.name, "Imported skill payload");
    Ok(skill)
}

fn import_markdown(content: &str) -> Result<Skill> {
    if document::has_metadata_block(content) {
        let mut skill = document::decode(content)?;
        if skill.rules.is_empty() {
            skill.rules = extract_rules(document::body(content)?);
        }
        return Ok(skill);
    }

    Ok(Skill {
        name: first_heading(content).unwrap_or_default(),
        rules: extract_rules(content),
        ..Default::default()
    })
}

fn first_heading(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|name| name.trim().to_string())
}

/// Pull rules out of free-form markdown.
///
/// Reads list items from a `## Rules` or `## Instructions` section when one
/// exists (bullets and numbered items). Otherwise every bullet item in the
/// document counts as a rule.
pub fn extract_rules(content: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut in_section = false;

    for line in content.lines().map(str::trim) {
        let lower = line.to_lowercase();
        if lower.starts_with("## rules") || lower.starts_with("## instructions") {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.starts_with("## ") {
            break;
        }

        if let Some(item) = bullet_item(line) {
            rules.push(item.to_string());
        } else if let Some(m) = NUMBERED_ITEM.find(line) {
            rules.push(line[m.end()..].to_string());
        }
    }

    if rules.is_empty() {
        rules = content
            .lines()
            .filter_map(|line| bullet_item(line.trim()))
            .map(str::to_string)
            .collect();
    }

    rules.retain(|r| !r.trim().is_empty());
    rules
}

fn bullet_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn payload_error(format: Format, err: impl fmt::Display) -> SkillError {
    SkillError::MalformedPayload {
        format: format.to_string(),
        reason: err.to_string(),
    }
}
