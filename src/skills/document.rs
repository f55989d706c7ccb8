//! SKILL.md codec.
//!
//! A skill document is a YAML metadata block between `---` delimiter lines,
//! followed by a markdown body: a `# <name>` heading, the description and an
//! optional `## Rules` section of `- ` list items.
//!
//! Decoding scans the body line by line. Rule or description text that itself
//! starts a line with `## ` or `- ` does not survive a round trip; the format
//! has no escaping.

use crate::error::{Result, SkillError};
use crate::skill::{ContextConfig, HooksConfig, Skill};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";
const RULES_HEADING: &str = "## Rules";

/// Metadata block of a SKILL.md file: every record field except the rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Frontmatter {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<ContextConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hooks: Option<HooksConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    chain: Vec<String>,
}

impl From<&Skill> for Frontmatter {
    fn from(skill: &Skill) -> Self {
        Self {
            name: skill.name.clone(),
            description: skill.description.clone(),
            extends: skill.extends.clone(),
            includes: skill.includes.clone(),
            tags: skill.tags.clone(),
            group: skill.group.clone(),
            template: skill.template.clone(),
            variables: skill.variables.clone(),
            author: skill.author.clone(),
            version: skill.version.clone(),
            output_format: skill.output_format.clone(),
            context: skill.context.clone(),
            hooks: skill.hooks.clone(),
            chain: skill.chain.clone(),
        }
    }
}

impl Frontmatter {
    fn into_skill(self, rules: Vec<String>) -> Skill {
        Skill {
            name: self.name,
            description: self.description,
            rules,
            extends: self.extends,
            includes: self.includes,
            tags: self.tags,
            group: self.group,
            template: self.template,
            variables: self.variables,
            author: self.author,
            version: self.version,
            output_format: self.output_format,
            context: self.context,
            hooks: self.hooks,
            chain: self.chain,
        }
    }
}

/// Render a skill as a SKILL.md document.
pub fn encode(skill: &Skill) -> Result<String> {
    let yaml = serde_yaml::to_string(&Frontmatter::from(skill)).map_err(|source| {
        SkillError::MalformedMetadata {
            name: skill.name.clone(),
            source,
        }
    })?;
    // The block is framed by our own delimiters.
    let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);

    let mut out = String::with_capacity(yaml.len() + 256);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push_str("\n\n");

    out.push_str(&format!("# {}\n\n", skill.name));
    out.push_str(&format!("{}\n\n", skill.description));

    if !skill.rules.is_empty() {
        out.push_str(RULES_HEADING);
        out.push_str("\n\n");
        for rule in &skill.rules {
            out.push_str(&format!("- {}\n", rule));
        }
    }

    Ok(out)
}

/// Parse a SKILL.md document.
///
/// Errors carry an empty skill name; callers that know where the text came
/// from attach it with [`SkillError::with_name`].
pub fn decode(content: &str) -> Result<Skill> {
    let (yaml, body) = split_document(content)?;

    let frontmatter: Frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|source| SkillError::MalformedMetadata {
            name: String::new(),
            source,
        })?
    };

    Ok(frontmatter.into_skill(parse_rules(body)))
}

/// True when the text opens with a metadata delimiter line.
pub fn has_metadata_block(content: &str) -> bool {
    let first = content.split('\n').next().unwrap_or("");
    first.trim_end_matches('\r') == DELIMITER
}

/// The markdown that follows the metadata block.
pub fn body(content: &str) -> Result<&str> {
    Ok(split_document(content)?.1)
}

/// Split a document into its metadata text and markdown body.
fn split_document(content: &str) -> Result<(&str, &str)> {
    if !has_metadata_block(content) {
        return Err(malformed("document must start with a '---' metadata block"));
    }

    let rest = match content.find('\n') {
        Some(idx) => &content[idx + 1..],
        None => "",
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(|c| c == '\r' || c == '\n') == DELIMITER {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(malformed("metadata block is never closed with '---'"))
}

/// Collect rules from the `## Rules` section of a markdown body.
///
/// The section opens at a line that is exactly `## Rules` and closes at the
/// next line starting with `## `. Inside it, each `- ` line is one rule.
pub fn parse_rules(body: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut in_rules = false;

    for line in body.lines() {
        if !in_rules {
            if line.trim_end() == RULES_HEADING {
                in_rules = true;
            }
            continue;
        }

        if line.starts_with("## ") {
            break;
        }

        if let Some(rule) = line.strip_prefix("- ") {
            let rule = rule.trim();
            if !rule.is_empty() {
                rules.push(rule.to_string());
            }
        }
    }

    rules
}

fn malformed(reason: &str) -> SkillError {
    SkillError::MalformedDocument {
        name: String::new(),
        reason: reason.to_string(),
    }
}
