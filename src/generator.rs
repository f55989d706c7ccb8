//! Prompt construction and response parsing for AI-assisted skill work.

use crate::skill::Skill;
use crate::vendors::{Provider, ProviderError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not parse model response as JSON: {source}")]
    Unparsable {
        /// Cleaned model output, for showing to the user
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A drafted skill body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Review of an existing skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Improvement {
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub improved_rules: Vec<String>,
    #[serde(default)]
    pub improved_description: String,
}

impl Improvement {
    /// Apply suggested rules and description. Returns false when there was
    /// nothing to apply.
    pub fn apply_to(&self, skill: &mut Skill) -> bool {
        if self.improved_rules.is_empty() {
            return false;
        }
        skill.rules = self.improved_rules.clone();
        if !self.improved_description.trim().is_empty() {
            skill.description = self.improved_description.clone();
        }
        true
    }

    /// Suggested description when it differs from the current one
    pub fn new_description<'a>(&'a self, skill: &Skill) -> Option<&'a str> {
        let d = self.improved_description.trim();
        (!d.is_empty() && d != skill.description).then_some(d)
    }
}

pub struct Generator {
    provider: Box<dyn Provider>,
}

impl Generator {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_configured()
    }

    /// Draft a description and rules for a new skill from a short intent.
    pub fn draft_skill(&self, name: &str, intent: &str) -> Result<Skill, GeneratorError> {
        let draft: Draft = self.generate_json(&draft_prompt(name, intent))?;
        Ok(Skill::new(name, draft.description).with_rules(draft.rules))
    }

    pub fn improve(&self, skill: &Skill) -> Result<Improvement, GeneratorError> {
        self.generate_json(&improve_prompt(skill))
    }

    pub fn explain(&self, skill: &Skill, verbose: bool) -> Result<String, GeneratorError> {
        let text = self.provider.generate(&explain_prompt(skill, verbose))?;
        Ok(text.trim().to_string())
    }

    /// Run a user request with the skill loaded as context.
    pub fn run_test(&self, skill: &Skill, request: &str) -> Result<String, GeneratorError> {
        let prompt = format!("{}\n\nUser request:\n{}", skill_context(skill), request);
        Ok(self.provider.generate(&prompt)?)
    }

    fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GeneratorError> {
        tracing::debug!(provider = %self.provider_name(), "Requesting structured response");
        let response = self.provider.generate(prompt)?;
        parse_json(&response)
    }
}

/// The context block a skill contributes to a conversation.
pub fn skill_context(skill: &Skill) -> String {
    let mut context = format!("You are operating with the '{}' skill.\n\n", skill.name);
    context.push_str(&format!("Description: {}\n\n", skill.description));
    if !skill.rules.is_empty() {
        context.push_str("Rules you must follow:\n");
        context.push_str(&skill.numbered_rules());
    }
    context
}

/// Strip a surrounding markdown code fence from model output.
pub fn strip_code_fence(response: &str) -> &str {
    let text = response.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, GeneratorError> {
    let cleaned = strip_code_fence(response);
    serde_json::from_str(cleaned).map_err(|source| GeneratorError::Unparsable {
        raw: cleaned.to_string(),
        source,
    })
}

fn draft_prompt(name: &str, intent: &str) -> String {
    format!(
        r#"You are designing a reusable skill: a declarative set of rules that shapes how an AI assistant reasons in one domain.

Skill name: "{name}"
Intent: {intent}

Write 8-12 rules. Each rule must be:
- Falsifiable: it is possible to break it
- Specific: a reasonable engineer could disagree with it
- Actionable: phrased as a directive ("Always...", "Never...", "When X, do Y...")
- Self-contained and specific to this domain

Cover the core judgments of the domain, hard constraints, concrete anti-patterns, how to weigh tradeoffs, edge cases, and when to ask for clarification instead of assuming.

Write a description of 2-4 sentences that lets a reader decide whether to apply the skill without reading the rules. No marketing language and no hedging.

Respond with JSON only, no markdown and no code fences:
{{
  "description": "...",
  "rules": ["rule 1", "rule 2", "..."]
}}"#
    )
}

fn improve_prompt(skill: &Skill) -> String {
    format!(
        r#"Analyze this skill definition and suggest improvements.

Skill name: {}
Description: {}

Current rules:
{}
Provide:
1. An overall assessment (1-2 sentences)
2. Specific issues with the existing rules, if any
3. A complete improved rule list
4. Missing edge cases, folded into the improved rules

Respond with JSON only:
{{
  "assessment": "...",
  "issues": ["issue 1", "issue 2"],
  "improved_rules": ["rule 1", "rule 2"],
  "improved_description": "better description, or an empty string"
}}"#,
        skill.name,
        skill.description,
        skill.numbered_rules()
    )
}

fn explain_prompt(skill: &Skill, verbose: bool) -> String {
    let extras = if verbose {
        "\nAlso include:\n- Example scenarios where this skill applies\n- Edge cases the skill handles\n- How it might interact with other skills\n"
    } else {
        ""
    };
    format!(
        r#"Explain this skill in plain language to a developer who has not seen it before.

Skill name: {}
Description: {}

Rules:
{}
Cover:
1. What the skill is for (1-2 sentences)
2. The key behaviors it enforces
3. What makes it effective
{}
Use simple language and clear sections."#,
        skill.name,
        skill.description,
        skill.numbered_rules(),
        extras
    )
}
