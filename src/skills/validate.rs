//! Advisory checks on a skill record.
//!
//! The store accepts any record; validation reports problems without
//! rejecting anything.

use crate::skill::Skill;

const MAX_NAME_LEN: usize = 50;
const MIN_TEXT_LEN: usize = 10;
const MAX_TEXT_LEN: usize = 500;
const MAX_RULES: usize = 20;
const VAGUE_PREFIXES: &[&str] = &["be good", "be nice"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the skill unusable
    pub errors: Vec<String>,
    /// Style and clarity suggestions
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn validate(skill: &Skill) -> ValidationReport {
    let mut report = ValidationReport::default();

    let name = skill.name.trim();
    if name.is_empty() {
        report.errors.push("Missing required field: name".to_string());
    } else {
        if name.contains(' ') {
            report.warnings.push(
                "Skill name contains spaces - consider using hyphens (e.g., 'code-review')"
                    .to_string(),
            );
        }
        if name.chars().count() > MAX_NAME_LEN {
            report
                .warnings
                .push("Skill name is very long - consider a shorter, more memorable name".to_string());
        }
    }

    let description = skill.description.trim();
    if description.is_empty() {
        report.errors.push("Missing required field: description".to_string());
    } else {
        let len = description.chars().count();
        if len < MIN_TEXT_LEN {
            report
                .warnings
                .push("Description is very short - add more detail for clarity".to_string());
        }
        if len > MAX_TEXT_LEN {
            report
                .warnings
                .push("Description is very long - consider being more concise".to_string());
        }
    }

    if skill.rules.is_empty() {
        report.warnings.push(
            "No rules defined - skills work better with specific behavioral rules".to_string(),
        );
        return report;
    }

    for (i, rule) in skill.rules.iter().enumerate() {
        let n = i + 1;
        let rule = rule.trim();
        if rule.is_empty() {
            report.errors.push(format!("Rule {} is empty", n));
            continue;
        }

        let len = rule.chars().count();
        if len < MIN_TEXT_LEN {
            report
                .warnings
                .push(format!("Rule {} is very short - be more specific", n));
        }
        if len > MAX_TEXT_LEN {
            report.warnings.push(format!(
                "Rule {} is very long - consider breaking into multiple rules",
                n
            ));
        }

        let lower = rule.to_lowercase();
        if VAGUE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            report.warnings.push(format!(
                "Rule {} is vague - use specific, actionable instructions",
                n
            ));
        }
    }

    if skill.rules.len() > MAX_RULES {
        report
            .warnings
            .push("Many rules defined - consider consolidating related rules".to_string());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_skill() {
        let skill = Skill::new("code-review", "Reviews pull requests for defects")
            .with_rules(["Check every error path is handled"]);
        let report = validate(&skill);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let report = validate(&Skill::default());
        assert_eq!(
            report.errors,
            vec![
                "Missing required field: name",
                "Missing required field: description"
            ]
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn test_empty_rule_is_error() {
        let skill = Skill::new("linter", "Lints source files").with_rules(["Check formatting rules", "  "]);
        let report = validate(&skill);
        assert_eq!(report.errors, vec!["Rule 2 is empty"]);
    }

    #[test]
    fn test_warnings() {
        let skill = Skill::new("my skill", "short").with_rules(["be nice to everyone please", "tiny"]);
        let report = validate(&skill);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 4);
        assert!(report.warnings[0].contains("contains spaces"));
        assert!(report.warnings[1].contains("Description is very short"));
        assert!(report.warnings[2].contains("Rule 1 is vague"));
        assert!(report.warnings[3].contains("Rule 2 is very short"));
    }

    #[test]
    fn test_no_rules_and_too_many_rules() {
        let report = validate(&Skill::new("x", "A decent description"));
        assert!(report.warnings[0].starts_with("No rules defined"));

        let rules: Vec<String> = (0..21).map(|i| format!("Specific rule number {}", i)).collect();
        let report = validate(&Skill::new("x", "A decent description").with_rules(rules));
        assert_eq!(
            report.warnings,
            vec!["Many rules defined - consider consolidating related rules"]
        );
    }

    #[test]
    fn test_long_fields() {
        let long = "x".repeat(501);
        let skill = Skill::new("y".repeat(51), long.clone()).with_rules([long]);
        let report = validate(&skill);
        assert_eq!(report.warnings.len(), 3);
    }
}
