//! Built-in skill templates.

use crate::skill::Skill;

/// A ready-made skill users can start from.
#[derive(Debug, Clone, Copy)]
pub struct SkillTemplate {
    pub name: &'static str,
    /// One-line summary shown in listings
    pub summary: &'static str,
    pub category: &'static str,
    /// Description given to skills created from this template
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub rules: &'static [&'static str],
}

impl SkillTemplate {
    /// The template's skill, named after the template.
    pub fn skill(&self) -> Skill {
        Skill::new(self.name, self.description)
            .with_rules(self.rules.iter().copied())
            .with_tags(self.tags.iter().copied())
    }

    /// A new skill from this template, recording where it came from.
    pub fn instantiate(&self, name: Option<&str>) -> Skill {
        let mut skill = self.skill();
        if let Some(name) = name {
            skill.name = name.to_string();
        }
        skill.template = Some(self.name.to_string());
        skill
    }
}

pub const BUILTIN_TEMPLATES: &[SkillTemplate] = &[
    SkillTemplate {
        name: "code-review",
        summary: "Review code for quality, bugs, and best practices",
        category: "development",
        description: "Reviews code for quality issues, potential bugs, security vulnerabilities, and adherence to best practices. Provides actionable feedback with specific line references.",
        tags: &["code", "review", "quality"],
        rules: &[
            "Always cite specific line numbers when referencing code issues",
            "Categorize issues by severity: critical, warning, suggestion",
            "Check for common security vulnerabilities (SQL injection, XSS, etc.)",
            "Verify error handling is comprehensive and appropriate",
            "Ensure code follows the project's established patterns and conventions",
            "Look for performance issues like N+1 queries, unnecessary loops",
            "Check for proper resource cleanup (file handles, connections)",
            "Verify tests cover the critical paths of new code",
        ],
    },
    SkillTemplate {
        name: "commit-message",
        summary: "Generate conventional commit messages",
        category: "git",
        description: "Generates clear, conventional commit messages following the Conventional Commits specification. Analyzes staged changes to determine the appropriate type and scope.",
        tags: &["git", "commit", "automation"],
        rules: &[
            "Use conventional commit format: type(scope): description",
            "Valid types: feat, fix, docs, style, refactor, test, chore, perf, ci",
            "Keep the subject line under 72 characters",
            "Use imperative mood in the subject (Add, not Added)",
            "Include a body for complex changes explaining the why",
            "Reference issue numbers when applicable",
            "Group related changes into a single commit",
            "Never include generated files or dependencies in the diff analysis",
        ],
    },
    SkillTemplate {
        name: "documentation",
        summary: "Write clear technical documentation",
        category: "docs",
        description: "Creates clear, comprehensive technical documentation. Explains concepts at the appropriate level for the target audience and includes practical examples.",
        tags: &["docs", "writing", "technical"],
        rules: &[
            "Start with a clear one-sentence summary of what this documents",
            "Include a quick-start example within the first 3 sections",
            "Use consistent heading hierarchy (h2 for sections, h3 for subsections)",
            "Provide code examples for every API or function documented",
            "Include both success and error cases in examples",
            "Link to related documentation rather than duplicating content",
            "Use tables for comparing options or listing parameters",
            "End with a troubleshooting or FAQ section for complex topics",
        ],
    },
    SkillTemplate {
        name: "testing",
        summary: "Write comprehensive test suites",
        category: "development",
        description: "Designs and implements comprehensive test suites. Covers unit tests, integration tests, and edge cases with clear assertions and good test isolation.",
        tags: &["testing", "quality", "automation"],
        rules: &[
            "Follow Arrange-Act-Assert (AAA) pattern in all tests",
            "Name tests descriptively: should_[expected]_when_[condition]",
            "Test one behavior per test function",
            "Use test fixtures for shared setup, avoid test interdependence",
            "Include edge cases: empty inputs, nulls, boundaries, errors",
            "Mock external dependencies, don't make real network calls",
            "Verify both positive and negative test cases",
            "Aim for behavior coverage, not just line coverage",
        ],
    },
    SkillTemplate {
        name: "debugging",
        summary: "Systematic debugging and root cause analysis",
        category: "development",
        description: "Systematic approach to debugging issues. Uses scientific method to isolate problems, identify root causes, and verify fixes don't introduce regressions.",
        tags: &["debugging", "troubleshooting", "analysis"],
        rules: &[
            "Reproduce the issue before attempting any fix",
            "Gather evidence: logs, stack traces, error messages",
            "Form a hypothesis about the root cause before making changes",
            "Isolate variables by testing one change at a time",
            "Check for recent changes that correlate with issue onset",
            "Verify the fix actually resolves the issue, don't assume",
            "Document the root cause and fix for future reference",
            "Consider if similar issues exist elsewhere in the codebase",
        ],
    },
    SkillTemplate {
        name: "api-design",
        summary: "Design RESTful APIs following best practices",
        category: "architecture",
        description: "Designs RESTful APIs with consistent patterns, proper HTTP semantics, clear error handling, and good developer experience.",
        tags: &["api", "rest", "design"],
        rules: &[
            "Use nouns for resources, verbs come from HTTP methods",
            "Return appropriate HTTP status codes (201 for create, 204 for delete)",
            "Use consistent error response format with code, message, and details",
            "Version APIs in the URL path (/v1/, /v2/)",
            "Support pagination for list endpoints with limit/offset or cursor",
            "Use JSON:API or similar spec for response envelope structure",
            "Document all endpoints with request/response examples",
            "Implement proper CORS headers for browser clients",
        ],
    },
    SkillTemplate {
        name: "security-review",
        summary: "Review code for security vulnerabilities",
        category: "security",
        description: "Audits code for security vulnerabilities following OWASP guidelines. Identifies injection flaws, authentication issues, data exposure, and other common security problems.",
        tags: &["security", "audit", "owasp"],
        rules: &[
            "Check all user input is validated and sanitized",
            "Verify SQL queries use parameterized statements",
            "Ensure authentication tokens are not logged or exposed",
            "Check for proper authorization on all endpoints",
            "Verify sensitive data is encrypted at rest and in transit",
            "Look for hardcoded secrets, keys, or credentials",
            "Check dependencies for known vulnerabilities",
            "Verify proper HTTPS/TLS configuration",
        ],
    },
    SkillTemplate {
        name: "refactoring",
        summary: "Improve code structure without changing behavior",
        category: "development",
        description: "Improves code structure, readability, and maintainability while preserving existing behavior. Uses established refactoring patterns and ensures tests pass.",
        tags: &["refactoring", "clean-code", "maintenance"],
        rules: &[
            "Ensure comprehensive tests exist before refactoring",
            "Make one refactoring change at a time, verify tests pass",
            "Extract methods when functions exceed 20-30 lines",
            "Replace magic numbers with named constants",
            "Apply DRY only when duplication is true duplication",
            "Prefer composition over inheritance for flexibility",
            "Keep the refactoring scope focused, avoid feature creep",
            "Document the rationale for significant structural changes",
        ],
    },
];

/// Look up a template by name, case-insensitively.
pub fn find_template(name: &str) -> Option<&'static SkillTemplate> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

/// Distinct categories in first-seen order, each with its templates.
pub fn by_category() -> Vec<(&'static str, Vec<&'static SkillTemplate>)> {
    let mut categories: Vec<(&'static str, Vec<&'static SkillTemplate>)> = Vec::new();
    for template in BUILTIN_TEMPLATES {
        match categories.iter_mut().find(|(c, _)| *c == template.category) {
            Some((_, list)) => list.push(template),
            None => categories.push((template.category, vec![template])),
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::validate::validate;

    #[test]
    fn test_builtin_templates_are_valid() {
        assert_eq!(BUILTIN_TEMPLATES.len(), 8);
        for template in BUILTIN_TEMPLATES {
            let report = validate(&template.skill());
            assert!(report.is_clean(), "{}: {:?}", template.name, report);
        }
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("Code-Review").unwrap().name, "code-review");
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn test_instantiate_records_template() {
        let template = find_template("commit-message").unwrap();

        let skill = template.instantiate(None);
        assert_eq!(skill.name, "commit-message");
        assert_eq!(skill.template.as_deref(), Some("commit-message"));

        let skill = template.instantiate(Some("my-commits"));
        assert_eq!(skill.name, "my-commits");
        assert_eq!(skill.template.as_deref(), Some("commit-message"));
        assert_eq!(skill.rules.len(), 8);
    }

    #[test]
    fn test_by_category() {
        let categories = by_category();
        let names: Vec<&str> = categories.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!["development", "git", "docs", "architecture", "security"]);
        assert_eq!(categories[0].1.len(), 4);
    }
}
