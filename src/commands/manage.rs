//! Skill lifecycle commands: init, add, list, show, edit, remove, validate.

use super::{print_rules, prompt, truncate, App};
use crate::config::{mask_key, Config};
use crate::skill::Skill;
use crate::skills::query;
use crate::skills::validate::validate as check_skill;
use anyhow::{bail, Context, Result};

const RULE: &str = "─────────────────────────────────────────────────────";

/// Options for `add`.
#[derive(Debug, Default)]
pub struct NewSkill {
    pub name: String,
    pub description: String,
    pub rules: Vec<String>,
    pub tags: Vec<String>,
    pub group: Option<String>,
    pub manual: bool,
}

/// Field replacements for `edit`. Unset fields are kept.
#[derive(Debug, Default)]
pub struct SkillEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rules: Vec<String>,
    pub group: Option<String>,
}

impl SkillEdit {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.rules.is_empty()
            && self.group.is_none()
    }

    fn apply_to(self, skill: &mut Skill) {
        if let Some(name) = self.name {
            skill.name = name;
        }
        if let Some(description) = self.description {
            skill.description = description;
        }
        if !self.rules.is_empty() {
            skill.rules = self.rules;
        }
        if let Some(group) = self.group {
            skill.group = Some(group).filter(|g| !g.trim().is_empty());
        }
    }
}

fn example_skill() -> Skill {
    Skill::new(
        "example",
        "An example skill to demonstrate the skill document format.",
    )
    .with_rules([
        "Be helpful and concise in all responses",
        "Provide code examples when they would clarify the explanation",
        "Explain your reasoning step by step when solving problems",
        "Ask clarifying questions when the request is ambiguous",
    ])
}

/// Create the skills directory, offer to store an API key and add an
/// example skill. Prompts only when `interactive`.
pub fn init(app: &App, interactive: bool) -> Result<()> {
    let root = app.store.root();

    println!("\n  [1/3] Setting up skills directory...");
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create skills directory {}", root.display()))?;
    println!("        ✓ Created {}/", root.display());

    println!("\n  [2/3] Checking API configuration...");
    let kind = app.config.active_provider();
    match app.config.api_key_for(kind) {
        Some(key) => println!("        ✓ {} API key configured ({})", kind, mask_key(key)),
        None if !kind.requires_api_key() => println!("        ✓ {} needs no API key", kind),
        None if interactive => setup_api_key(kind.as_str())?,
        None => println!(
            "        ⚠ No {} API key. Set it later with: skillforge config set api-key",
            kind
        ),
    }

    println!("\n  [3/3] Creating example skill...");
    let example = example_skill();
    if app.store.exists(&example.name) {
        println!("        ✓ Example skill already exists");
    } else {
        app.store.add(&example)?;
        println!("        ✓ Created {}", app.store.skill_path(&example.name).display());
    }

    println!("\n  Quick start:");
    println!("  • Add a skill:       skillforge add \"code review\" -d \"Reviews code\"");
    println!("  • From a template:   skillforge template list");
    println!("  • List skills:       skillforge list");
    println!("  • Show a skill:      skillforge show code-review");
    println!("  • Validate a skill:  skillforge validate code-review");
    println!();
    Ok(())
}

fn setup_api_key(provider: &str) -> Result<()> {
    println!("        No {} API key found.\n", provider);
    let answer = prompt("        Set up your API key now? (y/n): ")?.unwrap_or_default();
    if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
        println!("        ⚠ Skipped. Set it later with: skillforge config set api-key");
        return Ok(());
    }

    let Some(key) = prompt(&format!("        Enter your {} API key: ", provider))? else {
        println!("        ⚠ No key entered");
        return Ok(());
    };

    let mut user = Config::load_user()?;
    user.set_value(&format!("{}-api-key", provider), &key, user.active_provider())?;
    let path = user.save_user()?;
    println!("        ✓ API key saved to {}", path.display());
    Ok(())
}

pub fn add(app: &App, new: NewSkill) -> Result<()> {
    if new.description.trim().is_empty() {
        bail!("description is required (-d flag)");
    }
    if app.store.exists(&new.name) {
        bail!("skill '{}' already exists", new.name);
    }

    let mut skill = if new.manual {
        Skill::new(&new.name, &new.description).with_rules(new.rules)
    } else {
        let generator = app
            .generator()
            .context("AI generation unavailable, use --manual to skip it")?;
        println!("Generating skill with {}...", generator.provider_name());
        generator
            .draft_skill(&new.name, &new.description)
            .context("AI generation failed")?
    };
    skill.add_tags(new.tags.iter().map(String::as_str));
    skill.group = new.group;

    app.store.add(&skill)?;

    println!("\n✓ Added skill: {}", skill.name);
    println!("  Description: {}", skill.description);
    if !skill.rules.is_empty() {
        println!("  Rules:");
        print_rules(&skill.rules, "    ");
    }
    Ok(())
}

pub fn list(app: &App, tag: Option<&str>, group: Option<&str>, long: bool) -> Result<()> {
    let outcome = app.store.list()?;
    for (name, error) in &outcome.failures {
        tracing::warn!(skill = %name, error = %error, "Skipping unreadable skill");
    }

    let (skills, header) = match (tag, group) {
        (Some(tag), _) => (
            query::filter_by_tag(outcome.skills, tag),
            format!("Skills tagged '{}'", tag),
        ),
        (None, Some(group)) => (
            query::filter_by_group(outcome.skills, group),
            format!("Skills in group '{}'", group),
        ),
        (None, None) => (outcome.skills, "Skills".to_string()),
    };

    if skills.is_empty() {
        match (tag, group) {
            (Some(tag), _) => println!("No skills found with tag '{}'", tag),
            (None, Some(group)) => println!("No skills found in group '{}'", group),
            (None, None) => {
                println!("No skills found. Add one with: skillforge add <name> -d \"description\"")
            }
        }
        return Ok(());
    }

    println!("\n{} ({}):", header, skills.len());
    println!("{}", RULE);
    for skill in &skills {
        print_summary(skill, tag.is_none(), group.is_none(), long);
    }
    println!();
    Ok(())
}

fn print_summary(skill: &Skill, show_tags: bool, show_group: bool, long: bool) {
    let mut title = format!("\n  {}", skill.name);
    if let Some(version) = &skill.version {
        title.push_str(&format!(" (v{})", version));
    }
    if let Some(template) = &skill.template {
        title.push_str(&format!(" [from: {}]", template));
    }
    println!("{}", title);

    let description = if long {
        skill.description.clone()
    } else {
        truncate(&skill.description, 70)
    };
    println!("    {}", description);

    let mut meta = Vec::new();
    if !skill.rules.is_empty() {
        meta.push(format!("{} rules", skill.rules.len()));
    }
    if let Some(group) = skill.group.as_ref().filter(|_| show_group) {
        meta.push(format!("group: {}", group));
    }
    if show_tags && !skill.tags.is_empty() {
        meta.push(format!("tags: {}", skill.tags.join(", ")));
    }
    if !meta.is_empty() {
        println!("    [{}]", meta.join(" | "));
    }

    if long {
        if let Some(author) = &skill.author {
            println!("    Author: {}", author);
        }
        if let Some(extends) = &skill.extends {
            println!("    Extends: {}", extends);
        }
        if !skill.includes.is_empty() {
            println!("    Includes: {}", skill.includes.join(", "));
        }
        if !skill.chain.is_empty() {
            println!("    Chain: {}", skill.chain.join(" → "));
        }
        if let Some(format) = &skill.output_format {
            println!("    Output: {}", format);
        }
        if let Some(context) = skill.context.as_ref().filter(|c| !c.is_empty()) {
            println!(
                "    Context: {} files, {} globs, {} commands",
                context.files.len(),
                context.globs.len(),
                context.commands.len()
            );
        }
        if let Some(hooks) = skill.hooks.as_ref().filter(|h| !h.is_empty()) {
            println!("    Hooks: {} pre, {} post", hooks.pre.len(), hooks.post.len());
        }
    }
}

pub fn show(app: &App, name: &str, raw: bool) -> Result<()> {
    if raw {
        let content = match app.store.read_raw(name) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => bail!("skill '{}' not found", name),
            Err(e) => return Err(e.into()),
        };
        print!("{}", content);
        return Ok(());
    }

    let skill = app.load(name)?;
    println!("Name: {}", skill.name);
    println!("Description: {}", skill.description);
    if !skill.tags.is_empty() {
        println!("Tags: {}", skill.tags.join(", "));
    }
    if let Some(group) = &skill.group {
        println!("Group: {}", group);
    }
    if let Some(template) = &skill.template {
        println!("Template: {}", template);
    }
    if !skill.rules.is_empty() {
        println!("Rules:");
        print_rules(&skill.rules, "  ");
    }
    if !skill.variables.is_empty() {
        println!("Variables:");
        for (key, value) in &skill.variables {
            println!("  {} = {}", key, value);
        }
    }
    Ok(())
}

pub fn edit(app: &App, name: &str, changes: SkillEdit) -> Result<()> {
    if changes.is_empty() {
        bail!("nothing to change: pass --name, --desc, --rule or --group");
    }

    let mut skill = app.load(name)?;
    app.snapshot(name);
    changes.apply_to(&mut skill);
    app.save_edit(name, &skill)?;

    println!("✓ Updated skill: {}", skill.name);
    Ok(())
}

pub fn remove(app: &App, name: &str) -> Result<()> {
    match app.store.remove(name) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => bail!("skill '{}' not found", name),
        Err(e) => return Err(e.into()),
    }
    println!("✓ Removed skill: {}", name);
    Ok(())
}

/// Print a validation report. Fails when the skill cannot be read or has
/// errors; warnings alone pass.
pub fn validate(app: &App, name: &str) -> Result<()> {
    let skill = match app.store.get(name) {
        Ok(skill) => skill,
        Err(e) if e.is_not_found() => bail!("skill '{}' not found", name),
        Err(e) if e.is_malformed() => {
            println!("\n  ❌ Validation Failed: {}\n", name);
            println!("  Document error:");
            println!("  └─ {}\n", e);
            bail!("skill '{}' could not be parsed", name);
        }
        Err(e) => return Err(e.into()),
    };

    let report = check_skill(&skill);
    println!();
    if report.is_clean() {
        println!("  ✓ Skill '{}' is valid\n", name);
    }

    if !report.errors.is_empty() {
        println!("  ❌ Validation Failed: {}\n", name);
        println!("  Errors:");
        for error in &report.errors {
            println!("  └─ {}", error);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        if report.is_valid() {
            println!("  ⚠ Validation Passed with Warnings: {}\n", name);
        }
        println!("  Warnings:");
        for warning in &report.warnings {
            println!("  └─ {}", warning);
        }
        println!();
    }

    if !report.is_valid() {
        bail!("skill '{}' has {} error(s)", name, report.errors.len());
    }

    println!("  Skill Summary:");
    println!("  ─────────────");
    println!("  Name:        {}", skill.name);
    println!("  Description: {}", truncate(&skill.description, 60));
    println!("  Rules:       {} defined\n", skill.rules.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    fn manual(name: &str) -> NewSkill {
        NewSkill {
            name: name.to_string(),
            description: "Reviews pull requests for correctness".to_string(),
            rules: vec!["Cite the line for every finding".to_string()],
            tags: vec!["review".to_string(), "Review".to_string()],
            group: Some("dev".to_string()),
            manual: true,
        }
    }

    #[test]
    fn test_init_creates_example() {
        let (_tmp, app) = testing::app();
        init(&app, false).unwrap();
        assert!(app.store.exists("example"));

        // Idempotent
        init(&app, false).unwrap();
        assert_eq!(app.store.list().unwrap().skills.len(), 1);
    }

    #[test]
    fn test_add_manual() {
        let (_tmp, app) = testing::app();
        add(&app, manual("Code Review")).unwrap();

        let skill = app.store.get("code-review").unwrap();
        assert_eq!(skill.name, "Code Review");
        assert_eq!(skill.tags, vec!["review"]);
        assert_eq!(skill.group.as_deref(), Some("dev"));

        let err = add(&app, manual("code review")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_add_requires_description() {
        let (_tmp, app) = testing::app();
        let mut new = manual("x");
        new.description = "  ".to_string();
        assert!(add(&app, new).is_err());
    }

    #[test]
    fn test_edit_snapshots_and_renames() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();

        edit(
            &app,
            "review",
            SkillEdit {
                name: Some("pr-review".to_string()),
                description: Some("Reviews PRs in depth".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let skill = app.store.get("pr-review").unwrap();
        assert_eq!(skill.description, "Reviews PRs in depth");
        assert_eq!(skill.rules, vec!["Cite the line for every finding"]);
        assert!(!app.store.exists("review"));

        let versions = app.history.list_versions("pr-review").unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].content.contains("Reviews pull requests"));
    }

    #[test]
    fn test_edit_clears_group_with_blank() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();
        edit(
            &app,
            "review",
            SkillEdit {
                group: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(app.store.get("review").unwrap().group, None);
    }

    #[test]
    fn test_edit_without_changes() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();
        assert!(edit(&app, "review", SkillEdit::default()).is_err());
        assert!(app.history.list_versions("review").unwrap().is_empty());
    }

    #[test]
    fn test_remove_and_missing() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();
        remove(&app, "review").unwrap();
        assert!(!app.store.exists("review"));
        assert_eq!(
            remove(&app, "review").unwrap_err().to_string(),
            "skill 'review' not found"
        );
    }

    #[test]
    fn test_validate_outcomes() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();
        validate(&app, "review").unwrap();

        app.store.add(&Skill::new("empty", "")).unwrap();
        assert!(validate(&app, "empty").is_err());

        app.store.write_raw("review", "---\nname: [broken\n---\n").unwrap();
        assert!(validate(&app, "review").is_err());
    }

    #[test]
    fn test_list_tolerates_corrupt_skill() {
        let (_tmp, app) = testing::app();
        add(&app, manual("review")).unwrap();
        app.store.add(&Skill::new("other", "Other skill")).unwrap();
        app.store.write_raw("other", "---\nname: [broken\n---\n").unwrap();

        list(&app, None, None, true).unwrap();
        list(&app, Some("review"), None, false).unwrap();
        list(&app, None, Some("nope"), false).unwrap();
    }
}
