//! Tag and group commands.

use super::{truncate, App};
use crate::skill::{same_label, Skill};
use crate::skills::query;
use anyhow::{bail, Result};

const RULE: &str = "─────────────────────────────────────";
const DOUBLE_RULE: &str = "═══════════════════════════════════════════════════";

/// Snapshot, then write back a skill whose metadata changed in place.
fn save(app: &App, name: &str, skill: &Skill) -> Result<()> {
    app.snapshot(name);
    app.store.edit(name, skill)?;
    Ok(())
}

pub fn tag_list(app: &App) -> Result<()> {
    let skills = app.store.list()?.skills;
    let tags = query::all_tags(&app.store)?;
    if tags.is_empty() {
        println!("No tags defined.");
        println!("Add tags to a skill with: skillforge tag add <skill> <tag>");
        return Ok(());
    }

    println!("\nAll Tags:");
    println!("{}", RULE);
    for tag in tags {
        let count = skills.iter().filter(|s| s.has_tag(&tag)).count();
        println!("  {:<20} ({} skills)", tag, count);
    }
    println!();
    Ok(())
}

pub fn tag_show(app: &App, tag: &str) -> Result<()> {
    let skills = query::list_by_tag(&app.store, tag)?;
    if skills.is_empty() {
        bail!("no skills found with tag '{}'", tag);
    }

    println!("\nSkills tagged '{}':", tag);
    println!("{}", DOUBLE_RULE);
    for skill in &skills {
        println!("\n  {}", skill.name);
        println!("    {}", truncate(&skill.description, 60));
        let others: Vec<&str> = skill
            .tags
            .iter()
            .filter(|t| !same_label(t, tag))
            .map(String::as_str)
            .collect();
        if !others.is_empty() {
            println!("    Other tags: {}", others.join(", "));
        }
    }
    println!();
    Ok(())
}

pub fn tag_add(app: &App, name: &str, tags: &[String]) -> Result<()> {
    let mut skill = app.load(name)?;
    let added = skill.add_tags(tags.iter().map(String::as_str).filter(|t| !t.trim().is_empty()));
    if added.is_empty() {
        println!("All tags already exist on this skill.");
        return Ok(());
    }

    save(app, name, &skill)?;
    println!("✓ Added tags to '{}': {}", name, added.join(", "));
    Ok(())
}

pub fn tag_remove(app: &App, name: &str, tags: &[String]) -> Result<()> {
    let mut skill = app.load(name)?;
    let removed = skill.remove_tags(tags);
    if removed.is_empty() {
        bail!("skill '{}' has none of the tags: {}", name, tags.join(", "));
    }

    save(app, name, &skill)?;
    println!("✓ Removed tags from '{}': {}", name, removed.join(", "));
    Ok(())
}

pub fn group_list(app: &App) -> Result<()> {
    let skills = app.store.list()?.skills;
    let groups = query::all_groups(&app.store)?;
    if groups.is_empty() {
        println!("No groups defined.");
        println!("Add a skill to a group with: skillforge group set <skill> <group>");
        return Ok(());
    }

    println!("\nSkill Groups:");
    println!("{}", RULE);
    for group in groups {
        let members: Vec<&Skill> = skills.iter().filter(|s| s.in_group(&group)).collect();
        println!("\n  {} ({} skills)", group, members.len());
        for skill in members {
            println!("    • {}", skill.name);
        }
    }
    println!();
    Ok(())
}

pub fn group_show(app: &App, group: &str) -> Result<()> {
    let skills = query::list_by_group(&app.store, group)?;
    if skills.is_empty() {
        bail!("group '{}' not found or empty", group);
    }

    println!("\nGroup: {}", group);
    println!("{}", DOUBLE_RULE);
    println!("Skills: {}\n", skills.len());
    for skill in &skills {
        println!("  {}", skill.name);
        println!("    {}", truncate(&skill.description, 60));
        let mut line = format!("    Rules: {}", skill.rules.len());
        if !skill.tags.is_empty() {
            line.push_str(&format!("  Tags: {}", skill.tags.join(", ")));
        }
        println!("{}\n", line);
    }
    Ok(())
}

pub fn group_set(app: &App, name: &str, group: &str) -> Result<()> {
    if group.trim().is_empty() {
        bail!("group name cannot be empty");
    }
    let mut skill = app.load(name)?;
    skill.group = Some(group.to_string());
    save(app, name, &skill)?;
    println!("✓ Added '{}' to group '{}'", name, group);
    Ok(())
}

pub fn group_unset(app: &App, name: &str) -> Result<()> {
    let mut skill = app.load(name)?;
    let Some(old) = skill.group.take() else {
        bail!("skill '{}' is not in any group", name);
    };
    save(app, name, &skill)?;
    println!("✓ Removed '{}' from group '{}'", name, old);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_add_and_remove() {
        let (_tmp, app) = testing::app();
        app.store
            .add(&Skill::new("review", "Reviews code").with_tags(["Code"]))
            .unwrap();

        tag_add(&app, "review", &tags(&["code", "security"])).unwrap();
        assert_eq!(app.store.get("review").unwrap().tags, vec!["Code", "security"]);
        assert_eq!(app.history.list_versions("review").unwrap().len(), 1);

        // Nothing new: no write, no snapshot
        tag_add(&app, "review", &tags(&["SECURITY"])).unwrap();
        assert_eq!(app.history.list_versions("review").unwrap().len(), 1);

        tag_remove(&app, "review", &tags(&["CODE"])).unwrap();
        assert_eq!(app.store.get("review").unwrap().tags, vec!["security"]);
        assert!(tag_remove(&app, "review", &tags(&["missing"])).is_err());

        tag_show(&app, "security").unwrap();
        assert!(tag_show(&app, "code").is_err());
        tag_list(&app).unwrap();
    }

    #[test]
    fn test_group_set_and_unset() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("review", "Reviews code")).unwrap();

        assert!(group_unset(&app, "review").is_err());
        group_set(&app, "review", "dev").unwrap();
        assert_eq!(app.store.get("review").unwrap().group.as_deref(), Some("dev"));
        group_show(&app, "DEV").unwrap();
        group_list(&app).unwrap();

        group_unset(&app, "review").unwrap();
        assert_eq!(app.store.get("review").unwrap().group, None);
        assert!(group_show(&app, "dev").is_err());
        assert!(group_set(&app, "ghost", "dev").is_err());
    }
}
