//! Template commands: list, show, use.

use super::{print_rules, App};
use crate::skills::templates::{by_category, find_template, SkillTemplate};
use anyhow::{Context, Result};

fn lookup(name: &str) -> Result<&'static SkillTemplate> {
    find_template(name).with_context(|| {
        format!(
            "template '{}' not found. Run 'skillforge template list' to see available templates",
            name
        )
    })
}

pub fn list() -> Result<()> {
    println!("\nAvailable Templates:");
    println!("────────────────────");
    for (category, templates) in by_category() {
        println!("\n  {}:", category.to_uppercase());
        for template in templates {
            println!("    {:<20} {}", template.name, template.summary);
        }
    }
    println!();
    Ok(())
}

pub fn show(name: &str) -> Result<()> {
    let template = lookup(name)?;

    println!("\nTemplate: {}", template.name);
    println!("─────────────────────────────────────");
    println!("Category:    {}", template.category);
    println!("Summary:     {}\n", template.summary);
    println!("Skill Description:\n  {}\n", template.description);
    if !template.tags.is_empty() {
        println!("Tags: {}\n", template.tags.join(", "));
    }
    println!("Rules:");
    print_rules(&template.skill().rules, "  ");
    println!();
    Ok(())
}

/// Create a skill from a template, named after the template unless a name
/// is given.
pub fn use_template(app: &App, template: &str, name: Option<&str>) -> Result<()> {
    let template = lookup(template)?;
    let skill = template.instantiate(name);
    app.store.add(&skill)?;

    println!(
        "\n✓ Created skill '{}' from template '{}'",
        skill.name, template.name
    );
    println!("  Location: {}\n", app.store.skill_path(&skill.name).display());
    Ok(())
}
