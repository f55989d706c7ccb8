//! Workspace commands.

use super::App;
use crate::skills::Workspace;
use anyhow::{bail, Context, Result};

fn load(app: &App) -> Result<Workspace> {
    Workspace::load(&app.workspace_file)?
        .context("no workspace configured. Use 'skillforge workspace init'")
}

pub fn init(app: &App, name: Option<&str>) -> Result<()> {
    if let Some(existing) = Workspace::load(&app.workspace_file)? {
        bail!("workspace already exists: {}", existing.name);
    }

    let workspace = Workspace::new(name.unwrap_or("default"));
    workspace.save(&app.workspace_file)?;

    println!("✓ Workspace '{}' created", workspace.name);
    println!("  Location: {}", app.workspace_file.display());
    println!("\n  Use 'skillforge workspace add <skill>' to add skills");
    Ok(())
}

pub fn show(app: &App) -> Result<()> {
    let Some(workspace) = Workspace::load(&app.workspace_file)? else {
        println!("No workspace configured.");
        println!("Use 'skillforge workspace init' to create one.");
        return Ok(());
    };

    println!("\nWorkspace: {}", workspace.name);
    println!("═══════════════════════════════════════════════════");
    if !workspace.description.is_empty() {
        println!("Description: {}\n", workspace.description);
    }

    if workspace.skills.is_empty() {
        println!("No skills enabled.\n");
    } else {
        println!("Enabled Skills:");
        for skill in &workspace.skills {
            println!("  • {}", skill);
        }
        println!();
    }

    if !workspace.groups.is_empty() {
        println!("Enabled Groups:");
        for group in &workspace.groups {
            println!("  • {}", group);
        }
        println!();
    }

    if !workspace.overrides.is_empty() {
        println!("Variable Overrides:");
        for (skill, vars) in &workspace.overrides {
            println!("  {}:", skill);
            for (key, value) in vars {
                println!("    {} = {}", key, value);
            }
        }
        println!();
    }

    let active = workspace.active_skills(&app.store)?;
    if !active.is_empty() {
        println!("Active Skills ({}):", active.len());
        for skill in &active {
            println!("  • {}", skill.name);
        }
        println!();
    }
    Ok(())
}

pub fn add(app: &App, skill: &str) -> Result<()> {
    let mut workspace = load(app)?;
    if !app.store.exists(skill) {
        bail!("skill '{}' not found", skill);
    }
    workspace.add_skill(skill)?;
    workspace.save(&app.workspace_file)?;
    println!("✓ Added '{}' to workspace", skill);
    Ok(())
}

pub fn remove(app: &App, skill: &str) -> Result<()> {
    let mut workspace = load(app)?;
    workspace.remove_skill(skill)?;
    workspace.save(&app.workspace_file)?;
    println!("✓ Removed '{}' from workspace", skill);
    Ok(())
}

pub fn add_group(app: &App, group: &str) -> Result<()> {
    let mut workspace = load(app)?;
    workspace.add_group(group)?;
    workspace.save(&app.workspace_file)?;
    println!("✓ Enabled group '{}' in workspace", group);
    Ok(())
}

pub fn set(app: &App, skill: &str, variable: &str, value: &str) -> Result<()> {
    let mut workspace = load(app)?;
    workspace.set_override(skill, variable, value);
    workspace.save(&app.workspace_file)?;
    println!("✓ Set {}.{} = {}", skill, variable, value);
    Ok(())
}
