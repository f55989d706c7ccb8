//! Export and import commands.

use super::{ai, App};
use crate::remote::{Payload, Source};
use crate::skill::Skill;
use crate::skills::transfer::{self, Format};
use anyhow::{bail, Context, Result};
use std::path::Path;

pub fn export(app: &App, name: &str, format: &str, output: Option<&Path>) -> Result<()> {
    let format: Format = format.parse()?;
    let skill = app.load(name)?;
    let content = transfer::export(&skill, format)?;

    let Some(path) = output else {
        println!("{}", content);
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✓ Exported '{}' to {}", name, path.display());
    Ok(())
}

/// Options for `import`.
#[derive(Debug, Default)]
pub struct ImportOptions {
    /// Forces the payload format
    pub format: Option<String>,
    /// Name for the imported skill; single-payload sources only
    pub name: Option<String>,
    pub improve: bool,
    /// Overwrite skills that already exist
    pub overwrite: bool,
}

pub fn import(app: &App, source: &str, options: ImportOptions) -> Result<()> {
    let forced = options
        .format
        .as_deref()
        .map(str::parse::<Format>)
        .transpose()?;
    let source = Source::parse(source);

    if let Source::GitHub { .. } = source {
        println!("Fetching skills from {}...\n", source);
    }
    let payloads = source
        .fetch()
        .with_context(|| format!("Failed to read {}", source))?;

    if payloads.len() == 1 && !matches!(source, Source::GitHub { .. }) {
        let mut skill = parse_payload(&payloads[0], forced)?;
        if let Some(name) = &options.name {
            skill.name = name.clone();
        }
        if skill.name.trim().is_empty() {
            bail!("skill name is required (use --name)");
        }
        if !save_imported(app, &skill, options.overwrite)? {
            bail!("skill '{}' already exists (use --all to overwrite)", skill.name);
        }

        println!("✓ Imported skill: {}", skill.name);
        println!("  Description: {}", skill.description);
        println!("  Rules: {}", skill.rules.len());
        if options.improve {
            improve_imported(app, &skill.name);
        }
        return Ok(());
    }

    println!("Found {} skill(s):", payloads.len());
    for payload in &payloads {
        println!("  - {}", payload.origin);
    }
    println!();

    let mut imported = 0;
    for payload in &payloads {
        let mut skill = match parse_payload(payload, forced) {
            Ok(skill) => skill,
            Err(e) => {
                println!("  ✗ Failed to import {}: {}", payload.origin, e);
                continue;
            }
        };
        if skill.name.trim().is_empty() {
            skill.name = payload.name_hint.clone().unwrap_or_default();
        }
        if skill.name.trim().is_empty() {
            println!("  ✗ Failed to import {}: no skill name", payload.origin);
            continue;
        }

        match save_imported(app, &skill, options.overwrite) {
            Ok(true) => {
                println!("  ✓ Imported: {}", skill.name);
                imported += 1;
                if options.improve {
                    improve_imported(app, &skill.name);
                }
            }
            Ok(false) => println!(
                "  ⊘ Skipped {} (already exists, use --all to overwrite)",
                skill.name
            ),
            Err(e) => println!("  ✗ Failed to save {}: {}", skill.name, e),
        }
    }

    println!("\nImported {}/{} skills", imported, payloads.len());
    Ok(())
}

/// Decode a payload. Precedence: forced format, the format the source
/// declares, then YAML.
fn parse_payload(payload: &Payload, forced: Option<Format>) -> Result<Skill> {
    let format = forced.or(payload.format).unwrap_or(Format::Yaml);
    Ok(transfer::import(&payload.content, format)?)
}

/// Add the skill, or replace an existing one when `overwrite` is set.
/// Returns false when it exists and was left alone.
fn save_imported(app: &App, skill: &Skill, overwrite: bool) -> Result<bool> {
    if !app.store.exists(&skill.name) {
        app.store.add(skill)?;
        return Ok(true);
    }
    if !overwrite {
        return Ok(false);
    }
    app.snapshot(&skill.name);
    app.store.edit(&skill.name, skill)?;
    Ok(true)
}

fn improve_imported(app: &App, name: &str) {
    println!("    Improving with AI...");
    if let Err(e) = ai::improve(app, name, true) {
        tracing::warn!(skill = %name, error = %e, "Improvement failed");
        println!("    Warning: could not improve: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    fn sample() -> Skill {
        Skill::new("review", "Reviews code")
            .with_rules(["Cite line numbers"])
            .with_tags(["code"])
    }

    #[test]
    fn test_export_import_through_file() {
        let (tmp, app) = testing::app();
        app.store.add(&sample()).unwrap();

        let path = tmp.path().join("out").join("review.json");
        export(&app, "review", "json", Some(&path)).unwrap();
        assert!(path.is_file());

        let err = import(&app, path.to_str().unwrap(), ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        import(
            &app,
            path.to_str().unwrap(),
            ImportOptions {
                name: Some("review-copy".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let copy = app.store.get("review-copy").unwrap();
        assert_eq!(copy.rules, sample().rules);
        assert_eq!(copy.tags, sample().tags);
    }

    #[test]
    fn test_import_overwrite_keeps_history() {
        let (tmp, app) = testing::app();
        app.store.add(&sample()).unwrap();

        let path = tmp.path().join("review.yaml");
        std::fs::write(&path, "name: review\ndescription: Reviews code thoroughly\n").unwrap();
        import(
            &app,
            path.to_str().unwrap(),
            ImportOptions {
                overwrite: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            app.store.get("review").unwrap().description,
            "Reviews code thoroughly"
        );
        assert_eq!(app.history.list_versions("review").unwrap().len(), 1);
    }

    #[test]
    fn test_import_plain_markdown() {
        let (tmp, app) = testing::app();
        let path = tmp.path().join("notes.md");
        std::fs::write(
            &path,
            "# Release Notes\n\n## Rules\n\n1. Group changes by type\n2. Link every PR\n",
        )
        .unwrap();

        import(&app, path.to_str().unwrap(), ImportOptions::default()).unwrap();
        let skill = app.store.get("release-notes").unwrap();
        assert_eq!(skill.rules, vec!["Group changes by type", "Link every PR"]);
    }

    #[test]
    fn test_import_requires_name() {
        let (tmp, app) = testing::app();
        let path = tmp.path().join("anon.json");
        std::fs::write(&path, r#"{"description": "No name"}"#).unwrap();
        let err = import(&app, path.to_str().unwrap(), ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("--name"));
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        let (_tmp, app) = testing::app();
        app.store.add(&sample()).unwrap();
        assert!(export(&app, "review", "xml", None).is_err());
    }
}
