//! Version history commands: history, rollback, diff.

use super::App;
use crate::skills::{compare_lines, LineChange};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn history(app: &App, name: &str) -> Result<()> {
    if !app.store.exists(name) {
        bail!("skill '{}' not found", name);
    }
    let path = app.store.skill_path(name);
    let modified: DateTime<Local> = std::fs::metadata(&path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read {}", path.display()))?
        .into();

    let versions = app.history.list_versions(name)?;

    println!("\n  Version History: {}", name);
    println!("  ════════════════════════════════════════════\n");
    println!("  ● current     {}  (active)", modified.format(TIME_FORMAT));

    if versions.is_empty() {
        println!("\n  No previous versions found.");
        println!("  Versions are saved automatically when you edit a skill.\n");
        return Ok(());
    }

    for snapshot in &versions {
        let saved_at = snapshot.timestamp.with_timezone(&Local);
        println!(
            "  ○ {:<11} {}",
            format!("v{}", snapshot.version),
            saved_at.format(TIME_FORMAT)
        );
    }
    println!("\n  To restore a version: skillforge rollback {} <version>\n", name);
    Ok(())
}

/// Parse `3` or `v3`.
pub fn parse_version(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('v')
        .unwrap_or(trimmed)
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .with_context(|| format!("invalid version: {} (expected a number like '1' or 'v1')", text))
}

pub fn rollback(app: &App, name: &str, version: &str) -> Result<()> {
    let version = parse_version(version)?;
    if !app.store.exists(name) {
        bail!("skill '{}' not found", name);
    }

    let backup = app.history.rollback(&app.store, name, version)?;

    println!("\n  ✓ Restored '{}' to version {}\n", name, version);
    println!("  The previous version was saved as v{}.", backup);
    println!("  Use 'skillforge show {}' to view the restored skill.\n", name);
    Ok(())
}

/// Compare two versions. With neither given, the latest snapshot is
/// compared with the current document.
pub fn diff(app: &App, name: &str, v1: Option<u32>, v2: Option<u32>) -> Result<()> {
    if !app.store.exists(name) {
        bail!("skill '{}' not found", name);
    }

    let (v1, v2) = match (v1, v2) {
        (None, None) => {
            let Some(latest) = app.history.list_versions(name)?.first().map(|s| s.version) else {
                println!("No version history available for this skill.");
                println!("Use 'skillforge edit' to create versions.");
                return Ok(());
            };
            (latest, 0)
        }
        (v1, v2) => (v1.unwrap_or(0), v2.unwrap_or(0)),
    };

    let (left, right) = app.history.diff(&app.store, name, v1, v2)?;

    println!(
        "\nComparing {} ({}) with {} ({})",
        name,
        label(v1),
        name,
        label(v2)
    );
    println!("═══════════════════════════════════════════════════");

    let changes = compare_lines(&left, &right);
    if changes.is_empty() {
        println!("\nNo differences found.");
    }
    for change in &changes {
        match change {
            LineChange::Removed(line) => println!("- {}", line),
            LineChange::Added(line) => println!("+ {}", line),
        }
    }
    println!();
    Ok(())
}

fn label(version: u32) -> String {
    if version == 0 {
        "current".to_string()
    } else {
        format!("v{}", version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::skill::Skill;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("3").unwrap(), 3);
        assert_eq!(parse_version("v12").unwrap(), 12);
        assert!(parse_version("0").is_err());
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn test_rollback_restores_and_backs_up() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("review", "First")).unwrap();
        app.snapshot("review");
        app.store.edit("review", &Skill::new("review", "Second")).unwrap();

        rollback(&app, "review", "v1").unwrap();

        assert_eq!(app.store.get("review").unwrap().description, "First");
        let versions = app.history.list_versions("review").unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions[0].content.contains("Second"));
    }

    #[test]
    fn test_rollback_missing_version() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("review", "First")).unwrap();
        assert!(rollback(&app, "review", "4").is_err());
        assert!(rollback(&app, "ghost", "1").is_err());
        assert!(app.history.list_versions("review").unwrap().is_empty());
    }

    #[test]
    fn test_history_and_diff_run() {
        let (_tmp, app) = testing::app();
        app.store.add(&Skill::new("review", "First")).unwrap();
        diff(&app, "review", None, None).unwrap();

        app.snapshot("review");
        app.store.edit("review", &Skill::new("review", "Second")).unwrap();
        history(&app, "review").unwrap();
        diff(&app, "review", None, None).unwrap();
        diff(&app, "review", Some(1), Some(0)).unwrap();
        assert!(diff(&app, "review", Some(9), None).is_err());
    }
}
