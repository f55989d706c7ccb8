//! AI-assisted commands: improve, explain, test.

use super::{print_rules, App};
use crate::generator::{skill_context, Generator, GeneratorError};
use anyhow::{bail, Context, Result};

const RULE: &str = "───────────────────────────────────";
const DOUBLE_RULE: &str = "═══════════════════════════════════════════════════";

pub fn improve(app: &App, name: &str, apply: bool) -> Result<()> {
    app.load(name)?;
    let generator = app.generator()?;
    improve_with(app, &generator, name, apply)
}

fn improve_with(app: &App, generator: &Generator, name: &str, apply: bool) -> Result<()> {
    let mut skill = app.load(name)?;
    println!(
        "Analyzing skill '{}' with {}...\n",
        name,
        generator.provider_name()
    );

    let improvement = match generator.improve(&skill) {
        Ok(improvement) => improvement,
        Err(GeneratorError::Unparsable { raw, source }) => {
            tracing::debug!(error = %source, "Improvement response was not JSON");
            println!("AI Response:\n{}", raw);
            return Ok(());
        }
        Err(e) => return Err(e).context("AI analysis failed"),
    };

    println!("Assessment:\n{}", RULE);
    println!("  {}\n", improvement.assessment);

    if !improvement.issues.is_empty() {
        println!("Issues Found:\n{}", RULE);
        for issue in &improvement.issues {
            println!("  • {}", issue);
        }
        println!();
    }

    if !improvement.improved_rules.is_empty() {
        println!("Suggested Rules:\n{}", RULE);
        print_rules(&improvement.improved_rules, "  ");
        println!();
    }

    if let Some(description) = improvement.new_description(&skill) {
        println!("Suggested Description:\n{}", RULE);
        println!("  {}\n", description);
    }

    if improvement.improved_rules.is_empty() {
        return Ok(());
    }
    if !apply {
        println!("Run with --apply to apply these improvements.");
        return Ok(());
    }

    app.snapshot(name);
    improvement.apply_to(&mut skill);
    app.store
        .edit(name, &skill)
        .context("Failed to apply improvements")?;
    println!("✓ Improvements applied!");
    println!("  Use 'skillforge rollback {} <version>' to revert.", name);
    Ok(())
}

pub fn explain(app: &App, name: &str, detailed: bool) -> Result<()> {
    let skill = app.load(name)?;
    let generator = app.generator()?;
    println!(
        "Explaining skill '{}' with {}...\n",
        name,
        generator.provider_name()
    );

    let explanation = generator
        .explain(&skill, detailed)
        .context("AI explanation failed")?;

    println!("Skill: {}", skill.name);
    println!("{}", DOUBLE_RULE);
    println!("{}\n", explanation);
    Ok(())
}

/// Run a request with the skill as context. `mock` prints the context
/// instead of calling a provider.
pub fn test(app: &App, name: &str, prompt: Option<&str>, mock: bool) -> Result<()> {
    let skill = app.load(name)?;

    println!("\nTesting skill: {}", skill.name);
    println!("{}", DOUBLE_RULE);

    if mock {
        println!("\n[Mock Mode - No API call made]");
        println!("\nSkill context that would be sent:\n{}", RULE);
        println!("{}", skill_context(&skill));
        if let Some(prompt) = prompt {
            println!("\nUser prompt:\n{}", RULE);
            println!("{}", prompt);
        }
        println!();
        return Ok(());
    }

    let Some(prompt) = prompt.filter(|p| !p.trim().is_empty()) else {
        bail!("--prompt is required (or use --mock for a dry run)");
    };

    let generator = app.generator()?;
    println!("\nRunning with {}...", generator.provider_name());
    let response = generator
        .run_test(&skill, prompt)
        .context("API call failed")?;

    println!("\nResponse:\n{}", RULE);
    println!("{}\n", response);
    Ok(())
}
