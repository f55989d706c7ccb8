//! `sync`: git plumbing for the skills directory.

use super::App;
use crate::sync::GitSync;
use anyhow::Result;

/// With `remote`, point the repository at it and stop. Otherwise push and
/// pull as requested, or show status when neither is.
pub fn sync(app: &App, remote: Option<&str>, push: bool, pull: bool) -> Result<()> {
    let git = GitSync::new(app.store.root());

    if let Some(url) = remote {
        if !git.is_repo() {
            println!("Initializing git repository in {}...", git.dir().display());
        }
        git.set_remote(url)?;
        println!("✓ Remote set to: {}", url);
        return Ok(());
    }

    if push {
        println!("Pushing skills...");
        git.push()?;
        println!("✓ Skills pushed to remote");
    }

    if pull {
        println!("Pulling skills...");
        git.pull()?;
        println!("✓ Skills pulled from remote");
    }

    if push || pull {
        return Ok(());
    }

    let status = git.status()?;
    println!("\nSync Status:");
    println!("────────────────────");
    match &status.remote {
        Some(remote) => println!("  Remote: {}", remote),
        None => println!("  Remote: (not set)"),
    }
    if status.is_synced() {
        println!("  No local changes");
    } else {
        println!("  Local changes:");
        for change in &status.changes {
            println!("    {}", change);
        }
        println!("\n  Run 'skillforge sync --push' to push them.");
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    #[test]
    fn test_status_without_repository() {
        let (_tmp, app) = testing::app();
        let err = sync(&app, None, false, false).unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }
}
