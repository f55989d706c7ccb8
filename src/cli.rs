//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skillforge")]
#[command(author, version, about = "Manage versioned skill definitions for AI assistants", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skills directory (default: .claude/skills)
    #[arg(long, global = true, env = "SKILLFORGE_SKILLS_DIR")]
    pub skills_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up the skills directory, an API key and an example skill
    Init,

    /// Add a new skill, drafted with AI unless --manual is given
    Add {
        name: String,

        /// Skill description
        #[arg(short, long = "desc")]
        desc: String,

        /// Rule (repeatable, manual mode only)
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Group to place the skill in
        #[arg(short, long)]
        group: Option<String>,

        /// Skip AI generation and store the given values
        #[arg(long)]
        manual: bool,
    },

    /// List skills
    #[command(alias = "ls")]
    List {
        /// Only skills with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only skills in this group
        #[arg(short, long)]
        group: Option<String>,

        /// Full descriptions and extra metadata
        #[arg(short, long)]
        long: bool,
    },

    /// Show a skill
    Show {
        name: String,

        /// Print the stored document as is
        #[arg(long)]
        raw: bool,
    },

    /// Edit a skill, saving the current version to history first
    Edit {
        name: String,

        /// New name
        #[arg(long = "name")]
        new_name: Option<String>,

        /// New description
        #[arg(short, long = "desc")]
        desc: Option<String>,

        /// Replacement rules (repeatable)
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// New group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Remove a skill
    #[command(alias = "rm")]
    Remove { name: String },

    /// Check a skill for problems
    Validate { name: String },

    /// Show saved versions of a skill
    History { name: String },

    /// Restore a saved version of a skill
    Rollback {
        name: String,

        /// Version number, as `3` or `v3`
        version: String,
    },

    /// Compare two versions of a skill (0 is the current document)
    Diff {
        name: String,

        #[arg(long)]
        v1: Option<u32>,

        #[arg(long)]
        v2: Option<u32>,
    },

    /// Built-in skill templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Write a skill as JSON, YAML or markdown
    Export {
        name: String,

        /// json, yaml or md
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import skills from a file, URL, stdin (-) or GitHub repository
    Import {
        source: String,

        /// json, yaml or md; overrides the format implied by the source
        #[arg(short, long)]
        format: Option<String>,

        /// Name for the imported skill
        #[arg(short, long)]
        name: Option<String>,

        /// Improve each imported skill with AI
        #[arg(long)]
        improve: bool,

        /// Overwrite skills that already exist
        #[arg(long)]
        all: bool,
    },

    /// Manage skill tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage skill groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Per-project skill selection
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },

    /// Ask AI for improvements to a skill
    Improve {
        name: String,

        /// Apply the suggestions
        #[arg(long)]
        apply: bool,
    },

    /// Ask AI to explain a skill
    Explain {
        name: String,

        /// Include scenarios and edge cases
        #[arg(short, long)]
        detailed: bool,
    },

    /// Run a prompt with a skill loaded
    Test {
        name: String,

        /// Request to run against the skill
        #[arg(short, long)]
        prompt: Option<String>,

        /// Print the context that would be sent, without an API call
        #[arg(long)]
        mock: bool,
    },

    /// Read and write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Sync the skills directory with a git remote
    Sync {
        /// Set the remote, initializing the repository if needed
        #[arg(long)]
        remote: Option<String>,

        /// Commit and push local changes
        #[arg(long)]
        push: bool,

        /// Pull remote changes
        #[arg(long)]
        pull: bool,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List templates by category
    #[command(alias = "ls")]
    List,

    /// Show a template
    Show { name: String },

    /// Create a skill from a template
    Use {
        template: String,

        /// Name for the new skill (default: the template name)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// List every tag with its skill count
    #[command(alias = "ls")]
    List,

    /// Show skills with a tag
    Show { tag: String },

    /// Add tags to a skill
    Add {
        skill: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Remove tags from a skill
    #[command(alias = "rm")]
    Remove {
        skill: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum GroupAction {
    /// List groups and their skills
    #[command(alias = "ls")]
    List,

    /// Show skills in a group
    Show { group: String },

    /// Put a skill in a group
    Set { skill: String, group: String },

    /// Take a skill out of its group
    Unset { skill: String },
}

#[derive(Subcommand)]
pub enum WorkspaceAction {
    /// Create a workspace in the current project
    Init { name: Option<String> },

    /// Show the workspace and its active skills
    Show,

    /// Enable a skill
    Add { skill: String },

    /// Disable a skill
    #[command(alias = "rm")]
    Remove { skill: String },

    /// Enable every skill in a group
    AddGroup { group: String },

    /// Override a skill variable for this workspace
    Set {
        skill: String,
        variable: String,
        value: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a value in the user config; prompts when the value is omitted
    Set { key: String, value: Option<String> },

    /// Show a value, with secrets masked
    Get { key: String },

    /// List keys and current values
    #[command(alias = "ls")]
    List,

    /// Print the user config file path
    Path,
}
