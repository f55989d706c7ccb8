//! skillforge: versioned, file-backed skill definitions for AI assistants.
//!
//! Skills are stored one per directory as a markdown document with a YAML
//! metadata block. Edits are snapshotted into a linear version history.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod remote;
pub mod skill;
pub mod skills;
pub mod sync;
pub mod vendors;

pub use error::{Result, SkillError};
pub use skill::{normalize_name, Skill};
