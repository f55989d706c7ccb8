//! Skill persistence, history and the operations built on them.

pub mod document;
pub mod history;
pub mod query;
pub mod store;
pub mod templates;
pub mod transfer;
pub mod validate;
pub mod workspace;

pub use history::{compare_lines, LineChange, VersionHistory, VersionSnapshot};
pub use store::{ListOutcome, SkillStore};
pub use transfer::Format;
pub use validate::{validate, ValidationReport};
pub use workspace::Workspace;
