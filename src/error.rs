//! Error taxonomy for skill storage, history and import/export.

use std::path::PathBuf;

/// Errors surfaced by the store, history and transfer layers.
///
/// Every variant that concerns a particular skill carries its name so a
/// caller can tell the user which skill failed and why.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    #[error("skill '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("skill '{name}' not found")]
    NotFound { name: String },

    #[error("invalid skill name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("skill '{name}' has a malformed document: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("skill '{name}' has malformed metadata: {source}")]
    MalformedMetadata {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse {format} payload: {reason}")]
    MalformedPayload { format: String, reason: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("version {version} not found for skill '{name}'")]
    VersionNotFound { name: String, version: u32 },

    #[error("skill '{name}' has no version numbers left")]
    VersionLimit { name: String },

    #[error("I/O error for skill '{name}' at {}: {source}", path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SkillError {
    pub fn io(name: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SkillError::Io {
            name: name.to_string(),
            path: path.into(),
            source,
        }
    }

    /// Attach a skill name to an error produced before the name was known
    /// (the codec decodes text without knowing where it came from).
    pub fn with_name(self, name: &str) -> Self {
        match self {
            SkillError::MalformedDocument { reason, .. } => SkillError::MalformedDocument {
                name: name.to_string(),
                reason,
            },
            SkillError::MalformedMetadata { source, .. } => SkillError::MalformedMetadata {
                name: name.to_string(),
                source,
            },
            other => other,
        }
    }

    /// True for the existence family (`NotFound`, `VersionNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SkillError::NotFound { .. } | SkillError::VersionNotFound { .. }
        )
    }

    /// True when the on-disk document exists but cannot be read as a skill.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SkillError::MalformedDocument { .. } | SkillError::MalformedMetadata { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SkillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_skill() {
        let err = SkillError::NotFound {
            name: "code-review".to_string(),
        };
        assert_eq!(err.to_string(), "skill 'code-review' not found");

        let err = SkillError::VersionNotFound {
            name: "code-review".to_string(),
            version: 3,
        };
        assert_eq!(
            err.to_string(),
            "version 3 not found for skill 'code-review'"
        );
    }

    #[test]
    fn test_with_name_fills_document_errors() {
        let err = SkillError::MalformedDocument {
            name: String::new(),
            reason: "missing metadata block".to_string(),
        }
        .with_name("linter");
        assert!(err.to_string().contains("'linter'"));
        assert!(err.is_malformed());
        assert!(!err.is_not_found());
    }
}
