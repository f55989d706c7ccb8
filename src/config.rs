use crate::vendors::{ProviderKind, ProviderSettings};
use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the per-user and per-project configuration directory
pub const CONFIG_DIR: &str = ".skillforge";

pub const DEFAULT_SKILLS_DIR: &str = ".claude/skills";
pub const DEFAULT_HISTORY_DIR: &str = ".claude/skills/.history";
pub const DEFAULT_WORKSPACE_FILE: &str = ".claude/workspace.yaml";

/// Keys accepted by `config set` and `config get`
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("provider", "Active AI provider (groq, openai, anthropic, ollama)"),
    ("api-key", "API key for the active provider"),
    ("groq-api-key", "Groq API key"),
    ("openai-api-key", "OpenAI API key"),
    ("anthropic-api-key", "Anthropic API key"),
    ("model", "Default model for all providers"),
    ("groq-model", "Groq-specific model"),
    ("openai-model", "OpenAI-specific model"),
    ("anthropic-model", "Anthropic-specific model"),
    ("ollama-model", "Ollama-specific model"),
    ("ollama-endpoint", "Ollama host (default: http://localhost:11434)"),
    ("skills-dir", "Directory holding skills"),
    ("history-dir", "Directory holding skill version history"),
    ("workspace-file", "Workspace file path"),
];

/// Where skills, history and the workspace live
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_file: Option<PathBuf>,
}

impl StorageConfig {
    pub fn skills_dir(&self) -> PathBuf {
        self.skills_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SKILLS_DIR))
    }

    /// History defaults to a hidden directory inside the skills directory,
    /// following a custom skills directory when one is set.
    pub fn history_dir(&self) -> PathBuf {
        match (&self.history_dir, &self.skills_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(skills)) => skills.join(".history"),
            (None, None) => PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }

    pub fn workspace_file(&self) -> PathBuf {
        self.workspace_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_FILE))
    }
}

/// Per-vendor settings as written in a config file
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn merge(&mut self, other: ProviderConfig) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Model used by every provider without its own model setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Keyed by provider name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ProviderConfig>,
    /// Model forced from the environment; beats every file setting
    #[serde(skip)]
    pub model_override: Option<String>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: env > local (.skillforge/config.local.toml) > project
    /// (.skillforge/config.toml) > user (~/.skillforge/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(CONFIG_DIR).join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        // Should be gitignored
        let local_config = Path::new(CONFIG_DIR).join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// ~/.skillforge/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join("config.toml"))
    }

    /// The user config file alone, without other layers or the environment.
    pub fn load_user() -> Result<Self> {
        match Self::user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Write to the user config file, creating its directory.
    pub fn save_user(&self) -> Result<PathBuf> {
        let path = Self::user_config_path().context("Cannot determine home directory")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Config) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.model_override.is_some() {
            self.model_override = other.model_override;
        }

        if other.storage.skills_dir.is_some() {
            self.storage.skills_dir = other.storage.skills_dir;
        }
        if other.storage.history_dir.is_some() {
            self.storage.history_dir = other.storage.history_dir;
        }
        if other.storage.workspace_file.is_some() {
            self.storage.workspace_file = other.storage.workspace_file;
        }

        for (name, provider) in other.providers {
            self.providers.entry(name).or_default().merge(provider);
        }
    }

    /// Apply environment overrides. `lookup` returns a variable's value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = lookup("SKILLFORGE_PROVIDER") {
            match provider.parse() {
                Ok(kind) => self.provider = Some(kind),
                Err(e) => tracing::warn!(error = %e, "Ignoring SKILLFORGE_PROVIDER"),
            }
        }
        if let Some(model) = lookup("SKILLFORGE_MODEL") {
            self.model_override = Some(model);
        }

        for kind in ProviderKind::ALL {
            if let Some(key) = kind.api_key_env().and_then(&lookup) {
                self.provider_entry(kind).api_key = Some(key);
            }
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.provider_entry(ProviderKind::Ollama).base_url = Some(host);
        }
    }

    fn provider_entry(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        self.providers.entry(kind.as_str().to_string()).or_default()
    }

    fn provider_config(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.get(kind.as_str())
    }

    /// Active provider, groq when unset
    pub fn active_provider(&self) -> ProviderKind {
        self.provider.unwrap_or_default()
    }

    /// Model resolution: environment, then provider-specific, then the
    /// shared `model`, then the vendor default.
    pub fn model_for(&self, kind: ProviderKind) -> String {
        self.model_override
            .clone()
            .or_else(|| self.provider_config(kind).and_then(|p| p.model.clone()))
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| kind.default_model().to_string())
    }

    pub fn base_url_for(&self, kind: ProviderKind) -> String {
        self.provider_config(kind)
            .and_then(|p| p.base_url.clone())
            .unwrap_or_else(|| kind.default_base_url().to_string())
    }

    pub fn api_key_for(&self, kind: ProviderKind) -> Option<&str> {
        self.provider_config(kind)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Resolved settings for a vendor.
    pub fn provider_settings(&self, kind: ProviderKind) -> ProviderSettings {
        ProviderSettings {
            kind,
            model: self.model_for(kind),
            base_url: self.base_url_for(kind),
            api_key: self.api_key_for(kind).map(|k| SecretString::from(k.to_string())),
        }
    }

    /// Vendors that can make a request with the current settings
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| !k.requires_api_key() || self.api_key_for(*k).is_some())
            .collect()
    }

    /// Set a value by its `config set` key. `api-key` applies to `active`.
    pub fn set_value(&mut self, key: &str, value: &str, active: ProviderKind) -> Result<()> {
        let value = value.trim().to_string();
        match key {
            "provider" => self.provider = Some(value.parse()?),
            "api-key" => self.provider_entry(active).api_key = Some(value),
            "model" => self.model = Some(value),
            "ollama-endpoint" => self.provider_entry(ProviderKind::Ollama).base_url = Some(value),
            "skills-dir" => self.storage.skills_dir = Some(PathBuf::from(value)),
            "history-dir" => self.storage.history_dir = Some(PathBuf::from(value)),
            "workspace-file" => self.storage.workspace_file = Some(PathBuf::from(value)),
            _ => match parse_provider_key(key) {
                Some((kind, ProviderField::ApiKey)) => {
                    self.provider_entry(kind).api_key = Some(value)
                }
                Some((kind, ProviderField::Model)) => self.provider_entry(kind).model = Some(value),
                None => bail!(
                    "unknown config key: {}\nRun 'skillforge config list' for available keys",
                    key
                ),
            },
        }
        Ok(())
    }

    /// Display value for a `config get` key. Secrets are masked.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let active = self.active_provider();
        let value = match key {
            "provider" => active.to_string(),
            "api-key" => display_secret(self.api_key_for(active)),
            "model" => self.model_for(active),
            "ollama-endpoint" => self.base_url_for(ProviderKind::Ollama),
            "skills-dir" => self.storage.skills_dir().display().to_string(),
            "history-dir" => self.storage.history_dir().display().to_string(),
            "workspace-file" => self.storage.workspace_file().display().to_string(),
            _ => match parse_provider_key(key) {
                Some((kind, ProviderField::ApiKey)) => display_secret(self.api_key_for(kind)),
                Some((kind, ProviderField::Model)) => self.model_for(kind),
                None => bail!("unknown config key: {}", key),
            },
        };
        Ok(value)
    }
}

enum ProviderField {
    ApiKey,
    Model,
}

/// `groq-api-key`, `openai-model` and the like
fn parse_provider_key(key: &str) -> Option<(ProviderKind, ProviderField)> {
    let (provider, field) = if let Some(p) = key.strip_suffix("-api-key") {
        (p, ProviderField::ApiKey)
    } else if let Some(p) = key.strip_suffix("-model") {
        (p, ProviderField::Model)
    } else {
        return None;
    };
    let kind: ProviderKind = provider.parse().ok()?;
    if matches!(field, ProviderField::ApiKey) && !kind.requires_api_key() {
        return None;
    }
    Some((kind, field))
}

/// Show only the ends of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn display_secret(key: Option<&str>) -> String {
    key.map(mask_key).unwrap_or_else(|| "(not set)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.active_provider(), ProviderKind::Groq);
        assert_eq!(config.model_for(ProviderKind::Groq), "llama-3.3-70b-versatile");
        assert_eq!(config.storage.skills_dir(), PathBuf::from(".claude/skills"));
        assert_eq!(config.storage.history_dir(), PathBuf::from(".claude/skills/.history"));
        assert_eq!(config.storage.workspace_file(), PathBuf::from(".claude/workspace.yaml"));
        assert_eq!(config.configured_providers(), vec![ProviderKind::Ollama]);
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
provider = "openai"
model = "shared-model"

[storage]
skills_dir = "skills"

[providers.openai]
api_key = "sk-test-1234567890"
model = "gpt-4o"
"#,
        )
        .unwrap();
        assert_eq!(config.active_provider(), ProviderKind::OpenAi);
        assert_eq!(config.model_for(ProviderKind::OpenAi), "gpt-4o");
        assert_eq!(config.model_for(ProviderKind::Groq), "shared-model");
        assert_eq!(config.storage.history_dir(), PathBuf::from("skills/.history"));
        assert!(config.configured_providers().contains(&ProviderKind::OpenAi));
    }

    #[test]
    fn test_merge_priority() {
        let mut base = Config::default();
        base.set_value("groq-api-key", "user-key", ProviderKind::Groq).unwrap();
        base.set_value("groq-model", "user-model", ProviderKind::Groq).unwrap();

        let mut project = Config::default();
        project.set_value("groq-model", "project-model", ProviderKind::Groq).unwrap();
        project.set_value("provider", "anthropic", ProviderKind::Groq).unwrap();

        base.merge(project);
        assert_eq!(base.api_key_for(ProviderKind::Groq), Some("user-key"));
        assert_eq!(base.model_for(ProviderKind::Groq), "project-model");
        assert_eq!(base.active_provider(), ProviderKind::Anthropic);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.set_value("openai-model", "from-file", ProviderKind::Groq).unwrap();
        config.apply_env(env(&[
            ("SKILLFORGE_PROVIDER", "openai"),
            ("SKILLFORGE_MODEL", "from-env"),
            ("OPENAI_API_KEY", "sk-env"),
            ("OLLAMA_HOST", "http://gpu:11434"),
            ("GROQ_API_KEY", ""),
        ]));

        assert_eq!(config.active_provider(), ProviderKind::OpenAi);
        assert_eq!(config.model_for(ProviderKind::OpenAi), "from-env");
        assert_eq!(config.base_url_for(ProviderKind::Ollama), "http://gpu:11434");
        assert_eq!(config.api_key_for(ProviderKind::Groq), None);

        let settings = config.provider_settings(ProviderKind::OpenAi);
        assert_eq!(settings.api_key.unwrap().expose_secret(), "sk-env");
    }

    #[test]
    fn test_set_and_get_values() {
        let mut config = Config::default();
        config.set_value("api-key", "gsk_abcdefghijkl", ProviderKind::Groq).unwrap();
        config.set_value("ollama-endpoint", "http://other:11434", ProviderKind::Groq).unwrap();

        assert_eq!(config.get_value("api-key").unwrap(), "gsk_...ijkl");
        assert_eq!(config.get_value("openai-api-key").unwrap(), "(not set)");
        assert_eq!(config.get_value("ollama-endpoint").unwrap(), "http://other:11434");
        assert_eq!(config.get_value("anthropic-model").unwrap(), "claude-3-5-sonnet-20241022");

        assert!(config.set_value("provider", "mistral", ProviderKind::Groq).is_err());
        assert!(config.set_value("ollama-api-key", "x", ProviderKind::Groq).is_err());
        assert!(config.set_value("colour", "blue", ProviderKind::Groq).is_err());
        assert!(config.get_value("colour").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_value("provider", "ollama", ProviderKind::Groq).unwrap();
        config.set_value("skills-dir", "my-skills", ProviderKind::Groq).unwrap();
        config.model_override = Some("not persisted".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider, Some(ProviderKind::Ollama));
        assert_eq!(loaded.storage.skills_dir(), PathBuf::from("my-skills"));
        assert!(loaded.model_override.is_none());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("sk-1234567890"), "sk-1...7890");
    }
}
