//! Sources of skill content outside the store: stdin, local files, URLs and
//! GitHub repositories.

use crate::skills::Format;
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("skillforge/", env!("CARGO_PKG_VERSION"));

static OWNER_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid repo pattern"));

/// Where to read skill content from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    Url(String),
    GitHub { owner: String, repo: String },
    File(PathBuf),
}

/// Raw content plus the format it declares, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Path or URL the content came from
    pub origin: String,
    /// Skill name suggested by the location, used when the content has none
    pub name_hint: Option<String>,
    pub content: String,
    pub format: Option<Format>,
}

impl Source {
    /// Classify a command-line source argument. An existing local path
    /// always wins over the `owner/repo` shorthand.
    pub fn parse(arg: &str) -> Source {
        let arg = arg.trim();
        if arg == "-" {
            return Source::Stdin;
        }

        let github = arg
            .strip_prefix("https://github.com/")
            .or_else(|| arg.strip_prefix("http://github.com/"))
            .or_else(|| arg.strip_prefix("github.com/"));
        if let Some(rest) = github {
            let mut parts = rest.trim_end_matches('/').split('/');
            if let (Some(owner), Some(repo)) = (parts.next(), parts.next()) {
                if !owner.is_empty() && !repo.is_empty() {
                    return Source::GitHub {
                        owner: owner.to_string(),
                        repo: repo.trim_end_matches(".git").to_string(),
                    };
                }
            }
        }

        if arg.starts_with("http://") || arg.starts_with("https://") {
            return Source::Url(arg.to_string());
        }

        if !Path::new(arg).exists() && OWNER_REPO.is_match(arg) && Format::from_source(arg).is_none() {
            if let Some((owner, repo)) = arg.split_once('/') {
                return Source::GitHub {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                };
            }
        }

        Source::File(PathBuf::from(arg))
    }

    /// Read every payload this source provides.
    pub fn fetch(&self) -> Result<Vec<Payload>> {
        match self {
            Source::Stdin => {
                let mut content = String::new();
                std::io::stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read stdin")?;
                Ok(vec![Payload {
                    origin: "stdin".to_string(),
                    name_hint: None,
                    content,
                    format: None,
                }])
            }
            Source::File(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file {}", path.display()))?;
                let origin = path.display().to_string();
                Ok(vec![Payload {
                    format: Format::from_source(&origin),
                    name_hint: None,
                    origin,
                    content,
                }])
            }
            Source::Url(url) => {
                let content = get_text(&http_client()?, url)?;
                Ok(vec![Payload {
                    origin: url.clone(),
                    name_hint: None,
                    content,
                    format: Format::from_source(url),
                }])
            }
            Source::GitHub { owner, repo } => fetch_github(owner, repo),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin => f.write_str("stdin"),
            Source::Url(url) => f.write_str(url),
            Source::GitHub { owner, repo } => write!(f, "github.com/{}/{}", owner, repo),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One entry of a GitHub contents listing
#[derive(Debug, Deserialize)]
struct RepoEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
    url: String,
}

/// A SKILL.md found in a repository
#[derive(Debug, Clone, PartialEq, Eq)]
struct SkillFile {
    name: String,
    path: String,
    download_url: String,
}

fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(crate::vendors::REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

fn get_text(client: &reqwest::blocking::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?;
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP error fetching {}: {}", url, status);
    }
    response
        .text()
        .with_context(|| format!("Failed to read response from {}", url))
}

fn fetch_github(owner: &str, repo: &str) -> Result<Vec<Payload>> {
    let client = http_client()?;
    let root = format!("{}/repos/{}/{}/contents", GITHUB_API, owner, repo);
    let files = find_skill_files(&client, &root)
        .with_context(|| format!("Failed to list github.com/{}/{}", owner, repo))?;
    if files.is_empty() {
        bail!("no SKILL.md files found in github.com/{}/{}", owner, repo);
    }

    let mut payloads = Vec::new();
    for file in files {
        match get_text(&client, &file.download_url) {
            Ok(content) => payloads.push(Payload {
                origin: file.path,
                name_hint: Some(file.name),
                content,
                format: Some(Format::Markdown),
            }),
            Err(e) => tracing::warn!(path = %file.path, error = %e, "Skipping skill file"),
        }
    }
    Ok(payloads)
}

/// Walk a contents listing, descending into directories. Subdirectories
/// that fail to list are logged and skipped.
fn find_skill_files(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<SkillFile>> {
    let body = get_text(client, url)?;
    let entries: Vec<RepoEntry> =
        serde_json::from_str(&body).context("Unexpected GitHub contents response")?;

    let mut found = skill_files(&entries);
    for dir in entries.iter().filter(|e| e.kind == "dir") {
        match find_skill_files(client, &dir.url) {
            Ok(mut nested) => found.append(&mut nested),
            Err(e) => tracing::warn!(path = %dir.path, error = %e, "Skipping directory"),
        }
    }
    Ok(found)
}

/// SKILL.md files directly in a listing, named after their directory.
fn skill_files(entries: &[RepoEntry]) -> Vec<SkillFile> {
    entries
        .iter()
        .filter(|e| e.kind == "file" && e.name.eq_ignore_ascii_case("SKILL.md"))
        .filter_map(|e| {
            let download_url = e.download_url.clone()?;
            let name = Path::new(&e.path)
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| "SKILL".to_string());
            Some(SkillFile {
                name,
                path: e.path.clone(),
                download_url,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sources() {
        assert_eq!(Source::parse("-"), Source::Stdin);
        assert_eq!(
            Source::parse("https://example.com/skill.json"),
            Source::Url("https://example.com/skill.json".to_string())
        );
        let expected = Source::GitHub {
            owner: "anthropics".to_string(),
            repo: "skills".to_string(),
        };
        assert_eq!(Source::parse("anthropics/skills"), expected);
        assert_eq!(Source::parse("github.com/anthropics/skills"), expected);
        assert_eq!(Source::parse("https://github.com/anthropics/skills.git"), expected);
        assert_eq!(
            Source::parse("skill.yaml"),
            Source::File(PathBuf::from("skill.yaml"))
        );
        assert_eq!(
            Source::parse("exports/review.md"),
            Source::File(PathBuf::from("exports/review.md"))
        );
    }

    #[test]
    fn test_existing_path_beats_repo_shorthand() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("owner");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("repo"), "{}").unwrap();

        let arg = dir.join("repo").display().to_string();
        assert_eq!(Source::parse(&arg), Source::File(PathBuf::from(&arg)));
    }

    #[test]
    fn test_fetch_file_detects_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("skill.json");
        std::fs::write(&path, r#"{"name":"x"}"#).unwrap();

        let payloads = Source::File(path).fetch().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].format, Some(Format::Json));
        assert_eq!(payloads[0].content, r#"{"name":"x"}"#);

        assert!(Source::File(tmp.path().join("missing.md")).fetch().is_err());
    }

    #[test]
    fn test_skill_files_from_listing() {
        let entries: Vec<RepoEntry> = serde_json::from_str(
            r#"[
  {"name": "SKILL.md", "path": "pdf/SKILL.md", "type": "file",
   "download_url": "https://raw.example/pdf/SKILL.md", "url": "https://api.example/pdf/SKILL.md"},
  {"name": "README.md", "path": "README.md", "type": "file",
   "download_url": "https://raw.example/README.md", "url": "https://api.example/README.md"},
  {"name": "skill.md", "path": "skill.md", "type": "file",
   "download_url": "https://raw.example/skill.md", "url": "https://api.example/skill.md"},
  {"name": "nested", "path": "nested", "type": "dir",
   "download_url": null, "url": "https://api.example/nested"}
]"#,
        )
        .unwrap();

        let files = skill_files(&entries);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "pdf");
        assert_eq!(files[0].download_url, "https://raw.example/pdf/SKILL.md");
        assert_eq!(files[1].name, "SKILL");
    }

    #[test]
    fn test_display() {
        let source = Source::GitHub {
            owner: "o".to_string(),
            repo: "r".to_string(),
        };
        assert_eq!(source.to_string(), "github.com/o/r");
    }
}
