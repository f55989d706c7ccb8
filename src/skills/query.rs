//! Tag and group queries over the skill store.
//!
//! Every query lists the whole store and filters in memory. Skills that fail
//! to load are logged and left out of the results.

use super::store::SkillStore;
use crate::error::Result;
use crate::skill::Skill;
use std::collections::BTreeSet;

fn loaded_skills(store: &SkillStore) -> Result<Vec<Skill>> {
    let outcome = store.list()?;
    for (dir, err) in &outcome.failures {
        tracing::warn!(skill = %dir, error = %err, "Skipping skill that failed to load");
    }
    Ok(outcome.skills)
}

/// Skills carrying `tag`, compared case-insensitively. A blank tag matches
/// nothing.
pub fn list_by_tag(store: &SkillStore, tag: &str) -> Result<Vec<Skill>> {
    Ok(filter_by_tag(loaded_skills(store)?, tag))
}

/// Skills in `group`, compared case-insensitively. A blank group matches
/// nothing.
pub fn list_by_group(store: &SkillStore, group: &str) -> Result<Vec<Skill>> {
    Ok(filter_by_group(loaded_skills(store)?, group))
}

/// Every tag in use, lowercased, deduplicated and sorted.
pub fn all_tags(store: &SkillStore) -> Result<Vec<String>> {
    let tags: BTreeSet<String> = loaded_skills(store)?
        .iter()
        .flat_map(|s| s.tags.iter().map(|t| t.to_lowercase()))
        .collect();
    Ok(tags.into_iter().collect())
}

/// Every group in use, deduplicated and sorted.
pub fn all_groups(store: &SkillStore) -> Result<Vec<String>> {
    let groups: BTreeSet<String> = loaded_skills(store)?
        .into_iter()
        .filter_map(|s| s.group)
        .filter(|g| !g.is_empty())
        .collect();
    Ok(groups.into_iter().collect())
}

pub fn filter_by_tag(skills: Vec<Skill>, tag: &str) -> Vec<Skill> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Vec::new();
    }
    skills.into_iter().filter(|s| s.has_tag(tag)).collect()
}

pub fn filter_by_group(skills: Vec<Skill>, group: &str) -> Vec<Skill> {
    let group = group.trim();
    if group.is_empty() {
        return Vec::new();
    }
    skills.into_iter().filter(|s| s.in_group(group)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, SkillStore) {
        let tmp = TempDir::new().unwrap();
        let store = SkillStore::new(tmp.path());
        store
            .add(&Skill::new("linter", "Lints").with_tags(["Quality", "style"]).with_group("Development"))
            .unwrap();
        store
            .add(&Skill::new("auditor", "Audits").with_tags(["security", "quality"]).with_group("security"))
            .unwrap();
        store.add(&Skill::new("plain", "No metadata")).unwrap();
        (tmp, store)
    }

    fn names(skills: &[Skill]) -> Vec<&str> {
        skills.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_list_by_tag_case_insensitive() {
        let (_tmp, store) = seeded();
        let hits = list_by_tag(&store, "QUALITY").unwrap();
        assert_eq!(names(&hits), vec!["auditor", "linter"]);
        assert_eq!(names(&list_by_tag(&store, "style").unwrap()), vec!["linter"]);
        assert!(list_by_tag(&store, "qual").unwrap().is_empty());
    }

    #[test]
    fn test_catalogue_entries_find_non_ascii_tags() {
        let tmp = TempDir::new().unwrap();
        let store = SkillStore::new(tmp.path());
        store
            .add(&Skill::new("tutor", "Teaches").with_tags(["Éducation"]).with_group("Études"))
            .unwrap();

        let tags = all_tags(&store).unwrap();
        assert_eq!(tags, vec!["éducation"]);
        assert_eq!(names(&list_by_tag(&store, &tags[0]).unwrap()), vec!["tutor"]);
        assert_eq!(names(&list_by_group(&store, "études").unwrap()), vec!["tutor"]);
    }

    #[test]
    fn test_list_by_group() {
        let (_tmp, store) = seeded();
        assert_eq!(names(&list_by_group(&store, "development").unwrap()), vec!["linter"]);
        assert!(list_by_group(&store, "ops").unwrap().is_empty());
    }

    #[test]
    fn test_blank_filters_match_nothing() {
        let (_tmp, store) = seeded();
        assert!(list_by_tag(&store, "").unwrap().is_empty());
        assert!(list_by_tag(&store, "  ").unwrap().is_empty());
        assert!(list_by_group(&store, "").unwrap().is_empty());
    }

    #[test]
    fn test_catalogues() {
        let (_tmp, store) = seeded();
        assert_eq!(all_tags(&store).unwrap(), vec!["quality", "security", "style"]);
        assert_eq!(all_groups(&store).unwrap(), vec!["Development", "security"]);
    }

    #[test]
    fn test_queries_skip_broken_skills() {
        let (_tmp, store) = seeded();
        let broken = store.root().join("broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("SKILL.md"), "---\ntags: [quality\n---\n").unwrap();

        assert_eq!(list_by_tag(&store, "quality").unwrap().len(), 2);
    }
}
