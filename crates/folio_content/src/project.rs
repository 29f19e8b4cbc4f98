use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const BUILTIN_PROJECTS: &str = include_str!("../data/projects.toml");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("project not found: `{0}`")]
    NotFound(String),

    #[error("failed to parse project data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate project slug `{0}`")]
    DuplicateSlug(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

/// Playback offset for video media, in whole seconds.
///
/// Data files give either a number of seconds (`5`) or a `"m:ss"` string
/// (`"1:30"` is 90 seconds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStartTime")]
pub struct StartTime(pub u32);

impl StartTime {
    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn parse_clock(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let (minutes, seconds) = match s.split_once(':') {
            Some((m, sec)) => (m, sec),
            None => ("0", s),
        };
        let minutes: u32 = minutes
            .trim()
            .parse()
            .map_err(|_| format!("invalid minutes in start time `{s}`"))?;
        let seconds: u32 = seconds
            .trim()
            .parse()
            .map_err(|_| format!("invalid seconds in start time `{s}`"))?;
        if s.contains(':') && seconds >= 60 {
            return Err(format!("seconds out of range in start time `{s}`"));
        }
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .map(StartTime)
            .ok_or_else(|| format!("start time `{s}` is too large"))
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStartTime {
    Seconds(u32),
    Clock(String),
}

impl TryFrom<RawStartTime> for StartTime {
    type Error = String;

    fn try_from(raw: RawStartTime) -> Result<Self, Self::Error> {
        match raw {
            RawStartTime::Seconds(s) => Ok(StartTime(s)),
            RawStartTime::Clock(s) => StartTime::parse_clock(&s),
        }
    }
}

/// One portfolio entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Project {
    pub id: u32,
    pub slug: String,
    pub title: String,
    /// Paragraphs
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub media_start_time: Option<StartTime>,
    #[serde(default)]
    pub github_url: Option<String>,
    pub published_date: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub gradient: Option<String>,
}

#[derive(Deserialize)]
struct ProjectFile {
    #[serde(default)]
    projects: Vec<Project>,
}

/// The ordered list of projects.
#[derive(Clone, Debug, Default)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

impl ProjectCatalog {
    /// Projects bundled with the crate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_toml_str(BUILTIN_PROJECTS)
    }

    /// Parse a `[[projects]]` TOML document. Slugs must be unique.
    pub fn from_toml_str(src: &str) -> Result<Self, ContentError> {
        let file: ProjectFile = toml::from_str(src)?;
        for (i, p) in file.projects.iter().enumerate() {
            if file.projects[..i].iter().any(|q| q.slug == p.slug) {
                return Err(ContentError::DuplicateSlug(p.slug.clone()));
            }
        }
        debug!(count = file.projects.len(), "loaded projects");
        Ok(Self {
            projects: file.projects,
        })
    }

    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn featured(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.featured)
    }

    pub fn by_slug(&self, slug: &str) -> Result<&Project, ContentError> {
        self.projects
            .iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| ContentError::NotFound(slug.to_string()))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_projects_load() {
        let catalog = ProjectCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 4);

        let featured: Vec<&str> = catalog.featured().map(|p| p.slug.as_str()).collect();
        assert_eq!(featured, vec!["dafdev-portfolio", "sisirptpn"]);

        let sisir = catalog.by_slug("sisirptpn").unwrap();
        assert_eq!(sisir.media_type, MediaType::Video);
        assert_eq!(sisir.media_start_time, Some(StartTime(5)));
        assert_eq!(sisir.description.len(), 4);
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let catalog = ProjectCatalog::builtin().unwrap();
        let err = catalog.by_slug("nope").unwrap_err();
        assert!(matches!(err, ContentError::NotFound(ref s) if s == "nope"));
    }

    #[test]
    fn start_time_forms() {
        assert_eq!(StartTime::parse_clock("1:30"), Ok(StartTime(90)));
        assert_eq!(StartTime::parse_clock("45"), Ok(StartTime(45)));
        assert!(StartTime::parse_clock("1:75").is_err());
        assert!(StartTime::parse_clock("a:10").is_err());
        assert_eq!(StartTime(90).to_string(), "1:30");
    }

    #[test]
    fn start_time_from_toml_string() {
        let src = r#"
[[projects]]
id = 9
slug = "demo"
title = "Demo"
published_date = "Jan 1, 2026"
media_start_time = "2:05"
"#;
        let catalog = ProjectCatalog::from_toml_str(src).unwrap();
        let demo = catalog.by_slug("demo").unwrap();
        assert_eq!(demo.media_start_time.map(StartTime::seconds), Some(125));
        assert_eq!(demo.media_type, MediaType::Image);
        assert!(!demo.featured);
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let src = r#"
[[projects]]
id = 1
slug = "same"
title = "A"
published_date = "x"

[[projects]]
id = 2
slug = "same"
title = "B"
published_date = "y"
"#;
        assert!(matches!(
            ProjectCatalog::from_toml_str(src),
            Err(ContentError::DuplicateSlug(_))
        ));
    }
}
