//! Input data model for per-article gap observations
//!
//! `ArticleGapRecord` is produced once per detected gap per article by the
//! upstream content extractor. Records are immutable inputs to the engine;
//! nothing in this crate mutates upstream state.

use serde::{Deserialize, Serialize};

/// Ordinal severity of a gap as observed on a single article
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor omission, article still usable
    Low,
    /// Important section missing or insufficient
    Medium,
    /// Gap blocks the documented workflow
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Closed set of article categories recognized by the upstream classifier
///
/// Unknown category strings fall back to `General` rather than failing the
/// record, matching the upstream classifier's own fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Getting Started")]
    GettingStarted,
    #[serde(rename = "Roles & Permissions")]
    RolesPermissions,
    Collaboration,
    #[serde(rename = "Projects & Phases")]
    ProjectsPhases,
    Integrations,
    #[serde(rename = "API")]
    Api,
    Troubleshooting,
    #[serde(rename = "Account & Management")]
    AccountManagement,
    Security,
    General,
}

impl Category {
    /// All recognized categories, in classifier order
    pub const ALL: [Category; 10] = [
        Category::GettingStarted,
        Category::RolesPermissions,
        Category::Collaboration,
        Category::ProjectsPhases,
        Category::Integrations,
        Category::Api,
        Category::Troubleshooting,
        Category::AccountManagement,
        Category::Security,
        Category::General,
    ];

    /// Display name as used by the upstream classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GettingStarted => "Getting Started",
            Category::RolesPermissions => "Roles & Permissions",
            Category::Collaboration => "Collaboration",
            Category::ProjectsPhases => "Projects & Phases",
            Category::Integrations => "Integrations",
            Category::Api => "API",
            Category::Troubleshooting => "Troubleshooting",
            Category::AccountManagement => "Account & Management",
            Category::Security => "Security",
            Category::General => "General",
        }
    }

    /// Stable slug used inside canonical keys
    pub fn slug(&self) -> &'static str {
        match self {
            Category::GettingStarted => "getting-started",
            Category::RolesPermissions => "roles-permissions",
            Category::Collaboration => "collaboration",
            Category::ProjectsPhases => "projects-phases",
            Category::Integrations => "integrations",
            Category::Api => "api",
            Category::Troubleshooting => "troubleshooting",
            Category::AccountManagement => "account-management",
            Category::Security => "security",
            Category::General => "general",
        }
    }

    /// Parse a classifier-supplied category name, falling back to `General`
    pub fn parse_lossy(name: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Category::General)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content type of the source article, as classified upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "How-to")]
    HowTo,
    Guide,
    #[serde(rename = "FAQ")]
    Faq,
    Reference,
    Troubleshooting,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::HowTo => "How-to",
            ContentType::Guide => "Guide",
            ContentType::Faq => "FAQ",
            ContentType::Reference => "Reference",
            ContentType::Troubleshooting => "Troubleshooting",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured gap observation on one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleGapRecord {
    /// Stable identifier of the source article
    pub article_id: String,
    /// Category assigned by the upstream classifier
    pub category: Category,
    /// Content type of the source article
    pub content_type: ContentType,
    /// Observed severity of this gap on this article
    pub severity: Severity,
    /// Free-text gap statement from the extractor
    pub raw_gap_text: String,
}

impl ArticleGapRecord {
    pub fn new(
        article_id: impl Into<String>,
        category: Category,
        content_type: ContentType,
        severity: Severity,
        raw_gap_text: impl Into<String>,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            category,
            content_type,
            severity,
            raw_gap_text: raw_gap_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_category_parse_lossy_known_values() {
        assert_eq!(Category::parse_lossy("API"), Category::Api);
        assert_eq!(Category::parse_lossy("roles & permissions"), Category::RolesPermissions);
        assert_eq!(Category::parse_lossy("  Integrations "), Category::Integrations);
    }

    #[test]
    fn test_category_parse_lossy_unknown_falls_back_to_general() {
        assert_eq!(Category::parse_lossy("Billing"), Category::General);
        assert_eq!(Category::parse_lossy(""), Category::General);
    }

    #[test]
    fn test_category_slugs_are_unique() {
        let mut slugs: Vec<_> = Category::ALL.iter().map(|c| c.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), Category::ALL.len());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = ArticleGapRecord::new(
            "art-42",
            Category::Api,
            ContentType::Reference,
            Severity::High,
            "no mention of API rate limits",
        );

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"API\""));
        assert!(json.contains("\"high\""));

        let back: ArticleGapRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
