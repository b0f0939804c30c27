//! News article model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Sector;

/// Importance level of an article; determines the base read award.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Normal,
    Medium,
    High,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Normal => "NORMAL",
            Importance::Medium => "MEDIUM",
            Importance::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NORMAL" => Some(Importance::Normal),
            "MEDIUM" => Some(Importance::Medium),
            "HIGH" => Some(Importance::High),
            _ => None,
        }
    }

    /// Points for reading an article on time.
    pub fn base_award(&self) -> i64 {
        match self {
            Importance::Normal => 10,
            Importance::Medium => 15,
            Importance::High => 20,
        }
    }
}

/// Who an article is addressed to: one sector or everybody.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Audience {
    All,
    Sector(Sector),
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "ALL",
            Audience::Sector(sector) => sector.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s == "ALL" {
            Some(Audience::All)
        } else {
            Sector::parse(s).map(Audience::Sector)
        }
    }

    /// Whether an employee of `sector` sees this article in their sector feed.
    pub fn includes(&self, sector: Sector) -> bool {
        match self {
            Audience::All => true,
            Audience::Sector(target) => *target == sector,
        }
    }
}

impl TryFrom<String> for Audience {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Audience::parse(&value).ok_or_else(|| format!("unknown audience '{}'", value))
    }
}

impl From<Audience> for String {
    fn from(audience: Audience) -> Self {
        audience.as_str().to_string()
    }
}

/// Aggregate counters shown on the admin console.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    /// Average reading time in seconds
    pub avg_time: i64,
}

/// A company news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
    pub date: DateTime<Utc>,
    pub sector: Audience,
    pub importance: Importance,
    /// Ids of employees who already collected the read award
    pub read_by: Vec<String>,
    pub stats: ArticleStats,
}

impl NewsArticle {
    pub fn is_read_by(&self, employee_id: &str) -> bool {
        self.read_by.iter().any(|id| id == employee_id)
    }
}

/// Request body for creating a new article.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub sector: Audience,
    #[serde(default = "default_importance")]
    pub importance: Importance,
}

fn default_importance() -> Importance {
    Importance::Normal
}

/// Request body for marking an article as read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub employee_id: String,
    /// Award the client believes it earned; only compared, never paid.
    #[serde(default)]
    pub claimed_points: Option<i64>,
}

/// Result of a vote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub employee: super::Employee,
    pub article: NewsArticle,
    pub awarded: i64,
    pub already_read: bool,
}

/// Which articles an employee's feed shows.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedFilter {
    #[default]
    Sector,
    All,
}

/// Query string for the feed endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub filter: FeedFilter,
}

/// An article as seen by one employee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub potential_points: i64,
    pub is_late: bool,
    pub already_read: bool,
}

/// Response of the summary endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub article_id: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_awards() {
        assert_eq!(Importance::Normal.base_award(), 10);
        assert_eq!(Importance::Medium.base_award(), 15);
        assert_eq!(Importance::High.base_award(), 20);
    }

    #[test]
    fn test_audience_serde() {
        let all: Audience = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(all, Audience::All);

        let office: Audience = serde_json::from_str("\"OFFICE\"").unwrap();
        assert_eq!(office, Audience::Sector(Sector::Office));
        assert_eq!(serde_json::to_string(&office).unwrap(), "\"OFFICE\"");

        assert!(serde_json::from_str::<Audience>("\"CANTEEN\"").is_err());
    }

    #[test]
    fn test_audience_includes() {
        assert!(Audience::All.includes(Sector::Marketing));
        assert!(Audience::Sector(Sector::Production).includes(Sector::Production));
        assert!(!Audience::Sector(Sector::Production).includes(Sector::Office));
    }
}
