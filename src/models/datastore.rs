//! Whole-state snapshot and admin analytics.

use serde::{Deserialize, Serialize};

use super::{ArticleStats, Employee, NewsArticle, RedemptionRecord, Suggestion};

/// The root datastore containing all ledger data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub employees: Vec<Employee>,
    pub news: Vec<NewsArticle>,
    pub suggestions: Vec<Suggestion>,
    pub redemptions: Vec<RedemptionRecord>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// Per-article line of the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAnalytics {
    pub article_id: String,
    pub title: String,
    pub readers: usize,
    pub stats: ArticleStats,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCounts {
    pub pending: usize,
    pub review: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Aggregates shown on the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_views: i64,
    pub total_likes: i64,
    pub total_dislikes: i64,
    /// Mean of the per-article average reading times, in seconds
    pub avg_read_time: i64,
    pub articles: Vec<ArticleAnalytics>,
    pub suggestions: SuggestionCounts,
    pub points_redeemed: i64,
    pub gifts_sent: usize,
}

impl Analytics {
    pub fn compute(
        news: &[NewsArticle],
        suggestions: &[Suggestion],
        redemptions: &[RedemptionRecord],
    ) -> Self {
        let total_views = news.iter().map(|a| a.stats.views).sum();
        let total_likes = news.iter().map(|a| a.stats.likes).sum();
        let total_dislikes = news.iter().map(|a| a.stats.dislikes).sum();
        let avg_read_time = if news.is_empty() {
            0
        } else {
            news.iter().map(|a| a.stats.avg_time).sum::<i64>() / news.len() as i64
        };

        let articles = news
            .iter()
            .map(|a| ArticleAnalytics {
                article_id: a.id.clone(),
                title: a.title.clone(),
                readers: a.read_by.len(),
                stats: a.stats.clone(),
            })
            .collect();

        let mut counts = SuggestionCounts::default();
        for suggestion in suggestions {
            match suggestion.status {
                super::SuggestionStatus::Pending => counts.pending += 1,
                super::SuggestionStatus::Review => counts.review += 1,
                super::SuggestionStatus::Accepted => counts.accepted += 1,
                super::SuggestionStatus::Rejected => counts.rejected += 1,
            }
        }

        Self {
            total_views,
            total_likes,
            total_dislikes,
            avg_read_time,
            articles,
            suggestions: counts,
            points_redeemed: redemptions.iter().map(|r| r.cost).sum(),
            gifts_sent: redemptions.iter().filter(|r| r.is_gift).count(),
        }
    }
}
