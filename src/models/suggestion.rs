//! Suggestion box model and its moderation lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a suggestion.
///
/// `PENDING -> REVIEW -> {ACCEPTED, REJECTED}`; the last two are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionStatus {
    Pending,
    Review,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub const ALL: [SuggestionStatus; 4] = [
        SuggestionStatus::Pending,
        SuggestionStatus::Review,
        SuggestionStatus::Accepted,
        SuggestionStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "PENDING",
            SuggestionStatus::Review => "REVIEW",
            SuggestionStatus::Accepted => "ACCEPTED",
            SuggestionStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(SuggestionStatus::Pending),
            "REVIEW" => Some(SuggestionStatus::Review),
            "ACCEPTED" => Some(SuggestionStatus::Accepted),
            "REJECTED" => Some(SuggestionStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SuggestionStatus::Accepted | SuggestionStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: SuggestionStatus) -> bool {
        matches!(
            (self, next),
            (SuggestionStatus::Pending, SuggestionStatus::Review)
                | (SuggestionStatus::Review, SuggestionStatus::Accepted)
                | (SuggestionStatus::Review, SuggestionStatus::Rejected)
        )
    }
}

/// An idea submitted to the suggestion box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub is_anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub status: SuggestionStatus,
}

/// Request body for submitting a suggestion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuggestionRequest {
    /// Employee credited for the submission
    pub author_id: String,
    pub text: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Request body for moderating a suggestion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSuggestionStatusRequest {
    pub status: SuggestionStatus,
}

/// Result of a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionOutcome {
    pub suggestions: Vec<Suggestion>,
    /// Credited author, if the id matched an employee
    pub employee: Option<super::Employee>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use SuggestionStatus::*;

        let legal = [(Pending, Review), (Review, Accepted), (Review, Rejected)];
        for from in SuggestionStatus::ALL {
            for to in SuggestionStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{} -> {}",
                    from.as_str(),
                    to.as_str()
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SuggestionStatus::Pending.is_terminal());
        assert!(!SuggestionStatus::Review.is_terminal());
        assert!(SuggestionStatus::Accepted.is_terminal());
        assert!(SuggestionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_anonymous_suggestion_omits_author() {
        let suggestion = Suggestion {
            id: "s1".to_string(),
            text: "La màquina de cafè degota.".to_string(),
            date: Utc::now(),
            is_anonymous: true,
            author_name: None,
            status: SuggestionStatus::Pending,
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert!(json.get("authorName").is_none());
        assert_eq!(json["status"], "PENDING");
    }
}
