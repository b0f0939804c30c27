//! The engagement ledger: sole writer of balances, reads, suggestions and redemptions.
//!
//! Every mutating operation holds the writer lock and runs in one SQLite
//! transaction, so it either applies completely or not at all.

pub mod rules;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::auth::constant_time_compare;
use crate::catalog::RewardCatalog;
use crate::db::{self, Repository};
use crate::errors::AppError;
use crate::models::{
    leaderboard, Analytics, CatalogItem, CreateArticleRequest, Employee, FeedFilter, FeedItem,
    LeaderboardEntry, NewsArticle, RedemptionMode, RedemptionOutcome, RedemptionRecord, Reward,
    Suggestion, SuggestionOutcome, SuggestionStatus, VoteOutcome,
};

pub struct Ledger {
    repo: Repository,
    /// Serializes writers; also the source of randomness for gift recipients.
    writer: Mutex<StdRng>,
}

impl Ledger {
    pub fn new(repo: Repository) -> Self {
        Self::with_rng(repo, StdRng::from_os_rng())
    }

    /// Use a caller-supplied RNG, e.g. a seeded one for reproducible gifts.
    pub fn with_rng(repo: Repository, rng: StdRng) -> Self {
        Self {
            repo,
            writer: Mutex::new(rng),
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub async fn revision_id(&self) -> Result<i64, AppError> {
        self.repo.get_revision_id().await
    }

    async fn employee(&self, employee_id: &str) -> Result<Employee, AppError> {
        self.repo
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))
    }

    /// Look up an employee whose id and pin both match.
    pub async fn authenticate(&self, employee_id: &str, pin: &str) -> Result<Employee, AppError> {
        match self.repo.get_employee(employee_id).await? {
            Some(employee) if constant_time_compare(&employee.pin, pin) => {
                tracing::info!(employee = %employee.id, "Employee logged in");
                Ok(employee)
            }
            _ => {
                tracing::warn!(employee = %employee_id, "Rejected login");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Mark an article as read and pay the award once.
    ///
    /// The award is derived from importance and age; `claimed_points` is only
    /// compared against it for diagnostics.
    pub async fn vote_article(
        &self,
        employee_id: &str,
        article_id: &str,
        claimed_points: Option<i64>,
    ) -> Result<VoteOutcome, AppError> {
        let _writer = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let employee = db::fetch_employee(&mut tx, employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;
        let article = db::fetch_article(&mut tx, article_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", article_id)))?;

        let now = Utc::now();
        let awarded = rules::read_award(article.importance, article.date, now);

        if let Some(claimed) = claimed_points.filter(|claimed| *claimed != awarded) {
            tracing::warn!(
                employee = %employee_id,
                article = %article_id,
                claimed,
                awarded,
                "Ignoring client-claimed read award"
            );
        }

        if article.is_read_by(employee_id)
            || !db::record_read(&mut tx, article_id, employee_id, now).await?
        {
            tracing::debug!(employee = %employee_id, article = %article_id, "Article already read");
            return Ok(VoteOutcome {
                employee,
                article,
                awarded: 0,
                already_read: true,
            });
        }

        db::bump_article_stats(&mut tx, article_id).await?;
        db::credit_points(&mut tx, employee_id, awarded).await?;
        db::bump_revision(&mut tx).await?;

        let employee = db::fetch_employee(&mut tx, employee_id)
            .await?
            .ok_or_else(|| AppError::Internal("Employee vanished during vote".to_string()))?;
        let article = db::fetch_article(&mut tx, article_id)
            .await?
            .ok_or_else(|| AppError::Internal("Article vanished during vote".to_string()))?;

        tx.commit().await?;

        tracing::info!(
            employee = %employee_id,
            article = %article_id,
            awarded,
            balance = employee.points,
            "Read award credited"
        );

        Ok(VoteOutcome {
            employee,
            article,
            awarded,
            already_read: false,
        })
    }

    /// Record a suggestion and credit its author.
    ///
    /// `text` is expected to be validated already. An unknown author still
    /// gets the suggestion recorded, without name or credit.
    pub async fn submit_suggestion(
        &self,
        author_id: &str,
        text: &str,
        is_anonymous: bool,
    ) -> Result<SuggestionOutcome, AppError> {
        let _writer = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let author = db::fetch_employee(&mut tx, author_id).await?;

        let suggestion = Suggestion {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            date: Utc::now(),
            is_anonymous,
            author_name: if is_anonymous {
                None
            } else {
                author.as_ref().map(|a| a.name.clone())
            },
            status: SuggestionStatus::Pending,
        };
        db::insert_suggestion(&mut tx, &suggestion).await?;

        if author.is_some() {
            db::credit_points(&mut tx, author_id, rules::SUGGESTION_AWARD).await?;
        } else {
            tracing::warn!(author = %author_id, "Suggestion from unknown employee, no credit");
        }
        db::bump_revision(&mut tx).await?;

        let employee = match author {
            Some(_) => db::fetch_employee(&mut tx, author_id).await?,
            None => None,
        };
        let suggestions = db::fetch_suggestions(&mut tx).await?;

        tx.commit().await?;

        tracing::info!(suggestion = %suggestion.id, is_anonymous, "Suggestion submitted");

        Ok(SuggestionOutcome {
            suggestions,
            employee,
        })
    }

    /// Move a suggestion along `PENDING -> REVIEW -> ACCEPTED | REJECTED`.
    pub async fn transition_suggestion(
        &self,
        id: &str,
        new_status: SuggestionStatus,
    ) -> Result<Vec<Suggestion>, AppError> {
        let _writer = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let current = db::fetch_suggestion(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suggestion {} not found", id)))?;

        if !current.status.can_transition_to(new_status) {
            tracing::warn!(
                suggestion = %id,
                from = current.status.as_str(),
                to = new_status.as_str(),
                "Rejected suggestion transition"
            );
            return Err(AppError::InvalidTransition(format!(
                "Cannot move suggestion {} from {} to {}",
                id,
                current.status.as_str(),
                new_status.as_str()
            )));
        }

        db::update_suggestion_status(&mut tx, id, new_status).await?;
        db::bump_revision(&mut tx).await?;
        let suggestions = db::fetch_suggestions(&mut tx).await?;

        tx.commit().await?;

        tracing::info!(suggestion = %id, status = new_status.as_str(), "Suggestion moderated");
        Ok(suggestions)
    }

    /// Delete a suggestion; only ACCEPTED or REJECTED ones may go.
    pub async fn delete_suggestion(&self, id: &str) -> Result<Vec<Suggestion>, AppError> {
        let _writer = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let current = db::fetch_suggestion(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suggestion {} not found", id)))?;

        if !current.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Cannot delete suggestion {} while {}",
                id,
                current.status.as_str()
            )));
        }

        db::remove_suggestion(&mut tx, id).await?;
        db::bump_revision(&mut tx).await?;
        let suggestions = db::fetch_suggestions(&mut tx).await?;

        tx.commit().await?;

        tracing::info!(suggestion = %id, "Suggestion deleted");
        Ok(suggestions)
    }

    /// Publish an article; it lands at the head of the feed.
    pub async fn create_article(
        &self,
        request: &CreateArticleRequest,
    ) -> Result<Vec<NewsArticle>, AppError> {
        let _writer = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let article = NewsArticle {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.clone(),
            summary: request.summary.clone(),
            content: request.content.clone(),
            image_url: request.image_url.clone(),
            date: Utc::now(),
            sector: request.sector,
            importance: request.importance,
            read_by: Vec::new(),
            stats: Default::default(),
        };
        db::insert_article(&mut tx, &article).await?;
        db::bump_revision(&mut tx).await?;
        let news = db::fetch_news(&mut tx).await?;

        tx.commit().await?;

        tracing::info!(article = %article.id, audience = article.sector.as_str(), "Article published");
        Ok(news)
    }

    /// Charge one unit of `reward` and record it.
    ///
    /// In shared mode a random colleague from the target sector also gets a
    /// free gift leg; the payer is charged the same single cost. No eligible
    /// colleague means no gift leg, the purchase itself still goes through.
    pub async fn redeem_reward(
        &self,
        employee_id: &str,
        reward: &Reward,
        mode: RedemptionMode,
    ) -> Result<RedemptionOutcome, AppError> {
        let mut rng = self.writer.lock().await;
        let mut tx = self.repo.begin().await?;

        let payer = db::fetch_employee(&mut tx, employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

        if payer.points < reward.cost {
            tracing::warn!(
                employee = %employee_id,
                reward = %reward.id,
                cost = reward.cost,
                balance = payer.points,
                "Redemption rejected"
            );
            return Err(AppError::InsufficientBalance {
                required: reward.cost,
                available: payer.points,
            });
        }

        db::debit_points(&mut tx, &payer.id, reward.cost).await?;

        let now = Utc::now();
        let payer_leg = RedemptionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: payer.id.clone(),
            reward_name: reward.name.clone(),
            cost: reward.cost,
            date: now,
            qr_token: rules::payer_token(&payer.id, now),
            gifted_to: None,
            gifted_to_id: None,
            is_gift: false,
        };
        db::insert_redemption(&mut tx, &payer_leg).await?;
        let mut records = vec![payer_leg];

        if let RedemptionMode::Shared { target_sector } = mode {
            let candidates = db::fetch_sector_members(&mut tx, target_sector, &payer.id).await?;
            match rules::pick_recipient(&mut *rng, &candidates) {
                Some(recipient) => {
                    let gift_leg = RedemptionRecord {
                        id: uuid::Uuid::new_v4().to_string(),
                        user_id: payer.id.clone(),
                        reward_name: rules::gift_reward_name(&reward.name, &payer.name),
                        cost: 0,
                        date: now,
                        qr_token: rules::gift_token(&recipient.id, now),
                        gifted_to: Some(recipient.name.clone()),
                        gifted_to_id: Some(recipient.id.clone()),
                        is_gift: true,
                    };
                    db::insert_redemption(&mut tx, &gift_leg).await?;
                    records.push(gift_leg);
                }
                None => {
                    tracing::info!(
                        employee = %employee_id,
                        sector = target_sector.as_str(),
                        "No eligible gift recipient, recording solo redemption"
                    );
                }
            }
        }

        db::bump_revision(&mut tx).await?;
        let employee = db::fetch_employee(&mut tx, employee_id)
            .await?
            .ok_or_else(|| AppError::Internal("Employee vanished during redemption".to_string()))?;

        tx.commit().await?;

        let gifted_to = records.iter().find_map(|r| r.gifted_to.clone());
        tracing::info!(
            employee = %employee_id,
            reward = %reward.id,
            cost = reward.cost,
            balance = employee.points,
            gifted_to = gifted_to.as_deref().unwrap_or("-"),
            "Reward redeemed"
        );

        Ok(RedemptionOutcome {
            employee,
            records,
            gifted_to,
        })
    }

    /// Records the employee paid for or received as a gift, newest first.
    pub async fn redemptions_for(
        &self,
        employee_id: &str,
    ) -> Result<Vec<RedemptionRecord>, AppError> {
        self.employee(employee_id).await?;
        self.repo.redemptions_for(employee_id).await
    }

    /// The employee's feed with the award each article would pay right now.
    pub async fn news_feed(
        &self,
        employee_id: &str,
        filter: FeedFilter,
    ) -> Result<Vec<FeedItem>, AppError> {
        let employee = self.employee(employee_id).await?;
        let now = Utc::now();

        Ok(self
            .repo
            .list_news()
            .await?
            .into_iter()
            .filter(|article| filter == FeedFilter::All || article.sector.includes(employee.sector))
            .map(|article| FeedItem {
                potential_points: rules::read_award(article.importance, article.date, now),
                is_late: rules::is_late(article.date, now),
                already_read: article.is_read_by(employee_id),
                article,
            })
            .collect())
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let employees = self.repo.list_employees().await?;
        Ok(leaderboard(&employees))
    }

    /// Catalog with affordability for one employee.
    pub async fn catalog_for(
        &self,
        employee_id: &str,
        catalog: &RewardCatalog,
    ) -> Result<Vec<CatalogItem>, AppError> {
        let employee = self.employee(employee_id).await?;
        Ok(catalog
            .rewards()
            .iter()
            .map(|reward| CatalogItem {
                affordable: employee.points >= reward.cost,
                reward: reward.clone(),
            })
            .collect())
    }

    pub async fn analytics(&self) -> Result<Analytics, AppError> {
        let snapshot = self.repo.get_datastore().await?;
        Ok(Analytics::compute(
            &snapshot.news,
            &snapshot.suggestions,
            &snapshot.redemptions,
        ))
    }
}
