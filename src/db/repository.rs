//! Database repository for the ledger tables.
//!
//! Pool-level reads live on [`Repository`]. The connection-level functions
//! below are the building blocks of ledger operations and are meant to be
//! called inside a single transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::{
    ArticleStats, Audience, Datastore, Employee, Importance, NewsArticle, RedemptionRecord,
    RevisionInfo, Sector, Suggestion, SuggestionStatus,
};

const EMPLOYEE_COLUMNS: &str = "id, name, role, sector, points, pin, is_admin";
const NEWS_COLUMNS: &str = "id, title, summary, content, image_url, published_at, sector, importance, views, likes, dislikes, avg_time";
const SUGGESTION_COLUMNS: &str = "id, text, submitted_at, is_anonymous, author_name, status";
const REDEMPTION_COLUMNS: &str =
    "id, user_id, reward_name, cost, redeemed_at, qr_token, gifted_to, gifted_to_id, is_gift";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction; dropping it without commit rolls everything back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin().await?)
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("revision_id")?)
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.try_get("revision_id")?,
            generated_at: row.try_get("generated_at")?,
        })
    }

    /// Get the full datastore as one consistent snapshot.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let mut tx = self.pool.begin().await?;

        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&mut *tx)
                .await?;

        let employees = fetch_employees(&mut tx).await?;
        let news = fetch_news(&mut tx).await?;
        let suggestions = fetch_suggestions(&mut tx).await?;
        let redemptions = fetch_redemptions(&mut tx).await?;

        tx.commit().await?;

        Ok(Datastore {
            schema_version: meta.try_get("schema_version")?,
            revision_id: meta.try_get("revision_id")?,
            generated_at: meta.try_get("generated_at")?,
            employees,
            news,
            suggestions,
            redemptions,
        })
    }

    /// List all employees, ordered by name.
    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_employees(&mut conn).await
    }

    /// Get an employee by ID.
    pub async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_employee(&mut conn, id).await
    }

    /// List all articles, newest first.
    pub async fn list_news(&self) -> Result<Vec<NewsArticle>, AppError> {
        let mut tx = self.pool.begin().await?;
        let news = fetch_news(&mut tx).await?;
        tx.commit().await?;
        Ok(news)
    }

    /// Get an article by ID.
    pub async fn get_article(&self, id: &str) -> Result<Option<NewsArticle>, AppError> {
        let mut tx = self.pool.begin().await?;
        let article = fetch_article(&mut tx, id).await?;
        tx.commit().await?;
        Ok(article)
    }

    /// List all suggestions, newest first.
    pub async fn list_suggestions(&self) -> Result<Vec<Suggestion>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_suggestions(&mut conn).await
    }

    /// List every redemption record, newest first.
    pub async fn list_redemptions(&self) -> Result<Vec<RedemptionRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_redemptions(&mut conn).await
    }

    /// Records where the employee paid or received the gift, newest first.
    pub async fn redemptions_for(
        &self,
        employee_id: &str,
    ) -> Result<Vec<RedemptionRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM redemptions WHERE user_id = ? OR gifted_to_id = ? ORDER BY redeemed_at DESC, rowid DESC",
            REDEMPTION_COLUMNS
        ))
        .bind(employee_id)
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(redemption_from_row).collect()
    }
}

// ==================== META ====================

/// Bump the revision counter inside the caller's transaction.
pub async fn bump_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ==================== EMPLOYEE OPERATIONS ====================

pub async fn fetch_employees(conn: &mut SqliteConnection) -> Result<Vec<Employee>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM employees ORDER BY name, id",
        EMPLOYEE_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(employee_from_row).collect()
}

pub async fn fetch_employee(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Employee>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM employees WHERE id = ?",
        EMPLOYEE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(employee_from_row).transpose()
}

/// Members of `sector` other than `excluding_id`, in stable id order.
pub async fn fetch_sector_members(
    conn: &mut SqliteConnection,
    sector: Sector,
    excluding_id: &str,
) -> Result<Vec<Employee>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM employees WHERE sector = ? AND id <> ? ORDER BY id",
        EMPLOYEE_COLUMNS
    ))
    .bind(sector.as_str())
    .bind(excluding_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(employee_from_row).collect()
}

pub async fn insert_employee(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO employees (id, name, role, sector, points, pin, is_admin) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&employee.id)
    .bind(&employee.name)
    .bind(&employee.role)
    .bind(employee.sector.as_str())
    .bind(employee.points)
    .bind(&employee.pin)
    .bind(employee.is_admin)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add earned points to a wallet.
pub async fn credit_points(
    conn: &mut SqliteConnection,
    employee_id: &str,
    amount: i64,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE employees SET points = points + ? WHERE id = ?")
        .bind(amount)
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Employee {} not found",
            employee_id
        )));
    }
    Ok(())
}

/// Take points from a wallet; refuses to go below zero.
pub async fn debit_points(
    conn: &mut SqliteConnection,
    employee_id: &str,
    amount: i64,
) -> Result<(), AppError> {
    let result =
        sqlx::query("UPDATE employees SET points = points - ? WHERE id = ? AND points >= ?")
            .bind(amount)
            .bind(employee_id)
            .bind(amount)
            .execute(&mut *conn)
            .await?;

    if result.rows_affected() == 0 {
        let available = fetch_employee(conn, employee_id)
            .await?
            .map(|e| e.points)
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;
        return Err(AppError::InsufficientBalance {
            required: amount,
            available,
        });
    }
    Ok(())
}

// ==================== NEWS OPERATIONS ====================

pub async fn fetch_news(conn: &mut SqliteConnection) -> Result<Vec<NewsArticle>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM news ORDER BY published_at DESC, rowid DESC",
        NEWS_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    let read_rows =
        sqlx::query("SELECT article_id, employee_id FROM article_reads ORDER BY read_at, rowid")
            .fetch_all(&mut *conn)
            .await?;

    let mut readers: HashMap<String, Vec<String>> = HashMap::new();
    for row in &read_rows {
        readers
            .entry(row.try_get("article_id")?)
            .or_default()
            .push(row.try_get("employee_id")?);
    }

    rows.iter()
        .map(|row| {
            let mut article = article_from_row(row)?;
            article.read_by = readers.remove(&article.id).unwrap_or_default();
            Ok(article)
        })
        .collect()
}

pub async fn fetch_article(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<NewsArticle>, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", NEWS_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut article = article_from_row(&row)?;

    let read_rows = sqlx::query(
        "SELECT employee_id FROM article_reads WHERE article_id = ? ORDER BY read_at, rowid",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    article.read_by = read_rows
        .iter()
        .map(|r| r.try_get::<String, _>("employee_id"))
        .collect::<Result<_, _>>()?;

    Ok(Some(article))
}

pub async fn insert_article(
    conn: &mut SqliteConnection,
    article: &NewsArticle,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO news (
            id, title, summary, content, image_url, published_at, sector, importance,
            views, likes, dislikes, avg_time
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&article.id)
    .bind(&article.title)
    .bind(&article.summary)
    .bind(&article.content)
    .bind(&article.image_url)
    .bind(article.date)
    .bind(article.sector.as_str())
    .bind(article.importance.as_str())
    .bind(article.stats.views)
    .bind(article.stats.likes)
    .bind(article.stats.dislikes)
    .bind(article.stats.avg_time)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add the employee to the article's readers. Returns `false` if already there.
pub async fn record_read(
    conn: &mut SqliteConnection,
    article_id: &str,
    employee_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO article_reads (article_id, employee_id, read_at) VALUES (?, ?, ?)",
    )
    .bind(article_id)
    .bind(employee_id)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// A completed read counts as one view and one like.
pub async fn bump_article_stats(
    conn: &mut SqliteConnection,
    article_id: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE news SET views = views + 1, likes = likes + 1 WHERE id = ?")
        .bind(article_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ==================== SUGGESTION OPERATIONS ====================

pub async fn fetch_suggestions(conn: &mut SqliteConnection) -> Result<Vec<Suggestion>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM suggestions ORDER BY submitted_at DESC, rowid DESC",
        SUGGESTION_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(suggestion_from_row).collect()
}

pub async fn fetch_suggestion(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Suggestion>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM suggestions WHERE id = ?",
        SUGGESTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(suggestion_from_row).transpose()
}

pub async fn insert_suggestion(
    conn: &mut SqliteConnection,
    suggestion: &Suggestion,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO suggestions (id, text, submitted_at, is_anonymous, author_name, status) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&suggestion.id)
    .bind(&suggestion.text)
    .bind(suggestion.date)
    .bind(suggestion.is_anonymous)
    .bind(&suggestion.author_name)
    .bind(suggestion.status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_suggestion_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: SuggestionStatus,
) -> Result<(), AppError> {
    sqlx::query("UPDATE suggestions SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn remove_suggestion(conn: &mut SqliteConnection, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM suggestions WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Suggestion {} not found", id)));
    }
    Ok(())
}

// ==================== REDEMPTION OPERATIONS ====================

pub async fn fetch_redemptions(
    conn: &mut SqliteConnection,
) -> Result<Vec<RedemptionRecord>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM redemptions ORDER BY redeemed_at DESC, rowid DESC",
        REDEMPTION_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(redemption_from_row).collect()
}

pub async fn insert_redemption(
    conn: &mut SqliteConnection,
    record: &RedemptionRecord,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO redemptions (
            id, user_id, reward_name, cost, redeemed_at, qr_token, gifted_to, gifted_to_id, is_gift
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.reward_name)
    .bind(record.cost)
    .bind(record.date)
    .bind(&record.qr_token)
    .bind(&record.gifted_to)
    .bind(&record.gifted_to_id)
    .bind(record.is_gift)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// Helper functions for row conversion

fn employee_from_row(row: &SqliteRow) -> Result<Employee, AppError> {
    let sector: String = row.try_get("sector")?;
    Ok(Employee {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        role: row.try_get("role")?,
        sector: Sector::parse(&sector)
            .ok_or_else(|| AppError::Database(format!("Unknown sector '{}'", sector)))?,
        points: row.try_get("points")?,
        pin: row.try_get("pin")?,
        is_admin: row.try_get("is_admin")?,
    })
}

fn article_from_row(row: &SqliteRow) -> Result<NewsArticle, AppError> {
    let sector: String = row.try_get("sector")?;
    let importance: String = row.try_get("importance")?;
    Ok(NewsArticle {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        content: row.try_get("content")?,
        image_url: row.try_get("image_url")?,
        date: row.try_get("published_at")?,
        sector: Audience::parse(&sector)
            .ok_or_else(|| AppError::Database(format!("Unknown audience '{}'", sector)))?,
        importance: Importance::parse(&importance)
            .ok_or_else(|| AppError::Database(format!("Unknown importance '{}'", importance)))?,
        read_by: Vec::new(),
        stats: ArticleStats {
            views: row.try_get("views")?,
            likes: row.try_get("likes")?,
            dislikes: row.try_get("dislikes")?,
            avg_time: row.try_get("avg_time")?,
        },
    })
}

fn suggestion_from_row(row: &SqliteRow) -> Result<Suggestion, AppError> {
    let status: String = row.try_get("status")?;
    Ok(Suggestion {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        date: row.try_get("submitted_at")?,
        is_anonymous: row.try_get("is_anonymous")?,
        author_name: row.try_get("author_name")?,
        status: SuggestionStatus::parse(&status)
            .ok_or_else(|| AppError::Database(format!("Unknown status '{}'", status)))?,
    })
}

fn redemption_from_row(row: &SqliteRow) -> Result<RedemptionRecord, AppError> {
    Ok(RedemptionRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        reward_name: row.try_get("reward_name")?,
        cost: row.try_get("cost")?,
        date: row.try_get("redeemed_at")?,
        qr_token: row.try_get("qr_token")?,
        gifted_to: row.try_get("gifted_to")?,
        gifted_to_id: row.try_get("gifted_to_id")?,
        is_gift: row.try_get("is_gift")?,
    })
}
