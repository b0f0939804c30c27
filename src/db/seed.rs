//! Demo plant data for an empty database.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::repository::{bump_revision, insert_article, insert_employee, insert_suggestion};
use crate::errors::AppError;
use crate::models::{
    ArticleStats, Audience, Employee, Importance, NewsArticle, Sector, Suggestion,
    SuggestionStatus,
};

fn employee(
    id: &str,
    name: &str,
    role: &str,
    sector: Sector,
    points: i64,
    pin: &str,
    is_admin: bool,
) -> Employee {
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        sector,
        points,
        pin: pin.to_string(),
        is_admin,
    }
}

pub fn demo_employees() -> Vec<Employee> {
    vec![
        employee("rootclient", "Usuari Prova", "Operari", Sector::Production, 340, "root", false),
        employee("rootadmin", "Administrador", "Super Admin", Sector::Admin, 9999, "root", true),
        employee("EMP001", "Ana García", "Resp. Màrqueting", Sector::Marketing, 850, "1234", false),
        employee("EMP002", "Pere López", "Manteniment", Sector::Production, 1250, "0000", false),
        employee("EMP003", "Llúcia Méndez", "RRHH", Sector::Office, 620, "1111", false),
        employee("EMP004", "Xavi Soria", "Logística", Sector::Production, 120, "2222", false),
    ]
}

pub fn demo_news() -> Vec<NewsArticle> {
    let now = Utc::now();
    let stats = |views, likes, dislikes, avg_time| ArticleStats {
        views,
        likes,
        dislikes,
        avg_time,
    };

    // Inserted oldest first so that equal timestamps still list newest-first.
    vec![
        NewsArticle {
            id: "3".to_string(),
            title: "Protocol de Seguretat: Carretilles".to_string(),
            summary: "Recordatori obligatori sobre zones de pas.".to_string(),
            content: "<p>Es prega extremar precaució al passadís central. L'ús d'armilla és obligatori.</p>".to_string(),
            image_url: "https://images.unsplash.com/photo-1581092921461-eab62e97a782?q=80&w=600&auto=format&fit=crop".to_string(),
            date: now - Duration::days(10),
            sector: Audience::Sector(Sector::Production),
            importance: Importance::High,
            read_by: Vec::new(),
            stats: stats(300, 10, 5, 45),
        },
        NewsArticle {
            id: "2".to_string(),
            title: "Resultats Financers Q1 2024".to_string(),
            summary: "Hem superat les expectatives de vendes.".to_string(),
            content: "<p>Gràcies a l'esforç de tots, hem incrementat l'EBITDA un 15%.</p>".to_string(),
            image_url: "https://images.unsplash.com/photo-1554224155-984063584d45?q=80&w=600&auto=format&fit=crop".to_string(),
            date: now - Duration::days(2),
            sector: Audience::Sector(Sector::Office),
            importance: Importance::Medium,
            read_by: Vec::new(),
            stats: stats(89, 20, 0, 200),
        },
        NewsArticle {
            id: "4".to_string(),
            title: "Menú Saludable al Menjador".to_string(),
            summary: "Noves opcions veganes i sense gluten.".to_string(),
            content: "<p>Atenent als suggeriments, hem ampliat el menú amb amanides de quinoa i tofu.</p>".to_string(),
            image_url: "https://images.unsplash.com/photo-1498837167922-ddd27525d352?q=80&w=600&auto=format&fit=crop".to_string(),
            date: now,
            sector: Audience::All,
            importance: Importance::Normal,
            read_by: Vec::new(),
            stats: stats(210, 90, 2, 60),
        },
        NewsArticle {
            id: "1".to_string(),
            title: "Nova Màquina Embotelladora a la Línia 2".to_string(),
            summary: "Instal·lació completada amb èxit. Millora la producció un 20%.".to_string(),
            content: "<p>L'equip d'enginyeria ha finalitzat la instal·lació de la Krones V2. Aquesta màquina permet processar 5000 ampolles més per hora.</p><p>Es requereix formació per a tots els operaris del torn de matí.</p>".to_string(),
            image_url: "https://images.unsplash.com/photo-1596450523824-343586d639b7?q=80&w=600&auto=format&fit=crop".to_string(),
            date: now,
            sector: Audience::Sector(Sector::Production),
            importance: Importance::High,
            read_by: Vec::new(),
            stats: stats(150, 45, 2, 120),
        },
    ]
}

pub fn demo_suggestions() -> Vec<Suggestion> {
    let now = Utc::now();
    vec![
        Suggestion {
            id: "2".to_string(),
            text: "La màquina de cafè de la planta 2 degota.".to_string(),
            date: now - Duration::seconds(10_000),
            is_anonymous: true,
            author_name: None,
            status: SuggestionStatus::Pending,
        },
        Suggestion {
            id: "1".to_string(),
            text: "Més opcions vegetarianes al menjador si us plau.".to_string(),
            date: now,
            is_anonymous: false,
            author_name: Some("Ana García".to_string()),
            status: SuggestionStatus::Accepted,
        },
    ]
}

/// Seed the demo plant if the database has no employees yet.
///
/// Returns whether anything was written.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
        .fetch_one(&mut *tx)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    for employee in demo_employees() {
        insert_employee(&mut tx, &employee).await?;
    }
    for article in demo_news() {
        insert_article(&mut tx, &article).await?;
    }
    for suggestion in demo_suggestions() {
        insert_suggestion(&mut tx, &suggestion).await?;
    }
    bump_revision(&mut tx).await?;

    tx.commit().await?;
    tracing::info!("Seeded demo plant data");
    Ok(true)
}
