//! Integration tests for the engagement backend.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::catalog::RewardCatalog;
use crate::config::Config;
use crate::db::{init_database, seed_demo_data, Repository};
use crate::ledger::Ledger;
use crate::summary::{Summarizer, FALLBACK_NO_KEY};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database with the demo plant
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        seed_demo_data(&pool).await.expect("Failed to seed DB");
        let ledger = Arc::new(Ledger::with_rng(
            Repository::new(pool),
            StdRng::seed_from_u64(42),
        ));

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            seed_demo_data: true,
            catalog_path: None,
            gemini_api_key: None,
            summary_model: "test-model".to_string(),
            summary_base_url: "http://127.0.0.1:1".to_string(),
        };

        let state = AppState {
            ledger,
            catalog: Arc::new(RewardCatalog::builtin()),
            summarizer: Arc::new(Summarizer::from_config(&config)),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn points(&self, employee_id: &str) -> i64 {
        let (_, body) = self.get(&format!("/api/employees/{}", employee_id)).await;
        body["data"]["points"].as_i64().unwrap()
    }

    async fn revision(&self) -> i64 {
        let (_, body) = self.get("/api/datastore/revision").await;
        body["data"]["revisionId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Request without API key
    let resp = Client::new()
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Missing API key");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/datastore"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Invalid API key");
    assert_eq!(body["revisionId"], 0);
}

#[tokio::test]
async fn test_auth_bearer_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/datastore/revision"))
        .header("Authorization", "Bearer test-api-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_auth_disabled_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let (status, body) = fixture.get("/api/rewards").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_login() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/login", json!({"employeeId": "EMP001", "pin": "1234"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Ana García");
    assert_eq!(body["data"]["points"], 850);
    assert!(body["data"].get("pin").is_none());

    let (status, body) = fixture
        .post("/api/login", json!({"employeeId": "EMP001", "pin": "9999"}))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    let (status, body) = fixture
        .post("/api/login", json!({"employeeId": "NOBODY", "pin": "1234"}))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_datastore_hides_pins() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/datastore").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["data"]["schemaVersion"].is_number());
    assert_eq!(body["data"]["revisionId"], body["revisionId"]);

    let employees = body["data"]["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 6);
    assert!(employees.iter().all(|e| e.get("pin").is_none()));
    assert_eq!(body["data"]["news"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["suggestions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vote_pays_once() {
    let fixture = TestFixture::new().await;
    let revision_before = fixture.revision().await;

    let (status, body) = fixture
        .post("/api/news/1/votes", json!({"employeeId": "rootclient"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["awarded"], 20);
    assert_eq!(body["data"]["alreadyRead"], false);
    assert_eq!(body["data"]["employee"]["points"], 360);
    assert!(body["data"]["article"]["readBy"]
        .as_array()
        .unwrap()
        .contains(&json!("rootclient")));
    assert_eq!(body["revisionId"], revision_before + 1);

    // Second vote is a no-op, whatever the client claims
    let (status, body) = fixture
        .post(
            "/api/news/1/votes",
            json!({"employeeId": "rootclient", "claimedPoints": 500}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["awarded"], 0);
    assert_eq!(body["data"]["alreadyRead"], true);
    assert_eq!(fixture.points("rootclient").await, 360);
    assert_eq!(fixture.revision().await, revision_before + 1);
}

#[tokio::test]
async fn test_vote_late_article_and_unknown_ids() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/news/3/votes", json!({"employeeId": "EMP004", "claimedPoints": 20}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["awarded"], 1);
    assert_eq!(fixture.points("EMP004").await, 121);

    let (status, body) = fixture
        .post("/api/news/nope/votes", json!({"employeeId": "EMP004"}))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = fixture
        .post("/api/news/1/votes", json!({"employeeId": "ghost"}))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_solo_redemption() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/redemptions",
            json!({"employeeId": "rootclient", "rewardId": "2"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["employee"]["points"], 90);
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["rewardName"], "Entrepà Menjador");
    assert_eq!(records[0]["cost"], 250);
    assert_eq!(records[0]["isGift"], false);
    assert!(records[0]["qrToken"]
        .as_str()
        .unwrap()
        .starts_with("DELA-rootclient-"));
    assert!(body["data"].get("giftedTo").is_none());

    let (status, body) = fixture.get("/api/employees/rootclient/redemptions").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_insufficient_balance_changes_nothing() {
    let fixture = TestFixture::new().await;
    let revision_before = fixture.revision().await;

    let (status, body) = fixture
        .post(
            "/api/redemptions",
            json!({"employeeId": "rootclient", "rewardId": "3"}),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(body["error"]["details"]["required"], 1500);
    assert_eq!(body["error"]["details"]["available"], 340);

    assert_eq!(fixture.points("rootclient").await, 340);
    assert_eq!(fixture.revision().await, revision_before);
    let (_, body) = fixture.get("/api/employees/rootclient/redemptions").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_shared_redemption_gifts_colleague() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/redemptions",
            json!({
                "employeeId": "rootclient",
                "rewardId": "1",
                "mode": "SHARED",
                "targetSector": "OFFICE"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["giftedTo"], "Llúcia Méndez");
    assert_eq!(body["data"]["employee"]["points"], 240);

    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["isGift"], true);
    assert_eq!(records[1]["cost"], 0);
    assert_eq!(records[1]["giftedToId"], "EMP003");
    assert_eq!(records[1]["rewardName"], "Cafè Prèmium (Regal de Usuari Prova)");

    // The recipient sees the gift; their balance is untouched
    let (_, body) = fixture.get("/api/employees/EMP003/redemptions").await;
    let received = body["data"].as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0]["qrToken"]
        .as_str()
        .unwrap()
        .starts_with("GIFT-EMP003-"));
    assert_eq!(fixture.points("EMP003").await, 620);

    let (_, body) = fixture.get("/api/redemptions").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_redemption_request_validation() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/redemptions",
            json!({"employeeId": "rootclient", "rewardId": "1", "mode": "SHARED"}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture
        .post(
            "/api/redemptions",
            json!({"employeeId": "rootclient", "rewardId": "404"}),
        )
        .await;
    assert_eq!(status, 404);

    let (status, _) = fixture
        .post("/api/redemptions", json!({"employeeId": "ghost", "rewardId": "1"}))
        .await;
    assert_eq!(status, 404);
    assert_eq!(fixture.points("rootclient").await, 340);
}

#[tokio::test]
async fn test_suggestion_minimum_length() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/suggestions",
            json!({"authorId": "EMP004", "text": "  123456789  "}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(fixture.points("EMP004").await, 120);

    let (status, body) = fixture
        .post(
            "/api/suggestions",
            json!({"authorId": "EMP004", "text": "1234567890"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["employee"]["points"], 150);
    let newest = &body["data"]["suggestions"][0];
    assert_eq!(newest["text"], "1234567890");
    assert_eq!(newest["status"], "PENDING");
    assert_eq!(newest["authorName"], "Xavi Soria");
}

#[tokio::test]
async fn test_suggestion_lifecycle() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post(
            "/api/suggestions",
            json!({"authorId": "EMP002", "text": "Més llum a la zona de càrrega", "isAnonymous": true}),
        )
        .await;
    let id = body["data"]["suggestions"][0]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["suggestions"][0].get("authorName").is_none());
    assert_eq!(fixture.points("EMP002").await, 1280);

    // Pending suggestions cannot be deleted or jump straight to a verdict
    let (status, body) = fixture.delete(&format!("/api/suggestions/{}", id)).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    let (status, _) = fixture
        .put(
            &format!("/api/suggestions/{}/status", id),
            json!({"status": "ACCEPTED"}),
        )
        .await;
    assert_eq!(status, 409);

    let (status, _) = fixture
        .put(
            &format!("/api/suggestions/{}/status", id),
            json!({"status": "REVIEW"}),
        )
        .await;
    assert_eq!(status, 200);
    let (status, body) = fixture
        .put(
            &format!("/api/suggestions/{}/status", id),
            json!({"status": "REJECTED"}),
        )
        .await;
    assert_eq!(status, 200);
    let updated = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == json!(id))
        .unwrap();
    assert_eq!(updated["status"], "REJECTED");

    let (status, body) = fixture.delete(&format!("/api/suggestions/{}", id)).await;
    assert_eq!(status, 200);
    assert!(body["data"].as_array().unwrap().iter().all(|s| s["id"] != json!(id)));

    let (status, _) = fixture.delete(&format!("/api/suggestions/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_create_article_and_feed() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/news",
            json!({
                "title": "Nova línia d'envasat",
                "summary": "Arrenca dilluns",
                "content": "<p>La nova línia arrenca dilluns.</p>",
                "sector": "OFFICE",
                "importance": "MEDIUM"
            }),
        )
        .await;
    assert_eq!(status, 200);
    let news = body["data"].as_array().unwrap();
    assert_eq!(news.len(), 5);
    assert_eq!(news[0]["title"], "Nova línia d'envasat");
    let id = news[0]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture.get("/api/employees/EMP003/feed").await;
    assert_eq!(status, 200);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed[0]["id"], json!(id));
    assert_eq!(feed[0]["potentialPoints"], 15);
    assert_eq!(feed[0]["isLate"], false);
    assert_eq!(feed[0]["alreadyRead"], false);
    assert!(feed.iter().all(|a| a["sector"] == "OFFICE" || a["sector"] == "ALL"));

    // Production does not see it unless asking for everything
    let (_, body) = fixture.get("/api/employees/EMP004/feed").await;
    assert!(body["data"].as_array().unwrap().iter().all(|a| a["id"] != json!(id)));
    let (_, body) = fixture.get("/api/employees/EMP004/feed?filter=ALL").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (status, body) = fixture
        .post("/api/news", json!({"title": " ", "content": "x", "sector": "ALL"}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_catalog_and_affordability() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/rewards").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 8);

    let (status, body) = fixture.get("/api/employees/rootclient/rewards").await;
    assert_eq!(status, 200);
    let affordable: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["affordable"] == true)
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(affordable, vec!["1", "2"]);

    let (status, _) = fixture.get("/api/employees/ghost/rewards").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_leaderboard() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/leaderboard").await;
    assert_eq!(status, 200);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["employeeId"], "EMP002");
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["level"], "LEGEND");
    assert!(entries.iter().all(|e| e["employeeId"] != "rootadmin"));
}

#[tokio::test]
async fn test_analytics() {
    let fixture = TestFixture::new().await;

    fixture
        .post(
            "/api/redemptions",
            json!({"employeeId": "EMP002", "rewardId": "2", "mode": "SHARED", "targetSector": "MARKETING"}),
        )
        .await;

    let (status, body) = fixture.get("/api/analytics").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["totalViews"], 749);
    assert_eq!(body["data"]["pointsRedeemed"], 250);
    assert_eq!(body["data"]["giftsSent"], 1);
}

#[tokio::test]
async fn test_summary_falls_back_without_key() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post("/api/news/1/summary", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["articleId"], "1");
    assert_eq!(body["data"]["summary"], FALLBACK_NO_KEY);

    let (status, _) = fixture.post("/api/news/missing/summary", json!({})).await;
    assert_eq!(status, 404);
}
