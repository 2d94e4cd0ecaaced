//! End-to-end smoke harness for a running mindsift server.
//!
//! Exercises every endpoint with known inputs and reports a pass/fail
//! summary. Point it at a server with `BASE_URL` (default
//! `http://localhost:8000`).

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Value), reqwest::Error> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value), reqwest::Error> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

struct Report {
    passed: usize,
    failed: usize,
}

impl Report {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
        }
    }

    fn check(&mut self, name: &str, ok: bool, detail: &str) {
        if ok {
            self.passed += 1;
            println!("  PASS  {name}");
        } else {
            self.failed += 1;
            println!("  FAIL  {name}: {detail}");
        }
    }
}

fn section(title: &str) {
    println!("\n==== {title} ====");
}

const SINGLE_CASES: [(&str, &str); 5] = [
    (
        "I feel extremely anxious about everything, my heart races and I can't stop worrying",
        "Anxiety",
    ),
    (
        "I feel so sad and hopeless, nothing makes me happy anymore",
        "Depression",
    ),
    (
        "Work deadlines are overwhelming me, I feel constant pressure and tension",
        "Stress",
    ),
    (
        "My mood swings are extreme, one moment I'm energetic and the next I'm completely down",
        "Bipolar",
    ),
    (
        "I have trouble trusting people and maintaining relationships",
        "Personality",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    println!("mindsift smoke harness against {base_url}");

    let api = ApiClient::new(base_url);
    let mut report = Report::new();

    section("service info");
    let (status, body) = api.get("/").await?;
    report.check("GET / returns 200", status == StatusCode::OK, &format!("{status}"));
    report.check(
        "GET / lists endpoints",
        body.get("endpoints").is_some(),
        "no endpoints field",
    );

    section("health");
    let (status, body) = api.get("/health").await?;
    report.check("GET /health returns 200", status == StatusCode::OK, &format!("{status}"));
    let model_loaded = body["model_loaded"].as_bool().unwrap_or(false);
    report.check(
        "model is loaded",
        model_loaded,
        "model_loaded is false; start the server with a populated MODELS_DIR",
    );

    section("categories");
    let (status, body) = api.get("/categories").await?;
    report.check("GET /categories returns 200", status == StatusCode::OK, &format!("{status}"));
    report.check(
        "five categories listed",
        body["count"] == json!(5),
        &format!("count = {}", body["count"]),
    );

    section("stats");
    let (status, body) = api.get("/stats").await?;
    report.check("GET /stats returns 200", status == StatusCode::OK, &format!("{status}"));
    report.check(
        "stats carry a model version",
        body["model_version"].is_string(),
        "no model_version field",
    );

    section("single predictions");
    for (text, expected) in SINGLE_CASES {
        let (status, body) = api.post("/predict", &json!({ "text": text })).await?;
        let predicted = body["predicted_class"].as_str().unwrap_or("<none>");
        report.check(
            &format!("predict -> {expected}"),
            status == StatusCode::OK && predicted == expected,
            &format!("status {status}, predicted {predicted}"),
        );

        let total: f64 = body["confidence_scores"]
            .as_object()
            .map(|scores| scores.values().filter_map(Value::as_f64).sum())
            .unwrap_or(0.0);
        report.check(
            "confidence sums to 1",
            (total - 1.0).abs() < 1e-6,
            &format!("sum = {total}"),
        );
    }

    section("batch prediction");
    let batch = json!({"texts": [
        "I can't sleep at night, my mind won't stop racing with worries",
        "short",
        "The workload is crushing me, I feel burned out",
    ]});
    let (status, body) = api.post("/batch-predict", &batch).await?;
    report.check("batch returns 200", status == StatusCode::OK, &format!("{status}"));
    let items = body.as_array().cloned().unwrap_or_default();
    report.check(
        "batch preserves length",
        items.len() == 3,
        &format!("{} items", items.len()),
    );
    report.check(
        "short item becomes ERROR sentinel",
        items.get(1).map(|item| item["predicted_class"] == "ERROR") == Some(true),
        "second item is not the sentinel",
    );

    section("error handling");
    let (status, _) = api.post("/predict", &json!({"text": ""})).await?;
    report.check(
        "empty text rejected",
        status == StatusCode::BAD_REQUEST,
        &format!("{status}"),
    );

    let oversized = json!({"texts": vec!["repeated test input"; 101]});
    let (status, _) = api.post("/batch-predict", &oversized).await?;
    report.check(
        "101-item batch rejected",
        status == StatusCode::BAD_REQUEST,
        &format!("{status}"),
    );

    section("summary");
    println!("{} passed, {} failed", report.passed, report.failed);
    if report.failed > 0 {
        return Err(format!("{} smoke checks failed", report.failed).into());
    }
    Ok(())
}
