//! Stub prediction service for tests
//!
//! Must be started from inside an actix system (`#[actix_web::test]`).

use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Nothing listens on port 1; connections are refused immediately
pub const UNREACHABLE_API_URL: &str = "http://127.0.0.1:1/api";

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// One single-outcome line per submitted match
    Success,
    /// 500 with an `error` payload
    ServiceError,
    /// 502 with a non-JSON body
    BadGateway,
    /// 200 with a body that is not a prediction result
    Malformed,
}

struct StubState {
    reply: Reply,
    hits: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

pub struct StubService {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubService {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

pub fn spawn_stub(reply: Reply) -> StubService {
    let state = Arc::new(StubState {
        reply,
        hits: AtomicUsize::new(0),
        last_body: Mutex::new(None),
    });

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .route("/api/health", web::get().to(health))
            .route("/api/predict", web::post().to(predict))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind stub service");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    StubService {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

async fn predict(state: web::Data<Arc<StubState>>, body: web::Json<Value>) -> HttpResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let body = body.into_inner();
    let matches = body["matches"].as_array().cloned().unwrap_or_default();
    *state.last_body.lock().unwrap() = Some(body);

    match state.reply {
        Reply::Success => HttpResponse::Ok().json(success_body(&matches)),
        Reply::ServiceError => HttpResponse::InternalServerError()
            .json(json!({"error": "Model could not be loaded"})),
        Reply::BadGateway => HttpResponse::BadGateway().body("upstream unavailable"),
        Reply::Malformed => HttpResponse::Ok().json(json!({"status": "ok"})),
    }
}

fn success_body(matches: &[Value]) -> Value {
    let probabilities = json!({"1": 0.5, "X": 0.3, "2": 0.2});

    let predictions: Vec<Value> = matches
        .iter()
        .map(|m| {
            json!({
                "home_team": m["home_team"],
                "away_team": m["away_team"],
                "probabilities": probabilities,
            })
        })
        .collect();

    let system: Vec<Value> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            json!({
                "match_index": i + 1,
                "home_team": m["home_team"],
                "away_team": m["away_team"],
                "selection": ["1"],
                "probabilities": probabilities,
            })
        })
        .collect();

    json!({
        "predictions": predictions,
        "system": system,
        "expected_value": -0.5,
        "win_probability": 0.5_f64.powi(matches.len() as i32),
    })
}
