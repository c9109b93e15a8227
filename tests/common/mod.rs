#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use classroom_drills::storage::{LocalStore, MemoryStore};
use classroom_drills::{ApiClient, ClientConfig};

pub const USERNAME: &str = "mrs_lee";
pub const PASSWORD: &str = "secret";
pub const FRESH_ACCESS: &str = "access-fresh";
pub const REFRESH: &str = "refresh-1";

/// State of the in-process backend.
pub struct MockBackend {
    pub notifications: Mutex<Vec<Value>>,
    pub refresh_calls: AtomicUsize,
    pub notification_fetches: AtomicUsize,
    pub fail_mutations: Mutex<bool>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            notifications: Mutex::new(vec![
                json!({"id": 1, "notification_type": "drill_assigned", "title": "New drill", "message": "Animals", "is_read": false}),
                json!({"id": 2, "notification_type": "badge_earned", "title": "Badge", "message": "Star", "is_read": true}),
                json!({"id": 3, "notification_type": "transfer_request", "title": "Transfer", "message": "Bo", "is_read": false, "related_transfer": 4}),
            ]),
            refresh_calls: AtomicUsize::new(0),
            notification_fetches: AtomicUsize::new(0),
            fail_mutations: Mutex::new(false),
        }
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        *self.fail_mutations.lock().unwrap() = fail;
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<MockBackend>,
}

impl TestServer {
    pub async fn start() -> Self {
        let backend = Arc::new(MockBackend::new());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&backend));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            backend,
        }
    }

    pub fn client(&self) -> (ApiClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = ClientConfig {
            api_base_url: self.base_url.clone(),
            ..Default::default()
        };
        let client = ApiClient::new(config, store.clone() as Arc<dyn LocalStore>).unwrap();
        (client, store)
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {FRESH_ACCESS}"))
}

async fn handle(
    State(backend): State<Arc<MockBackend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let query = uri.query().unwrap_or("").to_string();
    let segments: Vec<&str> = uri
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    // anonymous endpoints
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "token"]) => {
            return if body["username"] == USERNAME && body["password"] == PASSWORD {
                reply(
                    StatusCode::OK,
                    json!({"access": FRESH_ACCESS, "refresh": REFRESH}),
                )
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "No active account found with the given credentials"}),
                )
            };
        }
        ("POST", ["api", "token", "refresh"]) => {
            backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
            return if body["refresh"] == REFRESH {
                reply(StatusCode::OK, json!({"access": FRESH_ACCESS}))
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Token is invalid or expired"}),
                )
            };
        }
        ("GET", ["api", "user", "check-username"]) => {
            let taken = query.contains("username=taken");
            return reply(StatusCode::OK, json!({"available": !taken}));
        }
        ("POST", ["api", "user", "register"]) => {
            return if body["username"] == "taken" {
                reply(
                    StatusCode::BAD_REQUEST,
                    json!({"username": ["A user with that username already exists."]}),
                )
            } else {
                reply(
                    StatusCode::CREATED,
                    json!({"id": 50, "username": body["username"], "role": body["role"]}),
                )
            };
        }
        _ => {}
    }

    if !authorized(&headers) {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Given token not valid for any token type"}),
        );
    }

    let fail_mutations = *backend.fail_mutations.lock().unwrap();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["api", "profile"]) => reply(
            StatusCode::OK,
            json!({"id": 7, "username": USERNAME, "first_name": "Ada", "last_name": "Lee", "role": "teacher"}),
        ),
        ("GET", ["api", "classrooms"]) => reply(
            StatusCode::OK,
            json!({"count": 3, "next": null, "results": [
                {"id": 1, "name": "Room 1"},
                {"id": 2, "name": "Room 2"},
                {"id": 3, "name": "Room 3"}
            ]}),
        ),
        ("GET", ["api", "classrooms", _, "points"]) => reply(
            StatusCode::OK,
            json!([
                {"student_id": 11, "username": "ana", "points": 180, "time_spent": 50.0},
                {"student_id": 12, "username": "bo", "points": 240, "time_spent": 70.0},
                {"student_id": 13, "username": "cy", "points": 180, "time_spent": 40.0}
            ]),
        ),
        ("GET", ["api", "drills", id, "results"]) => reply(
            StatusCode::OK,
            json!([
                {"id": 1, "student": 11, "student_name": "ana", "run_number": 1, "points": 90, "time_spent": 60.0, "drill": id},
                {"id": 2, "student": 11, "student_name": "ana", "run_number": 2, "points": 150, "time_spent": 55.0},
                {"id": 3, "student": 12, "student_name": "bo", "run_number": 1, "points": 120, "time_spent": 30.0}
            ]),
        ),
        ("POST", ["api", "drills", _, "results"]) => reply(
            StatusCode::CREATED,
            json!({
                "id": 99,
                "student": 7,
                "run_number": body["run_number"],
                "points": body["points"],
                "time_spent": 0.0
            }),
        ),
        ("GET", ["api", "notifications"]) => {
            backend.notification_fetches.fetch_add(1, Ordering::SeqCst);
            let list = backend.notifications.lock().unwrap().clone();
            reply(StatusCode::OK, Value::Array(list))
        }
        ("POST", ["api", "notifications", "mark-all-read"]) => {
            if fail_mutations {
                return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "db down"}));
            }
            for n in backend.notifications.lock().unwrap().iter_mut() {
                n["is_read"] = json!(true);
            }
            reply(StatusCode::OK, json!({"status": "ok"}))
        }
        ("POST", ["api", "notifications", id, "mark-read"]) => {
            if fail_mutations {
                return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "db down"}));
            }
            let id: i64 = id.parse().unwrap_or(-1);
            let mut list = backend.notifications.lock().unwrap();
            match list.iter_mut().find(|n| n["id"] == id) {
                Some(n) => {
                    n["is_read"] = json!(true);
                    reply(StatusCode::OK, json!({"status": "ok"}))
                }
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            }
        }
        ("DELETE", ["api", "notifications", id]) => {
            if fail_mutations {
                return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "db down"}));
            }
            let id: i64 = id.parse().unwrap_or(-1);
            backend.notifications.lock().unwrap().retain(|n| n["id"] != id);
            StatusCode::NO_CONTENT.into_response()
        }
        ("POST", ["api", "transfer-requests", id, action]) => {
            let status = if *action == "approve" { "approved" } else { "rejected" };
            let id: i64 = id.parse().unwrap_or(-1);
            reply(
                StatusCode::OK,
                json!({"id": id, "student": 11, "from_classroom": 1, "to_classroom": 2, "status": status}),
            )
        }
        _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
    }
}
