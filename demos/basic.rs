//! Minimal tsuji example — a users service backed by an in-memory store.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice","email":"alice@example.com"}'
//!   curl http://localhost:3000/users/1
//!   curl -X DELETE http://localhost:3000/users/1
//!   curl http://localhost:3000/healthz

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tsuji::middleware::{BodyReader, Trace};
use tsuji::{App, HttpError, Request, Response, Router, Server, StatusCode, health};

#[derive(Clone, Serialize)]
struct User {
    id: String,
    name: String,
    email: String,
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
    email: String,
}

#[derive(Clone, Default)]
struct Store {
    users: Arc<Mutex<HashMap<String, User>>>,
    next_id: Arc<AtomicU64>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);

    let router = Router::new()
        .merge(user_routes(Store::default()))
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    let app = App::new(router).with(Trace::new()).with(BodyReader::new());

    Server::bind(&format!("0.0.0.0:{port}"))
        .serve(app)
        .await
        .expect("server error");
}

/// The users route group, one collaborator's slice of the route table.
fn user_routes(store: Store) -> Router {
    let list_store = store.clone();
    let create_store = store.clone();
    let get_store = store.clone();
    let delete_store = store;

    Router::new()
        .get("/users", move |_req: Request| {
            let store = list_store.clone();
            async move {
                let users: Vec<User> = store.users.lock().unwrap().values().cloned().collect();
                Ok::<_, HttpError>(Response::json(serde_json::to_vec(&users).unwrap()))
            }
        })
        .post("/users", move |req: Request| {
            let store = create_store.clone();
            async move {
                let body = req.body().cloned().unwrap_or_else(|| json!({}));
                let input: CreateUser = serde_json::from_value(body)
                    .map_err(|_| HttpError::bad_request("Invalid user payload"))?;

                let id = store.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let user = User {
                    id: id.to_string(),
                    name: input.name,
                    email: input.email,
                };
                store.users.lock().unwrap().insert(user.id.clone(), user.clone());

                Ok::<_, HttpError>(Response::builder()
                    .status(StatusCode::CREATED)
                    .header("location", &format!("/users/{}", user.id))
                    .json(serde_json::to_vec(&user).unwrap()))
            }
        })
        .get("/users/:id", move |req: Request| {
            let store = get_store.clone();
            async move {
                let id = req.param("id").unwrap_or_default().to_owned();
                let user = store.users.lock().unwrap().get(&id).cloned();
                match user {
                    Some(user) => Ok(Response::json(serde_json::to_vec(&user).unwrap())),
                    None => Err(HttpError::not_found("User not found")
                        .with_context(json!({"id": id}))),
                }
            }
        })
        .delete("/users/:id", move |req: Request| {
            let store = delete_store.clone();
            async move {
                let id = req.param("id").unwrap_or_default().to_owned();
                match store.users.lock().unwrap().remove(&id) {
                    Some(_) => Ok(Response::status(StatusCode::NO_CONTENT)),
                    None => Err(HttpError::not_found("User not found")
                        .with_context(json!({"id": id}))),
                }
            }
        })
}
