//! Request routing for the backend JSON API.

use super::auth;
use super::error::ApiError;
use super::http::{Request, Response};
use super::store::{PublicUser, Store};
use serde_json::{json, Value};

const INDEX_HTML: &str = include_str!("../../web/index.html");

/// Serve one request against the store. Never fails: errors become JSON
/// error responses.
pub fn handle(store: &mut Store, request: &Request) -> Response {
    match route(store, request) {
        Ok(response) => response,
        Err(error) => {
            if error.status() >= 500 {
                log::error!("{} {} failed: {}", request.method, request.path, error);
            }
            Response::from_error(&error)
        }
    }
}

fn route(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    let segments: Vec<&str> = req
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (req.method.as_str(), segments.as_slice()) {
        ("GET", []) | ("GET", ["index.html"]) => Ok(Response::html(INDEX_HTML)),

        ("POST", ["api", "register"]) => register(store, req),
        ("POST", ["api", "login"]) => login(store, req),
        ("POST", ["api", "logout"]) => logout(store, req),
        ("GET", ["api", "me"]) => me(store, req),

        ("GET", ["api", "posts"]) => ok(json!(store.posts())),
        ("POST", ["api", "posts"]) => create_post(store, req),
        ("POST", ["api", "posts", id, "like"]) => {
            let post = store.like_post(parse_id(id)?)?;
            ok(json!(post))
        }
        ("DELETE", ["api", "posts", id]) => {
            let id = parse_id(id)?;
            let caller = current_user(store, req);
            let removed = store.delete_post(id, caller.as_ref())?;
            ok(json!(removed))
        }

        ("GET", ["api", "highscore"]) => ok(json!({ "highscore": store.highscore() })),
        ("POST", ["api", "highscore"]) => submit_score(store, req),
        ("GET", ["api", "leaderboard"]) => ok(json!(store.leaderboard())),
        ("POST", ["api", "leaderboard", "clear"]) => {
            if current_user(store, req).is_none() {
                return Err(ApiError::unauthenticated());
            }
            store.clear_leaderboard()?;
            ok(json!({ "ok": true }))
        }

        ("GET", ["api", "chats"]) => ok(json!(store.chats())),
        ("POST", ["api", "chats"]) => {
            let body = req.json_body()?;
            let author = current_user(store, req);
            let message = store.post_chat(&text_field(&body, "text"), author.as_ref())?;
            ok(json!(message))
        }

        _ => Err(ApiError::not_found()),
    }
}

fn ok(value: Value) -> Result<Response, ApiError> {
    Ok(Response::json(200, &value))
}

fn current_user(store: &Store, req: &Request) -> Option<PublicUser> {
    let token = auth::bearer_token(req.header("authorization"))?;
    store.user_for_token(token)
}

/// A body field as text. Numbers are accepted and stringified; anything
/// else (missing, null, objects) reads as empty.
fn text_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Scores arrive as numbers or numeric strings. Anything else, including
/// negative or fractional junk, counts as 0; fractions are truncated.
fn score_field(body: &Value) -> u64 {
    let raw = match body.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() && score > 0.0 => score.trunc() as u64,
        _ => 0,
    }
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| ApiError::not_found())
}

fn register(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    let body = req.json_body()?;
    let user = store.register(&text_field(&body, "username"), &text_field(&body, "password"))?;
    ok(json!(user))
}

fn login(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    let body = req.json_body()?;
    let (token, user) =
        store.login(&text_field(&body, "username"), &text_field(&body, "password"))?;
    ok(json!({ "token": token, "user": user }))
}

fn logout(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    if let Some(token) = auth::bearer_token(req.header("authorization")) {
        store.logout(token)?;
    }
    ok(json!({ "ok": true }))
}

fn me(store: &Store, req: &Request) -> Result<Response, ApiError> {
    let user = current_user(store, req).ok_or_else(ApiError::unauthenticated)?;
    ok(json!(user))
}

fn create_post(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    let body = req.json_body()?;
    let author = current_user(store, req);
    let post = store.create_post(&text_field(&body, "text"), author.as_ref())?;
    ok(json!(post))
}

fn submit_score(store: &mut Store, req: &Request) -> Result<Response, ApiError> {
    let score = score_field(&req.json_body()?);
    let player = current_user(store, req);
    let highscore = store.submit_score(score, player.as_ref())?;
    ok(json!({ "highscore": highscore }))
}
