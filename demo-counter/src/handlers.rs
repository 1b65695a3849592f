use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use cookie_session::{CookieStore, Session, Store};
use cookie_session_axum::{IntoResponseError, SetCookies, load_or_new};

pub(crate) type AppState = Arc<CookieStore<String>>;

pub(crate) const SESSION_NAME: &str = "demo_session";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    visits: u64,
    uid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginParams {
    user: String,
}

/// Load the demo session, replacing a cookie that no longer verifies.
///
/// Without `SESSION_KEYS` every restart generates new keys, so browsers come
/// back with cookies signed by a key the server no longer has. The fresh
/// session is saved under the same name and scope, overwriting that cookie.
fn session_or_fresh<'s>(
    store: &'s CookieStore<String>,
    headers: &HeaderMap,
) -> Result<Session<'s, String>, (StatusCode, String)> {
    match load_or_new(store, headers, SESSION_NAME) {
        Err(e) if e.is_decode() => {
            tracing::warn!(error = %e, "Discarding unreadable session cookie");
            Ok(store.new_session(SESSION_NAME))
        }
        result => result.into_response_error(),
    }
}

pub(crate) async fn index(
    State(store): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut session = session_or_fresh(store.as_ref(), &headers)?;

    let visits = session.get("visits").parse::<u64>().unwrap_or(0) + 1;
    session.set("visits", visits.to_string());

    let template = IndexTemplate {
        visits,
        uid: session.get_ok("uid").cloned(),
    };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );

    let mut cookies = SetCookies::new();
    session.save(&mut cookies).into_response_error()?;
    tracing::debug!(visits, "Served index");

    Ok((cookies, html))
}

pub(crate) async fn login(
    State(store): State<AppState>,
    Query(params): Query<LoginParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = params.user.trim();
    if user.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing user".to_string()));
    }

    let mut session = session_or_fresh(store.as_ref(), &headers)?;
    session.set("uid", user.to_string());

    let mut cookies = SetCookies::new();
    session.save(&mut cookies).into_response_error()?;
    tracing::info!(user, "Logged in");

    Ok((cookies, Redirect::to("/")))
}

pub(crate) async fn logout(State(store): State<AppState>) -> impl IntoResponse {
    let mut cookies = SetCookies::new();
    store.destroy(&mut cookies, SESSION_NAME);
    (cookies, Redirect::to("/"))
}
