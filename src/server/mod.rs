//! Site server
//!
//! Page routes render posts through the content pipeline per request; API
//! routes expose the contact and checkout collaborators as JSON endpoints.
//! Collaborator failures always surface as explicit, user-readable statuses.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::checkout::{CheckoutError, CheckoutService, SessionLedger};
use crate::contact::{ContactError, ContactMessage, MessageStore};
use crate::content::markdown::ASSET_ROOT;
use crate::content::{ContentError, PostRenderer, PostStore};
use crate::templates::{PostItemData, TemplateRenderer};
use crate::theme::Theme;
use crate::Site;

/// Shared per-process state
struct AppState {
    site_title: String,
    checkout_cfg: crate::config::CheckoutConfig,
    default_theme: Theme,
    store: PostStore,
    renderer: PostRenderer,
    templates: TemplateRenderer,
    messages: MessageStore,
    checkout: Arc<dyn CheckoutService>,
}

impl AppState {
    /// Theme cookie wins; without one the site's configured default applies
    fn theme_from(&self, headers: &HeaderMap) -> Theme {
        let cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());
        Theme::from_cookie_header(cookie).unwrap_or(self.default_theme)
    }

    /// Context every page shares: site identity, theme, checkout product
    fn page_context(&self, headers: &HeaderMap) -> tera::Context {
        let mut context = self
            .templates
            .base_context(&self.site_title, self.theme_from(headers));
        context.insert("checkout_product", &self.checkout_cfg.product);
        context
    }
}

/// Start the site server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState {
        site_title: site.config.title.clone(),
        checkout_cfg: site.config.checkout.clone(),
        default_theme: site.config.default_theme,
        store: site.store(),
        renderer: PostRenderer::new(),
        templates: TemplateRenderer::new()?,
        messages: MessageStore::new(&site.messages_path),
        checkout: Arc::new(SessionLedger::new(&site.config.url)),
    });

    let app = Router::new()
        .route("/", get(home_page))
        .route("/posts", get(posts_page))
        .route("/posts/:slug", get(post_page))
        .route("/contact", get(contact_page))
        .route("/success", get(success_page))
        .route("/fail", get(fail_page))
        .route("/theme/:mode", get(set_theme))
        .route("/api/contact", post(api_contact))
        .route("/api/checkout-session", post(api_checkout_create))
        .route("/api/checkout-session/:id", get(api_checkout_retrieve))
        .nest_service("/assets", ServeDir::new(&site.assets_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Map a loader failure onto an HTTP response
fn content_error_response(err: ContentError) -> Response {
    let status = match &err {
        ContentError::NotFound(_) => StatusCode::NOT_FOUND,
        ContentError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ContentError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    tracing::error!("content error: {}", err);
    (status, format!("{}", err)).into_response()
}

fn render_page(
    state: &AppState,
    template: &str,
    context: &tera::Context,
) -> Response {
    match state.templates.render(template, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

async fn home_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let featured = match state.store.featured_posts() {
        Ok(posts) => posts,
        Err(e) => return content_error_response(e),
    };

    let items: Vec<_> = featured.iter().map(PostItemData::from_post).collect();
    let mut context = state.page_context(&headers);
    context.insert("featured", &items);
    render_page(&state, "home.html", &context)
}

async fn posts_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let posts = match state.store.all_posts() {
        Ok(posts) => posts,
        Err(e) => return content_error_response(e),
    };

    let items: Vec<_> = posts.iter().map(PostItemData::from_post).collect();
    let mut context = state.page_context(&headers);
    context.insert("posts", &items);
    render_page(&state, "posts.html", &context)
}

async fn post_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let theme = state.theme_from(&headers);

    let post = match state.store.load_post(&slug) {
        Ok(post) => post,
        Err(e) => return content_error_response(e),
    };

    let body = match state.renderer.render(&post, theme) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("render error for {}: {}", post.slug, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    // Prev/next navigation comes from the canonical date-descending list;
    // if another post is broken the navigation is simply omitted.
    let siblings = state.store.all_posts().ok();
    let nav = |p: Option<&crate::content::Post>| {
        p.map(|p| json!({ "slug": p.slug, "title": p.title }))
    };

    let mut context = state.page_context(&headers);
    if let Some(posts) = &siblings {
        context.insert("prev", &nav(post.prev(posts)));
        context.insert("next", &nav(post.next(posts)));
    }
    context.insert("title", &post.title);
    context.insert("date", &post.date.format("%Y-%m-%d").to_string());
    context.insert("cover", &post.image_path(ASSET_ROOT));
    context.insert("body", &body);
    render_page(&state, "post.html", &context)
}

async fn contact_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let context = state.page_context(&headers);
    render_page(&state, "contact.html", &context)
}

async fn success_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    // No session id means the visitor landed here mid-flight; a failed
    // retrieval must show as a failure, never as the thank-you copy.
    let mut status = None;
    let mut error = None;
    if let Some(id) = params.get("session_id") {
        match state.checkout.retrieve_session(id) {
            Ok(session) => {
                status = Some(format!("{:?}", session.status).to_lowercase());
            }
            Err(e) => {
                tracing::warn!("session retrieval failed for {}: {}", id, e);
                error = Some(match e {
                    CheckoutError::UnknownSession(_) => "unknown-session",
                    CheckoutError::Unavailable => "checkout-unavailable",
                });
            }
        }
    }

    let mut context = state.page_context(&headers);
    context.insert("status", &status);
    context.insert("error", &error);
    render_page(&state, "success.html", &context)
}

async fn fail_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let context = state.page_context(&headers);
    render_page(&state, "fail.html", &context)
}

/// Set the theme cookie and bounce back to the referring page
async fn set_theme(Path(mode): Path<String>, headers: HeaderMap) -> Response {
    let theme = Theme::parse(&mode);
    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/")
        .to_string();

    let mut response = Redirect::to(&back).into_response();
    let cookie = format!("theme={}; Path=/; Max-Age=31536000", theme.as_str());
    if let Ok(value) = axum::http::HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn api_contact(
    State(state): State<Arc<AppState>>,
    Json(msg): Json<ContactMessage>,
) -> Response {
    match state.messages.append(&msg) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "status": "stored", "id": id })),
        )
            .into_response(),
        Err(ContactError::InvalidInput(field)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "invalid-input", "field": field })),
        )
            .into_response(),
        Err(e @ ContactError::StorageUnavailable { .. }) => {
            tracing::error!("contact store error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "storage-unavailable" })),
            )
                .into_response()
        }
    }
}

async fn api_checkout_create(State(state): State<Arc<AppState>>) -> Response {
    match state.checkout.create_session() {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({
                "session_id": session.id,
                "url": session.url,
                "product": state.checkout_cfg.product,
                "currency": state.checkout_cfg.currency,
                "unit_amount": state.checkout_cfg.unit_amount,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("checkout error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "checkout-unavailable" })),
            )
                .into_response()
        }
    }
}

async fn api_checkout_retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.checkout.retrieve_session(&id) {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({ "session_id": session.id, "status": session.status })),
        )
            .into_response(),
        Err(CheckoutError::UnknownSession(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "unknown-session" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("checkout error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "checkout-unavailable" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckoutConfig;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    fn test_state(tmp: &TempDir, default_theme: Theme) -> (Arc<AppState>, Arc<SessionLedger>) {
        std::fs::create_dir_all(tmp.path().join("posts")).unwrap();
        let ledger = Arc::new(SessionLedger::new("http://localhost:4000"));
        let state = Arc::new(AppState {
            site_title: "Test Blog".to_string(),
            checkout_cfg: CheckoutConfig::default(),
            default_theme,
            store: PostStore::new(tmp.path().join("posts")),
            renderer: PostRenderer::new(),
            templates: TemplateRenderer::new().unwrap(),
            messages: MessageStore::new(tmp.path().join("messages.ndjson")),
            checkout: ledger.clone(),
        });
        (state, ledger)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_configured_default_theme_applies_without_cookie() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = test_state(&tmp, Theme::Light);

        let response = home_page(State(state), HeaderMap::new()).await;
        let html = body_text(response).await;
        assert!(html.contains(r#"class="light""#));
    }

    #[tokio::test]
    async fn test_theme_cookie_overrides_configured_default() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = test_state(&tmp, Theme::Light);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        let response = home_page(State(state), headers).await;
        let html = body_text(response).await;
        assert!(html.contains(r#"class="dark""#));
    }

    #[tokio::test]
    async fn test_success_page_without_session_id_is_neutral() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = test_state(&tmp, Theme::Dark);

        let response =
            success_page(State(state), Query(HashMap::new()), HeaderMap::new()).await;
        let html = body_text(response).await;
        assert!(html.contains("being processed"));
        assert!(!html.contains("Something went wrong"));
    }

    #[tokio::test]
    async fn test_success_page_surfaces_unknown_session() {
        let tmp = TempDir::new().unwrap();
        let (state, _) = test_state(&tmp, Theme::Dark);

        let mut params = HashMap::new();
        params.insert("session_id".to_string(), "cs_nope".to_string());
        let response = success_page(State(state), Query(params), HeaderMap::new()).await;
        let html = body_text(response).await;
        assert!(html.contains("unknown-session"));
        assert!(html.contains("Something went wrong"));
        assert!(!html.contains("Payment status"));
    }

    #[tokio::test]
    async fn test_success_page_shows_paid_status() {
        let tmp = TempDir::new().unwrap();
        let (state, ledger) = test_state(&tmp, Theme::Dark);

        let session = ledger.create_session().unwrap();
        ledger.mark_paid(&session.id).unwrap();

        let mut params = HashMap::new();
        params.insert("session_id".to_string(), session.id);
        let response = success_page(State(state), Query(params), HeaderMap::new()).await;
        let html = body_text(response).await;
        assert!(html.contains("Thank you"));
        assert!(html.contains("paid"));
    }
}
