pub mod page;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Form, Multipart, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{RenderRequest, SessionController};
use crate::models::ImageUpload;
use crate::services::{IngredientRecognizer, RecipeService};

pub const SESSION_COOKIE: &str = "ichef_session";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const UPLOAD_TOO_LARGE: &str = "The photo is too large. Please upload an image under 10 MiB.";

type SharedSession = Arc<tokio::sync::Mutex<SessionController>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

pub struct AppState {
    pub recipes: Arc<RecipeService>,
    pub recognizer: Arc<IngredientRecognizer>,
    sessions: Mutex<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(recipes: Arc<RecipeService>, recognizer: Arc<IngredientRecognizer>) -> Self {
        Self {
            recipes,
            recognizer,
            sessions: Mutex::new(HashMap::new()),
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    /// Sessions untouched for longer than `idle_timeout` are dropped on the next lookup.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    // Evicts idle sessions before handing out the map.
    fn live_sessions(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);
        if sessions.len() < before {
            log::info!("🧹 Evicted {} idle session(s)", before - sessions.len());
        }
        sessions
    }

    /// The caller's session if the cookie names a live one. Never creates a session.
    fn existing_session(&self, headers: &HeaderMap) -> Option<SharedSession> {
        let id = session_id(headers)?;
        let mut sessions = self.live_sessions();
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Look up the caller's session, minting a new one when the cookie is missing or unknown.
    /// Returns the new id alongside when a cookie has to be set.
    fn session(&self, headers: &HeaderMap) -> (SharedSession, Option<String>) {
        let mut sessions = self.live_sessions();

        if let Some(id) = session_id(headers) {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (entry.session.clone(), None);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        log::info!("🆕 New session started: {} ({} live)", id, sessions.len() + 1);
        let session = Arc::new(tokio::sync::Mutex::new(SessionController::new()));
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        (session, Some(id))
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn with_session_cookie(response: impl IntoResponse, new_id: Option<String>) -> Response {
    let mut response = response.into_response();
    if let Some(id) = new_id {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

fn after_event(render: RenderRequest) -> Redirect {
    match render {
        RenderRequest::Rerender => log::debug!("🔁 Re-render requested"),
        RenderRequest::Unchanged => log::debug!("🖼️ Redisplaying current state"),
    }
    Redirect::to("/")
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .route("/generate", post(generate_handler))
        .route("/image", get(image_handler))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    oversized_upload_notice,
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// The body limit answers a declared-oversize upload with a bare 413 before any
/// handler runs; turn that into the usual error notice and redirect.
async fn oversized_upload_notice(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let is_upload = request.uri().path() == "/upload";
    let headers = request.headers().clone();

    let response = next.run(request).await;
    if !is_upload || response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    let (session, new_id) = state.session(&headers);
    let mut session = session.lock().await;
    let render = session.reject_upload(&anyhow::anyhow!(UPLOAD_TOO_LARGE));
    with_session_cookie(after_event(render), new_id)
}

async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, new_id) = state.session(&headers);
    let mut session = session.lock().await;
    let notice = session.take_notice();
    let html = page::render(&session, notice.as_ref());
    with_session_cookie(Html(html), new_id)
}

fn upload_read_error(e: MultipartError, context: &'static str) -> anyhow::Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        anyhow::anyhow!(UPLOAD_TOO_LARGE)
    } else {
        anyhow::Error::new(e).context(context)
    }
}

async fn read_upload(multipart: &mut Multipart) -> anyhow::Result<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_read_error(e, "Failed to read the uploaded form"))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Please choose a photo to upload."))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_read_error(e, "Failed to read the uploaded photo"))?;

        log::debug!("💾 Received {} bytes for {}", bytes.len(), file_name);
        return ImageUpload::new(file_name, bytes.to_vec());
    }

    anyhow::bail!("Please choose a photo to upload.")
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (session, new_id) = state.session(&headers);
    let mut session = session.lock().await;

    let render = match read_upload(&mut multipart).await {
        Ok(image) => session.handle_upload(image, &state.recognizer).await,
        Err(e) => session.reject_upload(&e),
    };

    with_session_cookie(after_event(render), new_id)
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub preference: String,
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let (session, new_id) = state.session(&headers);
    let mut session = session.lock().await;

    let render = session
        .submit(form.ingredients, form.preference, &state.recipes)
        .await;

    with_session_cookie(after_event(render), new_id)
}

async fn image_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session) = state.existing_session(&headers) else {
        return (StatusCode::NOT_FOUND, "No image uploaded").into_response();
    };
    let session = session.lock().await;

    match session.image() {
        Some(image) => (
            [(header::CONTENT_TYPE, image.mime_type.clone())],
            image.bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No image uploaded").into_response(),
    }
}

async fn health_check() -> &'static str {
    "OK"
}
