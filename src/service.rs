//! HTTP surface: one POST endpoint returning PNG bytes.
//!
//! The service owns request validation and status-code mapping; the core
//! pipeline knows nothing about HTTP. Rendering is CPU-bound and runs under
//! `spawn_blocking` so the runtime stays responsive.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::{
    color::{parse_hex, Rgb},
    error::{CardError, CardResult},
    fonts::FontLibrary,
    gradient::Direction,
    palette::Palette,
    pipeline::{render_card_png, RenderRequest},
};

#[derive(Clone)]
pub struct AppState {
    pub palette: Arc<Palette>,
    pub fonts: Arc<FontLibrary>,
}

#[derive(Debug, serde::Deserialize)]
pub struct GenerateRequest {
    pub id: u32,
    pub markdown: String,
    pub background_color: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        let status = match &err {
            CardError::InvalidColorFormat(_)
            | CardError::InsufficientColors(_)
            | CardError::UnsupportedDirection(_)
            | CardError::MarkdownInputTooLarge { .. } => StatusCode::BAD_REQUEST,
            CardError::CombinationNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate_color_picture", post(generate))
        .with_state(state)
}

async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let background = match body.background_color.as_deref() {
        Some(hex) => parse_hex(hex)?,
        None => Rgb::new(0xFF, 0xFF, 0xFF),
    };
    let direction = match body.direction.as_deref() {
        Some(name) => Direction::parse(name)?,
        None => Direction::default(),
    };
    let combination = state.palette.lookup(body.id)?;
    tracing::info!(
        id = body.id,
        name = %combination.name,
        direction = %direction,
        "rendering card"
    );

    let request = RenderRequest {
        colors: combination.colors.clone(),
        markdown: body.markdown,
        background,
        direction,
    };
    let fonts = Arc::clone(&state.fonts);
    let bytes = tokio::task::spawn_blocking(move || render_card_png(&request, &*fonts))
        .await
        .map_err(|e| ApiError::internal(format!("render task failed: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// Bind and serve until the process exits.
pub async fn serve(addr: SocketAddr, state: AppState) -> CardResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
