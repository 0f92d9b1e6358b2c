use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, RawPathParams, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use rmx_core::url as urls;
use rmx_core::{Article, Error, GenerationRequest, Media, Persona, Style};
use rmx_flow::{FlowOutput, ProcessRunner, ProcessState};
use rmx_generation::uploads::UploadOutcome;

use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct GenerateBody {
    pub link: String,
    pub style: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub article_id: String,
    pub media_id: String,
    pub media_url: String,
    pub steps: Vec<String>,
}

/// Validate, run the delegated pipeline, and mirror what the backend
/// produced into the local store so the article views have data.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<GenerateBody>,
) -> ApiResult<Json<GenerateResponse>> {
    let style: Style = body.style.parse()?;
    if !urls::is_valid_url(&body.link) {
        return Err(ApiError(Error::InvalidUrl(body.link)));
    }
    let link = urls::normalize_url(&body.link);

    tracing::info!("🎨 generating {} for {} (user {})", style, link, user.id);

    let request = GenerationRequest {
        user_id: user.id,
        link: link.clone(),
        style,
    };
    let mut runner = ProcessRunner::new(state.backend.clone());
    match runner.run_delegated(&request).await {
        ProcessState::Complete(FlowOutput::Delegated(outcome)) => {
            let text = outcome.article_text.clone().unwrap_or_default();
            let article = state.store.create_article(user.id, &text, &link).await?;
            state
                .store
                .store_media(
                    article.id,
                    &text,
                    style.as_str(),
                    "image",
                    &outcome.media_url,
                )
                .await?;

            Ok(Json(GenerateResponse {
                success: true,
                article_id: outcome.article_id,
                media_id: outcome.media_id,
                media_url: outcome.media_url,
                steps: runner.log().to_vec(),
            }))
        }
        ProcessState::Error(message) => Err(ApiError(Error::Generation(message))),
        other => {
            tracing::error!("pipeline ended in non-terminal state {:?}", other);
            Err(ApiError(Error::Generation(
                "Generation did not complete".to_string(),
            )))
        }
    }
}

#[derive(Deserialize)]
pub struct MediaQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct MediaListResponse {
    pub media: Vec<Media>,
}

pub async fn list_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Json<MediaListResponse>> {
    let media = state
        .backend
        .list_media(user.id, query.search.as_deref())
        .await?;
    Ok(Json(MediaListResponse { media }))
}

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.backend.delete_media(user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.store.list_articles(user.id).await?))
}

#[derive(Serialize)]
pub struct ArticleDetail {
    pub article: Article,
    pub media: Vec<Media>,
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ArticleDetail>> {
    let article = state.store.get_article(user.id, id).await?;
    let media = state.store.media_for_article(user.id, id).await?;
    Ok(Json(ArticleDetail { article, media }))
}

#[derive(Deserialize)]
pub struct SocialPostBody {
    pub media_id: String,
    pub text: String,
}

pub async fn post_social(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SocialPostBody>,
) -> ApiResult<StatusCode> {
    if body.text.trim().is_empty() {
        return Err(ApiError(Error::Validation(
            "Post text must not be empty".to_string(),
        )));
    }
    state
        .backend
        .post_social(user.id, &body.media_id, &body.text)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Deserialize)]
pub struct PersonaBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

pub async fn create_persona(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<PersonaBody>,
) -> ApiResult<Json<Persona>> {
    if body.name.trim().is_empty() {
        return Err(ApiError(Error::Validation(
            "Persona name must not be empty".to_string(),
        )));
    }
    let persona = state
        .store
        .create_persona(user.id, body.name.trim(), &body.description, &body.image_url)
        .await?;
    Ok(Json(persona))
}

pub async fn list_personas(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Persona>>> {
    Ok(Json(state.store.list_personas(user.id).await?))
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadOutcome>> {
    let uploads = state.uploads.as_ref().ok_or_else(|| {
        ApiError(Error::Upload("Object storage is not configured".to_string()))
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(Error::Validation(format!("Invalid upload: {}", e))))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError(Error::Validation(format!("Invalid upload: {}", e))))?;

        let outcome = uploads.upload(&file_name, &content_type, bytes.to_vec()).await;
        return Ok(Json(outcome));
    }

    Err(ApiError(Error::Validation("Missing file field".to_string())))
}

#[derive(Deserialize)]
pub struct SuccessParams {
    pub session_id: Option<String>,
}

/// Payment landing page. Anything short of a paid session bounces the
/// visitor away before any confirmation is rendered.
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuccessParams>,
) -> ApiResult<Response> {
    let Some(session_id) = params.session_id else {
        return Ok(Redirect::to("/").into_response());
    };

    let payments = state.payments.as_ref().ok_or_else(|| {
        ApiError(Error::Payment("Payment provider is not configured".to_string()))
    })?;

    let session = payments.retrieve_session(&session_id).await?;
    if !session.is_paid() {
        return Ok(Redirect::to("/pricing").into_response());
    }

    Ok(Json(serde_json::json!({
        "status": "paid",
        "order_id": session.id,
        "email": session.customer_email(),
    }))
    .into_response())
}

#[derive(Serialize)]
pub struct ResolvedTarget {
    pub category: Style,
    pub url: String,
}

/// Deep-link resolution for `/{category}/{encoded-target-url}`. The captured
/// path is taken raw (still percent-encoded) so decoding happens exactly
/// once; query parameters the router parsed off the outer address are
/// reattached to the decoded target.
pub async fn resolve_target(
    params: RawPathParams,
    Query(outer): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ResolvedTarget>> {
    let mut category = None;
    let mut target = None;
    for (key, value) in &params {
        match key {
            "category" => category = Some(value.to_string()),
            "target" => target = Some(value.to_string()),
            _ => {}
        }
    }

    let category: Style = category.unwrap_or_default().parse()?;
    let target = target.unwrap_or_default();
    let url = urls::resolve_target_url(&target, &outer);
    if !urls::is_valid_url(&url) {
        return Err(ApiError(Error::InvalidUrl(url)));
    }

    Ok(Json(ResolvedTarget { category, url }))
}
