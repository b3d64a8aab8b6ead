//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs identifiers and result info, never resume or answer text.

use std::sync::Arc;
use axum::{
  extract::{Multipart, Path, Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::collector::{validate_profile, ProfileDraft};
use crate::domain::Profile;
use crate::errors::AppError;
use crate::logic;
use crate::protocol::*;
use crate::session::UiPrefs;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, openai: state.openai.is_some(), countdown: state.countdown.is_running() })
}

/// Multipart upload with a single `file` part.
#[instrument(level = "info", skip(state, multipart))]
pub async fn http_post_resume(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<Json<ResumeOut>, AppError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
  {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
      .bytes()
      .await
      .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

    info!(target: "resume", file_name = ?file_name, content_type = ?content_type, size = bytes.len(), "Resume upload received");
    let out = logic::ingest_resume(&state, bytes.to_vec(), content_type.as_deref(), file_name.as_deref()).await?;
    return Ok(Json(ResumeOut { extracted: out.extracted, warning: out.warning, profile: out.progress.into() }));
  }
  Err(AppError::Validation("missing 'file' part".into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  Path(draft_id): Path<String>,
) -> Result<Json<ProfileDraft>, AppError> {
  state
    .read(|s| s.draft(&draft_id).cloned())
    .await
    .map(Json)
    .ok_or_else(|| AppError::NotFound(format!("profile draft '{draft_id}'")))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_profile_field(
  State(state): State<Arc<AppState>>,
  Path(draft_id): Path<String>,
  Json(body): Json<FieldIn>,
) -> Result<Json<ProfileProgressOut>, AppError> {
  let progress = state.mutate(|s| s.fill_draft(&draft_id, &body.value)).await?;
  Ok(Json(progress.into()))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_candidate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CandidateIn>,
) -> Result<Json<CandidateDetail>, AppError> {
  let profile = validate_profile(Profile {
    name: body.name,
    email: body.email,
    phone: body.phone,
    resume_text: body.resume_text,
  })?;
  let candidate = state.mutate(|s| s.add_candidate(profile)).await;
  Ok(Json(candidate.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_candidates(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ListQuery>,
) -> Json<Vec<CandidateRow>> {
  let rows: Vec<CandidateRow> = state
    .read(|s| s.list_candidates(q.search.as_deref()).into_iter().map(CandidateRow::from).collect())
    .await;
  Json(rows)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_candidate(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CandidateDetail>, AppError> {
  let candidate = state
    .read(|s| s.candidate(&id).cloned())
    .await
    .ok_or_else(|| AppError::NotFound(format!("candidate '{id}'")))?;
  Ok(Json(candidate.into()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_interview(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
  logic::start_interview(&state, &id).await?;
  Ok(Json(state.read(session_view).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
  Json(state.read(session_view).await)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_put_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftIn>,
) -> Result<Json<SessionView>, AppError> {
  logic::update_draft(&state, &body.text).await?;
  Ok(Json(state.read(session_view).await))
}

#[instrument(level = "info", skip(state, body), fields(question_id = %body.question_id, answer_len = body.text.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, AppError> {
  let (outcome, evaluation) = logic::submit_answer(&state, &body.question_id, &body.text, body.time_spent).await?;
  info!(target: "interview", question_id = %body.question_id, score = evaluation.score, "HTTP answer evaluated");
  Ok(Json(AnswerOut::new(outcome, evaluation)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_pause(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>, AppError> {
  logic::pause(&state).await?;
  Ok(Json(state.read(session_view).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_resume(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>, AppError> {
  logic::resume(&state).await?;
  Ok(Json(state.read(session_view).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_abandon(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>, AppError> {
  logic::abandon(&state).await?;
  Ok(Json(state.read(session_view).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_ui(State(state): State<Arc<AppState>>) -> Json<UiPrefs> {
  Json(state.read(|s| s.ui.clone()).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_put_ui(State(state): State<Arc<AppState>>, Json(body): Json<UiIn>) -> Json<UiPrefs> {
  let ui = state
    .mutate(|s| {
      if let Some(tab) = body.active_tab {
        s.ui.active_tab = tab;
      }
      if let Some(show) = body.show_welcome_back_modal {
        s.ui.show_welcome_back_modal = show;
      }
      s.ui.clone()
    })
    .await;
  Json(ui)
}
