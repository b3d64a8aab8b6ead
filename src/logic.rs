//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Every external call (resume extraction, question generation, scoring,
//! summaries) happens outside the store lock and falls back to a local
//! implementation when the model is missing or fails. Transitions re-check
//! their guards when they take the lock again.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::document::{self, DocumentFormat};
use crate::domain::{Candidate, Difficulty, Evaluation, ExtractedFields, InterviewStatus, Question};
use crate::errors::AppError;
use crate::extractor::{extract_fields, merge_model_fields};
use crate::seeds::{fallback_feedback, fallback_questions};
use crate::session::{DraftProgress, ScoreReport, SubmitOutcome, TickOutcome};
use crate::state::AppState;

/// Result of a resume upload.
#[derive(Debug)]
pub struct ResumeOutcome {
  pub progress: DraftProgress,
  pub extracted: ExtractedFields,
  pub warning: Option<String>,
}

// ---- resume intake ----

/// Heuristic extraction, overridden field-by-field by the model when one is configured.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn extract_resume(state: &AppState, text: &str) -> ExtractedFields {
  let heuristic = extract_fields(text);
  debug!(target: "resume", name = heuristic.name.is_some(), email = heuristic.email.is_some(), phone = heuristic.phone.is_some(), "Heuristic extraction");

  let Some(oa) = &state.openai else { return heuristic };
  match oa.extract_contact(&state.prompts, text).await {
    Ok(model) => merge_model_fields(heuristic, model),
    Err(e) => {
      warn!(target: "resume", error = %e, "Model extraction failed; keeping heuristic fields");
      heuristic
    }
  }
}

/// Upload → text → fields → profile draft. Unreadable documents still open an
/// empty draft so the candidate can type their details.
#[instrument(level = "info", skip(state, bytes), fields(size = bytes.len()))]
pub async fn ingest_resume(
  state: &AppState,
  bytes: Vec<u8>,
  content_type: Option<&str>,
  file_name: Option<&str>,
) -> Result<ResumeOutcome, AppError> {
  if bytes.len() > state.limits.max_upload_bytes() {
    return Err(AppError::Validation(format!(
      "file exceeds the {} MB upload limit",
      state.limits.max_upload_mb
    )));
  }
  let format = DocumentFormat::detect(content_type, file_name)?;

  match document::extract_text(bytes, format).await {
    Ok(text) => {
      let extracted = extract_resume(state, &text).await;
      let fields = extracted.clone();
      let progress = state.mutate(move |s| s.open_draft(fields, Some(text))).await;
      info!(target: "resume", ?format, complete = matches!(progress, DraftProgress::Complete { .. }), "Resume ingested");
      Ok(ResumeOutcome { progress, extracted, warning: None })
    }
    Err(e) => {
      warn!(target: "resume", ?format, error = %e, "Resume unreadable; collecting fields manually");
      let progress = state.mutate(|s| s.open_draft(ExtractedFields::default(), None)).await;
      Ok(ResumeOutcome {
        progress,
        extracted: ExtractedFields::default(),
        warning: Some(format!(
          "{e}. Could not extract resume data automatically, please retry or enter your details manually."
        )),
      })
    }
  }
}

// ---- collaborators with fallbacks ----

#[instrument(level = "info", skip(state))]
pub async fn generate_questions(state: &AppState) -> Vec<Question> {
  if let Some(oa) = &state.openai {
    match oa.generate_questions(&state.prompts).await {
      Ok(qs) => return qs,
      Err(e) => error!(target: "interview", error = %e, "Question generation failed; using local questions"),
    }
  }
  if !state.question_bank.is_empty() {
    debug!(target: "interview", count = state.question_bank.len(), "Serving question bank");
    return state.question_bank.clone();
  }
  fallback_questions()
}

#[instrument(level = "info", skip(state, question, answer), fields(question_id = %question.id, answer_len = answer.len()))]
pub async fn score_answer(state: &AppState, question: &Question, answer: &str) -> Evaluation {
  if let Some(oa) = &state.openai {
    match oa.evaluate_answer(&state.prompts, question, answer).await {
      Ok(eval) => return eval,
      Err(e) => error!(target: "interview", error = %e, "Answer scoring failed; using local score"),
    }
  }
  fallback_evaluation(question.difficulty)
}

/// Pseudo-score uniformly drawn from the tier's range, with canned feedback.
pub fn fallback_evaluation(difficulty: Difficulty) -> Evaluation {
  let mut rng = rand::thread_rng();
  let (lo, hi) = difficulty.fallback_score_range();
  let feedback = fallback_feedback(difficulty)
    .choose(&mut rng)
    .copied()
    .unwrap_or("Answer recorded.");
  Evaluation { score: rng.gen_range(lo..=hi), feedback: feedback.to_string() }
}

#[instrument(level = "info", skip(state, candidate), fields(candidate_id = %candidate.id))]
pub async fn generate_summary(state: &AppState, candidate: &Candidate, average: f64) -> String {
  if let Some(oa) = &state.openai {
    match oa.summarize(&state.prompts, candidate, average).await {
      Ok(text) => return text,
      Err(e) => error!(target: "interview", error = %e, "Summary generation failed; using template"),
    }
  }
  fallback_summary(&candidate.name, average)
}

pub fn fallback_summary(name: &str, average: f64) -> String {
  let performance = match average {
    a if a >= 8.0 => "excellent",
    a if a >= 6.0 => "good",
    a if a >= 4.0 => "fair",
    _ => "needs improvement",
  };
  format!(
    "{name} demonstrated {performance} technical knowledge during the interview. \
     With an average score of {average:.1}/10, they showed {performance} understanding of \
     full-stack development concepts. The candidate's responses indicate their \
     problem-solving abilities and technical communication skills."
  )
}

// ---- interview flow ----

#[instrument(level = "info", skip(state))]
pub async fn start_interview(state: &Arc<AppState>, candidate_id: &str) -> Result<Question, AppError> {
  // Fail fast before spending a model call on questions.
  let status = state
    .read(|s| s.candidate(candidate_id).map(|c| c.interview_status))
    .await
    .ok_or_else(|| AppError::NotFound(format!("candidate '{candidate_id}'")))?;
  if status != InterviewStatus::NotStarted {
    return Err(AppError::StateMismatch(format!("interview for '{candidate_id}' was already started")));
  }

  let questions = generate_questions(state).await;
  let first = state.mutate(|s| s.start(candidate_id, questions)).await?;
  state.restart_countdown();
  Ok(first)
}

/// Manual submit: scored, then applied. Rejected if the question moved on meanwhile.
#[instrument(level = "info", skip(state, text), fields(%question_id, answer_len = text.len()))]
pub async fn submit_answer(
  state: &Arc<AppState>,
  question_id: &str,
  text: &str,
  time_spent: Option<u32>,
) -> Result<(SubmitOutcome, Evaluation), AppError> {
  let (question, elapsed) = state
    .read(|s| {
      let (_, q) = s.current_in_progress()?;
      let remaining = s.session().map(|x| x.time_remaining).unwrap_or(0);
      let elapsed = q.time_limit.saturating_sub(remaining);
      Ok::<_, AppError>((q, elapsed))
    })
    .await?;
  if question.id != question_id {
    return Err(AppError::StateMismatch(format!(
      "question '{question_id}' is not the current question ('{}')",
      question.id
    )));
  }

  let evaluation = score_answer(state, &question, text).await;
  let eval = evaluation.clone();
  // The countdown is swapped while the write lock is held, so the previous
  // ticker can never reach the new question.
  let outcome = state
    .mutate(|s| {
      let outcome = s.submit_answer(question_id, text, time_spent.unwrap_or(elapsed))?;
      match &outcome {
        SubmitOutcome::Next { .. } => state.restart_countdown(),
        SubmitOutcome::Completed { .. } => state.countdown.cancel(),
      }
      s.attach_evaluation(outcome.candidate_id(), question_id, eval)?;
      Ok::<_, AppError>(outcome)
    })
    .await?;

  if let SubmitOutcome::Completed { candidate_id } = &outcome {
    finalize(state, candidate_id).await?;
  }
  Ok((outcome, evaluation))
}

/// What the countdown loop should do after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStep {
  Continue,
  /// A timed-out answer moved the session to a fresh question; count it from now.
  Advanced,
  Done,
}

/// One countdown step.
pub async fn on_tick(state: &Arc<AppState>) -> TickStep {
  match state.mutate(|s| s.tick()).await {
    TickOutcome::Idle => TickStep::Done,
    TickOutcome::Counting(_) => TickStep::Continue,
    TickOutcome::Expired { candidate_id, question_id } => {
      match auto_submit(state, &candidate_id, &question_id).await {
        Some(SubmitOutcome::Next { .. }) => TickStep::Advanced,
        Some(SubmitOutcome::Completed { candidate_id }) => {
          let st = Arc::clone(state);
          tokio::spawn(async move {
            if let Err(e) = finalize(&st, &candidate_id).await {
              error!(target: "interview", %candidate_id, error = %e, "Finalize after timeout failed");
            }
          });
          TickStep::Done
        }
        None => TickStep::Continue,
      }
    }
  }
}

/// Timer path: submit whatever draft is buffered. Silently does nothing if a
/// manual submit already moved past `question_id`.
#[instrument(level = "info", skip(state))]
pub async fn auto_submit(state: &AppState, candidate_id: &str, question_id: &str) -> Option<SubmitOutcome> {
  let (question, draft) = state.read(|s| s.draft_for(question_id)).await?;
  let evaluation = score_answer(state, &question, &draft).await;

  let outcome = state
    .mutate(|s| {
      let outcome = s.auto_submit(question_id, &draft)?;
      if let Err(e) = s.attach_evaluation(candidate_id, question_id, evaluation) {
        warn!(target: "interview", error = %e, "Could not attach score to timed-out answer");
      }
      Some(outcome)
    })
    .await;
  if outcome.is_some() {
    info!(target: "interview", %candidate_id, %question_id, draft_len = draft.len(), "Question timed out; draft auto-submitted");
  }
  outcome
}

/// Final score plus narrative summary for a completed interview.
#[instrument(level = "info", skip(state))]
pub async fn finalize(state: &AppState, candidate_id: &str) -> Result<ScoreReport, AppError> {
  let policy = state.unscored;
  let report = state.mutate(|s| s.finalize_score(candidate_id, policy)).await?;
  let candidate = state
    .read(|s| s.candidate(candidate_id).cloned())
    .await
    .ok_or_else(|| AppError::NotFound(format!("candidate '{candidate_id}'")))?;

  let summary = generate_summary(state, &candidate, report.average).await;
  state.mutate(|s| s.attach_summary(candidate_id, summary)).await?;
  Ok(report)
}

pub async fn pause(state: &AppState) -> Result<u32, AppError> {
  let remaining = state.mutate(|s| s.pause()).await?;
  state.countdown.cancel();
  Ok(remaining)
}

pub async fn resume(state: &Arc<AppState>) -> Result<u32, AppError> {
  let remaining = state.mutate(|s| s.resume()).await?;
  state.restart_countdown();
  Ok(remaining)
}

pub async fn abandon(state: &AppState) -> Result<(), AppError> {
  state.mutate(|s| s.abandon()).await?;
  state.countdown.cancel();
  Ok(())
}

pub async fn update_draft(state: &AppState, text: &str) -> Result<(), AppError> {
  state.mutate(|s| s.update_draft(text)).await
}
