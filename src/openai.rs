//! Minimal OpenAI-compatible client for our use-cases.
//!
//! We only call chat.completions and request either plain text or a strict JSON object.
//! Calls are instrumented and log model names, latencies and token usage (not contents).
//!
//! NOTE: We never log the API key, resume text or answers.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Answer, Candidate, Difficulty, Evaluation, ExtractedFields, Question};
use crate::seeds::INTERVIEW_LENGTH;
use crate::util::{fill_template, strip_code_fence, trunc_for_log};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
// Resumes can be long; the contact block is near the top anyway.
const MAX_RESUME_CHARS: usize = 12_000;

#[derive(Debug, Error)]
pub enum OpenAiError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("OpenAI HTTP {status}: {message}")]
  Status { status: reqwest::StatusCode, message: String },

  #[error("JSON parse error: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("model returned an unusable result: {0}")]
  Invalid(String),
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model =
      std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().ok()?;

    Some(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string(), fast_model, strong_model })
  }

  async fn chat(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    json: bool,
  ) -> Result<String, OpenAiError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json.then(|| ResponseFormat { r#type: "json_object".into() }),
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "interview-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      error!(target: "interview_backend", %status, elapsed = ?start.elapsed(), "OpenAI call rejected");
      return Err(OpenAiError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(target: "interview_backend", elapsed = ?start.elapsed(), prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default()
      .trim()
      .to_string())
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_plain(&self, model: &str, system: &str, user: &str, temperature: f32) -> Result<String, OpenAiError> {
    self.chat(model, system, user, temperature, false).await
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, OpenAiError> {
    let text = self.chat(model, system, user, temperature, true).await?;
    Ok(serde_json::from_str::<T>(strip_code_fence(&text))?)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Contact fields as read by the model. Absent or blank values come back as `None`.
  #[instrument(level = "info", skip(self, prompts, resume_text), fields(text_len = resume_text.len()))]
  pub async fn extract_contact(&self, prompts: &Prompts, resume_text: &str) -> Result<ExtractedFields, OpenAiError> {
    let clipped: String = resume_text.chars().take(MAX_RESUME_CHARS).collect();
    let user = fill_template(&prompts.extract_user_template, &[("resume_text", &clipped)]);
    self.chat_json::<ExtractedFields>(&self.fast_model, &prompts.extract_system, &user, 0.0).await
  }

  /// Six questions, two per tier. Time limits are forced from the tier regardless of model output.
  #[instrument(level = "info", skip(self, prompts), fields(model = %self.strong_model))]
  pub async fn generate_questions(&self, prompts: &Prompts) -> Result<Vec<Question>, OpenAiError> {
    #[derive(Deserialize)]
    struct Gen { questions: Vec<GenQuestion> }
    #[derive(Deserialize)]
    struct GenQuestion { text: String, difficulty: String, #[serde(default)] category: Option<String> }

    let count = INTERVIEW_LENGTH.to_string();
    let user = fill_template(&prompts.questions_user_template, &[("count", &count)]);
    let gen: Gen = self.chat_json(&self.strong_model, &prompts.questions_system, &user, 0.8).await?;

    let mut questions: Vec<Question> = gen.questions
      .into_iter()
      .filter(|q| !q.text.trim().is_empty())
      .filter_map(|q| {
        let difficulty = Difficulty::parse(&q.difficulty)?;
        Some(Question::new(
          uuid::Uuid::new_v4().to_string(),
          q.text.trim(),
          difficulty,
          q.category.unwrap_or_else(|| "General".into()),
        ))
      })
      .collect();
    questions.sort_by_key(|q| q.time_limit);
    questions.truncate(INTERVIEW_LENGTH);

    if questions.is_empty() {
      return Err(OpenAiError::Invalid("no usable questions".into()));
    }
    info!(target: "interview_backend", count = questions.len(), "Questions generated");
    Ok(questions)
  }

  /// Score clamped into 1..=10; a missing score counts as 5.
  #[instrument(level = "info", skip(self, prompts, question, answer), fields(question_id = %question.id, answer_len = answer.len()))]
  pub async fn evaluate_answer(&self, prompts: &Prompts, question: &Question, answer: &str) -> Result<Evaluation, OpenAiError> {
    #[derive(Deserialize)]
    struct Eval { #[serde(default)] score: Option<f64>, #[serde(default)] feedback: String }

    let answer = if answer.trim().is_empty() { "(no answer provided)" } else { answer };
    let user = fill_template(
      &prompts.evaluate_user_template,
      &[("difficulty", question.difficulty.as_str()), ("question", &question.text), ("answer", answer)],
    );
    let e: Eval = self.chat_json(&self.strong_model, &prompts.evaluate_system, &user, 0.2).await?;
    let score = e.score.map(|s| s.round().clamp(1.0, 10.0) as u8).unwrap_or(5);
    let feedback = if e.feedback.trim().is_empty() { "No feedback provided.".to_string() } else { e.feedback };
    Ok(Evaluation { score, feedback })
  }

  #[instrument(level = "info", skip(self, prompts, candidate), fields(candidate_id = %candidate.id, answers = candidate.answers.len()))]
  pub async fn summarize(&self, prompts: &Prompts, candidate: &Candidate, average: f64) -> Result<String, OpenAiError> {
    let transcript = candidate.questions
      .iter()
      .enumerate()
      .map(|(i, q)| {
        let answer = candidate.answers.iter().find(|a| a.question_id == q.id);
        format!(
          "Q{}: {}\nA: {}\nScore: {}",
          i + 1,
          q.text,
          answer.map(|a| a.text.as_str()).filter(|t| !t.trim().is_empty()).unwrap_or("(no answer)"),
          answer.and_then(|a: &Answer| a.score).map(|s| format!("{s}/10")).unwrap_or_else(|| "N/A".into()),
        )
      })
      .collect::<Vec<_>>()
      .join("\n\n");

    let average = format!("{average:.1}");
    let user = fill_template(
      &prompts.summary_user_template,
      &[("name", &candidate.name), ("average", &average), ("transcript", &transcript)],
    );
    let text = self.chat_plain(&self.fast_model, &prompts.summary_system, &user, 0.5).await?;
    if text.is_empty() {
      return Err(OpenAiError::Invalid("empty summary".into()));
    }
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn model_contact_json_tolerates_nulls() {
    let f: ExtractedFields = serde_json::from_str(r#"{"name":"Ada Lovelace","email":null}"#).unwrap();
    assert_eq!(f.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(f.email, None);
    assert_eq!(f.phone, None);
  }
}
