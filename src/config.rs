//! Loading agent configuration (prompts, question bank, scoring policy, limits) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::session::UnscoredPolicy;

pub const DEFAULT_SNAPSHOT_PATH: &str = "./data/interview_state.json";
const DEFAULT_MAX_UPLOAD_MB: usize = 10;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
  #[serde(default)]
  pub scoring: ScoringCfg,
  #[serde(default)]
  pub limits: LimitsCfg,
  #[serde(default)]
  pub storage: StorageCfg,
}

/// Question bank entry. The time limit always comes from the difficulty.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  pub text: String,
  pub difficulty: String,
  #[serde(default)] pub category: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ScoringCfg {
  #[serde(default)] pub unscored: UnscoredPolicy,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LimitsCfg {
  #[serde(default = "default_max_upload_mb")] pub max_upload_mb: usize,
}

impl Default for LimitsCfg {
  fn default() -> Self {
    Self { max_upload_mb: DEFAULT_MAX_UPLOAD_MB }
  }
}

impl LimitsCfg {
  pub fn max_upload_bytes(&self) -> usize {
    self.max_upload_mb.max(1) * 1024 * 1024
  }
}

fn default_max_upload_mb() -> usize {
  DEFAULT_MAX_UPLOAD_MB
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  #[serde(default)] pub snapshot_path: Option<String>,
}

/// Prompts used by the OpenAI client. Placeholders in `{braces}` are filled at call time.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub extract_system: String,
  pub extract_user_template: String,
  pub questions_system: String,
  pub questions_user_template: String,
  pub evaluate_system: String,
  pub evaluate_user_template: String,
  pub summary_system: String,
  pub summary_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      extract_system: "You extract contact details from resumes. Respond ONLY with strict JSON.".into(),
      extract_user_template: "Extract the candidate's name, email and phone number from this resume text. Return JSON {\"name\": string|null, \"email\": string|null, \"phone\": string|null}. Use null for anything not present.\n\nResume:\n{resume_text}".into(),
      questions_system: "You are a technical interviewer for full stack (React/Node.js) roles. Respond ONLY with strict JSON.".into(),
      questions_user_template: "Generate {count} interview questions: 2 easy, 2 medium and 2 hard, in that order. Return JSON {\"questions\": [{\"text\": string, \"difficulty\": \"easy\"|\"medium\"|\"hard\", \"category\": string}]}.".into(),
      evaluate_system: "You are a fair technical interviewer grading a single answer. Respond ONLY with strict JSON.".into(),
      evaluate_user_template: "Question ({difficulty}): {question}\nCandidate answer: {answer}\n\nReturn JSON {\"score\": integer 1-10, \"feedback\": string} where feedback is one or two sentences.".into(),
      summary_system: "You write concise interview summaries for hiring managers.".into(),
      summary_user_template: "Candidate: {name}\nAverage score: {average}/10\n\nQuestions, answers and scores:\n{transcript}\n\nWrite a 2-3 sentence summary of the candidate's strengths, weaknesses and overall fit.".into(),
    }
  }
}

impl AgentConfig {
  /// Snapshot file location: SNAPSHOT_PATH env, then `[storage]`, then the default.
  pub fn snapshot_path(&self) -> String {
    std::env::var("SNAPSHOT_PATH")
      .ok()
      .filter(|p| !p.trim().is_empty())
      .or_else(|| self.storage.snapshot_path.clone())
      .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.into())
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "interview_backend", %path, questions = cfg.questions.len(), unscored = ?cfg.scoring.unscored, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "interview_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "interview_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    let cfg: AgentConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.scoring.unscored, UnscoredPolicy::ExcludeUnscored);
    assert_eq!(cfg.limits.max_upload_bytes(), 10 * 1024 * 1024);
    assert!(cfg.questions.is_empty());
    assert!(cfg.prompts.evaluate_user_template.contains("{answer}"));
  }

  #[test]
  fn full_config_parses() {
    let cfg: AgentConfig = toml::from_str(
      r#"
        [prompts]
        summary_system = "Be brief."

        [[questions]]
        text = "What does the borrow checker enforce?"
        difficulty = "Easy"
        category = "Rust"

        [scoring]
        unscored = "zero"

        [limits]
        max_upload_mb = 2

        [storage]
        snapshot_path = "/tmp/state.json"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.summary_system, "Be brief.");
    assert!(!cfg.prompts.extract_system.is_empty());
    assert_eq!(cfg.questions.len(), 1);
    assert_eq!(cfg.scoring.unscored, UnscoredPolicy::IncludeAsZero);
    assert_eq!(cfg.limits.max_upload_bytes(), 2 * 1024 * 1024);
    assert_eq!(cfg.storage.snapshot_path.as_deref(), Some("/tmp/state.json"));
  }
}
