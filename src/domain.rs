//! Domain models: candidates, questions, answers, and the contact fields pulled from resumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty tier of a question. The tier fixes the time limit.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Seconds allowed to answer a question of this tier.
  pub fn time_limit(self) -> u32 {
    match self {
      Difficulty::Easy => 20,
      Difficulty::Medium => 60,
      Difficulty::Hard => 120,
    }
  }

  /// Inclusive range used by the local pseudo-scorer when no model is reachable.
  pub fn fallback_score_range(self) -> (u8, u8) {
    match self {
      Difficulty::Easy => (7, 10),
      Difficulty::Medium => (5, 9),
      Difficulty::Hard => (3, 8),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  /// Lenient parse for model / config input ("Easy", " hard ").
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
  #[default]
  NotStarted,
  InProgress,
  Paused,
  Completed,
}

/// Immutable once generated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: String,
  pub text: String,
  pub difficulty: Difficulty,
  pub time_limit: u32,
  pub category: String,
}

impl Question {
  /// Build a question whose time limit follows its tier.
  pub fn new(id: impl Into<String>, text: impl Into<String>, difficulty: Difficulty, category: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      text: text.into(),
      difficulty,
      time_limit: difficulty.time_limit(),
      category: category.into(),
    }
  }
}

/// Score plus narrative returned by the answer scorer (model or local fallback).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
  pub score: u8,
  pub feedback: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
  pub question_id: String,
  pub text: String,
  /// Seconds elapsed before submission, never above the question's limit.
  pub time_spent: u32,
  #[serde(default)] pub score: Option<u8>,
  #[serde(default)] pub feedback: Option<String>,
  pub submitted_at: DateTime<Utc>,
}

/// Contact fields every candidate must have before an interview can start.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(default)] pub resume_text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
  pub id: String,
  pub name: String,
  pub email: String,
  pub phone: String,
  #[serde(default)] pub resume_text: Option<String>,
  pub interview_status: InterviewStatus,
  pub current_question_index: usize,
  #[serde(default)] pub questions: Vec<Question>,
  #[serde(default)] pub answers: Vec<Answer>,
  #[serde(default)] pub final_score: Option<u8>,
  #[serde(default)] pub summary: Option<String>,
  #[serde(default)] pub start_time: Option<DateTime<Utc>>,
  #[serde(default)] pub end_time: Option<DateTime<Utc>>,
}

impl Candidate {
  pub fn from_profile(id: String, profile: Profile) -> Self {
    Self {
      id,
      name: profile.name,
      email: profile.email,
      phone: profile.phone,
      resume_text: profile.resume_text,
      interview_status: InterviewStatus::NotStarted,
      current_question_index: 0,
      questions: Vec::new(),
      answers: Vec::new(),
      final_score: None,
      summary: None,
      start_time: None,
      end_time: None,
    }
  }
}

/// Output of the resume field extractor. Every field may be absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedFields {
  #[serde(default)] pub name: Option<String>,
  #[serde(default)] pub email: Option<String>,
  #[serde(default)] pub phone: Option<String>,
}

/// Contact field asked for by the missing-field collector, in asking order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
  Name,
  Email,
  Phone,
}

impl ContactField {
  pub const ORDER: [ContactField; 3] = [ContactField::Name, ContactField::Email, ContactField::Phone];

  pub fn label(self) -> &'static str {
    match self {
      ContactField::Name => "Full Name",
      ContactField::Email => "Email Address",
      ContactField::Phone => "Phone Number",
    }
  }

  pub fn prompt(self) -> &'static str {
    match self {
      ContactField::Name => "Enter your full name",
      ContactField::Email => "Enter your email address",
      ContactField::Phone => "Enter your phone number",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn time_limits_follow_tiers() {
    assert_eq!(Difficulty::Easy.time_limit(), 20);
    assert_eq!(Difficulty::Medium.time_limit(), 60);
    assert_eq!(Difficulty::Hard.time_limit(), 120);
    let q = Question::new("q", "text", Difficulty::Hard, "System Design");
    assert_eq!(q.time_limit, 120);
  }

  #[test]
  fn difficulty_parse_is_lenient() {
    assert_eq!(Difficulty::parse(" Medium "), Some(Difficulty::Medium));
    assert_eq!(Difficulty::parse("HARD"), Some(Difficulty::Hard));
    assert_eq!(Difficulty::parse("expert"), None);
  }
}
