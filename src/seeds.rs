//! Built-in content that keeps the service useful without a model or a question bank.

use tracing::warn;
use uuid::Uuid;

use crate::config::QuestionCfg;
use crate::domain::{Difficulty, Question};

/// Number of questions per interview: two per tier.
pub const INTERVIEW_LENGTH: usize = 6;

/// Fixed fallback question set, easy → hard.
pub fn fallback_questions() -> Vec<Question> {
  vec![
    Question::new("q1", "What is React and what are its main advantages?", Difficulty::Easy, "React Basics"),
    Question::new("q2", "Explain the difference between let, const, and var in JavaScript.", Difficulty::Easy, "JavaScript Basics"),
    Question::new("q3", "How would you implement a custom hook in React to manage form state?", Difficulty::Medium, "React Advanced"),
    Question::new("q4", "Explain closures in JavaScript and provide a practical example.", Difficulty::Medium, "JavaScript Advanced"),
    Question::new("q5", "Design a scalable architecture for a real-time chat application using React and Node.js.", Difficulty::Hard, "System Design"),
    Question::new("q6", "How would you implement a custom state management solution similar to Redux?", Difficulty::Hard, "Advanced React"),
  ]
}

/// Questions from the TOML bank, ordered easy → hard. Entries with an unknown
/// difficulty or empty text are skipped.
pub fn bank_questions(bank: &[QuestionCfg]) -> Vec<Question> {
  let mut out: Vec<Question> = bank
    .iter()
    .filter_map(|q| {
      let Some(difficulty) = Difficulty::parse(&q.difficulty) else {
        warn!(target: "interview_backend", difficulty = %q.difficulty, "Skipping bank question with unknown difficulty");
        return None;
      };
      if q.text.trim().is_empty() {
        return None;
      }
      let id = q.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
      let category = q.category.clone().unwrap_or_else(|| "General".into());
      Some(Question::new(id, q.text.trim(), difficulty, category))
    })
    .collect();
  out.sort_by_key(|q| q.time_limit);
  out.truncate(INTERVIEW_LENGTH);
  out
}

/// Canned feedback used by the local pseudo-scorer.
pub fn fallback_feedback(difficulty: Difficulty) -> &'static [&'static str] {
  match difficulty {
    Difficulty::Easy => &[
      "Good understanding of basic concepts.",
      "Clear explanation with good examples.",
      "Shows solid foundation knowledge.",
    ],
    Difficulty::Medium => &[
      "Demonstrates good problem-solving skills.",
      "Shows understanding of intermediate concepts.",
      "Good technical knowledge with room for improvement.",
    ],
    Difficulty::Hard => &[
      "Excellent problem-solving approach.",
      "Shows deep understanding of complex topics.",
      "Demonstrates senior-level thinking.",
    ],
  }
}
