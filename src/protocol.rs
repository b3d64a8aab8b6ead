//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Answer, Candidate, ContactField, Evaluation, ExtractedFields, InterviewStatus, Question};
use crate::session::{ActiveTab, DraftProgress, InterviewStore, SessionStage, SubmitOutcome};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Session,
    Draft {
        text: String,
    },
    Submit {
        #[serde(rename = "questionId")]
        question_id: String,
        text: String,
        #[serde(default, rename = "timeSpent")]
        time_spent: Option<u32>,
    },
    Pause,
    Resume,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session { session: SessionView },
    AnswerResult(AnswerOut),
    Error { code: String, message: String },
}

/// Everything the interviewee screen needs to render the live interview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub stage: SessionStage,
    pub candidate_id: Option<String>,
    pub candidate_name: Option<String>,
    pub question: Option<Question>,
    pub question_number: usize,
    pub total_questions: usize,
    pub time_remaining: u32,
    pub paused: bool,
    pub draft: String,
    pub show_welcome_back_modal: bool,
}

pub fn session_view(store: &InterviewStore) -> SessionView {
    let session = store.session();
    let candidate = store.active_candidate();
    SessionView {
        stage: store.stage(),
        candidate_id: candidate.map(|c| c.id.clone()),
        candidate_name: candidate.map(|c| c.name.clone()),
        question: session.and_then(|s| s.current_question.clone()),
        question_number: candidate
            .map(|c| (c.current_question_index + 1).min(c.questions.len()))
            .unwrap_or(0),
        total_questions: candidate.map(|c| c.questions.len()).unwrap_or(0),
        time_remaining: session.map(|s| s.time_remaining).unwrap_or(0),
        paused: session.is_some_and(|s| s.paused),
        draft: session.map(|s| s.draft.clone()).unwrap_or_default(),
        show_welcome_back_modal: store.ui.show_welcome_back_modal,
    }
}

//
// Profile intake
//

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileProgressOut {
    AwaitingField {
        #[serde(rename = "draftId")]
        draft_id: String,
        field: ContactField,
        label: &'static str,
        prompt: &'static str,
    },
    Complete {
        candidate: Candidate,
    },
}

impl From<DraftProgress> for ProfileProgressOut {
    fn from(p: DraftProgress) -> Self {
        match p {
            DraftProgress::Missing { draft_id, field } => ProfileProgressOut::AwaitingField {
                draft_id,
                field,
                label: field.label(),
                prompt: field.prompt(),
            },
            DraftProgress::Complete { candidate } => ProfileProgressOut::Complete { candidate },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeOut {
    pub extracted: ExtractedFields,
    pub warning: Option<String>,
    pub profile: ProfileProgressOut,
}

#[derive(Debug, Deserialize)]
pub struct FieldIn {
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateIn {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub resume_text: Option<String>,
}

//
// Dashboard
//

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub interview_status: InterviewStatus,
    pub final_score: Option<u8>,
    pub answered: usize,
    pub total_questions: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&Candidate> for CandidateRow {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            interview_status: c.interview_status,
            final_score: c.final_score,
            answered: c.answers.len(),
            total_questions: c.questions.len(),
            start_time: c.start_time,
            end_time: c.end_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptEntry {
    pub question: Question,
    pub answer: Option<Answer>,
}

#[derive(Debug, Serialize)]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub transcript: Vec<TranscriptEntry>,
}

impl From<Candidate> for CandidateDetail {
    fn from(candidate: Candidate) -> Self {
        let transcript = candidate
            .questions
            .iter()
            .map(|q| TranscriptEntry {
                question: q.clone(),
                answer: candidate.answers.iter().find(|a| a.question_id == q.id).cloned(),
            })
            .collect();
        Self { candidate, transcript }
    }
}

//
// Live interview
//

#[derive(Debug, Deserialize)]
pub struct DraftIn {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub question_id: String,
    pub text: String,
    #[serde(default)]
    pub time_spent: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub completed: bool,
    pub score: u8,
    pub feedback: String,
    pub next_question: Option<Question>,
}

impl AnswerOut {
    pub fn new(outcome: SubmitOutcome, evaluation: Evaluation) -> Self {
        let (completed, next_question) = match outcome {
            SubmitOutcome::Next { question, .. } => (false, Some(question)),
            SubmitOutcome::Completed { .. } => (true, None),
        };
        Self { completed, score: evaluation.score, feedback: evaluation.feedback, next_question }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiIn {
    #[serde(default)]
    pub active_tab: Option<ActiveTab>,
    #[serde(default)]
    pub show_welcome_back_modal: Option<bool>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub openai: bool,
    pub countdown: bool,
}
