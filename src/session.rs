//! Interview session state machine.
//!
//! `InterviewStore` is the single owned container for the roster, pending
//! profile drafts, the active session pointer and UI preferences. Every
//! transition is a synchronous `&mut self` method; callers serialize access
//! (see `AppState`) and run external calls (scoring, summaries) outside of it.
//!
//! Stages: idle → awaiting_profile_completion → in_progress ⇄ paused → completed.

use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collector::ProfileDraft;
use crate::domain::{
    Answer, Candidate, ContactField, Evaluation, ExtractedFields, InterviewStatus, Profile, Question,
};
use crate::errors::AppError;

/// How answers without a score count towards the final score.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnscoredPolicy {
    /// Average only over scored answers.
    #[default]
    #[serde(alias = "exclude")]
    ExcludeUnscored,
    /// Unscored answers count as 0.
    #[serde(alias = "zero")]
    IncludeAsZero,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub candidate_id: String,
    #[serde(default)]
    pub current_question: Option<Question>,
    pub time_remaining: u32,
    pub paused: bool,
    /// Answer text buffered by the client; used when the countdown runs out.
    #[serde(default)]
    pub draft: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTab {
    #[default]
    Interviewee,
    Interviewer,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiPrefs {
    pub active_tab: ActiveTab,
    pub show_welcome_back_modal: bool,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Idle,
    AwaitingProfileCompletion,
    InProgress,
    Paused,
    Completed,
}

#[derive(Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing is counting down (no session, paused, or finished).
    Idle,
    Counting(u32),
    /// Time ran out on this question; the caller should auto-submit.
    Expired { candidate_id: String, question_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Next { candidate_id: String, question: Question },
    Completed { candidate_id: String },
}

impl SubmitOutcome {
    pub fn candidate_id(&self) -> &str {
        match self {
            SubmitOutcome::Next { candidate_id, .. } | SubmitOutcome::Completed { candidate_id } => candidate_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftProgress {
    Missing { draft_id: String, field: ContactField },
    Complete { candidate: Candidate },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    pub final_score: u8,
    pub average: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewStore {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    drafts: Vec<ProfileDraft>,
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    pub ui: UiPrefs,
}

impl InterviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted store. A countdown cannot survive a restart, so an
    /// interview that was running is frozen as paused and the welcome-back
    /// prompt is raised.
    pub fn rehydrate(mut self) -> Self {
        let Some(candidate_id) = self.session.as_ref().map(|s| s.candidate_id.clone()) else {
            return self;
        };
        let Some(candidate) = self.candidates.iter_mut().find(|c| c.id == candidate_id) else {
            warn!(target: "interview", %candidate_id, "Dropping session for unknown candidate");
            self.session = None;
            return self;
        };

        match candidate.interview_status {
            InterviewStatus::InProgress | InterviewStatus::Paused => {
                candidate.interview_status = InterviewStatus::Paused;
                if let Some(session) = self.session.as_mut() {
                    session.paused = true;
                }
                self.ui.show_welcome_back_modal = true;
                info!(target: "interview", %candidate_id, "Unfinished interview restored as paused");
            }
            _ => {}
        }
        self
    }

    // ---- roster ----

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, AppError> {
        self.candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("candidate '{id}'")))
    }

    pub fn add_candidate(&mut self, profile: Profile) -> Candidate {
        let candidate = Candidate::from_profile(Uuid::new_v4().to_string(), profile);
        info!(target: "interview", candidate_id = %candidate.id, "Candidate added");
        self.candidates.push(candidate.clone());
        candidate
    }

    /// Dashboard listing: case-insensitive match on name or email, best final
    /// score first, unscored candidates last in insertion order.
    pub fn list_candidates(&self, search: Option<&str>) -> Vec<&Candidate> {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let mut out: Vec<&Candidate> = self
            .candidates
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || c.name.to_lowercase().contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
            })
            .collect();
        out.sort_by(|a, b| match (a.final_score, b.final_score) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => y.cmp(&x),
        });
        out
    }

    // ---- profile drafts ----

    /// Start collecting a profile. Complete extractions become candidates right away.
    pub fn open_draft(&mut self, fields: ExtractedFields, resume_text: Option<String>) -> DraftProgress {
        let draft = ProfileDraft::new(Uuid::new_v4().to_string(), fields, resume_text);
        self.settle_draft(draft)
    }

    pub fn draft(&self, id: &str) -> Option<&ProfileDraft> {
        self.drafts.iter().find(|d| d.id == id)
    }

    /// Answer the next missing field of a draft.
    pub fn fill_draft(&mut self, draft_id: &str, value: &str) -> Result<DraftProgress, AppError> {
        let pos = self
            .drafts
            .iter()
            .position(|d| d.id == draft_id)
            .ok_or_else(|| AppError::NotFound(format!("profile draft '{draft_id}'")))?;

        if self.drafts[pos].provide(value)?.is_some() {
            let draft = &self.drafts[pos];
            let field = draft.next_missing().unwrap_or(ContactField::Name);
            return Ok(DraftProgress::Missing { draft_id: draft.id.clone(), field });
        }
        let draft = self.drafts.remove(pos);
        Ok(self.settle_draft(draft))
    }

    /// Turn a complete draft into a candidate, or park it until the next field arrives.
    fn settle_draft(&mut self, draft: ProfileDraft) -> DraftProgress {
        match draft.into_profile() {
            Ok(profile) => DraftProgress::Complete { candidate: self.add_candidate(profile) },
            Err(draft) => {
                let draft_id = draft.id.clone();
                let field = draft.next_missing().unwrap_or(ContactField::Name);
                debug!(target: "interview", %draft_id, ?field, "Profile draft awaiting fields");
                self.drafts.push(draft);
                DraftProgress::Missing { draft_id, field }
            }
        }
    }

    // ---- session ----

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn active_candidate(&self) -> Option<&Candidate> {
        self.session.as_ref().and_then(|s| self.candidate(&s.candidate_id))
    }

    pub fn stage(&self) -> SessionStage {
        let status = self.active_candidate().map(|c| c.interview_status);
        match status {
            Some(InterviewStatus::InProgress) => SessionStage::InProgress,
            Some(InterviewStatus::Paused) => SessionStage::Paused,
            _ if !self.drafts.is_empty() => SessionStage::AwaitingProfileCompletion,
            Some(InterviewStatus::Completed) => SessionStage::Completed,
            _ => SessionStage::Idle,
        }
    }

    /// Begin the interview for `candidate_id` with a fixed question list.
    pub fn start(&mut self, candidate_id: &str, questions: Vec<Question>) -> Result<Question, AppError> {
        let Some(first) = questions.first().cloned() else {
            return Err(AppError::Validation("cannot start an interview without questions".into()));
        };
        let idx = self.index_of(candidate_id)?;

        if let Some(active) = self.active_candidate() {
            let running = matches!(active.interview_status, InterviewStatus::InProgress | InterviewStatus::Paused);
            if running && active.id != candidate_id {
                return Err(AppError::StateMismatch(format!(
                    "interview for '{}' must be completed or abandoned first",
                    active.name
                )));
            }
        }

        let candidate = &mut self.candidates[idx];
        if candidate.interview_status != InterviewStatus::NotStarted {
            return Err(AppError::StateMismatch(format!(
                "interview for '{candidate_id}' was already started"
            )));
        }
        for (field, value) in [
            (ContactField::Name, &candidate.name),
            (ContactField::Email, &candidate.email),
            (ContactField::Phone, &candidate.phone),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required before starting", field.label())));
            }
        }

        candidate.interview_status = InterviewStatus::InProgress;
        candidate.questions = questions;
        candidate.current_question_index = 0;
        candidate.start_time = Some(Utc::now());

        self.session = Some(Session {
            candidate_id: candidate_id.to_string(),
            current_question: Some(first.clone()),
            time_remaining: first.time_limit,
            paused: false,
            draft: String::new(),
        });
        self.ui.show_welcome_back_modal = false;

        info!(target: "interview", %candidate_id, question_id = %first.id, time_limit = first.time_limit, "Interview started");
        Ok(first)
    }

    /// One second of countdown.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        if session.paused {
            return TickOutcome::Idle;
        }
        let Some(question) = session.current_question.as_ref() else {
            return TickOutcome::Idle;
        };

        if session.time_remaining > 0 {
            session.time_remaining -= 1;
            TickOutcome::Counting(session.time_remaining)
        } else {
            TickOutcome::Expired {
                candidate_id: session.candidate_id.clone(),
                question_id: question.id.clone(),
            }
        }
    }

    pub fn pause(&mut self) -> Result<u32, AppError> {
        let idx = self.session_candidate_index()?;
        let candidate = &mut self.candidates[idx];
        if candidate.interview_status != InterviewStatus::InProgress {
            return Err(AppError::Validation(format!(
                "cannot pause an interview that is {:?}",
                candidate.interview_status
            )));
        }
        candidate.interview_status = InterviewStatus::Paused;
        let session = self.session_mut()?;
        session.paused = true;
        info!(target: "interview", candidate_id = %session.candidate_id, time_remaining = session.time_remaining, "Interview paused");
        Ok(session.time_remaining)
    }

    pub fn resume(&mut self) -> Result<u32, AppError> {
        let idx = self.session_candidate_index()?;
        let candidate = &mut self.candidates[idx];
        if candidate.interview_status != InterviewStatus::Paused {
            return Err(AppError::Validation(format!(
                "cannot resume an interview that is {:?}",
                candidate.interview_status
            )));
        }
        candidate.interview_status = InterviewStatus::InProgress;
        self.ui.show_welcome_back_modal = false;
        let session = self.session_mut()?;
        session.paused = false;
        info!(target: "interview", candidate_id = %session.candidate_id, time_remaining = session.time_remaining, "Interview resumed");
        Ok(session.time_remaining)
    }

    /// Release the session pointer ("start over"). A running interview is frozen as paused.
    pub fn abandon(&mut self) -> Result<(), AppError> {
        let idx = self.session_candidate_index()?;
        let candidate = &mut self.candidates[idx];
        if candidate.interview_status == InterviewStatus::InProgress {
            candidate.interview_status = InterviewStatus::Paused;
        }
        info!(target: "interview", candidate_id = %candidate.id, status = ?candidate.interview_status, "Session abandoned");
        self.session = None;
        self.ui.show_welcome_back_modal = false;
        Ok(())
    }

    /// Buffer the in-progress answer text.
    pub fn update_draft(&mut self, text: &str) -> Result<(), AppError> {
        self.current_in_progress()?;
        self.session_mut()?.draft = text.to_string();
        Ok(())
    }

    /// Current question of a running (not paused) interview.
    pub fn current_in_progress(&self) -> Result<(String, Question), AppError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| AppError::StateMismatch("no interview is in progress".into()))?;
        let candidate = self.candidate(&session.candidate_id).ok_or_else(|| {
            AppError::NotFound(format!("candidate '{}'", session.candidate_id))
        })?;
        match (candidate.interview_status, session.current_question.as_ref()) {
            (InterviewStatus::InProgress, Some(q)) => Ok((candidate.id.clone(), q.clone())),
            (InterviewStatus::Paused, _) => Err(AppError::StateMismatch("interview is paused".into())),
            (status, _) => Err(AppError::StateMismatch(format!("interview is {status:?}"))),
        }
    }

    /// Record an answer to the current question and advance.
    pub fn submit_answer(&mut self, question_id: &str, text: &str, time_spent: u32) -> Result<SubmitOutcome, AppError> {
        let (candidate_id, current) = self.current_in_progress()?;
        if current.id != question_id {
            return Err(AppError::StateMismatch(format!(
                "question '{question_id}' is not the current question ('{}')",
                current.id
            )));
        }

        let idx = self.index_of(&candidate_id)?;
        let now = Utc::now();
        let candidate = &mut self.candidates[idx];
        candidate.answers.push(Answer {
            question_id: question_id.to_string(),
            text: text.to_string(),
            time_spent: time_spent.min(current.time_limit),
            score: None,
            feedback: None,
            submitted_at: now,
        });
        candidate.current_question_index += 1;

        let Some(session) = self.session.as_mut() else {
            return Err(AppError::StateMismatch("no interview is in progress".into()));
        };
        session.draft.clear();

        match candidate.questions.get(candidate.current_question_index).cloned() {
            Some(next) => {
                session.current_question = Some(next.clone());
                session.time_remaining = next.time_limit;
                debug!(target: "interview", %candidate_id, question_id = %next.id, index = candidate.current_question_index, "Advanced to next question");
                Ok(SubmitOutcome::Next { candidate_id, question: next })
            }
            None => {
                candidate.interview_status = InterviewStatus::Completed;
                candidate.end_time = Some(now);
                session.current_question = None;
                session.time_remaining = 0;
                session.paused = false;
                info!(target: "interview", %candidate_id, answers = candidate.answers.len(), "Interview completed");
                Ok(SubmitOutcome::Completed { candidate_id })
            }
        }
    }

    /// Timer-driven submit. Does nothing unless the interview is still running
    /// on `question_id` with no time left, so a manual submit that got there
    /// first always wins.
    pub fn auto_submit(&mut self, question_id: &str, text: &str) -> Option<SubmitOutcome> {
        let (_, current) = self.current_in_progress().ok()?;
        let time_left = self.session.as_ref().map(|s| s.time_remaining).unwrap_or(0);
        if current.id != question_id || time_left > 0 {
            debug!(target: "interview", %question_id, "Stale auto-submit ignored");
            return None;
        }
        self.submit_answer(question_id, text, current.time_limit).ok()
    }

    /// Buffered draft for the current question, if that question is still current.
    pub fn draft_for(&self, question_id: &str) -> Option<(Question, String)> {
        let (_, current) = self.current_in_progress().ok()?;
        let session = self.session.as_ref()?;
        (current.id == question_id).then(|| (current, session.draft.clone()))
    }

    /// Attach a score and feedback to an existing answer.
    pub fn attach_evaluation(&mut self, candidate_id: &str, question_id: &str, evaluation: Evaluation) -> Result<(), AppError> {
        let idx = self.index_of(candidate_id)?;
        let answer = self.candidates[idx]
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
            .ok_or_else(|| AppError::NotFound(format!("answer to question '{question_id}'")))?;
        answer.score = Some(evaluation.score.clamp(1, 10));
        answer.feedback = Some(evaluation.feedback);
        Ok(())
    }

    /// Compute and store the final score of a completed interview.
    pub fn finalize_score(&mut self, candidate_id: &str, policy: UnscoredPolicy) -> Result<ScoreReport, AppError> {
        let idx = self.index_of(candidate_id)?;
        let candidate = &mut self.candidates[idx];
        if candidate.interview_status != InterviewStatus::Completed {
            return Err(AppError::StateMismatch(format!(
                "cannot finalize an interview that is {:?}",
                candidate.interview_status
            )));
        }
        let report = score_answers(&candidate.answers, policy);
        candidate.final_score = Some(report.final_score);
        info!(target: "interview", %candidate_id, final_score = report.final_score, average = report.average, ?policy, "Final score computed");
        Ok(report)
    }

    pub fn attach_summary(&mut self, candidate_id: &str, summary: String) -> Result<(), AppError> {
        let idx = self.index_of(candidate_id)?;
        self.candidates[idx].summary = Some(summary);
        Ok(())
    }

    fn session_candidate_index(&self) -> Result<usize, AppError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| AppError::Validation("no active interview session".into()))?;
        self.index_of(&session.candidate_id)
    }

    fn session_mut(&mut self) -> Result<&mut Session, AppError> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::StateMismatch("no active interview session".into()))
    }
}

/// Rounded mean of the answer scores under the given policy.
pub fn score_answers(answers: &[Answer], policy: UnscoredPolicy) -> ScoreReport {
    let scores: Vec<f64> = match policy {
        UnscoredPolicy::ExcludeUnscored => answers.iter().filter_map(|a| a.score).map(f64::from).collect(),
        UnscoredPolicy::IncludeAsZero => answers.iter().map(|a| f64::from(a.score.unwrap_or(0))).collect(),
    };
    if scores.is_empty() {
        return ScoreReport { final_score: 0, average: 0.0 };
    }
    let average = scores.iter().sum::<f64>() / scores.len() as f64;
    ScoreReport { final_score: average.round() as u8, average }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "5551234567".into(),
            resume_text: None,
        }
    }

    fn questions() -> Vec<Question> {
        vec![
            Question::new("q1", "What is ownership?", Difficulty::Easy, "Rust"),
            Question::new("q2", "Explain Send vs Sync.", Difficulty::Medium, "Concurrency"),
            Question::new("q3", "Design a rate limiter.", Difficulty::Hard, "System Design"),
        ]
    }

    fn started() -> (InterviewStore, String) {
        let mut store = InterviewStore::new();
        let id = store.add_candidate(profile("Ada Lovelace")).id;
        store.start(&id, questions()).unwrap();
        (store, id)
    }

    #[test]
    fn start_points_at_first_question() {
        for qs in [questions(), questions()[1..].to_vec(), questions()[2..].to_vec()] {
            let mut store = InterviewStore::new();
            let id = store.add_candidate(profile("Ada Lovelace")).id;
            let first = store.start(&id, qs.clone()).unwrap();

            let c = store.candidate(&id).unwrap();
            assert_eq!(c.current_question_index, 0);
            assert_eq!(c.interview_status, InterviewStatus::InProgress);
            assert!(c.start_time.is_some());
            assert_eq!(first, qs[0]);
            assert_eq!(store.session().unwrap().time_remaining, qs[0].time_limit);
            assert_eq!(store.stage(), SessionStage::InProgress);
        }
    }

    #[test]
    fn start_rejects_bad_requests() {
        let mut store = InterviewStore::new();
        let id = store.add_candidate(profile("Ada Lovelace")).id;
        assert!(matches!(store.start(&id, vec![]), Err(AppError::Validation(_))));
        assert!(matches!(store.start("nope", questions()), Err(AppError::NotFound(_))));
        assert_eq!(store.candidate(&id).unwrap().interview_status, InterviewStatus::NotStarted);

        store.start(&id, questions()).unwrap();
        assert!(matches!(store.start(&id, questions()), Err(AppError::StateMismatch(_))));

        let other = store.add_candidate(profile("Grace Hopper")).id;
        assert!(matches!(store.start(&other, questions()), Err(AppError::StateMismatch(_))));
        store.abandon().unwrap();
        assert!(store.start(&other, questions()).is_ok());
    }

    #[test]
    fn answers_follow_question_order() {
        let (mut store, id) = started();
        for q in questions() {
            store.submit_answer(&q.id, &format!("answer {}", q.id), 5).unwrap();
        }

        let c = store.candidate(&id).unwrap();
        assert_eq!(c.interview_status, InterviewStatus::Completed);
        assert_eq!(c.answers.len(), c.questions.len());
        let answered: Vec<&str> = c.answers.iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(answered, vec!["q1", "q2", "q3"]);
        assert_eq!(c.current_question_index, c.questions.len());
        assert!(c.end_time.is_some());

        let session = store.session().unwrap();
        assert!(session.current_question.is_none());
        assert_eq!(session.time_remaining, 0);
        assert_eq!(store.stage(), SessionStage::Completed);
    }

    #[test]
    fn last_submit_reports_completion() {
        let (mut store, id) = started();
        assert!(matches!(store.submit_answer("q1", "a", 1).unwrap(), SubmitOutcome::Next { .. }));
        assert!(matches!(store.submit_answer("q2", "b", 1).unwrap(), SubmitOutcome::Next { .. }));
        assert_eq!(
            store.submit_answer("q3", "c", 1).unwrap(),
            SubmitOutcome::Completed { candidate_id: id }
        );
    }

    #[test]
    fn stale_submit_leaves_state_unchanged() {
        let (mut store, _) = started();
        store.submit_answer("q1", "first", 3).unwrap();
        let before = store.clone();

        assert!(matches!(store.submit_answer("q1", "again", 3), Err(AppError::StateMismatch(_))));
        assert!(matches!(store.submit_answer("q3", "ahead", 3), Err(AppError::StateMismatch(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn time_spent_is_capped() {
        let (mut store, id) = started();
        store.submit_answer("q1", "slow", 500).unwrap();
        assert_eq!(store.candidate(&id).unwrap().answers[0].time_spent, 20);
    }

    #[test]
    fn tick_counts_down_then_expires() {
        let (mut store, id) = started();
        for expected in (0..20).rev() {
            assert_eq!(store.tick(), TickOutcome::Counting(expected));
        }
        assert_eq!(
            store.tick(),
            TickOutcome::Expired { candidate_id: id.clone(), question_id: "q1".into() }
        );

        store.update_draft("half an answer").unwrap();
        let outcome = store.auto_submit("q1", "half an answer").unwrap();
        assert!(matches!(outcome, SubmitOutcome::Next { .. }));
        let answer = &store.candidate(&id).unwrap().answers[0];
        assert_eq!(answer.text, "half an answer");
        assert_eq!(answer.time_spent, 20);
    }

    #[test]
    fn auto_submit_after_manual_advance_is_noop() {
        let (mut store, id) = started();
        while store.tick() != (TickOutcome::Expired { candidate_id: id.clone(), question_id: "q1".into() }) {}
        // Manual submit lands before the timer path.
        store.submit_answer("q1", "typed", 20).unwrap();

        assert_eq!(store.auto_submit("q1", ""), None);
        assert_eq!(store.candidate(&id).unwrap().answers.len(), 1);
        // The countdown now runs against the next question.
        assert_eq!(store.tick(), TickOutcome::Counting(59));
    }

    #[test]
    fn auto_submit_with_time_left_is_noop() {
        let (mut store, id) = started();
        assert_eq!(store.auto_submit("q1", "early"), None);
        assert!(store.candidate(&id).unwrap().answers.is_empty());
    }

    #[test]
    fn pause_and_resume_preserve_time() {
        let (mut store, _) = started();
        for _ in 0..7 {
            store.tick();
        }
        assert_eq!(store.pause().unwrap(), 13);
        assert_eq!(store.stage(), SessionStage::Paused);
        for _ in 0..5 {
            assert_eq!(store.tick(), TickOutcome::Idle);
        }
        assert!(matches!(store.submit_answer("q1", "x", 1), Err(AppError::StateMismatch(_))));
        assert!(matches!(store.pause(), Err(AppError::Validation(_))));

        assert_eq!(store.resume().unwrap(), 13);
        assert!(matches!(store.resume(), Err(AppError::Validation(_))));
        assert_eq!(store.tick(), TickOutcome::Counting(12));
    }

    #[test]
    fn pause_without_session_is_validation_error() {
        let mut store = InterviewStore::new();
        store.add_candidate(profile("Ada Lovelace"));
        assert!(matches!(store.pause(), Err(AppError::Validation(_))));
        assert_eq!(store.tick(), TickOutcome::Idle);
    }

    #[test]
    fn final_score_is_rounded_mean() {
        let (mut store, id) = started();
        let mut qs = questions();
        qs.push(Question::new("q4", "Explain Pin.", Difficulty::Hard, "Async"));
        let mut store2 = InterviewStore::new();
        let id2 = store2.add_candidate(profile("Grace Hopper")).id;
        store2.start(&id2, qs.clone()).unwrap();
        for (q, score) in qs.iter().zip([8u8, 6, 10, 4]) {
            store2.submit_answer(&q.id, "answer", 10).unwrap();
            store2
                .attach_evaluation(&id2, &q.id, Evaluation { score, feedback: "ok".into() })
                .unwrap();
        }
        let report = store2.finalize_score(&id2, UnscoredPolicy::ExcludeUnscored).unwrap();
        assert_eq!(report.final_score, 7);
        assert_eq!(store2.candidate(&id2).unwrap().final_score, Some(7));

        assert!(matches!(
            store.finalize_score(&id, UnscoredPolicy::ExcludeUnscored),
            Err(AppError::StateMismatch(_))
        ));
    }

    #[test]
    fn unscored_policy_changes_average() {
        let now = Utc::now();
        let answer = |score: Option<u8>| Answer {
            question_id: "q".into(),
            text: String::new(),
            time_spent: 0,
            score,
            feedback: None,
            submitted_at: now,
        };
        let answers = vec![answer(Some(9)), answer(Some(7)), answer(None)];
        assert_eq!(score_answers(&answers, UnscoredPolicy::ExcludeUnscored).final_score, 8);
        assert_eq!(score_answers(&answers, UnscoredPolicy::IncludeAsZero).final_score, 5);
        assert_eq!(score_answers(&[], UnscoredPolicy::IncludeAsZero).final_score, 0);
    }

    #[test]
    fn evaluation_scores_are_clamped() {
        let (mut store, id) = started();
        store.submit_answer("q1", "a", 1).unwrap();
        store
            .attach_evaluation(&id, "q1", Evaluation { score: 42, feedback: "wow".into() })
            .unwrap();
        assert_eq!(store.candidate(&id).unwrap().answers[0].score, Some(10));
        assert!(matches!(
            store.attach_evaluation(&id, "q2", Evaluation { score: 5, feedback: String::new() }),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn dashboard_sorts_by_score_and_filters() {
        let mut store = InterviewStore::new();
        let a = store.add_candidate(profile("Ada Lovelace")).id;
        let b = store.add_candidate(profile("Grace Hopper")).id;
        let c = store.add_candidate(profile("Alan Turing")).id;
        store.candidates[1].final_score = Some(6);
        store.candidates[2].final_score = Some(9);

        let order: Vec<&str> = store.list_candidates(None).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec![c.as_str(), b.as_str(), a.as_str()]);

        let found = store.list_candidates(Some("  GRACE "));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b);
        assert_eq!(store.list_candidates(Some("alan.turing@")).len(), 1);
    }

    #[test]
    fn drafts_become_candidates_when_complete() {
        let mut store = InterviewStore::new();
        let progress = store.open_draft(
            ExtractedFields { name: Some("Ada Lovelace".into()), email: None, phone: None },
            Some("resume text".into()),
        );
        let DraftProgress::Missing { draft_id, field } = progress else {
            panic!("expected missing field");
        };
        assert_eq!(field, ContactField::Email);
        assert_eq!(store.stage(), SessionStage::AwaitingProfileCompletion);

        assert_eq!(
            store.fill_draft(&draft_id, "ada@engine.org").unwrap(),
            DraftProgress::Missing { draft_id: draft_id.clone(), field: ContactField::Phone }
        );
        let DraftProgress::Complete { candidate } = store.fill_draft(&draft_id, "555 123 4567").unwrap() else {
            panic!("expected completed profile");
        };
        assert_eq!(candidate.resume_text.as_deref(), Some("resume text"));
        assert!(store.draft(&draft_id).is_none());
        assert_eq!(store.candidates().len(), 1);
        assert_eq!(store.stage(), SessionStage::Idle);
        assert!(matches!(store.fill_draft(&draft_id, "x"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn complete_extraction_skips_the_collector() {
        let mut store = InterviewStore::new();
        let progress = store.open_draft(
            ExtractedFields {
                name: Some("Ada Lovelace".into()),
                email: Some("ada@engine.org".into()),
                phone: Some("5551234567".into()),
            },
            None,
        );
        assert!(matches!(progress, DraftProgress::Complete { .. }));
    }

    #[test]
    fn rehydrate_freezes_running_interview() {
        let (mut store, id) = started();
        store.tick();
        let restored = store.clone().rehydrate();
        assert_eq!(restored.candidate(&id).unwrap().interview_status, InterviewStatus::Paused);
        assert!(restored.session().unwrap().paused);
        assert_eq!(restored.session().unwrap().time_remaining, 19);
        assert!(restored.ui.show_welcome_back_modal);

        let mut restored = restored;
        restored.resume().unwrap();
        assert!(!restored.ui.show_welcome_back_modal);
    }

    #[test]
    fn abandon_freezes_and_releases() {
        let (mut store, id) = started();
        store.abandon().unwrap();
        assert!(store.session().is_none());
        assert_eq!(store.candidate(&id).unwrap().interview_status, InterviewStatus::Paused);
        assert!(matches!(store.abandon(), Err(AppError::Validation(_))));
    }
}
