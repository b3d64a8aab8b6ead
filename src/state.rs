//! Application state: the interview store behind one lock, snapshot persistence,
//! prompts and policies from config, the optional OpenAI client and the countdown task.
//!
//! Every mutation goes through `AppState::mutate`, which applies the change and
//! writes the snapshot while still holding the write lock, so the file on disk
//! always reflects a state the store actually passed through.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, instrument};

use crate::config::{load_agent_config_from_env, AgentConfig, LimitsCfg, Prompts};
use crate::domain::Question;
use crate::logic::TickStep;
use crate::openai::OpenAI;
use crate::seeds::bank_questions;
use crate::session::{InterviewStore, UnscoredPolicy};
use crate::snapshot::SnapshotStore;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle of the single countdown task. Replacing it aborts the previous one.
pub struct Countdown {
    handle: Mutex<Option<JoinHandle<()>>>,
    period: Duration,
}

impl Countdown {
    fn new(period: Duration) -> Self {
        Self { handle: Mutex::new(None), period }
    }

    fn replace(&self, next: Option<JoinHandle<()>>) {
        let mut guard = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = std::mem::replace(&mut *guard, next) {
            old.abort();
        }
    }

    pub fn cancel(&self) {
        self.replace(None);
    }

    pub fn is_running(&self) -> bool {
        let guard = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().is_some_and(|h| !h.is_finished())
    }
}

pub struct AppState {
    store: RwLock<InterviewStore>,
    snapshot: Option<SnapshotStore>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub question_bank: Vec<Question>,
    pub unscored: UnscoredPolicy,
    pub limits: LimitsCfg,
    pub countdown: Countdown,
}

impl AppState {
    /// Build state from env: load config, restore the snapshot, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let snapshot = SnapshotStore::new(cfg.snapshot_path());
        info!(target: "interview_backend", path = %snapshot.path().display(), "Snapshot location");
        let store = snapshot.load().await.rehydrate();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "interview_backend", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
        } else {
            info!(target: "interview_backend", "OpenAI disabled (no OPENAI_API_KEY). Using local fallbacks.");
        }

        let mut state = Self::build(cfg, store, openai);
        state.snapshot = Some(snapshot);
        state
    }

    /// State without env, snapshot file or model. Used by tests.
    pub fn in_memory(cfg: AgentConfig, store: InterviewStore) -> Self {
        Self::build(cfg, store, None)
    }

    fn build(cfg: AgentConfig, store: InterviewStore, openai: Option<OpenAI>) -> Self {
        let question_bank = bank_questions(&cfg.questions);
        info!(target: "interview_backend", bank = question_bank.len(), candidates = store.candidates().len(), "Startup inventory");
        Self {
            store: RwLock::new(store),
            snapshot: None,
            openai,
            prompts: cfg.prompts,
            question_bank,
            unscored: cfg.scoring.unscored,
            limits: cfg.limits,
            countdown: Countdown::new(TICK_PERIOD),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&InterviewStore) -> R) -> R {
        let guard = self.store.read().await;
        f(&guard)
    }

    /// Apply a change to the store and persist the result.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut InterviewStore) -> R) -> R {
        let mut guard = self.store.write().await;
        let out = f(&mut guard);
        self.persist(&guard).await;
        out
    }

    async fn persist(&self, store: &InterviewStore) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.save(store).await {
                error!(target: "interview_backend", error = %e, "Snapshot write failed");
            }
        }
    }

    /// Final snapshot on shutdown.
    pub async fn flush(&self) {
        self.countdown.cancel();
        let guard = self.store.read().await;
        self.persist(&guard).await;
        info!(target: "interview_backend", "Final snapshot written");
    }

    /// (Re)start the one-second countdown for the current question. The first
    /// tick lands one full period from now.
    ///
    /// A timed-out question is scored inside the loop, which can take as long as
    /// the model timeout. Ticks missed meanwhile are not replayed, and the next
    /// question gets its first tick one full period after it was loaded.
    pub fn restart_countdown(self: &Arc<Self>) {
        let state = Arc::clone(self);
        let period = self.countdown.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match crate::logic::on_tick(&state).await {
                    TickStep::Continue => {}
                    TickStep::Advanced => interval.reset(),
                    TickStep::Done => {
                        debug!(target: "interview", "Countdown finished");
                        break;
                    }
                }
            }
        });
        self.countdown.replace(Some(handle));
    }
}
