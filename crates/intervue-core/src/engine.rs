//! Session driver.
//!
//! Runs one [`Session`] to completion. Candidate actions arrive as
//! [`SessionEvent`]s on a single-consumer channel and the per-question
//! countdown is an interval polled by the same loop, so submit, timeout and
//! visibility triggers are handled strictly one at a time. Persistence goes
//! through an [`InterviewStore`]; failures there are logged and reported but
//! never stop the interview.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

use crate::error::{InterviewError, StoreError};
use crate::model::{Answer, Candidate, CandidateId, CandidateInfo, CandidateStatus, Question, SubmitTrigger};
use crate::session::{Advance, Session, Stage, SubmitOutcome, TickOutcome, DEFAULT_TIME_LIMIT_SECS};
use crate::traits::InterviewStore;

/// Configuration for the interview engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Countdown per question, in ticks.
    pub time_limit_secs: u32,
    /// Length of one countdown tick.
    pub tick: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            tick: Duration::from_secs(1),
        }
    }
}

/// Something the candidate did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Leave the instructions and open the first question.
    Start,
    /// The answer box changed. A timeout submits the latest draft.
    Draft(String),
    Submit { question_index: usize, text: String },
    /// Continue from feedback.
    Next,
    /// The candidate's window was hidden or closed.
    Hidden,
}

/// Sending half of a session's event queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Queue an event. Returns `false` once the session has finished.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(SessionEvent::Start)
    }

    pub fn draft(&self, text: impl Into<String>) -> bool {
        self.send(SessionEvent::Draft(text.into()))
    }

    pub fn submit(&self, question_index: usize, text: impl Into<String>) -> bool {
        self.send(SessionEvent::Submit {
            question_index,
            text: text.into(),
        })
    }

    pub fn next(&self) -> bool {
        self.send(SessionEvent::Next)
    }

    pub fn hidden(&self) -> bool {
        self.send(SessionEvent::Hidden)
    }
}

/// Create the event queue for one session.
pub fn session_channel() -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SessionHandle { tx }, rx)
}

/// Progress callbacks for whoever is presenting the interview.
pub trait SessionObserver: Send + Sync {
    fn on_question(&self, _index: usize, _total: usize, _question: &Question, _time_limit: u32) {}
    fn on_tick(&self, _index: usize, _remaining: u32) {}
    fn on_feedback(&self, _outcome: &SubmitOutcome, _question: &Question) {}
    fn on_complete(&self, _final_score: f64) {}
    fn on_abandoned(&self, _index: usize) {}
    fn on_store_error(&self, _error: &StoreError) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub candidate_id: CandidateId,
    /// `complete` or `abandoned`, or the stage the candidate left in.
    pub stage: Stage,
    pub answers: Vec<Answer>,
    pub final_score: Option<f64>,
    /// Store calls that failed along the way.
    pub store_failures: usize,
}

enum Trigger {
    Event(Option<SessionEvent>),
    Tick(usize),
}

struct Countdown {
    question_index: usize,
    interval: Interval,
}

impl Countdown {
    fn arm(question_index: usize, tick: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            question_index,
            interval,
        }
    }
}

async fn next_tick(countdown: &mut Option<Countdown>) -> usize {
    match countdown {
        Some(countdown) => {
            countdown.interval.tick().await;
            countdown.question_index
        }
        None => std::future::pending().await,
    }
}

/// The interview engine.
pub struct InterviewEngine {
    store: Arc<dyn InterviewStore>,
    config: EngineConfig,
}

impl InterviewEngine {
    pub fn new(store: Arc<dyn InterviewStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the candidate, create them under `interview_code` and return
    /// a session waiting in the instructions stage.
    ///
    /// Invalid details fail before anything is stored. If the first session
    /// snapshot cannot be saved the new candidate is marked abandoned.
    pub async fn register(
        &self,
        interview_code: &str,
        info: &CandidateInfo,
    ) -> Result<Session, InterviewError> {
        let info = info.validate()?;
        let question_set = self
            .store
            .question_set_by_interview_code(interview_code)
            .await?;
        let candidate = self
            .store
            .create_candidate(Candidate::new(question_set.interview_code.clone(), info))
            .await?;

        let mut session = Session::new(&question_set, self.config.time_limit_secs);
        session.capture_candidate(candidate.id)?;
        if let Err(err) = self.store.save_session(&session).await {
            // No session will ever drive this candidate; close the record.
            tracing::error!(candidate = %candidate.id, error = %err, "session snapshot failed");
            if let Err(status_err) = self
                .store
                .update_status(candidate.id, CandidateStatus::Abandoned)
                .await
            {
                tracing::error!(candidate = %candidate.id, error = %status_err, "mark abandoned");
            }
            return Err(err.into());
        }

        tracing::info!(
            session = %session.id(),
            candidate = %candidate.id,
            interview_code = %question_set.interview_code,
            "candidate registered"
        );
        Ok(session)
    }

    /// Drive `session` until it completes, is abandoned, or its event queue
    /// closes outside a question.
    pub async fn run(
        &self,
        mut session: Session,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        observer: &dyn SessionObserver,
    ) -> Result<SessionOutcome, InterviewError> {
        let Some(candidate_id) = session.candidate_id() else {
            return Err(InterviewError::InvalidTransition {
                stage: session.stage(),
                action: "run",
            });
        };

        let mut rng = StdRng::from_entropy();
        let mut countdown: Option<Countdown> = None;
        let mut store_failures = 0usize;

        while !session.stage().is_terminal() {
            let trigger = tokio::select! {
                event = events.recv() => Trigger::Event(event),
                index = next_tick(&mut countdown) => Trigger::Tick(index),
            };

            match trigger {
                Trigger::Event(Some(SessionEvent::Start)) => {
                    match session.start(&mut rng).map(|_| ()) {
                        Ok(()) => {
                            countdown = Some(Countdown::arm(0, self.config.tick));
                            self.announce_question(&session, observer);
                            let saved = self.store.save_session(&session).await;
                            self.note(saved, "save session", observer, &mut store_failures);
                        }
                        Err(err) => self.reject(err, "start")?,
                    }
                }
                Trigger::Event(Some(SessionEvent::Draft(text))) => {
                    if let Err(err) = session.set_draft(text) {
                        self.reject(err, "draft")?;
                    }
                }
                Trigger::Event(Some(SessionEvent::Submit {
                    question_index,
                    text,
                })) => match session.submit(question_index, text, SubmitTrigger::Manual) {
                    Ok(outcome) => {
                        countdown = None;
                        self.record_answer(&session, candidate_id, outcome, observer, &mut store_failures)
                            .await;
                    }
                    Err(err) => self.reject(err, "submit")?,
                },
                Trigger::Event(Some(SessionEvent::Next)) => match session.advance() {
                    Ok(Advance::Next(index)) => {
                        countdown = Some(Countdown::arm(index, self.config.tick));
                        self.announce_question(&session, observer);
                        let saved = self.store.save_session(&session).await;
                        self.note(saved, "save session", observer, &mut store_failures);
                    }
                    Ok(Advance::Complete(final_score)) => {
                        tracing::info!(
                            session = %session.id(),
                            candidate = %candidate_id,
                            final_score,
                            "interview complete"
                        );
                        let completed = self.store.complete_candidate(candidate_id, final_score).await;
                        self.note(completed, "complete candidate", observer, &mut store_failures);
                        observer.on_complete(final_score);
                    }
                    Err(err) => self.reject(err, "advance")?,
                },
                Trigger::Event(Some(SessionEvent::Hidden)) => {
                    self.abandon(&mut session, candidate_id, observer, &mut store_failures)
                        .await;
                    countdown = None;
                }
                Trigger::Event(None) => {
                    if session.stage() == Stage::Question {
                        self.abandon(&mut session, candidate_id, observer, &mut store_failures)
                            .await;
                        countdown = None;
                    } else {
                        tracing::info!(
                            session = %session.id(),
                            stage = %session.stage(),
                            "event queue closed"
                        );
                        break;
                    }
                }
                Trigger::Tick(index) => match session.tick(index)? {
                    TickOutcome::Stale => {
                        tracing::debug!(question_index = index, "dropping stale countdown");
                        countdown = None;
                    }
                    TickOutcome::Running { remaining } => observer.on_tick(index, remaining),
                    TickOutcome::Expired(outcome) => {
                        countdown = None;
                        tracing::info!(
                            session = %session.id(),
                            question_index = index,
                            "time expired, submitting draft"
                        );
                        self.record_answer(&session, candidate_id, outcome, observer, &mut store_failures)
                            .await;
                    }
                },
            }
        }

        if session.stage().is_terminal() {
            let deleted = self.store.delete_session(session.id()).await;
            self.note(deleted, "delete session", observer, &mut store_failures);
        }

        Ok(SessionOutcome {
            session_id: session.id(),
            candidate_id,
            stage: session.stage(),
            answers: session.answers().to_vec(),
            final_score: session.final_score(),
            store_failures,
        })
    }

    fn announce_question(&self, session: &Session, observer: &dyn SessionObserver) {
        let Some(question) = session.current_question() else {
            return;
        };
        let total = session.selected().map_or(0, |s| s.len());
        tracing::info!(
            session = %session.id(),
            question_index = session.current_index(),
            question = %question.id,
            difficulty = %question.difficulty,
            "question opened"
        );
        observer.on_question(session.current_index(), total, question, session.time_limit());
    }

    async fn record_answer(
        &self,
        session: &Session,
        candidate_id: CandidateId,
        outcome: SubmitOutcome,
        observer: &dyn SessionObserver,
        store_failures: &mut usize,
    ) {
        tracing::info!(
            session = %session.id(),
            question_index = outcome.question_index,
            question = %outcome.answer.question_id,
            score = outcome.answer.score,
            trigger = ?outcome.answer.trigger,
            "answer recorded"
        );

        let appended = self
            .store
            .append_answer(candidate_id, outcome.answer.clone())
            .await;
        self.note(appended, "append answer", observer, store_failures);

        let saved = self.store.save_session(session).await;
        self.note(saved, "save session", observer, store_failures);

        if let Some(question) = session.current_question() {
            observer.on_feedback(&outcome, question);
        }
    }

    async fn abandon(
        &self,
        session: &mut Session,
        candidate_id: CandidateId,
        observer: &dyn SessionObserver,
        store_failures: &mut usize,
    ) {
        if let Err(err) = session.abandon() {
            tracing::debug!(error = %err, "ignoring visibility change");
            return;
        }
        tracing::info!(
            session = %session.id(),
            candidate = %candidate_id,
            question_index = session.current_index(),
            "interview abandoned"
        );
        let updated = self
            .store
            .update_status(candidate_id, CandidateStatus::Abandoned)
            .await;
        self.note(updated, "mark abandoned", observer, store_failures);
        observer.on_abandoned(session.current_index());
    }

    /// Drop triggers that lost a race or arrived in the wrong stage; pass
    /// anything else up.
    fn reject(&self, err: InterviewError, action: &'static str) -> Result<(), InterviewError> {
        if err.is_benign() {
            tracing::debug!(action, error = %err, "ignoring trigger");
            Ok(())
        } else {
            Err(err)
        }
    }

    fn note(
        &self,
        result: Result<(), StoreError>,
        action: &'static str,
        observer: &dyn SessionObserver,
        store_failures: &mut usize,
    ) {
        if let Err(err) = result {
            tracing::error!(action, error = %err, "persistence failed");
            observer.on_store_error(&err);
            *store_failures += 1;
        }
    }
}
