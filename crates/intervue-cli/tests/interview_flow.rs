//! End-to-end interview flows: engine, session and store together.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use intervue_core::engine::{
    session_channel, EngineConfig, InterviewEngine, SessionHandle, SessionObserver,
};
use intervue_core::error::{InterviewError, StoreError, ValidationError};
use intervue_core::model::{
    Answer, Candidate, CandidateId, CandidateInfo, CandidateStatus, Difficulty, Question,
    QuestionBank, QuestionSet, SubmitTrigger,
};
use intervue_core::session::{Session, Stage, SubmitOutcome};
use intervue_core::traits::InterviewStore;
use intervue_store::MemoryStore;

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Question(usize),
    Tick(usize, u32),
    Feedback(usize, f64),
    Complete(f64),
    Abandoned(usize),
    StoreError,
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    fn push(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn ticks(&self) -> Vec<u32> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Tick(_, remaining) => Some(remaining),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for Recorder {
    fn on_question(&self, index: usize, _total: usize, _question: &Question, _time_limit: u32) {
        self.push(Seen::Question(index));
    }

    fn on_tick(&self, index: usize, remaining: u32) {
        self.push(Seen::Tick(index, remaining));
    }

    fn on_feedback(&self, outcome: &SubmitOutcome, _question: &Question) {
        self.push(Seen::Feedback(outcome.question_index, outcome.answer.score));
    }

    fn on_complete(&self, final_score: f64) {
        self.push(Seen::Complete(final_score));
    }

    fn on_abandoned(&self, index: usize) {
        self.push(Seen::Abandoned(index));
    }

    fn on_store_error(&self, _error: &StoreError) {
        self.push(Seen::StoreError);
    }
}

/// Three questions per tier, every one answered fully by "alpha".
fn bank() -> QuestionBank {
    let questions = Difficulty::ALL
        .iter()
        .flat_map(|&difficulty| {
            (0..3).map(move |i| Question {
                id: format!("{difficulty}-{i}"),
                difficulty,
                text: format!("{difficulty} question {i}"),
                keywords: vec!["alpha".into()],
                max_score: 10.0,
            })
        })
        .collect();
    QuestionBank {
        name: "Flow".into(),
        questions,
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        time_limit_secs: 3,
        tick: Duration::from_secs(1),
    }
}

fn candidate() -> CandidateInfo {
    CandidateInfo::new("Barbara Liskov", "barbara@example.com", "555-0101")
}

async fn setup(store: Arc<dyn InterviewStore>) -> (InterviewEngine, QuestionSet, Session) {
    let set = store.create_question_set(bank()).await.unwrap();
    let engine = InterviewEngine::new(store, config());
    let session = engine.register(&set.interview_code, &candidate()).await.unwrap();
    (engine, set, session)
}

fn answer_everything(handle: &SessionHandle, text: &str) {
    assert!(handle.start());
    for index in 0..6 {
        assert!(handle.submit(index, text));
        assert!(handle.next());
    }
}

#[tokio::test(start_paused = true)]
async fn completed_interview_is_scored_and_stored() {
    let store = Arc::new(MemoryStore::new());
    let (engine, set, session) = setup(store.clone()).await;
    let session_id = session.id();

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    answer_everything(&handle, "alpha");
    drop(handle);

    let outcome = engine.run(session, events, &recorder).await.unwrap();
    assert_eq!(outcome.stage, Stage::Complete);
    assert_eq!(outcome.answers.len(), 6);
    assert_eq!(outcome.final_score, Some(10.0));
    assert_eq!(outcome.store_failures, 0);
    assert!(outcome.answers.iter().all(|a| a.trigger == SubmitTrigger::Manual));

    let seen = recorder.seen();
    assert_eq!(seen.first(), Some(&Seen::Question(0)));
    assert_eq!(seen.last(), Some(&Seen::Complete(10.0)));
    assert_eq!(
        seen.iter().filter(|s| matches!(s, Seen::Feedback(_, score) if *score == 10.0)).count(),
        6
    );

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::Completed);
    assert_eq!(stored.final_score, Some(10.0));
    assert_eq!(stored.answers.len(), 6);
    assert_eq!(stored.interview_code, set.interview_code);

    // two questions from each tier, no repeats
    let mut ids: Vec<&str> = stored.answers.iter().map(|a| a.question_id.as_str()).collect();
    for difficulty in Difficulty::ALL {
        let prefix = format!("{difficulty}-");
        assert_eq!(ids.iter().filter(|id| id.starts_with(&prefix)).count(), 2);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 6);

    assert!(matches!(
        store.load_session(session_id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn timeout_submits_the_draft() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;
    let session_id = session.id();

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    let driver = async move {
        handle.start();
        handle.draft("alpha, half typed");
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(handle);
    };

    let (outcome, ()) = tokio::join!(engine.run(session, events, &recorder), driver);
    let outcome = outcome.unwrap();

    // the queue closed during feedback, so the session is left resumable
    assert_eq!(outcome.stage, Stage::Feedback);
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.answers[0].trigger, SubmitTrigger::Timeout);
    assert_eq!(outcome.answers[0].raw_text, "alpha, half typed");
    assert_eq!(outcome.answers[0].score, 10.0);
    assert_eq!(recorder.ticks(), vec![2, 1]);

    let saved = store.load_session(session_id).await.unwrap();
    assert_eq!(saved.stage(), Stage::Feedback);
    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::InProgress);
    assert_eq!(stored.answers.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_with_empty_draft_scores_zero() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store).await;

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    let driver = async move {
        handle.start();
        tokio::time::sleep(Duration::from_secs(10)).await;
    };

    let (outcome, ()) = tokio::join!(engine.run(session, events, &recorder), driver);
    let outcome = outcome.unwrap();
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.answers[0].raw_text, "");
    assert_eq!(outcome.answers[0].score, 0.0);
    assert!(recorder.seen().contains(&Seen::Feedback(0, 0.0)));
}

#[tokio::test(start_paused = true)]
async fn only_the_first_submission_counts() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    let driver = async move {
        handle.start();
        handle.submit(0, "alpha");
        handle.submit(0, "a second try");
        // the countdown is disarmed, so waiting past the limit adds nothing
        tokio::time::sleep(Duration::from_secs(10)).await;
    };

    let (outcome, ()) = tokio::join!(engine.run(session, events, &recorder), driver);
    let outcome = outcome.unwrap();
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.answers[0].raw_text, "alpha");
    assert_eq!(outcome.answers[0].trigger, SubmitTrigger::Manual);
    assert!(recorder.ticks().is_empty());

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.answers.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn hiding_during_a_question_abandons() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;
    let session_id = session.id();

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    handle.start();
    handle.hidden();

    let outcome = engine.run(session, events, &recorder).await.unwrap();
    assert_eq!(outcome.stage, Stage::Abandoned);
    assert!(outcome.answers.is_empty());
    assert_eq!(outcome.final_score, None);
    assert_eq!(recorder.seen().last(), Some(&Seen::Abandoned(0)));

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::Abandoned);
    assert_eq!(stored.final_score, None);
    assert!(store.load_session(session_id).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn hiding_outside_a_question_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    handle.hidden();
    handle.start();
    handle.submit(0, "alpha");
    handle.hidden();
    handle.next();
    // closing the queue with question 2 open counts as leaving
    drop(handle);

    let outcome = engine.run(session, events, &recorder).await.unwrap();
    assert_eq!(outcome.stage, Stage::Abandoned);
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(
        recorder.seen(),
        vec![
            Seen::Question(0),
            Seen::Feedback(0, 10.0),
            Seen::Question(1),
            Seen::Abandoned(1),
        ]
    );

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::Abandoned);
    assert_eq!(stored.answers.len(), 1);
}

#[tokio::test]
async fn closing_before_start_leaves_candidate_in_progress() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;
    let session_id = session.id();

    let (handle, events) = session_channel();
    drop(handle);

    let outcome = engine.run(session, events, &Recorder::default()).await.unwrap();
    assert_eq!(outcome.stage, Stage::Instructions);

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::InProgress);
    assert_eq!(
        store.load_session(session_id).await.unwrap().stage(),
        Stage::Instructions
    );
}

#[tokio::test]
async fn registration_validates_before_storing() {
    let store = Arc::new(MemoryStore::new());
    let set = store.create_question_set(bank()).await.unwrap();
    let engine = InterviewEngine::new(store.clone(), config());

    let err = engine
        .register(
            &set.interview_code,
            &CandidateInfo::new("Barbara", "barbara-at-example", "1"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InterviewError::Validation(ValidationError::InvalidEmail(_))
    ));

    let err = engine
        .register(&set.interview_code, &CandidateInfo::new("  ", "b@example.com", "1"))
        .await
        .unwrap_err();
    assert_eq!(err, InterviewError::Validation(ValidationError::EmptyName));

    assert!(store.candidates_for(&set.interview_code).await.unwrap().is_empty());

    let err = engine.register("ZZZZZZ", &candidate()).await.unwrap_err();
    assert!(matches!(err, InterviewError::NotFound { entity: "question set", .. }));
}

#[tokio::test]
async fn dashboard_sees_every_candidate() {
    let store = Arc::new(MemoryStore::new());
    let set = store.create_question_set(bank()).await.unwrap();
    let engine = InterviewEngine::new(store.clone(), config());

    let first = engine.register(&set.interview_code, &candidate()).await.unwrap();
    let (handle, events) = session_channel();
    answer_everything(&handle, "alpha");
    drop(handle);
    engine.run(first, events, &Recorder::default()).await.unwrap();

    let second = engine
        .register(
            &set.interview_code.to_lowercase(),
            &CandidateInfo::new("Edsger", "edsger@example.com", "555-0102"),
        )
        .await
        .unwrap();
    let (handle, events) = session_channel();
    handle.start();
    handle.hidden();
    engine.run(second, events, &Recorder::default()).await.unwrap();

    let board = store
        .question_set_by_dashboard_code(&set.dashboard_code)
        .await
        .unwrap();
    let candidates = store.candidates_for(&board.interview_code).await.unwrap();
    let report = intervue_core::report::DashboardReport::build(&board, candidates);

    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.completed, 1);
    assert_eq!(report.stats.abandoned, 1);
    assert_eq!(report.stats.average_score, 5.0);
    assert_eq!(report.candidates[0].name, "Edsger");
}

/// A memory store with switchable write failures.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_answers: bool,
    fail_sessions: bool,
}

#[async_trait]
impl InterviewStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn create_question_set(&self, bank: QuestionBank) -> Result<QuestionSet, StoreError> {
        self.inner.create_question_set(bank).await
    }

    async fn question_set_by_interview_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        self.inner.question_set_by_interview_code(code).await
    }

    async fn question_set_by_dashboard_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        self.inner.question_set_by_dashboard_code(code).await
    }

    async fn create_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError> {
        self.inner.create_candidate(candidate).await
    }

    async fn candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.inner.candidate(id).await
    }

    async fn append_answer(&self, id: CandidateId, answer: Answer) -> Result<(), StoreError> {
        if self.fail_answers {
            return Err(StoreError::Io("disk full".into()));
        }
        self.inner.append_answer(id, answer).await
    }

    async fn complete_candidate(&self, id: CandidateId, final_score: f64) -> Result<(), StoreError> {
        self.inner.complete_candidate(id, final_score).await
    }

    async fn update_status(&self, id: CandidateId, status: CandidateStatus) -> Result<(), StoreError> {
        self.inner.update_status(id, status).await
    }

    async fn candidates_for(&self, interview_code: &str) -> Result<Vec<Candidate>, StoreError> {
        self.inner.candidates_for(interview_code).await
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        if self.fail_sessions {
            return Err(StoreError::Io("read-only".into()));
        }
        self.inner.save_session(session).await
    }

    async fn load_session(&self, id: Uuid) -> Result<Session, StoreError> {
        self.inner.load_session(id).await
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete_session(id).await
    }
}

#[tokio::test(start_paused = true)]
async fn store_failures_do_not_stop_the_interview() {
    let store = Arc::new(FlakyStore {
        fail_answers: true,
        ..FlakyStore::default()
    });
    let (engine, _set, session) = setup(store.clone()).await;

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    answer_everything(&handle, "alpha");
    drop(handle);

    let outcome = engine.run(session, events, &recorder).await.unwrap();
    assert_eq!(outcome.stage, Stage::Complete);
    assert_eq!(outcome.final_score, Some(10.0));
    assert_eq!(outcome.store_failures, 6);
    assert_eq!(
        recorder.seen().iter().filter(|s| **s == Seen::StoreError).count(),
        6
    );

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.status, CandidateStatus::Completed);
    assert!(stored.answers.is_empty());
}

#[tokio::test]
async fn failed_first_snapshot_closes_the_candidate() {
    let store = Arc::new(FlakyStore {
        fail_sessions: true,
        ..FlakyStore::default()
    });
    let set = store.create_question_set(bank()).await.unwrap();
    let engine = InterviewEngine::new(store.clone(), config());

    let err = engine
        .register(&set.interview_code, &candidate())
        .await
        .unwrap_err();
    assert_eq!(err, InterviewError::Store(StoreError::Io("read-only".into())));

    let candidates = store.candidates_for(&set.interview_code).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].status, CandidateStatus::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn submit_arriving_with_the_final_tick_records_one_answer() {
    let store = Arc::new(MemoryStore::new());
    let (engine, _set, session) = setup(store.clone()).await;

    let recorder = Recorder::default();
    let (handle, events) = session_channel();
    let driver = async move {
        handle.start();
        handle.draft("alpha typed before the deadline");
        // wake at the same instant the countdown reaches zero
        tokio::time::sleep(Duration::from_secs(u64::from(config().time_limit_secs))).await;
        handle.submit(0, "alpha at the buzzer");
        tokio::time::sleep(Duration::from_secs(10)).await;
    };

    let (outcome, ()) = tokio::join!(engine.run(session, events, &recorder), driver);
    let outcome = outcome.unwrap();

    assert_eq!(outcome.stage, Stage::Feedback);
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.store_failures, 0);
    let answer = &outcome.answers[0];
    match answer.trigger {
        SubmitTrigger::Timeout => assert_eq!(answer.raw_text, "alpha typed before the deadline"),
        SubmitTrigger::Manual => assert_eq!(answer.raw_text, "alpha at the buzzer"),
    }
    assert_eq!(
        recorder.seen().iter().filter(|s| matches!(s, Seen::Feedback(0, _))).count(),
        1
    );

    let stored = store.candidate(outcome.candidate_id).await.unwrap();
    assert_eq!(stored.answers.len(), 1);
    assert_eq!(stored.answers[0], *answer);
}
