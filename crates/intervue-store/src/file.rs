//! File-backed store.
//!
//! The whole store is one pretty-printed JSON document. Several processes may
//! share a data directory, so nothing is cached between calls: every
//! operation takes an advisory lock on a sibling lock file, reads the current
//! document and, for mutations, writes the result to a temporary file that is
//! renamed over the old document before the lock is released.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use intervue_core::error::StoreError;
use intervue_core::model::{
    Answer, Candidate, CandidateId, CandidateStatus, QuestionBank, QuestionSet,
};
use intervue_core::session::Session;
use intervue_core::traits::InterviewStore;

use crate::state::StoreState;

/// Name of the store document inside the data directory.
pub const STORE_FILE_NAME: &str = "intervue-store.json";

/// Name of the advisory lock file inside the data directory.
pub const LOCK_FILE_NAME: &str = "intervue-store.lock";

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {err}", path.display()))
}

/// Holds the lock file locked until dropped.
struct DocumentLock {
    file: File,
}

impl DocumentLock {
    fn acquire(path: &Path, exclusive: bool) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| io_error(path, e))?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| io_error(path, e))?;
        Ok(Self { file })
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[derive(Clone)]
struct Paths {
    document: PathBuf,
    lock: PathBuf,
}

impl Paths {
    fn read_document(&self) -> Result<StoreState, StoreError> {
        match std::fs::read_to_string(&self.document) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::Serialization(format!("{}: {e}", self.document.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
            Err(e) => Err(io_error(&self.document, e)),
        }
    }

    fn write_document(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.document.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.document).map_err(|e| io_error(&self.document, e))
    }
}

/// A store persisted as JSON under a data directory.
pub struct FileStore {
    paths: Paths,
    /// Serializes calls from this process so they do not all park blocking
    /// threads on the file lock.
    guard: Mutex<()>,
}

impl FileStore {
    /// Open the store in `data_dir`, creating the directory if needed.
    ///
    /// An existing document is parsed once here so a corrupt file is
    /// reported up front.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| io_error(data_dir, e))?;

        let store = Self {
            paths: Paths {
                document: data_dir.join(STORE_FILE_NAME),
                lock: data_dir.join(LOCK_FILE_NAME),
            },
            guard: Mutex::new(()),
        };
        store.read(|_| Ok(())).await?;

        tracing::debug!(path = %store.path().display(), "opened file store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.paths.document
    }

    /// Run `f` against the current document under a shared lock.
    async fn read<T: Send + 'static>(
        &self,
        f: impl FnOnce(&StoreState) -> Result<T, StoreError> + Send + 'static,
    ) -> Result<T, StoreError> {
        let _guard = self.guard.lock().await;
        let paths = self.paths.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = DocumentLock::acquire(&paths.lock, false)?;
            f(&paths.read_document()?)
        })
        .await
        .map_err(|e| StoreError::Io(format!("store task failed: {e}")))?
    }

    /// Apply `f` to the current document under an exclusive lock and write
    /// the result back. Nothing is written when `f` fails.
    async fn mutate<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError> + Send + 'static,
    ) -> Result<T, StoreError> {
        let _guard = self.guard.lock().await;
        let paths = self.paths.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = DocumentLock::acquire(&paths.lock, true)?;
            let mut state = paths.read_document()?;
            let out = f(&mut state)?;
            paths.write_document(&state)?;
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Io(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl InterviewStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn create_question_set(&self, bank: QuestionBank) -> Result<QuestionSet, StoreError> {
        self.mutate(move |state| Ok(state.create_question_set(bank))).await
    }

    async fn question_set_by_interview_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        let code = code.to_string();
        self.read(move |state| state.question_set_by_interview_code(&code))
            .await
    }

    async fn question_set_by_dashboard_code(&self, code: &str) -> Result<QuestionSet, StoreError> {
        let code = code.to_string();
        self.read(move |state| state.question_set_by_dashboard_code(&code))
            .await
    }

    async fn create_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError> {
        self.mutate(move |state| state.create_candidate(candidate)).await
    }

    async fn candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.read(move |state| state.candidate(id)).await
    }

    async fn append_answer(&self, id: CandidateId, answer: Answer) -> Result<(), StoreError> {
        self.mutate(move |state| state.append_answer(id, answer)).await
    }

    async fn complete_candidate(&self, id: CandidateId, final_score: f64) -> Result<(), StoreError> {
        self.mutate(move |state| state.complete_candidate(id, final_score))
            .await
    }

    async fn update_status(&self, id: CandidateId, status: CandidateStatus) -> Result<(), StoreError> {
        self.mutate(move |state| state.update_status(id, status)).await
    }

    async fn candidates_for(&self, interview_code: &str) -> Result<Vec<Candidate>, StoreError> {
        let code = interview_code.to_string();
        self.read(move |state| Ok(state.candidates_for(&code))).await
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let session = session.clone();
        self.mutate(move |state| {
            state.save_session(&session);
            Ok(())
        })
        .await
    }

    async fn load_session(&self, id: Uuid) -> Result<Session, StoreError> {
        self.read(move |state| state.load_session(id)).await
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), StoreError> {
        self.mutate(move |state| state.delete_session(id)).await
    }
}
