//! Editing sessions with copy-on-write snapshots and background autosave.
//!
//! An [`EditSession`] holds the current paper as an `Arc<Paper>`. Edits build
//! a new paper and swap the pointer, so a snapshot taken for rendering or
//! saving is never affected by later edits. [`Autosave`] is an owned
//! background task that saves the latest snapshot whenever it changed;
//! stopping or dropping the handle joins the thread.

use crate::error::Result;
use crate::model::Paper;
use crate::storage::PaperStore;
use crossbeam_channel::{bounded, select, tick, Sender};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
struct State {
    paper: Arc<Paper>,
    revision: u64,
    saved_revision: u64,
}

/// Shared handle to a paper being edited. Clones share the same state.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: Arc<RwLock<State>>,
}

impl EditSession {
    /// Start a session on a paper that is already persisted.
    pub fn new(paper: Paper) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                paper: Arc::new(paper),
                revision: 0,
                saved_revision: 0,
            })),
        }
    }

    /// The current paper.
    pub fn snapshot(&self) -> Arc<Paper> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.paper)
    }

    /// Number of edits applied since the session started.
    pub fn revision(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    /// Whether there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.revision != state.saved_revision
    }

    /// Apply a functional edit. On error the session is left unchanged.
    pub fn apply<F>(&self, edit: F) -> Result<Arc<Paper>>
    where
        F: FnOnce(&Paper) -> Result<Paper>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(edit(&state.paper)?);
        state.paper = Arc::clone(&next);
        state.revision += 1;
        Ok(next)
    }

    /// Replace the paper outright.
    pub fn replace(&self, paper: Paper) -> Arc<Paper> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.paper = Arc::new(paper);
        state.revision += 1;
        Arc::clone(&state.paper)
    }

    /// Save the current snapshot to `store`.
    ///
    /// The saved value (with its refreshed `updated_at`) becomes the current
    /// paper unless another edit landed while saving.
    pub fn save(&self, store: &dyn PaperStore) -> Result<Paper> {
        let (paper, revision) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            (Arc::clone(&state.paper), state.revision)
        };

        let saved = store.upsert_paper(&paper)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.revision == revision {
            state.paper = Arc::new(saved.clone());
        }
        state.saved_revision = state.saved_revision.max(revision);
        Ok(saved)
    }

    /// Start saving to `store` every `interval` while there are unsaved edits.
    pub fn autosave(&self, store: Arc<dyn PaperStore>, interval: Duration) -> Autosave {
        Autosave::start(self.clone(), store, interval)
    }
}

/// Handle to a running autosave task.
#[derive(Debug)]
pub struct Autosave {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    saves: Arc<AtomicUsize>,
}

impl Autosave {
    fn start(session: EditSession, store: Arc<dyn PaperStore>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&saves);

        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            debug!("Autosave started ({:?})", interval);
            loop {
                let stopped = select! {
                    recv(stop_rx) -> _ => true,
                    recv(ticker) -> _ => false,
                };
                if stopped {
                    break;
                }
                if !session.is_dirty() {
                    continue;
                }
                match session.save(store.as_ref()) {
                    Ok(paper) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        info!("Autosaved paper {}", paper.id);
                    }
                    Err(e) => warn!("Autosave failed: {}", e),
                }
            }
            debug!("Autosave stopped");
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
            saves,
        }
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Stop the task and wait for it to finish. Returns the number of saves.
    pub fn stop(mut self) -> usize {
        self.shutdown();
        self.saves()
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The receiver is gone only if the thread already exited
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Autosave thread panicked");
            }
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{PaperHeader, Question, QuestionKind};
    use crate::storage::JsonDirStore;
    use std::time::Instant;

    #[test]
    fn test_apply_is_copy_on_write() {
        let session = EditSession::new(Paper::new());
        let before = session.snapshot();

        session
            .apply(|p| p.push_question(Question::new_default(QuestionKind::Text)))
            .unwrap();

        assert_eq!(before.question_count(), 0);
        assert_eq!(session.snapshot().question_count(), 1);
        assert_eq!(session.revision(), 1);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_failed_edit_leaves_session_untouched() {
        let session = EditSession::new(Paper::new());
        let err = session.apply(|p| p.remove_question("missing")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(session.revision(), 0);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_save_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        let session = EditSession::new(Paper::new());
        session
            .apply(|p| Ok(p.with_header(PaperHeader::titled("Saved"))))
            .unwrap();

        let saved = session.save(&store).unwrap();
        assert!(!session.is_dirty());
        assert_eq!(*session.snapshot(), saved);
        assert_eq!(store.get_paper(&saved.id).unwrap().header.title, "Saved");
    }

    #[test]
    fn test_autosave_saves_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonDirStore::open(dir.path()).unwrap());
        let session = EditSession::new(Paper::new());
        let autosave = session.autosave(store.clone(), Duration::from_millis(10));

        session
            .apply(|p| Ok(p.with_header(PaperHeader::titled("Draft"))))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_dirty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let saves = autosave.stop();
        assert!(saves >= 1);
        let id = session.snapshot().id.clone();
        assert_eq!(store.get_paper(&id).unwrap().header.title, "Draft");
    }

    #[test]
    fn test_autosave_drop_joins() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonDirStore::open(dir.path()).unwrap());
        let session = EditSession::new(Paper::new());
        {
            let _autosave = session.autosave(store.clone(), Duration::from_secs(60));
        }
        // Nothing was dirty, so nothing was written
        assert!(store.list_papers().unwrap().is_empty());
    }
}
