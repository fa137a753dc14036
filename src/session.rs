//! Session bookkeeping: the single active download and its cancellation signal.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// The only cross-call shared mutable state of the downloader: whether a
/// session is active, and the cancellation token of the active session.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    active: AtomicBool,
    token: Mutex<Option<CancellationToken>>,
}

impl SessionState {
    /// Begins a new session with a fresh cancellation token.
    ///
    /// Fails with [`Error::AlreadyDownloading`] if a session is active;
    /// sessions are mutually exclusive per state instance.
    pub(crate) fn begin(&self) -> Result<DownloadSession<'_>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyDownloading);
        }

        let token = CancellationToken::new();
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.clone());
        }

        Ok(DownloadSession {
            state: self,
            token,
            cleanup_files: Vec::new(),
        })
    }

    /// Whether a session is currently active.
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Triggers the active session's cancellation token, if any.
    ///
    /// Safe to call at any time; a no-op when no session is running.
    pub(crate) fn cancel_if_running(&self) {
        if !self.is_active() {
            return;
        }

        if let Ok(slot) = self.token.lock() {
            if let Some(token) = slot.as_ref() {
                token.cancel();
            }
        }
    }
}

/// The mutable state owned by the orchestrator for the duration of one
/// download: the cancellation token and the accumulating list of paths to
/// hand to the cleanup callback on failure.
///
/// Dropping the session clears the active flag and discards the token, so the
/// downloader returns to idle on every exit path.
pub(crate) struct DownloadSession<'a> {
    state: &'a SessionState,
    token: CancellationToken,
    cleanup_files: Vec<PathBuf>,
}

impl DownloadSession<'_> {
    /// The cancellation token consumed by every sub-task of this session.
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Registers a path to delete if the session fails.
    pub(crate) fn register_cleanup(&mut self, path: PathBuf) {
        self.cleanup_files.push(path);
    }

    /// The paths registered so far, in registration order.
    pub(crate) fn cleanup_files(&self) -> &[PathBuf] {
        &self.cleanup_files
    }
}

impl Drop for DownloadSession<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.state.token.lock() {
            slot.take();
        }

        self.state.active.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_sets_and_drop_clears_the_active_flag() {
        let state = SessionState::default();
        assert!(!state.is_active());

        let session = state.begin().unwrap();
        assert!(state.is_active());

        drop(session);
        assert!(!state.is_active());
    }

    #[test]
    fn second_session_is_rejected_while_one_is_active() {
        let state = SessionState::default();
        let _session = state.begin().unwrap();

        assert!(matches!(state.begin(), Err(Error::AlreadyDownloading)));
    }

    #[test]
    fn session_accepted_again_after_drop() {
        let state = SessionState::default();
        drop(state.begin().unwrap());

        assert!(state.begin().is_ok());
    }

    #[test]
    fn cancel_reaches_the_active_token() {
        let state = SessionState::default();
        let session = state.begin().unwrap();
        let token = session.token().clone();

        state.cancel_if_running();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_when_idle_is_a_noop() {
        let state = SessionState::default();
        state.cancel_if_running();
        assert!(!state.is_active());
    }

    #[test]
    fn cancelling_a_finished_session_does_not_affect_the_next_one() {
        let state = SessionState::default();
        drop(state.begin().unwrap());
        state.cancel_if_running();

        let session = state.begin().unwrap();
        assert!(!session.token().is_cancelled());
    }

    #[test]
    fn cleanup_paths_keep_registration_order() {
        let state = SessionState::default();
        let mut session = state.begin().unwrap();

        session.register_cleanup(PathBuf::from("a.mp4"));
        session.register_cleanup(PathBuf::from("b.mp3"));

        assert_eq!(
            session.cleanup_files(),
            &[PathBuf::from("a.mp4"), PathBuf::from("b.mp3")]
        );
    }
}
