//! Session context discovered at startup.
//!
//! Lifecycle: uninitialized, then initialized (account, user, project set
//! exactly once), then optionally metadata-attached. Tools that need the
//! project or user call [`SessionContext::session`], which fails with
//! `IllegalState` until initialization has happened.

use std::sync::{OnceLock, PoisonError, RwLock};

use super::entities::{Account, Metadata};
use super::error::{CodecksError, CodecksResult};

/// Identity fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub account: Account,
    pub user_id: String,
    pub project_id: String,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    session: OnceLock<Session>,
    metadata: RwLock<Option<Metadata>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set account, user and project. A second call is an illegal state.
    pub fn initialize(
        &self,
        account: Account,
        user_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> CodecksResult<()> {
        let session = Session {
            account,
            user_id: user_id.into(),
            project_id: project_id.into(),
        };
        self.session
            .set(session)
            .map_err(|_| CodecksError::illegal_state("session context is already initialized"))
    }

    /// Attach card metadata; the last write wins.
    pub fn attach_metadata(&self, metadata: Metadata) {
        let mut slot = self.metadata.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(metadata);
    }

    pub fn is_ready(&self) -> bool {
        self.session.get().is_some()
    }

    /// The initialized session, or `IllegalState` before startup completes.
    pub fn session(&self) -> CodecksResult<&Session> {
        self.session.get().ok_or_else(|| {
            CodecksError::illegal_state("session context not initialized; startup has not completed")
        })
    }

    pub fn account(&self) -> Option<&Account> {
        self.session.get().map(|s| &s.account)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.get().map(|s| s.user_id.as_str())
    }

    pub fn project_id(&self) -> Option<&str> {
        self.session.get().map(|s| s.project_id.as_str())
    }

    /// Snapshot of the current metadata.
    pub fn metadata(&self) -> Option<Metadata> {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
