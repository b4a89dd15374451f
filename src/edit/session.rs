use log::{debug, warn};

use crate::model::item::ActionItem;
use crate::model::map::ActionMap;
use crate::store::{ItemPatch, MapPatch, Store, StoreError};

/// A versioned entity editable through an [`EditSession`].
///
/// Both editable entity types route through the same store trio (fetch-one /
/// version-checked write); this trait is the seam that lets one state machine
/// serve both.
pub trait Editable: Clone {
    type Patch: Clone;

    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn fetch(store: &dyn Store, id: &str) -> Result<Self, StoreError>;
    fn write(
        store: &mut dyn Store,
        id: &str,
        patch: &Self::Patch,
        expected_version: u64,
        force: bool,
    ) -> Result<Self, StoreError>;
}

impl Editable for ActionItem {
    type Patch = ItemPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn fetch(store: &dyn Store, id: &str) -> Result<Self, StoreError> {
        store.fetch_item(id)
    }

    fn write(
        store: &mut dyn Store,
        id: &str,
        patch: &Self::Patch,
        expected_version: u64,
        force: bool,
    ) -> Result<Self, StoreError> {
        store.write_item(id, patch, expected_version, force)
    }
}

impl Editable for ActionMap {
    type Patch = MapPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn fetch(store: &dyn Store, id: &str) -> Result<Self, StoreError> {
        store.fetch_map(id)
    }

    fn write(
        store: &mut dyn Store,
        id: &str,
        patch: &Self::Patch,
        expected_version: u64,
        force: bool,
    ) -> Result<Self, StoreError> {
        store.write_map(id, patch, expected_version, force)
    }
}

/// The user's choice when a conflict is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Discard the local edit and refetch the entity
    Reload,
    /// Resubmit the pending edit with the version check bypassed once
    ForceOverwrite,
    /// Abandon the dialog; the edit stays pending and unsaved
    Cancel,
}

/// Session state as an explicit tagged union, so an illegal transition (say, a
/// second submit while a conflict is pending) is a typed error instead of a
/// silent misbehavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pending conflict; edits may be submitted
    Idle,
    /// A write is in flight; no other command is accepted for this entity
    Submitting,
    /// The store rejected the last write on version mismatch
    ConflictDetected {
        /// Version the client submitted
        stale_version: u64,
        /// Version the store currently holds
        current_version: u64,
    },
    /// A resolution choice is being carried out
    Resolving(Resolution),
}

/// Result of a submit: the write either committed or hit a version conflict.
/// Store failures of any other class are reported as errors and cause no
/// state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Committed,
    Conflict { current_version: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Operation not allowed in the current state
    #[error("invalid in state {state}: {operation}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Optimistic-concurrency edit session for one entity.
///
/// Holds the last authoritative snapshot and submits edits stamped with its
/// version. On conflict the session halts until the user picks one of the
/// three resolutions ([`reload`](Self::reload),
/// [`force_overwrite`](Self::force_overwrite), [`cancel`](Self::cancel)).
/// Writes within a session are strictly sequential; the store's version check
/// is the only cross-session ordering mechanism.
#[derive(Debug)]
pub struct EditSession<E: Editable> {
    entity: E,
    pending: Option<E::Patch>,
    state: SessionState,
}

impl<E: Editable> EditSession<E> {
    /// Start a session from an already-fetched snapshot
    pub fn new(entity: E) -> Self {
        EditSession {
            entity,
            pending: None,
            state: SessionState::Idle,
        }
    }

    /// Fetch the entity and start a session on it
    pub fn open(store: &dyn Store, id: &str) -> Result<Self, StoreError> {
        Ok(EditSession::new(E::fetch(store, id)?))
    }

    /// Last known authoritative snapshot
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// The local edit awaiting commit or resolution, if any
    pub fn pending(&self) -> Option<&E::Patch> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Submit an edit stamped with the snapshot's version.
    ///
    /// Commit refreshes the snapshot from the store's response. A version
    /// conflict parks the patch and enters
    /// [`SessionState::ConflictDetected`]; any other store failure leaves the
    /// session idle with the patch retained for retry.
    pub fn submit(
        &mut self,
        store: &mut dyn Store,
        patch: E::Patch,
    ) -> Result<SubmitOutcome, SessionError> {
        self.require_idle("submit")?;
        let id = self.entity.id().to_string();
        let stale_version = self.entity.version();
        self.state = SessionState::Submitting;

        match E::write(store, &id, &patch, stale_version, false) {
            Ok(updated) => {
                debug!(
                    "commit on {}: version {} -> {}",
                    updated.id(),
                    stale_version,
                    updated.version()
                );
                self.entity = updated;
                self.pending = None;
                self.state = SessionState::Idle;
                Ok(SubmitOutcome::Committed)
            }
            Err(StoreError::Conflict { current_version }) => {
                warn!(
                    "conflict on {}: submitted {}, store holds {}",
                    self.entity.id(),
                    stale_version,
                    current_version
                );
                self.pending = Some(patch);
                self.state = SessionState::ConflictDetected {
                    stale_version,
                    current_version,
                };
                Ok(SubmitOutcome::Conflict { current_version })
            }
            Err(err) => {
                // Non-version failure: keep the edit, no destructive transition
                self.pending = Some(patch);
                self.state = SessionState::Idle;
                Err(err.into())
            }
        }
    }

    /// Resolve a conflict by discarding the local edit and refetching.
    /// Performs no write.
    pub fn reload(&mut self, store: &dyn Store) -> Result<(), SessionError> {
        let detected = self.require_conflict("reload")?;
        let id = self.entity.id().to_string();
        self.state = SessionState::Resolving(Resolution::Reload);

        match E::fetch(store, &id) {
            Ok(fresh) => {
                debug!(
                    "reload on {}: now at version {}",
                    fresh.id(),
                    fresh.version()
                );
                self.entity = fresh;
                self.pending = None;
                self.state = SessionState::Idle;
                Ok(())
            }
            Err(err) => {
                // Entity gone or store unreachable; the conflict stands
                self.state = detected;
                Err(err.into())
            }
        }
    }

    /// Resolve a conflict by resubmitting the pending edit with the version
    /// check bypassed for this single write. Concurrent changes by others are
    /// knowingly lost; the store still increments the version.
    pub fn force_overwrite(&mut self, store: &mut dyn Store) -> Result<(), SessionError> {
        let detected = self.require_conflict("force_overwrite")?;
        let Some(patch) = self.pending.clone() else {
            return Err(SessionError::InvalidState {
                operation: "force_overwrite",
                state: "conflict without a pending edit",
            });
        };
        let id = self.entity.id().to_string();
        self.state = SessionState::Resolving(Resolution::ForceOverwrite);

        match E::write(store, &id, &patch, 0, true) {
            Ok(updated) => {
                warn!(
                    "force overwrite on {}: now at version {}",
                    updated.id(),
                    updated.version()
                );
                self.entity = updated;
                self.pending = None;
                self.state = SessionState::Idle;
                Ok(())
            }
            Err(err) => {
                self.state = detected;
                Err(err.into())
            }
        }
    }

    /// Abandon the resolution dialog. The pending edit stays unsaved and the
    /// snapshot stays at its stale version; nothing is written.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.require_conflict("cancel")?;
        debug!("conflict on {} cancelled; edit kept pending", self.entity.id());
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Take the pending edit out of the session (e.g. to resubmit after a
    /// cancel or a transient failure)
    pub fn take_pending(&mut self) -> Option<E::Patch> {
        self.pending.take()
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            _ => Err(SessionError::InvalidState {
                operation,
                state: self.state_name(),
            }),
        }
    }

    fn require_conflict(&self, operation: &'static str) -> Result<SessionState, SessionError> {
        match self.state {
            detected @ SessionState::ConflictDetected { .. } => Ok(detected),
            _ => Err(SessionError::InvalidState {
                operation,
                state: self.state_name(),
            }),
        }
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::ConflictDetected { .. } => "conflict_detected",
            SessionState::Resolving(_) => "resolving",
        }
    }
}
