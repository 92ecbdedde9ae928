//! Session state store — the sole owner of current identity state.
//!
//! ARCHITECTURE
//! ============
//! One worker task owns the session and derives immutable snapshots; every
//! input (auth event, restore result, settled profile fetch, refresh
//! request) enters through a single ordered message queue, so mutation is
//! serialized and a SIGNED_OUT processed after a SIGNED_IN always wins.
//! Consumers read snapshots through a `watch` channel and never mutate.
//!
//! TRADE-OFFS
//! ==========
//! Profile fetches are tagged with a generation counter instead of being
//! aborted: a superseded fetch is allowed to finish, and its result is
//! discarded at the queue when the tag no longer matches. This keeps
//! cancellation trivial at the cost of an occasional wasted request.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identity::{AuthEvent, IdentityService, Session};
use crate::profile::{FetchErrorKind, ProfileError, ProfileRow, ProfileStore};

const STORE_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Derived, immutable summary of identity state at one instant.
///
/// When `session_present` is false the profile flags always read false;
/// they are never left stale-true from a prior session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub session_present: bool,
    pub user_id: Option<Uuid>,
    pub has_display_name: bool,
    pub onboarding_completed: bool,
    pub profile_fetch_error: Option<FetchErrorKind>,
    /// Session restore or profile fetch outstanding.
    pub loading: bool,
}

impl IdentitySnapshot {
    /// Cold-start snapshot: nothing known, restore in flight.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            session_present: false,
            user_id: None,
            has_display_name: false,
            onboarding_completed: false,
            profile_fetch_error: None,
            loading: true,
        }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { loading: false, ..Self::initial() }
    }

    fn awaiting_profile(session: &Session) -> Self {
        Self {
            session_present: true,
            user_id: Some(session.user_id),
            has_display_name: false,
            onboarding_completed: false,
            profile_fetch_error: None,
            loading: true,
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

enum StoreMsg {
    Auth(AuthEvent),
    /// Result of the spawn-time session restore.
    Restored(Result<Option<Session>, crate::identity::IdentityError>),
    /// A profile fetch settled. Applied only if `epoch` is still current.
    ProfileResolved { epoch: u64, result: Result<Option<ProfileRow>, ProfileError> },
    /// Re-run the profile fetch for the current session.
    Refresh,
}

// =============================================================================
// STORE HANDLE
// =============================================================================

/// Handle to the session store worker. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    tx: mpsc::Sender<StoreMsg>,
    snapshots: watch::Receiver<IdentitySnapshot>,
    worker: Arc<JoinHandle<()>>,
    forwarder: Arc<JoinHandle<()>>,
}

impl SessionStore {
    /// Spawn the store: subscribes to the identity event stream and kicks
    /// off the persisted-session restore.
    #[must_use]
    pub fn spawn(identity: Arc<dyn IdentityService>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (tx, rx) = mpsc::channel(STORE_QUEUE_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(IdentitySnapshot::initial());

        // Bridge the broadcast event stream into the ordered queue.
        let mut events = identity.subscribe();
        let event_tx = tx.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if event_tx.send(StoreMsg::Auth(event)).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth event stream lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // Initial session check, reported back through the queue so it is
        // ordered against any events that raced it.
        let restore_identity = Arc::clone(&identity);
        let restore_tx = tx.clone();
        tokio::spawn(async move {
            let result = restore_identity.current_session().await;
            let _ = restore_tx.send(StoreMsg::Restored(result)).await;
        });

        let worker = StoreWorker {
            profiles,
            snapshot_tx,
            msg_tx: tx.clone(),
            session: None,
            epoch: 0,
        };
        let worker = Arc::new(tokio::spawn(worker.run(rx)));

        Self { tx, snapshots, worker, forwarder: Arc::new(forwarder) }
    }

    /// The current identity snapshot.
    #[must_use]
    pub fn snapshot(&self) -> IdentitySnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.snapshots.clone()
    }

    /// Re-fetch the profile for the current session (after a flag update,
    /// or to retry a failed fetch).
    pub async fn refresh(&self) {
        let _ = self.tx.send(StoreMsg::Refresh).await;
    }

    /// Detach from the event stream and stop the worker. In-flight profile
    /// fetches are not aborted; their results become inert.
    pub fn shutdown(&self) {
        self.forwarder.abort();
        self.worker.abort();
    }
}

// =============================================================================
// WORKER
// =============================================================================

struct StoreWorker {
    profiles: Arc<dyn ProfileStore>,
    snapshot_tx: watch::Sender<IdentitySnapshot>,
    msg_tx: mpsc::Sender<StoreMsg>,
    session: Option<Session>,
    /// Generation counter for profile fetches. Bumped on every session
    /// change, so a settled fetch can prove it is still relevant.
    epoch: u64,
}

impl StoreWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<StoreMsg>) {
        while let Some(msg) = rx.recv().await {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: StoreMsg) {
        match msg {
            StoreMsg::Auth(event) => self.on_auth(event),
            StoreMsg::Restored(result) => self.on_restored(result),
            StoreMsg::ProfileResolved { epoch, result } => self.on_profile_resolved(epoch, result),
            StoreMsg::Refresh => self.on_refresh(),
        }
    }

    fn on_auth(&mut self, event: AuthEvent) {
        info!(event = event.label(), "auth state changed");
        match event.session().cloned() {
            Some(session) => {
                self.session = Some(session);
                self.begin_profile_fetch();
            }
            None => {
                // Collapse synchronously; no fetch race is possible because
                // the epoch bump invalidates anything still in flight.
                self.session = None;
                self.epoch += 1;
                self.publish(IdentitySnapshot::unauthenticated());
            }
        }
    }

    fn on_restored(&mut self, result: Result<Option<Session>, crate::identity::IdentityError>) {
        // A live event that arrived before the restore settled wins.
        if self.epoch > 0 {
            debug!("session restore superseded by a live auth event");
            return;
        }
        match result {
            Ok(Some(session)) => {
                info!(user_id = %session.user_id, "restored persisted session");
                self.session = Some(session);
                self.begin_profile_fetch();
            }
            Ok(None) => self.publish(IdentitySnapshot::unauthenticated()),
            Err(e) => {
                warn!(error = %e, "session restore failed, treating as signed out");
                self.publish(IdentitySnapshot::unauthenticated());
            }
        }
    }

    fn on_refresh(&mut self) {
        if self.session.is_some() {
            self.begin_profile_fetch();
        } else {
            debug!("refresh requested without a session, ignoring");
        }
    }

    /// Bump the epoch, publish the loading snapshot, and launch one tagged
    /// profile fetch whose result re-enters the queue.
    fn begin_profile_fetch(&mut self) {
        let Some(session) = self.session.clone() else { return };
        self.epoch += 1;
        let epoch = self.epoch;
        self.publish(IdentitySnapshot::awaiting_profile(&session));

        let profiles = Arc::clone(&self.profiles);
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let result = profiles.fetch(&session.access_token, session.user_id).await;
            let _ = tx.send(StoreMsg::ProfileResolved { epoch, result }).await;
        });
    }

    fn on_profile_resolved(
        &mut self,
        epoch: u64,
        result: Result<Option<ProfileRow>, ProfileError>,
    ) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding stale profile fetch result");
            return;
        }
        let Some(session) = self.session.clone() else {
            debug!("profile fetch settled after sign-out, discarding");
            return;
        };

        let mut snapshot = IdentitySnapshot::awaiting_profile(&session);
        snapshot.loading = false;
        match result {
            Ok(Some(row)) => {
                snapshot.has_display_name = row.has_display_name();
                snapshot.onboarding_completed = row.onboarding_completed;
            }
            Ok(None) => {
                // Expected for first-time sign-ins; seed the row in the
                // background and let profile completion fill it in.
                info!(user_id = %session.user_id, "no profile row yet, seeding initial record");
                let profiles = Arc::clone(&self.profiles);
                tokio::spawn(async move {
                    if let Err(e) = profiles
                        .create_initial(&session.access_token, session.user_id, session.email.as_deref())
                        .await
                    {
                        warn!(error = %e, "initial profile seed failed");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed");
                snapshot.profile_fetch_error = Some(e.kind());
            }
        }
        self.publish(snapshot);
    }

    fn publish(&self, snapshot: IdentitySnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
