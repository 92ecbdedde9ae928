//! Session/identity reconciliation core for the ReturnTrackr client.
//!
//! ARCHITECTURE
//! ============
//! Incoming URL → [`deep_link::parse`] → [`dispatch::AuthLinkDispatcher`] →
//! remote call → [`store::SessionStore`] update → [`reconcile::reconcile`] →
//! navigation request on the host channel. Independently, the identity
//! service pushes session-change events straight into the store, which also
//! triggers reconciliation. The store is the sole writer of identity state;
//! everything else reads immutable snapshots.

pub mod config;
pub mod deep_link;
pub mod dispatch;
pub mod identity;
pub mod navigator;
pub mod profile;
pub mod reconcile;
pub mod redirect;
pub mod route;
pub mod store;

pub use config::RemoteConfig;
pub use deep_link::{LinkIntent, LinkKind, parse};
pub use dispatch::AuthLinkDispatcher;
pub use identity::{AuthEvent, IdentityError, IdentityService, RestIdentityClient, Session};
pub use navigator::Navigator;
pub use profile::{ProfileRow, ProfileStore, RestProfileStore};
pub use reconcile::{SessionPhase, reconcile, spawn_reconcile_task};
pub use redirect::RedirectUrls;
pub use route::{Route, Screen, ScreenGroup, SignInParams};
pub use store::{IdentitySnapshot, SessionStore};
