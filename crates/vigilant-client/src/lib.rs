//! # vigilant-client
//!
//! The tracker's engine: per-owner repositories over the local mirror, an
//! optional remote store, the persistence facade that hides which one
//! answered, and the expiry sweep that turns due items into simulated SMS
//! alerts and a capped audit log.

pub mod auth;
pub mod directory;
pub mod events;
pub mod facade;
pub mod inventory;
pub mod local;
pub mod message;
pub mod remote;
pub mod repository;
pub mod state;
pub mod sweep;

mod error;

pub use error::{AuthError, ClientError, RemoteError, Result};
pub use events::{AlertEvent, AlertSink};
pub use facade::{DataSource, PersistenceFacade, Sourced};
pub use local::LocalStore;
pub use remote::{HttpRemoteStore, RemoteStore};
pub use state::AppState;
pub use sweep::{SweepEngine, SweepReport};
