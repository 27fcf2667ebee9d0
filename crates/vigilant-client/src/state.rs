//! Application state shared by every front end.
//!
//! All services share one [`PersistenceFacade`], so a sweep sees items the
//! inventory service just wrote.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::facade::PersistenceFacade;
use crate::inventory::InventoryService;
use crate::remote::RemoteStore;
use crate::repository::LocalMirror;
use crate::sweep::SweepEngine;

/// Central application state.
pub struct AppState {
    pub facade: Arc<PersistenceFacade>,
    pub inventory: InventoryService,
    pub auth: AuthService,
    /// One engine per process; it serialises overlapping sweeps.
    pub sweep: SweepEngine,
}

impl AppState {
    pub fn new(local: Arc<dyn LocalMirror>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self::from_facade(Arc::new(PersistenceFacade::new(local, remote)))
    }

    pub fn from_facade(facade: Arc<PersistenceFacade>) -> Self {
        Self {
            inventory: InventoryService::new(facade.clone()),
            auth: AuthService::new(facade.clone()),
            sweep: SweepEngine::new(facade.clone()),
            facade,
        }
    }
}
