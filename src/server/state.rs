use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::AnalysisService;
use crate::catalog::MusicCatalog;
use crate::delivery::DeliveryMode;
use crate::push::PushSender;
use crate::storage::FileStore;

use super::ServerConfig;

pub type GuardedCatalog = Arc<dyn MusicCatalog>;
pub type GuardedAnalysis = Arc<AnalysisService>;
pub type GuardedPushSender = Arc<dyn PushSender>;
pub type GuardedFileStore = Arc<dyn FileStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalog,
    pub analysis: GuardedAnalysis,
    pub push: GuardedPushSender,
    pub file_store: GuardedFileStore,
    pub delivery_mode: DeliveryMode,
}

impl FromRef<ServerState> for GuardedCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedAnalysis {
    fn from_ref(input: &ServerState) -> Self {
        input.analysis.clone()
    }
}

impl FromRef<ServerState> for GuardedPushSender {
    fn from_ref(input: &ServerState) -> Self {
        input.push.clone()
    }
}

impl FromRef<ServerState> for GuardedFileStore {
    fn from_ref(input: &ServerState) -> Self {
        input.file_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
