//! Shared test doubles: a scripted in-memory catalog, a recording push
//! sender, an in-memory file store and a server harness.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use artist_analysis_bot::analysis::{AnalysisService, AnalysisSettings};
use artist_analysis_bot::catalog::{
    ArtistProfile, AudioFeatures, CatalogError, CreditedArtist, MusicCatalog, ReleaseCategory,
    ReleaseSummary, ReleaseTrack, TrackDetail,
};
use artist_analysis_bot::delivery::DeliveryMode;
use artist_analysis_bot::push::PushSender;
use artist_analysis_bot::server::state::ServerState;
use artist_analysis_bot::server::{make_app, RequestsLoggingLevel, ServerConfig};
use artist_analysis_bot::storage::FileStore;

/// In-memory catalog scripted per test. Pagination over the stored
/// release lists behaves like the real API: slices of `limit` items from
/// `offset`, empty once the list is exhausted.
#[derive(Default)]
pub struct FakeCatalog {
    pub artists: HashMap<String, ArtistProfile>,
    pub releases: HashMap<(String, ReleaseCategory), Vec<ReleaseSummary>>,
    pub release_tracks: HashMap<String, Vec<ReleaseTrack>>,
    pub track_details: HashMap<String, TrackDetail>,
    pub audio_features: HashMap<String, AudioFeatures>,
    /// When set, every call fails the way a bad credential would.
    pub fail_auth: bool,
    /// Every (category, offset) pair requested from `list_releases`.
    pub release_page_requests: Mutex<Vec<(ReleaseCategory, usize)>>,
}

impl FakeCatalog {
    pub fn with_artist(mut self, id: &str, name: &str) -> Self {
        self.artists.insert(
            id.to_string(),
            ArtistProfile {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn add_release(&mut self, artist_id: &str, category: ReleaseCategory, id: &str, title: &str) {
        self.releases
            .entry((artist_id.to_string(), category))
            .or_default()
            .push(ReleaseSummary {
                id: id.to_string(),
                title: title.to_string(),
            });
    }

    /// Register a track on a release, with detail and (optionally) audio
    /// features.
    pub fn add_track(&mut self, release_id: &str, detail: TrackDetail, features: Option<AudioFeatures>) {
        self.release_tracks
            .entry(release_id.to_string())
            .or_default()
            .push(ReleaseTrack {
                id: detail.id.clone(),
            });
        if let Some(features) = features {
            self.audio_features.insert(detail.id.clone(), features);
        }
        self.track_details.insert(detail.id.clone(), detail);
    }

    fn auth_check(&self) -> Result<(), CatalogError> {
        if self.fail_auth {
            Err(CatalogError::Authentication(
                "invalid client credentials".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MusicCatalog for FakeCatalog {
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError> {
        self.auth_check()?;
        self.artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| CatalogError::ArtistNotFound(artist_id.to_string()))
    }

    async fn list_releases(
        &self,
        artist_id: &str,
        category: ReleaseCategory,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReleaseSummary>, CatalogError> {
        self.auth_check()?;
        self.release_page_requests
            .lock()
            .unwrap()
            .push((category, offset));

        let all = self
            .releases
            .get(&(artist_id.to_string(), category))
            .cloned()
            .unwrap_or_default();
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_release_tracks(
        &self,
        release_id: &str,
    ) -> Result<Vec<ReleaseTrack>, CatalogError> {
        self.auth_check()?;
        Ok(self
            .release_tracks
            .get(release_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_track_detail(&self, track_id: &str) -> Result<TrackDetail, CatalogError> {
        self.auth_check()?;
        self.track_details
            .get(track_id)
            .cloned()
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                body: format!("no such track: {}", track_id),
            })
    }

    async fn get_audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, CatalogError> {
        self.auth_check()?;
        Ok(self.audio_features.get(track_id).cloned())
    }
}

/// Push sender that records every message instead of delivering it.
#[derive(Default)]
pub struct RecordingPushSender {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingPushSender {
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send_text(&self, user_id: &str, text: &str) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((user_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// File store keeping blobs in memory and handing out fake public URLs.
#[derive(Default)]
pub struct MemoryFileStore {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn file(&self, name: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, name: &str, content: Vec<u8>) -> anyhow::Result<String> {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), content);
        Ok(format!("https://files.test/{}", name))
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// Track detail fixture; `artists` is a list of (id, name) credits.
pub fn track_detail(
    id: &str,
    title: &str,
    artists: &[(&str, &str)],
    release_date: &str,
) -> TrackDetail {
    TrackDetail {
        id: id.to_string(),
        title: title.to_string(),
        artists: artists
            .iter()
            .map(|(id, name)| CreditedArtist {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
        popularity: 50,
        release_date: release_date.to_string(),
        duration_ms: 210_000,
    }
}

/// Audio feature fixture with unremarkable values.
pub fn audio_features(id: &str) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        key: 0,
        mode: 1,
        tempo: 120.0,
        time_signature: 4,
        danceability: 0.5,
        energy: 0.5,
        valence: 0.5,
        acousticness: 0.5,
        speechiness: 0.05,
        liveness: 0.1,
        instrumentalness: 0.0,
        loudness: -7.2,
    }
}

pub fn analysis_service(catalog: Arc<FakeCatalog>) -> AnalysisService {
    AnalysisService::new(catalog, AnalysisSettings::default())
}

// =========================================================================
// Server harness
// =========================================================================

pub struct TestServer {
    pub base_url: String,
    pub push: Arc<RecordingPushSender>,
    pub files: Arc<MemoryFileStore>,
}

impl TestServer {
    /// Bind an ephemeral port and serve the app against the given catalog.
    pub async fn spawn(catalog: Arc<FakeCatalog>) -> Self {
        Self::spawn_with_mode(catalog, DeliveryMode::Link).await
    }

    pub async fn spawn_with_mode(catalog: Arc<FakeCatalog>, delivery_mode: DeliveryMode) -> Self {
        let push = Arc::new(RecordingPushSender::default());
        let files = Arc::new(MemoryFileStore::default());

        let catalog: Arc<dyn MusicCatalog> = catalog;
        let analysis = Arc::new(AnalysisService::new(
            catalog.clone(),
            AnalysisSettings::default(),
        ));

        let state = ServerState {
            config: ServerConfig {
                requests_logging_level: RequestsLoggingLevel::None,
                port: 0,
            },
            start_time: Instant::now(),
            catalog,
            analysis,
            push: push.clone(),
            file_store: files.clone(),
            delivery_mode,
        };

        let app = make_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            push,
            files,
        }
    }

    /// Wait until the recorded push messages reach `count`, or panic after
    /// a few seconds.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let texts = self.push.texts();
            if texts.len() >= count {
                return texts;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        panic!(
            "timed out waiting for {} push messages, got {:?}",
            count,
            self.push.texts()
        );
    }
}
