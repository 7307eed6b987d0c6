//! Spotify Web API implementation of the catalog capability.
//!
//! Uses the client-credentials OAuth flow. The access token is cached and
//! refreshed transparently shortly before it expires.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::models::{
    ArtistProfile, AudioFeatures, CreditedArtist, ReleaseSummary, ReleaseTrack, TrackDetail,
};
use super::{CatalogError, MusicCatalog, ReleaseCategory};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh the token this long before the advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Maximum page size for a release's track listing.
const RELEASE_TRACKS_LIMIT: usize = 50;

pub struct SpotifyCatalog {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct ArtistResponse {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct PagedReleases {
    #[serde(default)]
    items: Vec<ReleaseItem>,
}

#[derive(Deserialize)]
struct ReleaseItem {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct PagedTracks {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Deserialize)]
struct TrackItem {
    id: String,
}

#[derive(Deserialize)]
struct TrackResponse {
    id: String,
    name: String,
    artists: Vec<TrackArtist>,
    #[serde(default)]
    popularity: u32,
    album: TrackAlbum,
    duration_ms: u64,
}

#[derive(Deserialize)]
struct TrackArtist {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct TrackAlbum {
    release_date: String,
}

#[derive(Deserialize)]
struct AudioFeaturesResponse {
    id: String,
    key: i32,
    mode: i32,
    tempo: f64,
    time_signature: u32,
    danceability: f64,
    energy: f64,
    valence: f64,
    acousticness: f64,
    speechiness: f64,
    liveness: f64,
    instrumentalness: f64,
    loudness: f64,
}

impl SpotifyCatalog {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `client_id` / `client_secret` - application credentials
    /// * `timeout_sec` - per-request timeout in seconds
    pub fn new(
        client_id: String,
        client_secret: String,
        timeout_sec: u64,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, fetching a fresh one when the cached
    /// token is absent or about to expire.
    async fn bearer_token(&self) -> Result<String, CatalogError> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
            debug!("Cached access token expired, refreshing");
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, CatalogError> {
        let response = self
            .client
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Authentication(format!(
                "token endpoint returned status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Authentication(format!("invalid token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    /// GET a catalog endpoint and deserialize the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let token = self.bearer_token().await?;

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if status.as_u16() == 401 {
            // The token was accepted at fetch time but rejected here, so
            // treat it the same as a failed credential exchange.
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Authentication(format!(
                "catalog API rejected access token: {}",
                body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MusicCatalog for SpotifyCatalog {
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError> {
        let url = format!(
            "{}/artists/{}",
            SPOTIFY_API_BASE,
            urlencoding::encode(artist_id)
        );

        match self.get_json::<ArtistResponse>(&url).await {
            Ok(artist) => Ok(ArtistProfile {
                id: artist.id,
                name: artist.name,
            }),
            // 400 = malformed id, 404 = well-formed but unknown. Both mean
            // "no such artist" to the caller.
            Err(CatalogError::Api { status: 400, .. }) | Err(CatalogError::Api { status: 404, .. }) => {
                Err(CatalogError::ArtistNotFound(artist_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_releases(
        &self,
        artist_id: &str,
        category: ReleaseCategory,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReleaseSummary>, CatalogError> {
        let url = format!(
            "{}/artists/{}/albums?include_groups={}&limit={}&offset={}",
            SPOTIFY_API_BASE,
            urlencoding::encode(artist_id),
            category.as_str(),
            limit,
            offset
        );

        let page: PagedReleases = self.get_json(&url).await?;
        Ok(page
            .items
            .into_iter()
            .map(|item| ReleaseSummary {
                id: item.id,
                title: item.name,
            })
            .collect())
    }

    async fn list_release_tracks(
        &self,
        release_id: &str,
    ) -> Result<Vec<ReleaseTrack>, CatalogError> {
        let url = format!(
            "{}/albums/{}/tracks?limit={}",
            SPOTIFY_API_BASE,
            urlencoding::encode(release_id),
            RELEASE_TRACKS_LIMIT
        );

        let page: PagedTracks = self.get_json(&url).await?;
        Ok(page
            .items
            .into_iter()
            .map(|item| ReleaseTrack { id: item.id })
            .collect())
    }

    async fn get_track_detail(&self, track_id: &str) -> Result<TrackDetail, CatalogError> {
        let url = format!(
            "{}/tracks/{}",
            SPOTIFY_API_BASE,
            urlencoding::encode(track_id)
        );

        let track: TrackResponse = self.get_json(&url).await?;
        Ok(TrackDetail {
            id: track.id,
            title: track.name,
            artists: track
                .artists
                .into_iter()
                .map(|a| CreditedArtist {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            popularity: track.popularity,
            release_date: track.album.release_date,
            duration_ms: track.duration_ms,
        })
    }

    async fn get_audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, CatalogError> {
        let url = format!(
            "{}/audio-features/{}",
            SPOTIFY_API_BASE,
            urlencoding::encode(track_id)
        );

        // The endpoint answers 404 for ids it has no analysis for; the
        // joiner decides whether that is fatal.
        let features = match self.get_json::<Option<AudioFeaturesResponse>>(&url).await {
            Ok(features) => features,
            Err(CatalogError::Api { status: 404, .. }) => {
                warn!("No audio features available for track {}", track_id);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(features.map(|f| AudioFeatures {
            id: f.id,
            key: f.key,
            mode: f.mode,
            tempo: f.tempo,
            time_signature: f.time_signature,
            danceability: f.danceability,
            energy: f.energy,
            valence: f.valence,
            acousticness: f.acousticness,
            speechiness: f.speechiness,
            liveness: f.liveness,
            instrumentalness: f.instrumentalness,
            loudness: f.loudness,
        }))
    }
}
