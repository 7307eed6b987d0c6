//! Music catalog provider capability.
//!
//! The trait abstracts the catalog API so the analysis pipeline and the
//! server can run against the real Spotify Web API or an in-memory fake.

mod models;
mod spotify;

pub use models::{
    ArtistProfile, AudioFeatures, CreditedArtist, ReleaseSummary, ReleaseTrack, TrackDetail,
};
pub use spotify::SpotifyCatalog;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by a catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Credential exchange with the catalog API failed. Always raised
    /// explicitly by the client when the token endpoint rejects us.
    #[error("catalog authentication failed: {0}")]
    Authentication(String),

    /// The queried artist identifier does not exist in the catalog.
    #[error("artist not found: {0}")]
    ArtistNotFound(String),

    /// Transport-level failure reaching the catalog API.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog API answered with a non-success status.
    #[error("catalog API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The catalog API answered with a payload we could not interpret.
    #[error("failed to parse catalog response: {0}")]
    Parse(String),
}

/// How a release relates to an artist's discography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseCategory {
    Album,
    Single,
    AppearsOn,
    Compilation,
}

impl ReleaseCategory {
    /// Every category, in the order the collector walks them.
    pub const ALL: [ReleaseCategory; 4] = [
        ReleaseCategory::Album,
        ReleaseCategory::Single,
        ReleaseCategory::AppearsOn,
        ReleaseCategory::Compilation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseCategory::Album => "album",
            ReleaseCategory::Single => "single",
            ReleaseCategory::AppearsOn => "appears_on",
            ReleaseCategory::Compilation => "compilation",
        }
    }
}

impl std::fmt::Display for ReleaseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view of a music catalog.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Look up an artist by id. `Err(ArtistNotFound)` when the id is unknown.
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError>;

    /// One page of an artist's releases in the given category.
    /// An empty page signals the end of pagination.
    async fn list_releases(
        &self,
        artist_id: &str,
        category: ReleaseCategory,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ReleaseSummary>, CatalogError>;

    /// The tracks contained in a release, in release order.
    async fn list_release_tracks(
        &self,
        release_id: &str,
    ) -> Result<Vec<ReleaseTrack>, CatalogError>;

    /// Full detail for a single track (popularity, credited artists,
    /// owning release date). Not present in the paginated views.
    async fn get_track_detail(&self, track_id: &str) -> Result<TrackDetail, CatalogError>;

    /// Audio features for a single track. `Ok(None)` when the catalog has
    /// no feature record for a valid id.
    async fn get_audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, CatalogError>;
}
