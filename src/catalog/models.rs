//! Domain models returned by a catalog backend.

/// An artist as listed in the catalog.
#[derive(Debug, Clone)]
pub struct ArtistProfile {
    pub id: String,
    pub name: String,
}

/// One release from an artist's paginated discography view.
#[derive(Debug, Clone)]
pub struct ReleaseSummary {
    pub id: String,
    pub title: String,
}

/// One track from a release's track listing. Only the id is needed;
/// everything else comes from the per-track detail lookup.
#[derive(Debug, Clone)]
pub struct ReleaseTrack {
    pub id: String,
}

/// An artist credited on a track.
#[derive(Debug, Clone)]
pub struct CreditedArtist {
    pub id: String,
    pub name: String,
}

/// Full detail for a single track.
#[derive(Debug, Clone)]
pub struct TrackDetail {
    pub id: String,
    pub title: String,
    pub artists: Vec<CreditedArtist>,
    /// Popularity score in 0..=100.
    pub popularity: u32,
    /// Release date of the owning release. Calendar precision varies:
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub release_date: String,
    pub duration_ms: u64,
}

/// Per-track acoustic descriptors computed by the catalog provider.
#[derive(Debug, Clone)]
pub struct AudioFeatures {
    pub id: String,
    /// Pitch class 0..=11 (C, C#, ..., B). -1 when no key was detected.
    pub key: i32,
    /// 0 = minor, 1 = major.
    pub mode: i32,
    /// Beats per minute.
    pub tempo: f64,
    /// Beats per bar.
    pub time_signature: u32,
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub speechiness: f64,
    pub liveness: f64,
    pub instrumentalness: f64,
    /// Overall loudness in decibels, typically negative.
    pub loudness: f64,
}
