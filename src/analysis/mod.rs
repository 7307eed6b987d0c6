//! The artist analysis pipeline.
//!
//! `AnalysisService::assemble` is the entry point: collect every track of
//! an artist, join per-track audio features, normalize the raw fields into
//! display strings and shape the result into the fixed-column table.

mod collector;
pub mod columns;
mod joiner;
pub mod normalize;
mod table;

pub use collector::TrackRecord;
pub use joiner::JoinedTrack;
pub use table::AnalysisTable;

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::catalog::{CatalogError, MusicCatalog};

/// Failures of the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A provider call failed; propagated unchanged.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog issued a track id but has no audio-feature record for
    /// it. A provider contract violation, fatal to the whole request.
    #[error("no audio features recorded for track {track_id}")]
    MissingAudioFeatures { track_id: String },
}

/// Tuning knobs for the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Page size used when walking an artist's releases.
    pub release_page_size: usize,
    /// Maximum in-flight detail/audio-feature requests.
    pub fetch_concurrency: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            release_page_size: 50,
            fetch_concurrency: 8,
        }
    }
}

pub struct AnalysisService {
    catalog: Arc<dyn MusicCatalog>,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(catalog: Arc<dyn MusicCatalog>, settings: AnalysisSettings) -> Self {
        Self { catalog, settings }
    }

    /// Build the full analysis table for an artist.
    ///
    /// The column set and order are fixed; a catalog with no releases for
    /// the artist yields an empty table with the same columns. Rows are
    /// sorted by release date, newest first, then deduplicated by
    /// (artist, title) keeping the first occurrence, so the same song on a
    /// single and a later compilation appears once.
    pub async fn assemble(&self, artist_id: &str) -> Result<AnalysisTable, AnalysisError> {
        let tracks = collector::collect_artist_tracks(
            self.catalog.as_ref(),
            artist_id,
            self.settings.release_page_size,
            self.settings.fetch_concurrency,
        )
        .await?;

        let joined = joiner::join_audio_features(
            self.catalog.as_ref(),
            tracks,
            self.settings.fetch_concurrency,
        )
        .await?;

        let mut dated: Vec<(Option<NaiveDate>, HashMap<String, String>)> = joined
            .iter()
            .map(|j| {
                (
                    normalize::parse_release_date(&j.track.release_date),
                    display_row(j),
                )
            })
            .collect();

        // Newest first; rows without a parseable date sink to the end.
        // The sort is stable, so equal dates keep encounter order and the
        // dedup below keeps the first-encountered duplicate.
        dated.sort_by(|a, b| b.0.cmp(&a.0));

        let artist_column = columns::display_name("artist").unwrap_or_default();
        let title_column = columns::display_name("name").unwrap_or_default();

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut rows = Vec::new();
        for (_, row) in dated {
            let key = (
                row.get(artist_column).cloned().unwrap_or_default(),
                row.get(title_column).cloned().unwrap_or_default(),
            );
            if seen.insert(key) {
                rows.push(row);
            }
        }

        info!(
            "Assembled analysis table for artist {}: {} rows",
            artist_id,
            rows.len()
        );

        let mut out = AnalysisTable::empty();
        out.rows = rows;
        Ok(out)
    }
}

/// Normalize one joined record and shape it into a display row: transform
/// every raw field, drop the configured fields, rename the rest.
fn display_row(joined: &JoinedTrack) -> HashMap<String, String> {
    let track = &joined.track;
    let features = &joined.features;

    let raw: [(&str, String); 18] = [
        ("id", track.id.clone()),
        ("name", track.title.clone()),
        ("artist", track.artist.clone()),
        ("album_name", track.release_title.clone()),
        ("popularity", normalize::popularity_percent(track.popularity)),
        (
            "release_date",
            normalize::release_date_jp(&track.release_date),
        ),
        ("duration_ms", normalize::duration_clock(track.duration_ms)),
        ("key", normalize::key_signature(features.key, features.mode)),
        ("tempo", normalize::tempo_bpm(features.tempo)),
        (
            "time_signature",
            normalize::time_signature_beats(features.time_signature),
        ),
        (
            "danceability",
            normalize::fraction_percent(features.danceability),
        ),
        ("energy", normalize::fraction_percent(features.energy)),
        ("valence", normalize::fraction_percent(features.valence)),
        (
            "acousticness",
            normalize::fraction_percent(features.acousticness),
        ),
        (
            "speechiness",
            normalize::fraction_percent(features.speechiness),
        ),
        ("liveness", features.liveness.to_string()),
        ("instrumentalness", features.instrumentalness.to_string()),
        ("loudness", normalize::loudness_db(features.loudness)),
    ];

    let mut row = HashMap::new();
    for (field, value) in raw {
        if columns::COLUMN_DROPS.contains(&field) {
            continue;
        }
        if let Some(display) = columns::display_name(field) {
            row.insert(display.to_string(), value);
        }
    }
    row
}
