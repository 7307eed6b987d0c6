//! Track collection: walk an artist's full discography and keep the
//! tracks the artist is actually credited on.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::catalog::{MusicCatalog, ReleaseCategory, TrackDetail};

use super::AnalysisError;

/// One track the queried artist participates in. The credited-artist
/// filter has already been applied by the time a record exists.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub id: String,
    /// All credited artist names, comma-joined.
    pub artist: String,
    pub title: String,
    pub release_title: String,
    pub popularity: u32,
    /// Raw release date of the owning release, precision as provided.
    pub release_date: String,
    pub duration_ms: u64,
}

impl TrackRecord {
    fn from_detail(detail: TrackDetail, release_title: &str) -> Self {
        let artist = detail
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            id: detail.id,
            artist,
            title: detail.title,
            release_title: release_title.to_string(),
            popularity: detail.popularity,
            release_date: detail.release_date,
            duration_ms: detail.duration_ms,
        }
    }
}

/// Collect every track of the artist across all release categories.
///
/// Releases are paged with `page_size` until the catalog returns an empty
/// page; a short page does not end the walk, only an empty one does.
/// Per-track detail lookups fan out with at most `concurrency` requests in
/// flight; the first failure aborts the whole collection.
pub async fn collect_artist_tracks(
    catalog: &dyn MusicCatalog,
    artist_id: &str,
    page_size: usize,
    concurrency: usize,
) -> Result<Vec<TrackRecord>, AnalysisError> {
    let mut records = Vec::new();

    for category in ReleaseCategory::ALL {
        let mut offset = 0;

        loop {
            let releases = catalog
                .list_releases(artist_id, category, page_size, offset)
                .await?;
            if releases.is_empty() {
                break;
            }

            debug!(
                "Fetched {} {} releases at offset {}",
                releases.len(),
                category,
                offset
            );

            for release in &releases {
                let tracks = catalog.list_release_tracks(&release.id).await?;

                let details: Vec<TrackDetail> = stream::iter(tracks.into_iter().map(|t| t.id))
                    .map(|track_id| async move { catalog.get_track_detail(&track_id).await })
                    .buffered(concurrency.max(1))
                    .try_collect()
                    .await?;

                // Releases surfaced through appears_on list tracks the
                // artist is not credited on; those are filtered here.
                for detail in details {
                    if detail.artists.iter().any(|a| a.id == artist_id) {
                        records.push(TrackRecord::from_detail(detail, &release.title));
                    }
                }
            }

            offset += page_size;
        }
    }

    debug!(
        "Collected {} tracks for artist {} across all categories",
        records.len(),
        artist_id
    );

    Ok(records)
}
