//! Join collected tracks with their audio-feature records.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::catalog::{AudioFeatures, MusicCatalog};

use super::collector::TrackRecord;
use super::AnalysisError;

/// A track record merged with its audio features; precursor of one
/// display row.
#[derive(Debug, Clone)]
pub struct JoinedTrack {
    pub track: TrackRecord,
    pub features: AudioFeatures,
}

/// Fetch audio features for every track and merge by track id.
///
/// Every input record appears exactly once in the output. A track the
/// catalog has no feature record for is a contract violation and fails
/// the whole join rather than being dropped.
pub async fn join_audio_features(
    catalog: &dyn MusicCatalog,
    tracks: Vec<TrackRecord>,
    concurrency: usize,
) -> Result<Vec<JoinedTrack>, AnalysisError> {
    stream::iter(tracks)
        .map(|track| async move {
            match catalog.get_audio_features(&track.id).await? {
                Some(features) => Ok(JoinedTrack { track, features }),
                None => Err(AnalysisError::MissingAudioFeatures { track_id: track.id }),
            }
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
