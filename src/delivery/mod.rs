//! User-facing delivery flow.
//!
//! Owns every piece of user-visible text: connectivity and progress
//! notices, the result rendering (download link or inline table), and one
//! distinct message per failure kind. The analysis core itself never
//! talks to the user.

use tracing::{error, warn};

use crate::analysis::{AnalysisError, AnalysisService, AnalysisTable};
use crate::catalog::{CatalogError, MusicCatalog};
use crate::push::PushSender;
use crate::storage::FileStore;

/// How a finished analysis reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeliveryMode {
    /// Upload the table as a CSV file and push a download link.
    Link,
    /// Push the whole table as a text message, row by row.
    Text,
}

impl Default for DeliveryMode {
    fn default() -> Self {
        Self::Link
    }
}

pub const MSG_CATALOG_CONNECTED: &str = "Spotifyとの疎通に成功しました。";
pub const MSG_CATALOG_UNREACHABLE: &str = "Spotifyとの疎通に失敗しました。";
pub const MSG_ARTIST_NOT_FOUND: &str = "該当のアーティストIDの楽曲はSpotifyには存在しません。";
pub const MSG_FEATURES_UNAVAILABLE: &str =
    "楽曲の特徴データの取得に失敗しました。時間をおいて再度お試しください。";
pub const MSG_CATALOG_FAILED: &str = "Spotifyからのデータ取得中にエラーが発生しました。";
pub const MSG_UNEXPECTED_PREFIX: &str = "不明なエラーが発生しました。";

pub fn progress_notice(artist_name: &str) -> String {
    format!(
        "{}の楽曲情報を取得しています... しばらくお待ちください.",
        artist_name
    )
}

pub fn download_notice(url: &str) -> String {
    format!(
        "分析データはこちらのリンクからダウンロードできます: {}",
        url
    )
}

/// Name of the uploaded rendering for an artist's analysis.
pub fn analysis_file_name(artist_id: &str) -> String {
    format!("{}_analysis.csv", artist_id)
}

/// Render the table as one text message: a heading, then every row as
/// `label: value` lines in column order, separated by a divider.
pub fn text_summary(table: &AnalysisTable) -> String {
    let mut out = String::from("アーティスト分析データ:\n");
    for row in &table.rows {
        for column in &table.columns {
            if let Some(value) = row.get(column) {
                out.push_str(column);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out.push_str("----------\n");
    }
    out
}

/// Run one analysis request end to end and keep the user informed.
///
/// The flow mirrors what the user sees: a connectivity notice, a progress
/// notice with the artist's display name, then the result in the
/// configured delivery mode or a failure notice. Push failures on
/// individual notices are logged and never abort the flow.
pub async fn run_analysis_request(
    catalog: &dyn MusicCatalog,
    analysis: &AnalysisService,
    push: &dyn PushSender,
    store: &dyn FileStore,
    mode: DeliveryMode,
    user_id: &str,
    artist_id: &str,
) {
    let artist = match catalog.get_artist(artist_id).await {
        Ok(artist) => {
            notify(push, user_id, MSG_CATALOG_CONNECTED).await;
            artist
        }
        Err(CatalogError::Authentication(reason)) => {
            error!("Catalog authentication failed: {}", reason);
            notify(push, user_id, MSG_CATALOG_UNREACHABLE).await;
            return;
        }
        Err(CatalogError::ArtistNotFound(_)) => {
            // Credentials worked, the id just does not exist.
            notify(push, user_id, MSG_CATALOG_CONNECTED).await;
            notify(push, user_id, MSG_ARTIST_NOT_FOUND).await;
            return;
        }
        Err(e) => {
            error!("Artist lookup for {} failed: {}", artist_id, e);
            notify(push, user_id, &format!("{}{}", MSG_UNEXPECTED_PREFIX, e)).await;
            return;
        }
    };

    notify(push, user_id, &progress_notice(&artist.name)).await;

    let table = match analysis.assemble(artist_id).await {
        Ok(table) => table,
        Err(e) => {
            error!("Analysis for artist {} failed: {}", artist_id, e);
            notify(push, user_id, &failure_notice(&e)).await;
            return;
        }
    };

    match mode {
        DeliveryMode::Text => {
            notify(push, user_id, &text_summary(&table)).await;
        }
        DeliveryMode::Link => {
            let file_name = analysis_file_name(artist_id);
            match store.put(&file_name, table.to_csv().into_bytes()).await {
                Ok(url) => {
                    notify(push, user_id, &download_notice(&url)).await;
                }
                Err(e) => {
                    error!("Upload of {} failed: {}", file_name, e);
                    notify(push, user_id, &format!("{}{}", MSG_UNEXPECTED_PREFIX, e)).await;
                }
            }
        }
    }
}

/// One distinct user notice per failure kind of the pipeline.
fn failure_notice(err: &AnalysisError) -> String {
    match err {
        AnalysisError::MissingAudioFeatures { .. } => MSG_FEATURES_UNAVAILABLE.to_string(),
        AnalysisError::Catalog(CatalogError::Authentication(_)) => {
            MSG_CATALOG_UNREACHABLE.to_string()
        }
        AnalysisError::Catalog(CatalogError::ArtistNotFound(_)) => MSG_ARTIST_NOT_FOUND.to_string(),
        AnalysisError::Catalog(_) => MSG_CATALOG_FAILED.to_string(),
    }
}

async fn notify(push: &dyn PushSender, user_id: &str, text: &str) {
    if let Err(e) = push.send_text(user_id, text).await {
        warn!("Failed to push notice to {}: {}", user_id, e);
    }
}
