//! Display-column configuration for the assembled table.
//!
//! Three fixed lists drive the final shaping step: raw-field renames, raw
//! fields that are never shown, and the display order. The pipeline treats
//! all three as data; reshuffling the table means editing these lists, not
//! the assembler.

/// Raw field name to display name.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("id", "Spotify上の楽曲ID"),
    ("name", "楽曲名"),
    ("album_name", "アルバム名"),
    ("artist", "アーティスト名"),
    ("popularity", "再生数+最近よく聴かれてる度"),
    ("release_date", "リリース日"),
    ("duration_ms", "再生時間"),
    ("acousticness", "アコースティックさ"),
    ("loudness", "全体的な音量"),
    ("danceability", "踊りやすさ"),
    ("energy", "エネルギッシュさ"),
    ("valence", "ポジティブさ"),
    ("key", "キー"),
    ("tempo", "BPM"),
    ("time_signature", "拍子"),
];

/// Raw fields that never reach the display table. `mode` is absorbed into
/// the key signature string before this list applies.
pub const COLUMN_DROPS: &[&str] = &["instrumentalness", "liveness", "mode", "speechiness"];

/// Display names in their final order. This list, not the data, determines
/// the column set of every assembled table.
pub const COLUMN_ORDER: &[&str] = &[
    "楽曲名",
    "アーティスト名",
    "アルバム名",
    "再生数+最近よく聴かれてる度",
    "リリース日",
    "全体的な音量",
    "キー",
    "BPM",
    "拍子",
    "再生時間",
    "アコースティックさ",
    "踊りやすさ",
    "エネルギッシュさ",
    "ポジティブさ",
    "Spotify上の楽曲ID",
];

/// Display name for a raw field, if the field is shown at all.
pub fn display_name(raw_field: &str) -> Option<&'static str> {
    COLUMN_RENAMES
        .iter()
        .find(|(raw, _)| *raw == raw_field)
        .map(|(_, display)| *display)
}
