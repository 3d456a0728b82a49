use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
    pub user_id: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// Which of the two authenticated accounts a call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccountRole {
    Source,
    Destination,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Source => write!(f, "source"),
            AccountRole::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Date,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Explicit ordering directive for listing calls.
///
/// The remote default sort is not guaranteed to be stable or chronological,
/// so every listing call carries its ordering explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub order: SortOrder,
    pub direction: SortDirection,
}

impl SortDirective {
    /// Newest-first by the date the item was added. The raw order every
    /// collection pass requests.
    pub fn date_desc() -> Self {
        SortDirective {
            order: SortOrder::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Date => write!(f, "DATE"),
            SortOrder::Name => write!(f, "NAME"),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// One page of a listing call plus the server-reported collection size.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowedArtist {
    pub id: String,
    pub name: String,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikedAlbum {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPlaylist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_is_user: bool,
    pub is_collaborative: bool,
    pub number_of_tracks: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistTrack {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesPage<T> {
    pub items: Vec<FavoriteEntry<T>>,
    pub total_number_of_items: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry<T> {
    pub created: Option<String>,
    pub item: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total_number_of_items: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistPayload {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumPayload {
    pub id: u64,
    pub title: String,
    pub artist: Option<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPayload {
    pub id: u64,
    pub title: String,
    pub artist: Option<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPayload {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub creator: Option<CreatorRef>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub number_of_tracks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorRef {
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemEntry {
    pub item: TrackPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub uuid: String,
    pub title: String,
}

/// Which migrators an orchestrated run executes, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPlan {
    Full,
    ArtistsOnly,
    AlbumsOnly,
    TracksOnly,
    PlaylistsOnly,
    WipeOnly,
}

impl std::fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationPlan::Full => write!(f, "full"),
            MigrationPlan::ArtistsOnly => write!(f, "artists"),
            MigrationPlan::AlbumsOnly => write!(f, "albums"),
            MigrationPlan::TracksOnly => write!(f, "tracks"),
            MigrationPlan::PlaylistsOnly => write!(f, "playlists"),
            MigrationPlan::WipeOnly => write!(f, "wipe"),
        }
    }
}

/// Per-stage outcome counts. A run never reports silent partial success;
/// every item ends up in exactly one of the four counters.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub kind: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub elapsed: Duration,
    pub aborted: Option<String>,
}

impl MigrationResult {
    pub fn new(kind: &str) -> Self {
        MigrationResult {
            kind: kind.to_string(),
            attempted: 0,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            elapsed: Duration::ZERO,
            aborted: None,
        }
    }

    pub fn aborted_with(kind: &str, reason: String) -> Self {
        let mut result = Self::new(kind);
        result.aborted = Some(reason);
        result
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

#[derive(Tabled)]
pub struct StageTableRow {
    pub stage: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub elapsed: String,
}

#[derive(Tabled)]
pub struct PreviewTableRow {
    pub nr: usize,
    pub name: String,
    pub artist: String,
    pub added: String,
}

#[derive(Tabled)]
pub struct CountTableRow {
    pub kind: String,
    pub count: u64,
}
