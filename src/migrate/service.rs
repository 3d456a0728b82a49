use crate::{
    migrate::error::ServiceError,
    types::{FollowedArtist, LikedAlbum, LikedTrack, Page, PlaylistTrack, SortDirective, UserPlaylist},
};

/// Capability boundary over a remote music service's library API.
///
/// The engine is generic over this trait; the production implementation
/// wraps the Tidal Web API and tests substitute an in-memory double. Both
/// accounts of a migration are instances of the same capability set, already
/// authenticated by the caller. The engine never sees credentials.
///
/// Listing calls take an explicit `(offset, limit, SortDirective)` and
/// return one [`Page`]; there are more items whenever a page comes back
/// full. Playlist tracks are the exception: their order is positional, not
/// chronological, so that listing takes no ordering directive.
///
/// Failures are classified into [`ServiceError`] variants at this boundary
/// so throttling is distinguishable from real failures.
#[allow(async_fn_in_trait)]
pub trait LibraryService {
    async fn list_followed_artists(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<FollowedArtist>, ServiceError>;

    async fn list_liked_albums(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<LikedAlbum>, ServiceError>;

    async fn list_liked_tracks(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<LikedTrack>, ServiceError>;

    async fn list_user_playlists(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<UserPlaylist>, ServiceError>;

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<PlaylistTrack>, ServiceError>;

    async fn follow_artist(&self, id: &str) -> Result<(), ServiceError>;

    async fn like_album(&self, id: &str) -> Result<(), ServiceError>;

    async fn like_track(&self, id: &str) -> Result<(), ServiceError>;

    async fn unlike_track(&self, id: &str) -> Result<(), ServiceError>;

    /// Creates an empty playlist and returns its new identifier.
    async fn create_playlist(&self, name: &str, description: &str)
    -> Result<String, ServiceError>;

    async fn add_playlist_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        position: u64,
    ) -> Result<(), ServiceError>;
}
