use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    config,
    management::TokenManager,
    migrate::{LibraryService, ServiceError},
    types::{
        AccountRole, AlbumPayload, ArtistPayload, CreatePlaylistResponse, FavoritesPage,
        FollowedArtist, LikedAlbum, LikedTrack, ListPage, Page, PlaylistItemEntry,
        PlaylistPayload, PlaylistTrack, SortDirective, TrackPayload, UserPlaylist,
    },
};

/// An authenticated Tidal account, usable as either side of a migration.
///
/// Wraps the HTTP client, the per-role token manager and the numeric user
/// id the library endpoints are addressed by. All calls classify failures
/// into [`ServiceError`] so the engine can tell throttling apart from real
/// failures.
pub struct TidalService {
    client: Client,
    tokens: Mutex<TokenManager>,
    user_id: u64,
    api_url: String,
}

impl TidalService {
    /// Loads the persisted token for the given account role.
    ///
    /// Fails when the role has not been authenticated yet; the caller points
    /// the user at `timicli auth`.
    pub async fn connect(role: AccountRole) -> Result<Self, String> {
        let tokens = TokenManager::load(role).await?;
        let user_id = tokens.user_id();
        Ok(TidalService {
            client: Client::new(),
            tokens: Mutex::new(tokens),
            user_id,
            api_url: config::tidal_apiurl(),
        })
    }

    async fn bearer(&self) -> String {
        self.tokens.lock().await.get_valid_token().await
    }

    async fn check(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ServiceError::Throttled { retry_after });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::AuthExpired);
        }

        let reason = format!(
            "{}: {}",
            status,
            response.text().await.unwrap_or_default()
        );
        if status.is_server_error() {
            Err(ServiceError::Transient(reason))
        } else {
            Err(ServiceError::Permanent(reason))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ServiceError> {
        let token = self.bearer().await;
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ServiceError::Transient(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Permanent(e.to_string()))
    }

    async fn post_form(&self, url: String, form: &[(&str, &str)]) -> Result<(), ServiceError> {
        let token = self.bearer().await;
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .form(form)
            .send()
            .await
            .map_err(|e| ServiceError::Transient(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: String,
        form: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let token = self.bearer().await;
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .form(form)
            .send()
            .await
            .map_err(|e| ServiceError::Transient(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Permanent(e.to_string()))
    }

    async fn delete(&self, url: String) -> Result<(), ServiceError> {
        let token = self.bearer().await;
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ServiceError::Transient(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    fn favorites_url(&self, kind: &str, offset: u64, limit: u64, sort: SortDirective) -> String {
        format!(
            "{uri}/users/{uid}/favorites/{kind}?limit={limit}&offset={offset}&order={order}&orderDirection={direction}",
            uri = self.api_url,
            uid = self.user_id,
            kind = kind,
            limit = limit,
            offset = offset,
            order = sort.order,
            direction = sort.direction
        )
    }

    fn artist_name(artist: Option<crate::types::ArtistRef>) -> String {
        artist.map(|a| a.name).unwrap_or_else(|| "Unknown".to_string())
    }
}

impl LibraryService for TidalService {
    async fn list_followed_artists(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<FollowedArtist>, ServiceError> {
        let url = self.favorites_url("artists", offset, limit, sort);
        let page = self.get_json::<FavoritesPage<ArtistPayload>>(url).await?;
        Ok(Page {
            total: page.total_number_of_items,
            items: page
                .items
                .into_iter()
                .map(|entry| FollowedArtist {
                    id: entry.item.id.to_string(),
                    name: entry.item.name,
                    added_at: entry.created.unwrap_or_default(),
                })
                .collect(),
        })
    }

    async fn list_liked_albums(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<LikedAlbum>, ServiceError> {
        let url = self.favorites_url("albums", offset, limit, sort);
        let page = self.get_json::<FavoritesPage<AlbumPayload>>(url).await?;
        Ok(Page {
            total: page.total_number_of_items,
            items: page
                .items
                .into_iter()
                .map(|entry| LikedAlbum {
                    id: entry.item.id.to_string(),
                    title: entry.item.title,
                    artist: Self::artist_name(entry.item.artist),
                    added_at: entry.created.unwrap_or_default(),
                })
                .collect(),
        })
    }

    async fn list_liked_tracks(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<LikedTrack>, ServiceError> {
        let url = self.favorites_url("tracks", offset, limit, sort);
        let page = self.get_json::<FavoritesPage<TrackPayload>>(url).await?;
        Ok(Page {
            total: page.total_number_of_items,
            items: page
                .items
                .into_iter()
                .map(|entry| LikedTrack {
                    id: entry.item.id.to_string(),
                    title: entry.item.title,
                    artist: Self::artist_name(entry.item.artist),
                    added_at: entry.created.unwrap_or_default(),
                })
                .collect(),
        })
    }

    async fn list_user_playlists(
        &self,
        offset: u64,
        limit: u64,
        sort: SortDirective,
    ) -> Result<Page<UserPlaylist>, ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/playlists?limit={limit}&offset={offset}&order={order}&orderDirection={direction}",
            uri = self.api_url,
            uid = self.user_id,
            limit = limit,
            offset = offset,
            order = sort.order,
            direction = sort.direction
        );
        let page = self.get_json::<ListPage<PlaylistPayload>>(url).await?;
        let user_id = self.user_id;
        Ok(Page {
            total: page.total_number_of_items,
            items: page
                .items
                .into_iter()
                .map(|payload| UserPlaylist {
                    id: payload.uuid,
                    name: payload.title,
                    description: payload.description.unwrap_or_default(),
                    owner_is_user: payload
                        .creator
                        .as_ref()
                        .and_then(|c| c.id)
                        .is_some_and(|creator_id| creator_id == user_id),
                    is_collaborative: payload.collaborative,
                    number_of_tracks: payload.number_of_tracks,
                })
                .collect(),
        })
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<PlaylistTrack>, ServiceError> {
        let url = format!(
            "{uri}/playlists/{playlist_id}/items?limit={limit}&offset={offset}",
            uri = self.api_url,
            playlist_id = playlist_id,
            limit = limit,
            offset = offset
        );
        let page = self.get_json::<ListPage<PlaylistItemEntry>>(url).await?;
        Ok(Page {
            total: page.total_number_of_items,
            items: page
                .items
                .into_iter()
                .map(|entry| PlaylistTrack {
                    id: entry.item.id.to_string(),
                    title: entry.item.title,
                })
                .collect(),
        })
    }

    async fn follow_artist(&self, id: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/favorites/artists",
            uri = self.api_url,
            uid = self.user_id
        );
        self.post_form(url, &[("artistId", id)]).await
    }

    async fn like_album(&self, id: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/favorites/albums",
            uri = self.api_url,
            uid = self.user_id
        );
        self.post_form(url, &[("albumId", id)]).await
    }

    async fn like_track(&self, id: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/favorites/tracks",
            uri = self.api_url,
            uid = self.user_id
        );
        self.post_form(url, &[("trackId", id)]).await
    }

    async fn unlike_track(&self, id: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/favorites/tracks/{id}",
            uri = self.api_url,
            uid = self.user_id,
            id = id
        );
        self.delete(url).await
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, ServiceError> {
        let url = format!(
            "{uri}/users/{uid}/playlists",
            uri = self.api_url,
            uid = self.user_id
        );
        let created = self
            .post_form_json::<CreatePlaylistResponse>(
                url,
                &[("title", name), ("description", description)],
            )
            .await?;
        Ok(created.uuid)
    }

    async fn add_playlist_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        position: u64,
    ) -> Result<(), ServiceError> {
        let url = format!(
            "{uri}/playlists/{playlist_id}/items",
            uri = self.api_url,
            playlist_id = playlist_id
        );
        let to_index = position.to_string();
        self.post_form(url, &[("trackIds", track_id), ("toIndex", &to_index)])
            .await
    }
}
