use std::time::Instant;

use crate::{
    config::MigrationConfig,
    migrate::{
        CancelToken, collect,
        error::MigrationError,
        limiter::{CallClass, RateLimiter},
        service::LibraryService,
    },
    types::{MigrationResult, SortDirective},
};

/// Recreates the user's own playlists on the destination account.
///
/// Only playlists owned by the user and not collaborative are in scope;
/// foreign, collaborative and empty playlists count as skipped. Track order
/// inside a playlist is positional, not chronological, so the collected
/// sequence is appended exactly as listed, without reconciliation. Each
/// playlist is processed independently; one failed creation never blocks
/// the rest.
pub async fn migrate<S: LibraryService, D: LibraryService>(
    source: &S,
    dest: &D,
    config: &MigrationConfig,
    limiter: &RateLimiter,
    cancel: &CancelToken,
) -> Result<MigrationResult, MigrationError> {
    let started = Instant::now();
    let mut result = MigrationResult::new("playlists");

    let playlists = collect(
        async |offset, limit| {
            source
                .list_user_playlists(offset, limit, SortDirective::date_desc())
                .await
        },
        limiter,
        config.page_size,
        cancel,
    )
    .await
    .map_err(|e| e.cause)?;

    for playlist in playlists {
        if cancel.is_cancelled() {
            break;
        }
        if !playlist.owner_is_user || playlist.is_collaborative {
            result.skipped += 1;
            continue;
        }
        if playlist.number_of_tracks == 0 {
            result.skipped += 1;
            continue;
        }

        let tracks = match collect(
            async |offset, limit| {
                source
                    .list_playlist_tracks(&playlist.id, offset, limit)
                    .await
            },
            limiter,
            config.page_size,
            cancel,
        )
        .await
        {
            Ok(tracks) => tracks,
            Err(err) => {
                if err.cause.is_fatal() {
                    return Err(err.cause);
                }
                result.attempted += 1;
                result.failed += 1;
                continue;
            }
        };

        if tracks.is_empty() {
            result.skipped += 1;
            continue;
        }

        result.attempted += 1;
        let dest_id = match limiter
            .run(CallClass::Playlist, async || {
                dest.create_playlist(&playlist.name, &playlist.description)
                    .await
            })
            .await
        {
            Ok(id) => id,
            Err(err) if err.is_fatal() => return Err(err),
            Err(_) => {
                result.failed += 1;
                continue;
            }
        };

        let mut complete = true;
        for (position, track) in tracks.iter().enumerate() {
            if cancel.is_cancelled() {
                complete = false;
                break;
            }
            match limiter
                .run(CallClass::Item, async || {
                    dest.add_playlist_track(&dest_id, &track.id, position as u64)
                        .await
                })
                .await
            {
                Ok(()) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {
                    complete = false;
                    break;
                }
            }
        }

        if complete {
            result.succeeded += 1;
        } else {
            result.failed += 1;
        }
    }

    result.elapsed = started.elapsed();
    Ok(result)
}
