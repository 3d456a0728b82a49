use std::{collections::HashSet, time::Instant};

use crate::{
    config::MigrationConfig,
    migrate::{
        CancelToken, collect,
        error::MigrationError,
        limiter::{CallClass, RateLimiter},
        reconcile,
        service::LibraryService,
    },
    types::{LikedTrack, MigrationResult, SortDirective},
};

/// Read-only look at the newest liked tracks.
pub async fn preview<S: LibraryService>(
    source: &S,
    limiter: &RateLimiter,
    window: u64,
) -> Result<Vec<LikedTrack>, MigrationError> {
    let page = limiter
        .run(CallClass::Item, async || {
            source
                .list_liked_tracks(0, window, SortDirective::date_desc())
                .await
        })
        .await?;
    Ok(page.items)
}

/// Copies liked tracks from source to destination in original like order,
/// oldest first.
///
/// This is plain append behavior: nothing is deleted here, and the order is
/// reconciled even onto a destination that already holds other favorites.
/// Running the wipe first is the orchestrator's job so that "wipe" and
/// "copy" stay independently invocable.
pub async fn migrate<S: LibraryService, D: LibraryService>(
    source: &S,
    dest: &D,
    config: &MigrationConfig,
    limiter: &RateLimiter,
    cancel: &CancelToken,
) -> Result<MigrationResult, MigrationError> {
    let started = Instant::now();
    let mut result = MigrationResult::new("tracks");

    let collected = collect(
        async |offset, limit| {
            source
                .list_liked_tracks(offset, limit, SortDirective::date_desc())
                .await
        },
        limiter,
        config.page_size,
        cancel,
    )
    .await
    .map_err(|e| e.cause)?;

    let mut seen: HashSet<String> = HashSet::new();
    for track in reconcile(collected) {
        if cancel.is_cancelled() {
            break;
        }
        if !seen.insert(track.id.clone()) {
            result.skipped += 1;
            continue;
        }

        result.attempted += 1;
        match limiter
            .run(CallClass::Item, async || dest.like_track(&track.id).await)
            .await
        {
            Ok(()) => result.succeeded += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(_) => result.failed += 1,
        }
    }

    result.elapsed = started.elapsed();
    Ok(result)
}
