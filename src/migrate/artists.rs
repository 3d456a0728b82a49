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
    types::{FollowedArtist, MigrationResult, SortDirective},
};

/// Read-only look at the newest followed artists. Mutates nothing; used by
/// the caller for confirmation before a commit.
pub async fn preview<S: LibraryService>(
    source: &S,
    limiter: &RateLimiter,
    window: u64,
) -> Result<Vec<FollowedArtist>, MigrationError> {
    let page = limiter
        .run(CallClass::Item, async || {
            source
                .list_followed_artists(0, window, SortDirective::date_desc())
                .await
        })
        .await?;
    Ok(page.items)
}

/// Copies followed artists from source to destination in original follow
/// order, oldest first.
pub async fn migrate<S: LibraryService, D: LibraryService>(
    source: &S,
    dest: &D,
    config: &MigrationConfig,
    limiter: &RateLimiter,
    cancel: &CancelToken,
) -> Result<MigrationResult, MigrationError> {
    let started = Instant::now();
    let mut result = MigrationResult::new("artists");

    let collected = collect(
        async |offset, limit| {
            source
                .list_followed_artists(offset, limit, SortDirective::date_desc())
                .await
        },
        limiter,
        config.page_size,
        cancel,
    )
    .await
    .map_err(|e| e.cause)?;

    let mut seen: HashSet<String> = HashSet::new();
    for artist in reconcile(collected) {
        if cancel.is_cancelled() {
            break;
        }
        if !seen.insert(artist.id.clone()) {
            result.skipped += 1;
            continue;
        }

        result.attempted += 1;
        match limiter
            .run(CallClass::Item, async || {
                dest.follow_artist(&artist.id).await
            })
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
