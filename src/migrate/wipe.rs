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

/// Deletes every liked track on the destination account.
///
/// Irreversible. This function performs no confirmation of its own; the
/// caller must obtain it before invoking. It is never run as a side effect
/// of a copy; the orchestrator composes it explicitly and always to
/// completion before any track copy of the same plan starts writing.
///
/// Collection order is irrelevant here since everything collected gets
/// deleted; deletes go one at a time through the shared limiter and a
/// single failed delete never stops the rest.
pub async fn wipe<D: LibraryService>(
    dest: &D,
    config: &MigrationConfig,
    limiter: &RateLimiter,
    cancel: &CancelToken,
) -> Result<MigrationResult, MigrationError> {
    let started = Instant::now();
    let mut result = MigrationResult::new("wipe");

    let liked = collect(
        async |offset, limit| {
            dest.list_liked_tracks(offset, limit, SortDirective::date_desc())
                .await
        },
        limiter,
        config.page_size,
        cancel,
    )
    .await
    .map_err(|e| e.cause)?;

    for track in liked {
        if cancel.is_cancelled() {
            break;
        }

        result.attempted += 1;
        match limiter
            .run(CallClass::Item, async || dest.unlike_track(&track.id).await)
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
