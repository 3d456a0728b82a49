use crate::{
    migrate::CancelToken,
    migrate::error::{CollectionError, ServiceError},
    migrate::limiter::{CallClass, RateLimiter},
    types::Page,
};

/// Drains a paginated listing into a complete, ordered in-memory sequence.
///
/// Pages are requested sequentially with an explicit offset; the total count
/// is unknown upfront and parallel fetches would defeat the rate limiter.
/// Collection terminates when a page comes back short or empty. The
/// server-reported total, when present on the first page, is only used to
/// size the buffer.
///
/// Every page fetch goes through the rate limiter. If a page still fails
/// after the retry budget, the error carries the partial sequence gathered
/// so far ([`CollectionError`]); partial data is fit for previews only,
/// never for the authoritative copy.
///
/// Cancellation is honored at page boundaries and returns whatever was
/// collected, which the per-item loops then cut short as well.
pub async fn collect<T, F>(
    fetch: F,
    limiter: &RateLimiter,
    page_size: u64,
    cancel: &CancelToken,
) -> Result<Vec<T>, CollectionError<T>>
where
    F: AsyncFn(u64, u64) -> Result<Page<T>, ServiceError>,
{
    let mut items: Vec<T> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(items);
        }

        let page = match limiter
            .run(CallClass::Item, async || fetch(offset, page_size).await)
            .await
        {
            Ok(page) => page,
            Err(cause) => {
                return Err(CollectionError {
                    cause,
                    partial: items,
                });
            }
        };

        if offset == 0 {
            if let Some(total) = page.total {
                items.reserve(usize::try_from(total).unwrap_or(0));
            }
        }

        let fetched = page.items.len() as u64;
        items.extend(page.items);

        if fetched == 0 || fetched < page_size {
            break;
        }
        offset += page_size;
    }

    Ok(items)
}
