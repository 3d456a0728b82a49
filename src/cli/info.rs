use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::MigrationConfig,
    error,
    info,
    migrate::{CallClass, LibraryService, RateLimiter},
    tidal::TidalService,
    types::{AccountRole, CountTableRow, SortDirective},
    warning,
};

pub async fn info(account: AccountRole) {
    let service = match TidalService::connect(account).await {
        Ok(service) => service,
        Err(e) => {
            error!(
                "Failed to load {} session. Please run timicli auth {}\n Error: {}",
                account, account, e
            );
        }
    };

    let config = MigrationConfig::from_env();
    let limiter = RateLimiter::new(&config);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching remote library counts...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    // limit=1 requests are enough to read the collection totals
    let mut rows: Vec<CountTableRow> = Vec::new();

    let artists = limiter
        .run(CallClass::Item, async || {
            service
                .list_followed_artists(0, 1, SortDirective::date_desc())
                .await
        })
        .await;
    push_count(&mut rows, "artists", artists.map(|p| p.total));

    let albums = limiter
        .run(CallClass::Item, async || {
            service
                .list_liked_albums(0, 1, SortDirective::date_desc())
                .await
        })
        .await;
    push_count(&mut rows, "albums", albums.map(|p| p.total));

    let tracks = limiter
        .run(CallClass::Item, async || {
            service
                .list_liked_tracks(0, 1, SortDirective::date_desc())
                .await
        })
        .await;
    push_count(&mut rows, "tracks", tracks.map(|p| p.total));

    let playlists = limiter
        .run(CallClass::Item, async || {
            service
                .list_user_playlists(0, 1, SortDirective::date_desc())
                .await
        })
        .await;
    push_count(&mut rows, "playlists", playlists.map(|p| p.total));

    pb.finish_and_clear();

    info!("Library counts for the {} account:", account);
    println!("{}", Table::new(rows));
}

fn push_count(
    rows: &mut Vec<CountTableRow>,
    kind: &str,
    total: Result<Option<u64>, crate::migrate::MigrationError>,
) {
    match total {
        Ok(total) => rows.push(CountTableRow {
            kind: kind.to_string(),
            count: total.unwrap_or(0),
        }),
        Err(e) => {
            warning!("Failed to fetch {} count: {}", kind, e);
            rows.push(CountTableRow {
                kind: kind.to_string(),
                count: 0,
            });
        }
    }
}
