use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::MigrationConfig,
    error, info,
    migrate::{self, CancelToken, MigrationReport, RateLimiter},
    success,
    tidal::TidalService,
    types::{AccountRole, MigrationPlan, PreviewTableRow, StageTableRow},
    utils, warning,
};

pub async fn migrate(plan: MigrationPlan, wipe_tracks: bool, assume_yes: bool) {
    let config = MigrationConfig::from_env();

    let source = connect(AccountRole::Source).await;
    let dest = connect(AccountRole::Destination).await;

    let wipe_involved = matches!(plan, MigrationPlan::Full | MigrationPlan::WipeOnly)
        || (plan == MigrationPlan::TracksOnly && wipe_tracks);

    if !assume_yes {
        show_preview(&source, plan, &config).await;

        if wipe_involved
            && !utils::confirm(
                "WARNING: this will DELETE all liked tracks on the DESTINATION account. Sure?",
            )
        {
            info!("Nothing touched.");
            return;
        }
        if !utils::confirm(&format!("Start {} migration?", plan)) {
            info!("Nothing touched.");
            return;
        }
    }

    let cancel = CancelToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Running {} migration...", plan));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let report = migrate::run_plan(&source, &dest, plan, wipe_tracks, &config, &cancel).await;

    pb.finish_and_clear();
    print_report(&report);

    if cancel.is_cancelled() {
        warning!("Migration cancelled. Partially completed stages are left as-is.");
        return;
    }
    match &report.fatal {
        Some(err) => error!("Migration aborted: {}. Please run timicli auth again.", err),
        None => success!("{} migration finished.", plan),
    }
}

async fn connect(role: AccountRole) -> TidalService {
    match TidalService::connect(role).await {
        Ok(service) => service,
        Err(e) => {
            error!(
                "Failed to load {} session. Please run timicli auth {}\n Error: {}",
                role, role, e
            );
        }
    }
}

/// Shows the newest items of the listing the plan is about to copy, so the
/// user can check they picked the right source account before anything is
/// written.
async fn show_preview(source: &TidalService, plan: MigrationPlan, config: &MigrationConfig) {
    let limiter = RateLimiter::new(config);
    let window = config.preview_window;

    let rows: Vec<PreviewTableRow> = match plan {
        MigrationPlan::Full | MigrationPlan::TracksOnly => {
            match migrate::tracks::preview(source, &limiter, window).await {
                Ok(tracks) => tracks
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| PreviewTableRow {
                        nr: i + 1,
                        name: t.title,
                        artist: t.artist,
                        added: utils::format_added_date(&t.added_at),
                    })
                    .collect(),
                Err(e) => {
                    warning!("Failed to preview source tracks: {}", e);
                    return;
                }
            }
        }
        MigrationPlan::ArtistsOnly => {
            match migrate::artists::preview(source, &limiter, window).await {
                Ok(artists) => artists
                    .into_iter()
                    .enumerate()
                    .map(|(i, a)| PreviewTableRow {
                        nr: i + 1,
                        name: a.name,
                        artist: "Artist".to_string(),
                        added: utils::format_added_date(&a.added_at),
                    })
                    .collect(),
                Err(e) => {
                    warning!("Failed to preview source artists: {}", e);
                    return;
                }
            }
        }
        MigrationPlan::AlbumsOnly => {
            match migrate::albums::preview(source, &limiter, window).await {
                Ok(albums) => albums
                    .into_iter()
                    .enumerate()
                    .map(|(i, a)| PreviewTableRow {
                        nr: i + 1,
                        name: a.title,
                        artist: a.artist,
                        added: utils::format_added_date(&a.added_at),
                    })
                    .collect(),
                Err(e) => {
                    warning!("Failed to preview source albums: {}", e);
                    return;
                }
            }
        }
        MigrationPlan::PlaylistsOnly | MigrationPlan::WipeOnly => return,
    };

    if rows.is_empty() {
        info!("Source listing is empty.");
        return;
    }

    info!("Most recent items on the source account:");
    println!("{}", Table::new(rows));
}

fn print_report(report: &MigrationReport) {
    for result in &report.results {
        if let Some(reason) = &result.aborted {
            warning!("Stage {} aborted: {}", result.kind, reason);
        }
    }

    let rows: Vec<StageTableRow> = report
        .results
        .iter()
        .map(|r| StageTableRow {
            stage: r.kind.clone(),
            attempted: r.attempted,
            succeeded: r.succeeded,
            skipped: r.skipped,
            failed: r.failed,
            elapsed: utils::format_elapsed(r.elapsed),
        })
        .collect();

    if rows.is_empty() {
        warning!("No stage was executed.");
        return;
    }

    println!("{}", Table::new(rows));
}
