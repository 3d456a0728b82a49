use crate::{
    config::MigrationConfig,
    migrate::{
        CancelToken, albums, artists,
        error::MigrationError,
        limiter::RateLimiter,
        playlists,
        service::LibraryService,
        tracks, wipe,
    },
    types::{MigrationPlan, MigrationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Wipe,
    Artists,
    Albums,
    Tracks,
    Playlists,
}

impl Stage {
    fn kind(&self) -> &'static str {
        match self {
            Stage::Wipe => "wipe",
            Stage::Artists => "artists",
            Stage::Albums => "albums",
            Stage::Tracks => "tracks",
            Stage::Playlists => "playlists",
        }
    }
}

/// Aggregate outcome of one orchestrated run.
///
/// Holds one [`MigrationResult`] per executed stage, in execution order.
/// `fatal` is set when the run was cut short by a session failure; stages
/// that never ran are absent rather than zeroed.
#[derive(Debug)]
pub struct MigrationReport {
    pub plan: MigrationPlan,
    pub results: Vec<MigrationResult>,
    pub fatal: Option<MigrationError>,
}

impl MigrationReport {
    fn new(plan: MigrationPlan) -> Self {
        MigrationReport {
            plan,
            results: Vec::new(),
            fatal: None,
        }
    }
}

fn stages_for(plan: MigrationPlan, wipe_before_tracks: bool) -> Vec<Stage> {
    match plan {
        MigrationPlan::Full => vec![
            Stage::Wipe,
            Stage::Artists,
            Stage::Albums,
            Stage::Tracks,
            Stage::Playlists,
        ],
        MigrationPlan::ArtistsOnly => vec![Stage::Artists],
        MigrationPlan::AlbumsOnly => vec![Stage::Albums],
        MigrationPlan::TracksOnly => {
            if wipe_before_tracks {
                vec![Stage::Wipe, Stage::Tracks]
            } else {
                vec![Stage::Tracks]
            }
        }
        MigrationPlan::PlaylistsOnly => vec![Stage::Playlists],
        MigrationPlan::WipeOnly => vec![Stage::Wipe],
    }
}

/// Runs the migrators a plan selects, in order, and aggregates the outcome.
///
/// A full plan runs wipe, artists, albums, tracks, playlists. The wipe
/// stage always runs to completion (success or abort) before the track copy
/// starts writing. Stages with per-item failures still let the following
/// stages run; a stage whose collection fails is reported as aborted and
/// the run continues; an expired session stops the run on the spot.
///
/// One rate limiter instance is built here and shared by every call the
/// run makes. The orchestrator never retries whole stages; retry lives at
/// the call level inside the limiter.
pub async fn run_plan<S: LibraryService, D: LibraryService>(
    source: &S,
    dest: &D,
    plan: MigrationPlan,
    wipe_before_tracks: bool,
    config: &MigrationConfig,
    cancel: &CancelToken,
) -> MigrationReport {
    let limiter = RateLimiter::new(config);
    let mut report = MigrationReport::new(plan);

    for stage in stages_for(plan, wipe_before_tracks) {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = match stage {
            Stage::Wipe => wipe::wipe(dest, config, &limiter, cancel).await,
            Stage::Artists => artists::migrate(source, dest, config, &limiter, cancel).await,
            Stage::Albums => albums::migrate(source, dest, config, &limiter, cancel).await,
            Stage::Tracks => tracks::migrate(source, dest, config, &limiter, cancel).await,
            Stage::Playlists => playlists::migrate(source, dest, config, &limiter, cancel).await,
        };

        match outcome {
            Ok(result) => report.results.push(result),
            Err(err) if err.is_fatal() => {
                report
                    .results
                    .push(MigrationResult::aborted_with(stage.kind(), err.to_string()));
                report.fatal = Some(err);
                break;
            }
            Err(err) => {
                report
                    .results
                    .push(MigrationResult::aborted_with(stage.kind(), err.to_string()));
            }
        }
    }

    report
}
