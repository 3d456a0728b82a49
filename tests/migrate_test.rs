use std::{
    cell::Cell,
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use timicli::{
    config::MigrationConfig,
    migrate::{
        CallClass, CancelToken, LibraryService, RateLimiter, ServiceError, collect,
        orchestrator::run_plan, playlists, tracks,
    },
    types::{
        FollowedArtist, LikedAlbum, LikedTrack, MigrationPlan, Page, PlaylistTrack,
        SortDirective, UserPlaylist,
    },
};

// Config with near-zero delays so tests run deterministically fast
fn test_config(page_size: u64) -> MigrationConfig {
    MigrationConfig {
        item_delay: Duration::ZERO,
        playlist_delay: Duration::ZERO,
        page_size,
        max_retries: 3,
        backoff_ceiling: Duration::from_secs(8),
        preview_window: 10,
    }
}

fn create_test_track(id: &str, added_at: &str) -> LikedTrack {
    LikedTrack {
        id: id.to_string(),
        title: format!("Track {}", id),
        artist: "Test Artist".to_string(),
        added_at: added_at.to_string(),
    }
}

fn create_test_playlist(id: &str, name: &str, owner: bool, collab: bool, n: u64) -> UserPlaylist {
    UserPlaylist {
        id: id.to_string(),
        name: name.to_string(),
        description: "A playlist".to_string(),
        owner_is_user: owner,
        is_collaborative: collab,
        number_of_tracks: n,
    }
}

fn slice_page<T: Clone>(all: &[T], offset: u64, limit: u64) -> Page<T> {
    let start = (offset as usize).min(all.len());
    let end = start.saturating_add(limit as usize).min(all.len());
    Page {
        items: all[start..end].to_vec(),
        total: Some(all.len() as u64),
    }
}

/// In-memory stand-in for a remote account. Every mutation is appended to
/// `log` so tests can assert on exact write order.
#[derive(Default)]
struct FakeService {
    artists: Vec<FollowedArtist>,
    albums: Vec<LikedAlbum>,
    tracks: Mutex<Vec<LikedTrack>>,
    playlists: Vec<UserPlaylist>,
    playlist_tracks: HashMap<String, Vec<PlaylistTrack>>,
    fail_ids: HashSet<String>,
    auth_expired_ids: HashSet<String>,
    fail_album_listing: bool,
    log: Mutex<Vec<String>>,
}

impl FakeService {
    fn with_tracks(tracks: Vec<LikedTrack>) -> Self {
        FakeService {
            tracks: Mutex::new(tracks),
            ..Default::default()
        }
    }

    fn log_call(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn log_entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn check_write(&self, id: &str) -> Result<(), ServiceError> {
        if self.auth_expired_ids.contains(id) {
            return Err(ServiceError::AuthExpired);
        }
        if self.fail_ids.contains(id) {
            return Err(ServiceError::Permanent(format!("unknown id {}", id)));
        }
        Ok(())
    }
}

impl LibraryService for FakeService {
    async fn list_followed_artists(
        &self,
        offset: u64,
        limit: u64,
        _sort: SortDirective,
    ) -> Result<Page<FollowedArtist>, ServiceError> {
        Ok(slice_page(&self.artists, offset, limit))
    }

    async fn list_liked_albums(
        &self,
        offset: u64,
        limit: u64,
        _sort: SortDirective,
    ) -> Result<Page<LikedAlbum>, ServiceError> {
        if self.fail_album_listing {
            return Err(ServiceError::Permanent("album listing down".to_string()));
        }
        Ok(slice_page(&self.albums, offset, limit))
    }

    async fn list_liked_tracks(
        &self,
        offset: u64,
        limit: u64,
        _sort: SortDirective,
    ) -> Result<Page<LikedTrack>, ServiceError> {
        Ok(slice_page(&self.tracks.lock().unwrap(), offset, limit))
    }

    async fn list_user_playlists(
        &self,
        offset: u64,
        limit: u64,
        _sort: SortDirective,
    ) -> Result<Page<UserPlaylist>, ServiceError> {
        Ok(slice_page(&self.playlists, offset, limit))
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<PlaylistTrack>, ServiceError> {
        let tracks = self
            .playlist_tracks
            .get(playlist_id)
            .cloned()
            .unwrap_or_default();
        Ok(slice_page(&tracks, offset, limit))
    }

    async fn follow_artist(&self, id: &str) -> Result<(), ServiceError> {
        self.check_write(id)?;
        self.log_call(format!("follow_artist:{}", id));
        Ok(())
    }

    async fn like_album(&self, id: &str) -> Result<(), ServiceError> {
        self.check_write(id)?;
        self.log_call(format!("like_album:{}", id));
        Ok(())
    }

    async fn like_track(&self, id: &str) -> Result<(), ServiceError> {
        self.check_write(id)?;
        self.log_call(format!("like_track:{}", id));
        Ok(())
    }

    async fn unlike_track(&self, id: &str) -> Result<(), ServiceError> {
        self.check_write(id)?;
        self.log_call(format!("unlike_track:{}", id));
        self.tracks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn create_playlist(
        &self,
        name: &str,
        _description: &str,
    ) -> Result<String, ServiceError> {
        self.check_write(name)?;
        self.log_call(format!("create_playlist:{}", name));
        Ok(format!("dst-{}", name))
    }

    async fn add_playlist_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        position: u64,
    ) -> Result<(), ServiceError> {
        self.check_write(track_id)?;
        self.log_call(format!("add:{}:{}:{}", playlist_id, track_id, position));
        Ok(())
    }
}

#[tokio::test]
async fn collector_returns_all_items_without_duplicates_or_gaps() {
    let config = test_config(5);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    // N around the page size boundaries, for several page sizes
    for n in [0usize, 1, 5, 6, 50] {
        for page_size in [1u64, 5, 7] {
            let backing: Vec<u32> = (0..n as u32).collect();
            let collected = collect(
                async |offset, limit| Ok::<_, ServiceError>(slice_page(&backing, offset, limit)),
                &limiter,
                page_size,
                &cancel,
            )
            .await
            .unwrap();
            assert_eq!(collected, backing, "n={} page_size={}", n, page_size);
        }
    }
}

#[tokio::test]
async fn collector_carries_partial_sequence_on_failure() {
    let config = test_config(2);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();
    let backing: Vec<u32> = (0..10).collect();

    let err = collect(
        async |offset, limit| {
            if offset >= 2 {
                return Err(ServiceError::Permanent("listing broke".to_string()));
            }
            Ok(slice_page(&backing, offset, limit))
        },
        &limiter,
        2,
        &cancel,
    )
    .await
    .unwrap_err();

    assert_eq!(err.partial, vec![0, 1]);
    assert!(err.cause.to_string().contains("listing broke"));
}

#[tokio::test(start_paused = true)]
async fn limiter_retries_throttled_responses_then_succeeds() {
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);

    // Three throttled responses, then success
    let calls = Cell::new(0u32);
    let result = limiter
        .run(CallClass::Item, async || {
            let n = calls.get();
            calls.set(n + 1);
            if n < 3 {
                Err(ServiceError::Throttled { retry_after: None })
            } else {
                Ok(n)
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.get(), 4);
}

#[tokio::test(start_paused = true)]
async fn limiter_gives_up_after_retry_budget() {
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);

    let calls = Cell::new(0u32);
    let result: Result<(), _> = limiter
        .run(CallClass::Item, async || {
            calls.set(calls.get() + 1);
            Err(ServiceError::Throttled { retry_after: Some(1) })
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        timicli::migrate::MigrationError::RateLimitExceeded
    );
    // initial attempt plus max_retries retries
    assert_eq!(calls.get(), config.max_retries + 1);
}

#[test]
fn limiter_backoff_is_non_decreasing_and_capped() {
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);

    let mut previous = Duration::ZERO;
    for attempt in 0..10 {
        let delay = limiter.backoff_delay(attempt, None);
        assert!(delay >= previous);
        assert!(delay <= config.backoff_ceiling);
        previous = delay;
    }

    // The server's hint wins when present
    assert_eq!(limiter.backoff_delay(0, Some(3)), Duration::from_secs(3));
    // But it never exceeds the ceiling
    assert_eq!(limiter.backoff_delay(0, Some(600)), config.backoff_ceiling);
}

#[tokio::test]
async fn tracks_are_written_oldest_first() {
    // As returned by the API: newest first
    let source = FakeService::with_tracks(vec![
        create_test_track("t3", "2024-03-01T00:00:00.000+0000"),
        create_test_track("t2", "2024-02-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
    ]);
    let dest = FakeService::default();
    let config = test_config(2);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    let result = tracks::migrate(&source, &dest, &config, &limiter, &cancel)
        .await
        .unwrap();

    assert_eq!(
        dest.log_entries(),
        vec!["like_track:t1", "like_track:t2", "like_track:t3"]
    );
    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 3);
    assert_eq!(result.failed, 0);
    assert_eq!(result.skipped, 0);
}

#[tokio::test]
async fn failed_item_does_not_stop_remaining_items() {
    let source = FakeService::with_tracks(vec![
        create_test_track("t3", "2024-03-01T00:00:00.000+0000"),
        create_test_track("t2", "2024-02-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
    ]);
    let mut dest = FakeService::default();
    dest.fail_ids.insert("t2".to_string());
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    let result = tracks::migrate(&source, &dest, &config, &limiter, &cancel)
        .await
        .unwrap();

    // t2 fails, t3 is still attempted afterwards
    assert_eq!(dest.log_entries(), vec!["like_track:t1", "like_track:t3"]);
    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
}

#[tokio::test]
async fn duplicate_items_are_skipped_within_a_run() {
    let source = FakeService::with_tracks(vec![
        create_test_track("t2", "2024-02-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
    ]);
    let dest = FakeService::default();
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    let result = tracks::migrate(&source, &dest, &config, &limiter, &cancel)
        .await
        .unwrap();

    assert_eq!(dest.log_entries(), vec!["like_track:t1", "like_track:t2"]);
    assert_eq!(result.attempted, 2);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn preview_reads_newest_items_without_mutating() {
    let source = FakeService::with_tracks(vec![
        create_test_track("t3", "2024-03-01T00:00:00.000+0000"),
        create_test_track("t2", "2024-02-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
    ]);
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);

    let previewed = tracks::preview(&source, &limiter, 2).await.unwrap();

    let ids: Vec<&str> = previewed.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2"]);
    assert!(source.log_entries().is_empty());
    assert_eq!(source.tracks.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn wipe_only_plan_empties_destination() {
    let source = FakeService::default();
    let dest = FakeService::with_tracks(vec![
        create_test_track("d1", "2024-01-01T00:00:00.000+0000"),
        create_test_track("d2", "2024-01-02T00:00:00.000+0000"),
        create_test_track("d3", "2024-01-03T00:00:00.000+0000"),
        create_test_track("d4", "2024-01-04T00:00:00.000+0000"),
        create_test_track("d5", "2024-01-05T00:00:00.000+0000"),
    ]);
    let config = test_config(50);
    let cancel = CancelToken::new();

    let report = run_plan(
        &source,
        &dest,
        MigrationPlan::WipeOnly,
        false,
        &config,
        &cancel,
    )
    .await;

    assert_eq!(report.results.len(), 1);
    let wiped = &report.results[0];
    assert_eq!(wiped.kind, "wipe");
    assert_eq!(wiped.attempted, 5);
    assert_eq!(wiped.succeeded, 5);
    assert_eq!(wiped.failed, 0);
    assert!(dest.tracks.lock().unwrap().is_empty());
    assert!(report.fatal.is_none());
}

#[tokio::test]
async fn full_plan_wipes_before_any_track_copy() {
    let source = FakeService::with_tracks(vec![
        create_test_track("t2", "2024-02-01T00:00:00.000+0000"),
        create_test_track("t1", "2024-01-01T00:00:00.000+0000"),
    ]);
    let dest = FakeService::with_tracks(vec![
        create_test_track("old1", "2023-01-01T00:00:00.000+0000"),
        create_test_track("old2", "2023-02-01T00:00:00.000+0000"),
    ]);
    let config = test_config(50);
    let cancel = CancelToken::new();

    let report = run_plan(&source, &dest, MigrationPlan::Full, false, &config, &cancel).await;

    let stages: Vec<&str> = report.results.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(stages, vec!["wipe", "artists", "albums", "tracks", "playlists"]);

    // No track-copy write before the last wipe delete
    let log = dest.log_entries();
    let last_unlike = log
        .iter()
        .rposition(|e| e.starts_with("unlike_track:"))
        .unwrap();
    let first_like = log
        .iter()
        .position(|e| e.starts_with("like_track:"))
        .unwrap();
    assert!(last_unlike < first_like);
}

#[tokio::test]
async fn tracks_only_plan_appends_without_wipe() {
    let source = FakeService::with_tracks(vec![create_test_track(
        "t1",
        "2024-01-01T00:00:00.000+0000",
    )]);
    let dest = FakeService::with_tracks(vec![create_test_track(
        "old1",
        "2023-01-01T00:00:00.000+0000",
    )]);
    let config = test_config(50);
    let cancel = CancelToken::new();

    let report = run_plan(
        &source,
        &dest,
        MigrationPlan::TracksOnly,
        false,
        &config,
        &cancel,
    )
    .await;

    let stages: Vec<&str> = report.results.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(stages, vec!["tracks"]);
    // The pre-existing favorite is still there
    assert_eq!(dest.tracks.lock().unwrap().len(), 1);
    assert!(!dest.log_entries().iter().any(|e| e.starts_with("unlike_track:")));
}

#[tokio::test]
async fn playlist_filter_and_order_are_honored() {
    let mut source = FakeService::default();
    source.playlists = vec![
        create_test_playlist("pl1", "Road Trip", true, false, 3),
        create_test_playlist("pl2", "Not Mine", false, false, 4),
        create_test_playlist("pl3", "Shared Band", true, true, 2),
        create_test_playlist("pl4", "Empty", true, false, 0),
    ];
    source.playlist_tracks.insert(
        "pl1".to_string(),
        vec![
            PlaylistTrack {
                id: "A".to_string(),
                title: "Song A".to_string(),
            },
            PlaylistTrack {
                id: "B".to_string(),
                title: "Song B".to_string(),
            },
            PlaylistTrack {
                id: "C".to_string(),
                title: "Song C".to_string(),
            },
        ],
    );
    let dest = FakeService::default();
    let config = test_config(2);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    let result = playlists::migrate(&source, &dest, &config, &limiter, &cancel)
        .await
        .unwrap();

    // Only "Road Trip" is created, with its exact track order
    assert_eq!(
        dest.log_entries(),
        vec![
            "create_playlist:Road Trip",
            "add:dst-Road Trip:A:0",
            "add:dst-Road Trip:B:1",
            "add:dst-Road Trip:C:2",
        ]
    );
    assert_eq!(result.attempted, 1);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.skipped, 3);
    assert_eq!(result.failed, 0);
}

#[tokio::test]
async fn failed_playlist_creation_does_not_block_the_rest() {
    let mut source = FakeService::default();
    source.playlists = vec![
        create_test_playlist("pl1", "Broken", true, false, 1),
        create_test_playlist("pl2", "Fine", true, false, 1),
    ];
    source.playlist_tracks.insert(
        "pl1".to_string(),
        vec![PlaylistTrack {
            id: "X".to_string(),
            title: "Song X".to_string(),
        }],
    );
    source.playlist_tracks.insert(
        "pl2".to_string(),
        vec![PlaylistTrack {
            id: "Y".to_string(),
            title: "Song Y".to_string(),
        }],
    );
    let mut dest = FakeService::default();
    // Creation of the first playlist fails by name
    dest.fail_ids.insert("Broken".to_string());
    let config = test_config(50);
    let limiter = RateLimiter::new(&config);
    let cancel = CancelToken::new();

    let result = playlists::migrate(&source, &dest, &config, &limiter, &cancel)
        .await
        .unwrap();

    assert_eq!(result.attempted, 2);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert!(
        dest.log_entries()
            .contains(&"create_playlist:Fine".to_string())
    );
}

#[tokio::test]
async fn expired_session_aborts_the_whole_run() {
    let source = FakeService::with_tracks(vec![create_test_track(
        "t1",
        "2024-01-01T00:00:00.000+0000",
    )]);
    let mut dest = FakeService::default();
    dest.auth_expired_ids.insert("t1".to_string());
    let config = test_config(50);
    let cancel = CancelToken::new();

    let report = run_plan(&source, &dest, MigrationPlan::Full, false, &config, &cancel).await;

    // The run stops inside the tracks stage; playlists never run
    let stages: Vec<&str> = report.results.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(stages, vec!["wipe", "artists", "albums", "tracks"]);
    assert!(report.results.last().unwrap().is_aborted());
    assert!(report.fatal.is_some());
}

#[tokio::test]
async fn failed_collection_aborts_only_its_stage() {
    let mut source = FakeService::with_tracks(vec![create_test_track(
        "t1",
        "2024-01-01T00:00:00.000+0000",
    )]);
    source.fail_album_listing = true;
    let dest = FakeService::default();
    let config = test_config(50);
    let cancel = CancelToken::new();

    let report = run_plan(&source, &dest, MigrationPlan::Full, false, &config, &cancel).await;

    let stages: Vec<&str> = report.results.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(stages, vec!["wipe", "artists", "albums", "tracks", "playlists"]);

    let albums = &report.results[2];
    assert!(albums.is_aborted());

    // The tracks stage still ran and copied its item
    let tracks_stage = &report.results[3];
    assert_eq!(tracks_stage.succeeded, 1);
    assert!(report.fatal.is_none());
}

#[tokio::test]
async fn cancelled_run_stops_at_the_next_boundary() {
    let source = FakeService::with_tracks(vec![create_test_track(
        "t1",
        "2024-01-01T00:00:00.000+0000",
    )]);
    let dest = FakeService::default();
    let config = test_config(50);
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = run_plan(&source, &dest, MigrationPlan::Full, false, &config, &cancel).await;

    assert!(report.results.is_empty());
    assert!(dest.log_entries().is_empty());
}
