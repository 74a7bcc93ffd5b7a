use std::sync::Once;

use dashboard_core::{
    update, DispatchOutcome, Effect, Job, JobStatus, Msg, Pagination, Record, SessionGeneration,
    SnapshotKind, ViewState, Worker,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dashboard_logging::initialize_for_tests);
}

/// Mount and open a session so frames are accepted.
fn open_view<R: Record>(limit: u32) -> (ViewState<R>, SessionGeneration) {
    let (state, effects) = update(ViewState::<R>::new(1, limit), Msg::Mounted);
    let generation = match effects.as_slice() {
        [Effect::OpenSession { generation }] => *generation,
        other => panic!("expected a single open effect, got {other:?}"),
    };
    let (state, _) = update(state, Msg::SessionOpened { generation });
    (state, generation)
}

fn receive<R: Record>(
    state: ViewState<R>,
    generation: SessionGeneration,
    frame: serde_json::Value,
) -> ViewState<R> {
    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            generation,
            text: frame.to_string(),
        },
    );
    assert!(effects.is_empty());
    state
}

fn job_ids(state: &ViewState<Job>) -> Vec<String> {
    state
        .window()
        .records()
        .iter()
        .filter_map(|job| job.job_id.clone())
        .collect()
}

fn job_snapshot(tag: &str, ids: &[&str]) -> serde_json::Value {
    json!({
        "type": tag,
        "payload": {
            "data": ids.iter().map(|id| json!({"job_id": id, "status": "pending"})).collect::<Vec<_>>(),
            "pagination": {"currentPage": 1, "totalPages": 4, "pageSize": 3, "totalItems": 11},
        }
    })
}

#[test]
fn snapshot_replaces_window_and_stores_pagination() {
    init_logging();
    let (state, generation) = open_view::<Job>(3);
    assert!(state.is_loading());

    let state = receive(state, generation, job_snapshot("JOB_INIT", &["a", "b"]));

    assert_eq!(job_ids(&state), vec!["a", "b"]);
    assert!(!state.is_loading());
    assert_eq!(
        state.pagination(),
        Some(Pagination {
            current_page: 1,
            total_pages: 4,
            page_size: 3,
            total_items: 11
        })
    );

    let state = receive(state, generation, job_snapshot("JOB_FETCH_NEW", &["c"]));
    assert_eq!(job_ids(&state), vec!["c"]);
}

#[test]
fn oversized_snapshot_keeps_first_limit_records() {
    init_logging();
    let (state, generation) = open_view::<Job>(3);

    let state = receive(
        state,
        generation,
        job_snapshot("JOB_INIT", &["a", "b", "c", "d", "e"]),
    );

    assert_eq!(job_ids(&state), vec!["a", "b", "c"]);
}

#[test]
fn snapshot_with_repeated_ids_keeps_ids_unique() {
    init_logging();
    let (state, generation) = open_view::<Job>(5);

    let state = receive(state, generation, job_snapshot("JOB_INIT", &["a", "b", "a"]));

    assert_eq!(job_ids(&state), vec!["a", "b"]);
}

#[test]
fn malformed_snapshot_is_inert_but_clears_loading() {
    init_logging();
    let (state, generation) = open_view::<Job>(5);
    let state = receive(state, generation, job_snapshot("JOB_INIT", &["a", "b"]));
    let before = state.window().clone();

    // Re-arm the spinner through a page change.
    let (state, _) = update(state, Msg::PageRequested(2));
    assert!(state.is_loading());

    let state = receive(
        state,
        generation,
        json!({"type": "JOB_FETCH_NEW", "payload": {"data": {"job_id": "x"}}}),
    );

    assert_eq!(state.window(), &before);
    assert!(!state.is_loading());
    assert!(state.is_stale());

    // The next good snapshot clears the stale marker.
    let state = receive(state, generation, job_snapshot("JOB_FETCH_NEW", &["c"]));
    assert!(!state.is_stale());
}

#[test]
fn unparsable_text_is_discarded_and_clears_loading() {
    init_logging();
    let (state, generation) = open_view::<Worker>(5);
    assert!(state.is_loading());

    let (state, _) = update(
        state,
        Msg::FrameReceived {
            generation,
            text: "{not json".to_string(),
        },
    );

    assert!(state.window().is_empty());
    assert!(!state.is_loading());
}

#[test]
fn unknown_tags_are_ignored() {
    init_logging();
    let (state, generation) = open_view::<Worker>(5);
    let state = receive(
        state,
        generation,
        json!({"type": "WORKER_INIT", "payload": {"data": [{"worker_id": "w1"}]}}),
    );
    let before = state.window().clone();

    let mut state = state;
    let outcome = dashboard_core::dispatch_frame(
        &mut state,
        &json!({"type": "WORKER_RESTARTED", "payload": 7}).to_string(),
    );

    assert_eq!(outcome, DispatchOutcome::Ignored("WORKER_RESTARTED".to_string()));
    assert_eq!(state.window(), &before);
    assert!(!state.is_stale());
}

#[test]
fn update_frame_folds_batch_with_job_policy() {
    init_logging();
    let (state, generation) = open_view::<Job>(3);
    let state = receive(state, generation, job_snapshot("JOB_INIT", &["A", "B"]));

    let state = receive(
        state,
        generation,
        json!({"type": "JOB_UPDATE", "payload": [
            {"job_id": "C"},
            {"job_id": "A", "status": "done"},
        ]}),
    );

    assert_eq!(job_ids(&state), vec!["C", "A", "B"]);
    assert_eq!(
        state.window().get("A").and_then(|job| job.status),
        Some(JobStatus::Done)
    );
}

#[test]
fn undecodable_elements_are_skipped_individually() {
    init_logging();
    let mut state = open_view::<Job>(5).0;

    let outcome = dashboard_core::dispatch_frame(
        &mut state,
        &json!({"type": "JOB_INIT", "payload": {"data": [
            {"job_id": "ok"},
            {"job_id": 42},
            "garbage",
        ]}})
        .to_string(),
    );

    assert_eq!(
        outcome,
        DispatchOutcome::SnapshotApplied {
            kind: SnapshotKind::Init,
            records: 1
        }
    );
    assert_eq!(job_ids(&state), vec!["ok"]);
}

#[test]
fn known_record_with_a_bad_field_still_replaces_the_row() {
    init_logging();
    let (state, generation) = open_view::<Job>(5);
    let state = receive(state, generation, job_snapshot("JOB_INIT", &["A"]));

    for patch in [
        json!({"job_id": "A", "status": 7, "worker_id": "w9"}),
        json!({"job_id": "A", "timestamps": null, "worker_id": "w9"}),
        json!({"job_id": "A", "logs": [1, 2], "worker_id": "w9"}),
    ] {
        let state = receive(
            state.clone(),
            generation,
            json!({"type": "JOB_UPDATE", "payload": [patch]}),
        );

        assert_eq!(job_ids(&state), vec!["A"]);
        let row = state.window().get("A").unwrap();
        assert_eq!(row.worker_id.as_deref(), Some("w9"));
    }
}

#[test]
fn worker_update_frames_never_insert() {
    init_logging();
    let (state, generation) = open_view::<Worker>(5);
    let state = receive(
        state,
        generation,
        json!({"type": "WORKER_INIT", "payload": {"data": [{"worker_id": "X"}, {"worker_id": "Y"}]}}),
    );

    let state = receive(
        state,
        generation,
        json!({"type": "WORKER_UPDATE", "payload": [
            {"worker_id": "D", "status": "idle"},
            {"worker_id": "X", "status": "busy"},
        ]}),
    );

    let ids: Vec<_> = state
        .window()
        .records()
        .iter()
        .filter_map(|worker| worker.identity())
        .collect();
    assert_eq!(ids, vec!["X", "Y"]);
}
