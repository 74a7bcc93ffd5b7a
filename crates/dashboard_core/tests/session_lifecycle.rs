use std::sync::Once;

use dashboard_core::{
    update, ConnectionState, Effect, Job, Msg, PageRequest, SessionGeneration, ViewState, Worker,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dashboard_logging::initialize_for_tests);
}

fn mounted_and_open(page: u32, limit: u32) -> ViewState<Job> {
    let (state, _) = update(ViewState::new(page, limit), Msg::Mounted);
    let generation = state.generation();
    let (state, _) = update(state, Msg::SessionOpened { generation });
    state
}

#[test]
fn mount_opens_a_session_and_open_sends_the_page_request() {
    init_logging();
    let (state, effects) = update(ViewState::<Job>::new(2, 25), Msg::Mounted);
    let generation = state.generation();

    assert_eq!(effects, vec![Effect::OpenSession { generation }]);
    assert_eq!(state.connection(), ConnectionState::Connecting);
    assert!(!state.is_loading());

    let (state, effects) = update(state, Msg::SessionOpened { generation });

    assert_eq!(
        effects,
        vec![Effect::Send {
            generation,
            request: PageRequest { page: 2, limit: 25 },
        }]
    );
    assert_eq!(state.connection(), ConnectionState::Open);
    assert!(state.is_loading());
}

#[test]
fn page_change_reuses_the_open_session() {
    init_logging();
    let state = mounted_and_open(1, 10);
    let generation = state.generation();

    let (state, effects) = update(state, Msg::PageRequested(3));

    assert_eq!(
        effects,
        vec![Effect::Send {
            generation,
            request: PageRequest { page: 3, limit: 10 },
        }]
    );
    assert_eq!(state.generation(), generation);
    assert!(state.is_loading());
}

#[test]
fn page_change_while_not_open_sends_nothing() {
    init_logging();
    let (state, _) = update(ViewState::<Job>::new(1, 10), Msg::Mounted);
    assert_eq!(state.connection(), ConnectionState::Connecting);

    let (state, effects) = update(state, Msg::PageRequested(4));

    assert!(effects.is_empty());
    assert_eq!(state.page(), 4);
    assert!(!state.is_loading());

    // The pending page is what the session asks for once it opens.
    let generation = state.generation();
    let (_, effects) = update(state, Msg::SessionOpened { generation });
    assert_eq!(
        effects,
        vec![Effect::Send {
            generation,
            request: PageRequest { page: 4, limit: 10 },
        }]
    );
}

#[test]
fn same_page_or_limit_is_a_no_op() {
    init_logging();
    let mut state = mounted_and_open(2, 10);
    assert!(state.consume_dirty());

    let (state, effects) = update(state, Msg::PageRequested(2));
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::LimitChanged(10));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn limit_change_reconnects_with_new_limit_and_current_page() {
    init_logging();
    let state = mounted_and_open(1, 10);
    let (state, _) = update(state, Msg::PageRequested(3));
    let old = state.generation();

    let (state, effects) = update(state, Msg::LimitChanged(50));
    let new = state.generation();

    assert_eq!(new, SessionGeneration(old.0 + 1));
    assert_eq!(
        effects,
        vec![
            Effect::CloseSession { generation: old },
            Effect::OpenSession { generation: new },
        ]
    );
    assert_eq!(state.connection(), ConnectionState::Connecting);

    let (_, effects) = update(state, Msg::SessionOpened { generation: new });
    assert_eq!(
        effects,
        vec![Effect::Send {
            generation: new,
            request: PageRequest { page: 3, limit: 50 },
        }]
    );
}

#[test]
fn shrinking_the_limit_cuts_the_window_before_the_new_snapshot() {
    init_logging();
    let state = mounted_and_open(1, 4);
    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::FrameReceived {
            generation,
            text: json!({"type": "JOB_INIT", "payload": {"data": [
                {"job_id": "a"}, {"job_id": "b"}, {"job_id": "c"}, {"job_id": "d"},
            ]}})
            .to_string(),
        },
    );
    assert_eq!(state.window().len(), 4);

    let (state, _) = update(state, Msg::LimitChanged(2));

    assert_eq!(state.connection(), ConnectionState::Connecting);
    let ids: Vec<_> = state
        .view()
        .rows
        .iter()
        .filter_map(|job| job.job_id.clone())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn frames_from_a_superseded_session_are_discarded() {
    init_logging();
    let state = mounted_and_open(1, 5);
    let old = state.generation();
    let (state, _) = update(state, Msg::LimitChanged(6));
    let new = state.generation();
    let (state, _) = update(state, Msg::SessionOpened { generation: new });

    let snapshot = |ids: &[&str]| {
        json!({
            "type": "JOB_INIT",
            "payload": {"data": ids.iter().map(|id| json!({"job_id": id})).collect::<Vec<_>>()}
        })
        .to_string()
    };

    let (state, _) = update(
        state,
        Msg::FrameReceived {
            generation: new,
            text: snapshot(&["fresh"]),
        },
    );
    let (state, _) = update(
        state,
        Msg::FrameReceived {
            generation: old,
            text: snapshot(&["stale"]),
        },
    );
    // A late open or close of the old session changes nothing either.
    let (state, effects) = update(state, Msg::SessionOpened { generation: old });
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::SessionClosed { generation: old });

    assert_eq!(state.connection(), ConnectionState::Open);
    let ids: Vec<_> = state
        .window()
        .records()
        .iter()
        .filter_map(|job| job.job_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["fresh"]);
}

#[test]
fn server_close_leaves_view_inert_until_remounted() {
    init_logging();
    let state = mounted_and_open(1, 5);
    let generation = state.generation();

    let (state, effects) = update(state, Msg::SessionClosed { generation });
    assert!(effects.is_empty());
    assert_eq!(state.connection(), ConnectionState::Closed);

    let (state, effects) = update(state, Msg::PageRequested(2));
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            generation,
            text: json!({"type": "JOB_INIT", "payload": {"data": [{"job_id": "late"}]}}).to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.window().is_empty());

    let (state, effects) = update(state, Msg::Mounted);
    assert_eq!(
        effects,
        vec![
            Effect::CloseSession { generation },
            Effect::OpenSession {
                generation: generation.next()
            },
        ]
    );
    assert_eq!(state.connection(), ConnectionState::Connecting);
}

#[test]
fn reopen_of_the_same_session_resubscribes() {
    init_logging();
    let state = mounted_and_open(2, 5);
    let generation = state.generation();
    let (state, _) = update(state, Msg::SessionClosed { generation });

    let (state, effects) = update(state, Msg::SessionOpened { generation });

    assert_eq!(
        effects,
        vec![Effect::Send {
            generation,
            request: PageRequest { page: 2, limit: 5 },
        }]
    );
    assert_eq!(state.connection(), ConnectionState::Open);
}

#[test]
fn session_errors_are_only_logged() {
    init_logging();
    let state = mounted_and_open(1, 5);
    let before = state.clone();
    let generation = state.generation();

    let (state, effects) = update(
        state,
        Msg::SessionFailed {
            generation,
            message: "connection reset".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn unmount_closes_the_live_session() {
    init_logging();
    let state = mounted_and_open(1, 5);
    let generation = state.generation();

    let (state, effects) = update(state, Msg::Unmounted);
    assert_eq!(effects, vec![Effect::CloseSession { generation }]);
    assert_eq!(state.connection(), ConnectionState::Unmounted);

    // Limit changes on an unmounted view are only remembered.
    let (state, effects) = update(state, Msg::LimitChanged(20));
    assert!(effects.is_empty());
    assert_eq!(state.limit(), 20);
}

#[test]
fn limit_change_after_server_close_reopens_under_a_new_generation() {
    init_logging();
    let (state, _) = update(ViewState::<Worker>::new(1, 5), Msg::Mounted);
    let generation = state.generation();
    let (state, _) = update(state, Msg::SessionOpened { generation });
    let (state, _) = update(state, Msg::SessionClosed { generation });

    let (state, effects) = update(state, Msg::LimitChanged(15));

    // The closed session is released as well; it may be waiting to reconnect.
    assert_eq!(
        effects,
        vec![
            Effect::CloseSession { generation },
            Effect::OpenSession {
                generation: generation.next()
            },
        ]
    );
    assert_eq!(state.connection(), ConnectionState::Connecting);
}
