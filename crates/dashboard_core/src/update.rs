use dashboard_logging::{dash_debug, dash_info, dash_warn};

use crate::dispatch::dispatch_frame;
use crate::store::{ConnectionState, SessionGeneration};
use crate::{Effect, Msg, Record, ViewState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<R: Record>(mut state: ViewState<R>, msg: Msg) -> (ViewState<R>, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => match state.connection() {
            ConnectionState::Unmounted | ConnectionState::Closed => {
                let mut effects = close_prior_session(&state);
                let generation = state.begin_session();
                effects.push(Effect::OpenSession { generation });
                effects
            }
            ConnectionState::Connecting | ConnectionState::Open => Vec::new(),
        },
        Msg::Unmounted => {
            let effects = close_prior_session(&state);
            state.set_connection(ConnectionState::Unmounted);
            effects
        }
        Msg::PageRequested(page) => {
            let page = page.max(1);
            if page == state.page() {
                return (state, Vec::new());
            }
            state.set_page(page);
            // Same session, new request. Not open means nothing is sent.
            if state.connection() == ConnectionState::Open {
                state.set_loading(true);
                vec![Effect::Send {
                    generation: state.generation(),
                    request: state.page_request(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::LimitChanged(limit) => {
            let limit = limit.max(1);
            if limit == state.limit() {
                return (state, Vec::new());
            }
            state.set_limit(limit);
            // A limit change tears the session down and opens a fresh one.
            if state.connection().is_mounted() {
                let mut effects = close_prior_session(&state);
                let generation = state.begin_session();
                effects.push(Effect::OpenSession { generation });
                effects
            } else {
                Vec::new()
            }
        }
        Msg::SortChanged(sort) => {
            state.set_sort(sort);
            Vec::new()
        }
        Msg::SortColumnClicked(column) => {
            state.cycle_sort(column);
            Vec::new()
        }
        Msg::SessionOpened { generation } => {
            let reopening = matches!(
                state.connection(),
                ConnectionState::Connecting | ConnectionState::Closed
            );
            if generation != state.generation() || !reopening {
                dash_debug!(
                    "{}: ignoring open of session {:?} (current {:?}, {:?})",
                    R::COLLECTION,
                    generation,
                    state.generation(),
                    state.connection()
                );
                return (state, Vec::new());
            }
            dash_info!("{}: session {:?} open", R::COLLECTION, generation);
            state.set_connection(ConnectionState::Open);
            state.set_loading(true);
            vec![Effect::Send {
                generation,
                request: state.page_request(),
            }]
        }
        Msg::FrameReceived { generation, text } => {
            if is_current_open(&state, generation) {
                dispatch_frame(&mut state, &text);
            } else {
                dash_debug!(
                    "{}: discarding frame from stale session {:?}",
                    R::COLLECTION,
                    generation
                );
            }
            Vec::new()
        }
        Msg::SessionFailed {
            generation,
            message,
        } => {
            dash_warn!(
                "{}: session {:?} error: {}",
                R::COLLECTION,
                generation,
                message
            );
            Vec::new()
        }
        Msg::SessionClosed { generation } => {
            if generation == state.generation() && state.connection().is_live() {
                dash_warn!("{}: session {:?} closed", R::COLLECTION, generation);
                state.set_connection(ConnectionState::Closed);
            } else {
                dash_debug!(
                    "{}: session {:?} closed after teardown",
                    R::COLLECTION,
                    generation
                );
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_current_open<R: Record>(state: &ViewState<R>, generation: SessionGeneration) -> bool {
    generation == state.generation() && state.connection() == ConnectionState::Open
}

/// A closed session may still be waiting to reconnect, so it is closed too.
fn close_prior_session<R: Record>(state: &ViewState<R>) -> Vec<Effect> {
    if state.connection().is_mounted() {
        vec![Effect::CloseSession {
            generation: state.generation(),
        }]
    } else {
        Vec::new()
    }
}
