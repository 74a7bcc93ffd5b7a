use dashboard_core::{update, Job, Msg, ViewState};

#[test]
fn update_is_noop() {
    let state = ViewState::<Job>::default();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(next, Msg::Tick);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
