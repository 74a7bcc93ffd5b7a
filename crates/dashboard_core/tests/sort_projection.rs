use dashboard_core::{
    project, update, Job, Msg, SortDescriptor, SortDirection, ViewState, Worker,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn workers_with_load(loads: &[Option<i64>]) -> Vec<Worker> {
    loads
        .iter()
        .enumerate()
        .map(|(index, load)| {
            let mut worker = Worker::new(format!("w{index}"));
            worker.extra.insert("k".to_string(), json!(load));
            worker
        })
        .collect()
}

fn loads(ordered: &[&Worker]) -> Vec<Option<i64>> {
    ordered
        .iter()
        .map(|worker| worker.extra.get("k").and_then(|value| value.as_i64()))
        .collect()
}

#[test]
fn nulls_sort_last_ascending_and_first_descending() {
    let records = workers_with_load(&[Some(1), None, Some(2)]);

    let ascending = project(&records, Some(&SortDescriptor::ascending("k")));
    assert_eq!(loads(&ascending), vec![Some(1), Some(2), None]);

    let descending = project(&records, Some(&SortDescriptor::descending("k")));
    assert_eq!(loads(&descending), vec![None, Some(2), Some(1)]);
}

#[test]
fn absent_fields_behave_like_null() {
    let mut records = workers_with_load(&[Some(3), Some(1)]);
    records.push(Worker::new("no-load"));

    let ascending = project(&records, Some(&SortDescriptor::ascending("k")));
    assert_eq!(ascending.last().and_then(|w| w.worker_id.as_deref()), Some("no-load"));
}

#[test]
fn strings_compare_case_insensitively_and_ties_keep_window_order() {
    let mut a = Job::new("1");
    a.s3_key = Some("beta".into());
    let mut b = Job::new("2");
    b.s3_key = Some("Alpha".into());
    let mut c = Job::new("3");
    c.s3_key = Some("BETA".into());
    let records = vec![a, b, c];

    let ordered = project(&records, Some(&SortDescriptor::ascending("s3_key")));
    let ids: Vec<_> = ordered.iter().filter_map(|job| job.job_id.as_deref()).collect();

    assert_eq!(ids, vec!["2", "1", "3"]);
}

#[test]
fn no_descriptor_keeps_window_order() {
    let records = workers_with_load(&[Some(9), Some(1), Some(5)]);
    let ordered = project(&records, None);
    assert_eq!(loads(&ordered), vec![Some(9), Some(1), Some(5)]);
}

#[test]
fn sorting_is_a_view_transform_only() {
    let mut state = ViewState::<Worker>::new(1, 10);
    let (next, effects) = update(
        state.clone(),
        Msg::SortChanged(Some(SortDescriptor::descending("worker_id"))),
    );
    assert!(effects.is_empty());
    assert_eq!(next.window(), state.window());
    assert!(!state.consume_dirty());

    let (next, effects) = update(next, Msg::SortColumnClicked("worker_id".to_string()));
    assert!(effects.is_empty());
    assert_eq!(next.sort(), Some(&SortDescriptor::ascending("worker_id")));

    let (next, _) = update(next, Msg::SortColumnClicked("worker_id".to_string()));
    assert_eq!(next.sort().map(|sort| sort.direction), Some(SortDirection::Descending));

    let (next, _) = update(next, Msg::SortColumnClicked("worker_id".to_string()));
    assert_eq!(next.sort(), None);
}

#[test]
fn view_rows_are_projected_but_window_keeps_arrival_order() {
    let (state, _) = update(ViewState::<Job>::new(1, 10), Msg::Mounted);
    let generation = state.generation();
    let (state, _) = update(state, Msg::SessionOpened { generation });
    let (state, _) = update(
        state,
        Msg::FrameReceived {
            generation,
            text: json!({"type": "JOB_INIT", "payload": {"data": [
                {"job_id": "b", "status": "running"},
                {"job_id": "a", "status": "completed"},
                {"job_id": "c"},
            ]}})
            .to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::SortChanged(Some(SortDescriptor::ascending("status"))),
    );

    let view = state.view();
    let shown: Vec<_> = view.rows.iter().filter_map(|job| job.job_id.as_deref()).collect();
    let held: Vec<_> = state
        .window()
        .records()
        .iter()
        .filter_map(|job| job.job_id.as_deref())
        .collect();

    assert_eq!(shown, vec!["a", "b", "c"]);
    assert_eq!(held, vec!["b", "a", "c"]);
}
