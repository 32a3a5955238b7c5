use std::sync::Arc;
use std::time::Duration;

use adops_core::RecordId;
use adops_model::{ApprovalStatus, Campaign, Organization};
use adops_query::FilterSpec;
use adops_view::{
    ActionError, Approve, CompletionReport, FakeSource, Phase, RecordAction, TaskKind, ViewConfig,
    ViewErrorCode, ViewModel,
};

fn campaign(id: &str) -> Campaign {
    serde_json::from_value(serde_json::json!({
        "id": id, "name": "Spring", "advertiser": "Acme", "publisher": "Daily News",
        "status": "Active", "budget": 100.0, "start_date": "2024-01-01",
        "end_date": "2024-02-01"
    }))
    .expect("campaign")
}

fn pending_org(id: &str) -> Organization {
    serde_json::from_value(serde_json::json!({
        "id": id, "name": "Northwind", "org_type": "Publisher", "country": "DE",
        "contact_email": "ops@example.com", "status": "Pending",
        "registered_at": "2024-04-01"
    }))
    .expect("organization")
}

#[tokio::test(start_paused = true)]
async fn unmount_aborts_a_pending_load() {
    let source = Arc::new(FakeSource::new(vec![campaign("c1")]));
    let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");
    view.start_load(source.clone()).expect("start");
    assert_eq!(view.pending_tasks(), 1);

    view.unmount();
    assert_eq!(view.phase(), Phase::Unmounted);
    assert_eq!(view.pending_tasks(), 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(source.calls(), 0, "load ran after unmount");
    assert_eq!(view.next_completion().await, None);
    assert!(view.records().is_empty());

    let err = view
        .set_filter(FilterSpec::search("spring"))
        .expect_err("unmounted");
    assert_eq!(err.code, ViewErrorCode::Unmounted);
    let err = view.start_load(source.clone()).expect_err("unmounted");
    assert_eq!(err.code, ViewErrorCode::Unmounted);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_view_aborts_its_tasks() {
    let source = Arc::new(FakeSource::new(vec![campaign("c1")]));
    {
        let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");
        view.start_load(source.clone()).expect("start");
    }
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn a_newer_load_supersedes_the_older_one() {
    let older = Arc::new(FakeSource::new(vec![campaign("old")]));
    let newer = Arc::new(FakeSource::new(vec![campaign("new-1"), campaign("new-2")]));
    let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");

    view.start_load(older.clone()).expect("older");
    view.start_load(newer.clone()).expect("newer");
    assert_eq!(view.pending_tasks(), 1);

    assert_eq!(
        view.next_completion().await,
        Some(CompletionReport::Applied(TaskKind::Load))
    );
    assert_eq!(older.calls(), 0);
    assert_eq!(newer.calls(), 1);
    assert_eq!(view.visible_len(), 2);
    assert_eq!(view.next_completion().await, None);
}

#[tokio::test(start_paused = true)]
async fn action_results_against_replaced_records_are_discarded() {
    let mut view = ViewModel::<Organization>::for_screen(ViewConfig::default()).expect("view");
    view.replace_records(vec![pending_org("o1")]).expect("records");
    view.start_action(Approve {
        id: RecordId::new("o1").expect("id"),
    })
    .expect("approve");

    view.replace_records(vec![pending_org("o1"), pending_org("o2")])
        .expect("replacement");
    assert_eq!(
        view.next_completion().await,
        Some(CompletionReport::Stale(TaskKind::Action))
    );
    assert_eq!(view.records().len(), 2);
    assert!(view
        .records()
        .iter()
        .all(|o| o.status == ApprovalStatus::Pending));
}

#[tokio::test(start_paused = true)]
async fn loads_started_before_a_replacement_are_discarded() {
    let source = Arc::new(FakeSource::new(vec![campaign("1")]));
    let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");
    view.start_load(source.clone()).expect("start");

    view.replace_records(vec![campaign("7"), campaign("8")])
        .expect("replacement");
    assert_eq!(
        view.next_completion().await,
        Some(CompletionReport::Stale(TaskKind::Load))
    );
    assert_eq!(source.calls(), 1);
    let ids: Vec<String> = view
        .visible_records()
        .iter()
        .map(|c| c.id.to_string())
        .collect();
    assert_eq!(ids, vec!["8", "7"]);
    assert!(view.last_error().is_none());
    assert_eq!(view.next_completion().await, None);
}

struct Explode;

impl RecordAction<Organization> for Explode {
    fn name(&self) -> &str {
        "explode"
    }

    fn apply(&self, _records: &[Organization]) -> Result<Vec<Organization>, ActionError> {
        panic!("action bug");
    }
}

#[tokio::test(start_paused = true)]
async fn a_panicking_action_reports_failure_instead_of_hanging() {
    let mut view = ViewModel::<Organization>::for_screen(ViewConfig::default()).expect("view");
    view.replace_records(vec![pending_org("o1")]).expect("records");
    view.start_action(Explode).expect("start");

    match view.next_completion().await {
        Some(CompletionReport::Failed(TaskKind::Action, err)) => {
            assert_eq!(err.code, ViewErrorCode::Action);
            assert!(err.retryable);
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(view.pending_tasks(), 0);
    assert!(view.last_error().is_some());
    assert_eq!(view.records().len(), 1);
    assert_eq!(view.next_completion().await, None);
}

#[tokio::test(start_paused = true)]
async fn slow_sources_time_out() {
    let source = Arc::new(FakeSource::new(vec![campaign("c1")]).slow(Duration::from_secs(60)));
    let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");
    view.start_load(source.clone()).expect("start");

    match view.next_completion().await {
        Some(CompletionReport::Failed(TaskKind::Load, err)) => {
            assert_eq!(err.code, ViewErrorCode::Timeout);
            assert!(err.retryable);
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(source.calls(), 1);
    assert_eq!(view.phase(), Phase::Loading);
}

#[tokio::test(start_paused = true)]
async fn nothing_lands_before_the_simulated_latency() {
    let source = Arc::new(FakeSource::new(vec![campaign("c1")]));
    let mut view = ViewModel::<Campaign>::for_screen(ViewConfig::default()).expect("view");
    view.start_load(source.clone()).expect("start");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(view.drain_completions().is_empty());
    assert_eq!(view.phase(), Phase::Loading);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(
        view.drain_completions(),
        vec![CompletionReport::Applied(TaskKind::Load)]
    );
    assert!(view.is_ready());
}
