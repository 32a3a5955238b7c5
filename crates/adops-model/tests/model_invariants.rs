use adops_core::RecordId;
use adops_model::{
    ApprovalStatus, Campaign, CampaignStatus, DeliveryLine, DeliveryStatus, FieldKind, FieldRead,
    FieldValue, HasFields, Organization, ReportTemplate, Tabular, UpdateRequest,
};

fn campaign(id: &str, budget: f64, spent: f64, impressions: u64, clicks: u64) -> Campaign {
    Campaign {
        id: RecordId::new(id).expect("id"),
        name: format!("Campaign {id}"),
        advertiser: "Acme".to_string(),
        publisher: "Daily News".to_string(),
        status: CampaignStatus::Active,
        budget,
        spent,
        impressions,
        clicks,
        start_date: "2024-01-01".to_string(),
        end_date: "2024-03-31".to_string(),
        programmatic: false,
    }
}

fn read<R: HasFields>(record: &R, field: &str) -> FieldRead {
    R::field_registry()
        .expect("registry")
        .get(field)
        .map(|d| d.read(record))
        .expect("declared field")
}

#[test]
fn every_screen_registry_builds_and_declares_id() {
    fn check<R: HasFields>() {
        let registry = R::field_registry().expect("registry builds");
        assert!(registry.get("id").is_some(), "{} declares id", R::SCREEN);
        assert!(
            !registry.searchable_fields().is_empty(),
            "{} has a search box",
            R::SCREEN
        );
    }
    check::<Campaign>();
    check::<DeliveryLine>();
    check::<UpdateRequest>();
    check::<Organization>();
    check::<ReportTemplate>();
}

#[test]
fn screen_names_are_distinct() {
    let mut screens = vec![
        Campaign::SCREEN,
        DeliveryLine::SCREEN,
        UpdateRequest::SCREEN,
        Organization::SCREEN,
        ReportTemplate::SCREEN,
    ];
    screens.sort_unstable();
    screens.dedup();
    assert_eq!(screens.len(), 5);
}

#[test]
fn derived_campaign_rates_never_divide_by_zero() {
    let fresh = campaign("c-1", 0.0, 0.0, 0, 0);
    assert_eq!(read(&fresh, "ctr"), FieldRead::number(0.0));
    assert_eq!(read(&fresh, "utilization"), FieldRead::number(0.0));

    let running = campaign("c-2", 200.0, 50.0, 1_000, 25);
    assert_eq!(read(&running, "ctr"), FieldRead::number(2.5));
    assert_eq!(read(&running, "utilization"), FieldRead::number(25.0));
    assert_eq!(running.record_id().as_str(), "c-2");
}

#[test]
fn malformed_campaign_dates_read_malformed_not_missing() {
    let mut broken = campaign("c-3", 10.0, 0.0, 0, 0);
    broken.end_date = "31/03/2024".to_string();
    assert!(read(&broken, "end_date").is_malformed());
    broken.end_date = String::new();
    assert_eq!(read(&broken, "end_date"), FieldRead::Missing);
}

#[test]
fn registry_kinds_match_read_values() {
    let c = campaign("c-4", 100.0, 10.0, 10, 1);
    let registry = Campaign::field_registry().expect("registry");
    for descriptor in registry.fields() {
        if let FieldRead::Value(value) = descriptor.read(&c) {
            assert_eq!(
                value.kind(),
                descriptor.kind(),
                "field {} reads its declared kind",
                descriptor.name()
            );
        }
    }
}

#[test]
fn delivery_status_reads_display_labels() {
    let line: DeliveryLine = serde_json::from_str(
        r#"{"id":"dl-1","campaign":"Spring","publisher":"Daily News","ad_format":"Banner",
            "booked_impressions":1000,"delivered_impressions":1100,"revenue":12.5,
            "delivery_date":"2024-02-01","status":"Over Delivering"}"#,
    )
    .expect("delivery line");
    assert_eq!(line.status, DeliveryStatus::OverDelivering);
    assert_eq!(
        read(&line, "status"),
        FieldRead::Value(FieldValue::Category("Over Delivering".to_string()))
    );
    assert_eq!(read(&line, "pacing"), FieldRead::number(110.0));
}

#[test]
fn update_requests_follow_the_pending_only_rule() {
    let hur: UpdateRequest = serde_json::from_str(
        r#"{"id":"HUR-9","campaign_id":"c-1","requested_by":"lee","field":"budget",
            "old_value":"100","new_value":"150","reason":"upsell","status":"Pending",
            "submitted_at":"2024-02-10T09:30:00Z","urgent":true}"#,
    )
    .expect("update request");
    assert_eq!(
        read(&hur, "submitted_at").value().map(FieldValue::kind),
        Some(FieldKind::Date)
    );

    let approved = hur.approve().expect("approve pending");
    assert_eq!(approved.status, ApprovalStatus::Approved);
    assert!(approved.approve().is_err());

    let rejected = hur.reject("duplicate of HUR-3").expect("reject pending");
    assert_eq!(rejected.decision_note.as_deref(), Some("duplicate of HUR-3"));
    assert!(hur.reject("").is_err());
}
