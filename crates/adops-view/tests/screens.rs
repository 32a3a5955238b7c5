use adops_model::{DeliveryLine, ExportFormat};
use adops_query::AggregateScope;
use adops_view::{screen_catalog, ScreenKind, ScreenPreset, ViewConfig, ViewModel};

#[test]
fn every_preset_compiles_against_its_registry() {
    let catalog = screen_catalog().expect("catalog");
    assert_eq!(catalog.len(), ScreenKind::ALL.len());
    for info in &catalog {
        assert_eq!(info.default_sort.as_deref(), Some("id:desc"), "{}", info.screen);
        assert!(!info.aggregates.is_empty(), "{} has no stat cards", info.screen);
        assert!(info.fields.iter().any(|f| f.searchable), "{}", info.screen);
    }
    for kind in ScreenKind::ALL {
        let parsed: ScreenKind = kind.as_str().parse().expect("round trip");
        assert_eq!(parsed, kind);
    }
}

#[test]
fn screen_names_accept_aliases_and_reject_strangers() {
    assert_eq!("HUR".parse::<ScreenKind>().ok(), Some(ScreenKind::UpdateRequests));
    assert_eq!("delivery".parse::<ScreenKind>().ok(), Some(ScreenKind::Delivery));
    assert!("billing".parse::<ScreenKind>().is_err());
}

#[test]
fn presets_aggregate_over_the_filtered_rows() {
    for kind in ScreenKind::ALL {
        let info = kind.info().expect("info");
        assert!(!info.aggregates.is_empty());
    }
    let query = DeliveryLine::default_query();
    assert!(query
        .aggregates
        .iter()
        .all(|a| a.scope == AggregateScope::Filtered));
}

#[test]
fn delivery_rate_is_guarded_against_unbooked_lines() {
    let lines: Vec<DeliveryLine> = serde_json::from_value(serde_json::json!([
        {"id": "d1", "campaign": "Spring", "publisher": "Daily", "ad_format": "Banner",
         "booked_impressions": 1000, "delivered_impressions": 900, "revenue": 12.5,
         "delivery_date": "2024-03-01", "status": "Under Delivering"},
        {"id": "d2", "campaign": "Summer", "publisher": "Daily", "ad_format": "Video",
         "booked_impressions": 0, "delivered_impressions": 0, "revenue": 0,
         "delivery_date": "2024-03-02", "status": "On Track"}
    ]))
    .expect("lines");
    let mut view = ViewModel::<DeliveryLine>::for_screen(ViewConfig::immediate()).expect("view");
    view.replace_records(lines).expect("records");
    assert_eq!(view.aggregate("delivery_rate"), Some(90.0));
    assert_eq!(view.aggregate("under_delivering"), Some(1.0));
    assert_eq!(view.aggregate("revenue"), Some(12.5));
    assert!(!view.has_computation_error());

    let batch = view.export(ExportFormat::Excel).expect("export");
    assert_eq!(batch.file_name().split('.').last(), Some("xlsx"));
}
