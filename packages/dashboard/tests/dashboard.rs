use survey_map_dashboard::{Dashboard, DashboardConfig, DashboardError};
use survey_map_spatial::GeoJsonRenderer;
use survey_map_tabular_models::{Sheet, Workbook};
use survey_map_ward::{WardError, WardRegistry};

const THREE_WARDS: &str = r#"
    name = "test"

    [[wards]]
    index = 1
    name = "Sirpur"
    latitude = 22.70
    longitude = 75.81

    [[wards]]
    index = 2
    name = "Vrindavan"
    latitude = 22.72
    longitude = 75.86

    [[wards]]
    index = 3
    name = "Banganga"
    latitude = 22.75
    longitude = 75.84
"#;

const SURVEYS: &str = r#"{
    "success": true,
    "surveys": [
        {
            "id": "SUR1",
            "ward_no": 1,
            "survey_date": "2025-01-10",
            "coordinates": {"latitude": 22.701, "longitude": 75.811},
            "status": "completed",
            "violations": [{"type": "height_violation", "severity": "high"}]
        },
        {
            "id": "SUR2",
            "ward_no": 2,
            "survey_date": "2025-01-11",
            "coordinates": {"latitude": 22.721, "longitude": 75.861},
            "status": "pending",
            "violations": []
        },
        {"ward_no": 3}
    ]
}"#;

fn dashboard() -> Dashboard {
    let registry = WardRegistry::from_toml_str(THREE_WARDS).unwrap();
    let mut dashboard = Dashboard::with_registry(registry, DashboardConfig::default());
    dashboard.ingest_json(SURVEYS).unwrap();
    dashboard
}

#[test]
fn three_ward_scenario() {
    let dashboard = dashboard();
    assert_eq!(dashboard.records().len(), 2);
    assert_eq!(dashboard.malformed().len(), 1);

    let stats = dashboard.get_aggregate_stats();
    assert_eq!(stats.total_surveys, 3, "the record without an id still counts");
    assert_eq!(stats.completed_surveys, 1);
    assert_eq!(stats.pending_surveys, 1);
    assert_eq!(stats.total_violations, 1);
    assert_eq!(stats.violations_by_severity.high, 1);
    assert_eq!(stats.compliance_rate, 67);

    let markers = dashboard.get_marker_set(None).unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers.markers[0].ward_no, 1);

    assert!(dashboard.get_marker_set(Some(2)).unwrap().is_empty());
    assert!(matches!(
        dashboard.get_marker_set(Some(4)),
        Err(DashboardError::Ward(WardError::NotFound { .. }))
    ));
}

#[test]
fn resolves_wards_through_the_facade() {
    let dashboard = dashboard();
    assert_eq!(dashboard.resolve_ward(None, Some("SIRPUR")).unwrap().number, 1);
    assert!(dashboard.resolve_ward(Some(0), None).is_err());
    assert!(dashboard.resolve_ward(Some(4), None).is_err());
}

#[test]
fn map_layers_follow_the_snapshot() {
    let dashboard = dashboard();

    let bounds = dashboard.fit_bounds(None).unwrap().unwrap();
    assert!(bounds.is_degenerate());
    assert_eq!(dashboard.fit_bounds(Some(3)).unwrap(), None);

    let heat = dashboard.heat_layer(None).unwrap();
    assert_eq!(heat.len(), 1);
    assert!((heat[0].weight - 1.0).abs() < f64::EPSILON);

    let hint = dashboard.cluster_hint(None, 12).unwrap();
    assert!(hint.clustering_enabled);
    assert_eq!(hint.marker_count, 1);
    assert_eq!(dashboard.clusters(None, 12).unwrap().len(), 1);

    let mut renderer = GeoJsonRenderer::new();
    let drawn = dashboard.render_map(&mut renderer, None).unwrap();
    assert_eq!(drawn.len(), renderer.marker_count());
    assert_eq!(renderer.heat_count(), 1);

    let view = dashboard.reset_view(&mut renderer);
    assert_eq!(view.zoom, 12);
    assert_eq!(renderer.marker_count(), 0);
}

#[test]
fn ward_summaries_rank_worst_first() {
    let summaries = dashboard().ward_summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].ward_no, 1);
    assert_eq!(summaries[0].compliance_rate, 0);
    assert_eq!(summaries[1].compliance_rate, 100);
}

#[test]
fn sheet_browsing_and_export() {
    let mut dashboard = dashboard();
    let names = dashboard.set_workbook(Workbook {
        sheets: vec![
            Sheet {
                name: "Buildings".to_string(),
                rows: vec![
                    vec!["Building".into(), "Ward".into()],
                    vec!["Rajwada".into(), "Sirpur".into()],
                    vec!["Lal Bagh".into(), "Vrindavan".into()],
                ],
            },
            Sheet {
                name: "Roads".to_string(),
                rows: vec![vec!["Road".into()], vec!["MG Road".into()]],
            },
        ],
    });
    assert_eq!(names, vec!["Buildings", "Roads"]);

    assert_eq!(dashboard.load_sheet("Buildings").unwrap().len(), 2);
    assert!(dashboard.toggle_expansion(1).unwrap().is_expanded(1));
    assert_eq!(dashboard.search("vrind").unwrap().visible, vec![1]);

    let export = dashboard.export_filtered("vrind").unwrap();
    assert_eq!(export.filename, "Indore_Data_Buildings.csv");
    assert_eq!(export.content, "\"Building\",\"Ward\"\n\"Lal Bagh\",\"Vrindavan\"");

    assert!(matches!(
        dashboard.export_filtered("atlantis"),
        Err(DashboardError::Tabular(_))
    ));

    dashboard.load_sheet("Roads").unwrap();
    assert!(dashboard.view().expanded.is_empty(), "reload must reset expansion");
    assert!(dashboard.view().search_term.is_empty());
    assert_eq!(dashboard.view().selected_sheet.as_deref(), Some("Roads"));
}

#[test]
fn embedded_catalog_backs_the_default_dashboard() {
    let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
    assert_eq!(dashboard.registry().len(), 158);
    assert_eq!(dashboard.get_aggregate_stats().compliance_rate, 100);
    assert!(dashboard.get_marker_set(None).unwrap().is_empty());
}
