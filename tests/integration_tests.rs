mod common;

use common::{config, station_page, write_yearbook};
use dsi_flow_etl::domain::model::{Metric, Month, RunReport};
use dsi_flow_etl::extract::csv_codec::read_records;
use dsi_flow_etl::{DsiPipeline, EtlEngine, EtlError, LocalStorage, YearbookTextLoader};
use tempfile::TempDir;

fn engine_for(
    config: dsi_flow_etl::CliConfig,
) -> EtlEngine<DsiPipeline<LocalStorage, dsi_flow_etl::CliConfig, YearbookTextLoader>> {
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = DsiPipeline::new(storage, config, YearbookTextLoader::new()).unwrap();
    EtlEngine::new_with_monitoring(pipeline, false)
}

#[tokio::test]
async fn test_end_to_end_extraction_from_text_yearbooks() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_yearbook(
        input.path(),
        2005,
        &[
            "DEVLET SU İŞLERİ GENEL MÜDÜRLÜĞÜ\nAKIM GÖZLEM YILLIĞI 2005".to_string(),
            station_page("D22A093", "TURNASUYU CUMHURİYET KÖYÜ", 2005, "4,87", 1.0),
            station_page("D14A011", "YEŞİLIRMAK DURUÇAY", 2005, "9,10", 1.0),
            station_page("E22A054", "HARŞİT ÇAYI KÜRTÜN", 2005, "2,15", 0.5),
        ],
    );
    write_yearbook(
        input.path(),
        2006,
        &[station_page("D22A093", "TURNASUYU CUMHURİYET KÖYÜ", 2006, "5,02", 1.1)],
    );

    let engine = engine_for(config(input.path(), output.path()));
    let output_file = engine.run().await.unwrap();
    assert!(output_file.ends_with("records.csv"));

    let csv_path = output.path().join("records.csv");
    let records = read_records(std::fs::File::open(&csv_path).unwrap()).unwrap();

    let keys: Vec<(String, i32)> = records
        .iter()
        .map(|r| (r.station_code.to_string(), r.year))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("D22A093".to_string(), 2005),
            ("D22A093".to_string(), 2006),
            ("E22A054".to_string(), 2005),
        ]
    );

    let first = &records[0];
    assert_eq!(first.station_name, "TURNASUYU CUMHURİYET KÖYÜ");
    assert_eq!(first.catchment_area_km2, Some(210.0));
    assert_eq!(first.elevation_m, Some(404.0));
    assert_eq!(first.annual_avg_flow_m3s, Some(4.87));
    assert_eq!(first.annual_total_flow_million_m3, Some(153.6));
    assert_eq!(first.source_file.as_deref(), Some("dsi_2005.txt"));
    assert_eq!(first.page, Some(2));
    assert_eq!(first.monthly.get(Metric::FlowMax, Month::Oct), Some(3.0));
    assert_eq!(first.monthly.get(Metric::VolumeMilM3, Month::Sep), Some(24.0));
    assert_eq!(first.monthly.present_count(), 72);
    assert_eq!(records[1].annual_avg_flow_m3s, Some(5.02));

    let report: RunReport = serde_json::from_slice(
        &std::fs::read(output.path().join("records_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report.files_processed, vec!["dsi_2005.txt", "dsi_2006.txt"]);
    assert_eq!(report.pages_scanned, 5);
    assert_eq!(report.records_per_year.get(&2005), Some(&2));
    assert_eq!(
        report.missing_stations.get(&2006),
        Some(&vec!["E22A054".to_string()])
    );
}

#[tokio::test]
async fn test_explicit_years_select_yearbooks() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for year in [2005, 2006] {
        write_yearbook(
            input.path(),
            year,
            &[station_page("D22A093", "TURNASUYU", year, "4,87", 1.0)],
        );
    }

    let mut config = config(input.path(), output.path());
    config.years = vec![2006];
    engine_for(config).run().await.unwrap();

    let records =
        read_records(std::fs::File::open(output.path().join("records.csv")).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].year, 2006);
}

#[tokio::test]
async fn test_missing_yearbook_is_input_not_found() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut config = config(input.path(), output.path());
    config.years = vec![2010];
    let result = engine_for(config).run().await;

    match result {
        Err(EtlError::InputNotFound { path }) => assert!(path.ends_with("dsi_2010.pdf")),
        other => panic!("expected InputNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_target_pages_writes_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_yearbook(
        input.path(),
        2005,
        &[station_page("D14A011", "YEŞİLIRMAK DURUÇAY", 2005, "9,10", 1.0)],
    );

    let result = engine_for(config(input.path(), output.path())).run().await;

    let err = result.unwrap_err();
    assert!(matches!(err, EtlError::NoRecords { .. }));
    assert_eq!(err.exit_code(), 0);
    assert!(!output.path().join("records.csv").exists());
}

#[tokio::test]
async fn test_duplicate_station_pages_keep_the_most_complete() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_yearbook(
        input.path(),
        2005,
        &[
            "D22A093 TURNASUYU (devam)\nMaks. 1,0".to_string(),
            station_page("D22A093", "TURNASUYU", 2005, "4,87", 1.0),
        ],
    );

    engine_for(config(input.path(), output.path())).run().await.unwrap();

    let records =
        read_records(std::fs::File::open(output.path().join("records.csv")).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page, Some(2));

    let report: RunReport = serde_json::from_slice(
        &std::fs::read(output.path().join("records_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report.duplicates_dropped, 1);
}

#[tokio::test]
async fn test_post_processing_through_the_pipeline() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_yearbook(
        input.path(),
        2005,
        &[station_page("D22A093", "TURNASUYU", 2005, "4,87", 1.0)],
    );
    write_yearbook(
        input.path(),
        2006,
        &["D22A093 TURNASUYU\nYAĞIŞ ALANI : 210,00 km2\nMaks. 2,0".to_string()],
    );

    let mut config = config(input.path(), output.path());
    config.annual_averages = true;
    config.fill_gaps = true;
    config.reference_lat = Some(40.0);
    config.reference_lon = Some(37.88611111111111);
    engine_for(config).run().await.unwrap();

    let csv = std::fs::read_to_string(output.path().join("records.csv")).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.ends_with("annual_average_mil_m3,distance_km"));

    let records = read_records(csv.as_bytes()).unwrap();
    // 2006 had no annual flow line: carried from 2005.
    assert_eq!(records[1].annual_avg_flow_m3s, Some(4.87));
    // Oct max from its own page, Nov max carried from 2005.
    assert_eq!(records[1].monthly.get(Metric::FlowMax, Month::Oct), Some(2.0));
    assert_eq!(records[1].monthly.get(Metric::FlowMax, Month::Nov), Some(6.0));

    let averages = records[0].annual_averages.unwrap();
    assert_eq!(averages[Metric::FlowAvg.index()], Some(6.5));
    // Due north of the reference point by 58'20".
    let distance = records[0].distance_km.unwrap();
    assert!((distance - 108.11).abs() < 0.02, "{}", distance);
    // Coordinates are not gap-filled, so the 2006 page has no distance.
    assert_eq!(records[1].distance_km, None);
}

#[tokio::test]
async fn test_unreadable_yearbooks_fail_the_run() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::fs::write(input.path().join("dsi_2005.pdf"), b"not a pdf at all").unwrap();

    let err = engine_for(config(input.path(), output.path()))
        .run()
        .await
        .unwrap_err();

    assert!(!matches!(err, EtlError::NoRecords { .. }), "{:?}", err);
    assert_ne!(err.exit_code(), 0);
    assert!(!output.path().join("records.csv").exists());
}
