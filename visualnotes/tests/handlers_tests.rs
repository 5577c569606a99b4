use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use visualnotes::handlers::*;
use visualnotes_core::{Level, LayoutConfig, ReportFormat};
use visualnotes_enrich::EnrichConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(input: PathBuf) -> GenerateOptions {
    GenerateOptions {
        input: Some(input),
        output: None,
        format: ReportFormat::Json,
        images: false,
        trivia: false,
        timeout: None,
        threads: None,
        config: None,
        quiet: true,
    }
}

fn notes_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", text).unwrap();
    file
}

#[test]
fn test_load_notes_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let file = notes_file("Biology: cells\n");
    let text = load_notes_from_file(file.path())?;
    assert_eq!(text, "Biology: cells\n");
    Ok(())
}

#[test]
fn test_load_notes_missing_file() {
    let err = load_notes_from_file(std::path::Path::new("/definitely/not/here.txt")).unwrap_err();
    assert!(err.to_string().contains("Failed to read notes file"));
}

#[test]
fn test_read_notes_from_reader() {
    let text = read_notes("a, b, c".as_bytes()).unwrap();
    assert_eq!(text, "a, b, c");
}

#[test]
fn test_example_notes_parse() {
    let forest = parse_notes(EXAMPLE_NOTES).unwrap();
    assert_eq!(forest.root_count(), 5);
}

#[test]
fn test_unparseable_notes_are_rejected() {
    let err = build_map("   \n\n", LayoutConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), PARSE_FAILURE);

    let err = parse_notes("1. orphan subtopic").unwrap_err();
    assert_eq!(err.to_string(), "Could not parse text. Check format.");
}

#[test]
fn test_build_map_rejects_invalid_config() {
    let config = LayoutConfig {
        columns: [600.0, 300.0, 100.0],
        ..LayoutConfig::default()
    };
    assert!(build_map("Topic: one, two", config).is_err());
}

#[test]
fn test_load_layout_config() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", json!({ "max_label_len": 10, "row_height": 300.0 }))?;

    let config = load_layout_config(Some(&file.path().to_path_buf()))?;
    assert_eq!(config.max_label_len, 10);
    assert_eq!(config.row_height, 300.0);
    assert_eq!(config.columns, LayoutConfig::default().columns);

    assert_eq!(load_layout_config(None)?, LayoutConfig::default());
    Ok(())
}

#[test]
fn test_write_output_creates_directories() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let target = dir.path().join("reports/nested/map.md");

    let written = write_output("# Mind map\n", target.to_str())?;
    assert_eq!(written.as_deref(), Some(target.as_path()));
    assert_eq!(std::fs::read_to_string(&target)?, "# Mind map\n");

    assert_eq!(write_output("ignored", None)?, None);
    Ok(())
}

#[test]
fn test_enrich_config_keeps_environment_values_unless_overridden() {
    let base = EnrichConfig {
        timeout: Duration::from_secs(12),
        concurrency: 4,
        ..EnrichConfig::default()
    };

    let unset = options(PathBuf::from("-")).enrich_config(base.clone());
    assert_eq!(unset.timeout, Duration::from_secs(12));
    assert_eq!(unset.concurrency, 4);

    let mut opts = options(PathBuf::from("-"));
    opts.timeout = Some(Duration::from_secs(2));
    let partial = opts.enrich_config(base.clone());
    assert_eq!(partial.timeout, Duration::from_secs(2));
    assert_eq!(partial.concurrency, 4);

    opts.threads = Some(7);
    assert_eq!(opts.enrich_config(base).concurrency, 7);
}

#[tokio::test]
async fn test_run_generate_json() {
    let file = notes_file("Biology: cells, genetics\n1. Evolution: natural selection, drift\n");
    let report = run_generate(&options(file.path().to_path_buf())).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 6);
    assert_eq!(nodes[0]["label"], "Biology");
    assert_eq!(nodes[0]["level"], Level::Topic.as_u8());
    assert_eq!(nodes[3]["label"], "Evolution");
    assert_eq!(nodes[4]["parentId"], nodes[3]["id"]);
}

#[tokio::test]
async fn test_run_generate_uses_layout_config() {
    let notes = notes_file("Photosynthesis and cellular respiration: chloroplasts");
    let mut config = NamedTempFile::new().unwrap();
    write!(config, "{}", json!({ "max_label_len": 5 })).unwrap();

    let mut opts = options(notes.path().to_path_buf());
    opts.config = Some(config.path().to_path_buf());
    opts.format = ReportFormat::Csv;

    let report = run_generate(&opts).await.unwrap();
    assert!(report.contains("Photo..."));
    assert!(report.contains("Photosynthesis and cellular respiration"));
}

#[tokio::test]
async fn test_enrich_map_with_images() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "urls": { "small": "https://img.test/card.jpg" } }]
        })))
        .mount(&server)
        .await;

    let config = EnrichConfig {
        unsplash_access_key: Some("key".to_string()),
        unsplash_api_url: server.uri(),
        ..EnrichConfig::default()
    };
    let map = build_map("Cells, Atoms, Stars", LayoutConfig::default()).unwrap();

    let mut opts = options(PathBuf::from("-"));
    opts.images = true;

    let (map, summary) = enrich_map(map, &opts, &config, None).await.unwrap();
    assert_eq!(summary.images_found, 3);
    assert!(map
        .nodes()
        .iter()
        .all(|node| node.image.as_deref() == Some("https://img.test/card.jpg")));
}

#[tokio::test]
async fn test_trivia_without_key_is_skipped() {
    let map = build_map("Cells, Atoms", LayoutConfig::default()).unwrap();
    let mut opts = options(PathBuf::from("-"));
    opts.trivia = true;

    let (map, summary) = enrich_map(map, &opts, &EnrichConfig::default(), None)
        .await
        .unwrap();
    assert_eq!(summary.trivia_found, 0);
    assert!(map.nodes().iter().all(|node| node.trivia.is_none()));
}
