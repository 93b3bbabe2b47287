use std::io::Write;
use std::time::Duration;

use listrev_core::{Command, ModuleStats};
use listrev_modules::ModuleRegistry;
use listrev_runtime::{AppConfig, Application, ModuleStatus};
use serde_json::json;

fn fast_pipeline() -> AppConfig {
    AppConfig::new()
        .with_queue("original", 10)
        .with_queue("to_reverser", 10)
        .with_queue("reversed", 10)
        .with_module(
            "rdlg",
            "RandomDataListGenerator",
            json!({
                "outputs": ["original", "to_reverser"],
                "nIntsPerList": 6,
                "waitBetweenSendsMsec": 5,
                "queueTimeoutMsec": 20,
                "seed": 42
            }),
        )
        .with_module(
            "lr",
            "ListReverser",
            json!({"input": "to_reverser", "output": "reversed", "queueTimeoutMsec": 20}),
        )
        .with_module(
            "rlv",
            "ReversedListValidator",
            json!({
                "reversed_data_input": "reversed",
                "original_data_input": "original",
                "queueTimeoutMsec": 20
            }),
        )
}

fn stats_of<'a>(stats: &'a [(String, ModuleStats)], module: &str) -> &'a ModuleStats {
    &stats.iter().find(|(name, _)| name == module).unwrap().1
}

#[actix::test]
async fn test_pipeline_has_no_mismatches() {
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = ModuleRegistry::with_builtin_modules();
    let app = Application::build(&fast_pipeline(), &registry).unwrap();
    app.init().await.unwrap();
    app.run_for(Duration::from_millis(300)).await.unwrap();

    let statuses = app.status().await.unwrap();
    assert!(statuses.iter().all(|(_, s)| *s == ModuleStatus::Stopped));

    let stats = app.stats().await.unwrap();
    let generator = stats_of(&stats, "rdlg");
    let reverser = stats_of(&stats, "lr");
    let validator = stats_of(&stats, "rlv");

    assert!(generator.get("generated") > 0);
    assert!(reverser.get("received") <= generator.get("generated"));
    assert!(validator.get("compared") > 0);
    assert!(validator.get("compared") <= validator.get("received"));
    assert_eq!(validator.get("mismatches"), 0);
}

#[actix::test]
async fn test_skipping_the_reverser_produces_mismatches() {
    let config = AppConfig::new()
        .with_queue("original", 10)
        .with_queue("reversed", 10)
        .with_module(
            "rdlg",
            "RandomDataListGenerator",
            json!({
                "outputs": ["original", "reversed"],
                "nIntsPerList": 4,
                "waitBetweenSendsMsec": 5,
                "queueTimeoutMsec": 20,
                "seed": 7
            }),
        )
        .with_module(
            "rlv",
            "ReversedListValidator",
            json!({
                "reversed_data_input": "reversed",
                "original_data_input": "original",
                "queueTimeoutMsec": 20
            }),
        );

    let app = Application::build(&config, &ModuleRegistry::with_builtin_modules()).unwrap();
    app.init().await.unwrap();
    app.run_for(Duration::from_millis(300)).await.unwrap();

    let stats = app.stats().await.unwrap();
    let validator = stats_of(&stats, "rlv");
    assert!(validator.get("compared") > 0);
    assert!(validator.get("mismatches") > 0);
}

#[actix::test]
async fn test_restart_keeps_lists_paired() {
    let registry = ModuleRegistry::with_builtin_modules();
    let app = Application::build(&fast_pipeline(), &registry).unwrap();
    app.init().await.unwrap();
    app.run_for(Duration::from_millis(100)).await.unwrap();

    app.command(Command::Start).await.unwrap();
    let statuses = app.status().await.unwrap();
    assert!(statuses.iter().all(|(_, s)| *s == ModuleStatus::Running));
    actix_rt::time::sleep(Duration::from_millis(200)).await;
    app.command(Command::Stop).await.unwrap();
    assert!(app.command(Command::Stop).await.is_err());

    let stats = app.stats().await.unwrap();
    let validator = stats_of(&stats, "rlv");
    assert!(validator.get("compared") > 0);
    assert_eq!(validator.get("mismatches"), 0);
}

#[actix::test]
async fn test_init_with_missing_queue_fails() {
    let config = AppConfig::new()
        .with_queue("in", 4)
        .with_module("lr", "ListReverser", json!({"input": "in", "output": "nowhere"}));

    let app = Application::build(&config, &ModuleRegistry::with_builtin_modules()).unwrap();
    let err = app.init().await.unwrap_err();
    assert!(matches!(err, listrev_core::Error::QueueNotFound(q) if q == "nowhere"));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string_pretty(&fast_pipeline()).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let loaded = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(loaded, fast_pipeline());

    let missing = AppConfig::from_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(listrev_core::Error::IO(_))));
}

#[test]
fn test_shipped_config_matches_reference() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/listrev_app.json");
    assert_eq!(AppConfig::from_file(path).unwrap(), AppConfig::reference());
}
