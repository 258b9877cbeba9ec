//! Auto-detection through the configuration facade.
//!
//! Drives a `Config` with a `StaticProbe` the way the operator does at
//! startup: register callbacks, start detection, watch the environment
//! change underneath.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use agentop_autodetect::{AutodetectError, StaticProbe};
use agentop_config::{Config, ConfigBuilder};
use agentop_core::{AutoscalingVersion, DetectedState, OperatorSettings, RoutesAvailability};

fn test_config(probe: &Arc<StaticProbe>) -> Config {
    ConfigBuilder::new()
        .with_probe(probe.clone())
        .with_auto_detect_frequency(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn record_changes(config: &Config) -> Arc<Mutex<Vec<RoutesAvailability>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let for_callback = Arc::clone(&seen);
    let observed = config.clone();
    config.register_routes_change_callback(move || {
        for_callback.lock().unwrap().push(observed.routes());
        Ok(())
    });
    seen
}

#[tokio::test]
async fn routes_appear_then_stay() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::Available,
        AutoscalingVersion::V1,
    ));
    let config = test_config(&probe);
    let seen = record_changes(&config);

    assert_eq!(config.detected(), DetectedState::default());

    config.auto_detect().await.unwrap();
    assert_eq!(config.routes(), RoutesAvailability::Available);
    assert_eq!(config.autoscaling_version(), AutoscalingVersion::V1);
    assert_eq!(*seen.lock().unwrap(), vec![RoutesAvailability::Available]);

    config.auto_detect().await.unwrap();
    assert_eq!(config.routes(), RoutesAvailability::Available);
    assert_eq!(config.autoscaling_version(), AutoscalingVersion::V1);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn callback_failure_is_not_a_detection_failure() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::Available,
        AutoscalingVersion::V2,
    ));
    let config = test_config(&probe);
    config.register_routes_change_callback(|| anyhow::bail!("route controller not ready"));
    let seen = record_changes(&config);

    config.auto_detect().await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![RoutesAvailability::Available]);
}

#[tokio::test]
async fn partial_pass_keeps_routes_change() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::Available,
        AutoscalingVersion::V1,
    ));
    probe.fail_autoscaling("autoscaling discovery timed out");
    let config = test_config(&probe);

    let err = config.auto_detect().await.unwrap_err();
    assert!(matches!(err, AutodetectError::AutoscalingProbe(_)));
    assert_eq!(config.routes(), RoutesAvailability::Available);
    assert_eq!(config.autoscaling_version(), AutoscalingVersion::V2);
}

#[tokio::test(start_paused = true)]
async fn background_detection_follows_the_environment() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::NotAvailable,
        AutoscalingVersion::V2,
    ));
    let config = test_config(&probe);
    let seen = record_changes(&config);

    let (handle, first_pass) = config.start_auto_detect().await;
    first_pass.unwrap();
    assert!(seen.lock().unwrap().is_empty());

    probe.set_routes(RoutesAvailability::Available);
    probe.set_autoscaling_version(AutoscalingVersion::V2Beta2);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(config.routes(), RoutesAvailability::Available);
    assert_eq!(config.autoscaling_version(), AutoscalingVersion::V2Beta2);

    probe.set_routes(RoutesAvailability::NotAvailable);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![RoutesAvailability::Available, RoutesAvailability::NotAvailable]
    );

    handle.shutdown().await;
    probe.set_routes(RoutesAvailability::Available);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(config.routes(), RoutesAvailability::NotAvailable);
}

#[tokio::test(start_paused = true)]
async fn first_pass_error_reaches_the_caller() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::Available,
        AutoscalingVersion::V2,
    ));
    probe.fail_routes("api server unreachable");
    let config = test_config(&probe);

    let (handle, first_pass) = config.start_auto_detect().await;
    let err = first_pass.unwrap_err();
    assert_eq!(
        err.to_string(),
        "routes availability probe failed: api server unreachable"
    );

    probe.set_routes(RoutesAvailability::Available);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(config.routes(), RoutesAvailability::Available);

    handle.shutdown().await;
}

#[test]
fn settings_file_feeds_the_builder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agentop.toml");
    std::fs::write(
        &path,
        r#"
labels_filter = ["kubectl.kubernetes.io/*"]

[autodetect]
interval = "1m"

[images]
python = "newrelic/newrelic-python-init:latest"
"#,
    )
    .unwrap();

    let settings = OperatorSettings::from_file(&path).unwrap();
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::Unknown,
        AutoscalingVersion::Unknown,
    ));
    let config = ConfigBuilder::new()
        .with_probe(probe)
        .with_settings(&settings)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.auto_detect_frequency(), Duration::from_secs(60));
    assert_eq!(
        config.auto_instrumentation_python_image(),
        "newrelic/newrelic-python-init:latest"
    );
    assert!(config.is_label_filtered("kubectl.kubernetes.io/last-applied-configuration"));
    assert!(!config.is_label_filtered("app"));
}

#[tokio::test(start_paused = true)]
async fn each_start_runs_its_own_loop() {
    let probe = Arc::new(StaticProbe::new(
        RoutesAvailability::NotAvailable,
        AutoscalingVersion::V2,
    ));
    let config = test_config(&probe);

    let (first, _) = config.start_auto_detect().await;
    let (second, _) = config.start_auto_detect().await;
    assert_eq!(probe.routes_calls(), 2);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(probe.routes_calls(), 4);

    first.shutdown().await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.routes_calls(), 5);

    second.shutdown().await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(probe.routes_calls(), 5);
}
