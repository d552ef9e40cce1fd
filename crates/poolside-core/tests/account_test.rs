// End-to-end tests for the account session: poll loop, entity mapping,
// command dispatch, and the post-command quick poll -- all against
// wiremock stand-ins for the identity provider and the cloud gateway.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use poolside_api::CognitoConfig;
use poolside_core::{
    Account, AccountConfig, Availability, Command, CommandResult, CoreError, EntityValue,
    HeatPumpMode, Setpoint,
};

// ── Helpers ─────────────────────────────────────────────────────────

const QUICK_POLL_DELAY: Duration = Duration::from_millis(100);

fn cognito_ok() -> serde_json::Value {
    json!({
        "AuthenticationResult": {
            "AccessToken": "access-token",
            "IdToken": "id-token",
            "RefreshToken": "refresh-token",
            "ExpiresIn": 3600
        }
    })
}

fn device_body() -> serde_json::Value {
    json!([{
        "id": "LX-0042",
        "sn": "AB1234567",
        "type": "heat_pump",
        "vr": "2.7.1",
        "info": { "name": "Backyard Pool", "family": "Eco Elyo" },
        "connectivity": { "connected": true, "sessionIdentifier": "sess-9", "timestamp": 1700000000000i64 },
        "alarms": []
    }])
}

/// Component state: powered on, mode Off (6), target 28.0 °C, water 26.5 °C.
fn components_body(mode: i64) -> serde_json::Value {
    json!([
        { "id": 13, "reportedValue": 1, "ts": 1700000000000i64 },
        { "id": 14, "reportedValue": mode, "ts": 1700000000000i64 },
        { "id": 15, "reportedValue": 280, "ts": 1700000000000i64 },
        { "id": 19, "reportedValue": 265, "ts": 1700000000000i64 }
    ])
}

async fn start_servers() -> (MockServer, MockServer) {
    let cognito = MockServer::start().await;
    let api = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cognito_ok()))
        .mount(&cognito)
        .await;

    (cognito, api)
}

fn account_for(cognito: &MockServer, api: &MockServer) -> Account {
    let mut config = AccountConfig::new(
        "pool-owner@example.com",
        SecretString::from("hunter2".to_owned()),
    );
    config.base_url = Some(api.uri().parse().unwrap());
    config.cognito = CognitoConfig {
        endpoint: Some(cognito.uri().parse().unwrap()),
        ..CognitoConfig::default()
    };
    config.quick_poll_delay = QUICK_POLL_DELAY;
    Account::new(config)
}

async fn mount_happy_path(api: &MockServer, mode: i64) {
    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body()))
        .mount(api)
        .await;

    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(mode)))
        .mount(api)
        .await;
}

// ── Connect / first snapshot ────────────────────────────────────────

#[tokio::test]
async fn connect_takes_first_snapshot_and_maps_entities() {
    let (cognito, api) = start_servers().await;
    mount_happy_path(&api, 6).await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    assert!(account.availability().is_available());

    let snapshot = account.snapshot().unwrap();
    assert_eq!(snapshot.device_count(), 1);
    let device = snapshot.device("LX-0042").unwrap();
    assert_eq!(device.serial_number.as_deref(), Some("AB1234567"));
    assert_eq!(device.firmware_version.as_deref(), Some("2.7.1"));

    let entities = account.entities();
    let climate = &entities.climate[0];
    assert_eq!(climate.preset, EntityValue::Preset(HeatPumpMode::Off));
    assert_eq!(climate.target_temperature, EntityValue::Number(28.0));
    assert_eq!(climate.water_temperature, EntityValue::Number(26.5));
    assert_eq!(
        entities.entity("LX-0042:connected").unwrap().value,
        EntityValue::Bool(true)
    );

    account.shutdown().await;
}

#[tokio::test]
async fn bad_credentials_fail_connect_and_require_reauth() {
    let cognito = MockServer::start().await;
    let api = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .mount(&cognito)
        .await;

    let account = account_for(&cognito, &api);
    let err = account.connect().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }), "{err}");
    assert_eq!(account.availability(), Availability::ReauthRequired);
    assert!(account.snapshot().is_none());
}

// ── Snapshot retention on failure ───────────────────────────────────

#[tokio::test]
async fn failed_poll_keeps_cached_snapshot_and_flips_availability() {
    let (cognito, api) = start_servers().await;

    // The first device fetch succeeds; everything after fails hard.
    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body()))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(6)))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();
    assert!(account.availability().is_available());

    let mut availability = account.subscribe_availability();
    account.refresh().await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), availability.changed())
        .await
        .expect("availability should change")
        .unwrap();

    assert!(matches!(
        account.availability(),
        Availability::Unavailable { .. }
    ));
    // The cached snapshot survives the outage.
    assert_eq!(account.snapshot().unwrap().device_count(), 1);

    account.shutdown().await;
}

// ── Command dispatch + quick poll ───────────────────────────────────

#[tokio::test]
async fn accepted_mode_command_is_reflected_by_the_quick_poll() {
    let (cognito, api) = start_servers().await;

    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body()))
        .mount(&api)
        .await;

    // Mode reads Off until the command lands, then Boost Heating.
    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(6)))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(1)))
        .mount(&api)
        .await;

    Mock::given(method("PUT"))
        .and(path("/generic/devices/LX-0042/components/14"))
        .and(body_json(json!({ "desiredValue": 1 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    let mut snapshots = account.snapshots();
    let result = account
        .execute(Command::SetPresetMode {
            device_id: "LX-0042".into(),
            mode: HeatPumpMode::BoostHeating,
        })
        .await
        .unwrap();
    assert_eq!(result, CommandResult::Accepted);

    // State still reads the last snapshot until the quick poll lands --
    // no locally inferred transitions.
    assert_eq!(
        account.entities().climate[0].preset,
        EntityValue::Preset(HeatPumpMode::Off)
    );

    tokio::time::timeout(Duration::from_secs(2), snapshots.changed())
        .await
        .expect("quick poll should publish a snapshot")
        .unwrap();

    assert_eq!(
        account.entities().climate[0].preset,
        EntityValue::Preset(HeatPumpMode::BoostHeating)
    );

    account.shutdown().await;
}

#[tokio::test]
async fn setpoint_command_sends_tenths_on_the_wire() {
    let (cognito, api) = start_servers().await;
    mount_happy_path(&api, 1).await;

    Mock::given(method("PUT"))
        .and(path("/generic/devices/LX-0042/components/15"))
        .and(body_json(json!({ "desiredValue": 285 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    account
        .execute(Command::SetTargetTemperature {
            device_id: "LX-0042".into(),
            setpoint: Setpoint::new(28.5).unwrap(),
        })
        .await
        .unwrap();

    account.shutdown().await;
}

#[tokio::test]
async fn rejected_command_surfaces_without_retry_or_quick_poll() {
    let (cognito, api) = start_servers().await;

    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body()))
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(6)))
        .expect(1) // only the initial poll -- no quick poll after a rejection
        .mount(&api)
        .await;

    Mock::given(method("PUT"))
        .and(path("/generic/devices/LX-0042/components/14"))
        .respond_with(ResponseTemplate::new(409).set_body_string("mode not supported"))
        .expect(1)
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    let err = account
        .execute(Command::SetPresetMode {
            device_id: "LX-0042".into(),
            mode: HeatPumpMode::BoostCooling,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }), "{err}");

    // Give a would-be quick poll time to fire before the mock
    // expectations are verified on drop.
    tokio::time::sleep(QUICK_POLL_DELAY * 3).await;

    account.shutdown().await;
}

#[tokio::test]
async fn unknown_device_fails_validation_before_any_network_call() {
    let (cognito, api) = start_servers().await;
    mount_happy_path(&api, 6).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    let err = account
        .execute(Command::SetPower {
            device_id: "NO-SUCH-DEVICE".into(),
            on: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DeviceNotFound { .. }), "{err}");

    account.shutdown().await;
}

// ── Invalid poll data degrades, never crashes ───────────────────────

#[tokio::test]
async fn out_of_contract_mode_reads_unknown_while_account_stays_available() {
    let (cognito, api) = start_servers().await;
    mount_happy_path(&api, 9).await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    assert!(account.availability().is_available());
    let entities = account.entities();
    assert!(entities.climate[0].preset.is_unknown());
    // The other entities are unaffected by the bad mode value.
    assert_eq!(
        entities.climate[0].water_temperature,
        EntityValue::Number(26.5)
    );

    account.shutdown().await;
}

// ── Teardown ────────────────────────────────────────────────────────

#[tokio::test]
async fn shutdown_cancels_a_pending_quick_poll() {
    let (cognito, api) = start_servers().await;

    Mock::given(method("GET"))
        .and(path("/generic/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_body()))
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/generic/devices/LX-0042/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(components_body(6)))
        .expect(1) // the quick poll must never land after shutdown
        .mount(&api)
        .await;
    Mock::given(method("PUT"))
        .and(path("/generic/devices/LX-0042/components/13"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&api)
        .await;

    let account = account_for(&cognito, &api);
    account.connect().await.unwrap();

    account
        .execute(Command::SetPower {
            device_id: "LX-0042".into(),
            on: false,
        })
        .await
        .unwrap();

    // Shut down before the quick-poll delay elapses.
    account.shutdown().await;
    tokio::time::sleep(QUICK_POLL_DELAY * 3).await;

    let err = account
        .execute(Command::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SessionClosed), "{err}");
}
