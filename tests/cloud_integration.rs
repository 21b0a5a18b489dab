// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a mocked cloud using wiremock.

use std::time::Duration;

use alphaess_cloud::{AlphaCloud, CloudConfig, Error, ValueError};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SYSTEM_ID: &str = "42";

fn client(server: &MockServer) -> AlphaCloud {
    let config = CloudConfig::new("user@example.com", "secret")
        .with_base_url(format!("{}/api", server.uri()));
    AlphaCloud::with_config(config).unwrap()
}

async fn mount_login(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/api/Account/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": {
                "AccessToken": "token-1",
                "ExpiresIn": expires_in,
                "RefreshTokenKey": "refresh-1"
            }
        })))
        .mount(server)
        .await;
}

async fn mount_system_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/Account/GetCustomUseESSList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": [
                {"system_id": SYSTEM_ID, "sys_sn": "AL1", "minv": "SMILE5-INV", "mbat": "SMILE5-BAT"},
                {"system_id": 43, "sys_sn": "AL2"}
            ]
        })))
        .mount(server)
        .await;
}

fn settings_document() -> serde_json::Value {
    json!({
        "system_id": SYSTEM_ID,
        "minv": "SMILE5-INV",
        "mbat": "SMILE5-BAT",
        "bakbox_ver": "1.2.0",
        "bat_high_cap": "100",
        "bat_use_cap": "10",
        "grid_charge": 1,
        "chargingmode": "1",
        "max_current": "16",
        "charging_pile_list": [
            {
                "chargingpile_id": 7,
                "chargingpile_sn": "PILE-7",
                "chargingpile_name": "Garage",
                "hardware_max_current": 32,
                "max_current": "16",
                "chargingmode": "1"
            }
        ]
    })
}

async fn mount_settings(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/Account/GetCustomUseESSSetting"))
        .and(query_param("system_id", SYSTEM_ID))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": settings_document()})),
        )
        .mount(server)
        .await;
}

async fn logged_in(server: &MockServer) -> AlphaCloud {
    mount_login(server, 36_000).await;
    mount_system_list(server).await;

    let mut cloud = client(server);
    assert!(cloud.login().await.unwrap());
    cloud.fetch_system_list().await.unwrap();
    cloud
}

async fn with_settings(server: &MockServer) -> AlphaCloud {
    mount_settings(server).await;
    let mut cloud = logged_in(server).await;
    cloud
        .system_mut(SYSTEM_ID)
        .unwrap()
        .fetch_settings()
        .await
        .unwrap()
        .unwrap();
    cloud
}

// ============================================================================
// Session
// ============================================================================

mod session {
    use super::*;

    #[tokio::test]
    async fn login_sends_credentials_and_signature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/Login"))
            .and(header_exists("Authsignature"))
            .and(header_exists("Authtimestamp"))
            .and(body_json(json!({"username": "user@example.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": {"AccessToken": "abc", "ExpiresIn": 3600, "RefreshTokenKey": "def"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        assert!(cloud.login().await.unwrap());

        let token = cloud.session().token().unwrap();
        assert_eq!(token.access_token(), "abc");
        assert_eq!(token.refresh_token(), "def");
        assert_eq!(token.lifetime_secs(), 3600);
        assert_eq!((token.expires_at() - token.issued_at()).num_seconds(), 3600);
        assert!(cloud.session().validate_credentials(true).is_ok());
    }

    #[tokio::test]
    async fn first_login_without_bearer_header() {
        let server = MockServer::start().await;
        mount_login(&server, 3600).await;

        let mut cloud = client(&server);
        cloud.login().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn rejected_login_leaves_no_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/Login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        assert!(!cloud.login().await.unwrap());
        assert!(!cloud.session().is_logged_in());
        assert!(matches!(
            cloud.fetch_system_list().await,
            Err(Error::LoginRequired(_))
        ));
    }

    #[tokio::test]
    async fn rejected_relogin_keeps_previous_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/Login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"AccessToken": "first", "ExpiresIn": 3600, "RefreshTokenKey": "r"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/Account/Login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        assert!(cloud.login().await.unwrap());
        assert!(!cloud.login().await.unwrap());
        assert_eq!(cloud.session().token().unwrap().access_token(), "first");
    }

    #[tokio::test]
    async fn expired_token_is_rejected_before_sending() {
        let server = MockServer::start().await;
        mount_login(&server, 0).await;

        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        assert!(cloud.login().await.unwrap());
        assert!(matches!(
            cloud.fetch_system_list().await,
            Err(Error::LoginExpired { .. })
        ));

        // a fresh login is still allowed
        assert!(cloud.login().await.unwrap());
    }

    #[tokio::test]
    async fn login_with_malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/Login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        assert!(matches!(cloud.login().await, Err(Error::Parse(_))));
        assert!(!cloud.session().is_logged_in());
    }

    #[tokio::test]
    async fn logout_requires_new_login() {
        let server = MockServer::start().await;
        let mut cloud = logged_in(&server).await;

        cloud.logout();
        assert!(matches!(
            cloud.fetch_system_list().await,
            Err(Error::LoginRequired(_))
        ));
        // registry survives a logout
        assert_eq!(cloud.systems().len(), 2);
    }
}

// ============================================================================
// System registry
// ============================================================================

mod registry {
    use super::*;

    #[tokio::test]
    async fn fetch_system_list_sends_bearer_and_fills_registry() {
        let server = MockServer::start().await;
        mount_login(&server, 3600).await;

        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .and(header("Authorization", "Bearer token-1"))
            .and(header_exists("Authsignature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"system_id": SYSTEM_ID, "sys_sn": "AL1", "minv": "SMILE5-INV"},
                    {"system_id": 43, "sys_sn": "AL2"},
                    {"sys_sn": "no id"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        cloud.login().await.unwrap();
        let systems = cloud.fetch_system_list().await.unwrap();

        assert_eq!(systems.len(), 2);
        let system = &systems[SYSTEM_ID];
        assert_eq!(system.serial_number(), "AL1");
        assert_eq!(system.model_inverter(), Some("SMILE5-INV"));
        assert_eq!(cloud.system("43").unwrap().serial_number(), "AL2");
    }

    #[tokio::test]
    async fn rejected_system_list_keeps_registry() {
        let server = MockServer::start().await;
        mount_login(&server, 3600).await;

        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"system_id": SYSTEM_ID, "sys_sn": "AL1"}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        cloud.login().await.unwrap();
        assert_eq!(cloud.fetch_system_list().await.unwrap().len(), 1);
        assert_eq!(cloud.fetch_system_list().await.unwrap().len(), 1);
        assert!(cloud.system(SYSTEM_ID).is_some());
    }

    #[tokio::test]
    async fn system_list_must_be_an_array() {
        let server = MockServer::start().await;
        mount_login(&server, 3600).await;

        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let mut cloud = client(&server);
        cloud.login().await.unwrap();
        assert!(matches!(
            cloud.fetch_system_list().await,
            Err(Error::Parse(_))
        ));
    }
}

// ============================================================================
// System entity
// ============================================================================

mod system {
    use super::*;

    #[tokio::test]
    async fn fetch_settings_derives_fields_and_piles() {
        let server = MockServer::start().await;
        mount_settings(&server).await;
        let mut cloud = logged_in(&server).await;

        let mut handle = cloud.system_mut(SYSTEM_ID).unwrap();
        let document = handle.fetch_settings().await.unwrap().unwrap();
        assert_eq!(document["grid_charge"], json!(1));

        let system = cloud.system(SYSTEM_ID).unwrap();
        assert_eq!(system.model_inverter(), Some("SMILE5-INV"));
        assert_eq!(system.model_battery(), Some("SMILE5-BAT"));
        assert_eq!(system.version_backupbox(), Some("1.2.0"));
        assert!(system.has_backupbox());
        assert!(system.last_fetch().is_some());
        assert_eq!(system.settings(), &document);

        let pile = system.pile("7").unwrap();
        assert_eq!(pile.serial_number(), "PILE-7");
        assert_eq!(pile.name(), Some("Garage"));
        assert_eq!(pile.max_current(), Some(16));
    }

    #[tokio::test]
    async fn rejected_settings_fetch_changes_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/Account/GetCustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let result = cloud
            .system_mut(SYSTEM_ID)
            .unwrap()
            .fetch_settings()
            .await
            .unwrap();

        assert!(result.is_none());
        let system = cloud.system(SYSTEM_ID).unwrap();
        assert!(system.settings().is_empty());
        assert!(system.last_fetch().is_none());
        assert!(system.piles().is_empty());
    }

    #[tokio::test]
    async fn fetch_last_power_data_sums_strings() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/ESS/GetLastPowerDataBySN"))
            .and(query_param("sys_sn", "AL1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "ppv1": 1000, "ppv2": 500, "ppv3": null,
                    "ev1_power": 4140, "ev2_power": 0,
                    "pbat": -1200.5, "soc": 64.8,
                    "pmeter_l1": 12
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let power = cloud
            .system_mut(SYSTEM_ID)
            .unwrap()
            .fetch_last_power_data()
            .await
            .unwrap()
            .unwrap();

        assert!((power.pv_power - 1500.0).abs() < f64::EPSILON);
        assert!((power.ev_power - 4140.0).abs() < f64::EPSILON);
        assert_eq!(power.battery_power, Some(-1200.5));
        assert_eq!(power.battery_soc, Some(64.8));

        let system = cloud.system(SYSTEM_ID).unwrap();
        assert_eq!(system.power(), Some(&power));
        assert_eq!(system.power_data().unwrap()["pmeter_l1"], json!(12));
    }

    #[tokio::test]
    async fn rejected_power_data_fetch_changes_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/ESS/GetLastPowerDataBySN"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let result = cloud
            .system_mut(SYSTEM_ID)
            .unwrap()
            .fetch_last_power_data()
            .await
            .unwrap();

        assert!(result.is_none());
        let system = cloud.system(SYSTEM_ID).unwrap();
        assert!(system.power().is_none());
        assert!(system.power_data().is_none());
    }

    #[tokio::test]
    async fn set_state_of_charge_cap_posts_full_document() {
        let server = MockServer::start().await;

        let mut expected = settings_document();
        expected["bat_high_cap"] = json!("95");
        expected["bat_use_cap"] = json!("25");
        expected["sys_sn"] = json!("AL1");

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .and(header("Authorization", "Bearer token-1"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200})))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let handle = cloud.system_mut(SYSTEM_ID).unwrap();
        assert!(handle.set_state_of_charge_cap(25, 95).await.unwrap());
    }

    #[tokio::test]
    async fn set_state_of_charge_cap_validates_before_sending() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let handle = cloud.system_mut(SYSTEM_ID).unwrap();

        for (min, max) in [(25, 20), (10, 50), (50, 110)] {
            assert!(matches!(
                handle.set_state_of_charge_cap(min, max).await,
                Err(Error::InvalidInput(ValueError::InvalidStateOfChargeCap { .. }))
            ));
        }
        assert!(handle.set_state_of_charge_cap(20, 100).await.unwrap());
    }

    #[tokio::test]
    async fn set_state_of_charge_cap_needs_fetched_settings() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let handle = cloud.system_mut(SYSTEM_ID).unwrap();

        assert!(!handle.set_state_of_charge_cap(25, 95).await.unwrap());
        assert!(matches!(
            handle.set_state_of_charge_cap(10, 95).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn rejected_post_returns_false() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let handle = cloud.system_mut(SYSTEM_ID).unwrap();
        let document = handle.system().settings().clone();
        assert!(!handle.post_settings(document).await.unwrap());
    }

    #[tokio::test]
    async fn post_settings_injects_identity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .and(body_json(json!({"grid_charge": 0, "system_id": SYSTEM_ID, "sys_sn": "AL1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let handle = cloud.system_mut(SYSTEM_ID).unwrap();

        let mut document = alphaess_cloud::SettingsDocument::new();
        document.insert("grid_charge".to_string(), json!(0));
        assert!(handle.post_settings(document).await.unwrap());
    }

    #[tokio::test]
    async fn post_settings_keeps_numeric_system_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .and(body_json(json!({"grid_charge": 0, "system_id": 43, "sys_sn": "AL2"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = logged_in(&server).await;
        let handle = cloud.system_mut("43").unwrap();

        let mut document = alphaess_cloud::SettingsDocument::new();
        document.insert("grid_charge".to_string(), json!(0));
        assert!(handle.post_settings(document).await.unwrap());
    }
}

// ============================================================================
// Charging pile entity
// ============================================================================

mod charging_pile {
    use super::*;

    async fn mount_status(server: &MockServer, data: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/ESS/GetChargingStatus"))
            .and(body_json(json!({"sys_sn": "AL1", "chargingpile_id": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": data})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn start_and_stop_charging() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/ESS/StartCharging"))
            .and(body_json(json!({"sys_sn": "AL1", "chargingpile_sn": "PILE-7"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/ESS/StopCharging"))
            .and(body_json(json!({"sys_sn": "AL1", "chargingpile_sn": "PILE-7"})))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();

        assert!(pile.start_charging().await.unwrap());
        assert!(!pile.stop_charging().await.unwrap());
        assert!(pile.pile().status().is_none());
    }

    #[tokio::test]
    async fn fetch_charging_status_maps_known_codes() {
        let server = MockServer::start().await;
        mount_status(&server, json!({"chargingpile_status": 3})).await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        let status = pile.fetch_charging_status().await.unwrap();
        assert_eq!(status.code(), 3);
        assert_eq!(status.text(), "Charging");
        assert_eq!(pile.pile().status(), Some(&status));
    }

    #[tokio::test]
    async fn fetch_charging_status_stopped() {
        let server = MockServer::start().await;
        mount_status(&server, json!({"chargingpile_status": 6})).await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        assert_eq!(
            pile.fetch_charging_status().await.unwrap().text(),
            "Charging stopped"
        );
    }

    #[tokio::test]
    async fn unknown_status_code_is_invalid_response() {
        let server = MockServer::start().await;
        mount_status(&server, json!({"chargingpile_status": 99})).await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        assert!(matches!(
            pile.fetch_charging_status().await,
            Err(Error::InvalidResponse(_))
        ));
        assert!(pile.pile().status().is_none());
    }

    #[tokio::test]
    async fn failed_status_call_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/ESS/GetChargingStatus"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        assert!(matches!(
            pile.fetch_charging_status().await,
            Err(Error::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn integral_float_status_code_is_accepted() {
        let server = MockServer::start().await;
        mount_status(&server, json!({"chargingpile_status": 3.0})).await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        assert_eq!(pile.fetch_charging_status().await.unwrap().text(), "Charging");
    }

    #[tokio::test]
    async fn status_reply_without_code_is_invalid_response() {
        let server = MockServer::start().await;
        mount_status(&server, json!(null)).await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();

        assert!(matches!(
            pile.fetch_charging_status().await,
            Err(Error::InvalidResponse(_))
        ));
        assert!(pile.pile().status().is_none());
    }

    #[tokio::test]
    async fn status_transport_failure_is_invalid_response() {
        let server = MockServer::start().await;
        mount_login(&server, 36_000).await;
        mount_system_list(&server).await;
        mount_settings(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/ESS/GetChargingStatus"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": 3}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = CloudConfig::new("user@example.com", "secret")
            .with_base_url(format!("{}/api", server.uri()))
            .with_timeout(Duration::from_millis(200));
        let mut cloud = AlphaCloud::with_config(config).unwrap();
        assert!(cloud.login().await.unwrap());
        cloud.fetch_system_list().await.unwrap();

        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        system.fetch_settings().await.unwrap().unwrap();
        let mut pile = system.pile("7").unwrap();

        assert!(matches!(
            pile.fetch_charging_status().await,
            Err(Error::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn status_fetch_after_logout_requires_login() {
        let server = MockServer::start().await;
        let mut cloud = with_settings(&server).await;
        cloud.logout();

        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let mut pile = system.pile("7").unwrap();
        assert!(matches!(
            pile.fetch_charging_status().await,
            Err(Error::LoginRequired(_))
        ));
    }

    #[tokio::test]
    async fn change_charging_mode_posts_merged_document() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .and(body_partial_json(json!({
                "system_id": SYSTEM_ID,
                "sys_sn": "AL1",
                "chargingmode": "3",
                "chargingpile_sn": "PILE-7",
                "bat_high_cap": "100",
                "charging_pile_list": [{
                    "chargingpile_id": 7,
                    "chargingmode": "3",
                    "system_id": SYSTEM_ID
                }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();

        assert!(pile.change_charging_mode(3).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_charging_mode_is_ignored() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();

        assert!(!pile.change_charging_mode(0).await.unwrap());
        assert!(!pile.change_charging_mode(5).await.unwrap());
    }

    #[tokio::test]
    async fn change_charging_current_from_watts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .and(body_partial_json(json!({
                "max_current": "10",
                "charging_pile_list": [{"chargingpile_id": 7, "max_current": "10"}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();

        assert!(pile.change_charging_current(None, Some(6900)).await.unwrap());
    }

    #[tokio::test]
    async fn change_charging_current_rejects_out_of_range() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/Account/CustomUseESSSetting"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cloud = with_settings(&server).await;
        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();

        // 2070 W / 690 = 3 A, below the 6 A floor
        assert!(matches!(
            pile.change_charging_current(None, Some(2070)).await,
            Err(Error::InvalidInput(ValueError::OutOfRange { actual: 3, .. }))
        ));
        // above the configured 16 A limit
        assert!(matches!(
            pile.change_charging_current(Some(20), None).await,
            Err(Error::InvalidInput(ValueError::OutOfRange { max: 16, .. }))
        ));
        assert!(matches!(
            pile.change_charging_current(None, None).await,
            Err(Error::InvalidInput(ValueError::MissingChargeCurrent))
        ));
    }

    #[tokio::test]
    async fn pile_operations_fail_fast_after_logout() {
        let server = MockServer::start().await;
        let mut cloud = with_settings(&server).await;
        cloud.logout();

        let mut system = cloud.system_mut(SYSTEM_ID).unwrap();
        let pile = system.pile("7").unwrap();
        assert!(matches!(
            pile.start_charging().await,
            Err(Error::LoginRequired(_))
        ));
    }
}
