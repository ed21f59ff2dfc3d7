use serde_json::json;
use sprinkler_dash::client::{ControllerClient, ControllerError};
use sprinkler_dash::models::controller::{
    ManualTimerRequest, Period, ResolveTimesRequest, ZoneId, ZoneMode,
};
use std::io::Read;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const TIMEOUT: Duration = Duration::from_secs(2);

fn json_header() -> Header {
    Header::from_str("Content-Type: application/json").unwrap()
}

fn local_server() -> (Server, String) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    (server, format!("http://127.0.0.1:{}", port))
}

#[test]
fn schedule_decodes_zones_and_legacy_durations() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let url = request.url().to_string();
        let body = json!([
            {
                "zone_id": 1,
                "mode": "smart",
                "period": "Daily",
                "cycles": 2,
                "times": [
                    {"code": "0600", "durationSeconds": 900},
                    {"code": "SUNSET-15", "durationSeconds": "003000"}
                ]
            },
            {"zone_id": 2, "mode": "disabled"}
        ]);
        request
            .respond(Response::from_string(body.to_string()).with_header(json_header()))
            .unwrap();
        url
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let zones = client.schedule().unwrap();
    assert_eq!(handle.join().unwrap(), "/api/schedule");

    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].zone_id, ZoneId(1));
    assert_eq!(zones[0].period, Some(Period::Daily));
    assert_eq!(zones[0].times[1].code, "SUNSET-15");
    assert_eq!(zones[0].times[1].duration_seconds, 1800);
    assert_eq!(zones[1].mode, ZoneMode::Disabled);
}

#[test]
fn resolve_times_posts_codes_and_keeps_request_order() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let method = request.method().to_string();
        let url = request.url().to_string();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        request
            .respond(Response::from_string(r#"["06:12", null]"#).with_header(json_header()))
            .unwrap();
        (method, url, body)
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let times = client
        .resolve_times(&ResolveTimesRequest {
            codes: vec!["SUNRISE".to_string(), "SUNSET+45".to_string()],
            date: chrono::NaiveDate::from_ymd_opt(2026, 4, 15).unwrap(),
            lat: 46.05,
            lon: 14.51,
        })
        .unwrap();

    let (method, url, body) = handle.join().unwrap();
    assert_eq!(method, "POST");
    assert_eq!(url, "/api/resolve_times");
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent["codes"], json!(["SUNRISE", "SUNSET+45"]));
    assert_eq!(sent["date"], "2026-04-15");
    assert_eq!(sent["lat"], 46.05);

    assert_eq!(times, vec![Some("06:12".to_string()), None]);
}

#[test]
fn zone_status_decodes_keyed_snapshot() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let url = request.url().to_string();
        let body = r#"{"1": {"active": true, "remaining": 90, "type": "scheduled"}, "2": {"active": false}}"#;
        request
            .respond(Response::from_string(body).with_header(json_header()))
            .unwrap();
        url
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let snapshot = client.zone_status().unwrap();
    assert_eq!(handle.join().unwrap(), "/api/zones/status");

    assert!(snapshot.get(ZoneId(1)).unwrap().active);
    assert_eq!(snapshot.get(ZoneId(1)).unwrap().remaining, 90);
    assert!(!snapshot.get(ZoneId(2)).unwrap().active);
}

#[test]
fn settings_and_gpio_round_trip() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        for _ in 0..2 {
            let request = server.recv().unwrap();
            let body = match request.url() {
                "/api/settings" => r#"{"coords": [14.51, 46.05], "timer_multiplier": 1.5}"#,
                "/api/gpio" => r#"{"pins": {"1": 17, "2": 27}, "pump_zone": 2}"#,
                other => panic!("unexpected url {}", other),
            };
            request
                .respond(Response::from_string(body).with_header(json_header()))
                .unwrap();
        }
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let settings = client.settings().unwrap();
    assert_eq!(settings.location(), Some((46.05, 14.51)));
    assert!(settings.uses_legacy_coords());
    assert_eq!(settings.timer_multiplier, 1.5);

    let gpio = client.gpio_config().unwrap();
    assert_eq!(gpio.pump_zone, Some(ZoneId(2)));
    assert_eq!(gpio.pins.get("1"), Some(&17));
    handle.join().unwrap();
}

#[test]
fn manual_timer_start_and_cancel_hit_the_zone_path() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..2 {
            let mut request = server.recv().unwrap();
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            seen.push((request.method().to_string(), request.url().to_string(), body));
            request.respond(Response::from_string("ok")).unwrap();
        }
        seen
    });

    let client = ControllerClient::new(base, TIMEOUT);
    client
        .start_manual_timer(&ManualTimerRequest {
            zone_id: ZoneId(4),
            duration_seconds: 5400,
        })
        .unwrap();
    client.cancel_manual_timer(ZoneId(4)).unwrap();

    let seen = handle.join().unwrap();
    assert_eq!(seen[0].0, "POST");
    assert_eq!(seen[0].1, "/api/manual-timer/4");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].2).unwrap();
    assert_eq!(sent, json!({"duration": 5400}));
    assert_eq!(seen[1].0, "DELETE");
    assert_eq!(seen[1].1, "/api/manual-timer/4");
}

#[test]
fn non_success_status_surfaces_backend_message() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        request
            .respond(Response::from_string("zone is busy").with_status_code(409))
            .unwrap();
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let err = client.zone_status().unwrap_err();
    handle.join().unwrap();

    match err {
        ControllerError::Http { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "zone is busy");
        }
        other => panic!("expected http error, got {}", other),
    }
}

#[test]
fn malformed_payload_reports_decode_path() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let body = r#"[{"zone_id": "three", "mode": "smart"}]"#;
        request
            .respond(Response::from_string(body).with_header(json_header()))
            .unwrap();
    });

    let client = ControllerClient::new(base, TIMEOUT);
    let err = client.schedule().unwrap_err();
    handle.join().unwrap();

    match err {
        ControllerError::Decode { path, .. } => assert!(path.contains("zone_id"), "path was {}", path),
        other => panic!("expected decode error, got {}", other),
    }
}

#[test]
fn slow_backend_trips_the_request_timeout() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        thread::sleep(Duration::from_millis(800));
        let _ = request.respond(Response::from_string("{}"));
    });

    let client = ControllerClient::new(base, Duration::from_millis(150));
    let err = client.settings().unwrap_err();
    assert!(matches!(err, ControllerError::Transport(_)), "got {}", err);
    handle.join().unwrap();
}

#[test]
fn base_url_trailing_slash_is_tolerated() {
    let (server, base) = local_server();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let url = request.url().to_string();
        request
            .respond(Response::from_string("{}").with_header(json_header()))
            .unwrap();
        url
    });

    let client = ControllerClient::new(format!("{}/", base), TIMEOUT);
    let settings = client.settings().unwrap();
    assert_eq!(handle.join().unwrap(), "/api/settings");
    assert_eq!(settings.timer_multiplier, 1.0);
}
