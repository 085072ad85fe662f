//! HTTP provider tests against a mocked server.
//!
//! The providers use reqwest's blocking client, so every call runs inside
//! `spawn_blocking` while wiremock serves from the async runtime.

use chrono::{FixedOffset, NaiveDate, TimeZone};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use miqat::models::{Coordinates, PrayerName};
use miqat::providers::{
    resolve_location, AladhanClient, GeolocationSource, IpGeolocation, LocationSearch,
    OpenMeteoGeocoder, ProviderError, QiblaProvider, TimingsProvider,
};
use miqat::schedule::build_schedule;

// ============= Helper Functions =============

fn riyadh() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn aladhan_timings(fajr: &str) -> serde_json::Value {
    json!({
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": fajr,
                "Sunrise": "06:21",
                "Dhuhr": "12:15",
                "Asr": "15:45",
                "Sunset": "18:18",
                "Maghrib": "18:20",
                "Isha": "19:50",
                "Midnight": "00:10"
            },
            "date": {
                "hijri": { "day": "21", "month": { "en": "Ramaḍān" }, "year": "1447" }
            },
            "meta": { "timezone": "Asia/Riyadh" }
        }
    })
}

// ============= Aladhan =============

#[tokio::test(flavor = "multi_thread")]
async fn aladhan_timings_feed_the_schedule_builder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/timings/10-03-2026"))
        .and(query_param("latitude", "21.4225"))
        .and(query_param("longitude", "39.8262"))
        .and(query_param("method", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(aladhan_timings("05:00 (+03)")))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let daily = blocking(move || {
        let client = AladhanClient::new(&base, 4).unwrap();
        client.daily_timings(
            Coordinates::new(21.4225, 39.8262),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            riyadh(),
        )
    })
    .await
    .unwrap();

    assert_eq!(daily.raw.len(), 5);
    assert_eq!(daily.hijri.as_deref(), Some("21 Ramaḍān 1447"));
    assert_eq!(daily.timezone.as_deref(), Some("Asia/Riyadh"));

    let now = riyadh()
        .with_ymd_and_hms(2026, 3, 10, 13, 0, 0)
        .unwrap();
    let schedule = build_schedule(&daily.raw, &now).unwrap();
    assert_eq!(schedule.next().name, PrayerName::Asr);
    assert_eq!(
        schedule.entry(PrayerName::Fajr).clock_time.format("%H:%M").to_string(),
        "05:00"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn aladhan_error_envelope_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/timings/10-03-2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400,
            "status": "BAD_REQUEST",
            "data": "Please specify a valid latitude"
        })))
        .mount(&server)
        .await;

    let base = server.uri();
    let result = blocking(move || {
        AladhanClient::new(&base, 2).unwrap().daily_timings(
            Coordinates::new(91.0, 0.0),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            riyadh(),
        )
    })
    .await;

    match result {
        Err(ProviderError::Api { message, .. }) => {
            assert_eq!(message, "Please specify a valid latitude")
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn aladhan_server_error_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base = server.uri();
    let result = blocking(move || {
        AladhanClient::new(&base, 2).unwrap().daily_timings(
            Coordinates::new(51.5, -0.12),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            riyadh(),
        )
    })
    .await;

    assert!(matches!(
        result,
        Err(ProviderError::Status { status: 503, .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn aladhan_qibla_direction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/qibla/51.5074/-0.1278"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "status": "OK",
            "data": { "latitude": 51.5074, "longitude": -0.1278, "direction": 118.987 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let bearing = blocking(move || {
        AladhanClient::new(&base, 2)
            .unwrap()
            .qibla(Coordinates::new(51.5074, -0.1278))
    })
    .await
    .unwrap();

    assert!((bearing - 118.987).abs() < 1e-9);
}

// ============= Open-Meteo geocoding =============

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_returns_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Kuala Lumpur"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "name": "Kuala Lumpur",
                "latitude": 3.1412,
                "longitude": 101.68653,
                "country": "Malaysia"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let place = blocking(move || OpenMeteoGeocoder::new(&base).unwrap().search(" Kuala Lumpur "))
        .await
        .unwrap();

    assert_eq!(place.name, "Kuala Lumpur, Malaysia");
    assert!((place.coords.longitude - 101.68653).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_without_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.4 })))
        .mount(&server)
        .await;

    let base = server.uri();
    let result = blocking(move || OpenMeteoGeocoder::new(&base).unwrap().search("Atlantis")).await;

    assert!(matches!(result, Err(ProviderError::NotFound(q)) if q == "Atlantis"));
}

// ============= IP geolocation =============

#[tokio::test(flavor = "multi_thread")]
async fn ip_lookup_locates_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "country": "Turkey",
            "city": "Istanbul",
            "lat": 41.0082,
            "lon": 28.9784,
            "timezone": "Europe/Istanbul"
        })))
        .mount(&server)
        .await;

    let base = server.uri();
    let place = blocking(move || IpGeolocation::new(&base, true).unwrap().locate())
        .await
        .unwrap();

    assert_eq!(place.name, "Istanbul, Turkey");
    assert!((place.coords.latitude - 41.0082).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_ip_lookup_falls_back_to_mecca() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "reserved range"
        })))
        .mount(&server)
        .await;

    let base = server.uri();
    let resolved = blocking(move || {
        let ip = IpGeolocation::new(&base, true).unwrap();
        resolve_location(&[&ip])
    })
    .await;

    assert_eq!(resolved.place.name, "Makkah");
    assert!((resolved.place.coords.latitude - 21.4225).abs() < 1e-9);
    let reason = resolved.fallback_reason.unwrap();
    assert!(reason.contains("reserved range"), "{}", reason);
    assert!(reason.ends_with("Using Makkah."));
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_ip_lookup_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let base = server.uri();
    let resolved = blocking(move || {
        let ip = IpGeolocation::new(&base, false).unwrap();
        resolve_location(&[&ip])
    })
    .await;

    assert_eq!(
        resolved.fallback_reason.as_deref(),
        Some("Location access denied. Using Makkah.")
    );
}
