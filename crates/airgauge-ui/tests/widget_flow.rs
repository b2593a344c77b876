//! End-to-end widget flow against wiremock servers.
//!
//! The model lives on the test thread like it would on the presentation
//! thread; network work runs on an explicit tokio runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use airgauge_aqi::{AqiProvider, Coordinate, IpLocator, PositionSource, ReverseGeocoder};
use airgauge_ui::models::widget_state::{
    ADDRESS_FETCH_FAILED, AQI_FETCH_FAILED, DEFAULT_GAUGE_COLOR, LOCATION_DENIED,
};
use airgauge_ui::models::{AirQualityModel, AqiPanel, Phase};
use airgauge_ui::render::{render, RenderOptions};
use airgauge_ui::services::AirServices;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAIN: RenderOptions = RenderOptions {
    color: false,
    radius: 6,
};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn fixed() -> PositionSource {
    PositionSource::Fixed(Coordinate::new(37.0, -122.0).unwrap())
}

fn air_services(rt: &Runtime, server: &MockServer, position: PositionSource) -> AirServices {
    AirServices {
        runtime: rt.handle().clone(),
        aqi: Arc::new(AqiProvider::new(&server.uri(), "test-token").unwrap()),
        geocoder: Arc::new(ReverseGeocoder::new(&server.uri()).unwrap()),
        position: Arc::new(position),
    }
}

fn waqi(aqi: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "ok",
        "data": { "aqi": aqi, "idx": 1234 }
    }))
}

fn nominatim(display_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "place_id": 1,
        "lat": "37.0",
        "lon": "-122.0",
        "display_name": display_name
    }))
}

async fn mount_feed(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/feed/geo:37;-122/"))
        .and(query_param("token", "test-token"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_reverse(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn settle(model: &mut AirQualityModel) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !model.is_settled() && Instant::now() < deadline {
        model.wait_for_update(Duration::from_millis(100));
    }
    assert!(model.is_settled(), "widget did not settle: {:?}", model.state());
}

#[test]
fn good_reading_renders_category_and_address() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(&server, waqi(42)).await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();
    settle(&mut model);

    let state = model.state();
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.aqi(), Some(42));
    assert_eq!(state.address(), "Example St");
    assert_eq!(state.error(), None);

    let frame = render(&model.view(), &PLAIN);
    assert!(frame.contains("AQI: 42"));
    assert!(frame.contains("Good"));
    assert!(frame.contains("#00E400"));
    assert!(frame.contains("No mask needed"));
    assert!(frame.contains("Example St"));
}

#[test]
fn very_unhealthy_reading() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(&server, waqi(275)).await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();
    settle(&mut model);

    assert_eq!(model.state().gauge().color, "#8F3F97");
    let frame = render(&model.view(), &PLAIN);
    assert!(frame.contains("Very Unhealthy"));
    assert!(frame.contains("#8F3F97"));
    assert!(frame.contains("N99 or P100 required"));
}

#[test]
fn denied_location_makes_no_requests() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(waqi(42))
            .expect(0)
            .mount(&server)
            .await;
        server
    });

    let services = air_services(&rt, &server, PositionSource::Disabled);
    let mut model = AirQualityModel::new(services, CancellationToken::new());
    model.mount();
    settle(&mut model);

    assert_eq!(model.state().phase(), Phase::Failed);
    assert_eq!(model.state().error(), Some(LOCATION_DENIED));
    assert_eq!(model.state().coordinate(), None);
    assert!(render(&model.view(), &PLAIN).contains(LOCATION_DENIED));
}

#[test]
fn rejected_feed_leaves_gauge_empty() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "data": "Invalid key"
            })),
        )
        .await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();
    settle(&mut model);

    let state = model.state();
    assert_eq!(state.aqi(), None);
    assert_eq!(state.error(), Some(AQI_FETCH_FAILED));
    assert_eq!(state.gauge().value, 0);
    assert_eq!(state.gauge().color, DEFAULT_GAUGE_COLOR);

    let view = model.view();
    assert_eq!(view.panel, AqiPanel::Error(AQI_FETCH_FAILED.into()));
    assert_eq!(view.address.as_deref(), Some("Example St"));
}

#[test]
fn forbidden_feed_with_status_body_is_a_rejection() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "status": "error",
                "data": "Invalid key"
            })),
        )
        .await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();
    settle(&mut model);

    assert_eq!(model.state().aqi(), None);
    assert_eq!(model.state().error(), Some(AQI_FETCH_FAILED));
}

#[test]
fn fetches_run_concurrently() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(&server, waqi(42).set_delay(Duration::from_secs(3))).await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();

    let deadline = Instant::now() + Duration::from_secs(2);
    while model.state().address().is_empty() && Instant::now() < deadline {
        model.wait_for_update(Duration::from_millis(50));
    }
    assert_eq!(model.state().address(), "Example St");
    assert_eq!(model.state().aqi(), None);
    assert_eq!(model.state().pending_fetches(), 1);

    settle(&mut model);
    assert_eq!(model.state().aqi(), Some(42));
}

#[test]
fn missing_display_name_keeps_reading() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(&server, waqi(42)).await;
        mount_reverse(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .await;
        server
    });

    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), CancellationToken::new());
    model.mount();
    settle(&mut model);

    let state = model.state();
    assert_eq!(state.address(), "");
    assert_eq!(state.aqi(), Some(42));
    assert_eq!(state.gauge().color, "#00E400");
    assert_eq!(state.error(), Some(ADDRESS_FETCH_FAILED));
    assert!(model.view().address.is_none());
}

#[test]
fn mounting_twice_locates_once() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 37.0,
                "lon": -122.0
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_feed(&server, waqi(42)).await;
        mount_reverse(&server, nominatim("Example St")).await;
        server
    });

    let locator = IpLocator::new(&format!("{}/json/", server.uri())).unwrap();
    let services = air_services(&rt, &server, PositionSource::IpLookup(locator));
    let mut model = AirQualityModel::new(services, CancellationToken::new());
    model.mount();
    model.mount();
    settle(&mut model);

    assert_eq!(model.state().aqi(), Some(42));
}

#[test]
fn unmount_discards_late_results() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_feed(&server, waqi(42).set_delay(Duration::from_secs(2))).await;
        mount_reverse(
            &server,
            nominatim("Example St").set_delay(Duration::from_secs(2)),
        )
        .await;
        server
    });

    let cancel = CancellationToken::new();
    let mut model = AirQualityModel::new(air_services(&rt, &server, fixed()), cancel.clone());
    model.mount();

    let deadline = Instant::now() + Duration::from_secs(5);
    while model.state().phase() != Phase::AwaitingData && Instant::now() < deadline {
        model.wait_for_update(Duration::from_millis(50));
    }
    assert_eq!(model.state().phase(), Phase::AwaitingData);

    model.unmount();
    assert!(cancel.is_cancelled());

    model.wait_for_update(Duration::from_secs(3));
    assert_eq!(model.state().aqi(), None);
    assert_eq!(model.state().address(), "");
    assert_eq!(model.view().panel, AqiPanel::Loading);
}
