mod common;

use actix_web::{http::StatusCode, test};
use common::{current_weather_body, forecast_body, test_config, test_services};
use weatherscope_api::{
    AppConfig, AppServices, ConfigError, DeploymentEnvironment, RateLimitBackend,
    RateLimitConfig, create_app,
    config::{HistoryConfig, LoggingConfig, ServerConfig, UpstreamClientConfig, WeatherConfig},
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

#[actix_web::test]
async fn test_sixth_request_in_window_is_rejected() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    let app = test::init_service(create_app(test_services(&server))).await;

    for expected_remaining in (0..5).rev() {
        let req = test::TestRequest::get()
            .uri("/api/weather?lat=40.71&lon=-74.01")
            .insert_header(("X-Forwarded-For", "198.51.100.23"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("x-ratelimit-remaining").unwrap(),
            expected_remaining.to_string().as_str()
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/weather?lat=40.71&lon=-74.01")
        .insert_header(("X-Forwarded-For", "198.51.100.23"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let headers = resp.headers();
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "5");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
    let retry_after: i64 = headers
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=10).contains(&retry_after));

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Rate limit exceeded");
    assert_eq!(json["limit"], 5);
    assert_eq!(json["remaining"], 0);
    assert!(
        chrono::DateTime::parse_from_rfc3339(json["reset"].as_str().unwrap()).is_ok(),
        "reset should be an RFC 3339 timestamp"
    );

    // Five upstream pairs; the rejected request never reached the provider
    assert_eq!(server.received_requests().await.unwrap().len(), 10);
}

#[actix_web::test]
async fn test_clients_are_limited_independently() {
    let server = MockServer::start().await;
    let app = test::init_service(create_app(test_services(&server))).await;

    // Rejected-by-validation requests still consume quota
    for _ in 0..5 {
        let req = test::TestRequest::get()
            .uri("/api/location")
            .insert_header(("X-Forwarded-For", "203.0.113.1, 10.0.0.2"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/location")
        .insert_header(("X-Forwarded-For", "203.0.113.1"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    let req = test::TestRequest::get()
        .uri("/api/location")
        .insert_header(("X-Forwarded-For", "203.0.113.2"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // No forwarded address shares the loopback bucket, still fresh
    let req = test::TestRequest::get().uri("/api/location").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_history_is_not_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/entry/searchhistory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    let app = test::init_service(create_app(test_services(&server))).await;

    for _ in 0..8 {
        let req = test::TestRequest::get().uri("/api/history").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_upstash_backend_rejection() {
    let server = MockServer::start().await;
    let store = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer upstash-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": -1})))
        .expect(1)
        .mount(&store)
        .await;

    let mut config = test_config(&server);
    config.rate_limit.backend = RateLimitBackend::Upstash {
        url: store.uri(),
        token: "upstash-token".to_string(),
    };
    let app = test::init_service(create_app(AppServices::from_config(&config).unwrap())).await;

    let req = test::TestRequest::get()
        .uri("/api/weather?lat=40.71&lon=-74.01")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_unreachable_store_fails_closed() {
    let server = MockServer::start().await;
    let store = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            serde_json::json!({"error": "Unauthorized"}),
        ))
        .mount(&store)
        .await;

    let mut config = test_config(&server);
    config.rate_limit.backend = RateLimitBackend::Upstash {
        url: store.uri(),
        token: "wrong".to_string(),
    };
    let app = test::init_service(create_app(AppServices::from_config(&config).unwrap())).await;

    let req = test::TestRequest::get()
        .uri("/api/location?q=Oslo")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(server.received_requests().await.unwrap().is_empty());
}

/// Config whose upstream URLs are never called.
fn offline_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
        weather: WeatherConfig::default(),
        history: HistoryConfig::default(),
        rate_limit: RateLimitConfig::with_backend(RateLimitBackend::AllowAll),
        upstream_client: UpstreamClientConfig::default(),
    }
}

#[actix_web::test]
async fn test_allow_all_refused_in_production() {
    let mut config = offline_config();
    config.server.environment = DeploymentEnvironment::Production;
    assert!(matches!(
        AppServices::from_config(&config),
        Err(ConfigError::NotAllowedInProduction(_))
    ));

    config.server.environment = DeploymentEnvironment::Development;
    let services = AppServices::from_config(&config).unwrap();
    assert_eq!(services.limiter.backend_name(), "allow-all");
}
