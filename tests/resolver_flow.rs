//! Resolver behaviour against mocked directory and weather APIs.

use httpmock::prelude::*;
use serde_json::{json, Value};

mod common;

async fn get(url: String) -> reqwest::Response {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(url)
        .send()
        .await
        .expect("Resolver unreachable")
}

#[tokio::test]
async fn test_resolves_city_and_converts_units() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;

    let city_mock = directory
        .mock_async(|when, then| {
            when.method(GET).path("/ws/01310900/json/");
            then.status(200)
                .json_body(json!({ "cep": "01310-900", "localidade": "São Paulo", "uf": "SP" }));
        })
        .await;
    let temp_mock = weather
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/current.json")
                .query_param("key", "test-key")
                .query_param("q", "São Paulo");
            then.status(200).json_body(json!({ "current": { "temp_c": 25.0 } }));
        })
        .await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=01310900")).await;
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["city"], "São Paulo");
    assert_eq!(body["temp_C"].as_f64().unwrap(), 25.0);
    assert!((body["temp_F"].as_f64().unwrap() - 77.0).abs() < 1e-9);
    assert!((body["temp_K"].as_f64().unwrap() - 298.15).abs() < 1e-9);

    city_mock.assert_hits_async(1).await;
    temp_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_wrong_length_makes_no_outbound_call() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;
    let any_directory = directory.mock_async(|_, then| {
        then.status(200);
    }).await;
    let any_weather = weather.mock_async(|_, then| {
        then.status(200);
    }).await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    for query in ["/weather", "/weather?cep=", "/weather?cep=1234567", "/weather?cep=123456789"] {
        let res = get(resolver.url(query)).await;
        assert_eq!(res.status(), 422, "query {}", query);
        assert_eq!(res.text().await.unwrap(), "invalid zipcode");
    }

    any_directory.assert_hits_async(0).await;
    any_weather.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_directory_failure_is_not_found() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;
    directory
        .mock_async(|when, then| {
            when.path("/ws/00000000/json/");
            then.status(400).body("Bad Request");
        })
        .await;
    let any_weather = weather.mock_async(|_, then| {
        then.status(200);
    }).await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=00000000")).await;
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "can not find zipcode");
    any_weather.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unknown_code_without_locality_is_not_found() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;
    directory
        .mock_async(|when, then| {
            when.path("/ws/99999999/json/");
            then.status(200).json_body(json!({ "erro": true }));
        })
        .await;
    let any_weather = weather.mock_async(|_, then| {
        then.status(200);
    }).await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=99999999")).await;
    assert_eq!(res.status(), 404);
    any_weather.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unreachable_directory_is_not_found() {
    let weather = MockServer::start_async().await;
    let directory_url = format!("http://{}", common::closed_addr().await);

    let config = common::test_config(&directory_url, &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=01310900")).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_weather_failure_is_server_error() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;
    directory
        .mock_async(|when, then| {
            when.path("/ws/01310900/json/");
            then.status(200).json_body(json!({ "localidade": "São Paulo" }));
        })
        .await;
    let temp_mock = weather
        .mock_async(|when, then| {
            when.path("/v1/current.json");
            then.status(403).json_body(json!({ "error": { "code": 2008, "message": "API key disabled" } }));
        })
        .await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=01310900")).await;
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "temperature service unavailable");
    temp_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_undecodable_weather_body_is_server_error() {
    let directory = MockServer::start_async().await;
    let weather = MockServer::start_async().await;
    directory
        .mock_async(|when, then| {
            when.path("/ws/01310900/json/");
            then.status(200).json_body(json!({ "localidade": "São Paulo" }));
        })
        .await;
    weather
        .mock_async(|when, then| {
            when.path("/v1/current.json");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let config = common::test_config(&directory.base_url(), &weather.base_url(), "http://127.0.0.1:1");
    let resolver = common::spawn_resolver(&config).await;

    let res = get(resolver.url("/weather?cep=01310900")).await;
    assert_eq!(res.status(), 500);
}
