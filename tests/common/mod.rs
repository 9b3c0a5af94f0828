//! Common test utilities and fixtures.

#![allow(dead_code)]

use chrono::NaiveDate;
use pandash_lib::core::{Config, ConfigBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Country list in upstream order (deliberately unsorted).
pub fn catalog_json() -> Value {
    json!([
        {"name": {"common": "Japan", "official": "Japan"}, "cca2": "JP",
         "flags": {"svg": "https://flags.example/jp.svg", "png": "https://flags.example/jp.png"}},
        {"name": {"common": "Åland Islands", "official": "Åland Islands"}, "cca2": "AX",
         "flags": {"png": "https://flags.example/ax.png"}},
        {"name": {"common": "Germany", "official": "Federal Republic of Germany"}, "cca2": "DE",
         "flags": {"svg": "https://flags.example/de.svg"}},
        {"name": {"common": "Albania", "official": "Republic of Albania"}, "cca2": "AL",
         "flags": {}},
        {"name": {"common": "Nowhere", "official": "Nowhere"}, "flags": {}}
    ])
}

/// Current statistics for Japan, without a recovered figure.
pub fn stats_json() -> Value {
    json!({
        "country": "Japan",
        "updated": 1_672_531_200_000_i64,
        "cases": 2_000_000,
        "todayCases": 1200,
        "deaths": 20_000,
        "todayDeaths": 3,
        "active": 10_000,
        "population": 125_000_000
    })
}

/// Ten days of history from 2021-01-01, cases peaking on day 6.
pub fn history_json() -> Value {
    let cases = [100_000, 200_000, 300_000, 400_000, 500_000, 900_000, 800_000, 700_000, 600_000, 500_000];
    let mut timeline_cases = serde_json::Map::new();
    let mut timeline_deaths = serde_json::Map::new();
    let mut timeline_recovered = serde_json::Map::new();
    for (i, value) in cases.iter().enumerate() {
        let key = format!("1/{}/21", i + 1);
        timeline_cases.insert(key.clone(), json!(value));
        timeline_deaths.insert(key.clone(), json!(value / 100));
        timeline_recovered.insert(key, json!(value / 2));
    }
    json!({
        "country": "Japan",
        "timeline": {
            "cases": timeline_cases,
            "deaths": timeline_deaths,
            "recovered": timeline_recovered
        }
    })
}

/// Config with every endpoint pointed at `server`.
pub fn config_for(server: &MockServer) -> Config {
    ConfigBuilder::new()
        .base_url(&server.uri())
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

pub async fn mount_catalog(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v3.1/all"))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_stats(server: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v3/covid-19/countries/{}", code)))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_history(server: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v3/covid-19/historical/{}", code)))
        .and(query_param("lastdays", "1500"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Server answering the catalog and both calls for `jp`.
pub async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;
    mount_stats(&server, "jp", ResponseTemplate::new(200).set_body_json(stats_json())).await;
    mount_history(&server, "jp", ResponseTemplate::new(200).set_body_json(history_json())).await;
    server
}
