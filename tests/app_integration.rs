use sectorscope::Analyzer;
use sectorscope::core::config::AppConfig;
use sectorscope::core::sector::{MARKET_BENCHMARK, Sector};
use sectorscope::core::status::{HealthState, Source};
use sectorscope::store::DiskStore;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::info;

mod test_utils {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn chart_body(bars: usize, final_close: f64) -> String {
        let timestamps: Vec<i64> = (0..bars as i64).map(|i| 1_650_000_000 + i * 86_400).collect();
        let mut closes = vec![100.0; bars];
        if let Some(last) = closes.last_mut() {
            *last = final_close;
        }
        let volumes = vec![1_000.0; bars];
        format!(
            r#"{{"chart":{{"result":[{{"timestamp":{timestamps:?},"indicators":{{"quote":[{{"close":{closes:?},"volume":{volumes:?}}}]}}}}]}}}}"#
        )
    }

    pub async fn mount_charts(server: &MockServer) {
        // Give each sector a distinct 12-month return so the ranking is
        // non-trivial; the benchmark sits in the middle of the pack.
        for (offset, sector) in Sector::ALL.into_iter().enumerate() {
            let body = chart_body(300, 100.0 + offset as f64 * 2.0);
            Mock::given(method("GET"))
                .and(path(format!("/v8/finance/chart/{}", sector.etf_ticker())))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{MARKET_BENCHMARK}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(chart_body(300, 110.0)))
            .mount(server)
            .await;
    }

    pub async fn mount_quotes(server: &MockServer) {
        let quotes: Vec<String> = Sector::ALL
            .into_iter()
            .enumerate()
            .map(|(offset, sector)| {
                format!(
                    r#"{{"symbol":"{}","forwardPE":{}}}"#,
                    sector.etf_ticker(),
                    12.0 + offset as f64 * 1.5
                )
            })
            .collect();
        let body = format!(r#"{{"quoteResponse":{{"result":[{}]}}}}"#, quotes.join(","));
        Mock::given(method("GET"))
            .and(path("/v7/finance/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_employment(server: &MockServer) {
        let series: Vec<String> = Sector::ALL
            .into_iter()
            .enumerate()
            .map(|(offset, sector)| {
                // 14 monthly points ending Feb 2024, each sector growing at
                // its own rate.
                let points: Vec<String> = (0..14u32)
                    .map(|i| {
                        let year = 2023 + (i / 12);
                        let month = 1 + (i % 12);
                        let value = 1_000.0 + f64::from(i) * (1.0 + offset as f64);
                        format!(
                            r#"{{"year":"{year}","period":"M{month:02}","value":"{value}"}}"#
                        )
                    })
                    .collect();
                format!(
                    r#"{{"seriesID":"{}","data":[{}]}}"#,
                    sector.bls_series(),
                    points.join(",")
                )
            })
            .collect();
        let body = format!(
            r#"{{"status":"REQUEST_SUCCEEDED","Results":{{"series":[{}]}}}}"#,
            series.join(",")
        );
        Mock::given(method("POST"))
            .and(path("/publicAPI/v2/timeseries/data/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_rates(server: &MockServer) {
        let observations: Vec<String> = (0..30u32)
            .map(|i| {
                let year = 2022 + (i / 12);
                let month = 1 + (i % 12);
                format!(
                    r#"{{"date":"{year}-{month:02}-15","value":"{}"}}"#,
                    3.0 + f64::from(i % 2) * 0.2
                )
            })
            .collect();
        let body = format!(r#"{{"observations":[{}]}}"#, observations.join(","));
        Mock::given(method("GET"))
            .and(path("/fred/series/observations"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_rd(server: &MockServer) {
        let body = "\
Industry Name,Number of firms,R&D/Sales\n\
Semiconductor,80,12.00%\n\
Software (System & Application),120,16.00%\n\
Drugs (Biotechnology),150,25.00%\n\
Banks (Regional),500,0.10%\n\
Utility (General),60,0.05%\n\
Telecom Services,40,1.20%\n";
        Mock::given(method("GET"))
            .and(path("/~adamodar/pc/datasets/R&D.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    /// Mounts every provider endpoint on one server.
    pub async fn full_mock_server() -> MockServer {
        let server = MockServer::start().await;
        mount_charts(&server).await;
        mount_quotes(&server).await;
        mount_employment(&server).await;
        mount_rates(&server).await;
        mount_rd(&server).await;
        server
    }

    pub fn config_for(server_uri: &str, data_dir: &std::path::Path) -> AppConfig {
        let yaml = format!(
            r#"
providers:
  yahoo:
    base_url: {server_uri}
  bls:
    base_url: {server_uri}
  fred:
    base_url: {server_uri}
  damodaran:
    base_url: {server_uri}
cache_ttl_hours: 12
lookback_years: 5
data_path: {}
"#,
            data_dir.display()
        );
        serde_yaml::from_str(&yaml).expect("test config must parse")
    }

    pub fn analyzer_for(config: &AppConfig) -> Analyzer {
        let cache_dir = config.cache_path().expect("cache path");
        let cache = Arc::new(DiskStore::new(cache_dir).expect("disk store"));
        Analyzer::new(config, cache)
    }

    pub fn ensure_api_keys() {
        // The FRED source refuses to run without a key, and the BLS source
        // reports a credential warning without one; the mocks accept any.
        unsafe {
            std::env::set_var("FRED_API_KEY", "integration-test-key");
            std::env::set_var("BLS_API_KEY", "integration-test-key");
        }
    }
}

#[test_log::test(tokio::test)]
async fn test_full_scores_flow_with_mocks() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let response = analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect("scoring should succeed with all sources up");

    info!(?response.timestamp, "scored all sectors");
    assert_eq!(response.scores.len(), 11);

    // Ranks are a gapless permutation and composites are non-increasing.
    let mut ranks: Vec<usize> = response.scores.iter().map(|s| s.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=11).collect::<Vec<_>>());
    for pair in response.scores.windows(2) {
        assert!(pair[0].opportunity_score >= pair[1].opportunity_score);
    }

    // All component scores in range; weights renormalized to 1.
    for score in &response.scores {
        for component in [
            score.opportunity_score,
            score.momentum_score,
            score.valuation_score,
            score.growth_score,
            score.innovation_score,
            score.macro_score,
        ] {
            assert!((0.0..=100.0).contains(&component));
        }
    }
    let weight_sum: f64 = response.weights_used.values().sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);

    // Display metrics flow through from the providers.
    let tech = response
        .scores
        .iter()
        .find(|s| s.sector == "Information Technology")
        .expect("tech sector present");
    assert!(tech.metrics.forward_pe.is_some());
    assert!(tech.metrics.return_12mo.is_some());
    assert!(tech.metrics.rd_intensity.is_some());

    // Every source reports healthy.
    let report = analyzer.data_quality().await;
    assert_eq!(report.overall_status, HealthState::Ok);
}

#[test_log::test(tokio::test)]
async fn test_momentum_only_weights_match_momentum_scores() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let weights = HashMap::from([
        ("momentum".to_string(), 1.0),
        ("valuation".to_string(), 0.0),
        ("growth".to_string(), 0.0),
        ("innovation".to_string(), 0.0),
        ("macro".to_string(), 0.0),
    ]);
    let response = analyzer.get_scores(&weights, false).await.expect("scores");

    assert_eq!(response.weights_used["momentum"], 1.0);
    for score in &response.scores {
        assert_eq!(score.opportunity_score, score.momentum_score);
    }
}

#[test_log::test(tokio::test)]
async fn test_scores_are_idempotent_within_ttl() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let first = analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect("first scoring");
    let second = analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect("second scoring");

    assert_eq!(
        serde_json::to_value(&first.scores).expect("serialize"),
        serde_json::to_value(&second.scores).expect("serialize")
    );

    // A second analyzer over the same cache directory also reuses the data.
    let reopened = test_utils::analyzer_for(&config);
    let third = reopened
        .get_scores(&HashMap::new(), false)
        .await
        .expect("third scoring");
    assert_eq!(
        serde_json::to_value(&first.scores).expect("serialize"),
        serde_json::to_value(&third.scores).expect("serialize")
    );
}

#[test_log::test(tokio::test)]
async fn test_one_source_down_degrades_to_neutral_scores() {
    test_utils::ensure_api_keys();
    // Everything mounted except the valuation endpoint.
    let server = wiremock::MockServer::start().await;
    test_utils::mount_charts(&server).await;
    test_utils::mount_employment(&server).await;
    test_utils::mount_rates(&server).await;
    test_utils::mount_rd(&server).await;

    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let response = analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect("partial data still scores");

    assert_eq!(response.scores.len(), 11);
    for score in &response.scores {
        assert_eq!(score.valuation_score, 50.0);
        assert_eq!(score.metrics.forward_pe, None);
    }
    // Other signals still differentiate the sectors.
    let momentum_values: Vec<f64> = response.scores.iter().map(|s| s.momentum_score).collect();
    assert!(momentum_values.iter().any(|&m| m != 50.0));

    let report = analyzer.data_quality().await;
    assert_eq!(report.overall_status, HealthState::Error);
    let valuation = report
        .sources
        .iter()
        .find(|s| s.source == Source::Valuation)
        .expect("valuation status");
    assert_eq!(valuation.state, HealthState::Error);
}

#[test_log::test(tokio::test)]
async fn test_all_sources_down_yields_explicit_no_data_error() {
    test_utils::ensure_api_keys();
    // A server with nothing mounted: every provider 404s, and the cache
    // directory is empty.
    let server = wiremock::MockServer::start().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let err = analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect_err("no data should fail");
    assert!(err.to_string().contains("no data available"));

    let report = analyzer.data_quality().await;
    assert_eq!(report.overall_status, HealthState::Error);
}

#[test_log::test(tokio::test)]
async fn test_cache_lifecycle_info_clear_refresh() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    analyzer
        .get_scores(&HashMap::new(), false)
        .await
        .expect("initial scoring");

    let info = analyzer.cache_info().await;
    assert_eq!(info.total_files, 5);
    assert_eq!(info.valid_files, 5);
    assert_eq!(info.expired_files, 0);
    assert!(info.total_size_bytes > 0);

    let cleared = analyzer.clear_cache().await;
    assert_eq!(cleared.files_removed, 5);
    assert_eq!(analyzer.cache_info().await.total_files, 0);

    // A forced refresh repopulates every entry.
    analyzer
        .get_scores(&HashMap::new(), true)
        .await
        .expect("refresh scoring");
    assert_eq!(analyzer.cache_info().await.total_files, 5);
}

#[test_log::test(tokio::test)]
async fn test_summary_flow() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = test_utils::config_for(&server.uri(), data_dir.path());
    let analyzer = test_utils::analyzer_for(&config);

    let summary = analyzer
        .get_summary(&HashMap::new())
        .await
        .expect("summary");

    assert_eq!(summary.top_sectors.len(), 3);
    assert_eq!(summary.bottom_sectors.len(), 3);
    assert_eq!(summary.top_sectors[0].rank, 1);
    assert_eq!(summary.bottom_sectors[2].rank, 11);
    assert_eq!(summary.top_sector_drivers.len(), 3);
    assert!(summary.score_distribution.spread >= 0.0);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_through_cli_command() {
    test_utils::ensure_api_keys();
    let server = test_utils::full_mock_server().await;
    let data_dir = tempfile::tempdir().expect("tempdir");

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
providers:
  yahoo:
    base_url: {uri}
  bls:
    base_url: {uri}
  fred:
    base_url: {uri}
  damodaran:
    base_url: {uri}
data_path: {data}
"#,
        uri = server.uri(),
        data = data_dir.path().display()
    );
    fs::write(config_file.path(), &config_content).expect("Failed to write config file");

    let result = sectorscope::run_command(
        sectorscope::AppCommand::Scores {
            weights: HashMap::new(),
            refresh: false,
        },
        Some(config_file.path().to_str().expect("utf-8 path")),
    )
    .await;
    assert!(
        result.is_ok(),
        "Scores command failed with: {:?}",
        result.err()
    );

    let result = sectorscope::run_command(
        sectorscope::AppCommand::CacheInfo,
        Some(config_file.path().to_str().expect("utf-8 path")),
    )
    .await;
    assert!(result.is_ok());
}
