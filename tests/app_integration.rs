use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn gold_page(buy: i64, sell: i64) -> String {
        format!(
            r#"<html><body>
<table>
  <thead><tr><th>品名</th><th>規格</th><th>價格</th></tr></thead>
  <tbody>
    <tr><td rowspan="3">黃金存摺</td><td>單位</td><td>1 公克</td></tr>
    <tr><td>本行賣出</td><td>{buy} (每公克)</td></tr>
    <tr><td>本行買進</td><td>{sell} (每公克)</td></tr>
  </tbody>
</table>
</body></html>"#
        )
    }

    /// Serves the gold page and checks the number of requests when dropped.
    pub async fn create_mock_server(status: u16, body: &str, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gold"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
        mock_server
    }
}

struct Workspace {
    _dir: TempDir,
    config_path: PathBuf,
    history_path: PathBuf,
    chart_path: PathBuf,
}

impl Workspace {
    fn new(server_uri: &str, history: Option<&str>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let history_path = dir.path().join("gold_price_history.csv");
        let chart_path = dir.path().join("charts").join("gold.svg");
        let config_path = dir.path().join("properties.yaml");

        if let Some(content) = history {
            fs::write(&history_path, content).expect("Failed to write history file");
        }

        let config_content = format!(
            r#"
bot_url: "{server_uri}/gold"
gold_price_history_path: "{}"
bot_elements:
  table: first
chart:
  output_path: "{}"
"#,
            yaml_path(&history_path),
            yaml_path(&chart_path),
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");

        Self {
            _dir: dir,
            config_path,
            history_path,
            chart_path,
        }
    }

    fn config(&self) -> Option<&str> {
        self.config_path.to_str()
    }

    fn history(&self) -> String {
        fs::read_to_string(&self.history_path).expect("Failed to read history file")
    }
}

fn yaml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn day(s: &str) -> Option<NaiveDate> {
    Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
}

const ONE_DAY: &str = "Date,Buy Price,Sell Price\n2024-01-02,100,105\n";

#[test_log::test(tokio::test)]
async fn test_full_update_flow_with_mock() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(110, 115), 1).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    let result = aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-03")).await;
    assert!(result.is_ok(), "Update failed with: {:?}", result.err());

    let history = ws.history();
    info!(%history, "History after update");
    assert_eq!(
        history,
        "Date,Buy Price,Sell Price\n2024-01-02,100,105\n2024-01-03,110,115\n"
    );
    assert!(ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_second_run_same_day_does_not_fetch() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(110, 115), 1).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    for _ in 0..2 {
        aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-03"))
            .await
            .expect("Update failed");
    }

    assert_eq!(ws.history().lines().count(), 3);
}

#[test_log::test(tokio::test)]
async fn test_weekend_run_does_not_fetch() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(110, 115), 0).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-06"))
        .await
        .expect("Weekend run failed");

    assert_eq!(ws.history(), ONE_DAY);
    assert!(ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_unavailable_source_keeps_history() {
    let server = test_utils::create_mock_server(500, "", 1).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    let result = aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-03")).await;
    assert!(result.is_ok(), "Run should degrade gracefully: {:?}", result.err());

    assert_eq!(ws.history(), ONE_DAY);
    assert!(ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_malformed_page_fails_run() {
    let server = test_utils::create_mock_server(200, "<html><body>down</body></html>", 1).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    let result = aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-03")).await;
    let err = result.expect_err("Parse failure should fail the run");
    assert!(err.to_string().contains("no table found in page"));

    assert_eq!(ws.history(), ONE_DAY);
    assert!(!ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_missing_history_aborts() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(110, 115), 0).await;
    let ws = Workspace::new(&server.uri(), None);

    let result = aurum::run_command(aurum::AppCommand::Update, ws.config(), day("2024-01-03")).await;
    let err = result.expect_err("Missing history should abort");
    assert!(err.to_string().contains("Cannot proceed"));

    assert!(!ws.history_path.exists());
    assert!(!ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_show_never_fetches() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(110, 115), 0).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    aurum::run_command(aurum::AppCommand::Show, ws.config(), day("2024-01-03"))
        .await
        .expect("Show failed");

    assert_eq!(ws.history(), ONE_DAY);
    assert!(ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_quote_fetches_once_and_leaves_history() {
    let server = test_utils::create_mock_server(200, &test_utils::gold_page(2913, 2877), 1).await;
    let ws = Workspace::new(&server.uri(), Some(ONE_DAY));

    aurum::run_command(aurum::AppCommand::Quote, ws.config(), day("2024-01-03"))
        .await
        .expect("Quote failed");

    assert_eq!(ws.history(), ONE_DAY);
    assert!(!ws.chart_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let result = aurum::run_command(
        aurum::AppCommand::Show,
        Some("/nonexistent/aurum/properties.yaml"),
        None,
    )
    .await;
    let err = result.expect_err("Missing config should fail");
    assert!(err.to_string().contains("Failed to read config file"));
}
