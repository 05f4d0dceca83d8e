// Composition root: everything is built once here and passed down explicitly.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::infrastructure::notion::{
    NotionDatabaseRepository, NotionHttpClient, NotionPageRepository,
};
use crate::rpc::stdio::serve_stdio;
use crate::rpc::McpServerState;

pub type NotionServerState = McpServerState<NotionPageRepository, NotionDatabaseRepository>;

pub fn build_client(config: &ServerConfig) -> Result<Arc<NotionHttpClient>> {
    let client = NotionHttpClient::new(config.client_config())
        .context("failed to build notion http client")?;
    Ok(Arc::new(client))
}

pub fn build_state(client: &Arc<NotionHttpClient>) -> NotionServerState {
    let pages = Arc::new(NotionPageRepository::new(Arc::clone(client)));
    let databases = Arc::new(NotionDatabaseRepository::new(Arc::clone(client)));
    McpServerState::from_repositories(pages, databases)
}

/// Serve until stdin closes or ctrl-c.
pub async fn run(config: ServerConfig) -> Result<()> {
    let client = build_client(&config)?;

    if client.validate_api_key().await {
        info!(base_url = %config.api_base_url, "notion api key accepted");
    } else {
        warn!(base_url = %config.api_base_url, "notion api key could not be validated; tool calls may fail");
    }

    let state = build_state(&client);
    tokio::select! {
        result = serve_stdio(state) => result.context("stdio server exited with error"),
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, shutting down");
            Ok(())
        }
    }
}

/// Checks the credential against the remote API without serving.
pub async fn check(config: &ServerConfig) -> Result<bool> {
    let client = build_client(config)?;
    Ok(client.validate_api_key().await)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn config(base_url: &str) -> ServerConfig {
        ServerConfig {
            api_key: "secret_test".to_string(),
            api_base_url: Url::parse(base_url).unwrap(),
            notion_version: "2022-06-28".to_string(),
            log_filter: "info".to_string(),
            http_timeout: Some(Duration::from_secs(1)),
        }
    }

    #[tokio::test]
    async fn check_reports_unreachable_api_as_invalid() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let valid = check(&config(&format!("http://127.0.0.1:{port}/v1"))).await.unwrap();
        assert!(!valid);
    }

    #[test]
    fn blank_key_fails_to_build_client() {
        let mut config = config("http://127.0.0.1:9/v1");
        config.api_key = " ".to_string();
        let error = build_client(&config).expect_err("blank key should fail");
        assert!(format!("{error:#}").contains("Notion API key is required"));
    }
}
