use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use drover_core::config::{AppConfig, ConfigError, LoadOptions};
use drover_core::triggers::default_registry;
use drover_search::{HttpSearchClient, SearchError};
use drover_slack::events::EventDispatcher;
use drover_slack::identity::HttpIdentityLookup;
use drover_slack::outbound::HttpChatSender;
use drover_slack::sessions::SessionService;
use drover_slack::socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner};

pub struct Application {
    pub config: AppConfig,
    pub slack_runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("search client construction failed: {0}")]
    SearchClient(#[source] SearchError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let search = HttpSearchClient::new(
        config.search.api_key.clone(),
        config.search.base_url.clone(),
        Duration::from_secs(config.search.timeout_secs),
    )
    .map_err(BootstrapError::SearchClient)?;
    let sender = HttpChatSender::new(config.slack.bot_token.clone());
    let identity = HttpIdentityLookup::new(config.slack.bot_token.clone());

    let service = SessionService::new(
        default_registry(),
        Arc::new(sender),
        Arc::new(identity),
        Arc::new(search),
    );
    let dispatcher = EventDispatcher::new(Arc::new(service));

    // The concrete Socket Mode connection is supplied by the deployment;
    // the runner degrades to an inert transport when none is wired.
    let slack_runner = SocketModeRunner::new(
        Arc::new(NoopSocketTransport),
        dispatcher,
        ReconnectPolicy::default(),
    );

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "application collaborators wired"
    );

    Ok(Application { config, slack_runner })
}

#[cfg(test)]
mod tests {
    use drover_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_without_required_slack_tokens() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_app_token: Some("invalid-token".to_string()),
                slack_bot_token: Some("xoxb-valid".to_string()),
                search_api_key: Some("yelp-test-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("slack.app_token"));
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_the_search_credential() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_app_token: Some("xapp-test".to_string()),
                slack_bot_token: Some("xoxb-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("search.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_succeeds_with_valid_overrides() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                slack_app_token: Some("xapp-test".to_string()),
                slack_bot_token: Some("xoxb-test".to_string()),
                search_api_key: Some("yelp-test-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        assert_eq!(app.config.server.port, 9090);
    }
}
