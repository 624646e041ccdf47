use crate::config::HarvestConfig;
use crate::crawlers::crawler::Renderer;
use crate::error::{HarvestError, RenderError};
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

/// Grace period on top of the driver's own page-load timeout
const NAVIGATION_SLACK: Duration = Duration::from_secs(5);

/// Common local WebDriver endpoints tried when the configured one refuses
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// The single WebDriver session shared by search and fetch
pub struct WebDriverSession {
    client: Client,
    page_load_timeout: Duration,
}

impl WebDriverSession {
    /// Opens a browser session configured for scraping.
    ///
    /// `WEBDRIVER_URL` in the environment overrides the configured endpoint.
    pub async fn connect(config: &HarvestConfig) -> Result<Self, HarvestError> {
        let mut webdriver_url = config.webdriver_url.clone();
        if let Ok(from_env) = std::env::var("WEBDRIVER_URL") {
            if !from_env.is_empty() {
                webdriver_url = from_env;
            }
        }

        let capabilities = chrome_capabilities(config);
        let client = connect_to_webdriver(&webdriver_url, &capabilities).await?;

        let page_load_timeout = config.page_load_timeout();
        let timeouts = TimeoutConfiguration::new(None, Some(page_load_timeout), None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            ::log::warn!("Could not set page load timeout: {}", e);
        }

        Ok(Self {
            client,
            page_load_timeout,
        })
    }

    /// Ends the browser session
    pub async fn close(self) {
        match self.client.close().await {
            Ok(()) => ::log::info!("WebDriver session closed"),
            Err(e) => ::log::warn!("Failed to close WebDriver session: {}", e),
        }
    }
}

#[async_trait]
impl Renderer for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), RenderError> {
        let secs = self.page_load_timeout.as_secs();
        match timeout(self.page_load_timeout + NAVIGATION_SLACK, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(classify_command_error(e, secs)),
            Err(_) => Err(RenderError::Timeout(secs)),
        }
    }

    async fn ready_state(&self) -> Result<String, RenderError> {
        let value = self
            .client
            .execute("return document.readyState", Vec::new())
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn source(&self) -> Result<String, RenderError> {
        Ok(self.client.source().await?)
    }
}

/// Chrome options: headless, automation flags hidden, direct connection
fn chrome_capabilities(config: &HarvestConfig) -> Capabilities {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--no-proxy-server".to_string(),
        "--proxy-bypass-list=*".to_string(),
        "--window-size=1400,1000".to_string(),
        format!("--user-agent={}", config.user_agent),
    ];
    if config.headless {
        args.insert(0, "--headless".to_string());
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

/// Connects to the WebDriver instance, trying common local endpoints on failure
async fn connect_to_webdriver(
    webdriver_url: &str,
    capabilities: &Capabilities,
) -> Result<Client, HarvestError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::info!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS {
        if url == webdriver_url {
            continue;
        }
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::info!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::WebDriver(first_error))
}

/// Maps a driver command failure onto the render error taxonomy
fn classify_command_error(error: fantoccini::error::CmdError, timeout_secs: u64) -> RenderError {
    classify_driver_message(&error.to_string(), timeout_secs)
}

fn classify_driver_message(message: &str, timeout_secs: u64) -> RenderError {
    let lowered = message.to_lowercase();
    if lowered.contains("timeout") || lowered.contains("timed out") {
        RenderError::Timeout(timeout_secs)
    } else {
        if lowered.contains("unable to find session") || lowered.contains("invalid session") {
            ::log::warn!("WebDriver session lost: {}", message);
        }
        RenderError::Driver(message.to_string())
    }
}
