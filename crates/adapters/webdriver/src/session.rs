//! Minimal W3C WebDriver client over HTTP.
//!
//! Only the commands the console driver needs: session lifecycle,
//! navigation, element lookup and interaction, and synchronous script
//! execution.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::WebDriverError;
use crate::locator::Locator;

/// Key under which W3C drivers return element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4a5f6f5e8e0d";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// A reference to an element in the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// The JSON form used to pass the element as a script argument.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Self(id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

/// An open browser session.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    base_url: String,
    id: String,
}

impl Session {
    /// Open a new session with the given capabilities.
    ///
    /// # Errors
    ///
    /// Returns a [`WebDriverError`] when the driver is unreachable or
    /// refuses the capabilities.
    #[tracing::instrument(skip_all, fields(webdriver = %base_url))]
    pub async fn start(base_url: &str, capabilities: Value) -> Result<Self, WebDriverError> {
        let http = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(WebDriverError::Http)?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let value = send(&http, Method::POST, format!("{base_url}/session"), Some(body)).await?;
        let session: NewSession = serde_json::from_value(value).map_err(WebDriverError::Decode)?;
        tracing::info!(session_id = %session.session_id, "webdriver session started");
        Ok(Self {
            http,
            base_url,
            id: session.session_id,
        })
    }

    /// Attach to an already running session.
    #[must_use]
    pub fn attach(http: Client, base_url: &str, id: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.id)
        } else {
            format!("{}/session/{}/{path}", self.base_url, self.id)
        };
        send(&self.http, method, url, body).await
    }

    /// End the session and close the browser.
    ///
    /// # Errors
    ///
    /// Returns a [`WebDriverError`] if the driver rejects the request.
    pub async fn quit(&self) -> Result<(), WebDriverError> {
        self.command(Method::DELETE, "", None).await?;
        tracing::info!(session_id = %self.id, "webdriver session closed");
        Ok(())
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        tracing::debug!(%url, "navigating");
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        let value = self.command(Method::GET, "url", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// All elements matching `locator`; empty when nothing matches.
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>, WebDriverError> {
        let body = serde_json::to_value(locator).map_err(WebDriverError::Decode)?;
        let value = self.command(Method::POST, "elements", Some(body)).await?;
        Ok(value
            .as_array()
            .map(|items| items.iter().filter_map(ElementRef::from_json).collect())
            .unwrap_or_default())
    }

    /// First element matching `locator`, if any.
    pub async fn find(&self, locator: &Locator) -> Result<Option<ElementRef>, WebDriverError> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let value = self
            .command(Method::GET, &format!("element/{}/text", element.0), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, WebDriverError> {
        let value = self
            .command(
                Method::GET,
                &format!("element/{}/attribute/{name}", element.0),
                None,
            )
            .await?;
        Ok(value.as_str().map(ToString::to_string))
    }

    /// Lower-case tag name of the element.
    pub async fn tag_name(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let value = self
            .command(Method::GET, &format!("element/{}/name", element.0), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_ascii_lowercase())
    }

    pub async fn is_selected(&self, element: &ElementRef) -> Result<bool, WebDriverError> {
        let value = self
            .command(Method::GET, &format!("element/{}/selected", element.0), None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.command(
            Method::POST,
            &format!("element/{}/click", element.0),
            Some(json!({})),
        )
        .await
        .map(|_| ())
    }

    pub async fn clear(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.command(
            Method::POST,
            &format!("element/{}/clear", element.0),
            Some(json!({})),
        )
        .await
        .map(|_| ())
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        self.command(
            Method::POST,
            &format!("element/{}/value", element.0),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    /// Run a synchronous script and return its result.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }
}

async fn send(
    http: &Client,
    method: Method,
    url: String,
    body: Option<Value>,
) -> Result<Value, WebDriverError> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.map_err(WebDriverError::Http)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(WebDriverError::Http)?;
    let envelope: Envelope = serde_json::from_slice(&bytes).map_err(WebDriverError::Decode)?;

    if status.is_success() {
        return Ok(envelope.value);
    }
    let failure: ErrorValue = serde_json::from_value(envelope.value).unwrap_or(ErrorValue {
        error: "unknown error".to_string(),
        message: String::new(),
    });
    tracing::debug!(status = status.as_u16(), error = %failure.error, "webdriver command failed");
    Err(WebDriverError::Command {
        status: status.as_u16(),
        error: failure.error,
        message: failure.message,
    })
}
