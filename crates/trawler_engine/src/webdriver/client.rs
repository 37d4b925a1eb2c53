use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{json, Map, Value};
use thiserror::Error;
use url::Url;

use crate::SurfaceError;

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4bd8ff9c9e4b";

pub const KEY_ARROW_DOWN: char = '\u{E015}';
pub const KEY_ARROW_UP: char = '\u{E013}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Wire form, used as a script argument.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(ELEMENT_KEY.to_string(), Value::String(self.0.clone()));
        Value::Object(map)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .find(|(key, _)| key.as_str() == ELEMENT_KEY || key.as_str() == "ELEMENT")
            .and_then(|(_, id)| id.as_str())
            .map(Self::new)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebDriverError {
    #[error("invalid webdriver endpoint: {0}")]
    Endpoint(String),
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("stale element reference: {0}")]
    StaleElement(String),
    #[error("webdriver timeout: {0}")]
    Timeout(String),
    #[error("invalid session: {0}")]
    InvalidSession(String),
    #[error("{error}: {message}")]
    Protocol { error: String, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<WebDriverError> for SurfaceError {
    fn from(err: WebDriverError) -> Self {
        match err {
            WebDriverError::NoSuchElement(msg) => SurfaceError::NotFound(msg),
            WebDriverError::StaleElement(msg) => SurfaceError::Stale(msg),
            WebDriverError::Timeout(msg) => SurfaceError::Timeout(msg),
            WebDriverError::InvalidSession(msg) | WebDriverError::Transport(msg) => {
                SurfaceError::SessionLost(msg)
            }
            other => SurfaceError::Other(other.to_string()),
        }
    }
}

/// Minimal W3C WebDriver client bound to one session.
#[derive(Debug, Clone)]
pub struct WebDriver {
    http: Client,
    base: Url,
    session_id: String,
}

impl WebDriver {
    /// Create a new session on the WebDriver server at `endpoint`.
    pub async fn connect(
        endpoint: &str,
        capabilities: Value,
        request_timeout: Duration,
    ) -> Result<Self, WebDriverError> {
        let base = parse_endpoint(endpoint)?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| WebDriverError::Transport(err.to_string()))?;

        let url = join(&base, "session")?;
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let value = send(&http, Method::POST, url, Some(body)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Decode("missing sessionId".to_string()))?
            .to_string();

        Ok(Self {
            http,
            base,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await
            .map(drop)
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    pub async fn current_window(&self) -> Result<String, WebDriverError> {
        let value = self.command(Method::GET, "window", None).await?;
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| WebDriverError::Decode(format!("window handle: {value}")))
    }

    pub async fn window_handles(&self) -> Result<Vec<String>, WebDriverError> {
        let value = self.command(Method::GET, "window/handles", None).await?;
        serde_json::from_value(value).map_err(|err| WebDriverError::Decode(err.to_string()))
    }

    pub async fn switch_to_window(&self, handle: &str) -> Result<(), WebDriverError> {
        self.command(Method::POST, "window", Some(json!({ "handle": handle })))
            .await
            .map(drop)
    }

    /// `Ok(None)` when nothing matches the CSS selector.
    pub async fn find_element(&self, css: &str) -> Result<Option<ElementRef>, WebDriverError> {
        let body = json!({ "using": "css selector", "value": css });
        match self.command(Method::POST, "element", Some(body)).await {
            Ok(value) => element_from(&value).map(Some),
            Err(WebDriverError::NoSuchElement(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn active_element(&self) -> Result<ElementRef, WebDriverError> {
        let value = self.command(Method::GET, "element/active", None).await?;
        element_from(&value)
    }

    pub async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, WebDriverError> {
        let path = format!("element/{}/attribute/{}", element.id(), name);
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_str().map(ToOwned::to_owned))
    }

    pub async fn is_displayed(&self, element: &ElementRef) -> Result<bool, WebDriverError> {
        let path = format!("element/{}/displayed", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn is_enabled(&self, element: &ElementRef) -> Result<bool, WebDriverError> {
        let path = format!("element/{}/enabled", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        let path = format!("element/{}/click", element.id());
        self.command(Method::POST, &path, Some(json!({})))
            .await
            .map(drop)
    }

    /// Press and release one key on the focused element.
    pub async fn press_key(&self, key: char) -> Result<(), WebDriverError> {
        let key = key.to_string();
        let body = json!({
            "actions": [{
                "type": "key",
                "id": "keyboard",
                "actions": [
                    { "type": "keyDown", "value": key },
                    { "type": "keyUp", "value": key },
                ],
            }]
        });
        self.command(Method::POST, "actions", Some(body))
            .await
            .map(drop)
    }

    pub async fn quit(&self) -> Result<(), WebDriverError> {
        let url = join(&self.base, &format!("session/{}", self.session_id))?;
        send(&self.http, Method::DELETE, url, None).await.map(drop)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = join(&self.base, &format!("session/{}/{}", self.session_id, path))?;
        send(&self.http, method, url, body).await
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, WebDriverError> {
    let mut base =
        Url::parse(endpoint).map_err(|err| WebDriverError::Endpoint(format!("{endpoint}: {err}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn join(base: &Url, path: &str) -> Result<Url, WebDriverError> {
    base.join(path)
        .map_err(|err| WebDriverError::Endpoint(format!("{path}: {err}")))
}

fn element_from(value: &Value) -> Result<ElementRef, WebDriverError> {
    ElementRef::from_json(value)
        .ok_or_else(|| WebDriverError::Decode(format!("not an element reference: {value}")))
}

async fn send(
    http: &Client,
    method: Method,
    url: Url,
    body: Option<Value>,
) -> Result<Value, WebDriverError> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let mut payload: Value = response
        .json()
        .await
        .map_err(|err| WebDriverError::Decode(err.to_string()))?;
    let value = payload
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.as_str())
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(classify(error, message))
}

fn classify(error: String, message: String) -> WebDriverError {
    match error.as_str() {
        "no such element" => WebDriverError::NoSuchElement(message),
        "stale element reference" => WebDriverError::StaleElement(message),
        "timeout" | "script timeout" => WebDriverError::Timeout(message),
        "invalid session id" | "no such window" | "session not created" => {
            WebDriverError::InvalidSession(message)
        }
        _ => WebDriverError::Protocol { error, message },
    }
}

fn map_reqwest_error(err: reqwest::Error) -> WebDriverError {
    if err.is_timeout() {
        return WebDriverError::Timeout(err.to_string());
    }
    WebDriverError::Transport(err.to_string())
}
