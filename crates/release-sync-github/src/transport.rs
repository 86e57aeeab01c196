use std::error::Error as _;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use release_sync::{DownloadError, FetchError};
use serde::de::DeserializeOwned;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent on API calls. GitHub rejects requests without one.
pub const API_USER_AGENT: &str = "release-sync";

/// The request methods the transport supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DownloadError;

    /// Case-insensitive. Anything other than GET, POST, DELETE or HEAD is
    /// rejected with [`DownloadError::UnsupportedMethod`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            _ => Err(DownloadError::UnsupportedMethod(s.to_owned())),
        }
    }
}

/// Ordered set of request headers. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers for GitHub REST API calls. The token, when present, is sent
    /// as a bearer credential.
    pub fn github_api(token: Option<&str>) -> Self {
        let headers = Self::new()
            .with("Accept", "application/vnd.github.v3+json")
            .with("User-Agent", API_USER_AGENT);

        match token {
            Some(token) if !token.is_empty() => {
                headers.with("Authorization", format!("Bearer {token}"))
            }
            _ => headers,
        }
    }

    /// Headers for plain downloads from servers that expect a browser.
    pub fn browser(user_agent: &str) -> Self {
        Self::new().with("User-Agent", user_agent)
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Thin wrapper over a `reqwest::Client` that reports every failure as a
/// [`DownloadError`].
///
/// Requests are attempted once; retrying is up to the caller.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    ///
    /// Non-streaming requests are bounded by `timeout` end to end. Streaming
    /// requests are bounded per connect and per read, so a large body can take
    /// longer than `timeout` as long as data keeps arriving.
    pub fn new(timeout: Duration) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| DownloadError::unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Send one request and return the response if its status is 2xx.
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &HeaderSet,
        body: Option<&serde_json::Value>,
        stream: bool,
    ) -> Result<reqwest::Response, DownloadError> {
        let mut req = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Delete => self.client.delete(url),
            HttpMethod::Head => self.client.head(url),
        };

        for (name, value) in headers.iter() {
            req = req.header(name, value);
        }

        if let Some(body) = body {
            req = req.json(body);
        }

        if !stream {
            req = req.timeout(self.timeout);
        }

        let response = req.send().await.map_err(|e| classify(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &HeaderSet,
    ) -> Result<reqwest::Response, DownloadError> {
        self.request(HttpMethod::Get, url, headers, None, false).await
    }

    pub async fn head(
        &self,
        url: &str,
        headers: &HeaderSet,
    ) -> Result<reqwest::Response, DownloadError> {
        self.request(HttpMethod::Head, url, headers, None, false).await
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &HeaderSet,
    ) -> Result<T, FetchError> {
        let response = self.get(url, headers).await?;
        decode_json(response, url).await
    }
}

/// Decode a response body as JSON. Malformed bodies are parse errors;
/// failures while reading the body are classified like request failures.
pub async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, FetchError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            FetchError::Parse(format!("invalid JSON from {url}: {e}"))
        } else {
            classify(&e, url).into()
        }
    })
}

/// Map a reqwest failure onto the download error family.
pub fn classify(err: &reqwest::Error, url: &str) -> DownloadError {
    if err.is_timeout() || has_io_error(err, &[io::ErrorKind::TimedOut]) {
        return DownloadError::Timeout {
            url: url.to_owned(),
        };
    }

    if err.is_connect()
        || has_io_error(
            err,
            &[
                io::ErrorKind::ConnectionRefused,
                io::ErrorKind::ConnectionReset,
                io::ErrorKind::ConnectionAborted,
                io::ErrorKind::NotConnected,
                io::ErrorKind::BrokenPipe,
            ],
        )
    {
        return DownloadError::Connection {
            url: url.to_owned(),
        };
    }

    if let Some(status) = err.status() {
        return DownloadError::Http {
            status: status.as_u16(),
            url: url.to_owned(),
        };
    }

    DownloadError::unknown(err.to_string())
}

fn has_io_error(err: &reqwest::Error, kinds: &[io::ErrorKind]) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>()
            && kinds.contains(&io_err.kind())
        {
            return true;
        }
        source = inner.source();
    }
    false
}
