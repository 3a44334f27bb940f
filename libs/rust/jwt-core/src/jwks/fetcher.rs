//! One JWKS GET, mapped to domain errors.

use std::sync::Arc;
use tracing::{instrument, warn};

use crate::error::{FormatError, JwtError, TransportError};
use crate::events::{EventSink, JwtEvent};
use crate::jwks::http::{HttpClient, HttpRequest, HttpResponse};
use crate::jwks::model::JsonWebKeySet;
use crate::jwks::uri::JwksUri;

/// Default `User-Agent`.
pub const DEFAULT_USER_AGENT: &str = concat!("jwt-core/", env!("CARGO_PKG_VERSION"));

/// Fetches and parses key sets. Never retries.
pub struct JwksFetcher<H> {
    client: H,
    user_agent: String,
    events: Arc<dyn EventSink>,
}

impl<H: HttpClient> JwksFetcher<H> {
    /// Fetcher with [`DEFAULT_USER_AGENT`].
    pub fn new(client: H, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            events,
        }
    }

    /// Override the `User-Agent`.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// GET `uri` and parse the body as a JWKS.
    ///
    /// # Errors
    ///
    /// [`JwtError::Transport`] for network failures, non-200 statuses and
    /// empty bodies; [`JwtError::Format`] for unparseable documents.
    #[instrument(skip(self), fields(host = %uri.host()))]
    pub async fn fetch(&self, uri: &JwksUri) -> Result<JsonWebKeySet, JwtError> {
        self.events.emit(&JwtEvent::FetchStarted {
            uri: uri.to_string(),
        });

        match self.fetch_inner(uri).await {
            Ok(set) => {
                self.events.emit(&JwtEvent::FetchCompleted {
                    uri: uri.to_string(),
                    key_count: set.len(),
                });
                Ok(set)
            }
            Err(e) => {
                self.events.emit(&JwtEvent::FetchFailed {
                    uri: uri.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_inner(&self, uri: &JwksUri) -> Result<JsonWebKeySet, JwtError> {
        let request = HttpRequest::get(uri.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str())
            .header("Cache-Control", "no-cache");

        let response = self.client.send(request).await?;
        let body = check_response(uri, &response)?;
        Ok(JsonWebKeySet::parse(body)?)
    }
}

fn check_response<'a>(uri: &JwksUri, response: &'a HttpResponse) -> Result<&'a str, JwtError> {
    if response.status != 200 {
        return Err(TransportError::Status {
            status: response.status,
            reason: response.reason.clone(),
        }
        .into());
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(TransportError::EmptyBody.into());
    }

    let content_type = response.content_type().unwrap_or_default();
    if !content_type.to_ascii_lowercase().contains("json") {
        warn!(
            target: "jwks",
            uri = %uri,
            content_type = %content_type,
            "JWKS response is not JSON content; parsing anyway"
        );
    }

    std::str::from_utf8(&response.body)
        .map_err(|e| FormatError::InvalidJson(e.to_string()).into())
}
