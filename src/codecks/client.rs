//! Remote call primitive for the Codecks API.
//!
//! Every read goes through the single query endpoint with the payload wrapped
//! as `{ "query": ... }`. Writes are dispatched to named action paths such as
//! `cards/create` with the payload sent as-is. One attempt per call.

use std::fmt;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::error::{CodecksError, CodecksResult};
use crate::config::Config;

const ACCOUNT_HEADER: &str = "X-Account";
const TOKEN_HEADER: &str = "X-Auth-Token";

/// Which endpoint a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode<'a> {
    Query,
    Dispatch(&'a str),
}

impl fmt::Display for CallMode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMode::Query => f.write_str("query"),
            CallMode::Dispatch(action) => write!(f, "dispatch:{action}"),
        }
    }
}

#[derive(Serialize)]
struct QueryEnvelope<'a, P: ?Sized> {
    query: &'a P,
}

/// Authenticated client for one Codecks account.
pub struct CodecksClient {
    base_url: String,
    subdomain: String,
    auth_token: String,
    http: Client,
}

impl CodecksClient {
    /// Create a client from validated configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Subdomain, token, base URL and timeout; the timeout
    ///   applies to every request
    ///
    /// # Returns
    ///
    /// The client, or [`CodecksError::Transport`] if the HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> CodecksResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            subdomain: config.subdomain.clone(),
            auth_token: config.auth_token.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    fn url(&self, mode: CallMode<'_>) -> String {
        match mode {
            CallMode::Query => format!("{}/", self.base_url),
            CallMode::Dispatch(action) => format!("{}/dispatch/{}", self.base_url, action),
        }
    }

    /// Issue one call and decode the JSON body.
    ///
    /// Non-success statuses become [`CodecksError::Remote`] carrying the status
    /// and raw body. Network failures, timeouts and undecodable bodies become
    /// [`CodecksError::Transport`].
    #[instrument(skip(self, payload), fields(mode = %mode))]
    pub async fn call<T, P>(&self, payload: &P, mode: CallMode<'_>) -> CodecksResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self
            .http
            .post(self.url(mode))
            .header(ACCOUNT_HEADER, &self.subdomain)
            .header(TOKEN_HEADER, &self.auth_token);

        let request = match mode {
            CallMode::Query => {
                let envelope = QueryEnvelope { query: payload };
                debug!(body = %to_log(&envelope), "sending request");
                request.json(&envelope)
            }
            CallMode::Dispatch(_) => {
                debug!(body = %to_log(payload), "sending request");
                request.json(payload)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "remote call failed");
            return Err(CodecksError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%body, "response received");
        Ok(serde_json::from_str(&body)?)
    }

    /// Read through the query endpoint.
    pub async fn query<T, P>(&self, query: &P) -> CodecksResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.call(query, CallMode::Query).await
    }

    /// Invoke a named action such as `cards/update`.
    pub async fn dispatch<T, P>(&self, action: &str, payload: &P) -> CodecksResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.call(payload, CallMode::Dispatch(action)).await
    }
}

fn to_log<P: Serialize + ?Sized>(payload: &P) -> String {
    serde_json::to_string(payload).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
