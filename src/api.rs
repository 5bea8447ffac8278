// Quote service client: a small blocking HTTP client for the API Ninjas
// quotes endpoint. One request per quote, no retries.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::QuoteError;

const API_KEY_HEADER: &str = "X-Api-Key";

/// A single quote as returned by the service.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub quote: String,
    pub author: String,
    pub category: String,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[-] Quote: {}", self.quote)?;
        writeln!(f, "[-] Author: {}", self.author)?;
        write!(f, "[-] Category: {}", self.category)
    }
}

/// Anything that can hand out a quote, optionally from a category. The
/// session only depends on this so it can run against a stub.
pub trait QuoteSource {
    fn fetch(&self, category: Option<&str>) -> Result<Quote, QuoteError>;
}

/// Blocking client holding the reqwest client, the endpoint URL and the
/// API key sent with every request.
#[derive(Clone)]
pub struct QuoteClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl QuoteClient {
    /// Create a client for the endpoint and key in `config`. A missing key
    /// is not an error here; fetching reports it instead.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// Use an already configured reqwest client.
    pub fn with_client(client: Client, config: &Config) -> Self {
        QuoteClient {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Fetch a quote and render it for the console: the formatted quote on
    /// success, the error text (status and body for HTTP failures) otherwise.
    pub fn fetch_formatted(&self, category: Option<&str>) -> String {
        match self.fetch(category) {
            Ok(quote) => quote.to_string(),
            Err(err) => err.to_string(),
        }
    }
}

impl QuoteSource for QuoteClient {
    fn fetch(&self, category: Option<&str>) -> Result<Quote, QuoteError> {
        let key = self.api_key.as_deref().ok_or(QuoteError::MissingApiKey)?;

        let mut req = self.client.get(&self.api_url).header(API_KEY_HEADER, key);
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }

        debug!(url = %self.api_url, ?category, "requesting quote");
        let res = req.send()?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            warn!(%status, "quote service returned an error");
            return Err(QuoteError::Status { status, body });
        }

        let body = res.text()?;
        first_quote(&body)
    }
}

/// Parse the service's JSON array and keep the first entry.
pub fn first_quote(body: &str) -> Result<Quote, QuoteError> {
    let quotes: Vec<Quote> = serde_json::from_str(body).map_err(QuoteError::Decode)?;
    quotes.into_iter().next().ok_or(QuoteError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_quote_takes_the_first_entry() {
        let body = r#"[
            {"quote": "Q1", "author": "A1", "category": "C1"},
            {"quote": "Q2", "author": "A2", "category": "C2"}
        ]"#;
        let quote = first_quote(body).unwrap();
        assert_eq!(quote.quote, "Q1");
        assert_eq!(quote.author, "A1");
        assert_eq!(quote.category, "C1");
    }

    #[test]
    fn empty_array_is_reported() {
        assert!(matches!(first_quote("[]"), Err(QuoteError::Empty)));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            first_quote(r#"{"error": "nope"}"#),
            Err(QuoteError::Decode(_))
        ));
    }

    #[test]
    fn display_lists_quote_author_and_category() {
        let quote = Quote {
            quote: "Stay hungry".into(),
            author: "Someone".into(),
            category: "inspirational".into(),
        };
        assert_eq!(
            quote.to_string(),
            "[-] Quote: Stay hungry\n[-] Author: Someone\n[-] Category: inspirational"
        );
    }

    #[test]
    fn missing_key_fails_without_a_request() {
        let config = Config {
            api_url: "http://127.0.0.1:9/unreachable".into(),
            ..Config::default()
        };
        let client = QuoteClient::from_config(&config).unwrap();
        assert!(matches!(client.fetch(None), Err(QuoteError::MissingApiKey)));
        assert!(client.fetch_formatted(None).contains("no API key"));
    }

    #[test]
    fn status_error_includes_code_and_body() {
        let err = QuoteError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "missing".into(),
        };
        assert_eq!(err.to_string(), "Error: 404 Not Found missing");
    }
}
