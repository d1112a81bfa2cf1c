//! HTTP client for the polled JSON API.

use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;
use crate::link;

/// Basic-auth credentials passed through to the API.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// API token used as the basic-auth password.
    pub token: String,
}

/// One decoded page of an API response.
#[derive(Debug)]
pub struct Page<T> {
    /// The decoded JSON body.
    pub body: T,
    /// Next-page URL from the `Link` header, absent on the last page.
    pub next: Option<String>,
}

/// HTTP client for JSON GET requests with pagination metadata.
///
/// No per-request timeout is enforced; a hung fetch delays shutdown by at
/// most one request, since cancellation is observed between fetches.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Creates a new client. `insecure` disables TLS certificate
    /// verification.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Build`] when the underlying client cannot be
    /// constructed.
    pub fn new(insecure: bool) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repopulse/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(FetchError::Build)?;

        Ok(Self { inner: client })
    }

    /// Performs a GET request, decodes the JSON body into `T`, and extracts
    /// the next-page URL from the `Link` response header.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] on transport or decode failures and
    /// [`FetchError::Status`] on non-success responses.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Page<T>, FetchError> {
        debug!(url = %url, "GET");

        let mut request = self.inner.get(url).header(header::ACCEPT, "application/json");
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.user, Some(&creds.token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(link::next_page);

        let body = response.json::<T>().await?;
        Ok(Page { body, next })
    }
}
