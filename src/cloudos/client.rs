use std::fmt;

use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::RunConfig;
use crate::error::{Error, Result};

/// Header carrying the API key on write requests
pub const API_KEY_HEADER: &str = "apikey";

/// Query parameter scoping a request to a workspace
pub const WORKSPACE_PARAM: &str = "teamId";

/// How a request carries the API key
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Auth {
    /// `?apikey=` query parameter, used by the listing endpoints
    Query,
    /// `apikey:` header, used when creating jobs
    Header,
}

/// A configured `reqwest::Client` bound to one CloudOS instance, API key and workspace
#[derive(Clone)]
pub struct CloudOsClient {
    base_url: String,
    api_key: String,
    workspace: Option<String>,
    http: Client,
}

impl CloudOsClient {
    pub fn new(config: &RunConfig) -> Result<CloudOsClient> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| Error::Transport { endpoint: config.base_url.to_string(), source })?;

        Ok(CloudOsClient {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            workspace: config.workspace.clone(),
            http,
        })
    }

    /// Endpoint for a collection, scoped to the workspace if there is one. Never contains the key.
    pub fn endpoint(&self, collection: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/v1/{}", self.base_url, collection))?;
        if let Some(team_id) = &self.workspace {
            url.query_pairs_mut().append_pair(WORKSPACE_PARAM, team_id);
        }
        Ok(url)
    }

    /// Page a person can open to follow a job
    pub fn job_status_url(&self, job_id: &str) -> String {
        format!("{}/app/jobs/{}", self.base_url, job_id)
    }

    /// GET a collection, authenticated with the `apikey` query parameter
    pub async fn get_json<T: DeserializeOwned>(&self, collection: &str) -> Result<T> {
        let endpoint = self.endpoint(collection)?;
        info!("GET {}", endpoint);
        let request = self.http.get(self.authenticate_url(endpoint.clone(), Auth::Query));
        self.execute(request, &endpoint).await
    }

    /// POST a JSON body to a collection, authenticated with the `apikey` header
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, collection: &str, body: &B) -> Result<T> {
        let endpoint = self.endpoint(collection)?;
        info!("POST {}", endpoint);
        let request = self
            .http
            .post(self.authenticate_url(endpoint.clone(), Auth::Header))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body);
        self.execute(request, &endpoint).await
    }

    fn authenticate_url(&self, mut url: Url, auth: Auth) -> Url {
        if auth == Auth::Query {
            url.query_pairs_mut().append_pair(API_KEY_HEADER, &self.api_key);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &Url) -> Result<T> {
        let endpoint = endpoint.to_string();
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(&endpoint, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(&endpoint, err))?;

        if !status.is_success() {
            warn!("{} returned {}", endpoint, status);
            return Err(Error::Status { endpoint, status: status.as_u16(), body });
        }

        debug!("{} returned {} ({} bytes)", endpoint, status, body.len());
        serde_json::from_str::<T>(&body)
            .map_err(|err| Error::MalformedResponse { endpoint, reason: err.to_string() })
    }
}

impl fmt::Debug for CloudOsClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CloudOsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> Error {
    let endpoint = endpoint.to_string();
    if err.is_timeout() {
        warn!("{} timed out", endpoint);
        Error::Timeout { endpoint }
    } else {
        warn!("Request to {} failed: {}", endpoint, err);
        // the url reqwest keeps on its error has the api key in its query
        Error::Transport { endpoint, source: err.without_url() }
    }
}
