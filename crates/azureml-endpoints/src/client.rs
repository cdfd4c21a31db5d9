//! Asynchronous endpoint management client.

use crate::models::{endpoint_names, CreateEndpointRequest, ResourceLocation, UpdateEndpointRequest};
use crate::Result;
use azureml_core::client::ClientConfig;
use azureml_core::config::{ManagementConfig, WorkspaceCredentials};
use azureml_core::Error;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Method, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("azureml-endpoints/", env!("CARGO_PKG_VERSION"));

/// Endpoint every webservice is created with. It cannot be deleted.
pub const DEFAULT_ENDPOINT: &str = "default";

const DELETE_DEFAULT_DENIED: &str =
    "FAILURE 400: UnauthorizedRequest - Cannot delete default endpoint.";

/// Collection URL for the endpoints of a webservice on the production hosts.
///
/// Inputs are not validated or escaped.
#[must_use]
pub fn endpoints_url(locale: &str, workspace: &str, webservice: &str) -> String {
    format!(
        "https://{locale}.management.azureml.net/workspaces/{workspace}/webservices/{webservice}/endpoints"
    )
}

/// Builder for [`EndpointsClient`].
#[derive(Debug, Clone, Default)]
pub struct EndpointsClientBuilder {
    config: ManagementConfig,
    http_config: ClientConfig,
}

impl EndpointsClientBuilder {
    /// Create a builder targeting the production regional hosts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a [`ManagementConfig`].
    #[must_use]
    pub fn from_config(config: ManagementConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
        }
    }

    /// Send requests to `base_url` instead of the regional management host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(base_url);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<EndpointsClient> {
        let config = self.config.validated()?;
        let base_url = config.parse_base_url()?;

        let mut http_config = self.http_config;
        if let Some(timeout) = config.timeout() {
            http_config.timeout = Some(timeout);
        }

        let mut builder = http_config.apply(ClientBuilder::new(), USER_AGENT);

        if !config.tls_verify {
            warn!("TLS verification disabled for Azure ML management client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &config.tls_ca_cert {
            debug!("loading management CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(EndpointsClient { http, base_url })
    }
}

/// Asynchronous client for Azure ML webservice endpoints.
///
/// The client holds no credentials or session state; every call takes the
/// [`WorkspaceCredentials`] it should use.
#[derive(Debug, Clone)]
pub struct EndpointsClient {
    http: Client,
    base_url: Option<Url>,
}

#[derive(Clone, Copy)]
enum WriteAction {
    Created,
    Deleted,
    Updated,
}

impl WriteAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Deleted => "DELETED",
            Self::Updated => "UPDATED",
        }
    }
}

enum Exchange {
    Success(Response),
    Failed(Error),
    Transport(reqwest::Error),
}

impl EndpointsClient {
    /// Construct a client for the production regional hosts.
    pub fn new() -> Result<Self> {
        EndpointsClientBuilder::new().build()
    }

    /// Construct a client that sends every request to `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        EndpointsClientBuilder::new().with_base_url(base_url).build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder() -> EndpointsClientBuilder {
        EndpointsClientBuilder::new()
    }

    /// Return the base URL override, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Collection URL for the endpoints of `webservice`.
    #[must_use]
    pub fn endpoints_url(&self, credentials: &WorkspaceCredentials, webservice: &str) -> String {
        match &self.base_url {
            Some(base) => format!(
                "{}/workspaces/{}/webservices/{webservice}/endpoints",
                base.as_str().trim_end_matches('/'),
                credentials.workspace
            ),
            None => endpoints_url(&credentials.locale, &credentials.workspace, webservice),
        }
    }

    fn endpoint_url(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
        name: &str,
    ) -> String {
        format!("{}/{name}", self.endpoints_url(credentials, webservice))
    }

    /// Fetch one endpoint as a generic JSON value.
    ///
    /// Returns `Ok(None)` when the request could not be completed.
    pub async fn get_endpoint(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
        name: &str,
    ) -> Result<Option<Value>> {
        let url = self.endpoint_url(credentials, webservice, name);
        self.get_json(&url, credentials).await
    }

    /// Fetch every endpoint of a webservice as a generic JSON value.
    ///
    /// Returns `Ok(None)` when the request could not be completed.
    pub async fn get_endpoints(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
    ) -> Result<Option<Value>> {
        let url = self.endpoints_url(credentials, webservice);
        self.get_json(&url, credentials).await
    }

    /// List endpoint names in server order.
    ///
    /// A list call that produced no value is reported as
    /// [`Error::MissingData`].
    pub async fn get_endpoint_names(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
    ) -> Result<Vec<String>> {
        match self.get_endpoints(credentials, webservice).await? {
            Some(endpoints) => endpoint_names(&endpoints),
            None => Err(Error::MissingData(format!(
                "no endpoint list returned for webservice `{webservice}`"
            ))),
        }
    }

    /// Create or replace an endpoint.
    pub async fn create_endpoint(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
        name: &str,
        request: &CreateEndpointRequest,
    ) -> Result<bool> {
        let url = self.endpoint_url(credentials, webservice, name);
        self.write(
            Method::PUT,
            &url,
            credentials,
            Some(request),
            WriteAction::Created,
            name,
        )
        .await
    }

    /// Delete an endpoint. The `default` endpoint is refused locally.
    pub async fn delete_endpoint(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
        name: &str,
    ) -> Result<bool> {
        if name == DEFAULT_ENDPOINT {
            error!(endpoint = name, "{DELETE_DEFAULT_DENIED}");
            return Ok(false);
        }

        let url = self.endpoint_url(credentials, webservice, name);
        self.write::<()>(
            Method::DELETE,
            &url,
            credentials,
            None,
            WriteAction::Deleted,
            name,
        )
        .await
    }

    /// Point an endpoint at a new trained model.
    pub async fn update_endpoint(
        &self,
        credentials: &WorkspaceCredentials,
        webservice: &str,
        endpoint_name: &str,
        model_name: &str,
        location: ResourceLocation,
    ) -> Result<bool> {
        let url = self.endpoint_url(credentials, webservice, endpoint_name);
        let request = UpdateEndpointRequest::for_model(model_name, location);
        self.write(
            Method::PATCH,
            &url,
            credentials,
            Some(&request),
            WriteAction::Updated,
            endpoint_name,
        )
        .await
    }

    async fn get_json(&self, url: &str, credentials: &WorkspaceCredentials) -> Result<Option<Value>> {
        match self.exchange::<()>(Method::GET, url, credentials, None).await {
            Exchange::Success(response) => match response.json::<Value>().await {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    error!(url, "{err}");
                    Ok(None)
                }
            },
            Exchange::Failed(err) => Err(err),
            Exchange::Transport(err) => {
                error!(url, "{err}");
                Ok(None)
            }
        }
    }

    async fn write<B>(
        &self,
        method: Method,
        url: &str,
        credentials: &WorkspaceCredentials,
        body: Option<&B>,
        action: WriteAction,
        name: &str,
    ) -> Result<bool>
    where
        B: Serialize + ?Sized,
    {
        match self.exchange(method, url, credentials, body).await {
            Exchange::Success(response) => {
                let status = response.status().as_u16();
                info!(endpoint = name, status, "{} ENDPOINT '{name}': {status}", action.as_str());
                Ok(true)
            }
            Exchange::Failed(err) => Err(err),
            Exchange::Transport(err) => {
                error!(endpoint = name, "{err}");
                Ok(false)
            }
        }
    }

    async fn exchange<B>(
        &self,
        method: Method,
        url: &str,
        credentials: &WorkspaceCredentials,
        body: Option<&B>,
    ) -> Exchange
    where
        B: Serialize + ?Sized,
    {
        debug!(%method, url, "Sending management request");

        let mut request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(credentials.token());

        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Exchange::Transport(err),
        };

        let status = response.status();
        if status.is_success() {
            return Exchange::Success(response);
        }

        match response.text().await {
            Ok(text) => {
                let err = Error::from_status(status.as_u16(), &text);
                if let Some(line) = err.failure_message() {
                    error!(status = status.as_u16(), "{line}");
                }
                Exchange::Failed(err)
            }
            Err(err) => Exchange::Transport(err),
        }
    }
}
