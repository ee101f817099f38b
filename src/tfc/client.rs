//! Terraform Cloud API client implementation.
//!
//! This module provides the HTTP client for the Terraform Cloud / Terraform
//! Enterprise JSON:API (`/api/v2`).

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{ConfigError, Result, SyncError, TfcError};

use super::backend::RemoteBackend;
use super::types::{
    Document, ErrorDocument, NewVariable, RemoteVariable, Resource, VariableAttributes, Workspace,
    WorkspaceAttributes,
};

/// Default Terraform Cloud address.
pub const DEFAULT_ADDRESS: &str = "https://app.terraform.io";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON:API media type.
const JSON_API: &str = "application/vnd.api+json";

/// Terraform Cloud API client.
#[derive(Debug, Clone)]
pub struct TfcClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash, e.g. `https://app.terraform.io`.
    address: String,
    /// API root, `{address}/api/v2`.
    api_root: Url,
    /// API token.
    token: String,
}

/// The resource a request targets, for `NotFound` reporting.
struct Target<'a> {
    resource: &'a str,
    name: &'a str,
}

impl TfcClient {
    /// Creates a client for the default Terraform Cloud address.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_address(DEFAULT_ADDRESS, token, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client for a specific address and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid base URL or the HTTP
    /// client cannot be created.
    pub fn with_address(address: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TfcError::network(format!("Failed to create HTTP client: {e}")))?;

        let address = address.trim_end_matches('/').to_string();
        let api_root = Url::parse(&format!("{address}/api/v2"))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                ConfigError::validation(
                    format!("Invalid Terraform Cloud address: {address}"),
                    "address",
                )
            })?;

        Ok(Self {
            client,
            address,
            api_root,
            token: token.to_string(),
        })
    }

    /// Returns the API address this client talks to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Builds an API URL, percent-encoding each path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: reqwest::Method, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.url(segments))
            .header(header::CONTENT_TYPE, JSON_API)
            .header(header::ACCEPT, JSON_API)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn execute(&self, request: RequestBuilder, target: &Target<'_>) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            SyncError::Tfc(TfcError::NetworkError {
                message: format!("Request failed: {e}"),
            })
        })?;

        let status = response.status();
        trace!("{} {} -> {}", target.resource, target.name, status);

        if status == StatusCode::NOT_FOUND {
            return Err(SyncError::Tfc(TfcError::not_found(target.resource, target.name)));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or_default();
            let retry_after = if retry_after == 0 { 60 } else { retry_after };

            return Err(SyncError::Tfc(TfcError::RateLimited {
                retry_after_secs: retry_after,
            }));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::Tfc(TfcError::AuthenticationFailed {
                message: String::from("Invalid or insufficient API token"),
            }));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorDocument>(&body)
                .ok()
                .and_then(|doc| doc.message())
                .unwrap_or(body);
            return Err(SyncError::Tfc(TfcError::api_error(status.as_u16(), message)));
        }

        Ok(response)
    }

    /// Sends a request and decodes a JSON:API document.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: &Target<'_>,
    ) -> Result<Document<T>> {
        let response = self.execute(request, target).await?;

        response.json().await.map_err(|e| {
            SyncError::Tfc(TfcError::InvalidResponse {
                message: format!("Failed to parse response: {e}"),
            })
        })
    }

    /// Checks that an organization exists and the token can read it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the organization does not exist or is not
    /// visible to the token, or another error if the API call fails.
    pub async fn read_organization(&self, organization: &str) -> Result<()> {
        let target = Target {
            resource: "organization",
            name: organization,
        };
        let request = self.request(
            reqwest::Method::GET,
            &["organizations", organization],
        );
        self.execute(request, &target).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteBackend for TfcClient {
    async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        debug!("Reading workspace {organization}/{name}");

        let target = Target {
            resource: "workspace",
            name,
        };
        let request = self.request(
            reqwest::Method::GET,
            &["organizations", organization, "workspaces", name],
        );
        let doc: Document<Resource<WorkspaceAttributes>> = self.fetch(request, &target).await?;

        Ok(doc.data.into())
    }

    async fn create_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        debug!("Creating workspace {organization}/{name}");

        let body = serde_json::json!({
            "data": {
                "type": "workspaces",
                "attributes": {
                    "name": name,
                    "auto-apply": true,
                }
            }
        });

        let target = Target {
            resource: "organization",
            name: organization,
        };
        let request = self
            .request(
                reqwest::Method::POST,
                &["organizations", organization, "workspaces"],
            )
            .json(&body);
        let doc: Document<Resource<WorkspaceAttributes>> = self.fetch(request, &target).await?;

        Ok(doc.data.into())
    }

    async fn delete_workspace(&self, organization: &str, name: &str) -> Result<()> {
        debug!("Deleting workspace {organization}/{name}");

        let target = Target {
            resource: "workspace",
            name,
        };
        let request = self.request(
            reqwest::Method::DELETE,
            &["organizations", organization, "workspaces", name],
        );
        self.execute(request, &target).await?;

        Ok(())
    }

    async fn list_variables(
        &self,
        organization: &str,
        workspace: &str,
        page_size: u32,
    ) -> Result<Vec<RemoteVariable>> {
        let target = Target {
            resource: "workspace",
            name: workspace,
        };

        let mut variables = Vec::new();
        let mut page = 1_u32;

        loop {
            let request = self.request(reqwest::Method::GET, &["vars"]).query(&[
                ("filter[organization][name]", organization.to_string()),
                ("filter[workspace][name]", workspace.to_string()),
                ("page[number]", page.to_string()),
                ("page[size]", page_size.to_string()),
            ]);
            let doc: Document<Vec<Resource<VariableAttributes>>> =
                self.fetch(request, &target).await?;

            variables.extend(doc.data.into_iter().map(RemoteVariable::from));

            match doc.meta.and_then(|m| m.pagination).and_then(|p| p.next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        debug!(
            "Listed {} variables in {organization}/{workspace}",
            variables.len()
        );
        Ok(variables)
    }

    async fn create_variable(
        &self,
        workspace_id: &str,
        variable: &NewVariable,
    ) -> Result<RemoteVariable> {
        let body = serde_json::json!({
            "data": {
                "type": "vars",
                "attributes": {
                    "key": variable.key,
                    "value": variable.value,
                    "category": variable.category,
                    "sensitive": variable.sensitive,
                    "hcl": false,
                },
                "relationships": {
                    "workspace": {
                        "data": { "type": "workspaces", "id": workspace_id }
                    }
                }
            }
        });

        let target = Target {
            resource: "workspace",
            name: workspace_id,
        };
        let request = self.request(reqwest::Method::POST, &["vars"]).json(&body);
        let doc: Document<Resource<VariableAttributes>> = self.fetch(request, &target).await?;

        Ok(doc.data.into())
    }

    async fn update_variable(&self, id: &str, key: &str, value: &str) -> Result<RemoteVariable> {
        let body = serde_json::json!({
            "data": {
                "type": "vars",
                "id": id,
                "attributes": {
                    "key": key,
                    "value": value,
                }
            }
        });

        let target = Target {
            resource: "variable",
            name: id,
        };
        let request = self
            .request(reqwest::Method::PATCH, &["vars", id])
            .json(&body);
        let doc: Document<Resource<VariableAttributes>> = self.fetch(request, &target).await?;

        Ok(doc.data.into())
    }

    async fn delete_variable(&self, id: &str) -> Result<()> {
        let target = Target {
            resource: "variable",
            name: id,
        };
        let request = self.request(reqwest::Method::DELETE, &["vars", id]);
        self.execute(request, &target).await?;

        Ok(())
    }
}
