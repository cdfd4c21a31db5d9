//! Endpoint models and request payloads for the management API.

use crate::Result;
use azureml_core::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Webservice endpoint as returned by the management API.
///
/// Only the commonly used fields are typed; everything else the server sends
/// is kept in [`Endpoint::extra`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    /// Endpoint name, unique within its webservice.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server-defined throttle tier, e.g. `High` or `Low`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_level: Option<String>,
    /// Model artifacts backing the endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    /// Owning workspace id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Owning webservice id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_service_id: Option<String>,
    /// Concurrency limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_calls: Option<u32>,
    /// Remaining server fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Endpoint {
    /// Decode an endpoint from the generic value returned by a get call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] when the value is not an endpoint.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Decode the endpoint list returned by a get-all call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] when the value is not a list of
    /// endpoints.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        serde_json::from_value(value).map_err(Error::from)
    }
}

/// Model artifact referenced by an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// Trained model name.
    pub name: String,
    /// Blob location of the model.
    pub location: ResourceLocation,
}

/// Blob storage location of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceLocation {
    /// Storage account base URL.
    pub base_location: String,
    /// Blob path relative to the base.
    pub relative_location: String,
    /// SAS token granting read access to the blob.
    pub sas_blob_token: String,
}

impl ResourceLocation {
    /// Create a location from its three parts.
    #[must_use]
    pub fn new(
        base_location: impl Into<String>,
        relative_location: impl Into<String>,
        sas_blob_token: impl Into<String>,
    ) -> Self {
        Self {
            base_location: base_location.into(),
            relative_location: relative_location.into(),
            sas_blob_token: sas_blob_token.into(),
        }
    }
}

/// Request payload for creating (or replacing) an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEndpointRequest {
    /// Endpoint description.
    pub description: String,
    /// Throttle tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_level: Option<String>,
}

impl CreateEndpointRequest {
    /// Create a request with only a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            throttle_level: None,
        }
    }

    /// Set the throttle tier. An empty level leaves it unset.
    #[must_use]
    pub fn with_throttle_level(mut self, level: impl Into<String>) -> Self {
        let level = level.into();
        self.throttle_level = (!level.is_empty()).then_some(level);
        self
    }
}

/// Merge-patch payload pointing an endpoint at a new model artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateEndpointRequest {
    /// Replacement resources; always a single entry when built here.
    pub resources: Vec<Resource>,
}

impl UpdateEndpointRequest {
    /// Build the payload for a single model resource.
    #[must_use]
    pub fn for_model(model_name: impl Into<String>, location: ResourceLocation) -> Self {
        Self {
            resources: vec![Resource {
                name: model_name.into(),
                location,
            }],
        }
    }
}

/// Project the `Name` of every endpoint in a get-all response, in order.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when the value is not an array or an
/// element has no string `Name`.
pub fn endpoint_names(endpoints: &Value) -> Result<Vec<String>> {
    let items = endpoints.as_array().ok_or_else(|| {
        Error::MalformedResponse("expected a list of endpoints".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, endpoint)| {
            endpoint
                .get("Name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::MalformedResponse(format!("endpoint at index {index} has no Name"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_without_throttle_has_only_description() {
        let body = serde_json::to_value(CreateEndpointRequest::new("staging")).unwrap();
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Description"]);
    }

    #[test]
    fn create_request_with_throttle_has_two_keys() {
        let request = CreateEndpointRequest::new("staging").with_throttle_level("High");
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(body, json!({"Description": "staging", "ThrottleLevel": "High"}));
    }

    #[test]
    fn create_request_ignores_empty_throttle() {
        let request = CreateEndpointRequest::new("staging").with_throttle_level("");
        assert!(request.throttle_level.is_none());
    }

    #[test]
    fn update_request_nests_location_under_first_resource() {
        let request = UpdateEndpointRequest::for_model(
            "churn-model",
            ResourceLocation::new(
                "https://store.blob.core.windows.net",
                "models/churn.ilearner",
                "sv=2015&sig=abc",
            ),
        );
        let body = serde_json::to_value(request).unwrap();

        assert_eq!(
            body,
            json!({
                "Resources": [{
                    "Name": "churn-model",
                    "Location": {
                        "BaseLocation": "https://store.blob.core.windows.net",
                        "RelativeLocation": "models/churn.ilearner",
                        "SasBlobToken": "sv=2015&sig=abc"
                    }
                }]
            })
        );
    }

    #[test]
    fn endpoint_names_preserve_server_order() {
        let value = json!([{"Name": "default"}, {"Name": "v2"}]);
        assert_eq!(endpoint_names(&value).unwrap(), vec!["default", "v2"]);
    }

    #[test]
    fn endpoint_names_reject_non_list() {
        let err = endpoint_names(&json!({"Name": "default"})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn endpoint_names_reject_missing_name() {
        let err = endpoint_names(&json!([{"Name": "default"}, {"Description": "x"}])).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedResponse("endpoint at index 1 has no Name".to_string())
        );
    }

    #[test]
    fn endpoint_keeps_unknown_fields() {
        let endpoint = Endpoint::from_value(json!({
            "Name": "v2",
            "ThrottleLevel": "Low",
            "HelpLocation": "https://studio.azureml.net/apihelp"
        }))
        .unwrap();

        assert_eq!(endpoint.name, "v2");
        assert_eq!(endpoint.throttle_level.as_deref(), Some("Low"));
        assert!(endpoint.resources.is_empty());
        assert_eq!(
            endpoint.extra.get("HelpLocation").and_then(Value::as_str),
            Some("https://studio.azureml.net/apihelp")
        );
    }

    #[test]
    fn endpoint_from_value_requires_name() {
        let err = Endpoint::from_value(json!({"Description": "nameless"})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
