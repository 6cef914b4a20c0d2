//! Device capability lookup
//!
//! Fetches the platform's capability document for the subscriber's handset
//! and maps it into an immutable typed record.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::oauth::OAuthToken;

/// Capability lookup endpoint path
pub const DEVICE_INFO_PATH: &str = "/rest/2/Devices/Info";

/// Scope under which capability tokens are issued and stored
pub const DEVICE_CAPABILITIES_SCOPE: &str = "DC";

/// Error raised when a capability document cannot be mapped
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// A required field or nested object is absent or the wrong type
    #[error("malformed capability document: {path} is missing or not the expected type")]
    MalformedDocument { path: &'static str },
}

/// Errors from the capability endpoint
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level failure talking to the platform
    #[error("capability endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("capability endpoint returned HTTP {status}: {body}")]
    Endpoint {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The platform answered 2xx but the document could not be mapped
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Immutable record of a handset's capabilities.
///
/// Built once from a capability document via [`CapabilityRecord::from_json`]
/// and never mutated. Capability flags arrive as `"Y"`/`"N"` strings and are
/// true exactly when the source string is `"Y"`; any other value, wrong
/// type, or absence reads as false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRecord {
    pub type_allocation_code: String,
    pub name: String,
    pub vendor: String,
    pub model: String,
    pub firmware_version: String,
    pub ua_prof: String,
    pub mms_capable: bool,
    pub assisted_gps: bool,
    pub location_technology: String,
    pub device_browser: String,
    pub wap_push_capable: bool,
}

impl CapabilityRecord {
    /// Map a capability document into a record.
    ///
    /// The document shape is
    /// `{DeviceInfo: {DeviceId: {TypeAllocationCode}, Capabilities: {...}}}`.
    /// A missing or wrong-typed required field is a hard failure; no
    /// partial record is ever returned.
    pub fn from_json(doc: &Value) -> Result<Self, CapabilityError> {
        let device_info = member(doc, "DeviceInfo")?;
        let device_id = member(device_info, "DeviceId")?;
        let capabilities = member(device_info, "Capabilities")?;

        Ok(Self {
            type_allocation_code: string(device_id, "TypeAllocationCode")?,
            name: string(capabilities, "Name")?,
            vendor: string(capabilities, "Vendor")?,
            model: string(capabilities, "Model")?,
            firmware_version: string(capabilities, "FirmwareVersion")?,
            ua_prof: string(capabilities, "UaProf")?,
            mms_capable: flag(capabilities, "MmsCapable"),
            assisted_gps: flag(capabilities, "AssistedGps"),
            location_technology: string(capabilities, "LocationTechnology")?,
            device_browser: string(capabilities, "DeviceBrowser")?,
            wap_push_capable: flag(capabilities, "WapPushCapable"),
        })
    }
}

fn member<'a>(parent: &'a Value, key: &'static str) -> Result<&'a Value, CapabilityError> {
    parent
        .get(key)
        .filter(|value| value.is_object())
        .ok_or(CapabilityError::MalformedDocument { path: key })
}

fn string(parent: &Value, key: &'static str) -> Result<String, CapabilityError> {
    parent
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(CapabilityError::MalformedDocument { path: key })
}

fn flag(parent: &Value, key: &str) -> bool {
    matches!(parent.get(key).and_then(Value::as_str), Some("Y"))
}

/// Client for the platform's device capability endpoint
pub struct DeviceCapabilitiesService {
    http_client: reqwest::Client,
    api_host: String,
    token: OAuthToken,
}

impl DeviceCapabilitiesService {
    /// Create a new capability service for a consented token
    pub fn new(api_host: impl Into<String>, token: OAuthToken) -> Self {
        Self::with_http_client(api_host, token, reqwest::Client::new())
    }

    /// Create a new capability service reusing an existing HTTP client
    pub fn with_http_client(
        api_host: impl Into<String>,
        token: OAuthToken,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            http_client,
            api_host: api_host.into(),
            token,
        }
    }

    /// Fetch the raw capability document
    pub async fn capability_document(&self) -> Result<Value, DeviceError> {
        let url = format!(
            "{}{}",
            self.api_host.trim_end_matches('/'),
            DEVICE_INFO_PATH
        );

        debug!("[Device] Fetching capability document");

        let response = self
            .http_client
            .get(url)
            .header("Authorization", self.token.authorization_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeviceError::Endpoint { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetch and map the capability document into a typed record
    pub async fn device_capabilities(&self) -> Result<CapabilityRecord, DeviceError> {
        let doc = self.capability_document().await?;
        Ok(CapabilityRecord::from_json(&doc)?)
    }
}
