//! # Telekit Client SDK
//!
//! Thin client for the telecom API platform:
//!
//! - `oauth` - OAuth 2.0 authorization-code services (consent URL, code
//!   exchange, refresh, revocation)
//! - `device` - Device capability lookup and the typed capability model

pub mod device;
pub mod oauth;

// Re-export commonly used types
pub use device::{CapabilityError, CapabilityRecord, DeviceCapabilitiesService, DeviceError};
pub use oauth::{CodeExchanger, OAuthConfig, OAuthError, OAuthService, OAuthToken};
