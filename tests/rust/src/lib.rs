//! Shared test utilities and fixtures for Telekit integration tests.

/// Mock collaborator implementations
pub mod mocks;
pub use mocks::{test_token, ScriptedExchanger};

/// Test fixture utilities
pub mod fixtures {
    use serde_json::{json, Value};

    /// A conforming capability document as the platform returns it
    pub fn capability_doc() -> Value {
        json!({
            "DeviceInfo": {
                "DeviceId": {
                    "TypeAllocationCode": "01215200"
                },
                "Capabilities": {
                    "Name": "SGH-A997",
                    "Vendor": "SAM",
                    "Model": "A997",
                    "FirmwareVersion": "A997UCKB1",
                    "UaProf": "http://uaprof.example.com/A997.xml",
                    "MmsCapable": "Y",
                    "AssistedGps": "N",
                    "LocationTechnology": "SUPL2",
                    "DeviceBrowser": "Dorado",
                    "WapPushCapable": "Y"
                }
            }
        })
    }
}
