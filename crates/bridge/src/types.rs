//! Shared identifier and credential types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for a Blox, unique within the registry.
///
/// In practice this is the device's peer identifier string; the core never
/// inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Secret material required to open a session.
///
/// Supplied by an external credential store per call; the connection core
/// never persists it.
#[derive(Clone)]
pub struct SessionCredentials {
    pub secret: String,
    pub derived_auth: String,
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the secret out of logs.
        f.debug_struct("SessionCredentials")
            .field("secret", &"<redacted>")
            .field("derived_auth", &"<redacted>")
            .finish()
    }
}
