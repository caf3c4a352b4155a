//! Subject naming for the external sink

use std::fmt;

use super::Endpoint;

/// Stable consumer-facing name of one tracked device: `"<device id>@<endpoint>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(device_id: u8, endpoint: &Endpoint) -> Self {
        Self(format!("{}@{}", device_id, endpoint))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shape of the data a subject carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectRole {
    Transform,
}

impl SubjectRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectRole::Transform => "transform",
        }
    }
}

impl fmt::Display for SubjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
