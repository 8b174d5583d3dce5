//! Common types used across the platform

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved location identifier for stock handed to a grader.
pub const GRADER: &str = "GRADER";
/// Reserved location identifier for stock dispatched to a customer.
pub const CUSTOMER: &str = "CUSTOMER";
/// Reserved location identifier for stock entering the system from outside
/// tracked storage (e.g. straight off the field).
pub const NO_LOCATION: &str = "NO_LOCATION";

/// A movement endpoint: either a tracked entity (zone or shed) or one of the
/// reserved sentinels representing stock entering or leaving tracked storage.
///
/// Serialized as the entity's UUID string, or as the sentinel literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Location {
    Tracked(Uuid),
    Grader,
    Customer,
    NoLocation,
}

impl Location {
    pub fn as_string(&self) -> String {
        match self {
            Location::Tracked(id) => id.to_string(),
            Location::Grader => GRADER.to_string(),
            Location::Customer => CUSTOMER.to_string(),
            Location::NoLocation => NO_LOCATION.to_string(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        match s {
            GRADER => Ok(Location::Grader),
            CUSTOMER => Ok(Location::Customer),
            NO_LOCATION => Ok(Location::NoLocation),
            other => Ok(Location::Tracked(Uuid::parse_str(other)?)),
        }
    }

    /// The tracked entity id, if this endpoint is inside the system.
    pub fn tracked_id(&self) -> Option<Uuid> {
        match self {
            Location::Tracked(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Uuid> for Location {
    fn from(id: Uuid) -> Self {
        Location::Tracked(id)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.as_string()
    }
}

impl TryFrom<String> for Location {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Location::parse(&s).map_err(|e| format!("invalid location {:?}: {}", s, e))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Destinations outside tracked storage that a withdrawal can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalSink {
    Grader,
    Customer,
}

impl ExternalSink {
    pub fn location(&self) -> Location {
        match self {
            ExternalSink::Grader => Location::Grader,
            ExternalSink::Customer => Location::Customer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalSink::Grader => "grader",
            ExternalSink::Customer => "customer",
        }
    }
}
