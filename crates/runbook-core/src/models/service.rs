//! Registry of deployable services.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Kind of deployable unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Ds,
    Service,
    Api,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Ds => "DS",
            ServiceType::Service => "SERVICE",
            ServiceType::Api => "API",
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DS" => Ok(ServiceType::Ds),
            "SERVICE" => Ok(ServiceType::Service),
            "API" => Ok(ServiceType::Api),
            _ => Err(format!("Invalid service type: {s}")),
        }
    }
}

/// A service that rollouts touch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub service_type: ServiceType,
    pub region: String,
    pub core_level: String,
    pub idc: String,
    pub group_name: Option<String>,
    pub service_path: Option<String>,
    pub management_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}
