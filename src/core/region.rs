use crate::utils::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 平台支援的部署區域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "us-west1")]
    UsWest1,
    #[serde(rename = "us-west2")]
    UsWest2,
    #[serde(rename = "us-east4")]
    UsEast4,
    #[serde(rename = "europe-west4")]
    EuropeWest4,
    #[serde(rename = "asia-southeast1")]
    AsiaSoutheast1,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::UsWest1,
        Region::UsWest2,
        Region::UsEast4,
        Region::EuropeWest4,
        Region::AsiaSoutheast1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsWest1 => "us-west1",
            Region::UsWest2 => "us-west2",
            Region::UsEast4 => "us-east4",
            Region::EuropeWest4 => "europe-west4",
            Region::AsiaSoutheast1 => "asia-southeast1",
        }
    }

    pub fn location(&self) -> &'static str {
        match self {
            Region::UsWest1 => "California, USA",
            Region::UsWest2 => "Oregon, USA",
            Region::UsEast4 => "Virginia, USA",
            Region::EuropeWest4 => "Amsterdam, Netherlands",
            Region::AsiaSoutheast1 => "Singapore",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| ProvisionError::UnsupportedRegion {
                value: s.to_string(),
            })
    }
}

/// 只驗證候選值是否屬於支援清單，不做任何推測
pub fn select_region(candidate: &str) -> Result<Region> {
    candidate.trim().parse()
}
