// src/ic3/models.rs
use serde::{Deserialize, Serialize};

/// Region names in portal order. The report pages index regions by a 1-based
/// position into this list (50 states plus DC and the named territories), and
/// the portal has kept both the membership and the ordering stable across
/// report years, so the list is hardcoded.
pub const REGION_NAMES: [&str; 57] = [
    "Alabama",
    "Alaska",
    "American Samoa",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "District of Columbia",
    "Florida",
    "Georgia",
    "Guam",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Northern Mariana Islands",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Puerto Rico",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "United States Minor Outlying Islands",
    "Utah",
    "Vermont",
    "Virgin Islands",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// Resolves a 1-based region code to its name. Codes outside the known range
/// map to a placeholder that embeds the code, so downstream partition paths
/// stay constructible rather than failing.
pub fn region_name(region_code: u32) -> String {
    (region_code as usize)
        .checked_sub(1)
        .and_then(|idx| REGION_NAMES.get(idx))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| format!("UnknownRegion_{}", region_code))
}

/// One (year, region) report page to fetch and extract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportRequest {
    pub year: u32,
    pub region_code: u32,
}

impl ReportRequest {
    pub fn new(year: u32, region_code: u32) -> Self {
        Self { year, region_code }
    }

    /// Constructs the URL of the annual-report page for this request.
    pub fn url(&self) -> String {
        format!(
            "https://www.ic3.gov/AnnualReport/Reports/{}State/#?s={}",
            self.year, self.region_code
        )
    }

    /// Name of the region this request targets, placeholder included.
    pub fn region_name(&self) -> String {
        region_name(self.region_code)
    }
}
