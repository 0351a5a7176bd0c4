use serde::{Deserialize, Serialize};
use validator::Validate;

/// A discontinued legacy station paired with the modern (USCRN) station
/// believed to represent the same site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationPairDescriptor {
    #[validate(length(min = 1))]
    pub legacy_id: String,

    #[validate(length(min = 1))]
    pub legacy_name: String,

    #[validate(length(min = 1))]
    pub modern_id: String,

    #[validate(length(min = 1))]
    pub modern_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(length(equal = 2))]
    pub state: String,
}

impl StationPairDescriptor {
    pub fn new(
        legacy_id: &str,
        legacy_name: &str,
        modern_id: &str,
        modern_name: &str,
        latitude: f64,
        longitude: f64,
        state: &str,
    ) -> Self {
        Self {
            legacy_id: legacy_id.to_string(),
            legacy_name: legacy_name.to_string(),
            modern_id: modern_id.to_string(),
            modern_name: modern_name.to_string(),
            latitude,
            longitude,
            state: state.to_string(),
        }
    }

    /// Display name used in reports, e.g. `NIWOT / BOULDER_14_W`
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.legacy_name, self.modern_name)
    }

    /// Human-friendly tooltip form of the display name
    pub fn title(&self) -> String {
        self.display_name()
            .replace('_', " ")
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
