//! Coarse weather categories used for icon selection.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Closed set of categories a provider condition collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Clear,
    Cloud,
    Rain,
    Snow,
    Storm,
}

impl ConditionCategory {
    /// Category for anything the provider sends that is not recognised.
    ///
    /// Cloud is deliberately non-alarming: an unknown label never renders as a storm.
    pub const FALLBACK: Self = Self::Cloud;

    /// Map a provider condition label such as `"Thunderstorm"` or `"Clouds"`.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown labels resolve to
    /// [`ConditionCategory::FALLBACK`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "clear" | "sun" | "sunny" => Self::Clear,
            "clouds" | "cloud" | "mist" | "fog" | "haze" | "smoke" | "dust" | "sand" | "ash" => {
                Self::Cloud
            }
            "rain" | "drizzle" | "shower" | "showers" => Self::Rain,
            "snow" | "sleet" => Self::Snow,
            "thunderstorm" | "lightning" | "storm" | "squall" | "tornado" => Self::Storm,
            _ => Self::FALLBACK,
        }
    }

    /// Map an OpenWeatherMap condition id.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_condition_id(id: u16) -> Self {
        match id {
            200..=299 => Self::Storm,
            300..=399 | 500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            771 | 781 => Self::Storm, // squalls, tornado
            700..=799 => Self::Cloud, // mist, fog, haze and friends
            800 => Self::Clear,
            801..=899 => Self::Cloud,
            _ => Self::FALLBACK,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "storm",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
