use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unit of the measures in an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    #[default]
    Miles,
    Kilometers,
    Feet,
    Meters,
}

impl MeasureUnit {
    /// Factor converting one unit into meters of projected distance
    pub fn factor(&self) -> f64 {
        match self {
            MeasureUnit::Miles => 1609.34,
            MeasureUnit::Kilometers => 1000.0,
            MeasureUnit::Feet => 0.3048,
            MeasureUnit::Meters => 1.0,
        }
    }
}

impl std::fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureUnit::Miles => write!(f, "miles"),
            MeasureUnit::Kilometers => write!(f, "kilometers"),
            MeasureUnit::Feet => write!(f, "feet"),
            MeasureUnit::Meters => write!(f, "meters"),
        }
    }
}

impl FromStr for MeasureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(MeasureUnit::Miles),
            "km" | "kilometer" | "kilometers" => Ok(MeasureUnit::Kilometers),
            "ft" | "foot" | "feet" => Ok(MeasureUnit::Feet),
            "m" | "meter" | "meters" => Ok(MeasureUnit::Meters),
            other => Err(format!("unknown measure unit '{}'", other)),
        }
    }
}
