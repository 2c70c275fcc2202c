use serde::{Deserialize, Serialize};

use crate::error::WorldgenError;
use crate::rng::fold_seed;

/// Seed as supplied by the caller: a number or free text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u64),
    /// Negative or fractional numbers.
    Float(f64),
    Text(String),
}

impl Seed {
    /// Numeric seed for all generators. Text that parses as an integer
    /// is the same seed as that integer.
    pub fn value(&self) -> u64 {
        match self {
            Seed::Number(n) => *n,
            Seed::Float(f) => fold_seed(&f.to_bits().to_le_bytes()),
            Seed::Text(s) => s.trim().parse().unwrap_or_else(|_| fold_seed(s.as_bytes())),
        }
    }
}

impl From<u64> for Seed {
    fn from(n: u64) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldShape {
    #[default]
    Freeform,
    Circle,
    Rectangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    /// Polar radiation floor.
    pub min: f32,
    /// Equatorial radiation peak.
    pub max: f32,
}

/// All tunable generation parameters, as sent by the new-world form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    pub seed: Seed,
    pub size: Size,
    /// Kept wide so out-of-range values reach validation instead of failing to parse.
    pub sealevel: i64,
    pub world_shape: WorldShape,
    pub world_shape_power: f32,
    /// Quantile of positive upstream counts above which a cell is a river.
    pub river_threshold: f32,
    pub temperature: TemperatureRange,
    pub elevation_cooling_amount: f32,
    pub depression_fill_percent: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: Seed::Number(42),
            size: Size {
                width: 250,
                height: 200,
            },
            sealevel: 102,
            world_shape: WorldShape::Freeform,
            world_shape_power: 2.0,
            river_threshold: 0.9,
            temperature: TemperatureRange {
                min: -50.0,
                max: 19.0,
            },
            elevation_cooling_amount: 30.0,
            depression_fill_percent: 1.0,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), WorldgenError> {
        let Size { width, height } = self.size;
        if width == 0 {
            return Err(WorldgenError::invalid("size.width", "must be positive"));
        }
        if height == 0 {
            return Err(WorldgenError::invalid("size.height", "must be positive"));
        }
        match width.checked_mul(height) {
            Some(n) if n <= u32::MAX as usize => {}
            _ => {
                return Err(WorldgenError::invalid(
                    "size",
                    format!("{width}x{height} exceeds {} cells", u32::MAX),
                ));
            }
        }
        if !(1..=255).contains(&self.sealevel) {
            return Err(WorldgenError::invalid(
                "sealevel",
                format!("{} is outside 1..=255", self.sealevel),
            ));
        }
        check_range("worldShapePower", self.world_shape_power, 1.0, 5.0)?;
        check_range("riverThreshold", self.river_threshold, 0.0, 1.0)?;
        check_range("depressionFillPercent", self.depression_fill_percent, 0.0, 1.0)?;
        let TemperatureRange { min, max } = self.temperature;
        if !min.is_finite() || !max.is_finite() {
            return Err(WorldgenError::invalid("temperature", "bounds must be finite"));
        }
        if min > max {
            return Err(WorldgenError::invalid(
                "temperature",
                format!("min {min} is above max {max}"),
            ));
        }
        if !self.elevation_cooling_amount.is_finite() || self.elevation_cooling_amount < 0.0 {
            return Err(WorldgenError::invalid(
                "elevationCoolingAmount",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Sea level as a height value. Only meaningful after `validate`.
    pub fn sea_level(&self) -> u8 {
        self.sealevel.clamp(1, 255) as u8
    }
}

fn check_range(field: &'static str, v: f32, lo: f32, hi: f32) -> Result<(), WorldgenError> {
    if v.is_finite() && (lo..=hi).contains(&v) {
        Ok(())
    } else {
        Err(WorldgenError::invalid(field, format!("{v} is outside {lo}..={hi}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_width() {
        let mut p = Params::default();
        p.size.width = 0;
        match p.validate() {
            Err(WorldgenError::InvalidParam { field, .. }) => assert_eq!(field, "size.width"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_sealevel_out_of_range() {
        for bad in [0, 256, -3] {
            let p = Params {
                sealevel: bad,
                ..Params::default()
            };
            match p.validate() {
                Err(WorldgenError::InvalidParam { field, .. }) => assert_eq!(field, "sealevel"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn negative_and_fractional_seeds_parse() {
        let a: Params = serde_json::from_str(r#"{"seed": -7}"#).unwrap();
        let b: Params = serde_json::from_str(r#"{"seed": 3.5}"#).unwrap();
        assert_eq!(a.seed, Seed::Float(-7.0));
        assert_eq!(b.seed, Seed::Float(3.5));
        assert_eq!(a.seed.value(), Seed::Float(-7.0).value());
        assert_ne!(a.seed.value(), b.seed.value());

        let c: Params = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(c.seed, Seed::Number(7));
    }

    #[test]
    fn partial_request_fills_defaults() {
        let p: Params =
            serde_json::from_str(r#"{"seed":"hello","size":{"width":64,"height":32},"worldShape":"circle"}"#)
                .unwrap();
        assert_eq!(p.seed, Seed::Text("hello".into()));
        assert_eq!(p.size.width, 64);
        assert_eq!(p.world_shape, WorldShape::Circle);
        assert_eq!(p.sealevel, 102);
        assert_eq!(p.river_threshold, 0.9);
    }

    #[test]
    fn numeric_text_seed_matches_number() {
        assert_eq!(Seed::from("1234").value(), Seed::Number(1234).value());
        assert_ne!(Seed::from("abc").value(), Seed::from("abd").value());
    }
}
