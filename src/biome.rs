use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::WorldgenError;
use crate::grid::Grid;
use crate::terrain::TerrainType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    #[default]
    None = 0,
    Glacial = 1,
    Tundra = 2,
    BorealForest = 3,
    Shrubland = 4,
    Grassland = 5,
    Savanna = 6,
    Desert = 7,
    TemperateForest = 8,
    TemperateRainforest = 9,
    TropicalForest = 10,
    TropicalRainforest = 11,
}

impl Biome {
    pub const ALL: [Biome; 12] = [
        Biome::None,
        Biome::Glacial,
        Biome::Tundra,
        Biome::BorealForest,
        Biome::Shrubland,
        Biome::Grassland,
        Biome::Savanna,
        Biome::Desert,
        Biome::TemperateForest,
        Biome::TemperateRainforest,
        Biome::TropicalForest,
        Biome::TropicalRainforest,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Biome::None => "None",
            Biome::Glacial => "Glacial",
            Biome::Tundra => "Tundra",
            Biome::BorealForest => "Boreal Forest",
            Biome::Shrubland => "Scrubland",
            Biome::Grassland => "Grassland",
            Biome::Savanna => "Savanna",
            Biome::Desert => "Desert",
            Biome::TemperateForest => "Temperate Forest",
            Biome::TemperateRainforest => "Temperate Rainforest",
            Biome::TropicalForest => "Tropical Forest",
            Biome::TropicalRainforest => "Tropical Rainforest",
        }
    }
}

impl TryFrom<u8> for Biome {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        Biome::ALL.get(code as usize).copied().ok_or(code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoistureZone {
    Barren,
    Arid,
    SemiArid,
    SemiWet,
    Wet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureZone {
    Arctic,
    Subarctic,
    Temperate,
    Subtropical,
    Tropical,
}

/// Half-open [start, end) moisture bands.
const MOISTURE_ZONES: [(f32, f32, MoistureZone); 5] = [
    (0.0, 250.0, MoistureZone::Barren),
    (250.0, 500.0, MoistureZone::Arid),
    (500.0, 1000.0, MoistureZone::SemiArid),
    (1000.0, 2000.0, MoistureZone::SemiWet),
    (2000.0, f32::INFINITY, MoistureZone::Wet),
];

/// Half-open [start, end) temperature bands.
const TEMPERATURE_ZONES: [(f32, f32, TemperatureZone); 5] = [
    (f32::NEG_INFINITY, -10.0, TemperatureZone::Arctic),
    (-10.0, 2.0, TemperatureZone::Subarctic),
    (2.0, 15.0, TemperatureZone::Temperate),
    (15.0, 20.0, TemperatureZone::Subtropical),
    (20.0, f32::INFINITY, TemperatureZone::Tropical),
];

pub fn moisture_zone(m: f32) -> Result<MoistureZone, WorldgenError> {
    MOISTURE_ZONES
        .iter()
        .find(|(start, end, _)| m >= *start && m < *end)
        .map(|&(_, _, zone)| zone)
        .ok_or(WorldgenError::MoistureZone(m))
}

pub fn temperature_zone(t: f32) -> Result<TemperatureZone, WorldgenError> {
    TEMPERATURE_ZONES
        .iter()
        .find(|(start, end, _)| t >= *start && t < *end)
        .map(|&(_, _, zone)| zone)
        .ok_or(WorldgenError::TemperatureZone(t))
}

/// Rows: moisture zone, columns: temperature zone (Arctic..Tropical).
const BIOME_TABLE: [[Biome; 5]; 5] = {
    use Biome::*;
    [
        [Tundra, Tundra, Grassland, Grassland, Desert],
        [Tundra, Tundra, Shrubland, Savanna, Desert],
        [Glacial, BorealForest, TemperateForest, Shrubland, Savanna],
        [Glacial, BorealForest, TemperateForest, TemperateForest, TropicalForest],
        [Glacial, BorealForest, TemperateRainforest, TemperateRainforest, TropicalRainforest],
    ]
};

pub fn lookup_biome(moisture: f32, temperature: f32) -> Result<Biome, WorldgenError> {
    let m = moisture_zone(moisture)?;
    let t = temperature_zone(temperature)?;
    Ok(BIOME_TABLE[m as usize][t as usize])
}

/// Biome per cell; water cells are `Biome::None`. Fails if any land value
/// falls outside the zone tables.
pub fn classify_biomes(
    terrain: &Grid<TerrainType>,
    moisture: &Grid<f32>,
    temperature: &Grid<f32>,
) -> Result<Grid<Biome>, WorldgenError> {
    let data = terrain
        .data
        .par_iter()
        .zip(moisture.data.par_iter())
        .zip(temperature.data.par_iter())
        .map(|((t, &m), &temp)| {
            if t.is_water() {
                Ok(Biome::None)
            } else {
                lookup_biome(m, temp)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Grid::from_vec(terrain.w, terrain.h, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_over_land_domain() {
        for m in [0.0, 10.0, 249.9, 250.0, 999.0, 1500.0, 2000.0, 1e9] {
            for t in [-1e6, -60.0, -10.0, 0.0, 2.0, 14.9, 15.0, 19.99, 20.0, 55.0] {
                assert!(lookup_biome(m, t).is_ok(), "no biome for ({m}, {t})");
            }
        }
    }

    #[test]
    fn arctic_collapses_to_cold_biomes() {
        for m in [0.0, 300.0, 700.0, 1500.0, 5000.0] {
            let b = lookup_biome(m, -30.0).unwrap();
            assert!(matches!(b, Biome::Tundra | Biome::Glacial));
        }
        assert_eq!(lookup_biome(3000.0, 25.0), Ok(Biome::TropicalRainforest));
        assert_eq!(lookup_biome(100.0, 25.0), Ok(Biome::Desert));
    }

    #[test]
    fn out_of_table_values_are_errors() {
        assert_eq!(moisture_zone(-1.0), Err(WorldgenError::MoistureZone(-1.0)));
        assert!(matches!(
            temperature_zone(f32::NAN),
            Err(WorldgenError::TemperatureZone(_))
        ));
    }

    #[test]
    fn water_has_no_biome() {
        let terrain = Grid::from_vec(
            2,
            2,
            vec![TerrainType::Ocean, TerrainType::Coast, TerrainType::Lake, TerrainType::Land],
        );
        let moisture = Grid::from_vec(2, 2, vec![-5.0, 0.0, 0.0, 600.0]);
        let temperature = Grid::filled(2, 2, 10.0);
        let biomes = classify_biomes(&terrain, &moisture, &temperature).unwrap();
        assert_eq!(
            biomes.data,
            vec![Biome::None, Biome::None, Biome::None, Biome::TemperateForest]
        );
    }

    #[test]
    fn titles_match_legend_labels() {
        assert_eq!(Biome::Shrubland.title(), "Scrubland");
        assert_eq!(Biome::BorealForest.title(), "Boreal Forest");
        assert_eq!(Biome::TropicalRainforest.title(), "Tropical Rainforest");
    }

    #[test]
    fn biome_codes_round_trip() {
        for b in Biome::ALL {
            assert_eq!(Biome::try_from(b as u8), Ok(b));
        }
        assert_eq!(Biome::try_from(12), Err(12));
    }
}
