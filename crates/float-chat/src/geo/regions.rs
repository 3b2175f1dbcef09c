//! Ocean basin and Indian Ocean subregion boxes.
//!
//! Hand-tuned constants kept as data tables so they can be unit-tested and
//! adjusted without touching synthesis logic.

/// Inclusive latitude/longitude bounding box with a display name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBox {
    pub name: &'static str,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl RegionBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

pub const INDIAN_OCEAN: RegionBox = RegionBox {
    name: "Indian Ocean",
    lat_min: -30.0,
    lat_max: 30.0,
    lon_min: 20.0,
    lon_max: 120.0,
};

pub const EQUATOR_BAND: RegionBox = RegionBox {
    name: "equatorial band",
    lat_min: -5.0,
    lat_max: 5.0,
    lon_min: -180.0,
    lon_max: 180.0,
};

/// Major basins, checked in order; the Pacific wraps the antimeridian and so
/// takes two entries.
pub const BASINS: &[RegionBox] = &[
    INDIAN_OCEAN,
    RegionBox {
        name: "Atlantic Ocean",
        lat_min: -60.0,
        lat_max: 60.0,
        lon_min: -60.0,
        lon_max: 20.0,
    },
    RegionBox {
        name: "Pacific Ocean",
        lat_min: -60.0,
        lat_max: 60.0,
        lon_min: 120.0,
        lon_max: 180.0,
    },
    RegionBox {
        name: "Pacific Ocean",
        lat_min: -60.0,
        lat_max: 60.0,
        lon_min: -180.0,
        lon_max: -60.0,
    },
];

/// Indian Ocean subregions used for variability ranking, checked in order.
pub const INDIAN_SUBREGIONS: &[RegionBox] = &[
    RegionBox {
        name: "Arabian Sea (NW)",
        lat_min: 5.0,
        lat_max: 25.0,
        lon_min: 45.0,
        lon_max: 80.0,
    },
    RegionBox {
        name: "Bay of Bengal (NE)",
        lat_min: 5.0,
        lat_max: 25.0,
        lon_min: 80.0,
        lon_max: 100.0,
    },
    RegionBox {
        name: "Equatorial Indian (EQ)",
        lat_min: -10.0,
        lat_max: 10.0,
        lon_min: -180.0,
        lon_max: 180.0,
    },
    RegionBox {
        name: "Southern Indian (SW/SE)",
        lat_min: -30.0,
        lat_max: -10.0,
        lon_min: -180.0,
        lon_max: 180.0,
    },
];

/// Basin a sample falls in, or "Global" outside the tabulated boxes.
pub fn basin_for(lat: f64, lon: f64) -> &'static str {
    BASINS
        .iter()
        .find(|basin| basin.contains(lat, lon))
        .map(|basin| basin.name)
        .unwrap_or("Global")
}

/// Subregion label for a sample inside the Indian Ocean box.
pub fn indian_subregion_for(lat: f64, lon: f64) -> &'static str {
    INDIAN_SUBREGIONS
        .iter()
        .find(|subregion| subregion.contains(lat, lon))
        .map(|subregion| subregion.name)
        .unwrap_or("Other Indian")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basin_assignment() {
        assert_eq!(basin_for(0.0, 80.0), "Indian Ocean");
        assert_eq!(basin_for(0.0, -30.0), "Atlantic Ocean");
        assert_eq!(basin_for(0.0, 150.0), "Pacific Ocean");
        assert_eq!(basin_for(0.0, -120.0), "Pacific Ocean");
        assert_eq!(basin_for(80.0, 0.0), "Global");
    }

    #[test]
    fn indian_takes_priority_on_shared_boundary() {
        // lon 20 sits on the Indian/Atlantic edge; table order decides.
        assert_eq!(basin_for(0.0, 20.0), "Indian Ocean");
    }

    #[test]
    fn subregion_assignment() {
        assert_eq!(indian_subregion_for(18.0, 64.0), "Arabian Sea (NW)");
        assert_eq!(indian_subregion_for(15.0, 90.0), "Bay of Bengal (NE)");
        assert_eq!(indian_subregion_for(0.0, 75.0), "Equatorial Indian (EQ)");
        assert_eq!(indian_subregion_for(-20.0, 80.0), "Southern Indian (SW/SE)");
        assert_eq!(indian_subregion_for(28.0, 70.0), "Other Indian");
    }

    #[test]
    fn arabian_sea_wins_lon_80_boundary() {
        assert_eq!(indian_subregion_for(15.0, 80.0), "Arabian Sea (NW)");
    }
}
