//! Curated reference scores for known destinations.
//!
//! A small read-only catalog of per-month comfort scores (0-100), compiled
//! offline and embedded in the binary. Geocoders return coordinates that
//! differ slightly from the catalog's, so lookup tolerates a small
//! distance.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::data::Coord;

/// Maximum coordinate distance (degrees, ~17 km) for a catalog hit. No two
/// catalog destinations are closer than this.
const MATCH_RADIUS_DEG: f64 = 0.15;

#[derive(Debug, Clone, Deserialize)]
pub struct RefEntry {
    pub name: String,
    lat: f64,
    lon: f64,
    /// Monsoon regime: avoid months stay travelable, calibration lifts
    /// them into the middling range.
    pub monsoon: bool,
    /// Jan..Dec comfort scores on the 0-100 scale.
    pub scores: [u16; 12],
}

impl RefEntry {
    pub fn coord(&self) -> Coord {
        Coord { latitude: self.lat, longitude: self.lon }
    }
}

#[derive(Debug)]
pub struct ReferenceTable {
    entries: Vec<RefEntry>,
}

static BUNDLED: LazyLock<ReferenceTable> = LazyLock::new(|| {
    let entries: Vec<RefEntry> =
        serde_json::from_str(include_str!("../data/reference_scores.json"))
            .unwrap_or_default();
    ReferenceTable { entries }
});

impl ReferenceTable {
    /// The catalog embedded in the binary.
    pub fn bundled() -> &'static ReferenceTable {
        &BUNDLED
    }

    #[cfg(test)]
    fn from_entries(entries: Vec<RefEntry>) -> ReferenceTable {
        ReferenceTable { entries }
    }

    /// Find the catalog entry nearest to `coord` within the match radius.
    pub fn find(&self, coord: Coord) -> Option<&RefEntry> {
        let mut best: Option<&RefEntry> = None;
        let mut best_dist = MATCH_RADIUS_DEG;
        for entry in &self.entries {
            let dlat = entry.lat - coord.latitude;
            let dlon = entry.lon - coord.longitude;
            let dist = (dlat * dlat + dlon * dlon).sqrt();
            if dist < best_dist {
                best_dist = dist;
                best = Some(entry);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, lat: f64, lon: f64) -> RefEntry {
        RefEntry {
            name: name.into(),
            lat,
            lon,
            monsoon: false,
            scores: [50; 12],
        }
    }

    #[test]
    fn bundled_catalog_parses() {
        let table = ReferenceTable::bundled();
        let paris = table
            .find(Coord { latitude: 48.85, longitude: 2.35 })
            .expect("Paris in catalog");
        assert_eq!(paris.scores[6], 100);
        assert!(!paris.monsoon);
        let bangkok = table
            .find(Coord { latitude: 13.75, longitude: 100.52 })
            .expect("Bangkok in catalog");
        assert!(bangkok.monsoon);
    }

    #[test]
    fn proximity_hit_within_radius() {
        let table = ReferenceTable::from_entries(vec![entry("A", 48.8566, 2.3522)]);
        // Geocoder-style coords ~0.10° off still match.
        assert!(table.find(Coord { latitude: 48.85, longitude: 2.45 }).is_some());
    }

    #[test]
    fn miss_beyond_radius() {
        let table = ReferenceTable::from_entries(vec![entry("A", 48.85, 2.35)]);
        assert!(table.find(Coord { latitude: 48.85, longitude: 2.55 }).is_none());
    }

    #[test]
    fn nearest_entry_wins() {
        let table = ReferenceTable::from_entries(vec![
            entry("near", 10.0, 10.0),
            entry("far", 10.1, 10.1),
        ]);
        let hit = table.find(Coord { latitude: 10.01, longitude: 10.0 }).unwrap();
        assert_eq!(hit.name, "near");
    }
}
