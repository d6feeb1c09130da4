use std::sync::LazyLock;

use regex::Regex;

use crate::data::Coord;
use crate::error::EngineError;
use crate::fetch::{FetchError, OpenMeteo};

/// A resolved geographic location with coordinates and display name.
#[derive(Debug, Clone)]
pub struct Location {
    /// Human-readable name (geocoder place name, or the original
    /// coordinate string).
    pub display_name: String,
    pub coord: Coord,
}

/// Parse a coordinate string in "latitude,longitude" format.
///
/// Returns `None` if the string doesn't match the expected format or if
/// coordinates are out of valid ranges (latitude: -90 to 90, longitude:
/// -180 to 180).
fn parse_coordinates(s: &str) -> Option<Location> {
    static COORD_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"(?x)
            ^
            \s*
            (-?\d+(?:\.\d+)?)   # latitude: decimal number
            \s*,\s*
            (-?\d+(?:\.\d+)?)   # longitude: decimal number
            \s*
            $
        "#,
        )
        .unwrap()
    });

    let caps = COORD_RE.captures(s)?;
    let latitude: f64 = caps[1].parse().ok()?;
    let longitude: f64 = caps[2].parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(Location {
        display_name: s.to_string(),
        coord: Coord { latitude, longitude },
    })
}

/// Resolve a location string to geographic coordinates.
///
/// Accepts either a coordinate pair (e.g., "45.8150,15.9819") or a place
/// name (e.g., "London"). Coordinates are validated to be within valid
/// ranges; place names go through the Open-Meteo geocoding API and the
/// first candidate wins.
pub async fn resolve_location(api: &OpenMeteo, s: &str) -> Result<Location, EngineError> {
    if let Some(location) = parse_coordinates(s) {
        return Ok(location);
    }

    // A bare number or malformed pair is a coordinate typo, not a place
    // name worth geocoding.
    if s.trim().parse::<f64>().is_ok() || looks_like_coords(s) {
        return Err(EngineError::InvalidCoordinates(s.to_string()));
    }

    let mut results = api.geocode(s).await.map_err(FetchError::into_engine)?;
    if results.is_empty() {
        return Err(EngineError::UnknownLocation(s.to_string()));
    }

    let place = results.remove(0);
    let mut display_name = place.name;
    if let Some(region) = place.admin1.filter(|r| r != &display_name) {
        display_name = format!("{display_name}, {region}");
    }
    if let Some(country) = place.country {
        display_name = format!("{display_name}, {country}");
    }
    Ok(Location {
        display_name,
        coord: Coord {
            latitude: place.latitude,
            longitude: place.longitude,
        },
    })
}

/// True for strings that are clearly a numeric pair gone wrong (out of
/// range, trailing junk), so the caller gets a coordinate error instead
/// of a failed place lookup.
fn looks_like_coords(s: &str) -> bool {
    static NUMERIC_PAIR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*-?\d+(?:\.\d+)?\s*,\s*-?\d+(?:\.\d+)?").unwrap());
    NUMERIC_PAIR_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coordinates_basic() {
        let loc = parse_coordinates("45.8150,15.9819").unwrap();
        assert_eq!(loc.coord.latitude, 45.8150);
        assert_eq!(loc.coord.longitude, 15.9819);
        assert_eq!(loc.display_name, "45.8150,15.9819");
    }

    #[test]
    fn parse_coordinates_negative() {
        let loc = parse_coordinates("-33.8688,151.2093").unwrap();
        assert_eq!(loc.coord.latitude, -33.8688);
        assert_eq!(loc.coord.longitude, 151.2093);
    }

    #[test]
    fn parse_coordinates_integers() {
        let loc = parse_coordinates("45,15").unwrap();
        assert_eq!(loc.coord.latitude, 45.0);
        assert_eq!(loc.coord.longitude, 15.0);
    }

    #[test]
    fn parse_coordinates_with_whitespace() {
        let loc = parse_coordinates("  45.0 , 15.0  ").unwrap();
        assert_eq!(loc.coord.latitude, 45.0);
        assert_eq!(loc.coord.longitude, 15.0);
    }

    #[test]
    fn parse_coordinates_boundary_values() {
        assert!(parse_coordinates("90,180").is_some());
        assert!(parse_coordinates("-90,-180").is_some());
    }

    #[test]
    fn parse_coordinates_latitude_out_of_range() {
        assert!(parse_coordinates("91,0").is_none());
        assert!(parse_coordinates("-91,0").is_none());
    }

    #[test]
    fn parse_coordinates_longitude_out_of_range() {
        assert!(parse_coordinates("0,181").is_none());
        assert!(parse_coordinates("0,-181").is_none());
    }

    #[test]
    fn parse_coordinates_not_coordinates() {
        assert!(parse_coordinates("London").is_none());
        assert!(parse_coordinates("").is_none());
        assert!(parse_coordinates("45").is_none());
        assert!(parse_coordinates("45,15,20").is_none());
    }

    #[test]
    fn numeric_pair_detection() {
        assert!(looks_like_coords("91,0"));
        assert!(looks_like_coords("45,15,20"));
        assert!(!looks_like_coords("London"));
    }
}
