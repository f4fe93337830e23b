//! `lat,lng[,NNkm]` geocode strings, accepted anywhere an area is.

/// A parsed coordinate pair with an optional radius override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geocode {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<u32>,
}

/// Parse `"34.05,-118.24"` or `"34.05,-118.24,25km"` into a [`Geocode`].
///
/// Returns `None` for anything else (a city name, malformed numbers, an
/// out-of-range latitude/longitude).
#[must_use]
pub fn parse_geocode(area: &str) -> Option<Geocode> {
    let mut parts = area.split(',').map(str::trim);
    let lat: f64 = parts.next()?.parse().ok()?;
    let lng: f64 = parts.next()?.parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }

    let radius_km = match parts.next() {
        Some(raw) => Some(raw.strip_suffix("km").unwrap_or(raw).parse().ok()?),
        None => None,
    };

    // Trailing garbage after the radius means this was not a geocode.
    if parts.next().is_some() {
        return None;
    }

    Some(Geocode {
        lat,
        lng,
        radius_km,
    })
}
