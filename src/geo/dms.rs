//! Fixed-width degrees/minutes coordinates as stored in fix records.
//!
//! Latitudes are `DDMMmmm` and longitudes `DDDMMmmm`, where `mmm` is
//! thousandths of a minute, followed by a single hemisphere letter.

use super::GeoError;

/// Resolution of the encoding, in degrees (one thousandth of a minute).
pub const DMS_RESOLUTION_DEG: f64 = 1.0 / 60_000.0;

/// Decodes a fixed-width coordinate into signed decimal degrees.
///
/// `dms` holds only the digits; the hemisphere selects the layout
/// (2-digit degrees for `N`/`S`, 3-digit for `E`/`W`) and the sign.
pub fn to_decimal_degrees(dms: &str, hemisphere: char) -> Result<f64, GeoError> {
    let (field, deg_width, max_deg) = match hemisphere.to_ascii_uppercase() {
        'N' | 'S' => ("latitude", 2, 90.0),
        'E' | 'W' => ("longitude", 3, 180.0),
        other => return Err(GeoError::Hemisphere(other)),
    };
    let malformed = || GeoError::Format {
        field,
        value: format!("{dms}{hemisphere}"),
    };

    if dms.len() != deg_width + 5 || !dms.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let degrees = digits(&dms[..deg_width]);
    let minutes = digits(&dms[deg_width..deg_width + 2]);
    let thousandths = digits(&dms[deg_width + 2..]);
    if minutes >= 60.0 {
        return Err(malformed());
    }

    let value = degrees + (minutes + thousandths / 1000.0) / 60.0;
    if value > max_deg {
        return Err(malformed());
    }

    Ok(match hemisphere.to_ascii_uppercase() {
        'S' | 'W' => -value,
        _ => value,
    })
}

// Callers have already checked the slice is ASCII digits.
fn digits(s: &str) -> f64 {
    s.bytes().fold(0.0, |acc, b| acc * 10.0 + f64::from(b - b'0'))
}

/// Encodes signed decimal degrees as `DDMMmmmN` / `DDMMmmmS`.
pub fn format_latitude(lat: f64) -> String {
    let hemisphere = if lat >= 0.0 { 'N' } else { 'S' };
    let (deg, min, thousandths) = split_minutes(lat);
    format!("{deg:02}{min:02}{thousandths:03}{hemisphere}")
}

/// Encodes signed decimal degrees as `DDDMMmmmE` / `DDDMMmmmW`.
pub fn format_longitude(lon: f64) -> String {
    let hemisphere = if lon >= 0.0 { 'E' } else { 'W' };
    let (deg, min, thousandths) = split_minutes(lon);
    format!("{deg:03}{min:02}{thousandths:03}{hemisphere}")
}

fn split_minutes(value: f64) -> (u64, u64, u64) {
    // Round once on the finest unit so 59.9995' carries into the next degree.
    let total = (value.abs() * 60_000.0).round() as u64;
    (total / 60_000, (total / 1000) % 60, total % 1000)
}
