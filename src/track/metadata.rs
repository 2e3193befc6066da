use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Three-letter header codes the flight keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderKey {
    Date,
    FixAccuracy,
    Pilot,
    Crew2,
    GliderType,
    GliderId,
    GpsDatum,
    FirmwareVersion,
    HardwareVersion,
    LoggerType,
    GpsReceiver,
    PressureSensor,
    CompetitionId,
    CompetitionClass,
}

impl HeaderKey {
    /// Case-insensitive lookup of a header code such as `PLT` or `gty`.
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code.to_ascii_lowercase().as_str() {
            "dte" => HeaderKey::Date,
            "fxa" => HeaderKey::FixAccuracy,
            "plt" => HeaderKey::Pilot,
            "cm2" => HeaderKey::Crew2,
            "gty" => HeaderKey::GliderType,
            "gid" => HeaderKey::GliderId,
            "dtm" => HeaderKey::GpsDatum,
            "rfw" => HeaderKey::FirmwareVersion,
            "rhw" => HeaderKey::HardwareVersion,
            "fty" => HeaderKey::LoggerType,
            "gps" => HeaderKey::GpsReceiver,
            "prs" => HeaderKey::PressureSensor,
            "cid" => HeaderKey::CompetitionId,
            "ccl" => HeaderKey::CompetitionClass,
            _ => return None,
        };
        Some(key)
    }
}

/// Flight metadata. Fields stay `None` unless the track carried them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightMetadata {
    pub manufacturer: Option<String>,
    pub logger_id: Option<String>,
    pub logger_id_ext: Option<String>,
    pub date: Option<NaiveDate>,
    pub fix_accuracy: Option<String>,
    pub pilot: Option<String>,
    pub crew2: Option<String>,
    pub glider_type: Option<String>,
    pub glider_id: Option<String>,
    pub gps_datum: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub logger_type: Option<String>,
    pub gps_receiver: Option<String>,
    pub pressure_sensor: Option<String>,
    pub competition_id: Option<String>,
    pub competition_class: Option<String>,
}

impl FlightMetadata {
    /// Stores a free-form header value. Dates go through [`FlightMetadata::date`].
    pub fn set_text(&mut self, key: HeaderKey, value: String) {
        let slot = match key {
            HeaderKey::Date => return,
            HeaderKey::FixAccuracy => &mut self.fix_accuracy,
            HeaderKey::Pilot => &mut self.pilot,
            HeaderKey::Crew2 => &mut self.crew2,
            HeaderKey::GliderType => &mut self.glider_type,
            HeaderKey::GliderId => &mut self.glider_id,
            HeaderKey::GpsDatum => &mut self.gps_datum,
            HeaderKey::FirmwareVersion => &mut self.firmware_version,
            HeaderKey::HardwareVersion => &mut self.hardware_version,
            HeaderKey::LoggerType => &mut self.logger_type,
            HeaderKey::GpsReceiver => &mut self.gps_receiver,
            HeaderKey::PressureSensor => &mut self.pressure_sensor,
            HeaderKey::CompetitionId => &mut self.competition_id,
            HeaderKey::CompetitionClass => &mut self.competition_class,
        };
        *slot = Some(value);
    }
}
