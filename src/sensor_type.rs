use core::ops::RangeInclusive;

/// SCD4x hardware variant.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorType {
    /// Periodic measurement only, 400-2000 ppm.
    #[default]
    SCD40,
    /// Adds single shot and power down, 400-5000 ppm.
    SCD41,
    /// SCD41 feature set with tighter accuracy, 400-5000 ppm.
    SCD43,
}

impl SensorType {
    /// Decodes the variant field (bits 15..12) of the `get_feature_set` word.
    pub fn from_feature_set(word: u16) -> Result<Self, u8> {
        match ((word >> 12) & 0x0F) as u8 {
            0b0000 => Ok(SensorType::SCD40),
            0b0001 => Ok(SensorType::SCD41),
            0b0101 => Ok(SensorType::SCD43),
            other => Err(other),
        }
    }

    /// Specified CO2 output range in ppm.
    pub fn co2_range(&self) -> RangeInclusive<u16> {
        match self {
            SensorType::SCD40 => 400..=2000,
            SensorType::SCD41 | SensorType::SCD43 => 400..=5000,
        }
    }

    pub fn supports_single_shot(&self) -> bool {
        !matches!(self, SensorType::SCD40)
    }

    pub fn supports_power_down(&self) -> bool {
        !matches!(self, SensorType::SCD40)
    }
}
