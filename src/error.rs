/// Errors reported by the SCD4x driver.
///
/// `E` is the error type of the underlying I2C bus.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SCD4xError<E> {
    /// No measurement is available yet.
    NoData,
    /// Error from the I2C bus.
    I2CError(E),
    /// A received word failed its CRC check.
    CrcMismatch,
    /// The command is rejected while periodic measurement is running.
    MeasurementRunning,
    /// The command is not available on the configured sensor variant.
    NotSupported,
    /// An argument is outside the range the sensor accepts.
    InvalidArgument,
    /// The feature set reported a variant this driver does not know.
    UnknownSensorType(u8),
    /// Forced recalibration was rejected by the sensor.
    RecalibrationFailed,
    /// Self test reported a malfunction; carries the raw result word.
    SelfTestFailed(u16),
}

impl<E> From<E> for SCD4xError<E> {
    fn from(value: E) -> Self {
        Self::I2CError(value)
    }
}
