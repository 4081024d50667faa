/// SCD4x I2C commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    StartPeriodicMeasurement,
    StartLowPowerPeriodicMeasurement,
    StopPeriodicMeasurement,
    ReadMeasurement,
    GetDataReadyStatus,
    SetTemperatureOffset,
    GetTemperatureOffset,
    SetSensorAltitude,
    GetSensorAltitude,
    SetAmbientPressure,
    PerformForcedRecalibration,
    SetAutomaticSelfCalibrationEnabled,
    GetAutomaticSelfCalibrationEnabled,
    PersistSettings,
    GetSerialNumber,
    PerformSelfTest,
    PerformFactoryReset,
    Reinit,
    GetFeatureSet,
    MeasureSingleShot,
    MeasureSingleShotRhtOnly,
    PowerDown,
    WakeUp,
}

impl Command {
    pub(crate) fn code(self) -> u16 {
        match self {
            Command::StartPeriodicMeasurement => 0x21B1,
            Command::StartLowPowerPeriodicMeasurement => 0x21AC,
            Command::StopPeriodicMeasurement => 0x3F86,
            Command::ReadMeasurement => 0xEC05,
            Command::GetDataReadyStatus => 0xE4B8,
            Command::SetTemperatureOffset => 0x241D,
            Command::GetTemperatureOffset => 0x2318,
            Command::SetSensorAltitude => 0x2427,
            Command::GetSensorAltitude => 0x2322,
            Command::SetAmbientPressure => 0xE000,
            Command::PerformForcedRecalibration => 0x362F,
            Command::SetAutomaticSelfCalibrationEnabled => 0x2416,
            Command::GetAutomaticSelfCalibrationEnabled => 0x2313,
            Command::PersistSettings => 0x3615,
            Command::GetSerialNumber => 0x3682,
            Command::PerformSelfTest => 0x3639,
            Command::PerformFactoryReset => 0x3632,
            Command::Reinit => 0x3646,
            Command::GetFeatureSet => 0x202F,
            Command::MeasureSingleShot => 0x219D,
            Command::MeasureSingleShotRhtOnly => 0x2196,
            Command::PowerDown => 0x36E0,
            Command::WakeUp => 0x36F6,
        }
    }

    /// Time the sensor needs before the response can be read or the next
    /// command can be sent.
    pub(crate) fn execution_ms(self) -> u32 {
        match self {
            Command::StartPeriodicMeasurement
            | Command::StartLowPowerPeriodicMeasurement => 0,
            Command::StopPeriodicMeasurement => 500,
            Command::PerformForcedRecalibration => 400,
            Command::PersistSettings => 800,
            Command::PerformSelfTest => 10_000,
            Command::PerformFactoryReset => 1200,
            Command::Reinit | Command::WakeUp => 20,
            Command::MeasureSingleShot => 5000,
            Command::MeasureSingleShotRhtOnly => 50,
            _ => 1,
        }
    }

    /// Whether the sensor accepts the command during periodic measurement.
    pub(crate) fn allowed_while_measuring(self) -> bool {
        matches!(
            self,
            Command::ReadMeasurement
                | Command::GetDataReadyStatus
                | Command::SetAmbientPressure
                | Command::StopPeriodicMeasurement
        )
    }
}
