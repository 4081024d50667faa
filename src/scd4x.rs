use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::command::Command;
use crate::crc::{decode_words, encode_word};
use crate::{SCD4xError, SCD4xResponse, SensorType};

/// Fixed I2C address of every SCD4x variant.
pub const SCD4X_ADDRESS: u8 = 0x62;

/// 2^16, the full scale of temperature and humidity words.
const WORD_SCALE: f32 = 65536.0;

/// Largest ambient pressure the 16-bit hPa word can carry, in Pa.
const MAX_AMBIENT_PRESSURE_PA: u32 = 6_553_500;

/// Start-up sequence run by [`SCD4xSensor::begin`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginOptions {
    /// Start periodic measurement once configured.
    pub start_measurement: bool,
    /// Enable automatic self calibration (disable it when false).
    pub auto_calibrate: bool,
    /// Skip the initial `stop_periodic_measurement` and its 500 ms wait.
    pub skip_stop_measurement: bool,
    /// Read the feature set and adopt the detected sensor variant.
    pub poll_sensor_type: bool,
}

impl Default for BeginOptions {
    fn default() -> Self {
        Self {
            start_measurement: true,
            auto_calibrate: true,
            skip_stop_measurement: false,
            poll_sensor_type: true,
        }
    }
}

/// Driver for the SCD4x CO2, temperature and humidity sensors.
///
/// Construction does no I/O; call [`begin`](Self::begin) (or drive the sensor
/// with the individual commands) before reading.
pub struct SCD4xSensor<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    sensor_type: SensorType,
    periodic_running: bool,
    last_response: Option<SCD4xResponse>,
}

impl<I2C: I2c, D: DelayNs> SCD4xSensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, sensor_type: SensorType) -> Self {
        Self {
            i2c,
            delay,
            address: SCD4X_ADDRESS,
            sensor_type,
            periodic_running: false,
            last_response: None,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn set_sensor_type(&mut self, sensor_type: SensorType) {
        self.sensor_type = sensor_type;
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether this driver started periodic measurement and has not stopped it.
    pub fn is_periodic_measurement_running(&self) -> bool {
        self.periodic_running
    }

    /// The most recent successful measurement.
    pub fn last_measurement(&self) -> Option<SCD4xResponse> {
        self.last_response
    }

    /// Releases the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Brings the sensor into a known state.
    ///
    /// Stops any running measurement, optionally detects the variant, checks
    /// communication by reading the serial number, configures automatic self
    /// calibration and optionally starts periodic measurement.
    pub async fn begin(&mut self, options: BeginOptions) -> Result<(), SCD4xError<I2C::Error>> {
        info!("SCD4x begin: {:?}", options);
        if !options.skip_stop_measurement {
            self.stop_periodic_measurement().await?;
        }
        if options.poll_sensor_type {
            self.poll_sensor_type().await?;
        }
        let serial = self.get_serial_number().await?;
        info!("SCD4x serial number: {:#x}", serial);
        self.set_automatic_self_calibration_enabled(options.auto_calibrate)
            .await?;
        if options.start_measurement {
            self.start_periodic_measurement().await?;
        }
        Ok(())
    }

    pub async fn start_periodic_measurement(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::StartPeriodicMeasurement).await?;
        self.periodic_running = true;
        Ok(())
    }

    /// Periodic measurement with a 30 s interval instead of 5 s.
    pub async fn start_low_power_periodic_measurement(
        &mut self,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::StartLowPowerPeriodicMeasurement)
            .await?;
        self.periodic_running = true;
        Ok(())
    }

    pub async fn stop_periodic_measurement(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::StopPeriodicMeasurement).await?;
        self.periodic_running = false;
        Ok(())
    }

    pub async fn get_data_ready_status(&mut self) -> Result<bool, SCD4xError<I2C::Error>> {
        let [status] = self.execute_read::<1>(Command::GetDataReadyStatus).await?;
        Ok(status & 0x07FF != 0)
    }

    /// Reads the latest measurement.
    ///
    /// Returns [`SCD4xError::NoData`] when the sensor has no new sample.
    pub async fn read_measurement(&mut self) -> Result<SCD4xResponse, SCD4xError<I2C::Error>> {
        if !self.get_data_ready_status().await? {
            trace!("SCD4x data not ready");
            return Err(SCD4xError::NoData);
        }
        self.fetch_measurement().await
    }

    /// Temperature offset in degrees Celsius, `0.0..175.0`.
    pub async fn set_temperature_offset(
        &mut self,
        offset: f32,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        if !(0.0..175.0).contains(&offset) {
            return Err(SCD4xError::InvalidArgument);
        }
        let word = (offset * WORD_SCALE / 175.0) as u16;
        self.execute_with_arg(Command::SetTemperatureOffset, word)
            .await
    }

    pub async fn get_temperature_offset(&mut self) -> Result<f32, SCD4xError<I2C::Error>> {
        let [word] = self.execute_read::<1>(Command::GetTemperatureOffset).await?;
        Ok(word as f32 * 175.0 / WORD_SCALE)
    }

    /// Altitude above sea level in meters.
    pub async fn set_sensor_altitude(&mut self, altitude: u16) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute_with_arg(Command::SetSensorAltitude, altitude)
            .await
    }

    pub async fn get_sensor_altitude(&mut self) -> Result<u16, SCD4xError<I2C::Error>> {
        let [altitude] = self.execute_read::<1>(Command::GetSensorAltitude).await?;
        Ok(altitude)
    }

    /// Ambient pressure in Pa; overrides altitude compensation. Allowed
    /// during periodic measurement.
    pub async fn set_ambient_pressure(&mut self, pressure: u32) -> Result<(), SCD4xError<I2C::Error>> {
        if pressure > MAX_AMBIENT_PRESSURE_PA {
            return Err(SCD4xError::InvalidArgument);
        }
        self.execute_with_arg(Command::SetAmbientPressure, (pressure / 100) as u16)
            .await
    }

    /// Forced recalibration against a known CO2 concentration.
    ///
    /// Returns the applied correction in ppm.
    pub async fn perform_forced_recalibration(
        &mut self,
        target_co2: u16,
    ) -> Result<i16, SCD4xError<I2C::Error>> {
        let command = Command::PerformForcedRecalibration;
        self.check_allowed(command)?;
        self.write_command(command, Some(target_co2)).await?;
        self.delay.delay_ms(command.execution_ms()).await;
        let [correction] = self.read_words::<1>().await?;
        if correction == 0xFFFF {
            warn!("SCD4x forced recalibration failed");
            return Err(SCD4xError::RecalibrationFailed);
        }
        Ok((correction as i32 - 0x8000) as i16)
    }

    pub async fn set_automatic_self_calibration_enabled(
        &mut self,
        enabled: bool,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute_with_arg(Command::SetAutomaticSelfCalibrationEnabled, enabled as u16)
            .await
    }

    pub async fn get_automatic_self_calibration_enabled(
        &mut self,
    ) -> Result<bool, SCD4xError<I2C::Error>> {
        let [enabled] = self
            .execute_read::<1>(Command::GetAutomaticSelfCalibrationEnabled)
            .await?;
        Ok(enabled == 1)
    }

    /// Stores the current configuration in EEPROM.
    pub async fn persist_settings(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::PersistSettings).await
    }

    /// 48-bit serial number.
    pub async fn get_serial_number(&mut self) -> Result<u64, SCD4xError<I2C::Error>> {
        let words = self.execute_read::<3>(Command::GetSerialNumber).await?;
        Ok(words
            .iter()
            .fold(0u64, |serial, &word| (serial << 16) | word as u64))
    }

    /// Blocks for ten seconds while the sensor tests itself.
    pub async fn perform_self_test(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        let [result] = self.execute_read::<1>(Command::PerformSelfTest).await?;
        if result != 0 {
            warn!("SCD4x self test failed: {:#x}", result);
            return Err(SCD4xError::SelfTestFailed(result));
        }
        Ok(())
    }

    pub async fn perform_factory_reset(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::PerformFactoryReset).await
    }

    /// Reloads user settings from EEPROM.
    pub async fn reinit(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.execute(Command::Reinit).await
    }

    pub async fn get_feature_set(&mut self) -> Result<u16, SCD4xError<I2C::Error>> {
        let [features] = self.execute_read::<1>(Command::GetFeatureSet).await?;
        Ok(features)
    }

    /// Reads the variant from the sensor and adopts it.
    pub async fn poll_sensor_type(&mut self) -> Result<SensorType, SCD4xError<I2C::Error>> {
        let features = self.get_feature_set().await?;
        let sensor_type =
            SensorType::from_feature_set(features).map_err(SCD4xError::UnknownSensorType)?;
        debug!("SCD4x variant: {:?}", sensor_type);
        self.sensor_type = sensor_type;
        Ok(sensor_type)
    }

    /// Triggers a single measurement and reads it after the five second
    /// conversion time. SCD41/SCD43 only.
    pub async fn measure_single_shot(&mut self) -> Result<SCD4xResponse, SCD4xError<I2C::Error>> {
        self.check_single_shot()?;
        self.execute(Command::MeasureSingleShot).await?;
        self.read_measurement().await
    }

    /// Single shot of temperature and humidity only; `co2` reads zero.
    /// SCD41/SCD43 only.
    pub async fn measure_single_shot_rht_only(
        &mut self,
    ) -> Result<SCD4xResponse, SCD4xError<I2C::Error>> {
        self.check_single_shot()?;
        self.execute(Command::MeasureSingleShotRhtOnly).await?;
        self.read_measurement().await
    }

    /// SCD41/SCD43 only.
    pub async fn power_down(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        self.check_power_down()?;
        self.execute(Command::PowerDown).await
    }

    /// SCD41/SCD43 only. The sensor does not acknowledge this command, so
    /// bus errors on the write are ignored.
    pub async fn wake_up(&mut self) -> Result<(), SCD4xError<I2C::Error>> {
        let command = Command::WakeUp;
        self.check_power_down()?;
        self.check_allowed(command)?;
        if self.write_command(command, None).await.is_err() {
            trace!("SCD4x wake up not acknowledged");
        }
        self.delay.delay_ms(command.execution_ms()).await;
        Ok(())
    }

    /// Sends a command without waiting for its execution time.
    pub(crate) async fn send_command(
        &mut self,
        command: Command,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        self.check_allowed(command)?;
        self.write_command(command, None).await?;
        match command {
            Command::StartPeriodicMeasurement | Command::StartLowPowerPeriodicMeasurement => {
                self.periodic_running = true
            }
            Command::StopPeriodicMeasurement => self.periodic_running = false,
            _ => {}
        }
        Ok(())
    }

    /// Reads a measurement without checking the data ready status first.
    pub(crate) async fn fetch_measurement(
        &mut self,
    ) -> Result<SCD4xResponse, SCD4xError<I2C::Error>> {
        let [co2, temperature, humidity] =
            self.execute_read::<3>(Command::ReadMeasurement).await?;
        let response = SCD4xResponse {
            co2,
            temperature: -45.0 + 175.0 * temperature as f32 / WORD_SCALE,
            humidity: 100.0 * humidity as f32 / WORD_SCALE,
        };
        debug!(
            "SCD4x measurement: co2={} temperature={} humidity={}",
            response.co2,
            response.temperature,
            response.humidity
        );
        self.last_response = Some(response);
        Ok(response)
    }

    fn check_allowed(&self, command: Command) -> Result<(), SCD4xError<I2C::Error>> {
        if self.periodic_running && !command.allowed_while_measuring() {
            return Err(SCD4xError::MeasurementRunning);
        }
        Ok(())
    }

    fn check_single_shot(&self) -> Result<(), SCD4xError<I2C::Error>> {
        if !self.sensor_type.supports_single_shot() {
            return Err(SCD4xError::NotSupported);
        }
        Ok(())
    }

    fn check_power_down(&self) -> Result<(), SCD4xError<I2C::Error>> {
        if !self.sensor_type.supports_power_down() {
            return Err(SCD4xError::NotSupported);
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<(), SCD4xError<I2C::Error>> {
        self.check_allowed(command)?;
        self.write_command(command, None).await?;
        self.wait_execution(command).await;
        Ok(())
    }

    async fn execute_with_arg(
        &mut self,
        command: Command,
        arg: u16,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        self.check_allowed(command)?;
        self.write_command(command, Some(arg)).await?;
        self.wait_execution(command).await;
        Ok(())
    }

    async fn execute_read<const N: usize>(
        &mut self,
        command: Command,
    ) -> Result<[u16; N], SCD4xError<I2C::Error>> {
        self.check_allowed(command)?;
        self.write_command(command, None).await?;
        self.wait_execution(command).await;
        self.read_words::<N>().await
    }

    async fn wait_execution(&mut self, command: Command) {
        let ms = command.execution_ms();
        if ms > 0 {
            self.delay.delay_ms(ms).await;
        }
    }

    async fn write_command(
        &mut self,
        command: Command,
        arg: Option<u16>,
    ) -> Result<(), SCD4xError<I2C::Error>> {
        trace!("SCD4x command {:#x}", command.code());
        let [msb, lsb] = command.code().to_be_bytes();
        match arg {
            Some(word) => {
                let [a, b, crc] = encode_word(word);
                self.i2c_write(&[msb, lsb, a, b, crc]).await
            }
            None => self.i2c_write(&[msb, lsb]).await,
        }
    }

    /// Reads `N` CRC-protected words.
    async fn read_words<const N: usize>(&mut self) -> Result<[u16; N], SCD4xError<I2C::Error>> {
        let mut buf = [0u8; 9];
        let len = N * 3;
        let mut words = [0u16; N];
        self.i2c_read(&mut buf[..len]).await?;
        if decode_words(&buf[..len], &mut words).is_none() {
            warn!("SCD4x CRC mismatch: {:?}", &buf[..len]);
            return Err(SCD4xError::CrcMismatch);
        }
        Ok(words)
    }

    async fn i2c_read(&mut self, read: &mut [u8]) -> Result<(), SCD4xError<I2C::Error>> {
        self.i2c.read(self.address, read).await?;
        Ok(())
    }

    async fn i2c_write(&mut self, write: &[u8]) -> Result<(), SCD4xError<I2C::Error>> {
        self.i2c.write(self.address, write).await?;
        Ok(())
    }
}
