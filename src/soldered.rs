use core::ops::{Deref, DerefMut};

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::{SCD4xSensor, SensorType};

/// SCD4x breakout board handle.
///
/// Defaults to the SCD40 variant and otherwise behaves exactly like
/// [`SCD4xSensor`]: every driver method is reachable through `Deref`, and
/// errors come back untouched. Nothing is sent to the sensor until
/// [`begin`](SCD4xSensor::begin) or another command is called.
pub struct SolderedSCD4x<I2C, D> {
    sensor: SCD4xSensor<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> SolderedSCD4x<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_sensor_type(i2c, delay, SensorType::default())
    }

    pub fn with_sensor_type(i2c: I2C, delay: D, sensor_type: SensorType) -> Self {
        Self {
            sensor: SCD4xSensor::new(i2c, delay, sensor_type),
        }
    }

    pub fn inner(&self) -> &SCD4xSensor<I2C, D> {
        &self.sensor
    }

    pub fn inner_mut(&mut self) -> &mut SCD4xSensor<I2C, D> {
        &mut self.sensor
    }

    pub fn into_inner(self) -> SCD4xSensor<I2C, D> {
        self.sensor
    }
}

impl<I2C, D> From<SCD4xSensor<I2C, D>> for SolderedSCD4x<I2C, D> {
    fn from(sensor: SCD4xSensor<I2C, D>) -> Self {
        Self { sensor }
    }
}

impl<I2C, D> Deref for SolderedSCD4x<I2C, D> {
    type Target = SCD4xSensor<I2C, D>;

    fn deref(&self) -> &Self::Target {
        &self.sensor
    }
}

impl<I2C, D> DerefMut for SolderedSCD4x<I2C, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BeginOptions, PeriodicReader, SCD4X_ADDRESS, SCD4xError};
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTx};

    const ADDR: u8 = SCD4X_ADDRESS;

    fn begin_transactions() -> Vec<I2cTx> {
        vec![
            I2cTx::write(ADDR, vec![0x3F, 0x86]),
            I2cTx::write(ADDR, vec![0x36, 0x82]),
            I2cTx::read(
                ADDR,
                vec![0x12, 0x34, 0x37, 0x56, 0x78, 0x7D, 0x9A, 0xBC, 0xE0],
            ),
            I2cTx::write(ADDR, vec![0x24, 0x16, 0x00, 0x01, 0xB0]),
            I2cTx::write(ADDR, vec![0x21, 0xB1]),
        ]
    }

    fn begin_options() -> BeginOptions {
        BeginOptions {
            poll_sensor_type: false,
            ..BeginOptions::default()
        }
    }

    #[test]
    fn test_default_variant_is_scd40() {
        let mut i2c = I2cMock::new(&[]);

        let scd = SolderedSCD4x::new(i2c.clone(), NoopDelay);
        let explicit = SolderedSCD4x::with_sensor_type(i2c.clone(), NoopDelay, SensorType::SCD40);

        assert_eq!(scd.sensor_type(), SensorType::SCD40);
        assert_eq!(scd.sensor_type(), explicit.sensor_type());
        assert_eq!(scd.address(), explicit.address());
        assert!(!scd.is_periodic_measurement_running());

        i2c.done();
    }

    #[test]
    fn test_variant_is_forwarded() {
        let mut i2c = I2cMock::new(&[]);

        for variant in [SensorType::SCD40, SensorType::SCD41, SensorType::SCD43] {
            let scd = SolderedSCD4x::with_sensor_type(i2c.clone(), NoopDelay, variant);
            let direct = SCD4xSensor::new(i2c.clone(), NoopDelay, variant);

            assert_eq!(scd.sensor_type(), direct.sensor_type());
            assert_eq!(scd.sensor_type().co2_range(), variant.co2_range());
            assert_eq!(
                scd.sensor_type().supports_single_shot(),
                direct.sensor_type().supports_single_shot()
            );
        }

        i2c.done();
    }

    #[test]
    fn test_begin_matches_direct_driver() {
        let mut adapter_i2c = I2cMock::new(&begin_transactions());
        let mut direct_i2c = I2cMock::new(&begin_transactions());

        let mut scd = SolderedSCD4x::new(adapter_i2c.clone(), NoopDelay);
        let mut direct = SCD4xSensor::new(direct_i2c.clone(), NoopDelay, SensorType::SCD40);

        assert_eq!(
            block_on(scd.begin(begin_options())),
            block_on(direct.begin(begin_options()))
        );
        assert_eq!(
            scd.is_periodic_measurement_running(),
            direct.is_periodic_measurement_running()
        );

        adapter_i2c.done();
        direct_i2c.done();
    }

    #[test]
    fn test_errors_pass_through() {
        let mut i2c = I2cMock::new(&[
            I2cTx::write(ADDR, vec![0x3F, 0x86]).with_error(ErrorKind::Other)
        ]);
        let mut scd = SolderedSCD4x::new(i2c.clone(), NoopDelay);

        assert_eq!(
            block_on(scd.begin(begin_options())),
            Err(SCD4xError::I2CError(ErrorKind::Other))
        );
        assert_eq!(
            block_on(scd.measure_single_shot()),
            Err(SCD4xError::NotSupported)
        );

        i2c.done();
    }

    #[test]
    fn test_scd41_single_shot_through_adapter() {
        let mut i2c = I2cMock::new(&[
            I2cTx::write(ADDR, vec![0x21, 0x9D]),
            I2cTx::write(ADDR, vec![0xE4, 0xB8]),
            I2cTx::read(ADDR, vec![0x80, 0x00, 0xA2]),
        ]);
        let mut scd = SolderedSCD4x::with_sensor_type(i2c.clone(), NoopDelay, SensorType::SCD41);

        assert_eq!(
            block_on(scd.measure_single_shot()),
            Err(SCD4xError::NoData)
        );

        i2c.done();
    }

    #[test]
    fn test_into_inner_keeps_state() {
        let mut i2c = I2cMock::new(&[I2cTx::write(ADDR, vec![0x21, 0xB1])]);
        let mut scd = SolderedSCD4x::with_sensor_type(i2c.clone(), NoopDelay, SensorType::SCD43);

        block_on(scd.start_periodic_measurement()).unwrap();
        let inner = scd.into_inner();
        assert_eq!(inner.sensor_type(), SensorType::SCD43);
        assert!(inner.is_periodic_measurement_running());

        // PeriodicReader borrows the driver behind the adapter
        let mut scd = SolderedSCD4x::from(inner);
        let reader = PeriodicReader::new(scd.inner_mut());
        assert!(!reader.is_initialized());
        drop(reader);
        let (_i2c, _delay) = scd.into_inner().release();

        i2c.done();
    }
}
