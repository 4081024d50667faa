use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::command::Command;
use crate::{SCD4xError, SCD4xResponse, SCD4xSensor};

const STEP_INTERVAL: Duration = Duration::from_millis(1000);
const READ_INTERVAL: Duration = Duration::from_millis(5000);

/// Polls an SCD4x from a loop without waiting inside the driver.
///
/// Each call to [`poll`](Self::poll) does at most one step of the start-up
/// sequence or one read, then schedules the next step. Calls that arrive
/// early return the last response.
pub struct PeriodicReader<'a, I2C, D> {
    sensor: &'a mut SCD4xSensor<I2C, D>,
    initialization_step: InitializationStep,
    next_step_time: Instant,
}

impl<'a, I2C: I2c, D: DelayNs> PeriodicReader<'a, I2C, D> {
    pub fn new(sensor: &'a mut SCD4xSensor<I2C, D>) -> Self {
        Self {
            sensor,
            initialization_step: InitializationStep::Initial,
            next_step_time: Instant::now(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialization_step == InitializationStep::ReadData
    }

    pub async fn poll(&mut self) -> Result<SCD4xResponse, SCD4xError<I2C::Error>> {
        let now = Instant::now();
        if now < self.next_step_time {
            return self.sensor.last_measurement().ok_or(SCD4xError::NoData);
        }
        match self.initialization_step {
            InitializationStep::Initial => {
                debug!("Initialization Step: Initial -> StopMeasurement");
                self.initialization_step = InitializationStep::StopMeasurement;
                self.next_step_time = now + STEP_INTERVAL;
                Err(SCD4xError::NoData)
            }
            InitializationStep::StopMeasurement => {
                debug!("Initialization Step: StopMeasurement -> Reinit");
                self.initialization_step = InitializationStep::Reinit;
                self.next_step_time = now + STEP_INTERVAL;
                self.sensor
                    .send_command(Command::StopPeriodicMeasurement)
                    .await?;
                Err(SCD4xError::NoData)
            }
            InitializationStep::Reinit => {
                debug!("Initialization Step: Reinit -> StartMeasurement");
                self.initialization_step = InitializationStep::StartMeasurement;
                self.next_step_time = now + STEP_INTERVAL;
                self.sensor.send_command(Command::Reinit).await?;
                Err(SCD4xError::NoData)
            }
            InitializationStep::StartMeasurement => {
                debug!("Initialization Step: StartMeasurement -> ReadData");
                self.initialization_step = InitializationStep::ReadData;
                self.next_step_time = now + STEP_INTERVAL;
                self.sensor
                    .send_command(Command::StartPeriodicMeasurement)
                    .await?;
                Err(SCD4xError::NoData)
            }
            InitializationStep::ReadData => {
                self.next_step_time = now + READ_INTERVAL;
                if !self.sensor.get_data_ready_status().await? {
                    self.next_step_time = now + STEP_INTERVAL;
                    info!("Data not ready, waiting...");
                    return Err(SCD4xError::NoData);
                }
                self.sensor.fetch_measurement().await
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitializationStep {
    Initial,
    StopMeasurement,
    Reinit,
    StartMeasurement,
    ReadData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SCD4X_ADDRESS, SensorType};
    use embassy_futures::block_on;
    use embassy_time::MockDriver;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTx};

    const ADDR: u8 = SCD4X_ADDRESS;

    // The mock clock is process-wide and only moves forward, so the whole
    // sequence lives in one test.
    #[test]
    fn test_poll_sequence() {
        let driver = MockDriver::get();
        let mut i2c = I2cMock::new(&[
            I2cTx::write(ADDR, vec![0x3F, 0x86]),
            I2cTx::write(ADDR, vec![0x36, 0x46]),
            I2cTx::write(ADDR, vec![0x21, 0xB1]),
            // not ready yet
            I2cTx::write(ADDR, vec![0xE4, 0xB8]),
            I2cTx::read(ADDR, vec![0x80, 0x00, 0xA2]),
            // ready
            I2cTx::write(ADDR, vec![0xE4, 0xB8]),
            I2cTx::read(ADDR, vec![0x80, 0x06, 0x04]),
            I2cTx::write(ADDR, vec![0xEC, 0x05]),
            I2cTx::read(
                ADDR,
                vec![0x01, 0xF4, 0x33, 0x66, 0x67, 0xA2, 0x5E, 0xB9, 0x3C],
            ),
        ]);
        let mut scd = SCD4xSensor::new(i2c.clone(), NoopDelay, SensorType::SCD41);
        let mut reader = PeriodicReader::new(&mut scd);

        // Initial
        assert_eq!(block_on(reader.poll()), Err(SCD4xError::NoData));
        // too early, nothing cached
        assert_eq!(block_on(reader.poll()), Err(SCD4xError::NoData));

        for _ in 0..3 {
            driver.advance(STEP_INTERVAL);
            assert_eq!(block_on(reader.poll()), Err(SCD4xError::NoData));
        }
        assert!(reader.is_initialized());

        driver.advance(STEP_INTERVAL);
        assert_eq!(block_on(reader.poll()), Err(SCD4xError::NoData));

        driver.advance(STEP_INTERVAL);
        let response = block_on(reader.poll()).unwrap();
        assert_eq!(response.co2, 500);

        // before the read interval elapses the cached response is returned
        driver.advance(Duration::from_millis(1000));
        assert_eq!(block_on(reader.poll()), Ok(response));

        assert!(scd.is_periodic_measurement_running());
        i2c.done();
    }
}
