//! Async driver for the Sensirion SCD4x family (SCD40, SCD41, SCD43) of
//! CO2, temperature and humidity sensors.
//!
//! [`SCD4xSensor`] implements the sensor command set on top of
//! [`embedded_hal_async::i2c::I2c`]. [`SolderedSCD4x`] is the board-level
//! handle: it only fixes the default sensor variant and hands every call
//! through to the driver. [`PeriodicReader`] drives the sensor from a polling
//! loop without ever sleeping inside the driver.
//!
//! Enable the `defmt` feature for logging.

#![cfg_attr(not(test), no_std)]

mod fmt;

mod command;
pub mod crc;
mod error;
mod periodic;
mod scd4x;
mod sensor_type;
mod soldered;

pub use error::SCD4xError;
pub use periodic::PeriodicReader;
pub use scd4x::{BeginOptions, SCD4X_ADDRESS, SCD4xSensor};
pub use sensor_type::SensorType;
pub use soldered::SolderedSCD4x;

/// One CO2/temperature/humidity sample.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SCD4xResponse {
    /// CO2 concentration in ppm. Zero after an RHT-only single shot.
    pub co2: u16,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}
