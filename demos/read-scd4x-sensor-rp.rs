#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::peripherals::I2C0;
use embassy_rp::{bind_interrupts, i2c};
use embassy_scd4x_sensor::{BeginOptions, SCD4xError, SolderedSCD4x};
use embassy_time::{Delay, Duration, Timer};
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    let sda = p.PIN_0;
    let scl = p.PIN_1;

    // Configure I2C
    let mut i2c = i2c::I2c::new_async(p.I2C0, scl, sda, Irqs, Default::default());

    // Create sensor instance, the variant is detected in begin()
    let mut sensor = SolderedSCD4x::new(&mut i2c, Delay);

    while let Err(e) = sensor.begin(BeginOptions::default()).await {
        error!("SCD4x begin failed: {}", e);
        Timer::after(Duration::from_secs(1)).await;
    }
    info!(
        "SCD4x ready: {}, CO2 range {}..={} ppm",
        sensor.sensor_type(),
        sensor.sensor_type().co2_range().start(),
        sensor.sensor_type().co2_range().end()
    );

    // Read sensor data
    loop {
        match sensor.read_measurement().await {
            Ok(data) => {
                info!(
                    "Temperature: {}°C, Humidity: {}%, CO2: {}",
                    data.temperature, data.humidity, data.co2
                );
            }
            Err(e) => match e {
                SCD4xError::NoData => info!("No data yet"),
                SCD4xError::I2CError(_) => error!("I2C communication error"),
                SCD4xError::CrcMismatch => error!("CRC mismatch"),
                e => error!("SCD4x error: {}", e),
            },
        }

        Timer::after(Duration::from_secs(5)).await;
    }
}
