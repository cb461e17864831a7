use clap::Parser;
use log::{error, info};
use mqtt_smoke_sensor::config::{self, Config};
use mqtt_smoke_sensor::input::mqtt::SmokeSensorBridge;
use mqtt_smoke_sensor::sensor::LogHostBinding;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{Duration, interval};

#[derive(Parser, Debug)]
#[command(author, version, about = "Expose an MQTT smoke detector as smart-home status values")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, env = "SMOKE_SENSOR_CONFIG")]
    config: Option<PathBuf>,

    /// Read all four values every N seconds, like a host would (0 disables).
    #[arg(long, env = "SMOKE_SENSOR_POLL_SECS", default_value_t = 0)]
    poll_secs: u64,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    config::load_dotenv();
    init_logger();

    let args = Args::parse();
    info!("Starting MQTT Smoke Sensor");

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded:");
    info!("  Device Name: {}", config.accessory.name);
    info!("  Manufacturer: {}", config.accessory.manufacturer);
    info!("  Model: {}", config.accessory.model);
    info!("  Serial: {}", config.accessory.serial);
    info!("  MQTT Broker: {}", config.mqtt.broker);

    let bridge = match SmokeSensorBridge::start(&config, Arc::new(LogHostBinding)) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("Failed to start smoke sensor: {}", e);
            std::process::exit(1);
        }
    };

    // Poll like a host would, so get-topics can be exercised without one
    let poll_task = (args.poll_secs > 0).then(|| {
        let accessor = bridge.accessor().clone();
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(args.poll_secs));
            loop {
                interval.tick().await;
                info!(
                    "Smoke: {}, Battery: {}, Tampered: {}, Fault: {}",
                    accessor.get_smoke_detected(),
                    accessor.get_low_battery(),
                    accessor.get_tampered(),
                    accessor.get_fault()
                );
            }
        })
    });

    info!("MQTT Smoke Sensor is running, press Ctrl+C to exit");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Some(task) = poll_task {
        task.abort();
    }
    bridge.shutdown().await;

    info!("MQTT Smoke Sensor stopped");
}
