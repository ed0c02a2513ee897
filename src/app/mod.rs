pub mod config;
pub mod logging;
pub mod service;
pub mod shutdown;

pub use config::{Config, ConfigError, LogLevel};
pub use service::{Forwarder, Ingress};

use crate::sensor::Sensor;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Main entry point for the forwarder binary: parse configuration, recover
/// the spool, start the shipper, run the sensor producers, and shut down
/// gracefully on SIGINT/SIGTERM.
pub async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_args(std::env::args())?;
    if let Some(config_file) = &config.config_file {
        eprintln!("Loading configuration from file: {}", config_file.display());
        config = Config::from_file(config_file)?;
    }

    logging::setup(config.log_level);
    info!(
        version = crate::VERSION,
        collector = %format!("{}:{}", config.collector_host, config.collector_port),
        spool = %config.spool_path.display(),
        sensors = config.sensors,
        "starting pulse-forwarder"
    );

    let mut forwarder = Forwarder::new(crate::spool::SpoolFile::new(&config.spool_path));
    let recovered = forwarder.recover().await;
    if recovered > 0 {
        info!(records = recovered, "re-queued records from previous run");
    }

    let (transport, framer) = Forwarder::production_transport(&config);
    forwarder.start(transport, framer, config.backoff_policy());

    // Producer tasks: each sensor alternates dummy work with submitting its
    // current state, until shutdown is requested.
    let producer_stop = CancellationToken::new();
    let producers: Vec<_> = (0..config.sensors)
        .map(|_| {
            let ingress = forwarder.ingress();
            let stop = producer_stop.clone();
            tokio::spawn(async move {
                let sensor = Sensor::new();
                loop {
                    tokio::select! {
                        () = sensor.work() => ingress.submit(sensor.state()),
                        () = stop.cancelled() => break,
                    }
                }
            })
        })
        .collect();

    shutdown::wait_for_signal().await;

    producer_stop.cancel();
    for producer in producers {
        let _ = producer.await;
    }

    forwarder.shutdown().await;
    info!("pulse-forwarder stopped");
    Ok(())
}
