use super::config::Config;
use crate::domain::Record;
use crate::framing::{Framer, HttpPostFramer};
use crate::shipper::{BackoffPolicy, Shipper, ShipperHandle};
use crate::spool::{SpoolBuffer, SpoolFile};
use crate::transport::{tcp::TcpTransportConfig, TcpTransport, Transport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Concurrency-safe entry point handed to producers. Cheap to clone; each
/// `submit` appends under the spool lock and wakes the shipper.
#[derive(Clone)]
pub struct Ingress {
    spool: Arc<SpoolBuffer>,
}

impl Ingress {
    pub fn submit(&self, record: impl Into<Record>) {
        self.spool.append(record.into());
    }
}

/// Lifecycle surface of the shipping pipeline: recover the spool snapshot,
/// start the single shipper, accept records, and shut down with persistence.
pub struct Forwarder {
    spool: Arc<SpoolBuffer>,
    spool_file: SpoolFile,
    stop: CancellationToken,
    shipper: Option<ShipperHandle>,
}

impl Forwarder {
    pub fn new(spool_file: SpoolFile) -> Self {
        Self {
            spool: Arc::new(SpoolBuffer::new()),
            spool_file,
            stop: CancellationToken::new(),
            shipper: None,
        }
    }

    /// Production wiring: TCP transport to the configured collector and HTTP
    /// POST framing. The shipper still has to be started with these.
    pub fn production_transport(config: &Config) -> (Box<dyn Transport>, Box<dyn Framer>) {
        let transport = TcpTransport::new(TcpTransportConfig {
            host: config.collector_host.clone(),
            port: config.collector_port,
            policy: config.send_policy,
            connect_timeout: config.connect_timeout,
            write_poll_timeout: config.write_poll_timeout,
            send_buffer_size: None,
        });
        (Box::new(transport), Box::new(HttpPostFramer::default()))
    }

    /// Load-then-delete any snapshot left by a previous run into the spool.
    ///
    /// Must run before `start` so the shipper and producers never contend
    /// with recovery. Recovered records sit at the head of the queue and are
    /// delivered before anything enqueued this run.
    pub async fn recover(&self) -> usize {
        match self.spool_file.load().await {
            Ok(records) => {
                let count = records.len();
                if count > 0 {
                    self.spool.restore(records);
                }
                count
            }
            Err(e) => {
                // Best-effort recovery: a snapshot we can't read yields
                // nothing, and the pipeline starts empty.
                error!(error = %e, "couldn't read spool snapshot, starting with an empty spool");
                0
            }
        }
    }

    /// Spawn the single background shipper. Calling twice is a bug in the
    /// surrounding application; the second call is refused with a warning.
    pub fn start(
        &mut self,
        transport: Box<dyn Transport>,
        framer: Box<dyn Framer>,
        backoff: BackoffPolicy,
    ) {
        if self.shipper.is_some() {
            warn!("shipper already running, ignoring second start");
            return;
        }

        let shipper = Shipper::new(
            self.spool.clone(),
            transport,
            framer,
            backoff,
            self.stop.clone(),
        );
        self.shipper = Some(shipper.spawn());
        info!("shipper started");
    }

    /// Ingress API: enqueue one record and wake the shipper.
    pub fn submit(&self, record: impl Into<Record>) {
        self.spool.append(record.into());
    }

    /// Handle for producer tasks.
    pub fn ingress(&self) -> Ingress {
        Ingress {
            spool: self.spool.clone(),
        }
    }

    /// Records currently awaiting delivery.
    pub fn pending(&self) -> usize {
        self.spool.len()
    }

    /// Request stop, wait until the shipper reaches Stopped, then persist
    /// whatever is still undelivered: the un-drained queue plus the unsent
    /// remainder the shipper requeued on its way out.
    ///
    /// A disk write failure here is logged and ignored; the process is
    /// already exiting and that unclean path accepts potential data loss.
    pub async fn shutdown(mut self) {
        info!("shutting down shipping pipeline");
        if let Some(handle) = self.shipper.take() {
            handle.stop().await;
        } else {
            self.stop.cancel();
        }

        let remaining: Vec<Record> = self.spool.drain_all().into_iter().collect();
        if let Err(e) = self.spool_file.save(&remaining).await {
            error!(
                error = %e,
                records = remaining.len(),
                "couldn't persist spool snapshot, undelivered records are lost"
            );
        }
        info!("shipping pipeline stopped");
    }
}
