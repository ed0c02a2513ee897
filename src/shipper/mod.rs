//! The shipper: the single background consumer that drains the spool, frames
//! each record, and pushes it through the transport, driving
//! reconnect-with-backoff on failure.
//!
//! There is deliberately exactly one shipper task. When connectivity is lost,
//! one task retries the connection instead of a herd of producers, and at
//! shutdown one task's local state plus the spool is everything that needs
//! persisting.

pub mod backoff;

pub use backoff::BackoffPolicy;

use crate::domain::Record;
use crate::framing::Framer;
use crate::spool::SpoolBuffer;
use crate::transport::Transport;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Shipper {
    spool: Arc<SpoolBuffer>,
    transport: Box<dyn Transport>,
    framer: Box<dyn Framer>,
    backoff: BackoffPolicy,
    stop: CancellationToken,
}

/// Handle to a running shipper task. Cancelling the token asks the shipper to
/// finish its current atomic step and stop; `stop()` also waits for that.
pub struct ShipperHandle {
    stop: CancellationToken,
    join: JoinHandle<()>,
}

impl ShipperHandle {
    pub async fn stop(self) {
        self.stop.cancel();
        if let Err(e) = self.join.await {
            warn!(error = %e, "shipper task did not stop cleanly");
        }
    }
}

impl Shipper {
    pub fn new(
        spool: Arc<SpoolBuffer>,
        transport: Box<dyn Transport>,
        framer: Box<dyn Framer>,
        backoff: BackoffPolicy,
        stop: CancellationToken,
    ) -> Self {
        Self {
            spool,
            transport,
            framer,
            backoff,
            stop,
        }
    }

    pub fn spawn(self) -> ShipperHandle {
        let stop = self.stop.clone();
        let join = tokio::spawn(self.run());
        ShipperHandle { stop, join }
    }

    /// Idle → Draining → Sending loop, until stop is requested.
    pub async fn run(mut self) {
        loop {
            // Idle: wait for data or a stop request.
            tokio::select! {
                () = self.spool.data_ready() => {}
                () = self.stop.cancelled() => break,
            }
            if self.stop.is_cancelled() {
                break;
            }

            // Draining: take the whole pending batch in one critical section.
            // Anything enqueued from here on belongs to the next cycle; the
            // wakeup for it is retained and re-checked at the top of the loop,
            // so nothing is stranded even if its notification raced this drain.
            let batch = self.spool.drain_all();
            if batch.is_empty() {
                // Spurious wakeup; nothing to send.
                continue;
            }
            debug!(records = batch.len(), "shipper drained pending batch");

            if !self.send_batch(batch).await {
                break;
            }
        }
        info!("shipper stopped");
    }

    /// Sending: deliver the batch in order, one record to completion at a
    /// time. Returns `false` when a stop request interrupted the batch, after
    /// requeueing the unsent remainder (including the in-flight record) at
    /// the front of the spool for shutdown persistence.
    async fn send_batch(&mut self, mut batch: VecDeque<Record>) -> bool {
        while let Some(record) = batch.pop_front() {
            // Stop is honored between records, never mid-write of one.
            if self.stop.is_cancelled() {
                batch.push_front(record);
                self.spool.requeue_front(batch);
                return false;
            }

            let payload = self.framer.frame(&record, self.transport.endpoint());

            loop {
                match self.transport.send(&payload).await {
                    Ok(()) => break,
                    Err(e) => {
                        warn!(error = %e, "send failed, treating connection as lost");
                        if !self.reconnect().await {
                            batch.push_front(record);
                            self.spool.requeue_front(batch);
                            return false;
                        }
                        // Reconnected; retry the same record.
                    }
                }
            }
        }
        debug!("shipper delivered batch");
        true
    }

    /// Reconnecting: try immediately, then sleep the doubling backoff between
    /// attempts so an unreachable collector isn't hammered. Retries until it
    /// succeeds or a stop request arrives during a backoff sleep; returns
    /// `false` only for the latter.
    async fn reconnect(&mut self) -> bool {
        loop {
            match self.transport.connect().await {
                Ok(()) => {
                    self.backoff.reset();
                    info!(endpoint = self.transport.endpoint(), "connection re-established");
                    return true;
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        error = %e,
                        backoff = ?delay,
                        "couldn't reach collector, backing off before next attempt"
                    );
                    tokio::select! {
                        () = sleep(delay) => {}
                        () = self.stop.cancelled() => return false,
                    }
                }
            }
        }
    }
}
