use crate::domain::Record;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Ordered, unbounded queue of records awaiting delivery.
///
/// Producers append concurrently; the shipper is the only consumer. The mutex
/// around the queue is the sole piece of shared mutable state in the pipeline,
/// and no caller holds it across an await point.
///
/// The queue is deliberately unbounded: producers here are rate-limited
/// sensors, and losing telemetry is worse than growing memory. A hardened
/// variant would cap it and define an overflow policy.
#[derive(Debug, Default)]
pub struct SpoolBuffer {
    queue: Mutex<VecDeque<Record>>,
    notify: Notify,
}

impl SpoolBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record and wake the shipper if it is idle.
    ///
    /// Never blocks beyond the queue lock and never fails. If the shipper is
    /// mid-send the wakeup is simply retained; the shipper re-checks queue
    /// state before every wait, so accumulated appends are picked up on its
    /// next drain rather than relying on signal delivery.
    pub fn append(&self, record: Record) {
        self.queue.lock().push_back(record);
        self.notify.notify_one();
    }

    /// Atomically take ownership of everything currently queued.
    ///
    /// A single critical section, so no append can interleave mid-drain.
    pub fn drain_all(&self) -> VecDeque<Record> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Put an unsent batch remainder back at the head of the queue, ahead of
    /// anything enqueued while the batch was in flight. Keeps retried records
    /// in their original delivery order.
    pub fn requeue_front(&self, batch: VecDeque<Record>) {
        let mut queue = self.queue.lock();
        for record in batch.into_iter().rev() {
            queue.push_front(record);
        }
    }

    /// Bulk append, used when restoring a decoded snapshot at startup.
    pub fn restore(&self, records: Vec<Record>) {
        let mut queue = self.queue.lock();
        queue.extend(records);
        drop(queue);
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Wait until the queue is non-empty.
    ///
    /// Emptiness is re-checked on every wakeup, so a notification consumed
    /// while the shipper was busy can never strand queued records.
    pub async fn data_ready(&self) {
        loop {
            if !self.is_empty() {
                return;
            }
            self.notify.notified().await;
        }
    }
}
