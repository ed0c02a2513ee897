use async_trait::async_trait;
use pulse_forwarder::app::Forwarder;
use pulse_forwarder::domain::Record;
use pulse_forwarder::framing::HttpPostFramer;
use pulse_forwarder::shipper::BackoffPolicy;
use pulse_forwarder::spool::{decode, encode, SpoolFile};
use pulse_forwarder::transport::{ConnectError, SendError, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Transport stuck behind a dead collector: every connect and send fails.
#[derive(Clone, Default)]
struct DeadTransport {
    send_attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for DeadTransport {
    async fn connect(&mut self) -> Result<(), ConnectError> {
        Err(ConnectError::Resolve("collector.test:9600".to_string()))
    }

    async fn send(&mut self, _payload: &[u8]) -> Result<(), SendError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        Err(SendError::NotConnected)
    }

    fn endpoint(&self) -> &str {
        "collector.test"
    }
}

fn records(payloads: &[&str]) -> Vec<Record> {
    payloads.iter().map(|p| Record::from(*p)).collect()
}

// Shutdown with the shipper never started: everything submitted lands in the
// spool snapshot, in order.
#[tokio::test]
async fn shutdown_persists_unsent_records_without_a_shipper() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spool.bin");

    let forwarder = Forwarder::new(SpoolFile::new(&path));
    forwarder.submit("one");
    forwarder.submit("two");
    forwarder.submit("three");
    assert_eq!(forwarder.pending(), 3);
    forwarder.shutdown().await;

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(decode(&bytes), records(&["one", "two", "three"]));
}

// Shutdown while the shipper is stuck reconnecting: the drained-but-unsent
// batch remainder is requeued and persisted together with anything still in
// the queue, in the original order.
#[tokio::test(start_paused = true)]
async fn shutdown_persists_the_batch_a_dead_collector_never_took() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spool.bin");

    let transport = DeadTransport::default();
    let mut forwarder = Forwarder::new(SpoolFile::new(&path));
    forwarder.start(
        Box::new(transport.clone()),
        Box::new(HttpPostFramer::default()),
        BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(60)),
    );

    forwarder.submit("alpha");
    forwarder.submit("beta");

    // Let the shipper drain and hit the dead collector before stopping it.
    for _ in 0..1_000 {
        if transport.send_attempts.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(transport.send_attempts.load(Ordering::SeqCst) > 0);

    forwarder.shutdown().await;

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(decode(&bytes), records(&["alpha", "beta"]));
}

// Startup recovery: a snapshot from a previous run is loaded into the spool
// ahead of new submissions, and the file is deleted once read.
#[tokio::test]
async fn recover_requeues_snapshot_records_before_new_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spool.bin");
    std::fs::write(&path, encode(&records(&["old-1", "old-2"]))).unwrap();

    let forwarder = Forwarder::new(SpoolFile::new(&path));
    let recovered = forwarder.recover().await;
    assert_eq!(recovered, 2);
    assert!(!path.exists(), "snapshot must be deleted after recovery");

    forwarder.submit("new-1");
    assert_eq!(forwarder.pending(), 3);

    // Shut down again: recovered and new records persist together, with the
    // recovered ones still first.
    forwarder.shutdown().await;
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(decode(&bytes), records(&["old-1", "old-2", "new-1"]));
}

// A clean run that delivered everything leaves no snapshot behind.
#[tokio::test]
async fn clean_shutdown_writes_no_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spool.bin");

    let forwarder = Forwarder::new(SpoolFile::new(&path));
    forwarder.shutdown().await;
    assert!(!path.exists());
}

// A corrupt snapshot degrades to fewer recovered records instead of failing
// startup.
#[tokio::test]
async fn corrupt_snapshot_degrades_instead_of_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spool.bin");
    std::fs::write(&path, b"not a snapshot at all").unwrap();

    let forwarder = Forwarder::new(SpoolFile::new(&path));
    assert_eq!(forwarder.recover().await, 0);
    assert_eq!(forwarder.pending(), 0);
}
