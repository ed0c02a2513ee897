/// One opaque unit of telemetry, captured at the moment a producer enqueued it.
///
/// This is the canonical representation of a record throughout the pipeline,
/// from producer output through spooling to transport input. The core never
/// inspects its contents; whatever text the producer hands over is delivered
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(String);

impl Record {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Record {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl From<&str> for Record {
    fn from(payload: &str) -> Self {
        Self(payload.to_string())
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
