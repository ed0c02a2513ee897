//! Outbound framing: wrapping one record into the bytes the collector's
//! protocol expects. The shipper treats this as an external collaborator and
//! only ever calls [`Framer::frame`], so swapping protocols means swapping
//! the framer, not touching the pipeline.

use crate::domain::Record;
use bytes::Bytes;

pub trait Framer: Send {
    fn frame(&self, record: &Record, endpoint: &str) -> Bytes;
}

/// Frames each record as an HTTP/1.1 POST with the endpoint identity in the
/// Host header and a Content-Length so the collector can split the stream
/// back into individual requests.
#[derive(Debug, Clone)]
pub struct HttpPostFramer {
    path: String,
    content_type: String,
}

impl Default for HttpPostFramer {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            content_type: "application/json".to_string(),
        }
    }
}

impl HttpPostFramer {
    pub fn new(path: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_type: content_type.into(),
        }
    }
}

impl Framer for HttpPostFramer {
    fn frame(&self, record: &Record, endpoint: &str) -> Bytes {
        let body = record.as_str();
        let request = format!(
            "POST {} HTTP/1.1\r\n\
             Host: {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             \r\n\
             {}",
            self.path,
            endpoint,
            self.content_type,
            body.len(),
            body
        );
        Bytes::from(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_frame_carries_host_and_content_length() {
        let framer = HttpPostFramer::default();
        let record = Record::from(r#"{"ok":true}"#);

        let framed = framer.frame(&record, "collector.example.com");
        let text = std::str::from_utf8(&framed).unwrap();

        assert!(text.starts_with("POST / HTTP/1.1\r\n"));
        assert!(text.contains("Host: collector.example.com\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.ends_with(r#"{"ok":true}"#));
    }
}
