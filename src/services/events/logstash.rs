use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::sink::{EventSink, HealthEvent};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Ships health events to logstash as newline-delimited JSON over TCP.
///
/// `version` selects the document layout understood by the logstash `json`
/// codec: 0 nests the event fields under `@fields`, 1 keeps them flat.
pub struct LogstashSink {
    addr: String,
    message_type: String,
    version: u8,
    source_host: String,
    stream: Mutex<Option<TcpStream>>,
}

impl LogstashSink {
    pub fn new(host: &str, port: u16, message_type: &str, version: u8) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            message_type: message_type.to_string(),
            version,
            source_host: std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string()),
            stream: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Build the logstash document for an event
    pub fn format(&self, event: &HealthEvent) -> Value {
        let timestamp = event.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        if self.version == 0 {
            let mut fields = event.fields.clone();
            fields.insert("levelname".to_string(), json!(event.severity.level_name()));
            fields.insert("logger".to_string(), json!(self.message_type));

            json!({
                "@timestamp": timestamp,
                "@message": event.message,
                "@source": format!("Logstash://{}/{}", self.source_host, self.message_type),
                "@source_host": self.source_host,
                "@source_path": self.message_type,
                "@tags": [],
                "@type": self.message_type,
                "@fields": Value::Object(fields),
            })
        } else {
            let mut doc = Map::new();
            for (key, value) in &event.fields {
                doc.insert(key.clone(), value.clone());
            }
            doc.insert("@timestamp".to_string(), json!(timestamp));
            doc.insert("@version".to_string(), json!("1"));
            doc.insert("message".to_string(), json!(event.message));
            doc.insert("host".to_string(), json!(self.source_host));
            doc.insert("path".to_string(), json!(self.message_type));
            doc.insert("tags".to_string(), json!([]));
            doc.insert("type".to_string(), json!(self.message_type));
            doc.insert("level".to_string(), json!(event.severity.level_name()));
            doc.insert("logger_name".to_string(), json!(self.message_type));
            Value::Object(doc)
        }
    }

    async fn connect(&self) -> io::Result<TcpStream> {
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?
    }

    /// At most once per line: a line is only resent when none of it reached
    /// the socket, otherwise it is dropped
    async fn send(&self, line: &[u8]) -> io::Result<()> {
        let mut guard = self.stream.lock().await;

        // A stale connection is only detected on write; reconnect once
        for attempt in 0..2 {
            if guard.is_none() {
                *guard = Some(self.connect().await?);
            }
            let Some(stream) = guard.as_mut() else {
                continue;
            };

            match write_line(stream, line).await {
                Ok(()) => return Ok(()),
                Err(WriteFailure::Untouched(e)) if attempt == 0 => {
                    tracing::debug!("Logstash connection to {} lost: {}", self.addr, e);
                    *guard = None;
                }
                Err(WriteFailure::Untouched(e)) | Err(WriteFailure::Partial(e)) => {
                    *guard = None;
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
enum WriteFailure {
    /// Nothing was written
    Untouched(io::Error),
    /// Part of the line is already on the wire
    Partial(io::Error),
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &[u8]) -> Result<(), WriteFailure> {
    let mut written = 0;

    while written < line.len() {
        let result: Result<(), io::Error> = match writer.write(&line[written..]).await {
            Ok(0) => Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => {
                written += n;
                continue;
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            return Err(if written == 0 {
                WriteFailure::Untouched(e)
            } else {
                WriteFailure::Partial(e)
            });
        }
    }

    Ok(())
}

#[async_trait]
impl EventSink for LogstashSink {
    async fn emit(&self, event: HealthEvent) {
        let mut line = match serde_json::to_vec(&self.format(&event)) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Cannot encode logstash event: {}", e);
                return;
            }
        };
        line.push(b'\n');

        if let Err(e) = self.send(&line).await {
            tracing::warn!("Failed to ship event to logstash at {}: {}", self.addr, e);
        }
    }
}
