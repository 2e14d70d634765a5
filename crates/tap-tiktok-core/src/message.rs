//! Singer `RECORD` messages written as newline-delimited JSON.

use std::io::Write;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::extract::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Record,
}

/// One extracted record tagged with its stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub stream: String,
    pub record: Record,
    pub time_extracted: String,
}

impl RecordMessage {
    pub fn new(stream: impl Into<String>, record: Record, extracted_at: OffsetDateTime) -> Self {
        Self {
            message_type: MessageType::Record,
            stream: stream.into(),
            record,
            time_extracted: extracted_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| extracted_at.to_string()),
        }
    }
}

/// Writes one message per line and flushes after each.
pub struct MessageWriter<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write_record(&mut self, stream: &str, record: Record) -> std::io::Result<()> {
        let message = RecordMessage::new(stream, record, OffsetDateTime::now_utc());
        self.write_message(&message)
    }

    pub fn write_message(&mut self, message: &RecordMessage) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
