//! Output sinks for crawl records.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::SinkError;
use crate::models::OutputRecord;

/// Destination for emitted records.
#[async_trait]
pub trait RecordSink: Send {
    async fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError>;

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[async_trait]
impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    async fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        (**self).emit(record).await
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush().await
    }
}

/// Writes one JSON object per line. Each record is flushed as it is written.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl JsonLinesSink<BufWriter<tokio::io::Stdout>> {
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(tokio::io::stdout()))
    }
}

impl JsonLinesSink<BufWriter<tokio::fs::File>> {
    /// Create (or truncate) the file at `path`.
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RecordSink for JsonLinesSink<W> {
    async fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<OutputRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<OutputRecord> {
        self.records
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn emit(&mut self, record: &OutputRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}
