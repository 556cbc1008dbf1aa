use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::error::Result;
use crate::config::{Config, ConfigError, FormatDefinition};
use crate::domain::{LogRecord, OutputMode, SearchOptions, StreamDescriptor};
use crate::fetcher::export::write_export;
use crate::fetcher::http_fetcher::HttpTransport;
use crate::fetcher::{fetch_records, Transport};
use crate::normalizer::Normalizer;
use crate::query::RequestDescriptor;
use crate::render::Renderer;
use crate::store::DedupCache;
use crate::streams::StreamDirectory;

/// State for one run: the server connection plus the stream directory and
/// dedup cache that live for as long as the process does.
pub struct AppContext {
    pub transport: Arc<dyn Transport + Send + Sync>,
    pub normalizer: Normalizer,
    pub streams: StreamDirectory,
    pub seen: DedupCache,
    pub renderer: Renderer,
}

impl AppContext {
    pub fn new(config: &Config, output: OutputMode, interactive: bool) -> Result<Self> {
        let transport: Arc<dyn Transport + Send + Sync> =
            Arc::new(HttpTransport::new(&config.server)?);
        Self::with_transport(transport, &config.formats(), output, interactive)
    }

    pub fn with_transport(
        transport: Arc<dyn Transport + Send + Sync>,
        formats: &[FormatDefinition],
        output: OutputMode,
        interactive: bool,
    ) -> Result<Self> {
        let renderer = Renderer::new(formats, output, interactive).map_err(ConfigError::from)?;

        Ok(Self {
            transport,
            normalizer: Normalizer::new(),
            streams: StreamDirectory::new(),
            seen: DedupCache::default(),
            renderer,
        })
    }

    pub async fn load_streams(&mut self) -> Result<&[StreamDescriptor]> {
        self.streams
            .load(self.transport.as_ref(), &self.normalizer)
            .await
    }

    /// Stream ids for the names in `options`; empty when no names were given.
    pub async fn resolve_streams(&mut self, options: &SearchOptions) -> Result<Vec<String>> {
        match options.stream_names() {
            Some(names) => {
                self.streams
                    .resolve(self.transport.as_ref(), &self.normalizer, names)
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// One search: new records in ascending time order, with the stream
    /// directory loaded so they can be rendered.
    pub async fn poll(&mut self, request: &RequestDescriptor) -> Result<Vec<LogRecord>> {
        let records = fetch_records(
            self.transport.as_ref(),
            &self.normalizer,
            request,
            &mut self.seen,
        )
        .await?;
        self.load_streams().await?;
        Ok(records)
    }

    pub fn render(&self, record: &LogRecord) -> String {
        self.renderer.render(record, &self.streams)
    }

    pub async fn export(&self, request: &RequestDescriptor, dir: &Path) -> Result<PathBuf> {
        write_export(self.transport.as_ref(), request, dir).await
    }
}
