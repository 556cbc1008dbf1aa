//! Enabled Graylog streams, fetched once per run.
//!
//! Names given on the command line resolve to ids by case-insensitive
//! prefix match on the title. When several titles match, the first one in
//! title order wins, so resolution does not depend on server ordering.

use std::collections::HashMap;

use crate::app::{GraytailError, Result};
use crate::domain::StreamDescriptor;
use crate::fetcher::{AcceptType, Transport};
use crate::normalizer::Normalizer;
use crate::query::streams_request;

#[derive(Debug, Default)]
pub struct StreamDirectory {
    streams: Option<Vec<StreamDescriptor>>,
    by_id: HashMap<String, usize>,
}

impl StreamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory populated up front, without going to the server.
    pub fn from_streams(streams: Vec<StreamDescriptor>) -> Self {
        let mut directory = Self::new();
        directory.populate(streams);
        directory
    }

    pub fn is_loaded(&self) -> bool {
        self.streams.is_some()
    }

    /// Fetch the stream list unless it was already fetched during this run.
    pub async fn load(
        &mut self,
        transport: &(dyn Transport + Send + Sync),
        normalizer: &Normalizer,
    ) -> Result<&[StreamDescriptor]> {
        if !self.is_loaded() {
            let body = transport
                .get(&streams_request().uri(), AcceptType::Json)
                .await?;
            let streams = normalizer.streams(&body)?;
            tracing::debug!("Loaded {} enabled streams", streams.len());
            self.populate(streams);
        }
        Ok(self.list())
    }

    /// Enabled streams ordered by title, ignoring case.
    pub fn list(&self) -> &[StreamDescriptor] {
        self.streams.as_deref().unwrap_or(&[])
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.by_id
            .get(id)
            .and_then(|&i| self.list().get(i))
            .map(|s| s.title.as_str())
    }

    /// First stream whose title starts with `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<&StreamDescriptor> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.list()
            .iter()
            .find(|s| s.title.to_lowercase().starts_with(&name))
    }

    /// Resolve comma-separated `names` against the loaded streams.
    ///
    /// Names that match nothing are skipped with a warning. If names were
    /// given but none resolved, the whole resolution fails rather than
    /// silently searching every stream.
    pub fn resolve_names(&self, names: &str) -> Result<Vec<String>> {
        let requested: Vec<&str> = names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        let mut ids: Vec<String> = Vec::new();
        for name in &requested {
            match self.find(name) {
                Some(stream) => {
                    if !ids.contains(&stream.id) {
                        ids.push(stream.id.clone());
                    }
                }
                None => tracing::warn!("No enabled stream matches {:?}", name),
            }
        }

        if ids.is_empty() && !names.trim().is_empty() {
            let shown = if requested.is_empty() {
                format!("{:?}", names.trim())
            } else {
                requested.join(", ")
            };
            return Err(GraytailError::Resolution(shown));
        }
        Ok(ids)
    }

    /// Load if needed, then [`resolve_names`](Self::resolve_names).
    pub async fn resolve(
        &mut self,
        transport: &(dyn Transport + Send + Sync),
        normalizer: &Normalizer,
        names: &str,
    ) -> Result<Vec<String>> {
        self.load(transport, normalizer).await?;
        self.resolve_names(names)
    }

    fn populate(&mut self, streams: Vec<StreamDescriptor>) {
        let mut streams: Vec<StreamDescriptor> =
            streams.into_iter().filter(|s| !s.disabled).collect();
        streams.sort_by_cached_key(|s| s.title.to_lowercase());

        self.by_id = streams
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        self.streams = Some(streams);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::fake::FakeTransport;
    use crate::query::STREAMS;

    fn directory() -> StreamDirectory {
        let mut disabled = StreamDescriptor::new("9", "Production Archive");
        disabled.disabled = true;
        StreamDirectory::from_streams(vec![
            StreamDescriptor::new("3", "staging"),
            StreamDescriptor::new("1", "Production Logs"),
            StreamDescriptor::new("2", "Prod Metrics"),
            disabled,
        ])
    }

    #[test]
    fn test_list_sorted_by_title_without_disabled() {
        let directory = directory();
        let titles: Vec<&str> = directory.list().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Prod Metrics", "Production Logs", "staging"]);
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let directory = directory();
        assert_eq!(directory.resolve_names("production").unwrap(), vec!["1"]);
        assert_eq!(directory.resolve_names("STAG").unwrap(), vec!["3"]);
    }

    #[test]
    fn test_ambiguous_prefix_takes_first_in_title_order() {
        let directory = directory();
        assert_eq!(directory.resolve_names("prod").unwrap(), vec!["2"]);
    }

    #[test]
    fn test_prod_resolves_to_production_logs() {
        let directory =
            StreamDirectory::from_streams(vec![StreamDescriptor::new("abc", "Production Logs")]);
        assert_eq!(directory.resolve_names("prod").unwrap(), vec!["abc"]);
    }

    #[test]
    fn test_unmatched_names_are_skipped() {
        let directory = directory();
        assert_eq!(
            directory.resolve_names("nope, staging,,production").unwrap(),
            vec!["3", "1"]
        );
    }

    #[test]
    fn test_nothing_resolved_is_error() {
        let directory = directory();
        let err = directory.resolve_names("nope").unwrap_err();
        assert!(matches!(err, GraytailError::Resolution(_)));
        assert!(err.is_fatal());

        assert!(directory.resolve_names("archive").is_err());
    }

    #[test]
    fn test_only_separators_is_error() {
        let directory = directory();
        for names in [",", " , ", ",,"] {
            let err = directory.resolve_names(names).unwrap_err();
            assert!(matches!(err, GraytailError::Resolution(_)));
        }
        assert!(directory.resolve_names("").unwrap().is_empty());
    }

    #[test]
    fn test_title_lookup() {
        let directory = directory();
        assert_eq!(directory.title("1"), Some("Production Logs"));
        assert_eq!(directory.title("9"), None);
    }

    #[test]
    fn test_load_fetches_once() {
        let transport = FakeTransport::new().respond(
            STREAMS,
            r#"{"streams":[{"id":"1","title":"Production Logs","disabled":false}]}"#,
        );
        let normalizer = Normalizer::new();
        let mut directory = StreamDirectory::new();

        tokio_test::block_on(async {
            directory.load(&transport, &normalizer).await.unwrap();
            let ids = directory
                .resolve(&transport, &normalizer, "prod")
                .await
                .unwrap();
            assert_eq!(ids, vec!["1"]);
        });

        assert_eq!(transport.count(STREAMS), 1);
    }
}
