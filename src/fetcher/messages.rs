use crate::app::Result;
use crate::domain::LogRecord;
use crate::fetcher::{AcceptType, Transport};
use crate::normalizer::Normalizer;
use crate::query::RequestDescriptor;
use crate::store::DedupCache;

/// Fetch, parse, order and deduplicate the messages for `request`.
///
/// Malformed messages are reported and skipped. Deduplication against `seen`
/// only happens for limited searches and always runs after sorting.
pub async fn fetch_records(
    transport: &(dyn Transport + Send + Sync),
    normalizer: &Normalizer,
    request: &RequestDescriptor,
    seen: &mut DedupCache,
) -> Result<Vec<LogRecord>> {
    let body = transport.get(&request.uri(), AcceptType::Json).await?;
    let batch = normalizer.messages(&body)?;

    for error in &batch.rejected {
        tracing::warn!("Skipping message: {}", error);
    }

    let mut records = batch.records;
    sort_by_timestamp(&mut records);

    if request.deduplicates() {
        records = seen.retain_unseen(records);
    }

    tracing::debug!("{} messages after deduplication", records.len());
    Ok(records)
}

/// Ascending by timestamp. The sort is stable, so messages sharing a
/// timestamp keep the order the server sent them in.
pub fn sort_by_timestamp(records: &mut [LogRecord]) {
    records.sort_by_key(|r| r.timestamp);
}
