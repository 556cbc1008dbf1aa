use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::fetcher::{AcceptType, Transport};
use crate::query::RequestDescriptor;

pub const EXPORT_FILE: &str = "export.csv";

/// Download the CSV for an export request and write it to
/// `dir/export.csv`, returning the path written.
pub async fn write_export(
    transport: &(dyn Transport + Send + Sync),
    request: &RequestDescriptor,
    dir: &Path,
) -> Result<PathBuf> {
    let body = transport.get(&request.uri(), AcceptType::Csv).await?;
    let path = dir.join(EXPORT_FILE);
    tokio::fs::write(&path, &body).await?;
    tracing::info!("Wrote {} bytes to {}", body.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SearchOptions;
    use crate::fetcher::fake::FakeTransport;
    use crate::query::{plan, ABSOLUTE_SEARCH, RELATIVE_SEARCH};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_export_writes_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "\"timestamp\",\"message\"\n\"2024-03-01T09:30:00.000Z\",\"hello\"\n";
        let transport = FakeTransport::new().respond(ABSOLUTE_SEARCH, csv);

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut options = SearchOptions::absolute(
            day.and_hms_opt(9, 0, 0).unwrap(),
            day.and_hms_opt(10, 0, 0).unwrap(),
        );
        options.fields = Some("timestamp,message".into());
        let request = plan(&options, &[]);

        let path = write_export(&transport, &request, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join(EXPORT_FILE));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);
        assert_eq!(transport.accept_types(), vec![AcceptType::Csv]);
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::new().respond(RELATIVE_SEARCH, "a,b\n");
        let request = plan(&SearchOptions::default(), &[]);

        let missing = dir.path().join("nope");
        assert!(write_export(&transport, &request, &missing).await.is_err());
    }
}
