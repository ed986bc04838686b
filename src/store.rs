use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::DashboardError;
use crate::models::Dashboard;
use crate::pipeline;

pub const DEFAULT_CSV_PATH: &str = "data/latest.csv";

/// Reads the most recently uploaded export.
pub async fn load_latest(path: &Path) -> Result<Vec<u8>, DashboardError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(DashboardError::NoData {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(DashboardError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the stored export and builds the dashboard from it.
pub async fn dashboard_from_path(
    path: &Path,
    now: DateTime<Utc>,
) -> Result<Dashboard, DashboardError> {
    let bytes = load_latest(path).await?;
    info!(path = %path.display(), bytes = bytes.len(), "CSV file found, processing");
    pipeline::read_dashboard(bytes.as_slice(), now)
}
