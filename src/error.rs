use std::path::PathBuf;

use thiserror::Error;

use crate::models::FailurePayload;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// No CSV has been uploaded yet.
    #[error("No data available at {}. Please upload a CSV file.", .path.display())]
    NoData { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to process data: {0}")]
    Csv(#[from] csv::Error),
}

impl DashboardError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, DashboardError::NoData { .. })
    }
}

impl From<&DashboardError> for FailurePayload {
    fn from(err: &DashboardError) -> Self {
        match err {
            DashboardError::NoData { .. } => FailurePayload {
                error: err.to_string(),
                details: None,
            },
            DashboardError::Read { source, .. } => FailurePayload {
                error: "Failed to process data".to_string(),
                details: Some(source.to_string()),
            },
            DashboardError::Csv(source) => FailurePayload {
                error: "Failed to process data".to_string(),
                details: Some(source.to_string()),
            },
        }
    }
}
