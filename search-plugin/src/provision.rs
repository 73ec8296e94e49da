//! Startup index provisioning.
//!
//! Runs once in the pre-start phase: every configured index that does not
//! exist yet is created. Existing indices are left untouched, so the routine
//! is safe to repeat on every start.

use tracing::{debug, info, instrument};

use search_plugin_repository::IndexProvider;

use crate::errors::PluginError;

/// Outcome of a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Indices created by this run, in order.
    pub created: Vec<String>,
    /// Indices that already existed.
    pub existing: Vec<String>,
}

/// Ensure every index in `indices` exists, in order.
///
/// The first failing existence check or create request aborts the run.
/// Indices created before the failure are kept.
#[instrument(skip(client), fields(count = indices.len()))]
pub async fn ensure_indices<C>(client: &C, indices: &[String]) -> Result<ProvisionReport, PluginError>
where
    C: IndexProvider + ?Sized,
{
    let mut report = ProvisionReport::default();

    for index in indices {
        let exists = client
            .index_exists(&[index.as_str()])
            .await
            .map_err(|e| PluginError::provisioning(index, e))?;

        if exists {
            debug!(index = %index, "Index already exists");
            report.existing.push(index.clone());
            continue;
        }

        client
            .create_index(index)
            .await
            .map_err(|e| PluginError::provisioning(index, e))?;
        report.created.push(index.clone());
    }

    info!(
        created = report.created.len(),
        existing = report.existing.len(),
        "Indices provisioned"
    );
    Ok(report)
}
