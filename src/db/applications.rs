//! Admin read model over the record store. The full listing is cached and
//! every write invalidates it.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::AppState;
use crate::records::{
    normalize_page_id, ApplicationRecord, ApplicationUpdate, StoreError, STATUS_APPROVED, STATUS_REJECTED,
};

pub const APPLICATIONS_CACHE_KEY: &str = "applications";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApplicationStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl ApplicationStats {
    /// Anything that is neither approved nor rejected counts as pending.
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        records.iter().fold(
            Self {
                total: records.len(),
                ..Default::default()
            },
            |mut stats, record| {
                match record.status.as_str() {
                    STATUS_APPROVED => stats.approved += 1,
                    STATUS_REJECTED => stats.rejected += 1,
                    _ => stats.pending += 1,
                }
                stats
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BulkUpdateOutcome {
    pub updated_count: usize,
    pub total_count: usize,
    pub errors: Vec<String>,
}

impl AppState {
    /// Every application, newest submission first.
    pub async fn list_applications(&self) -> Result<Arc<Vec<ApplicationRecord>>, StoreError> {
        if let Some(cached) = self.application_cache.get(APPLICATIONS_CACHE_KEY).await {
            log::debug!("Serving {} applications from cache", cached.len());
            return Ok(cached);
        }

        let records = self.records()?;
        let database_id = records.resolve().await?;
        let applications = Arc::new(records.store().query_applications(&database_id, None).await?);
        self.application_cache
            .insert(APPLICATIONS_CACHE_KEY.to_string(), applications.clone())
            .await;
        Ok(applications)
    }

    /// Applications with the given status, or all of them.
    pub async fn applications_with_status(&self, status: Option<&str>) -> Result<Vec<ApplicationRecord>, StoreError> {
        match status.filter(|s| !s.is_empty()) {
            None => Ok(self.list_applications().await?.as_ref().clone()),
            Some(status) => {
                let records = self.records()?;
                let database_id = records.resolve().await?;
                records.store().query_applications(&database_id, Some(status)).await
            }
        }
    }

    pub async fn get_application(&self, page_id: &str) -> Result<ApplicationRecord, StoreError> {
        self.records()?.store().get_application(page_id).await
    }

    pub async fn update_application(&self, page_id: &str, update: &ApplicationUpdate) -> Result<(), StoreError> {
        let result = self.records()?.store().update_application(page_id, update).await;
        self.invalidate_applications().await;
        result
    }

    pub async fn set_application_status(&self, page_id: &str, status: &str) -> Result<(), StoreError> {
        self.update_application(page_id, &ApplicationUpdate::status(status)).await
    }

    /// Archive rather than delete; Notion keeps the page in its trash.
    pub async fn archive_application(&self, page_id: &str) -> Result<(), StoreError> {
        let result = self.records()?.store().archive_application(page_id).await;
        self.invalidate_applications().await;
        result
    }

    /// Set `status` on every page in `page_ids`, collecting per-page failures.
    pub async fn bulk_update_status(&self, page_ids: &[String], status: &str) -> Result<BulkUpdateOutcome, StoreError> {
        let store = self.records()?.store();
        let update = ApplicationUpdate::status(status);
        let mut outcome = BulkUpdateOutcome {
            total_count: page_ids.len(),
            ..Default::default()
        };

        for raw_id in page_ids {
            let Some(page_id) = normalize_page_id(raw_id) else {
                log::warn!("Bulk update skipped invalid ID {:?}", raw_id);
                outcome.errors.push(format!("Invalid application ID: {raw_id}"));
                continue;
            };
            match store.update_application(&page_id, &update).await {
                Ok(()) => outcome.updated_count += 1,
                Err(e) => {
                    log::error!("Bulk update of {} failed: {}", page_id, e);
                    outcome.errors.push(format!("Failed to update {page_id}: {e}"));
                }
            }
        }

        self.invalidate_applications().await;
        Ok(outcome)
    }

    pub async fn application_stats(&self) -> Result<ApplicationStats, StoreError> {
        let applications = self.list_applications().await?;
        Ok(ApplicationStats::from_records(&applications))
    }

    pub async fn invalidate_applications(&self) {
        self.application_cache.invalidate(APPLICATIONS_CACHE_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(status: &str) -> ApplicationRecord {
        ApplicationRecord {
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_count_unknown_status_as_pending() {
        let records = vec![
            with_status("Approved"),
            with_status("Rejected"),
            with_status("Pending Review"),
            with_status("Waitlisted"),
            with_status("Approved"),
        ];
        let stats = ApplicationStats::from_records(&records);
        assert_eq!(
            stats,
            ApplicationStats {
                total: 5,
                approved: 2,
                pending: 2,
                rejected: 1,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(ApplicationStats::from_records(&[]), ApplicationStats::default());
    }
}
