//! The reporting year the dashboards work in

use crate::RegistryResult;
use chrono::{DateTime, Datelike, Utc};
use parish_core::humanize::local_today;
use parish_core::models::ChurchYear;
use parish_storage::OrganisationStore;
use tracing::info;

/// Make the calendar year of `now` the only current year
pub async fn ensure_current_year(
    organisation: &dyn OrganisationStore,
    now: DateTime<Utc>,
) -> RegistryResult<ChurchYear> {
    let year = local_today(now).year();
    let years = organisation.list_years().await?;

    if let Some(current) = years.iter().find(|y| y.is_current) {
        if current.year == year {
            return Ok(current.clone());
        }
        let mut outdated = current.clone();
        outdated.is_current = false;
        organisation.save_year(&outdated).await?;
    }

    let mut entry = years
        .into_iter()
        .find(|y| y.year == year)
        .unwrap_or_else(|| ChurchYear::new(year));
    entry.is_current = true;
    organisation.save_year(&entry).await?;
    info!(year, "Current church year set");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parish_storage::MemoryStore;

    #[tokio::test]
    async fn test_rolls_over_to_new_year() {
        let store = MemoryStore::new();
        let december = Utc.with_ymd_and_hms(2024, 12, 30, 10, 0, 0).unwrap();

        let first = ensure_current_year(&store, december).await.unwrap();
        assert_eq!(first.year, 2024);
        assert!(first.is_current);

        let again = ensure_current_year(&store, december).await.unwrap();
        assert_eq!(again.id, first.id);

        // 22:00 UTC on 31 December is already the new year in Tanzania
        let new_year = Utc.with_ymd_and_hms(2024, 12, 31, 22, 0, 0).unwrap();
        let next = ensure_current_year(&store, new_year).await.unwrap();
        assert_eq!(next.year, 2025);

        let years = store.list_years().await.unwrap();
        assert_eq!(years.len(), 2);
        assert_eq!(years.iter().filter(|y| y.is_current).count(), 1);
        assert!(!years[0].is_current);
    }
}
