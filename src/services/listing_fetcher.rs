use crate::domain::{filter::FilterCombination, job_record::JobRecord};

use super::{ListingSource, ScrapeError};

/// Walks every page of every filter combination, in order, and collects the
/// rows into one snapshot. A combination is done at its first empty page.
pub async fn fetch_snapshot<S>(
    source: &S,
    combinations: &[FilterCombination],
    max_pages: u32,
) -> Result<Vec<JobRecord>, ScrapeError>
where
    S: ListingSource + Sync,
{
    let mut snapshot = vec![];

    for combination in combinations {
        log::info!("Checking jobs with {}", combination);
        let query = combination.query();

        let mut page = 1;
        loop {
            let jobs = source.fetch_page(&query, page).await?;
            log::info!("Found {} jobs on page {}.", jobs.len(), page);

            if jobs.is_empty() {
                break;
            }
            // the empty page closing a listing may sit one past the cap
            if page > max_pages {
                return Err(ScrapeError::PageLimit {
                    filter: combination.to_string(),
                    max_pages,
                });
            }
            snapshot.extend(jobs);
            page += 1;
        }
    }

    log::info!(
        "Collected {} jobs across {} filter combinations",
        snapshot.len(),
        combinations.len()
    );

    Ok(snapshot)
}
