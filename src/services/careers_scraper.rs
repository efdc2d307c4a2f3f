use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use scraper::{ElementRef, Html, Selector};

use crate::{
    configuration::CareersSettings,
    domain::{filter::ListingQuery, job_record::JobRecord},
};

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("listing row {row} has no {element}, the page layout may have changed")]
    MissingElement { row: usize, element: &'static str },
    #[error("{filter} still returned jobs after {max_pages} pages")]
    PageLimit { filter: String, max_pages: u32 },
}

/// A paginated job board that can be queried one page at a time.
#[async_trait]
pub trait ListingSource {
    /// Returns the normalized rows of page `page` (1-based). An empty vec means
    /// the listing is exhausted.
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        page: u32,
    ) -> Result<Vec<JobRecord>, ScrapeError>;
}

pub struct CareersClient {
    client: Client,
    listings_url: String,
}

impl CareersClient {
    pub fn new(settings: &CareersSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;

        Ok(CareersClient::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: &CareersSettings) -> Self {
        CareersClient {
            client,
            listings_url: settings.listings_url(),
        }
    }

    pub fn listings_url(&self) -> &str {
        &self.listings_url
    }

    /// The configured HTTP client, shared with the webhook notifier.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    fn listings_request(&self, query: &ListingQuery, page: u32) -> Result<Request, ScrapeError> {
        self.client
            .get(&self.listings_url)
            .query(query.params())
            .query(&[("page", page)])
            .build()
            .map_err(|source| ScrapeError::Request {
                url: self.listings_url.clone(),
                source,
            })
    }
}

#[async_trait]
impl ListingSource for CareersClient {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        page: u32,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        let request = self.listings_request(query, page)?;
        let url = request.url().to_string();
        log::info!("Checking page {}: {}", page, url);

        let request_error = |source| ScrapeError::Request {
            url: url.clone(),
            source,
        };

        let response = self.client.execute(request).await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.clone(),
                status,
            });
        }

        let html_content = response.text().await.map_err(request_error)?;

        parse_listings(&html_content)
    }
}

/// Extracts every job row of a search results page.
pub fn parse_listings(html: &str) -> Result<Vec<JobRecord>, ScrapeError> {
    let html_document = Html::parse_document(html);
    let row_selector = Selector::parse("tr.jobs_table_item").unwrap();

    html_document
        .select(&row_selector)
        .enumerate()
        .map(|(i, row)| normalize_row(row, i + 1))
        .collect()
}

fn normalize_row(row: ElementRef, index: usize) -> Result<JobRecord, ScrapeError> {
    let title_selector = Selector::parse("td.jobs_table_item_title").unwrap();
    let a_tag_selector = Selector::parse("a").unwrap();
    let location_selector = Selector::parse("td.jobs_table_item_location.job_location").unwrap();
    let date_selector = Selector::parse("td.job_table_item_date").unwrap();

    let missing = |element| ScrapeError::MissingElement { row: index, element };

    let title_cell = row
        .select(&title_selector)
        .next()
        .ok_or_else(|| missing("title cell"))?;
    let link = title_cell
        .select(&a_tag_selector)
        .next()
        .and_then(|a_tag| a_tag.value().attr("href"))
        .ok_or_else(|| missing("title link"))?;
    let location_cell = row
        .select(&location_selector)
        .next()
        .ok_or_else(|| missing("location cell"))?;
    let date_cell = row
        .select(&date_selector)
        .next()
        .ok_or_else(|| missing("date cell"))?;

    Ok(JobRecord::new(
        cell_text(title_cell),
        link.trim(),
        cell_text(location_cell),
        cell_text(date_cell),
    ))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::{parse_listings, CareersClient, ListingSource, ScrapeError};
    use crate::{
        configuration::CareersSettings,
        domain::{
            filter::{Category, FilterCombination, Location},
            job_record::JobRecord,
        },
    };

    fn careers_client(base_url: &str) -> CareersClient {
        let settings = CareersSettings {
            base_url: base_url.to_string(),
            listings_path: "/search/jobs".to_string(),
            user_agent: "jobwatch-test".to_string(),
            timeout_secs: 5,
            max_pages: 100,
        };
        let client = Client::builder().no_proxy().build().unwrap();
        CareersClient::with_client(client, &settings)
    }

    #[test]
    fn listings_request_carries_filters_and_page() {
        let client = careers_client("https://careers.example.com");
        let query = FilterCombination::new(Location::Remote, Category::Analyst).query();

        let request = client.listings_request(&query, 2).unwrap();
        let url = request.url();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/search/jobs");
        assert_eq!(
            pairs,
            [
                ("ns_category", "analyst"),
                ("cfm4[]", "ANALYS"),
                ("cfm4[]", "DATA"),
                ("ns_location", "remote"),
                ("cfm8[]", "NFCU1-RMT"),
                ("page", "2"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string()))
        );
    }

    #[tokio::test]
    async fn error_status_fails_the_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\n\
                      content-length: 0\r\n\
                      connection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });
        let client = careers_client(&format!("http://{}", addr));
        let query = FilterCombination::new(Location::ViennaVa, Category::Lending).query();

        match client.fetch_page(&query, 1).await {
            Err(ScrapeError::Status { url, status }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(url.ends_with(
                    "ns_location=vienna-va&cfm8%5B%5D=NFCU1-HDQ&cfm8%5B%5D=NFCU1-HERN&page=1"
                ));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table class="jobs_table">
              <thead><tr><th>Title</th><th>Location</th><th>Date</th></tr></thead>
              <tbody>{}</tbody>
            </table>
            </body></html>"#,
            rows
        )
    }

    const TELLER_ROW: &str = r#"
        <tr class="jobs_table_item">
          <td class="jobs_table_item_title">
            <a href=" https://nfcucareers.ttcportals.com/jobs/111-teller ">
              Member Service Representative - Teller
            </a>
          </td>
          <td class="jobs_table_item_location job_location">
            Vienna, VA
          </td>
          <td class="job_table_item_date"> 01/05/2024 </td>
        </tr>"#;

    const ANALYST_ROW: &str = r#"
        <tr class="jobs_table_item">
          <td class="jobs_table_item_title"><a href="https://nfcucareers.ttcportals.com/jobs/222-analyst">Data Analyst II</a></td>
          <td class="jobs_table_item_location job_location">Pensacola, FL</td>
          <td class="job_table_item_date">01/06/2024</td>
        </tr>"#;

    #[test]
    fn parse_listings_trims_fields() {
        let html = page(&format!("{}{}", TELLER_ROW, ANALYST_ROW));

        let records = parse_listings(&html).unwrap();

        assert_eq!(
            records,
            vec![
                JobRecord::new(
                    "Member Service Representative - Teller",
                    "https://nfcucareers.ttcportals.com/jobs/111-teller",
                    "Vienna, VA",
                    "01/05/2024",
                ),
                JobRecord::new(
                    "Data Analyst II",
                    "https://nfcucareers.ttcportals.com/jobs/222-analyst",
                    "Pensacola, FL",
                    "01/06/2024",
                ),
            ]
        );
    }

    #[test]
    fn parse_listings_empty_page() {
        let html = page("");

        assert!(parse_listings(&html).unwrap().is_empty());
        assert!(parse_listings("<html><body><p>No jobs found</p></body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn parse_listings_missing_date_fails() {
        let broken = r#"
            <tr class="jobs_table_item">
              <td class="jobs_table_item_title"><a href="/jobs/333">Security Officer</a></td>
              <td class="jobs_table_item_location job_location">Remote</td>
            </tr>"#;
        let html = page(&format!("{}{}", TELLER_ROW, broken));

        match parse_listings(&html) {
            Err(ScrapeError::MissingElement { row, element }) => {
                assert_eq!(row, 2);
                assert_eq!(element, "date cell");
            }
            other => panic!("expected missing element error, got {:?}", other),
        }
    }

    #[test]
    fn parse_listings_missing_link_fails() {
        let broken = r#"
            <tr class="jobs_table_item">
              <td class="jobs_table_item_title">Security Officer</td>
              <td class="jobs_table_item_location job_location">Remote</td>
              <td class="job_table_item_date">01/07/2024</td>
            </tr>"#;

        assert!(matches!(
            parse_listings(&page(broken)),
            Err(ScrapeError::MissingElement {
                row: 1,
                element: "title link"
            })
        ));
    }

    #[test]
    fn location_cell_needs_both_classes() {
        let broken = r#"
            <tr class="jobs_table_item">
              <td class="jobs_table_item_title"><a href="/jobs/444">Teller</a></td>
              <td class="jobs_table_item_location">Remote</td>
              <td class="job_table_item_date">01/07/2024</td>
            </tr>"#;

        assert!(matches!(
            parse_listings(&page(broken)),
            Err(ScrapeError::MissingElement {
                element: "location cell",
                ..
            })
        ));
    }
}
