//! Deals collector
//!
//! Logs in, walks the deals-filtered variant search page by page until the
//! server stops returning a `next` pointer, and writes every GTIN to disk.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::qogita::{ApiError, Credentials, SearchQuery, Session, Variant, VariantCatalog};

use super::writer;

/// Variants requested per search page
pub const PAGE_SIZE: u32 = 500;

/// Errors that can occur during an export run
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Qogita API error: {0}")]
    Api(#[from] ApiError),

    #[error("Pagination did not finish within {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Variants accumulated over every page of one search
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub variants: Vec<Variant>,
    /// Number of search requests issued
    pub pages: u32,
    /// `count` reported by the last page
    pub reported_count: u64,
}

impl Collected {
    /// GTINs in the order the API returned them
    pub fn gtins(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|variant| variant.gtin.as_str())
    }
}

/// Outcome of a completed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub pages: u32,
}

/// Exports the GTIN of every variant on deal
pub struct DealsExporter<C> {
    catalog: C,
    max_pages: u32,
}

impl<C: VariantCatalog> DealsExporter<C> {
    pub fn new(catalog: C, max_pages: u32) -> Self {
        Self { catalog, max_pages }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Log in, collect every deal and write the GTINs to `output`.
    ///
    /// The output file is only touched once collection has succeeded.
    #[instrument(skip(self, credentials))]
    pub async fn run(
        &self,
        credentials: &Credentials,
        output: &Path,
    ) -> Result<ExportSummary, ExportError> {
        info!("Logging in");
        let session = self.catalog.login(credentials).await?;

        let collected = self.collect(&session).await?;

        let rows = writer::write_file(output, collected.gtins()).map_err(|source| ExportError::Io {
            path: output.to_path_buf(),
            source,
        })?;

        info!(path = %output.display(), rows, "Done, export file written");

        Ok(ExportSummary {
            path: output.to_path_buf(),
            rows,
            pages: collected.pages,
        })
    }

    /// Fetch deals pages until the server reports no next page
    pub async fn collect(&self, session: &Session) -> Result<Collected, ExportError> {
        let mut collected = Collected::default();
        let mut page = 1;

        loop {
            if page > self.max_pages {
                return Err(ExportError::PageLimitExceeded {
                    max_pages: self.max_pages,
                });
            }

            info!(page, "Getting page");
            let query = SearchQuery::new(page, PAGE_SIZE).has_deals(true);
            let result = self.catalog.search_variants(session, &query).await?;

            let has_next = result.has_next();
            debug!(page, next = ?result.next, received = result.results.len(), "Page received");

            collected.pages = page;
            collected.reported_count = result.count;
            collected.variants.extend(result.results);

            if !has_next {
                break;
            }
            page += 1;
        }

        let total = collected.variants.len() as u64;
        if total != collected.reported_count {
            warn!(
                reported = collected.reported_count,
                collected = total,
                "Collected variant count differs from the count reported by the API"
            );
        }
        info!(total = collected.reported_count, pages = collected.pages, "Total results");

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qogita::{ApiResult, QogitaClient, SearchPage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn variants(range: std::ops::Range<usize>) -> Vec<Variant> {
        range.map(|i| Variant::with_gtin(format!("{:013}", i))).collect()
    }

    fn page(results: Vec<Variant>, count: u64, next: Option<&str>) -> SearchPage<Variant> {
        SearchPage {
            count,
            next: next.map(str::to_string),
            previous: None,
            results,
        }
    }

    /// Serves pre-built pages by page number and records every query
    struct FakeCatalog {
        pages: Vec<SearchPage<Variant>>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl FakeCatalog {
        fn new(pages: Vec<SearchPage<Variant>>) -> Self {
            Self {
                pages,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<SearchQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VariantCatalog for FakeCatalog {
        async fn login(&self, _credentials: &Credentials) -> ApiResult<Session> {
            Ok(Session::new("tok-123", "CART1"))
        }

        async fn search_variants(
            &self,
            _session: &Session,
            query: &SearchQuery,
        ) -> ApiResult<SearchPage<Variant>> {
            self.queries.lock().unwrap().push(query.clone());
            self.pages
                .get(query.page as usize - 1)
                .cloned()
                .ok_or(ApiError::Status {
                    status: 404,
                    body: "Invalid page.".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn test_collects_until_next_is_empty() {
        let catalog = FakeCatalog::new(vec![
            page(variants(0..500), 510, Some("https://api.qogita.com/variants/search/?page=2")),
            page(variants(500..510), 510, None),
        ]);
        let exporter = DealsExporter::new(catalog, 1000);

        let collected = exporter.collect(&Session::new("tok-123", "CART1")).await.unwrap();

        assert_eq!(collected.variants.len(), 510);
        assert_eq!(collected.pages, 2);
        assert_eq!(collected.reported_count, 510);

        let queries = exporter.catalog().queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0], SearchQuery::new(1, 500).has_deals(true));
        assert_eq!(queries[1], SearchQuery::new(2, 500).has_deals(true));
    }

    #[tokio::test]
    async fn test_single_empty_page() {
        let exporter = DealsExporter::new(FakeCatalog::new(vec![page(vec![], 0, None)]), 1000);

        let collected = exporter.collect(&Session::new("tok-123", "CART1")).await.unwrap();

        assert!(collected.variants.is_empty());
        assert_eq!(collected.pages, 1);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let endless: Vec<_> = (0..10)
            .map(|i| page(variants(i..i + 1), 10, Some("more")))
            .collect();
        let exporter = DealsExporter::new(FakeCatalog::new(endless), 3);

        let err = exporter
            .collect(&Session::new("tok-123", "CART1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::PageLimitExceeded { max_pages: 3 }));
        assert_eq!(exporter.catalog().queries().len(), 3);
    }

    #[tokio::test]
    async fn test_run_writes_gtins_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        let catalog = FakeCatalog::new(vec![page(
            vec![Variant::with_gtin("111"), Variant::with_gtin("222")],
            2,
            None,
        )]);
        let exporter = DealsExporter::new(catalog, 1000);

        let summary = exporter
            .run(&Credentials::new("buyer@example.com", "secret"), &output)
            .await
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.pages, 1);
        assert_eq!(std::fs::read(&output).unwrap(), b"111\r\n222\r\n");
    }

    #[tokio::test]
    async fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("output.csv");
        let exporter = DealsExporter::new(
            FakeCatalog::new(vec![page(vec![Variant::with_gtin("111")], 1, None)]),
            1000,
        );

        let err = exporter
            .run(&Credentials::default(), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
    }

    // ------------------------------------------------------------------
    // Against a mocked Qogita API
    // ------------------------------------------------------------------

    fn results_json(range: std::ops::Range<usize>) -> serde_json::Value {
        json!(range
            .map(|i| json!({ "gtin": format!("{:013}", i), "name": format!("Variant {}", i) }))
            .collect::<Vec<_>>())
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "tok-123",
                "user": { "activeCartQid": "CART1" }
            })))
            .mount(server)
            .await;
    }

    async fn mount_two_pages(server: &MockServer, expected_runs: u64) {
        Mock::given(method("GET"))
            .and(path("/variants/search/"))
            .and(query_param("page", "1"))
            .and(query_param("size", "500"))
            .and(query_param("has_deals", "True"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 510,
                "next": format!("{}/variants/search/?page=2&size=500&has_deals=True", server.uri()),
                "previous": null,
                "results": results_json(0..500)
            })))
            .expect(expected_runs)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/variants/search/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 510,
                "next": null,
                "previous": format!("{}/variants/search/?page=1", server.uri()),
                "results": results_json(500..510)
            })))
            .expect(expected_runs)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_export_against_api() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_two_pages(&server, 1).await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        let client = QogitaClient::with_base_url(&server.uri()).unwrap();
        let exporter = DealsExporter::new(client, 1000);

        let summary = exporter
            .run(&Credentials::new("buyer@example.com", "secret"), &output)
            .await
            .unwrap();

        assert_eq!(summary.rows, 510);
        assert_eq!(summary.pages, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 510);
        assert_eq!(lines[0], "0000000000000");
        assert_eq!(lines[509], "0000000000509");

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"0000000000000\r\n0000000000001\r\n"));
        assert!(bytes.ends_with(b"0000000000509\r\n"));
        assert_eq!(bytes.len(), 510 * 15);
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_two_pages(&server, 2).await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        let credentials = Credentials::new("buyer@example.com", "secret");
        let exporter = DealsExporter::new(QogitaClient::with_base_url(&server.uri()).unwrap(), 1000);

        exporter.run(&credentials, &output).await.unwrap();
        let first = std::fs::read(&output).unwrap();
        exporter.run(&credentials, &output).await.unwrap();
        let second = std::fs::read(&output).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_search_failure_leaves_output_alone() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/variants/search/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Server Error"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("output.csv");
        std::fs::write(&existing, "previous\n").unwrap();
        let fresh = dir.path().join("fresh.csv");

        let exporter = DealsExporter::new(QogitaClient::with_base_url(&server.uri()).unwrap(), 1000);
        let credentials = Credentials::new("buyer@example.com", "secret");

        let err = exporter.run(&credentials, &existing).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::Api(ApiError::Status { status: 500, .. })
        ));
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "previous\n");

        let err = exporter.run(&credentials, &fresh).await;
        tokio_test::assert_err!(err);
        assert!(!fresh.exists());
    }

    #[tokio::test]
    async fn test_login_failure_stops_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/variants/search/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        let exporter = DealsExporter::new(QogitaClient::with_base_url(&server.uri()).unwrap(), 1000);

        let err = exporter
            .run(&Credentials::default(), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Api(ApiError::Status { status: 401, .. })));
        assert!(!output.exists());
    }
}
