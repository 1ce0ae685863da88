//! Primo search API.

use async_trait::async_trait;
use chrono::Datelike;
use std::sync::Arc;

use crate::config::Config;
use crate::models::RequestDescriptor;
use crate::sources::{SearchApi, SourceError};
use crate::utils::HttpClient;

/// Separator between clauses of the `multiFacets` parameter
const FACET_SEPARATOR: &str = "|,|";

/// Primo search source
///
/// Uses the Primo REST search endpoint behind the Ex Libris API gateway.
#[derive(Debug, Clone)]
pub struct PrimoSource {
    client: Arc<HttpClient>,
    endpoint: String,
    api_key: String,
    current_year: i32,
}

impl PrimoSource {
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint(),
            api_key: config.apikey.clone(),
            current_year: chrono::Local::now().year(),
        }
    }

    /// Fix the upper bound of date-range facets instead of using today's year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Build the search URL for `request`
    pub fn build_url(&self, request: &RequestDescriptor) -> String {
        let query = encode_query(&rewrite_query(&request.query_string));
        let facets = build_multi_facets(&request.facets, request.from_year, self.current_year);
        let limit = request
            .effective_limit()
            .map(|l| l.to_string())
            .unwrap_or_default();

        format!(
            "{}&q={}&multiFacets={}&limit={}&sort={}&apikey={}",
            self.endpoint,
            query,
            facets,
            limit,
            urlencoding::encode(&request.sort),
            urlencoding::encode(&self.api_key)
        )
    }
}

/// Convert a query copied from the Primo UI into the API's multi-value syntax.
///
/// `OR&query=` becomes `OR;` and `AND&query=` becomes `AND;`.
pub fn rewrite_query(query: &str) -> String {
    query
        .replace("OR&query=", "OR;")
        .replace("AND&query=", "AND;")
}

/// Percent-encode each clause, keeping the `;` between them
fn encode_query(query: &str) -> String {
    query
        .split(';')
        .map(|clause| urlencoding::encode(clause).into_owned())
        .collect::<Vec<_>>()
        .join(";")
}

/// Encoded `multiFacets` value, with a creation-date range when `from_year` is set
pub fn build_multi_facets(facets: &str, from_year: Option<i32>, current_year: i32) -> String {
    let mut encoded = urlencoding::encode(facets).into_owned();

    if let Some(from_year) = from_year {
        if !encoded.is_empty() {
            encoded.push_str(&urlencoding::encode(FACET_SEPARATOR));
        }
        let range = format!(
            "facet_searchcreationdate,include,[{}+TO+{}]",
            from_year, current_year
        );
        encoded.push_str(&urlencoding::encode(&range));
    }

    encoded
}

#[async_trait]
impl SearchApi for PrimoSource {
    fn name(&self) -> &str {
        "Primo"
    }

    async fn search(&self, request: &RequestDescriptor) -> Result<serde_json::Value, SourceError> {
        let url = self.build_url(request);

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Primo: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Primo API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read Primo response: {}", e)))?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use mockito::Matcher;

    fn source(config: &Config) -> PrimoSource {
        PrimoSource::new(Arc::new(HttpClient::new().unwrap()), config).with_current_year(2024)
    }

    #[test]
    fn test_rewrite_query() {
        assert_eq!(
            rewrite_query("any,contains,dogs OR&query=any,contains,cats AND&query=title,exact,pets"),
            "any,contains,dogs OR;any,contains,cats AND;title,exact,pets"
        );
    }

    #[test]
    fn test_rewrite_query_leaves_correct_input() {
        let query = "any,contains,dogs OR;any,contains,cats";
        assert_eq!(rewrite_query(query), query);
        assert_eq!(rewrite_query(&rewrite_query(query)), query);
    }

    #[test]
    fn test_date_range_facet() {
        assert_eq!(
            build_multi_facets("", Some(2020), 2024),
            "facet_searchcreationdate%2Cinclude%2C%5B2020%2BTO%2B2024%5D"
        );
    }

    #[test]
    fn test_date_range_appended_with_separator() {
        assert_eq!(
            build_multi_facets("facet_rtype,include,books", Some(2020), 2024),
            "facet_rtype%2Cinclude%2Cbooks%7C%2C%7Cfacet_searchcreationdate%2Cinclude%2C%5B2020%2BTO%2B2024%5D"
        );
        assert_eq!(
            build_multi_facets("facet_rtype,include,books", None, 2024),
            "facet_rtype%2Cinclude%2Cbooks"
        );
    }

    #[test]
    fn test_build_url() {
        let config = test_config();
        let request = RequestDescriptor::new("1", "a.html")
            .query("any,contains,dogs OR&query=any,contains,cats")
            .sort("rank")
            .results_limit(10)
            .exclude_isbns(["1", "2", "3"]);

        let url = source(&config).build_url(&request);
        assert_eq!(
            url,
            "https://api.example.com/primo/v1/search?vid=VID&tab=default_tab&scope=default_scope&pcAvailability=false\
             &q=any%2Ccontains%2Cdogs%20OR;any%2Ccontains%2Ccats\
             &multiFacets=&limit=13&sort=rank&apikey=secret%20key"
        );
    }

    #[test]
    fn test_build_url_without_limit() {
        let config = test_config();
        let request = RequestDescriptor::new("1", "a.html").query("test").sort("date");
        let url = source(&config).build_url(&request);
        assert!(url.contains("&limit=&sort=date&"));
    }

    #[tokio::test]
    async fn test_search_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/primo/v1/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "test".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
                Matcher::UrlEncoded("apikey".into(), "secret key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"docs": []}"#)
            .create_async()
            .await;

        let mut config = test_config();
        config.api_gateway_url = server.url();
        let request = RequestDescriptor::new("1", "a.html")
            .query("test")
            .sort("rank")
            .results_limit(5);

        let body = source(&config).search(&request).await.unwrap();
        assert!(body["docs"].as_array().unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/primo/v1/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut config = test_config();
        config.api_gateway_url = server.url();
        let request = RequestDescriptor::new("1", "a.html").query("test");

        let err = source(&config).search(&request).await.unwrap_err();
        assert!(matches!(err, SourceError::Api(_)));
    }
}
