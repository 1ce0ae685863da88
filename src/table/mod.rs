//! Request table loading.
//!
//! The table is a CSV file with a header row, one search definition per row:
//!
//! ```text
//! id, file_name, query, facets, from_YYYY, sort, results_limit, exclude_isbns
//! 1, new-books.html, "any,contains,dogs OR&query=any,contains,cats", , 2020, rank, 10, 978-0-00-000000-0;1234567890
//! ```
//!
//! Whitespace after a delimiter is skipped, so a quoted value may follow `, `.
//! Trailing whitespace is trimmed from every value. Excluded ISBNs are stored
//! without hyphens.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use crate::config::ConfigError;
use crate::models::{strip_hyphens, RequestDescriptor};
use crate::utils::validate_relative_path;

/// Columns every row must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "file_name", "query", "facets", "sort"];

const COL_FROM_YEAR: &str = "from_YYYY";
const COL_RESULTS_LIMIT: &str = "results_limit";
const COL_EXCLUDE_ISBNS: &str = "exclude_isbns";

/// A row of the table as column name -> trimmed value
pub type Row = HashMap<String, String>;

/// Read the request table at `path`, keeping only the rows whose id is in `ids`
/// (all rows when `ids` is `None` or empty)
pub fn load_requests(
    path: &Path,
    ids: Option<&[String]>,
) -> Result<Vec<RequestDescriptor>, ConfigError> {
    let file = std::fs::File::open(path).map_err(|e| ConfigError::Table {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let rows = read_rows(file).map_err(|e| ConfigError::Table {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let requests = parse_rows(&rows)?;
    tracing::debug!(
        "Loaded {} request(s) from {}",
        requests.len(),
        path.display()
    );

    Ok(select(requests, ids))
}

/// Split CSV input into rows keyed by header name.
///
/// Short rows simply lack the trailing columns; [`parse_rows`] reports them.
pub fn read_rows<R: Read>(mut reader: R) -> Result<Vec<Row>, csv::Error> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    let input = skip_initial_space(&input);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Drop whitespace at the start of each unquoted field.
///
/// The csv reader only recognises a quote as the first byte of a field, so
/// `a, "b,c"` would otherwise split inside the quotes.
fn skip_initial_space(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                // "" is an escaped quote
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            ' ' | '\t' if field_start => continue,
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            ',' | '\n' | '\r' => field_start = true,
            _ => field_start = false,
        }
        out.push(c);
    }
    out
}

/// Turn raw rows into request descriptors, in table order
pub fn parse_rows(rows: &[Row]) -> Result<Vec<RequestDescriptor>, ConfigError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index + 1, row))
        .collect()
}

fn parse_row(row_number: usize, row: &Row) -> Result<RequestDescriptor, ConfigError> {
    if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !row.contains_key(**c)) {
        return Err(ConfigError::MissingColumn {
            row: row_number,
            column: column.to_string(),
        });
    }
    let value = |column: &str| row.get(column).map(String::as_str).unwrap_or("");

    let id = value("id");
    let file_name = value("file_name");

    validate_relative_path(file_name).map_err(|_| ConfigError::InvalidValue {
        row: row_number,
        column: "file_name".to_string(),
        value: file_name.to_string(),
    })?;

    let from_year = match value(COL_FROM_YEAR) {
        "" => None,
        year => Some(year.parse::<i32>().map_err(|_| ConfigError::InvalidValue {
            row: row_number,
            column: COL_FROM_YEAR.to_string(),
            value: year.to_string(),
        })?),
    };

    let results_limit = parse_limit(value(COL_RESULTS_LIMIT));
    let excluded_isbns = parse_isbn_list(value(COL_EXCLUDE_ISBNS));

    Ok(RequestDescriptor {
        id: id.to_string(),
        file_name: file_name.to_string(),
        query_string: value("query").to_string(),
        facets: value("facets").to_string(),
        from_year,
        sort: value("sort").to_string(),
        results_limit,
        excluded_isbns,
    })
}

/// A positive integer, or no limit
fn parse_limit(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|limit| *limit > 0)
}

fn parse_isbn_list(value: &str) -> BTreeSet<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|isbn| !isbn.is_empty())
        .map(strip_hyphens)
        .collect()
}

/// Keep the requests whose id is listed, preserving table order
pub fn select(requests: Vec<RequestDescriptor>, ids: Option<&[String]>) -> Vec<RequestDescriptor> {
    match ids {
        Some(ids) if !ids.is_empty() => requests
            .into_iter()
            .filter(|r| ids.iter().any(|id| id == &r.id))
            .collect(),
        _ => requests,
    }
}

/// Parse the comma-separated id list given on the command line
pub fn parse_id_list(arg: &str) -> Vec<String> {
    arg.trim()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TABLE: &str = r#"id, file_name, query, facets, from_YYYY, sort, results_limit, exclude_isbns
1, a.html, test, , , rank, 5,
2, b.html,"any,contains,dogs","facet_rtype,include,books", 2020, date, 10, 111;222;333
3, c.html,"any,contains,cats", , , rank, all, 444
"#;

    fn rows(input: &str) -> Vec<Row> {
        read_rows(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let requests = parse_rows(&rows(TABLE)).unwrap();
        assert_eq!(requests.len(), 3);

        let first = &requests[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.file_name, "a.html");
        assert_eq!(first.query_string, "test");
        assert_eq!(first.facets, "");
        assert_eq!(first.from_year, None);
        assert_eq!(first.results_limit, Some(5));
        assert!(first.excluded_isbns.is_empty());

        let second = &requests[1];
        assert_eq!(second.query_string, "any,contains,dogs");
        assert_eq!(second.facets, "facet_rtype,include,books");
        assert_eq!(second.from_year, Some(2020));
        assert_eq!(second.sort, "date");
        assert_eq!(second.excluded_isbns.len(), 3);
        assert_eq!(second.effective_limit(), Some(13));

        let third = &requests[2];
        assert_eq!(third.results_limit, None);
        assert_eq!(third.effective_limit(), None);
        assert!(third.is_excluded("444"));
    }

    #[test]
    fn test_missing_required_column() {
        let input = "id, file_name, query, sort\n1, a.html, test, rank\n";
        let err = parse_rows(&rows(input)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingColumn { row: 1, ref column } if column == "facets"
        ));
    }

    #[test]
    fn test_short_row_is_missing_columns() {
        let input = "id, file_name, query, facets, sort\n1, a.html, test, , rank\n2, b.html\n";
        let err = parse_rows(&rows(input)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { row: 2, .. }));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let input = "id, file_name, query, facets, sort\n1, a.html, test, , rank\n";
        let requests = parse_rows(&rows(input)).unwrap();
        assert_eq!(requests[0].from_year, None);
        assert_eq!(requests[0].results_limit, None);
        assert!(requests[0].excluded_isbns.is_empty());
    }

    #[test]
    fn test_invalid_year_and_path() {
        let input = "id, file_name, query, facets, sort, from_YYYY\n1, a.html, q, , rank, soon\n";
        assert!(matches!(
            parse_rows(&rows(input)),
            Err(ConfigError::InvalidValue { ref column, .. }) if column == "from_YYYY"
        ));

        let input = "id, file_name, query, facets, sort\n1, ../a.html, q, , rank\n";
        assert!(matches!(
            parse_rows(&rows(input)),
            Err(ConfigError::InvalidValue { ref column, .. }) if column == "file_name"
        ));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("10"), Some(10));
        assert_eq!(parse_limit(""), None);
        assert_eq!(parse_limit("ten"), None);
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("-3"), None);
    }

    #[test]
    fn test_parse_isbn_list() {
        assert!(parse_isbn_list("").is_empty());
        let isbns = parse_isbn_list("111; 222;;333");
        assert_eq!(isbns.into_iter().collect::<Vec<_>>(), vec!["111", "222", "333"]);

        let isbns = parse_isbn_list("978-0-441-01359-3;1234567890");
        assert_eq!(
            isbns.into_iter().collect::<Vec<_>>(),
            vec!["1234567890", "9780441013593"]
        );
    }

    #[test]
    fn test_quoted_values_after_space() {
        let input = concat!(
            "id, file_name, query, facets, from_YYYY, sort, results_limit, exclude_isbns\n",
            "1, a.html, \"any,contains,dogs\", \"facet_rtype,include,books\", 2020, rank, 5, 978-0-441-01359-3\n",
            "2, b.html, \"title,exact,\"\"Dune\"\"\", , , rank, 5,\n",
        );
        let requests = parse_rows(&rows(input)).unwrap();

        let first = &requests[0];
        assert_eq!(first.query_string, "any,contains,dogs");
        assert_eq!(first.facets, "facet_rtype,include,books");
        assert_eq!(first.from_year, Some(2020));
        assert_eq!(first.sort, "rank");
        assert_eq!(first.results_limit, Some(5));
        assert!(first.is_excluded("9780441013593"));

        let second = &requests[1];
        assert_eq!(second.query_string, "title,exact,\"Dune\"");
        assert_eq!(second.facets, "");
        assert_eq!(second.sort, "rank");
    }

    #[test]
    fn test_skip_initial_space() {
        assert_eq!(skip_initial_space("a,  b,\t\"c, d\""), "a,b,\"c, d\"");
        assert_eq!(skip_initial_space("x, \"y \"\" z\"\n w"), "x,\"y \"\" z\"\nw");
    }

    #[test]
    fn test_select_preserves_table_order() {
        let requests = vec![
            RequestDescriptor::new("1", "a.html"),
            RequestDescriptor::new("2", "b.html"),
            RequestDescriptor::new("3", "c.html"),
        ];

        let ids = vec!["3".to_string(), "1".to_string()];
        let selected = select(requests.clone(), Some(&ids));
        let selected_ids: Vec<_> = selected.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(selected_ids, vec!["1", "3"]);

        assert_eq!(select(requests.clone(), None).len(), 3);
        assert_eq!(select(requests, Some(&[])).len(), 3);
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(" 1,3 "), vec!["1", "3"]);
        assert_eq!(parse_id_list("1, 2,"), vec!["1", "2"]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_load_requests_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requests.csv");
        std::fs::write(
            &path,
            "id, file_name, query, facets, sort\n1, a.html, test, , rank\n2, b.html, other, , rank\n",
        )
        .unwrap();

        let ids = vec!["2".to_string()];
        let requests = load_requests(&path, Some(&ids)).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].file_name, "b.html");
    }

    #[test]
    fn test_load_requests_missing_file() {
        let result = load_requests(Path::new("/nonexistent/requests.csv"), None);
        assert!(matches!(result, Err(ConfigError::Table { .. })));
    }
}
