use chrono::Datelike;
use serde::Deserialize;

use super::{NameRecord, NamesTable, Page, QueryError};

// ============================================================================
// Lookup Queries
// ============================================================================
//
// Parameter rules shared by the HTTP and gRPC front ends:
// - year:  must be >= 0; absent or 0 means the current calendar year
// - limit: must be >= 0; absent or 0 means DEFAULT_LIMIT
// - page:  must be >= 0; absent means 0
// - page * limit must not exceed the year's record count
//
// ============================================================================

pub const DEFAULT_LIMIT: i64 = 10;

/// Raw list parameters as they arrive from a request
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ListParams {
    pub year: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub fn current_year() -> i64 {
    i64::from(chrono::Utc::now().year())
}

pub fn resolve_year(year: Option<i64>, current_year: i64) -> Result<i64, QueryError> {
    match year {
        Some(year) if year < 0 => Err(QueryError::Negative("year")),
        Some(year) if year != 0 => Ok(year),
        _ => Ok(current_year),
    }
}

pub fn resolve_limit(limit: Option<i64>) -> Result<u64, QueryError> {
    match limit {
        Some(limit) if limit < 0 => Err(QueryError::Negative("limit")),
        Some(limit) if limit != 0 => Ok(limit as u64),
        _ => Ok(DEFAULT_LIMIT as u64),
    }
}

pub fn resolve_page(page: Option<i64>) -> Result<u64, QueryError> {
    match page {
        Some(page) if page < 0 => Err(QueryError::Negative("page")),
        Some(page) => Ok(page as u64),
        None => Ok(0),
    }
}

/// Validates `params` and returns the requested page.
pub fn list_names(
    table: &NamesTable,
    params: ListParams,
    current_year: i64,
) -> Result<Page, QueryError> {
    let year = resolve_year(params.year, current_year)?;
    let count = table.count(year)?;
    let limit = resolve_limit(params.limit)?;
    let page = resolve_page(params.page)?;

    match page.checked_mul(limit) {
        Some(offset) if offset <= count => Ok(table.page(year, page, limit)?),
        _ => Err(QueryError::PageOutOfRange),
    }
}

pub fn get_name(
    table: &NamesTable,
    id: i64,
    year: Option<i64>,
    current_year: i64,
) -> Result<NameRecord, QueryError> {
    let year = resolve_year(year, current_year)?;
    Ok(table.get(year, id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table() -> NamesTable {
        NamesTable::parse(
            "2024,1,Olivia\n2024,2,Liam\n2024,3,Emma\n2024,4,Noah\n2024,5,Ava\n2025,1,Mia\n",
        )
        .unwrap()
    }

    #[rstest]
    #[case(None, 2024)]
    #[case(Some(0), 2024)]
    #[case(Some(2025), 2025)]
    fn test_year_defaults_to_current(#[case] year: Option<i64>, #[case] expected: i64) {
        assert_eq!(resolve_year(year, 2024).unwrap(), expected);
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 10)]
    #[case(Some(3), 3)]
    fn test_limit_defaults(#[case] limit: Option<i64>, #[case] expected: u64) {
        assert_eq!(resolve_limit(limit).unwrap(), expected);
    }

    #[rstest]
    #[case(ListParams { year: Some(-1), ..Default::default() }, "year")]
    #[case(ListParams { year: Some(2024), limit: Some(-5), ..Default::default() }, "limit")]
    #[case(ListParams { year: Some(2024), page: Some(-2), ..Default::default() }, "page")]
    fn test_negative_parameters_are_rejected(#[case] params: ListParams, #[case] field: &str) {
        match list_names(&table(), params, 2024) {
            Err(QueryError::Negative(name)) => assert_eq!(name, field),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_list_defaults_to_first_page_of_current_year() {
        let page = list_names(&table(), ListParams::default(), 2024).unwrap();
        assert_eq!(page.year, 2024);
        assert_eq!(page.page, 0);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total, 5);
        assert_eq!(page.records.len(), 5);
    }

    #[test]
    fn test_page_beyond_count_is_rejected() {
        let params = ListParams {
            year: Some(2024),
            page: Some(3),
            limit: Some(2),
        };
        assert!(matches!(
            list_names(&table(), params, 2024),
            Err(QueryError::PageOutOfRange)
        ));

        let huge = ListParams {
            year: Some(2024),
            page: Some(i64::MAX),
            limit: Some(i64::MAX),
        };
        assert!(matches!(
            list_names(&table(), huge, 2024),
            Err(QueryError::PageOutOfRange)
        ));
    }

    #[test]
    fn test_last_partial_page() {
        let params = ListParams {
            year: Some(2024),
            page: Some(2),
            limit: Some(2),
        };
        let page = list_names(&table(), params, 2024).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Ava");
    }

    #[test]
    fn test_unknown_year_is_not_found() {
        let err = list_names(&table(), ListParams::default(), 1990).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_name_uses_year_rules() {
        assert_eq!(get_name(&table(), 1, None, 2025).unwrap().name, "Mia");
        assert!(get_name(&table(), 9, Some(2024), 2025).unwrap_err().is_not_found());
        assert!(get_name(&table(), 1, Some(-3), 2025).unwrap_err().is_invalid());
    }
}
