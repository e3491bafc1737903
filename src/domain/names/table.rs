use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::csv::split_record;
use super::{NameRecord, NamesError, Page};

// ============================================================================
// Names Table
// ============================================================================
//
// Read-only lookup table built once at startup.
//
// Dataset rows are `year,id,name`; an optional `year,id,name` header line is
// skipped. Each year is its own partition with names ordered by id.
//
// ============================================================================

const EMBEDDED_DATASET: &str = include_str!("../../../data/names.csv");

#[derive(Debug, Default, Clone)]
pub struct NamesTable {
    partitions: BTreeMap<i64, BTreeMap<i64, String>>,
}

impl NamesTable {
    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self, NamesError> {
        Self::parse(EMBEDDED_DATASET)
    }

    pub fn load(path: &Path) -> Result<Self, NamesError> {
        let input = std::fs::read_to_string(path).map_err(|source| NamesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input)
    }

    pub fn parse(input: &str) -> Result<Self, NamesError> {
        let mut partitions: BTreeMap<i64, BTreeMap<i64, String>> = BTreeMap::new();

        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                continue;
            }

            let fields =
                split_record(raw).map_err(|reason| NamesError::Malformed { line, reason })?;
            if line == 1 && fields.first().map(|f| f.trim()) == Some("year") {
                continue;
            }

            let [year, id, name] = fields.as_slice() else {
                return Err(NamesError::Malformed {
                    line,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                });
            };
            let year = parse_number(year, "year", line)?;
            let id = parse_number(id, "id", line)?;

            let partition = partitions.entry(year).or_default();
            if partition.insert(id, name.clone()).is_some() {
                return Err(NamesError::DuplicateId { year, id, line });
            }
        }

        Ok(Self { partitions })
    }

    pub fn get(&self, year: i64, id: i64) -> Result<NameRecord, NamesError> {
        let name = self
            .partition(year)?
            .get(&id)
            .ok_or(NamesError::NotFound { year, id })?;

        Ok(NameRecord {
            id,
            name: name.clone(),
        })
    }

    /// Records `page * limit .. page * limit + limit` of `year`, in id order.
    pub fn page(&self, year: i64, page: u64, limit: u64) -> Result<Page, NamesError> {
        let partition = self.partition(year)?;
        let skip = usize::try_from(page.saturating_mul(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let records = partition
            .iter()
            .skip(skip)
            .take(take)
            .map(|(id, name)| NameRecord {
                id: *id,
                name: name.clone(),
            })
            .collect();

        Ok(Page {
            year,
            page,
            limit,
            total: partition.len() as u64,
            records,
        })
    }

    pub fn years(&self) -> BTreeSet<i64> {
        self.partitions.keys().copied().collect()
    }

    pub fn count(&self, year: i64) -> Result<u64, NamesError> {
        Ok(self.partition(year)?.len() as u64)
    }

    /// Records across every year
    pub fn len(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition(&self, year: i64) -> Result<&BTreeMap<i64, String>, NamesError> {
        self.partitions
            .get(&year)
            .ok_or(NamesError::YearUnavailable(year))
    }
}

fn parse_number(value: &str, field: &str, line: usize) -> Result<i64, NamesError> {
    value.trim().parse().map_err(|e| NamesError::Malformed {
        line,
        reason: format!("invalid {field} {value:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "year,id,name\n\
                          2024,1,Olivia\n\
                          2024,2,Liam\n\
                          2024,3,Emma\n\
                          2025,1,Noah\n";

    #[test]
    fn test_embedded_dataset_loads() {
        let table = NamesTable::embedded().unwrap();
        assert!(!table.is_empty());
        assert!(table.years().contains(&2024));
        assert_eq!(table.get(2024, 1).unwrap().name, "Olivia");
    }

    #[test]
    fn test_get_by_year_and_id() {
        let table = NamesTable::parse(SAMPLE).unwrap();
        assert_eq!(
            table.get(2024, 2).unwrap(),
            NameRecord {
                id: 2,
                name: "Liam".to_string()
            }
        );
        assert_eq!(table.get(2025, 1).unwrap().name, "Noah");
    }

    #[test]
    fn test_missing_id_and_missing_year_are_distinct() {
        let table = NamesTable::parse(SAMPLE).unwrap();
        assert!(matches!(
            table.get(2024, 9),
            Err(NamesError::NotFound { year: 2024, id: 9 })
        ));
        assert!(matches!(
            table.get(1999, 1),
            Err(NamesError::YearUnavailable(1999))
        ));
    }

    #[test]
    fn test_page_walks_ids_in_order() {
        let table = NamesTable::parse(SAMPLE).unwrap();

        let first = table.page(2024, 0, 2).unwrap();
        assert_eq!(first.total, 3);
        let names: Vec<_> = first.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Olivia", "Liam"]);

        let second = table.page(2024, 1, 2).unwrap();
        assert_eq!(second.records.len(), 1);
        assert_eq!(second.records[0].name, "Emma");

        assert!(table.page(2024, 5, 2).unwrap().records.is_empty());
    }

    #[test]
    fn test_years_and_counts() {
        let table = NamesTable::parse(SAMPLE).unwrap();
        assert_eq!(table.years().into_iter().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(table.count(2024).unwrap(), 3);
        assert_eq!(table.count(2025).unwrap(), 1);
        assert!(table.count(2030).is_err());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_malformed_rows_report_line() {
        let err = NamesTable::parse("2024,1\n").unwrap_err();
        assert!(matches!(err, NamesError::Malformed { line: 1, .. }));

        let err = NamesTable::parse("2024,1,Olivia\n2024,x,Liam\n").unwrap_err();
        match err {
            NamesError::Malformed { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("invalid id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = NamesTable::parse("2024,1,Olivia\n2024,1,Liam\n").unwrap_err();
        assert!(matches!(
            err,
            NamesError::DuplicateId {
                year: 2024,
                id: 1,
                line: 2
            }
        ));
    }

    #[test]
    fn test_blank_lines_and_crlf_are_tolerated() {
        let table = NamesTable::parse("2024,1,Olivia\r\n\r\n2024,2,Liam\r\n").unwrap();
        assert_eq!(table.get(2024, 2).unwrap().name, "Liam");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = NamesTable::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, NamesError::Io { .. }));
    }
}
