use crate::error::{ProcessingError, Result};
use crate::models::Aggregation;
use crate::utils::constants::{DATE_COLUMN, VALUE_COLUMN};
use csv::StringRecord;

/// Role of a single wide header cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The spatial unit identifier
    Id,
    /// `(aggregation, date)` measurement column; headers start with a digit
    MeasureDate,
}

impl ColumnRole {
    /// A header cell whose first character is an ASCII digit is a measure-date
    /// column; anything else can only be the id column.
    pub fn classify(cell: &str) -> Result<Self> {
        match cell.chars().next() {
            None => Err(ProcessingError::MalformedHeader(
                "empty column name in wide header".to_string(),
            )),
            Some(c) if c.is_ascii_digit() => Ok(ColumnRole::MeasureDate),
            Some(_) => Ok(ColumnRole::Id),
        }
    }
}

/// A measure-date column selected for one aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumn {
    pub index: usize,
    pub date: String,
}

/// Classified wide header for one aggregation kind
#[derive(Debug, Clone)]
pub struct WideSchema {
    pub id_index: usize,
    pub id_name: String,
    pub columns: Vec<SelectedColumn>,
}

impl WideSchema {
    pub fn from_header(header: &StringRecord, aggregation: Aggregation) -> Result<Self> {
        let mut id_column: Option<(usize, &str)> = None;
        let mut columns = Vec::new();

        for (index, cell) in header.iter().enumerate() {
            match ColumnRole::classify(cell)? {
                ColumnRole::Id => {
                    if let Some((_, existing)) = id_column {
                        return Err(ProcessingError::MalformedHeader(format!(
                            "ambiguous id column: both '{}' and '{}' start with a non-digit",
                            existing, cell
                        )));
                    }
                    id_column = Some((index, cell));
                }
                ColumnRole::MeasureDate => {
                    if aggregation.matches_column(cell) {
                        let date = first_digit_run(cell).ok_or_else(|| {
                            ProcessingError::MalformedHeader(format!(
                                "no date digits in column '{}'",
                                cell
                            ))
                        })?;
                        columns.push(SelectedColumn {
                            index,
                            date: date.to_string(),
                        });
                    }
                }
            }
        }

        let (id_index, id_name) = id_column.ok_or_else(|| {
            ProcessingError::MalformedHeader(
                "no id column (every column name starts with a digit)".to_string(),
            )
        })?;

        Ok(Self {
            id_index,
            id_name: id_name.to_string(),
            columns,
        })
    }
}

/// First run of ASCII digits anywhere in a header cell
fn first_digit_run(cell: &str) -> Option<&str> {
    let start = cell.find(|c: char| c.is_ascii_digit())?;
    let rest = &cell[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Column positions of a long-format stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongHeader {
    pub id_name: String,
    pub id_index: usize,
    pub date_index: usize,
    pub value_index: usize,
}

impl LongHeader {
    /// The first column is the id column; `date` and `value` must both be present.
    pub fn from_header(header: &StringRecord) -> Result<Self> {
        let position = |name: &str| {
            header.iter().position(|cell| cell == name).ok_or_else(|| {
                ProcessingError::MalformedHeader(format!(
                    "long-format header is missing the '{}' column: {:?}",
                    name,
                    header.iter().collect::<Vec<_>>()
                ))
            })
        };

        let date_index = position(DATE_COLUMN)?;
        let value_index = position(VALUE_COLUMN)?;

        let id_name = header.get(0).unwrap_or_default();
        if header.len() < 3 || id_name == DATE_COLUMN || id_name == VALUE_COLUMN {
            return Err(ProcessingError::MalformedHeader(format!(
                "long-format header needs an id column before '{}' and '{}'",
                DATE_COLUMN, VALUE_COLUMN
            )));
        }

        Ok(Self {
            id_name: id_name.to_string(),
            id_index: 0,
            date_index,
            value_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    #[test]
    fn test_classify_columns() {
        assert_eq!(ColumnRole::classify("GEOID").unwrap(), ColumnRole::Id);
        assert_eq!(
            ColumnRole::classify("20100101_min").unwrap(),
            ColumnRole::MeasureDate
        );
        assert!(ColumnRole::classify("").is_err());
    }

    #[test]
    fn test_wide_schema_selects_matching_columns() {
        let h = header(&["20100101_min", "ZCTA", "20100101_max", "20100102_min"]);
        let schema = WideSchema::from_header(&h, Aggregation::Min).unwrap();

        assert_eq!(schema.id_index, 1);
        assert_eq!(schema.id_name, "ZCTA");
        assert_eq!(
            schema.columns,
            vec![
                SelectedColumn {
                    index: 0,
                    date: "20100101".to_string()
                },
                SelectedColumn {
                    index: 3,
                    date: "20100102".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_wide_schema_without_matches_is_empty() {
        let h = header(&["ZCTA", "20100101_max"]);
        let schema = WideSchema::from_header(&h, Aggregation::Mean).unwrap();
        assert!(schema.columns.is_empty());
    }

    #[test]
    fn test_wide_schema_rejects_missing_or_ambiguous_id() {
        let none = header(&["20100101_min", "20100102_min"]);
        assert!(matches!(
            WideSchema::from_header(&none, Aggregation::Min),
            Err(ProcessingError::MalformedHeader(_))
        ));

        let two = header(&["ZCTA", "name", "20100101_min"]);
        assert!(matches!(
            WideSchema::from_header(&two, Aggregation::Min),
            Err(ProcessingError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_id_column_is_never_selected() {
        // "admin_id" contains "min" but is the id column, not a measure
        let h = header(&["admin_id", "20100101_min"]);
        let schema = WideSchema::from_header(&h, Aggregation::Min).unwrap();
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.columns[0].index, 1);
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_digit_run("20100101_min"), Some("20100101"));
        assert_eq!(first_digit_run("2010_min_0101"), Some("2010"));
        assert_eq!(first_digit_run("tmin_20100101"), Some("20100101"));
        assert_eq!(first_digit_run("GEOID"), None);
    }

    #[test]
    fn test_long_header() {
        let h = header(&["ZCTA", "date", "value"]);
        let long = LongHeader::from_header(&h).unwrap();
        assert_eq!(long.id_name, "ZCTA");
        assert_eq!(long.date_index, 1);
        assert_eq!(long.value_index, 2);
    }

    #[test]
    fn test_long_header_requires_columns() {
        assert!(LongHeader::from_header(&header(&["ZCTA", "date"])).is_err());
        assert!(LongHeader::from_header(&header(&["date", "value"])).is_err());
        assert!(LongHeader::from_header(&header(&["date", "value", "ZCTA"])).is_err());
    }
}
