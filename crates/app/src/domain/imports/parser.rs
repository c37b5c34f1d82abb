//! Import file parser.
//!
//! Reads comma-separated product rows into [`CandidateProduct`]s. Columns are located by
//! header name, so their order in the file does not matter. Rows that cannot be parsed are
//! reported as [`ParsedRow::Malformed`] and never stop the rows after them; only a failure of
//! the underlying reader ends the sequence early.

use std::{io::Read, str::FromStr};

use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter};
use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    categories::records::CategoryUuid,
    imports::records::{CandidateProduct, Rejection},
    products::records::ProductUuid,
};

const ID_COLUMN: &str = "Id";
const NAME_COLUMN: &str = "Name";
const DESCRIPTION_COLUMN: &str = "Description";
const PRICE_COLUMN: &str = "Price";
const INVENTORY_LEVEL_COLUMN: &str = "InventoryLevel";
const CATEGORY_COLUMN: &str = "CategoryId";
const IMAGE_URL_COLUMN: &str = "ImageUrl";
const CREATED_AT_COLUMN: &str = "CreatedAt";

/// Fraction digits stored for a price.
pub const PRICE_SCALE: u32 = 2;

/// Smallest price magnitude the `NUMERIC(18,2)` price column cannot hold.
// 10^16, built from raw parts because `Decimal::new` is not `const`.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(0x6FC1_0000, 0x0023_86F2, 0, false, 0);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing required column '{0}'.")]
    MissingColumn(&'static str),

    #[error("Header row could not be read: {0}")]
    InvalidHeader(#[source] csv::Error),

    #[error("failed to read import source")]
    Read(#[source] csv::Error),
}

impl ParseError {
    /// Whether the source itself failed, as opposed to containing bad data.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

/// A row as read from the file, before business rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Candidate(CandidateProduct),
    Malformed(Rejection),
}

/// Lazy sequence of parsed rows. Consumes its reader and cannot be restarted.
pub struct ProductRows<R> {
    columns: Columns,
    width: usize,
    records: StringRecordsIntoIter<R>,
    failed: bool,
}

impl<R> std::fmt::Debug for ProductRows<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRows")
            .field("columns", &self.columns)
            .field("width", &self.width)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

/// Open an import source and locate its columns.
///
/// # Errors
///
/// Returns [`ParseError::MissingColumn`] for the first required column the header lacks, or a
/// read error when the header row itself cannot be read.
pub fn read_products<R: Read>(source: R) -> Result<ProductRows<R>, ParseError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(error) if error.is_io_error() => return Err(ParseError::Read(error)),
        Err(error) => return Err(ParseError::InvalidHeader(error)),
    };

    let columns = Columns::locate(&headers)?;

    Ok(ProductRows {
        columns,
        width: headers.len(),
        records: reader.into_records(),
        failed: false,
    })
}

impl<R: Read> Iterator for ProductRows<R> {
    type Item = Result<ParsedRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let row = match self.records.next()? {
            Ok(record) => Ok(self.columns.parse(&record, self.width)),
            Err(error) if error.is_io_error() => {
                self.failed = true;
                Err(ParseError::Read(error))
            }
            Err(error) => Ok(ParsedRow::Malformed(Rejection::new(
                None,
                smallvec![describe_record_error(&error)],
            ))),
        };

        Some(row)
    }
}

fn describe_record_error(error: &csv::Error) -> String {
    let line = error.position().map(csv::Position::line);

    match (error.kind(), line) {
        (ErrorKind::Utf8 { .. }, Some(line)) => format!("Row on line {line} is not valid UTF-8."),
        (ErrorKind::Utf8 { .. }, None) => "Row is not valid UTF-8.".to_string(),
        (_, _) => format!("Row could not be read: {error}."),
    }
}

#[derive(Debug, Clone)]
struct Columns {
    id: Option<usize>,
    name: usize,
    description: usize,
    price: usize,
    inventory_level: usize,
    category: usize,
    image_url: usize,
    created_at: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, ParseError> {
        let mut positions = FxHashMap::default();

        for (index, header) in headers.iter().enumerate() {
            let key = header.trim_start_matches('\u{feff}').trim().to_ascii_lowercase();
            positions.entry(key).or_insert(index);
        }

        let find = |column: &'static str| positions.get(&column.to_ascii_lowercase()).copied();
        let require = |column: &'static str| find(column).ok_or(ParseError::MissingColumn(column));

        Ok(Self {
            id: find(ID_COLUMN),
            name: require(NAME_COLUMN)?,
            description: require(DESCRIPTION_COLUMN)?,
            price: require(PRICE_COLUMN)?,
            inventory_level: require(INVENTORY_LEVEL_COLUMN)?,
            category: require(CATEGORY_COLUMN)?,
            image_url: require(IMAGE_URL_COLUMN)?,
            created_at: require(CREATED_AT_COLUMN)?,
        })
    }

    fn parse(&self, record: &StringRecord, width: usize) -> ParsedRow {
        let name = cell(record, self.name);

        if record.len() != width {
            return ParsedRow::Malformed(Rejection::new(
                Some(name),
                smallvec![format!(
                    "Expected {width} columns but found {}.",
                    record.len()
                )],
            ));
        }

        let mut problems: SmallVec<[String; 4]> = SmallVec::new();

        let uuid = self
            .id
            .and_then(|index| optional(cell(record, index)))
            .map(|value| parse_value::<Uuid>(ID_COLUMN, value, "UUID"))
            .transpose();
        let price = parse_price(cell(record, self.price));
        let inventory_level = parse_value::<i32>(
            INVENTORY_LEVEL_COLUMN,
            cell(record, self.inventory_level),
            "integer",
        );
        let category = optional(cell(record, self.category))
            .map(|value| parse_value::<Uuid>(CATEGORY_COLUMN, value, "UUID"))
            .transpose();
        let created_at = optional(cell(record, self.created_at))
            .map(parse_timestamp)
            .transpose();

        let uuid = collect(&mut problems, uuid);
        let price = collect(&mut problems, price);
        let inventory_level = collect(&mut problems, inventory_level);
        let category = collect(&mut problems, category);
        let created_at = collect(&mut problems, created_at);

        match (uuid, price, inventory_level, category, created_at) {
            (Some(uuid), Some(price), Some(inventory_level), Some(category), Some(created_at)) => {
                ParsedRow::Candidate(CandidateProduct {
                    uuid: uuid.map(ProductUuid::from_uuid),
                    name: name.to_string(),
                    description: optional(cell(record, self.description)).map(str::to_string),
                    price,
                    inventory_level,
                    category_uuid: category.map_or_else(CategoryUuid::nil, CategoryUuid::from_uuid),
                    image_url: optional(cell(record, self.image_url)).map(str::to_string),
                    created_at,
                })
            }
            _ => ParsedRow::Malformed(Rejection::new(Some(name), problems)),
        }
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

fn optional(value: &str) -> Option<&str> {
    let value = value.trim();

    (!value.is_empty()).then_some(value)
}

fn collect<T>(problems: &mut SmallVec<[String; 4]>, result: Result<T, String>) -> Option<T> {
    result.map_err(|problem| problems.push(problem)).ok()
}

fn parse_value<T: FromStr>(column: &str, value: &str, expected: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{column} '{value}' is not a valid {expected}."))
}

/// A decimal that fits the price column without rounding.
fn parse_price(value: &str) -> Result<Decimal, String> {
    let price = parse_value::<Decimal>(PRICE_COLUMN, value, "decimal")?;

    if price.normalize().scale() > PRICE_SCALE {
        return Err(format!(
            "{PRICE_COLUMN} '{value}' is not a valid decimal with {PRICE_SCALE} fraction digits."
        ));
    }

    if price.abs() >= PRICE_LIMIT {
        return Err(format!("{PRICE_COLUMN} '{value}' is too large."));
    }

    Ok(price)
}

/// RFC 3339 instants, or civil date-times which are read as UTC.
fn parse_timestamp(value: &str) -> Result<Timestamp, String> {
    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Ok(timestamp);
    }

    value
        .parse::<DateTime>()
        .and_then(|civil| civil.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(|_| format!("{CREATED_AT_COLUMN} '{value}' is not a valid ISO-8601 timestamp."))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use testresult::TestResult;

    use super::*;

    const HEADER: &str = "Id,Name,Description,Price,InventoryLevel,CategoryId,ImageUrl,CreatedAt,UpdatedAt";
    const CATEGORY: &str = "0191a3c4-2f5e-7c8d-9e0f-1a2b3c4d5e6f";

    fn parse_all(input: &str) -> Result<Vec<ParsedRow>, ParseError> {
        read_products(Cursor::new(input.to_string()))?.collect()
    }

    fn single(input: &str) -> Result<ParsedRow, Box<dyn std::error::Error>> {
        let mut rows = parse_all(input)?;

        assert_eq!(rows.len(), 1, "expected exactly one row");

        rows.pop().ok_or_else(|| "no row".into())
    }

    #[test]
    fn parses_complete_row() -> TestResult {
        let input = format!(
            "{HEADER}\n0191a3c4-0000-7000-8000-000000000001,Desk Lamp,Warm light,19.99,12,{CATEGORY},https://img/lamp.png,2024-06-19T15:22:45Z,2024-07-01T00:00:00Z\n"
        );

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert_eq!(
            product.uuid.map(|uuid| uuid.to_string()).as_deref(),
            Some("0191a3c4-0000-7000-8000-000000000001")
        );
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.description.as_deref(), Some("Warm light"));
        assert_eq!(product.price, Decimal::new(1999, 2));
        assert_eq!(product.inventory_level, 12);
        assert_eq!(product.category_uuid.to_string(), CATEGORY);
        assert_eq!(product.image_url.as_deref(), Some("https://img/lamp.png"));
        assert_eq!(product.created_at, Some("2024-06-19T15:22:45Z".parse::<Timestamp>()?));

        Ok(())
    }

    #[test]
    fn column_order_and_header_case_do_not_matter() -> TestResult {
        let input = format!(
            " categoryid ,PRICE,name,inventorylevel,imageurl,createdat,description\n{CATEGORY},5,Mug,3,,,\n"
        );

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert_eq!(product.name, "Mug");
        assert_eq!(product.price, Decimal::new(5, 0));
        assert_eq!(product.category_uuid.to_string(), CATEGORY);
        assert!(product.uuid.is_none(), "Id column is optional");

        Ok(())
    }

    #[test]
    fn empty_optional_cells_are_absent_and_empty_category_is_nil() -> TestResult {
        let input = format!("{HEADER}\n,Mug,,1.50,3,,,,\n");

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert!(product.uuid.is_none());
        assert!(product.description.is_none());
        assert!(product.image_url.is_none());
        assert!(product.created_at.is_none());
        assert!(product.category_uuid.is_nil());

        Ok(())
    }

    #[test]
    fn timestamp_without_offset_is_utc() -> TestResult {
        let input = format!("{HEADER}\n,Mug,,1,1,{CATEGORY},,2024-06-19T15:22:45.123,\n");

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert_eq!(product.created_at, Some("2024-06-19T15:22:45.123Z".parse::<Timestamp>()?));

        Ok(())
    }

    #[test]
    fn negative_values_reach_the_validator() -> TestResult {
        let input = format!("{HEADER}\n,Mug,,-1,-5,{CATEGORY},,,\n");

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert_eq!(product.price, Decimal::NEGATIVE_ONE);
        assert_eq!(product.inventory_level, -5);

        Ok(())
    }

    #[test]
    fn unparsable_cells_are_all_reported() -> TestResult {
        let input = format!("{HEADER}\nnot-a-uuid,Mug,,abc,1.5,{CATEGORY},,yesterday,\n");

        let ParsedRow::Malformed(rejection) = single(&input)? else {
            panic!("expected a malformed row");
        };

        assert_eq!(rejection.label, "Mug");
        assert_eq!(
            rejection.violations.to_vec(),
            vec![
                "Id 'not-a-uuid' is not a valid UUID.".to_string(),
                "Price 'abc' is not a valid decimal.".to_string(),
                "InventoryLevel '1.5' is not a valid integer.".to_string(),
                "CreatedAt 'yesterday' is not a valid ISO-8601 timestamp.".to_string(),
            ]
        );

        Ok(())
    }

    #[test]
    fn price_with_more_than_two_fraction_digits_is_malformed() -> TestResult {
        let input = format!("{HEADER}\n,Mug,,1.005,1,{CATEGORY},,,\n");

        let ParsedRow::Malformed(rejection) = single(&input)? else {
            panic!("expected a malformed row");
        };

        assert_eq!(
            rejection.violations.to_vec(),
            vec!["Price '1.005' is not a valid decimal with 2 fraction digits.".to_string()]
        );

        Ok(())
    }

    #[test]
    fn trailing_zero_fraction_digits_are_accepted() -> TestResult {
        let input = format!("{HEADER}\n,Mug,,1.5000,1,{CATEGORY},,,\n");

        let ParsedRow::Candidate(product) = single(&input)? else {
            panic!("expected a candidate row");
        };

        assert_eq!(product.price, Decimal::new(15, 1));

        Ok(())
    }

    #[test]
    fn price_beyond_column_range_is_malformed() -> TestResult {
        let input = format!(
            "{HEADER}\n,Mug,,12345678901234567.00,1,{CATEGORY},,,\n,Crate,,9999999999999999.99,1,{CATEGORY},,,\n"
        );

        let rows = parse_all(&input)?;

        assert!(
            matches!(&rows[0], ParsedRow::Malformed(r) if r.violations[0] == "Price '12345678901234567.00' is too large."),
            "got {:?}",
            rows[0]
        );
        assert!(
            matches!(&rows[1], ParsedRow::Candidate(p) if p.price == Decimal::new(999_999_999_999_999_999, 2)),
            "largest storable price should be accepted, got {:?}",
            rows[1]
        );

        Ok(())
    }

    #[test]
    fn wrong_column_count_does_not_stop_later_rows() -> TestResult {
        let input = format!("{HEADER}\n,Short,1\n,Mug,,1,1,{CATEGORY},,,\n");

        let rows = parse_all(&input)?;

        assert_eq!(rows.len(), 2);
        assert!(
            matches!(&rows[0], ParsedRow::Malformed(r) if r.violations[0] == "Expected 9 columns but found 3."),
            "got {:?}",
            rows[0]
        );
        assert!(matches!(rows[1], ParsedRow::Candidate(_)));

        Ok(())
    }

    #[test]
    fn invalid_utf8_row_is_rejected_and_parsing_continues() -> TestResult {
        let mut input = format!("{HEADER}\n,").into_bytes();
        input.extend_from_slice(&[0xff, 0xfe]);
        input.extend_from_slice(format!(",,1,1,{CATEGORY},,,\n,Mug,,1,1,{CATEGORY},,,\n").as_bytes());

        let rows: Vec<ParsedRow> = read_products(Cursor::new(input))?.collect::<Result<_, _>>()?;

        assert_eq!(rows.len(), 2);
        assert!(
            matches!(&rows[0], ParsedRow::Malformed(r) if r.label == "Unnamed" && r.violations[0].contains("UTF-8")),
            "got {:?}",
            rows[0]
        );
        assert!(matches!(rows[1], ParsedRow::Candidate(_)));

        Ok(())
    }

    #[test]
    fn missing_required_column_is_reported_by_name() {
        let result = read_products(Cursor::new("Name,Description,Price,InventoryLevel,ImageUrl,CreatedAt\n"));

        let Err(error) = result else {
            panic!("expected a missing column error");
        };

        assert_eq!(error.to_string(), "Missing required column 'CategoryId'.");
        assert!(!error.is_read_failure());
    }

    #[test]
    fn empty_source_is_missing_the_name_column() {
        let result = read_products(Cursor::new(""));

        assert!(
            matches!(result, Err(ParseError::MissingColumn("Name"))),
            "got {:?}",
            result.map(|_| ())
        );
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("disk gone"));
            }

            self.served = true;
            let header = format!("{HEADER}\n");
            let bytes = header.as_bytes();
            buf[..bytes.len()].copy_from_slice(bytes);

            Ok(bytes.len())
        }
    }

    #[test]
    fn read_failure_is_fatal_and_ends_the_sequence() -> TestResult {
        let mut rows = read_products(FailingReader { served: false })?;

        let first = rows.next();

        assert!(
            matches!(first, Some(Err(ParseError::Read(_)))),
            "expected a read error, got {first:?}"
        );
        assert!(rows.next().is_none(), "sequence should end after a read failure");

        Ok(())
    }
}
