//! Exact decimal statistics over one column of CSV text.
//!
//! The text is handed over already read; this module does no I/O. The first
//! non-blank line is the header, the target column is found by exact name and
//! every following non-blank line contributes one value. Rows that cannot be
//! used are skipped and reported, never fatal.
use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::amount::{DecimalParseError, parse_decimal};

/// Default number of fraction digits of an on-chain amount.
pub const STELLAR_DECIMAL_PLACES: u32 = 7;
pub const DEFAULT_AMOUNT_COLUMN: &str = "amount";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    Empty,
    NonNumeric,
    Negative,
    OutOfRange,
    /// Adding the value would overflow the running total or round it.
    Overflow,
    ColumnNotFound,
    Malformed,
    /// Accepted, but with more fraction digits than allowed.
    ExcessPrecision { places: u32, max: u32 },
}

impl fmt::Display for RowIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty value"),
            Self::NonNumeric => f.write_str("value is not a number"),
            Self::Negative => f.write_str("value is negative"),
            Self::OutOfRange => f.write_str("value is out of range"),
            Self::Overflow => f.write_str("total would overflow"),
            Self::ColumnNotFound => f.write_str("column not found"),
            Self::Malformed => f.write_str("malformed CSV row"),
            Self::ExcessPrecision { places, max } => {
                write!(f, "{places} decimal places, more than {max}")
            }
        }
    }
}

/// A problem with one CSV row. `line` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub line: u64,
    pub value: String,
    pub kind: RowIssueKind,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ('{}')", self.line, self.kind, self.value)
    }
}

/// Exact statistics of the accepted values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub column: String,
    pub total: Decimal,
    /// `total / valid_row_count`, 0 when nothing was accepted.
    pub average: Decimal,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub valid_row_count: usize,
    pub invalid_row_count: usize,
    pub per_row_errors: Vec<RowIssue>,
    pub precision_warnings: Vec<RowIssue>,
}

impl Aggregate {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            total: Decimal::ZERO,
            average: Decimal::ZERO,
            min: None,
            max: None,
            valid_row_count: 0,
            invalid_row_count: 0,
            per_row_errors: Vec::new(),
            precision_warnings: Vec::new(),
        }
    }

    fn reject(&mut self, line: u64, value: &str, kind: RowIssueKind) {
        self.invalid_row_count += 1;
        self.per_row_errors.push(RowIssue {
            line,
            value: value.to_string(),
            kind,
        });
    }

    fn accept(&mut self, line: u64, value: &str, amount: Decimal) {
        let Some(total) = self
            .total
            .checked_add(amount)
            .filter(|sum| !rounded_away(self.total, amount, *sum))
        else {
            self.reject(line, value, RowIssueKind::Overflow);
            return;
        };
        self.total = total;
        self.valid_row_count += 1;
        self.min = Some(self.min.map_or(amount, |min| min.min(amount)));
        self.max = Some(self.max.map_or(amount, |max| max.max(amount)));
    }

    fn finish(mut self) -> Self {
        if self.valid_row_count > 0 {
            self.average = self
                .total
                .checked_div(Decimal::from(self.valid_row_count))
                .unwrap_or_default()
                .normalize();
        }
        self
    }
}

/// `true` when `sum` lost digits of `lhs + rhs`. A sum past 28 significant
/// digits is rescaled and rounded instead of failing.
fn rounded_away(lhs: Decimal, rhs: Decimal, sum: Decimal) -> bool {
    let scale = sum.scale();
    if scale >= lhs.scale().max(rhs.scale()) {
        return false;
    }
    let dropped = |d: Decimal| d - d.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let lost = dropped(lhs) + dropped(rhs);
    lost != lost.round_dp(scale)
}

/// A whitespace-only line. A row of bare delimiters is not blank: it has
/// fields, all empty.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0) == Some("")
}

fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map_or(fallback, |p| p.line())
}

/// Aggregates `column` over CSV `input`.
///
/// Values with more than `max_decimal_places` significant fraction digits are
/// summed anyway and reported in [`Aggregate::precision_warnings`].
///
/// ```rust
/// use engine::aggregator::aggregate;
///
/// let stats = aggregate("amount\n1.5\n2.25\nx\n", "amount", 7);
/// assert_eq!(stats.total.to_string(), "3.75");
/// assert_eq!(stats.invalid_row_count, 1);
/// ```
pub fn aggregate(input: &str, column: &str, max_decimal_places: u32) -> Aggregate {
    let mut out = Aggregate::empty(column);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let mut column_index: Option<Option<usize>> = None;
    for (n, result) in reader.records().enumerate() {
        let fallback_line = n as u64 + 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("skipping malformed CSV row: {err}");
                out.reject(fallback_line, "", RowIssueKind::Malformed);
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }
        let line = line_of(&record, fallback_line);

        let Some(index) = column_index else {
            let found = record.iter().position(|name| name == column);
            if found.is_none() {
                tracing::warn!(column, "amount column not found in CSV header");
            }
            column_index = Some(found);
            continue;
        };
        let Some(index) = index else {
            out.reject(line, "", RowIssueKind::ColumnNotFound);
            continue;
        };

        let value = record.get(index).unwrap_or("");
        match parse_decimal(value) {
            Err(DecimalParseError::Empty) => out.reject(line, value, RowIssueKind::Empty),
            Err(DecimalParseError::NonNumeric) => out.reject(line, value, RowIssueKind::NonNumeric),
            Err(DecimalParseError::OutOfRange) => out.reject(line, value, RowIssueKind::OutOfRange),
            Ok(parsed) if parsed.value() < Decimal::ZERO => {
                out.reject(line, value, RowIssueKind::Negative)
            }
            Ok(parsed) => {
                if parsed.decimal_places() > max_decimal_places {
                    out.precision_warnings.push(RowIssue {
                        line,
                        value: value.to_string(),
                        kind: RowIssueKind::ExcessPrecision {
                            places: parsed.decimal_places(),
                            max: max_decimal_places,
                        },
                    });
                }
                out.accept(line, value, parsed.value());
            }
        }
    }
    out.finish()
}

/// Same as [`aggregate`], for input already split into lines.
pub fn aggregate_lines<'a, I>(lines: I, column: &str, max_decimal_places: u32) -> Aggregate
where
    I: IntoIterator<Item = &'a str>,
{
    let input = lines.into_iter().collect::<Vec<_>>().join("\n");
    aggregate(&input, column, max_decimal_places)
}
