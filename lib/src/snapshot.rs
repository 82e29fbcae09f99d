//! Snapshot CSV reading.
//!
//! Accepts the headerless two-column `address,amount` files as well as wider
//! exports with named columns, optionally cross-checking component columns
//! against a declared total.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::encode::Record;
use crate::error::{AirgrabError, EncodingError, RecordLocation, Result};
use crate::util::{normalize_address, parse_address, parse_amount};

const ADDRESS_ALIASES: &[&str] = &["address", "account", "wallet", "owner"];
const AMOUNT_ALIASES: &[&str] = &["allocation", "amount", "total", "value"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the build on the second occurrence of an address.
    #[default]
    Reject,
    /// Sum the amounts of all rows sharing an address.
    Merge,
}

#[derive(Clone, Debug, Default)]
pub struct SnapshotOptions {
    pub address_column: Option<String>,
    pub amount_column: Option<String>,
    /// Columns that must sum exactly to the amount column.
    pub components: Vec<String>,
    /// Scale applied to every amount (`0` = already in smallest units).
    pub decimals: u32,
    pub duplicates: DuplicatePolicy,
}

/// Validated, duplicate-free records of one distribution round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    /// Validates address uniqueness; rejects an empty record set.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(AirgrabError::EmptySnapshot);
        }
        let mut seen: BTreeMap<Address, usize> = BTreeMap::new();
        for (i, r) in records.iter().enumerate() {
            if let Some(first) = seen.insert(r.address, i + 1) {
                return Err(AirgrabError::encoding(
                    RecordLocation::row(i + 1).with_address(r.address_hex()),
                    EncodingError::DuplicateAddress { address: r.address_hex(), first_row: first },
                ));
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total(&self) -> Option<U256> {
        self.records.iter().try_fold(U256::ZERO, |acc, r| acc.checked_add(r.amount))
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

fn canonical_column(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

struct Columns {
    address: usize,
    amount: usize,
    components: Vec<usize>,
    /// Every data row must have exactly this many fields.
    width: usize,
}

impl Columns {
    fn resolve(header: &csv::StringRecord, opts: &SnapshotOptions) -> Result<Self> {
        let names: Vec<String> = header.iter().map(canonical_column).collect();
        let find = |wanted: &str| names.iter().position(|n| *n == canonical_column(wanted));
        let missing = |name: &str| {
            AirgrabError::encoding(RecordLocation::default(), EncodingError::MissingColumn(name.to_string()))
        };
        let pick = |explicit: &Option<String>, aliases: &[&str], label: &str| -> Result<usize> {
            match explicit {
                Some(name) => find(name.as_str()).ok_or_else(|| missing(name.as_str())),
                None => aliases.iter().find_map(|&a| find(a)).ok_or_else(|| missing(label)),
            }
        };

        let address = pick(&opts.address_column, ADDRESS_ALIASES, "address")?;
        let amount = pick(&opts.amount_column, AMOUNT_ALIASES, "allocation")?;
        let components = opts
            .components
            .iter()
            .map(|c| find(c.as_str()).ok_or_else(|| missing(c.as_str())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { address, amount, components, width: header.len() })
    }

    fn headerless(opts: &SnapshotOptions) -> Result<Self> {
        if opts.address_column.is_some() || opts.amount_column.is_some() || !opts.components.is_empty() {
            return Err(AirgrabError::encoding(
                RecordLocation::default(),
                EncodingError::MissingColumn("named columns require a header row".to_string()),
            ));
        }
        Ok(Self { address: 0, amount: 1, components: vec![], width: 2 })
    }
}

fn looks_like_address(cell: &str) -> bool {
    cell.starts_with("0x") || cell.starts_with("0X") || parse_address(cell).is_ok()
}

fn field<'r>(row: &'r csv::StringRecord, idx: usize, loc: &RecordLocation) -> Result<&'r str> {
    row.get(idx).ok_or_else(|| {
        AirgrabError::encoding(loc.clone(), EncodingError::MalformedCsv(format!("missing field {}", idx + 1)))
    })
}

fn parse_row(row: &csv::StringRecord, n: usize, cols: &Columns, opts: &SnapshotOptions) -> Result<Record> {
    let loc = RecordLocation::row(n);
    if row.len() != cols.width {
        return Err(AirgrabError::encoding(
            loc,
            EncodingError::MalformedCsv(format!("expected {} fields, got {}", cols.width, row.len())),
        ));
    }
    let raw_address = field(row, cols.address, &loc)?;
    let loc = loc.with_address(raw_address.trim());
    let at = |e: EncodingError| AirgrabError::encoding(loc.clone(), e);

    let address = parse_address(raw_address).map_err(at)?;
    let amount = parse_amount(field(row, cols.amount, &loc)?, opts.decimals).map_err(at)?;

    if !cols.components.is_empty() {
        let mut sum = U256::ZERO;
        for &c in &cols.components {
            let part = parse_amount(field(row, c, &loc)?, opts.decimals).map_err(at)?;
            sum = sum
                .checked_add(part)
                .ok_or_else(|| at(EncodingError::InvalidAllocation("component sum exceeds uint256".to_string())))?;
        }
        if sum != amount {
            return Err(at(EncodingError::InconsistentComponents {
                components: sum.to_string(),
                total: amount.to_string(),
            }));
        }
    }
    Ok(Record::new(address, amount))
}

/// Reads and validates a snapshot from CSV.
pub fn read_snapshot<R: Read>(reader: R, opts: &SnapshotOptions) -> Result<Snapshot> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns: Option<Columns> = None;
    let mut merged: Vec<Record> = Vec::new();
    let mut seen: BTreeMap<Address, (usize, usize)> = BTreeMap::new();
    let mut data_row = 0usize;
    let mut zero_amounts = 0usize;
    let mut merges = 0usize;

    for row in csv_reader.records() {
        let row = row.map_err(|e| {
            AirgrabError::encoding(RecordLocation::row(data_row + 1), EncodingError::MalformedCsv(e.to_string()))
        })?;
        if row.iter().all(|f| f.is_empty()) {
            continue;
        }

        if columns.is_none() {
            if !looks_like_address(row.get(0).unwrap_or_default()) {
                debug!(header = ?row, "snapshot has a header row");
                columns = Some(Columns::resolve(&row, opts)?);
                continue;
            }
            columns = Some(Columns::headerless(opts)?);
        }
        let Some(cols) = columns.as_ref() else { continue };

        data_row += 1;
        let record = parse_row(&row, data_row, cols, opts)?;
        if record.amount.is_zero() {
            zero_amounts += 1;
        }

        match seen.get(&record.address) {
            None => {
                seen.insert(record.address, (data_row, merged.len()));
                merged.push(record);
            }
            Some(&(first_row, slot)) => match opts.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(AirgrabError::encoding(
                        RecordLocation::row(data_row).with_address(record.address_hex()),
                        EncodingError::DuplicateAddress { address: record.address_hex(), first_row },
                    ));
                }
                DuplicatePolicy::Merge => {
                    let existing = &mut merged[slot];
                    existing.amount = existing.amount.checked_add(record.amount).ok_or_else(|| {
                        AirgrabError::encoding(
                            RecordLocation::row(data_row).with_address(record.address_hex()),
                            EncodingError::InvalidAllocation("merged amount exceeds uint256".to_string()),
                        )
                    })?;
                    merges += 1;
                    debug!(address = %normalize_address(&record.address), row = data_row, first_row, "merged duplicate address");
                }
            },
        }
    }

    if merges > 0 {
        warn!(merges, "merged duplicate address rows");
    }
    if zero_amounts > 0 {
        warn!(zero_amounts, "snapshot contains zero allocations");
    }
    info!(rows = data_row, records = merged.len(), "read snapshot");
    Snapshot::from_records(merged)
}

pub fn read_snapshot_file(path: &Path, opts: &SnapshotOptions) -> Result<Snapshot> {
    let file = std::fs::File::open(path).map_err(|e| AirgrabError::io(path, e))?;
    read_snapshot(std::io::BufReader::new(file), opts)
}
