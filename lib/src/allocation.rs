//! Split allocations derived from raw activity metrics.
//!
//! `primary = floor(floor(transferred * 10^d) * transfer_share) + floor(held * 10^d)`
//! and `secondary = floor(primary * secondary_share)`, all in exact integer
//! arithmetic. Each column then commits to its own tree.

use std::io::{Read, Write};

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use tracing::info;

use crate::error::{AirgrabError, EncodingError, RecordLocation, Result};
use crate::util::{normalize_address, parse_address, parse_scaled, pow10, Rounding};

/// Exact non-negative decimal fraction `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    num: U256,
    den: U256,
}

impl Ratio {
    pub fn parse(s: &str) -> std::result::Result<Self, EncodingError> {
        let frac_digits = s
            .trim()
            .split_once('.')
            .map(|(_, f)| f.trim_end_matches('0').len())
            .unwrap_or(0) as u32;
        let num = parse_scaled(s, frac_digits, Rounding::Exact)?;
        let den = pow10(frac_digits)
            .ok_or_else(|| EncodingError::InvalidAllocation(format!("{s:?}: too many fractional digits")))?;
        Ok(Self { num, den })
    }

    /// `floor(value * self)`.
    pub fn floor_mul(&self, value: U256) -> Option<U256> {
        Some(value.checked_mul(self.num)? / self.den)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationFormula {
    pub decimals: u32,
    pub transfer_share: Ratio,
    pub secondary_share: Ratio,
}

impl Default for AllocationFormula {
    fn default() -> Self {
        let tenth = Ratio { num: U256::from(1u64), den: U256::from(10u64) };
        Self { decimals: 18, transfer_share: tenth, secondary_share: tenth }
    }
}

/// One row of the activity export, metrics as decimal token amounts.
#[derive(Clone, Debug, Deserialize)]
pub struct Activity {
    pub address: String,
    pub amount_transferred: String,
    pub avg_amount_held: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitAllocation {
    pub address: Address,
    pub primary: U256,
    pub secondary: U256,
}

impl AllocationFormula {
    pub fn apply(&self, activity: &Activity) -> std::result::Result<SplitAllocation, EncodingError> {
        let overflow = || EncodingError::InvalidAllocation("derived allocation exceeds uint256".to_string());
        let address = parse_address(&activity.address)?;
        let transferred = parse_scaled(&activity.amount_transferred, self.decimals, Rounding::Floor)?;
        let held = parse_scaled(&activity.avg_amount_held, self.decimals, Rounding::Floor)?;

        let primary = self
            .transfer_share
            .floor_mul(transferred)
            .and_then(|t| t.checked_add(held))
            .ok_or_else(overflow)?;
        let secondary = self.secondary_share.floor_mul(primary).ok_or_else(overflow)?;
        Ok(SplitAllocation { address, primary, secondary })
    }
}

/// Reads an activity CSV (header `address,amount_transferred,avg_amount_held`).
pub fn derive_allocations<R: Read>(reader: R, formula: &AllocationFormula) -> Result<Vec<SplitAllocation>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (i, row) in csv_reader.deserialize::<Activity>().enumerate() {
        let loc = RecordLocation::row(i + 1);
        let activity =
            row.map_err(|e| AirgrabError::encoding(loc.clone(), EncodingError::MalformedCsv(e.to_string())))?;
        let split = formula
            .apply(&activity)
            .map_err(|e| AirgrabError::encoding(loc.with_address(activity.address.clone()), e))?;
        out.push(split);
    }
    if out.is_empty() {
        return Err(AirgrabError::EmptySnapshot);
    }
    info!(records = out.len(), "derived split allocations");
    Ok(out)
}

/// Writes `address,<primary_name>,<secondary_name>` rows.
pub fn write_allocations<W: Write>(
    writer: W,
    rows: &[SplitAllocation],
    primary_name: &str,
    secondary_name: &str,
) -> std::result::Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(["address", primary_name, secondary_name])?;
    for r in rows {
        w.write_record([normalize_address(&r.address), r.primary.to_string(), r.secondary.to_string()])?;
    }
    w.flush()?;
    Ok(())
}
