//! Progressive tax bracket table and the PAYE computation over it.
//!
//! The table is an ordered list of ascending tiers. Each tier covers the
//! income range `[income_from, income_to)`; the last tier is unbounded
//! (`income_to` null) and absorbs all remaining income. The portion of
//! taxable income falling inside a tier is taxed at that tier's rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A single tier of a progressive tax table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Position in the table, ascending from 1.
    pub tier_number: u32,
    /// Inclusive lower bound of the tier's income range.
    pub income_from: Decimal,
    /// Exclusive upper bound; `None` marks the unbounded top tier.
    pub income_to: Option<Decimal>,
    /// Tax rate as a percentage (e.g. `15` for 15%).
    pub tax_rate: Decimal,
}

/// The share of taxable income that fell into one tier, with the tax it
/// attracted. Used for audit breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierPortion {
    /// The tier the portion fell into.
    pub tier_number: u32,
    /// The amount of income taxed at this tier's rate.
    pub taxed_amount: Decimal,
    /// The tier's rate as a percentage.
    pub tax_rate: Decimal,
    /// Tax attracted by this portion.
    pub tax: Decimal,
}

/// An active, validated progressive tax table.
///
/// Constructed once per snapshot. [`TaxBracketTable::validate`] must pass
/// before the table is used; the run executor refuses snapshots whose
/// tables leave income uncovered.
#[derive(Debug, Clone)]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
    effective_from: NaiveDate,
}

impl TaxBracketTable {
    /// Creates a table, ordering tiers by tier number.
    pub fn new(mut brackets: Vec<TaxBracket>, effective_from: NaiveDate) -> Self {
        brackets.sort_by_key(|b| b.tier_number);
        TaxBracketTable {
            brackets,
            effective_from,
        }
    }

    /// The ordered tiers.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// The date this table came into force.
    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    /// Checks that the table covers every non-negative income exactly once:
    /// the first tier starts at zero, tiers are contiguous, and the single
    /// unbounded tier is last.
    pub fn validate(&self) -> EngineResult<()> {
        let first = self
            .brackets
            .first()
            .ok_or_else(|| EngineError::IncompleteBracketCoverage {
                message: "no tax brackets defined".to_string(),
            })?;

        if !first.income_from.is_zero() {
            return Err(EngineError::IncompleteBracketCoverage {
                message: format!(
                    "first tier must start at zero, found {}",
                    first.income_from
                ),
            });
        }

        for pair in self.brackets.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            match lower.income_to {
                None => {
                    return Err(EngineError::IncompleteBracketCoverage {
                        message: format!("unbounded tier {} must be the last tier", lower.tier_number),
                    });
                }
                Some(end) => {
                    if end <= lower.income_from {
                        return Err(EngineError::IncompleteBracketCoverage {
                            message: format!("tier {} has an empty income range", lower.tier_number),
                        });
                    }
                    if end != upper.income_from {
                        return Err(EngineError::IncompleteBracketCoverage {
                            message: format!(
                                "tier {} ends at {} but tier {} starts at {}",
                                lower.tier_number, end, upper.tier_number, upper.income_from
                            ),
                        });
                    }
                }
            }
        }

        let last = &self.brackets[self.brackets.len() - 1];
        if last.income_to.is_some() {
            return Err(EngineError::IncompleteBracketCoverage {
                message: format!(
                    "the top tier {} must be unbounded to cover all income",
                    last.tier_number
                ),
            });
        }

        Ok(())
    }

    /// Splits taxable income across the tiers it falls into.
    ///
    /// Returns one portion per tier touched, in tier order. Non-positive
    /// income touches no tier. If income remains after the last tier (the
    /// table has no unbounded top) the computation fails rather than
    /// undertaxing.
    pub fn tier_portions(&self, taxable_income: Decimal) -> EngineResult<Vec<TierPortion>> {
        if taxable_income <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        let mut remaining = taxable_income;
        let mut portions = Vec::new();

        for bracket in &self.brackets {
            let taxed_amount = match bracket.income_to {
                Some(upper) => (upper - bracket.income_from).min(remaining),
                None => remaining,
            };
            let tax = taxed_amount * bracket.tax_rate / Decimal::ONE_HUNDRED;
            portions.push(TierPortion {
                tier_number: bracket.tier_number,
                taxed_amount,
                tax_rate: bracket.tax_rate,
                tax,
            });
            remaining -= taxed_amount;
            if remaining <= Decimal::ZERO {
                break;
            }
        }

        if remaining > Decimal::ZERO {
            return Err(EngineError::IncompleteBracketCoverage {
                message: format!("{remaining} of taxable income falls above the last tier"),
            });
        }

        Ok(portions)
    }

    /// Total progressive tax due on the given taxable income.
    ///
    /// Non-positive income owes zero tax. The result is unrounded; callers
    /// round when a pipeline step completes.
    pub fn tax_due(&self, taxable_income: Decimal) -> EngineResult<Decimal> {
        let total = self
            .tier_portions(taxable_income)?
            .iter()
            .map(|p| p.tax)
            .sum();
        Ok(total)
    }
}
