//! Totals & freight allocation
//!
//! Aggregates a list of line items into document totals. For incoterms that
//! leave main carriage to the buyer (FOB, EXW, DAP) the flat freight charge is
//! added on top of the merchandise value. For CFR and CIF the charge is spread
//! over the lines in proportion to each line's share of merchandise value and
//! shows up only in the adjusted unit prices; the grand total stays at the
//! merchandise value.
//!
//! An empty item list ships nothing, so it yields an all-zero result with no
//! freight charged.
//!
//! The engine never validates its inputs. Negative, oversized or malformed
//! figures are rejected by the request layer before they get here. Arithmetic
//! saturates at `Decimal::MAX` rather than panicking on whatever slips through.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::LineItem;
use crate::domain::value_objects::Incoterm;

/// Flat freight charge used when nothing else is configured.
pub const DEFAULT_FREIGHT_AMOUNT: Decimal = Decimal::from_parts(250_000, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    pub item: LineItem,
    pub line_total: Decimal,
    pub line_weight: Decimal,
    /// Only present when the incoterm includes freight.
    pub adjusted_unit_price: Option<Decimal>,
}

impl LineTotals {
    /// Unit price as it should be displayed.
    pub fn display_unit_price(&self) -> Decimal {
        self.adjusted_unit_price.unwrap_or(self.item.unit_price)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub incoterm: Incoterm,
    pub total_quantity: Decimal,
    pub total_weight: Decimal,
    pub merchandise_value: Decimal,
    pub freight_amount: Decimal,
    pub grand_total: Decimal,
    pub lines: Vec<LineTotals>,
}

impl DocumentTotals {
    pub fn freight_included(&self) -> bool { self.incoterm.includes_freight() }
}

pub fn compute_totals(items: &[LineItem], incoterm: Incoterm, freight_amount: Decimal) -> DocumentTotals {
    let (total_quantity, total_weight, merchandise_value) = items.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(qty, weight, value), item| {
            (qty.saturating_add(item.quantity), weight.saturating_add(item.line_weight()), value.saturating_add(item.line_total()))
        },
    );

    let freight_amount = if items.is_empty() { Decimal::ZERO } else { freight_amount };
    let freight_included = incoterm.includes_freight();
    let lines = items
        .iter()
        .map(|item| {
            let line_total = item.line_total();
            let adjusted_unit_price = freight_included
                .then(|| item.unit_price.saturating_add(freight_per_unit(item, merchandise_value, freight_amount)));
            LineTotals { item: item.clone(), line_total, line_weight: item.line_weight(), adjusted_unit_price }
        })
        .collect();

    let grand_total = if freight_included { merchandise_value } else { merchandise_value.saturating_add(freight_amount) };

    DocumentTotals { incoterm, total_quantity, total_weight, merchandise_value, freight_amount, grand_total, lines }
}

/// Share of the freight charge carried by one unit of a line.
///
/// `line_total / merchandise * freight / quantity` reduces to
/// `unit_price / merchandise * freight`, and `unit_price / merchandise` never
/// exceeds `1 / quantity`, so the quotient stays small.
fn freight_per_unit(item: &LineItem, merchandise_value: Decimal, freight_amount: Decimal) -> Decimal {
    if merchandise_value.is_zero() || item.quantity.is_zero() {
        return Decimal::ZERO;
    }
    item.unit_price
        .checked_div(merchandise_value)
        .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(freight_amount))
}
