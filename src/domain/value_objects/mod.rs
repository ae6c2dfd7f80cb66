//! Value objects shared by trade documents, quotes and orders

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidationError;

use crate::InovalogError;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, InovalogError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(InovalogError::Validation("SKU empty".into())); }
        if value.len() > 50 { return Err(InovalogError::Validation("SKU too long".into())); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Sku {
    type Error = InovalogError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Delivery term. Only CFR and CIF put main carriage on the seller's price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Incoterm {
    #[default]
    Fob,
    Exw,
    Dap,
    Cfr,
    Cif,
}

impl Incoterm {
    pub const ALL: [Incoterm; 5] = [Self::Fob, Self::Exw, Self::Dap, Self::Cfr, Self::Cif];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fob => "fob",
            Self::Exw => "exw",
            Self::Dap => "dap",
            Self::Cfr => "cfr",
            Self::Cif => "cif",
        }
    }

    pub fn includes_freight(&self) -> bool { matches!(self, Self::Cfr | Self::Cif) }
}

impl FromStr for Incoterm {
    type Err = InovalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|term| term.as_str() == wanted)
            .ok_or_else(|| InovalogError::Validation(format!("unknown incoterm '{}'", s.trim())))
    }
}

impl fmt::Display for Incoterm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.as_str().to_uppercase()) }
}

/// Display language for rendered documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl FromStr for Locale {
    type Err = InovalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" => Ok(Self::En),
            "pt" | "pt-br" => Ok(Self::Pt),
            other => Err(InovalogError::Validation(format!("unsupported locale '{}'", other))),
        }
    }
}

/// `$` followed by exactly two decimals, midpoint rounded away from zero.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

pub fn format_weight(kg: Decimal) -> String {
    format!("{:.2} kg", kg.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Largest accepted quantity, weight or price: one trillion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Most decimal places accepted on an input figure.
pub const MAX_SCALE: u32 = 6;

/// Input figures must be non-negative, at most [`MAX_AMOUNT`] and carry at most
/// [`MAX_SCALE`] decimals. Within these bounds totals of any request body fit in
/// a `Decimal`.
pub fn amount_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("too_large"));
    }
    if value.normalize().scale() > MAX_SCALE {
        return Err(ValidationError::new("too_precise"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_sku() { let sku = Sku::new(" prod-001 ").unwrap(); assert_eq!(sku.as_str(), "PROD-001"); }
    #[test]
    fn test_sku_rejects_blank() { assert!(Sku::new("  ").is_err()); }

    #[test]
    fn test_incoterm_parsing() {
        assert_eq!("CIF".parse::<Incoterm>().unwrap(), Incoterm::Cif);
        assert_eq!(" fob ".parse::<Incoterm>().unwrap(), Incoterm::Fob);
        assert!("ddp".parse::<Incoterm>().is_err());
        assert!(Incoterm::Cfr.includes_freight());
        assert!(!Incoterm::Dap.includes_freight());
        assert_eq!(serde_json::to_string(&Incoterm::Exw).unwrap(), "\"exw\"");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(21400, 0)), "$21400.00");
        assert_eq!(format_money(Decimal::new(509523, 4)), "$50.95");
        assert_eq!(format_money(Decimal::new(1125, 3)), "$1.13");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::new(-5, 0)), "-$5.00");
    }

    #[test]
    fn test_amount_bounds() {
        assert!(amount_in_range(&Decimal::ZERO).is_ok());
        assert!(amount_in_range(&MAX_AMOUNT).is_ok());
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000, 0));
        assert!(amount_in_range(&Decimal::new(12_5000, 4)).is_ok());
        assert!(amount_in_range(&Decimal::new(-1, 2)).is_err());
        assert!(amount_in_range(&(MAX_AMOUNT + Decimal::ONE)).is_err());
        assert!(amount_in_range(&Decimal::MAX).is_err());
        assert!(amount_in_range(&Decimal::new(1, 7)).is_err());
    }
}
