//! Peso conversions against a single quote's sell price

use crate::core::quote::{CurrencyQuote, REAL_BLUE, Snapshot};
use rust_decimal::{Decimal, RoundingStrategy};

pub struct Converter<'a> {
    quote: &'a CurrencyQuote,
}

impl<'a> Converter<'a> {
    pub fn new(quote: &'a CurrencyQuote) -> Self {
        Self { quote }
    }

    /// The snapshot's default currency: Real Blue when known, else the first dollar.
    pub fn default_for(snapshot: &'a Snapshot) -> Option<Self> {
        snapshot
            .real_blue
            .as_ref()
            .or_else(|| snapshot.dollars.first())
            .map(Self::new)
    }

    /// Looks up `label` in the snapshot, falling back to the default selection.
    pub fn select(snapshot: &'a Snapshot, label: Option<&str>) -> Option<Self> {
        match label {
            Some(label) => snapshot.find(label).map(Self::new),
            None => Self::default_for(snapshot),
        }
    }

    pub fn quote(&self) -> &CurrencyQuote {
        self.quote
    }

    /// `None` when the product does not fit in a `Decimal`.
    pub fn to_pesos(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.quote.sell).map(round)
    }

    pub fn from_pesos(&self, pesos: Decimal) -> Option<Decimal> {
        if self.quote.sell.is_zero() {
            return None;
        }
        pesos.checked_div(self.quote.sell).map(round)
    }

    pub fn is_real_blue(&self) -> bool {
        self.quote.name == REAL_BLUE
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
