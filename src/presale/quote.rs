use alloy::primitives::{
    U256,
    utils::{ParseUnits, parse_units},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Amounts are carried as 18-decimal fixed point values.
const UNITS: &str = "ether";
const DECIMALS: u32 = 18;
const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Eth,
    Usdt,
    Usdc,
    Usd1,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Eth, Currency::Usdt, Currency::Usdc, Currency::Usd1];

    pub fn label(self) -> &'static str {
        match self {
            Currency::Eth => "ETH",
            Currency::Usdt => "USDT",
            Currency::Usdc => "USDC",
            Currency::Usd1 => "USD1",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Currency::Eth => Currency::Usdt,
            Currency::Usdt => Currency::Usdc,
            Currency::Usdc => Currency::Usd1,
            Currency::Usd1 => Currency::Eth,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Currency::Eth => Currency::Usd1,
            Currency::Usdt => Currency::Eth,
            Currency::Usdc => Currency::Usdt,
            Currency::Usd1 => Currency::Usdc,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Eth
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tokens granted per whole unit of the payment currency, and the smallest
/// accepted payment (decimal string, e.g. `"0.1"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub rate: u64,
    pub min: String,
}

impl CurrencyRate {
    fn new(rate: u64, min: &str) -> Self {
        Self {
            rate,
            min: min.to_string(),
        }
    }

    fn min_units(&self) -> U256 {
        parse_amount(&self.min).unwrap_or(U256::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub eth: CurrencyRate,
    pub usdt: CurrencyRate,
    pub usdc: CurrencyRate,
    pub usd1: CurrencyRate,
    /// Presale bonus in basis points of the base allocation.
    pub bonus_bps: u64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            eth: CurrencyRate::new(225_000, "0.1"),
            usdt: CurrencyRate::new(88, "200"),
            usdc: CurrencyRate::new(88, "200"),
            usd1: CurrencyRate::new(88, "200"),
            bonus_bps: 1_000,
        }
    }
}

impl RateTable {
    pub fn get(&self, currency: Currency) -> &CurrencyRate {
        match currency {
            Currency::Eth => &self.eth,
            Currency::Usdt => &self.usdt,
            Currency::Usdc => &self.usdc,
            Currency::Usd1 => &self.usd1,
        }
    }

    /// First currency whose minimum is not a non-negative decimal amount.
    pub fn invalid_minimum(&self) -> Option<(Currency, &str)> {
        Currency::ALL
            .into_iter()
            .map(|currency| (currency, self.get(currency)))
            .find(|(_, rate)| parse_amount(&rate.min).is_none())
            .map(|(currency, rate)| (currency, rate.min.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub currency: Currency,
    pub amount: U256,
    pub base: U256,
    pub bonus: U256,
    pub total: U256,
}

impl Quote {
    pub fn compute(rates: &RateTable, currency: Currency, input: &str) -> QuoteOutcome {
        let Some(amount) = parse_amount(input) else {
            return QuoteOutcome::Empty;
        };
        if amount.is_zero() {
            return QuoteOutcome::Empty;
        }

        let rate = rates.get(currency);
        if amount < rate.min_units() {
            return QuoteOutcome::BelowMinimum {
                currency,
                minimum: rate.min_units(),
            };
        }

        let base = amount.saturating_mul(U256::from(rate.rate));
        let bonus = base.saturating_mul(U256::from(rates.bonus_bps)) / U256::from(BPS_DENOMINATOR);
        let total = base.saturating_add(bonus);
        debug!(%currency, base = %format_amount(base), bonus = %format_amount(bonus), "priced quote");
        QuoteOutcome::Priced(Quote {
            currency,
            amount,
            base,
            bonus,
            total,
        })
    }

    /// `You send` line of the purchase summary.
    pub fn payment(&self) -> String {
        format!("{} {}", format_amount(self.amount), self.currency.label())
    }

    pub fn breakdown(&self, symbol: &str) -> String {
        format!(
            "{} {symbol} base + {} {symbol} bonus",
            format_amount(self.base),
            format_amount(self.bonus)
        )
    }

    pub fn allocation(&self, symbol: &str) -> String {
        format!(
            "{} {symbol} (+{} bonus)",
            format_amount(self.total),
            format_amount(self.bonus)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// Nothing usable was entered: blank, non-numeric, zero or negative.
    Empty,
    BelowMinimum { currency: Currency, minimum: U256 },
    Priced(Quote),
}

impl QuoteOutcome {
    pub fn display(&self, symbol: &str) -> String {
        match self {
            QuoteOutcome::Priced(quote) => quote.allocation(symbol),
            QuoteOutcome::Empty | QuoteOutcome::BelowMinimum { .. } => format!("0 {symbol}"),
        }
    }

    /// Inline message shown while the user types.
    pub fn message(&self) -> Option<String> {
        match self {
            QuoteOutcome::BelowMinimum { currency, minimum } => Some(format!(
                "Minimum purchase is {} {}.",
                format_amount(*minimum),
                currency.label()
            )),
            QuoteOutcome::Empty | QuoteOutcome::Priced(_) => None,
        }
    }
}

/// Parses a non-negative decimal amount. Negative or unparsable input yields
/// `None`.
fn parse_amount(input: &str) -> Option<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_units(trimmed, UNITS) {
        Ok(ParseUnits::U256(value)) => Some(value),
        Ok(ParseUnits::I256(_)) | Err(_) => None,
    }
}

/// Formats a fixed point amount with thousands separators and at most three
/// fractional digits, rounding half up.
pub fn format_amount(value: U256) -> String {
    let one = U256::from(10u64).pow(U256::from(DECIMALS));
    let milli = U256::from(10u64).pow(U256::from(DECIMALS - 3));
    let rounded = value.saturating_add(milli * U256::from(5u64) / U256::from(10u64));
    let whole = rounded / one;
    let fraction = (rounded % one) / milli;

    let mut out = group_thousands(&whole.to_string());
    if !fraction.is_zero() {
        let digits = format!("{:03}", fraction.to::<u64>());
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(currency: Currency, input: &str) -> Quote {
        match Quote::compute(&RateTable::default(), currency, input) {
            QuoteOutcome::Priced(quote) => quote,
            other => panic!("expected a priced quote, got {other:?}"),
        }
    }

    #[test]
    fn one_eth_buys_base_plus_ten_percent() {
        let quote = priced(Currency::Eth, "1.0");
        assert_eq!(format_amount(quote.base), "225,000");
        assert_eq!(format_amount(quote.bonus), "22,500");
        assert_eq!(format_amount(quote.total), "247,500");
        assert_eq!(quote.allocation("WLFG"), "247,500 WLFG (+22,500 bonus)");
    }

    #[test]
    fn stablecoin_quote() {
        let quote = priced(Currency::Usdc, "200");
        assert_eq!(format_amount(quote.base), "17,600");
        assert_eq!(format_amount(quote.bonus), "1,760");
        assert_eq!(format_amount(quote.total), "19,360");
        assert_eq!(quote.payment(), "200 USDC");
    }

    #[test]
    fn below_minimum_shows_zero_and_message() {
        let outcome = Quote::compute(&RateTable::default(), Currency::Usdt, "150");
        assert_eq!(outcome.display("WLFG"), "0 WLFG");
        assert_eq!(
            outcome.message().as_deref(),
            Some("Minimum purchase is 200 USDT.")
        );

        let eth = Quote::compute(&RateTable::default(), Currency::Eth, "0.05");
        assert_eq!(eth.message().as_deref(), Some("Minimum purchase is 0.1 ETH."));
    }

    #[test]
    fn unusable_input_is_empty_without_message() {
        for input in ["", "   ", "abc", "0", "-5"] {
            let outcome = Quote::compute(&RateTable::default(), Currency::Eth, input);
            assert_eq!(outcome, QuoteOutcome::Empty, "input {input:?}");
            assert_eq!(outcome.display("WLFG"), "0 WLFG");
            assert!(outcome.message().is_none());
        }
    }

    #[test]
    fn bonus_follows_configured_bps() {
        let rates = RateTable {
            bonus_bps: 2_500,
            ..RateTable::default()
        };
        let QuoteOutcome::Priced(quote) = Quote::compute(&rates, Currency::Usd1, "400") else {
            panic!("expected a priced quote");
        };
        assert_eq!(format_amount(quote.bonus), "8,800");
        assert_eq!(format_amount(quote.total), "44,000");
    }

    #[test]
    fn formats_fractions_to_three_digits() {
        let quote = priced(Currency::Eth, "0.123456");
        // 0.123456 * 225000 = 27777.6
        assert_eq!(format_amount(quote.base), "27,777.6");
        assert_eq!(format_amount(U256::ZERO), "0");
        let value = parse_amount("1234567.89049").unwrap();
        assert_eq!(format_amount(value), "1,234,567.89");
        let value = parse_amount("0.0005").unwrap();
        assert_eq!(format_amount(value), "0.001");
    }

    #[test]
    fn unparsable_minimum_is_reported() {
        assert_eq!(RateTable::default().invalid_minimum(), None);
        let mut rates = RateTable::default();
        rates.usdt.min = "two hundred".into();
        assert_eq!(
            rates.invalid_minimum(),
            Some((Currency::Usdt, "two hundred"))
        );
        rates.usdt.min = "-1".into();
        assert_eq!(rates.invalid_minimum(), Some((Currency::Usdt, "-1")));
    }

    #[test]
    fn currency_cycle() {
        let mut currency = Currency::default();
        for _ in 0..Currency::ALL.len() {
            currency = currency.next();
        }
        assert_eq!(currency, Currency::Eth);
        assert_eq!(Currency::Eth.previous(), Currency::Usd1);
        assert_eq!(serde_json::to_string(&Currency::Usd1).unwrap(), "\"usd1\"");
    }
}
