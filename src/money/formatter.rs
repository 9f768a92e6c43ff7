//! Locale-aware money formatting.

use rust_decimal::Decimal;

use super::{Currency, Money, MoneyError};

/// Where the currency symbol sits relative to the number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1,234.50`
    Prefix,
    /// `€ 1.234,50`
    PrefixSpaced,
    /// `1.234,50 €`
    SuffixSpaced,
}

/// Number formatting conventions for a locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    decimal_separator: char,
    thousands_separator: char,
    symbol_position: SymbolPosition,
}

// (tag, decimal, thousands, symbol position)
const LOCALES: &[(&str, char, char, SymbolPosition)] = &[
    ("en", '.', ',', SymbolPosition::Prefix),
    ("en_US", '.', ',', SymbolPosition::Prefix),
    ("en_GB", '.', ',', SymbolPosition::Prefix),
    ("en_ZA", ',', ' ', SymbolPosition::Prefix),
    ("af", ',', ' ', SymbolPosition::Prefix),
    ("de", ',', '.', SymbolPosition::SuffixSpaced),
    ("es", ',', '.', SymbolPosition::SuffixSpaced),
    ("fr", ',', ' ', SymbolPosition::SuffixSpaced),
    ("nl", ',', '.', SymbolPosition::PrefixSpaced),
    ("pt_BR", ',', '.', SymbolPosition::PrefixSpaced),
];

const SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("ZAR", "R"),
    ("BRL", "R$"),
    ("INR", "₹"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
];

impl Locale {
    /// Look up a locale tag. `en-US` and `en_US` are equivalent; an unknown
    /// region falls back to its language (`de_AT` → `de`).
    pub fn parse(tag: &str) -> Result<Self, MoneyError> {
        let normalized = tag.trim().replace('-', "_");
        let language = normalized.split('_').next().unwrap_or_default();

        LOCALES
            .iter()
            .find(|(t, ..)| *t == normalized)
            .or_else(|| LOCALES.iter().find(|(t, ..)| *t == language))
            .map(|&(_, decimal, thousands, position)| Self {
                tag: normalized.clone(),
                decimal_separator: decimal,
                thousands_separator: thousands,
                symbol_position: position,
            })
            .ok_or_else(|| MoneyError::UnknownLocale(tag.to_string()))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Formats money for display in one locale, with a default currency for
/// amounts created through [`MoneyFormatter::to_money`].
#[derive(Clone, Debug)]
pub struct MoneyFormatter {
    locale: Locale,
    currency: Currency,
}

impl MoneyFormatter {
    pub fn new(locale: &str, currency: Currency) -> Result<Self, MoneyError> {
        Ok(Self {
            locale: Locale::parse(locale)?,
            currency,
        })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Wrap a minor-unit amount in the formatter's currency.
    pub fn to_money(&self, minor_units: i64) -> Money {
        Money::new(minor_units, self.currency.clone())
    }

    pub fn currency_symbol(&self) -> &str {
        symbol_for(&self.currency)
    }

    pub fn decimal_separator(&self) -> char {
        self.locale.decimal_separator
    }

    pub fn thousands_separator(&self) -> char {
        self.locale.thousands_separator
    }

    /// Amount in major units (`1050` USD cents → `10.50`).
    pub fn to_decimal(&self, money: &Money) -> Decimal {
        Decimal::new(money.amount(), money.currency().minor_unit_exponent())
    }

    /// Render an amount with symbol, grouping and decimal separator.
    pub fn format(&self, money: &Money) -> String {
        let exponent = money.currency().minor_unit_exponent();
        let divisor = 10u64.pow(exponent);
        let absolute = money.amount().unsigned_abs();

        let mut number = group_thousands(absolute / divisor, self.locale.thousands_separator);
        if exponent > 0 {
            number.push(self.locale.decimal_separator);
            number.push_str(&format!(
                "{:0width$}",
                absolute % divisor,
                width = exponent as usize
            ));
        }

        let symbol = symbol_for(money.currency());
        let body = match self.locale.symbol_position {
            SymbolPosition::Prefix => format!("{symbol}{number}"),
            SymbolPosition::PrefixSpaced => format!("{symbol} {number}"),
            SymbolPosition::SuffixSpaced => format!("{number} {symbol}"),
        };

        if money.is_negative() {
            format!("-{body}")
        } else {
            body
        }
    }
}

fn symbol_for(currency: &Currency) -> &str {
    SYMBOLS
        .iter()
        .find(|(code, _)| *code == currency.code())
        .map(|(_, symbol)| *symbol)
        .unwrap_or_else(|| currency.code())
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
