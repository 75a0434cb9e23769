//! Human-facing transaction numbers: `{prefix}-{year}-{sequence:06}`.

/// Default number prefix.
pub const DEFAULT_PREFIX: &str = "TX";

/// Formatter and parser for transaction numbers.
pub struct TransactionNumber;

impl TransactionNumber {
    /// Formats a transaction number.
    ///
    /// ```
    /// use atrium_core::transaction::TransactionNumber;
    ///
    /// assert_eq!(TransactionNumber::format("TX", 2026, 42), "TX-2026-000042");
    /// ```
    #[must_use]
    pub fn format(prefix: &str, year: i32, sequence: u32) -> String {
        format!("{prefix}-{year}-{sequence:06}")
    }

    /// Splits a number into `(prefix, year, sequence)`.
    pub fn parse(number: &str) -> Option<(&str, i32, u32)> {
        let mut parts = number.rsplitn(3, '-');
        let sequence = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        let prefix = parts.next().filter(|p| !p.is_empty())?;
        Some((prefix, year, sequence))
    }

    /// Next number in `year`, given the highest existing number.
    ///
    /// The sequence restarts at 1 each year and for a different prefix.
    #[must_use]
    pub fn next(prefix: &str, year: i32, last: Option<&str>) -> String {
        let sequence = last
            .and_then(Self::parse)
            .filter(|(p, y, _)| *p == prefix && *y == year)
            .map_or(1, |(_, _, seq)| seq.saturating_add(1));
        Self::format(prefix, year, sequence)
    }
}
