//! Capacity, time and buffer units.
//!
//! This module parses quantity strings such as `"10Gbps"` or `"250us"`
//! into a value and a unit, and converts between units of the same kind.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Errors that can occur while parsing or applying a unit
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Invalid quantity '{0}': expected a number followed by a unit")]
    InvalidFormat(String),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Value {0} must be positive")]
    NonPositive(f64),
}

/// Link capacity units, decimal multiples of bits per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapacityUnit {
    Bps,
    Kbps,
    Mbps,
    Gbps,
    Tbps,
}

impl CapacityUnit {
    /// Bits per second in one unit
    pub fn factor(&self) -> f64 {
        match self {
            CapacityUnit::Bps => 1.0,
            CapacityUnit::Kbps => 1e3,
            CapacityUnit::Mbps => 1e6,
            CapacityUnit::Gbps => 1e9,
            CapacityUnit::Tbps => 1e12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityUnit::Bps => "bps",
            CapacityUnit::Kbps => "kbps",
            CapacityUnit::Mbps => "Mbps",
            CapacityUnit::Gbps => "Gbps",
            CapacityUnit::Tbps => "Tbps",
        }
    }
}

impl FromStr for CapacityUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bps" | "b/s" => Ok(CapacityUnit::Bps),
            "kbps" | "Kbps" | "kb/s" => Ok(CapacityUnit::Kbps),
            "Mbps" | "Mb/s" | "Mbit" => Ok(CapacityUnit::Mbps),
            "Gbps" | "Gb/s" | "Gbit" => Ok(CapacityUnit::Gbps),
            "Tbps" | "Tb/s" | "Tbit" => Ok(CapacityUnit::Tbps),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time units for link delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Ns,
    Us,
    Ms,
    Sec,
    Min,
    Hour,
}

impl TimeUnit {
    /// Seconds in one unit
    pub fn factor(&self) -> f64 {
        match self {
            TimeUnit::Ns => 1e-9,
            TimeUnit::Us => 1e-6,
            TimeUnit::Ms => 1e-3,
            TimeUnit::Sec => 1.0,
            TimeUnit::Min => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::Sec => "s",
            TimeUnit::Min => "min",
            TimeUnit::Hour => "h",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = UnitError;

    // Longer spellings mirror what duration strings accept elsewhere
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" | "nsec" => Ok(TimeUnit::Ns),
            "us" | "usec" => Ok(TimeUnit::Us),
            "ms" | "msec" => Ok(TimeUnit::Ms),
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(TimeUnit::Sec),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(TimeUnit::Min),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(TimeUnit::Hour),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffer size units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUnit {
    Packets,
    Bytes,
}

impl BufferUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferUnit::Packets => "packets",
            BufferUnit::Bytes => "bytes",
        }
    }
}

impl FromStr for BufferUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packets" | "pkts" => Ok(BufferUnit::Packets),
            "bytes" | "B" => Ok(BufferUnit::Bytes),
            _ => Err(UnitError::UnknownUnit(s.to_string())),
        }
    }
}

impl fmt::Display for BufferUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn quantity_regex() -> &'static Regex {
    static QUANTITY: OnceLock<Regex> = OnceLock::new();
    QUANTITY.get_or_init(|| {
        Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)\s*([A-Za-z/]+)\s*$")
            .expect("quantity pattern is valid")
    })
}

/// Split a quantity string into its numeric value and unit suffix
fn split_quantity(input: &str) -> Result<(f64, &str), UnitError> {
    let captures = quantity_regex()
        .captures(input)
        .ok_or_else(|| UnitError::InvalidFormat(input.to_string()))?;
    let (Some(number), Some(unit)) = (captures.get(1), captures.get(2)) else {
        return Err(UnitError::InvalidFormat(input.to_string()));
    };
    let value = number
        .as_str()
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidFormat(input.to_string()))?;
    if value <= 0.0 {
        return Err(UnitError::NonPositive(value));
    }
    Ok((value, unit.as_str()))
}

/// Parse a capacity string (e.g., "10Gbps", "100 Mbps", "1.5kbps")
///
/// # Examples
/// ```
/// use dctopo::utils::units::{parse_capacity, CapacityUnit};
///
/// assert_eq!(parse_capacity("10Gbps"), Ok((10.0, CapacityUnit::Gbps)));
/// assert_eq!(parse_capacity("100 Mbps"), Ok((100.0, CapacityUnit::Mbps)));
/// assert!(parse_capacity("fast").is_err());
/// ```
pub fn parse_capacity(input: &str) -> Result<(f64, CapacityUnit), UnitError> {
    let (value, unit) = split_quantity(input)?;
    Ok((value, unit.parse()?))
}

/// Parse a delay string (e.g., "2ms", "250us", "1s")
///
/// # Examples
/// ```
/// use dctopo::utils::units::{parse_delay, TimeUnit};
///
/// assert_eq!(parse_delay("2ms"), Ok((2.0, TimeUnit::Ms)));
/// assert_eq!(parse_delay("30 minutes"), Ok((30.0, TimeUnit::Min)));
/// ```
pub fn parse_delay(input: &str) -> Result<(f64, TimeUnit), UnitError> {
    let (value, unit) = split_quantity(input)?;
    Ok((value, unit.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capacity_variants() {
        assert_eq!(parse_capacity("1bps"), Ok((1.0, CapacityUnit::Bps)));
        assert_eq!(parse_capacity("40 Gbps"), Ok((40.0, CapacityUnit::Gbps)));
        assert_eq!(parse_capacity("2.5Tbps"), Ok((2.5, CapacityUnit::Tbps)));
        assert_eq!(parse_capacity("1e3Mbps"), Ok((1000.0, CapacityUnit::Mbps)));
        assert_eq!(parse_capacity("1000Mbit"), Ok((1000.0, CapacityUnit::Mbps)));
    }

    #[test]
    fn test_parse_capacity_errors() {
        assert_eq!(
            parse_capacity("10"),
            Err(UnitError::InvalidFormat("10".to_string()))
        );
        assert_eq!(
            parse_capacity("10Xbps"),
            Err(UnitError::UnknownUnit("Xbps".to_string()))
        );
        assert_eq!(parse_capacity("0Gbps"), Err(UnitError::NonPositive(0.0)));
        assert!(parse_capacity("-1Gbps").is_err());
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("5ns"), Ok((5.0, TimeUnit::Ns)));
        assert_eq!(parse_delay("1.5 s"), Ok((1.5, TimeUnit::Sec)));
        assert_eq!(parse_delay("3h"), Ok((3.0, TimeUnit::Hour)));
        assert!(parse_delay("3 fortnights").is_err());
    }

    #[test]
    fn test_unit_factors() {
        assert_eq!(CapacityUnit::Gbps.factor() / CapacityUnit::Mbps.factor(), 1000.0);
        assert_eq!(TimeUnit::Min.factor(), 60.0);
        assert!((TimeUnit::Ms.factor() / TimeUnit::Us.factor() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_names_round_trip() {
        use CapacityUnit::{Bps, Gbps, Kbps, Mbps, Tbps};
        use TimeUnit::{Hour, Min, Ms, Ns, Sec, Us};

        for unit in [Bps, Kbps, Mbps, Gbps, Tbps] {
            assert_eq!(unit.as_str().parse::<CapacityUnit>(), Ok(unit));
        }
        for unit in [Ns, Us, Ms, Sec, Min, Hour] {
            assert_eq!(unit.as_str().parse::<TimeUnit>(), Ok(unit));
        }
        assert_eq!("pkts".parse::<BufferUnit>(), Ok(BufferUnit::Packets));
    }
}
