//! Human-readable byte-size formatting for summary reporting.
//!
//! Pure string rendering: a 64-bit byte count plus a [`ByteFormat`]
//! selector in, a display string out. Consumed only when printing scan
//! statistics; nothing in the dedup core depends on it.

use std::fmt;
use std::str::FromStr;

/// Selector for how a byte count is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteFormat {
    /// Raw bytes, no formatting
    Raw,
    /// Raw bytes with comma separators
    RawCommas,
    /// SI units, 1000-based (kB, MB, GB, TB)
    #[default]
    Si,
    /// SI units with long names (kilobytes, megabytes, ...)
    SiLong,
    /// Binary units, 1024-based (KiB, MiB, GiB, TiB)
    Binary,
    /// Binary units with long names (kibibytes, mebibytes, ...)
    BinaryLong,
    /// Scientific notation (1.23e+06)
    Scientific,
    /// Scientific notation with comma-grouped mantissa digits
    ScientificCommas,
    /// Traditional disk tool format (B, K, M, G, T)
    Traditional,
    /// Traditional disk tool format with long names
    TraditionalLong,
    /// Most compact representation (4K, 12M, 3G)
    Compact,
    /// Compact with long unit names
    CompactLong,
}

/// Error for unrecognized format spellings.
#[derive(thiserror::Error, Debug)]
#[error("unknown byte format {0:?}, see `dupesig formats` for the list")]
pub struct ParseByteFormatError(String);

struct Unit {
    short_name: &'static str,
    long_name: &'static str,
    divisor: u64,
}

const SI_UNITS: &[Unit] = &[
    Unit { short_name: "bytes", long_name: "bytes", divisor: 1 },
    Unit { short_name: "kB", long_name: "kilobytes", divisor: 1_000 },
    Unit { short_name: "MB", long_name: "megabytes", divisor: 1_000_000 },
    Unit { short_name: "GB", long_name: "gigabytes", divisor: 1_000_000_000 },
    Unit { short_name: "TB", long_name: "terabytes", divisor: 1_000_000_000_000 },
    Unit { short_name: "PB", long_name: "petabytes", divisor: 1_000_000_000_000_000 },
];

const BINARY_UNITS: &[Unit] = &[
    Unit { short_name: "bytes", long_name: "bytes", divisor: 1 },
    Unit { short_name: "KiB", long_name: "kibibytes", divisor: 1 << 10 },
    Unit { short_name: "MiB", long_name: "mebibytes", divisor: 1 << 20 },
    Unit { short_name: "GiB", long_name: "gibibytes", divisor: 1 << 30 },
    Unit { short_name: "TiB", long_name: "tebibytes", divisor: 1 << 40 },
    Unit { short_name: "PiB", long_name: "pebibytes", divisor: 1 << 50 },
];

const TRADITIONAL_UNITS: &[Unit] = &[
    Unit { short_name: "B", long_name: "bytes", divisor: 1 },
    Unit { short_name: "K", long_name: "kilobytes", divisor: 1_000 },
    Unit { short_name: "M", long_name: "megabytes", divisor: 1_000_000 },
    Unit { short_name: "G", long_name: "gigabytes", divisor: 1_000_000_000 },
    Unit { short_name: "T", long_name: "terabytes", divisor: 1_000_000_000_000 },
];

/// Render a byte count according to `format`.
#[must_use]
pub fn format_bytes(bytes: u64, format: ByteFormat) -> String {
    match format {
        ByteFormat::Raw => bytes.to_string(),
        ByteFormat::RawCommas => group_digits(bytes),
        ByteFormat::Si => with_units(bytes, SI_UNITS, false),
        ByteFormat::SiLong => with_units(bytes, SI_UNITS, true),
        ByteFormat::Binary => with_units(bytes, BINARY_UNITS, false),
        ByteFormat::BinaryLong => with_units(bytes, BINARY_UNITS, true),
        ByteFormat::Scientific | ByteFormat::ScientificCommas => scientific(bytes),
        ByteFormat::Traditional => with_units(bytes, TRADITIONAL_UNITS, false),
        ByteFormat::TraditionalLong => with_units(bytes, TRADITIONAL_UNITS, true),
        ByteFormat::Compact => compact(bytes, false),
        ByteFormat::CompactLong => compact(bytes, true),
    }
}

impl ByteFormat {
    /// One-line description of the format, for listings.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            ByteFormat::Raw => "Raw bytes without formatting",
            ByteFormat::RawCommas => "Raw bytes with comma separators",
            ByteFormat::Si => "Human readable with SI units (kB, MB, GB, TB)",
            ByteFormat::SiLong => "Human readable with long SI units (kilobytes, megabytes, ...)",
            ByteFormat::Binary => "Human readable with binary units (KiB, MiB, GiB, TiB)",
            ByteFormat::BinaryLong => {
                "Human readable with long binary units (kibibytes, mebibytes, ...)"
            }
            ByteFormat::Scientific => "Scientific notation (1.23e+06)",
            ByteFormat::ScientificCommas => "Scientific notation with comma separators",
            ByteFormat::Traditional => "Traditional disk tool format (K, M, G, T)",
            ByteFormat::TraditionalLong => "Traditional disk tool format with long names",
            ByteFormat::Compact => "Most compact representation",
            ByteFormat::CompactLong => "Compact representation with long units",
        }
    }

    /// All formats with their canonical spelling, for help output.
    #[must_use]
    pub fn all() -> &'static [(&'static str, ByteFormat)] {
        &[
            ("raw", ByteFormat::Raw),
            ("raw-commas", ByteFormat::RawCommas),
            ("si", ByteFormat::Si),
            ("si-long", ByteFormat::SiLong),
            ("binary", ByteFormat::Binary),
            ("binary-long", ByteFormat::BinaryLong),
            ("scientific", ByteFormat::Scientific),
            ("scientific-commas", ByteFormat::ScientificCommas),
            ("traditional", ByteFormat::Traditional),
            ("traditional-long", ByteFormat::TraditionalLong),
            ("compact", ByteFormat::Compact),
            ("compact-long", ByteFormat::CompactLong),
        ]
    }
}

impl fmt::Display for ByteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let canonical = ByteFormat::all()
            .iter()
            .find(|(_, format)| format == self)
            .map_or("si", |(name, _)| *name);
        f.write_str(canonical)
    }
}

impl FromStr for ByteFormat {
    type Err = ParseByteFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(ByteFormat::Raw),
            "raw-commas" => Ok(ByteFormat::RawCommas),
            "si" | "human" | "h" => Ok(ByteFormat::Si),
            "si-long" | "human-long" => Ok(ByteFormat::SiLong),
            "binary" | "iec" => Ok(ByteFormat::Binary),
            "binary-long" | "iec-long" => Ok(ByteFormat::BinaryLong),
            "scientific" | "sci" => Ok(ByteFormat::Scientific),
            "scientific-commas" | "sci-commas" => Ok(ByteFormat::ScientificCommas),
            "traditional" | "disk" => Ok(ByteFormat::Traditional),
            "traditional-long" | "disk-long" => Ok(ByteFormat::TraditionalLong),
            "compact" => Ok(ByteFormat::Compact),
            "compact-long" => Ok(ByteFormat::CompactLong),
            other => Err(ParseByteFormatError(other.to_string())),
        }
    }
}

/// Insert comma separators every three digits from the right.
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn with_units(bytes: u64, units: &[Unit], long_names: bool) -> String {
    // Largest unit whose successor's divisor still exceeds the value.
    let mut unit = &units[0];
    for next in &units[1..] {
        if (bytes as f64) < next.divisor as f64 {
            break;
        }
        unit = next;
    }

    let name = if long_names { unit.long_name } else { unit.short_name };
    if unit.divisor == 1 {
        format!("{bytes} {name}")
    } else {
        let value = bytes as f64 / unit.divisor as f64;
        if long_names {
            format!("{value:.1} {name}")
        } else {
            format!("{value:.1}{name}")
        }
    }
}

/// Two-decimal mantissa with an explicit sign and two-digit exponent,
/// matching C's `%.2e` rendering.
fn scientific(bytes: u64) -> String {
    if bytes == 0 {
        return "0.00e+00".to_string();
    }
    let mut exponent = (bytes as f64).log10().floor() as i32;
    let mut mantissa = bytes as f64 / 10f64.powi(exponent);
    // log10 can land just under a power of ten; renormalize.
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{mantissa:.2}e+{exponent:02}")
}

fn compact(bytes: u64, long_names: bool) -> String {
    let (value, short, long) = if bytes < 1_000 {
        return if long_names {
            format!("{bytes} bytes")
        } else {
            bytes.to_string()
        };
    } else if bytes < 1_000_000 {
        (bytes as f64 / 1e3, "K", "kilobytes")
    } else if bytes < 1_000_000_000 {
        (bytes as f64 / 1e6, "M", "megabytes")
    } else {
        (bytes as f64 / 1e9, "G", "gigabytes")
    };

    if long_names {
        format!("{value:.0} {long}")
    } else {
        format!("{value:.0}{short}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw() {
        assert_eq!(format_bytes(0, ByteFormat::Raw), "0");
        assert_eq!(format_bytes(1_234_567, ByteFormat::Raw), "1234567");
    }

    #[test]
    fn test_raw_commas() {
        assert_eq!(format_bytes(0, ByteFormat::RawCommas), "0");
        assert_eq!(format_bytes(999, ByteFormat::RawCommas), "999");
        assert_eq!(format_bytes(1_000, ByteFormat::RawCommas), "1,000");
        assert_eq!(format_bytes(1_234_567, ByteFormat::RawCommas), "1,234,567");
    }

    #[test]
    fn test_si_units() {
        assert_eq!(format_bytes(999, ByteFormat::Si), "999 bytes");
        assert_eq!(format_bytes(1_000, ByteFormat::Si), "1.0kB");
        assert_eq!(format_bytes(1_500, ByteFormat::Si), "1.5kB");
        assert_eq!(format_bytes(2_000_000, ByteFormat::Si), "2.0MB");
        assert_eq!(format_bytes(1_500, ByteFormat::SiLong), "1.5 kilobytes");
    }

    #[test]
    fn test_binary_units() {
        assert_eq!(format_bytes(1_023, ByteFormat::Binary), "1023 bytes");
        assert_eq!(format_bytes(1_024, ByteFormat::Binary), "1.0KiB");
        assert_eq!(format_bytes(1_536, ByteFormat::Binary), "1.5KiB");
        assert_eq!(format_bytes(1_048_576, ByteFormat::Binary), "1.0MiB");
        assert_eq!(format_bytes(1_536, ByteFormat::BinaryLong), "1.5 kibibytes");
    }

    #[test]
    fn test_traditional_units() {
        assert_eq!(format_bytes(500, ByteFormat::Traditional), "500 B");
        assert_eq!(format_bytes(1_500, ByteFormat::Traditional), "1.5K");
        assert_eq!(format_bytes(2_500_000, ByteFormat::Traditional), "2.5M");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(format_bytes(0, ByteFormat::Scientific), "0.00e+00");
        assert_eq!(format_bytes(1, ByteFormat::Scientific), "1.00e+00");
        assert_eq!(format_bytes(1_230_000, ByteFormat::Scientific), "1.23e+06");
        assert_eq!(format_bytes(999, ByteFormat::Scientific), "9.99e+02");
    }

    #[test]
    fn test_compact() {
        assert_eq!(format_bytes(999, ByteFormat::Compact), "999");
        assert_eq!(format_bytes(4_000, ByteFormat::Compact), "4K");
        assert_eq!(format_bytes(12_000_000, ByteFormat::Compact), "12M");
        assert_eq!(format_bytes(3_000_000_000, ByteFormat::Compact), "3G");
        assert_eq!(format_bytes(4_000, ByteFormat::CompactLong), "4 kilobytes");
        assert_eq!(format_bytes(500, ByteFormat::CompactLong), "500 bytes");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("si".parse::<ByteFormat>().unwrap(), ByteFormat::Si);
        assert_eq!("human".parse::<ByteFormat>().unwrap(), ByteFormat::Si);
        assert_eq!("h".parse::<ByteFormat>().unwrap(), ByteFormat::Si);
        assert_eq!("iec".parse::<ByteFormat>().unwrap(), ByteFormat::Binary);
        assert_eq!("disk".parse::<ByteFormat>().unwrap(), ByteFormat::Traditional);
        assert_eq!("sci".parse::<ByteFormat>().unwrap(), ByteFormat::Scientific);
        assert!("nope".parse::<ByteFormat>().is_err());
    }

    #[test]
    fn test_display_round_trips_canonical_names() {
        for &(name, format) in ByteFormat::all() {
            assert_eq!(format.to_string(), name);
            assert_eq!(name.parse::<ByteFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_default_is_si() {
        assert_eq!(ByteFormat::default(), ByteFormat::Si);
    }
}
