/// Size formatting utilities: human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.
use crate::error::SizeParseError;

const BINARY_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const DECIMAL_UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// How byte counts are rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeFormat {
    /// Plain integer byte count.
    Raw,
    /// 1024-based units (B/KB/MB/GB/TB), two decimals.
    #[default]
    Binary,
    /// 1000-based units (B/kB/MB/GB/TB), two decimals.
    Decimal,
}

impl SizeFormat {
    /// Render `bytes` with this strategy.
    pub fn format(self, bytes: u64) -> String {
        match self {
            Self::Raw => bytes.to_string(),
            Self::Binary => format_scaled(bytes, 1024, &BINARY_UNITS),
            Self::Decimal => format_scaled(bytes, 1000, &DECIMAL_UNITS),
        }
    }

    /// Parse the CLI spelling: `bytes`, `pow10` or `none`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bytes" => Some(Self::Binary),
            "pow10" => Some(Self::Decimal),
            "none" => Some(Self::Raw),
            _ => None,
        }
    }
}

/// Format a byte count into a human-readable string with binary units.
pub fn format_size(bytes: u64) -> String {
    SizeFormat::Binary.format(bytes)
}

/// A value exactly at a unit boundary belongs to the larger unit
/// (1024 bytes is `1.00 KB`, never `1024 B`).
fn format_scaled(bytes: u64, base: u64, units: &[&str; 5]) -> String {
    if bytes < base {
        return format!("{bytes} {}", units[0]);
    }
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < units.len() && bytes / divisor >= base {
        divisor *= base;
        unit += 1;
    }
    format!("{:.2} {}", bytes as f64 / divisor as f64, units[unit])
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        return count.to_string();
    }
    let s = count.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Parse a human byte size such as `512`, `100B`, `10K`, `10MB` or `2gb`.
///
/// Units are 1024-based and case-insensitive.
pub fn parse_byte_size(input: &str) -> Result<u64, SizeParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(SizeParseError::Empty);
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, suffix) = s.split_at(split);
    if digits.is_empty() {
        return Err(SizeParseError::InvalidNumber(input.to_string()));
    }
    let value: u64 = digits
        .parse()
        .map_err(|_| SizeParseError::InvalidNumber(input.to_string()))?;

    let shift = match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => 0,
        "K" | "KB" => 10,
        "M" | "MB" => 20,
        "G" | "GB" => 30,
        "T" | "TB" => 40,
        "P" | "PB" => 50,
        _ => return Err(SizeParseError::InvalidSuffix(suffix.to_string())),
    };

    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| SizeParseError::Overflow(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_kb() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
    }

    #[test]
    fn test_format_size_mb() {
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_048_575), "1024.00 KB");
    }

    #[test]
    fn test_format_size_gb_tb() {
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
        // Nothing above TB: large values stay in TB.
        assert_eq!(format_size(2048 * 1_099_511_627_776), "2048.00 TB");
    }

    #[test]
    fn test_decimal_boundaries() {
        assert_eq!(SizeFormat::Decimal.format(999), "999 B");
        assert_eq!(SizeFormat::Decimal.format(1000), "1.00 kB");
        assert_eq!(SizeFormat::Decimal.format(1_500_000), "1.50 MB");
        assert_eq!(SizeFormat::Decimal.format(1_000_000_000_000), "1.00 TB");
    }

    #[test]
    fn test_raw_format() {
        assert_eq!(SizeFormat::Raw.format(1024), "1024");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(SizeFormat::from_name("bytes"), Some(SizeFormat::Binary));
        assert_eq!(SizeFormat::from_name("pow10"), Some(SizeFormat::Decimal));
        assert_eq!(SizeFormat::from_name("none"), Some(SizeFormat::Raw));
        assert_eq!(SizeFormat::from_name("kibi"), None);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("512"), Ok(512));
        assert_eq!(parse_byte_size("100B"), Ok(100));
        assert_eq!(parse_byte_size("10K"), Ok(10 * 1024));
        assert_eq!(parse_byte_size("10mb"), Ok(10 * 1024 * 1024));
        assert_eq!(parse_byte_size("2Gb"), Ok(2 << 30));
        assert_eq!(parse_byte_size(" 1T "), Ok(1 << 40));
    }

    #[test]
    fn test_parse_byte_size_errors() {
        assert_eq!(parse_byte_size(""), Err(SizeParseError::Empty));
        assert!(matches!(parse_byte_size("MB"), Err(SizeParseError::InvalidNumber(_))));
        assert!(matches!(parse_byte_size("10XB"), Err(SizeParseError::InvalidSuffix(_))));
        assert!(matches!(parse_byte_size("99999999PB"), Err(SizeParseError::Overflow(_))));
    }
}
