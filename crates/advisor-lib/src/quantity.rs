//! Kubernetes resource quantity parsing
//!
//! CPU quantities are normalized to cores and memory quantities to
//! mebibytes. Malformed input never fails: it parses to zero so a single
//! bad sample cannot abort the aggregation of a whole pool.

const BYTES_PER_MI: f64 = 1024.0 * 1024.0;

/// Binary memory suffixes and their factor to mebibytes
const MEMORY_UNITS: [(&str, f64); 4] = [
    ("Ti", 1024.0 * 1024.0),
    ("Gi", 1024.0),
    ("Mi", 1.0),
    ("Ki", 1.0 / 1024.0),
];

/// Parse a CPU quantity to cores.
///
/// # Examples
/// - "250m" -> 0.25
/// - "2" -> 2.0
/// - "500000000n" -> 0.5
pub fn parse_cpu(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let cores = if let Some(millis) = text.strip_suffix('m') {
        parse_float(millis) / 1000.0
    } else if let Some(nanos) = text.strip_suffix('n') {
        parse_float(nanos) / 1_000_000_000.0
    } else {
        parse_float(text)
    };

    non_negative(cores)
}

/// Parse a memory quantity to mebibytes.
///
/// Unsuffixed integers are bytes; any other unsuffixed number is taken
/// as mebibytes.
///
/// # Examples
/// - "1Gi" -> 1024.0
/// - "512Ki" -> 0.5
/// - "1048576" -> 1.0
pub fn parse_memory(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    for (suffix, factor) in MEMORY_UNITS {
        if let Some(value) = text.strip_suffix(suffix) {
            return non_negative(parse_float(value) * factor);
        }
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return non_negative(parse_float(text) / BYTES_PER_MI);
    }

    non_negative(parse_float(text))
}

fn parse_float(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(0.0)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_units() {
        assert_eq!(parse_cpu("250m"), 0.25);
        assert_eq!(parse_cpu("2"), 2.0);
        assert_eq!(parse_cpu("500000000n"), 0.5);
        assert_eq!(parse_cpu("1.5"), 1.5);
        assert_eq!(parse_cpu(" 100m "), 0.1);
    }

    #[test]
    fn test_cpu_malformed_is_zero() {
        assert_eq!(parse_cpu(""), 0.0);
        assert_eq!(parse_cpu("   "), 0.0);
        assert_eq!(parse_cpu("m"), 0.0);
        assert_eq!(parse_cpu("abc"), 0.0);
        assert_eq!(parse_cpu("-3"), 0.0);
        assert_eq!(parse_cpu("NaN"), 0.0);
    }

    #[test]
    fn test_memory_units() {
        assert_eq!(parse_memory("1Gi"), 1024.0);
        assert_eq!(parse_memory("1Ti"), 1024.0 * 1024.0);
        assert_eq!(parse_memory("512Ki"), 0.5);
        assert_eq!(parse_memory("300Mi"), 300.0);
        assert_eq!(parse_memory("1.5Gi"), 1536.0);
    }

    #[test]
    fn test_memory_raw_bytes() {
        assert_eq!(parse_memory("1048576"), 1.0);
        assert_eq!(parse_memory("0"), 0.0);
    }

    #[test]
    fn test_memory_bare_float_is_mebibytes() {
        assert_eq!(parse_memory("12.5"), 12.5);
    }

    #[test]
    fn test_memory_malformed_is_zero() {
        assert_eq!(parse_memory(""), 0.0);
        assert_eq!(parse_memory("garbage"), 0.0);
        assert_eq!(parse_memory("Gi"), 0.0);
        assert_eq!(parse_memory("12xGi"), 0.0);
        // Decimal SI suffixes are not recognized
        assert_eq!(parse_memory("1G"), 0.0);
    }

    #[test]
    fn test_memory_reparse_is_stable() {
        for input in ["1Gi", "512Ki", "3Ti", "1048576", "123.25Mi", "7"] {
            let mi = parse_memory(input);
            assert_eq!(parse_memory(&format!("{}Mi", mi)), mi, "input {}", input);
        }
    }
}
