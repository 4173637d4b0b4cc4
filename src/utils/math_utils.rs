//! Lossy numeric conversions used when mixing pixel counts with physical quantities.

/// Convert a pixel (or ray) count into an `f64`.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

/// Convert a (macro-electron) count into an `f64`.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn conversions() {
        assert_eq!(usize_to_f64(100), 100.0);
        assert_eq!(u64_to_f64(250_000), 250_000.0);
    }
}
