//! printf-like formatting of floating point values.
//!
//! Rust's `{:e}` formatting omits the exponent sign and zero padding (`1e-3`). Tabulated
//! ray data is written in the C notation (`1.000000e-03`) so that it can be read by the
//! usual scientific tooling without surprises.

/// Format a value like C's `%1.<precision>e`.
///
/// # Example
/// ```
/// use hermes::utils::sci_format::format_exp;
///
/// assert_eq!(format_exp(1.0, 6), "1.000000e+00");
/// assert_eq!(format_exp(-0.0025, 6), "-2.500000e-03");
/// assert_eq!(format_exp(6.02e123, 2), "6.02e+123");
/// ```
#[must_use]
pub fn format_exp(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-inf".into()
        } else {
            "inf".into()
        };
    }
    let formatted = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |digits| ('-', digits));
    format!("{mantissa}e{sign}{digits:0>2}")
}
