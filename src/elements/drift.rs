//! Free space propagation between two elements.
use crate::error::{HermesError, HermesResult};
use log::warn;
use uom::si::f64::Length;

/// Drift space of a given length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    length: Length,
}
impl Drift {
    /// Creates a new [`Drift`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the length is not finite.
    pub fn new(length: Length) -> HermesResult<Self> {
        if !length.is_finite() {
            return Err(HermesError::OpticalElement(
                "drift length must be finite".into(),
            ));
        }
        if length.value == 0.0 {
            warn!("drift of zero length");
        }
        Ok(Self { length })
    }
    /// Returns the length of this [`Drift`].
    #[must_use]
    pub const fn length(&self) -> Length {
        self.length
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{meter, utils::test_helper::test_helper::check_warnings};
    #[test]
    fn new() {
        assert_eq!(
            Drift::new(meter!(0.470_422)).unwrap().length(),
            meter!(0.470_422)
        );
        assert!(Drift::new(meter!(f64::NAN)).is_err());
        assert!(Drift::new(meter!(f64::INFINITY)).is_err());
    }
    #[test]
    fn zero_length() {
        testing_logger::setup();
        assert!(Drift::new(meter!(0.0)).is_ok());
        check_warnings(&["drift of zero length"]);
    }
}
