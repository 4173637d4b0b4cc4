#![warn(missing_docs)]
//! Module for additional uom macros that facilitate the creation of points or single unit values
/// helper macro to create the units
#[macro_export]
macro_rules! uom_unit_creator {

    ($unit:ident, $unit_type:ident, $val1:expr) => {
        $unit_type::new::<$unit>($val1)
    };
    ($unit:ident, $unit_type:ident, $val1:expr, $val2:expr, $val3:expr) => {
        {
        use nalgebra::Point3;
        Point3::new(
            $unit_type::new::<$unit>($val1),
            $unit_type::new::<$unit>($val2),
            $unit_type::new::<$unit>($val3))
        }
    };
}

///macro to create a Length in meter
#[macro_export]
macro_rules! meter {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::meter};
        $crate::uom_unit_creator![meter, Length, $( $x ),*]
    }};
}
///macro to create a Length in millimeter
#[macro_export]
macro_rules! millimeter {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::millimeter};
        $crate::uom_unit_creator![millimeter, Length, $( $x ),*]
    }};
}
///macro to create a Length in micrometer
#[macro_export]
macro_rules! micrometer {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::micrometer};
        $crate::uom_unit_creator![micrometer, Length, $( $x ),*]
    }};
}
///macro to create a photon or particle energy in electronvolt
#[macro_export]
macro_rules! electronvolt {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Energy, energy::electronvolt};
        $crate::uom_unit_creator![electronvolt, Energy, $( $x ),*]
    }};
}
///macro to create a particle energy in gigaelectronvolt
#[macro_export]
macro_rules! gigaelectronvolt {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Energy, energy::gigaelectronvolt};
        $crate::uom_unit_creator![gigaelectronvolt, Energy, $( $x ),*]
    }};
}
///macro to create an angle in radian
#[macro_export]
macro_rules! radian {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $( $x ),*]
    }};
}
///macro to create an angle in degree
#[macro_export]
macro_rules! degree {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Angle, angle::degree};
        $crate::uom_unit_creator![degree, Angle, $( $x ),*]
    }};
}
///macro to create a magnetic flux density in tesla
#[macro_export]
macro_rules! tesla {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::MagneticFluxDensity, magnetic_flux_density::tesla};
        $crate::uom_unit_creator![tesla, MagneticFluxDensity, $( $x ),*]
    }};
}
///macro to create an electric current in ampere
#[macro_export]
macro_rules! ampere {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::ElectricCurrent, electric_current::ampere};
        $crate::uom_unit_creator![ampere, ElectricCurrent, $( $x ),*]
    }};
}
///macro to create a line density in lines per millimeter
#[macro_export]
macro_rules! num_per_mm {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::LinearNumberDensity, linear_number_density::per_millimeter};
        $crate::uom_unit_creator![per_millimeter, LinearNumberDensity, $( $x ),*]
    }};
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use uom::si::{
        angle::radian, electric_current::ampere, energy::electronvolt,
        linear_number_density::per_meter, length::meter, magnetic_flux_density::tesla,
    };

    #[test]
    fn length_macros() {
        assert_relative_eq!(meter!(2.0).get::<meter>(), 2.0);
        assert_relative_eq!(millimeter!(5.0).get::<meter>(), 5e-3);
        assert_relative_eq!(micrometer!(50.0).get::<meter>(), 5e-5);
    }
    #[test]
    fn point_macro() {
        let p = meter!(1.0, 2.0, 3.0);
        assert_relative_eq!(p.x.get::<meter>(), 1.0);
        assert_relative_eq!(p.y.get::<meter>(), 2.0);
        assert_relative_eq!(p.z.get::<meter>(), 3.0);
    }
    #[test]
    fn energy_macros() {
        assert_relative_eq!(electronvolt!(719.9).get::<electronvolt>(), 719.9);
        assert_relative_eq!(gigaelectronvolt!(2.75).get::<electronvolt>(), 2.75e9);
    }
    #[test]
    fn angle_macros() {
        assert_relative_eq!(degree!(180.0).get::<radian>(), std::f64::consts::PI);
        assert_relative_eq!(radian!(0.5).get::<radian>(), 0.5);
    }
    #[test]
    fn other_macros() {
        assert_relative_eq!(tesla!(0.2).get::<tesla>(), 0.2);
        assert_relative_eq!(ampere!(0.5).get::<ampere>(), 0.5);
        assert_relative_eq!(num_per_mm!(450.0).get::<per_meter>(), 450_000.0);
    }
}
