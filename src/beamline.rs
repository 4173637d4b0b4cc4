#![warn(missing_docs)]
//! Composition of optical elements and their propagation parameters into a beamline.
use crate::{
    config::{BeamlineConfig, MirrorConfig},
    elements::{
        Aperture, Drift, GrooveDensity, OpticalElement, PlaneMirror, ToroidalMirror, VlsGrating,
    },
    error::{HermesError, HermesResult},
    propagation_parameters::{PhaseTreatment, PropagationParameters, NB_PROPAGATION_PARAMETERS},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use uom::si::{
    f64::{Energy, Length, LinearNumberDensity},
    length::{meter, millimeter},
    linear_number_density::per_millimeter,
};

/// Maximum relative deviation between the nominal cff of a grating and the cff at its grazing angle.
const CFF_TOLERANCE: f64 = 0.01;

/// Branch of the beamline to be simulated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// monochromator branch (pupil, M1A, M1B, entrance slit, VLS grating)
    #[default]
    #[strum(serialize = "mono")]
    Mono,
}
impl Branch {
    /// Build the element sequence of this branch.
    ///
    /// `default_aperture` is used as the size of apertures which are not explicitly configured.
    ///
    /// # Errors
    ///
    /// This function will return an error if an element is invalid or the grating order does not propagate at
    /// `photon_energy`.
    pub fn build(
        self,
        config: &BeamlineConfig,
        photon_energy: Energy,
        default_aperture: (Length, Length),
    ) -> HermesResult<BeamlineComposite> {
        match self {
            Self::Mono => mono_beamline(config, photon_energy, default_aperture),
        }
    }
}

/// An optical element together with its propagation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamlineEntry {
    name: String,
    element: OpticalElement,
    parameters: PropagationParameters,
}
impl BeamlineEntry {
    /// Returns the name of this [`BeamlineEntry`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the optical element.
    #[must_use]
    pub const fn element(&self) -> &OpticalElement {
        &self.element
    }
    /// Returns the propagation parameters.
    #[must_use]
    pub const fn parameters(&self) -> &PropagationParameters {
        &self.parameters
    }
}

/// Ordered sequence of optical elements each paired with its propagation parameters.
///
/// This is the unit consumed by the wavefront propagator. Element and parameter counts are equal by
/// construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeamlineComposite {
    entries: Vec<BeamlineEntry>,
}
impl BeamlineComposite {
    /// Creates an empty [`BeamlineComposite`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Append an element with its propagation parameters.
    pub fn add(
        &mut self,
        name: &str,
        element: impl Into<OpticalElement>,
        parameters: PropagationParameters,
    ) {
        let element = element.into();
        info!("add {element} '{name}' to beamline");
        self.entries.push(BeamlineEntry {
            name: name.to_string(),
            element,
            parameters,
        });
    }
    /// Compose a beamline from separate element and parameter sequences.
    ///
    /// Elements are named by their type and position.
    ///
    /// # Errors
    ///
    /// This function will return an error if both sequences differ in length.
    pub fn compose(
        elements: Vec<OpticalElement>,
        parameters: Vec<PropagationParameters>,
    ) -> HermesResult<Self> {
        if elements.len() != parameters.len() {
            return Err(HermesError::Beamline(format!(
                "number of elements ({}) and propagation parameter records ({}) differ",
                elements.len(),
                parameters.len()
            )));
        }
        let mut beamline = Self::new();
        for (idx, (element, params)) in elements.into_iter().zip(parameters).enumerate() {
            let name = format!("{} {}", element.as_ref(), idx + 1);
            beamline.add(&name, element, params);
        }
        Ok(beamline)
    }
    /// Compose a beamline from an element sequence and flat parameter records.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a record does not have exactly 17 entries.
    ///   - both sequences differ in length.
    pub fn from_raw(elements: Vec<OpticalElement>, records: &[Vec<f64>]) -> HermesResult<Self> {
        let parameters = records
            .iter()
            .map(|r| PropagationParameters::try_from(r.as_slice()))
            .collect::<HermesResult<Vec<_>>>()?;
        Self::compose(elements, parameters)
    }
    /// Returns the entries of this [`BeamlineComposite`].
    #[must_use]
    pub fn entries(&self) -> &[BeamlineEntry] {
        &self.entries
    }
    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Returns `true` if the beamline does not contain any element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Iterate over the optical elements.
    pub fn elements(&self) -> impl Iterator<Item = &OpticalElement> {
        self.entries.iter().map(|e| &e.element)
    }
    /// Flat propagation parameter records in beamline order.
    #[must_use]
    pub fn parameter_records(&self) -> Vec<[f64; NB_PROPAGATION_PARAMETERS]> {
        self.entries.iter().map(|e| e.parameters.to_array()).collect()
    }
    /// Sum of all drift lengths.
    #[must_use]
    pub fn total_length(&self) -> Length {
        self.elements()
            .filter_map(OpticalElement::axial_length)
            .fold(Length::new::<meter>(0.0), |acc, l| acc + l)
    }
}

fn aperture(size_mm: Option<(f64, f64)>, default: (Length, Length)) -> HermesResult<Aperture> {
    let (dx, dy) = size_mm.map_or(default, |(dx, dy)| {
        (
            Length::new::<millimeter>(dx),
            Length::new::<millimeter>(dy),
        )
    });
    Aperture::rectangular(dx, dy)
}

fn drift(length_m: f64) -> HermesResult<Drift> {
    Drift::new(Length::new::<meter>(length_m))
}

fn vls_grating(config: &BeamlineConfig) -> HermesResult<VlsGrating> {
    let g = &config.grating;
    let [n0, n1, n2, n3] = g.groove_density;
    VlsGrating::new(
        plane_mirror(&g.surface)?,
        g.order,
        GrooveDensity {
            n0: LinearNumberDensity::new::<per_millimeter>(n0),
            n1,
            n2,
            n3,
        },
        g.cff,
        g.surface.grazing_angle(),
    )
}

fn plane_mirror(config: &MirrorConfig) -> HermesResult<PlaneMirror> {
    Ok(PlaneMirror::new(config.geometry()?))
}

/// Build the monochromator branch: pupil, M1A (plane), M1B (toroid), entrance slit and VLS grating.
///
/// # Errors
///
/// This function will return an error if an element is invalid or the grating order does not propagate at
/// `photon_energy`.
pub fn mono_beamline(
    config: &BeamlineConfig,
    photon_energy: Energy,
    default_aperture: (Length, Length),
) -> HermesResult<BeamlineComposite> {
    let default = PropagationParameters::default();
    let mut beamline = BeamlineComposite::new();
    beamline.add(
        "pupil",
        aperture(config.pupil_mm, default_aperture)?,
        default
            .with_phase_treatment(PhaseTreatment::Standard)
            .with_range_resolution((1.0, 1.0), (5.0, 5.0))?,
    );
    beamline.add("M1A", plane_mirror(&config.m1a)?, default);
    beamline.add("M1A-M1B", drift(config.m1a_to_m1b_m)?, default);
    let (rt, rs) = config.m1b.radii_m;
    let m1b = ToroidalMirror::new(
        config.m1b.surface.geometry()?,
        Length::new::<meter>(rt),
        Length::new::<meter>(rs),
    )?;
    beamline.add("M1B", m1b, default);
    beamline.add("M1B-slit", drift(config.m1b_to_slit_m)?, default);
    beamline.add(
        "mono entrance slit",
        aperture(config.slit_mm, default_aperture)?,
        default.with_phase_treatment(PhaseTreatment::Standard),
    );
    beamline.add(
        "grating illumination",
        drift(config.slit_to_grating_m)?,
        default,
    );
    let grating = vls_grating(config)?;
    let deflection = grating.deflection(photon_energy)?;
    if (deflection.cff() - grating.cff()).abs() > CFF_TOLERANCE * grating.cff() {
        warn!(
            "grating cff at the configured grazing angle ({:.4}) differs from its nominal cff ({:.4})",
            deflection.cff(),
            grating.cff()
        );
    }
    beamline.add(
        "grating",
        grating,
        default.with_deflection(config.grating.surface.bounce, deflection.deflection()),
    );
    beamline.add("grating exit", drift(config.grating_exit_m)?, default);
    Ok(beamline)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        electronvolt, elements::BounceDirection, millimeter,
        utils::test_helper::test_helper::check_warnings,
    };
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use strum::IntoEnumIterator;

    fn mono() -> BeamlineComposite {
        mono_beamline(
            &BeamlineConfig::default(),
            electronvolt!(719.9),
            (millimeter!(5.0), millimeter!(5.0)),
        )
        .unwrap()
    }
    #[test]
    fn compose() {
        let elements: Vec<OpticalElement> = vec![
            Drift::new(Length::new::<meter>(1.0)).unwrap().into(),
            Drift::new(Length::new::<meter>(2.0)).unwrap().into(),
        ];
        let beamline =
            BeamlineComposite::compose(elements, vec![PropagationParameters::default(); 2])
                .unwrap();
        assert_eq!(beamline.len(), 2);
        assert_eq!(beamline.entries()[1].name(), "drift 2");
        assert_eq!(beamline.total_length(), Length::new::<meter>(3.0));
    }
    #[test]
    fn compose_unequal_length() {
        let elements: Vec<OpticalElement> =
            vec![Drift::new(Length::new::<meter>(1.0)).unwrap().into()];
        assert_matches!(
            BeamlineComposite::compose(elements.clone(), vec![]),
            Err(HermesError::Beamline(_))
        );
        assert!(BeamlineComposite::compose(
            elements,
            vec![PropagationParameters::default(); 2]
        )
        .is_err());
    }
    #[test]
    fn from_raw() {
        let elements: Vec<OpticalElement> = vec![
            Aperture::rectangular(millimeter!(5.0), millimeter!(5.0))
                .unwrap()
                .into(),
            Drift::new(Length::new::<meter>(0.6)).unwrap().into(),
        ];
        let records = vec![
            vec![0., 0., 1., 1., 0., 1., 5., 1., 5., 0., 0., 0., 0., 0., 0., 0., 0.],
            vec![1., 1., 1., 2., 0., 1., 1., 1., 1., 0., 0., 0., 0., 0., 0., 0., 0.],
        ];
        let beamline = BeamlineComposite::from_raw(elements.clone(), &records).unwrap();
        let raw = beamline.parameter_records();
        assert_eq!(raw[0].as_slice(), records[0].as_slice());
        assert_eq!(raw[1].as_slice(), records[1].as_slice());
        let short = vec![records[0].clone(), vec![0.0; 16]];
        assert_matches!(
            BeamlineComposite::from_raw(elements, &short),
            Err(HermesError::Beamline(_))
        );
    }
    #[test]
    fn mono_sequence() {
        let beamline = mono();
        let kinds: Vec<&str> = beamline.elements().map(AsRef::as_ref).collect();
        assert_eq!(
            kinds,
            vec![
                "aperture",
                "plane mirror",
                "drift",
                "toroidal mirror",
                "drift",
                "aperture",
                "drift",
                "vls grating",
                "drift"
            ]
        );
        assert_eq!(beamline.parameter_records().len(), 9);
        assert_abs_diff_eq!(
            beamline.total_length().get::<meter>(),
            0.470_422 + 3.209_598_220_632_745_6 + 0.6 + 0.311_199,
            epsilon = 1e-12
        );
    }
    #[test]
    fn mono_records() {
        let records = mono().parameter_records();
        let default = PropagationParameters::default().to_array();
        assert_eq!(
            records[0],
            [0., 0., 1., 0., 0., 1., 5., 1., 5., 0., 0., 0., 0., 0., 0., 0., 0.]
        );
        for idx in [1, 2, 3, 4, 6, 8] {
            assert_eq!(records[idx], default);
        }
        assert_eq!(records[5][3], 0.0);
        let grating = records[7];
        assert_eq!(grating[..12], default[..12]);
        assert_eq!(grating[12], 0.0);
        assert_abs_diff_eq!(grating[13], 0.048_200_6, epsilon = 1e-6);
        assert_abs_diff_eq!(grating[14], 0.998_837_7, epsilon = 1e-6);
        assert_eq!(grating[15..], [1.0, 0.0]);
    }
    #[test]
    fn mono_apertures() {
        let beamline = mono();
        let OpticalElement::Aperture(pupil) = beamline.entries()[0].element() else {
            panic!("first element is not an aperture");
        };
        assert_eq!(pupil.size(), (millimeter!(5.0), millimeter!(5.0)));
        let config = BeamlineConfig {
            slit_mm: Some((0.1, 2.0)),
            ..BeamlineConfig::default()
        };
        let beamline = mono_beamline(
            &config,
            electronvolt!(719.9),
            (millimeter!(5.0), millimeter!(5.0)),
        )
        .unwrap();
        let OpticalElement::Aperture(slit) = beamline.entries()[5].element() else {
            panic!("sixth element is not an aperture");
        };
        assert_abs_diff_eq!(slit.size().0.get::<millimeter>(), 0.1, epsilon = 1e-12);
    }
    #[test]
    fn mono_mirror_orientation() {
        let beamline = mono();
        let OpticalElement::ToroidalMirror(m1b) = beamline.entries()[3].element() else {
            panic!("fourth element is not a toroid");
        };
        assert!(m1b.geometry().orientation().normal().x < 0.0);
        assert_eq!(m1b.radius_sagittal(), Length::new::<meter>(1.802_572));
    }
    #[test]
    fn mono_cff_mismatch() {
        testing_logger::setup();
        let mut config = BeamlineConfig::default();
        config.grating.cff = 0.5;
        assert!(mono_beamline(
            &config,
            electronvolt!(719.9),
            (millimeter!(5.0), millimeter!(5.0))
        )
        .is_ok());
        check_warnings(&[
            "grating cff at the configured grazing angle (0.2000) differs from its nominal cff (0.5000)",
        ]);
    }
    #[test]
    fn mono_evanescent_grating() {
        let mut config = BeamlineConfig::default();
        config.grating.surface.bounce = BounceDirection::Down;
        assert!(mono_beamline(
            &config,
            electronvolt!(719.9),
            (millimeter!(5.0), millimeter!(5.0))
        )
        .is_ok());
        assert_matches!(
            mono_beamline(
                &config,
                electronvolt!(5.0),
                (millimeter!(5.0), millimeter!(5.0))
            ),
            Err(HermesError::Grating(_))
        );
    }
    #[test]
    fn branch() {
        assert_eq!(Branch::Mono.to_string(), "mono");
        assert_eq!(Branch::iter().count(), 1);
        assert_eq!(serde_yaml::to_string(&Branch::Mono).unwrap(), "mono\n");
        let beamline = Branch::Mono
            .build(
                &BeamlineConfig::default(),
                electronvolt!(719.9),
                (millimeter!(5.0), millimeter!(5.0)),
            )
            .unwrap();
        assert_eq!(beamline, mono());
    }
}
