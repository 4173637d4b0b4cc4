#![warn(missing_docs)]
//! Wavefront diagnostics and intensity / phase plots.
use crate::{
    engine::{Dependence, IntensityRequest, SrwEngine},
    error::{HermesError, HermesResult},
    mesh::RadMesh,
    utils::usize_to_f64,
    wavefront::Wavefront,
};
use colorous::{Gradient, TURBO};
use itertools::{iproduct, izip};
use log::{info, warn};
use nalgebra::DMatrix;
use num::ToPrimitive;
use plotters::{
    backend::DrawingBackend,
    chart::{ChartBuilder, SeriesLabelPosition},
    coord::Shift,
    element::{PathElement, Rectangle},
    prelude::{BitMapBackend, DrawingArea, IntoDrawingArea, SVGBackend},
    series::LineSeries,
    style::{Color, IntoFont, RGBAColor, ShapeStyle, BLACK, BLUE, RED, WHITE},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    io::Write,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter};
use uom::si::{
    f64::Length,
    length::{meter, micrometer, millimeter},
};

const FIG_SIZE: (u32, u32) = (1000, 850);
const COLORBAR_WIDTH: u32 = 170;
const X_LABEL: &str = "Horizontal Position [mm]";
const Y_LABEL: &str = "Vertical Position [mm]";

/// File format of the plots.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    StrumDisplay,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    /// bitmap (`.png`)
    #[default]
    #[strum(serialize = "png")]
    Png,
    /// vector graphics (`.svg`)
    #[strum(serialize = "svg")]
    Svg,
}

/// Geometry and curvature of a [`Wavefront`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavefrontInfo {
    nx: usize,
    ny: usize,
    dx: Length,
    dy: Length,
    range_x: Length,
    range_y: Length,
    rx: Length,
    ry: Length,
}
impl WavefrontInfo {
    /// Collect the information of the given [`Wavefront`].
    ///
    /// # Errors
    ///
    /// This function will return an error if a mesh axis has a single pixel only (no pixel pitch).
    pub fn new(wavefront: &Wavefront) -> HermesResult<Self> {
        let mesh = wavefront.mesh();
        Ok(Self {
            nx: mesh.nx(),
            ny: mesh.ny(),
            dx: mesh.pitch_x()?,
            dy: mesh.pitch_y()?,
            range_x: mesh.range_x(),
            range_y: mesh.range_y(),
            rx: wavefront.rx(),
            ry: wavefront.ry(),
        })
    }
    /// Returns the `(horizontal, vertical)` pixel pitch.
    #[must_use]
    pub const fn pitch(&self) -> (Length, Length) {
        (self.dx, self.dy)
    }
    /// Returns the `(horizontal, vertical)` range.
    #[must_use]
    pub const fn range(&self) -> (Length, Length) {
        (self.range_x, self.range_y)
    }
}
impl Display for WavefrontInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Wavefront information:")?;
        writeln!(f, "Nx = {}, Ny = {}", self.nx, self.ny)?;
        writeln!(
            f,
            "dx = {:.4} um, dy = {:.4} um",
            self.dx.get::<micrometer>(),
            self.dy.get::<micrometer>()
        )?;
        writeln!(
            f,
            "range x = {:.4} mm, range y = {:.4} mm",
            self.range_x.get::<millimeter>(),
            self.range_y.get::<millimeter>()
        )?;
        write!(
            f,
            "Rx = {:.6} m, Ry = {:.6} m",
            self.rx.get::<meter>(),
            self.ry.get::<meter>()
        )
    }
}

/// Writes wavefront diagnostics and plots.
///
/// Only the primary process of a (possibly distributed) run reports, all other reporters are silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter {
    is_primary: bool,
    plot_dir: Option<PathBuf>,
    format: PlotFormat,
}
impl Reporter {
    /// Creates a new [`Reporter`]. No plots are created if `plot_dir` is `None`.
    #[must_use]
    pub const fn new(is_primary: bool, plot_dir: Option<PathBuf>, format: PlotFormat) -> Self {
        Self {
            is_primary,
            plot_dir,
            format,
        }
    }
    /// Returns `true` if this reporter produces output.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.is_primary
    }
    /// Write the [`WavefrontInfo`] of `wavefront` to `out` and plot its intensity and phase.
    ///
    /// The plots are named `intensity_<keyword>`, `intensity_cuts_<keyword>` and `phase_<keyword>`.
    /// Returns the paths of the created plot files.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the mesh has a single pixel axis.
    ///   - writing to `out` fails.
    ///   - the engine fails to extract the intensity or phase.
    ///   - a plot cannot be written.
    pub fn report<E: SrwEngine + ?Sized>(
        &self,
        engine: &mut E,
        wavefront: &Wavefront,
        keyword: &str,
        out: &mut dyn Write,
    ) -> HermesResult<Vec<PathBuf>> {
        if !self.is_primary {
            return Ok(Vec::new());
        }
        let info = WavefrontInfo::new(wavefront)?;
        writeln!(out, "\n{info}").map_err(|e| {
            HermesError::Report(format!("writing wavefront information failed: {e}"))
        })?;
        let Some(plot_dir) = &self.plot_dir else {
            return Ok(Vec::new());
        };
        let mesh = wavefront.mesh();
        let energy = mesh.e_start();
        let intensity =
            engine.calc_int_from_elec_field(wavefront, &IntensityRequest::intensity_map(energy))?;
        let cut_x = engine.calc_int_from_elec_field(
            wavefront,
            &IntensityRequest::intensity_cut(energy, Dependence::X),
        )?;
        let cut_y = engine.calc_int_from_elec_field(
            wavefront,
            &IntensityRequest::intensity_cut(energy, Dependence::Y),
        )?;
        let phase =
            engine.calc_int_from_elec_field(wavefront, &IntensityRequest::phase_map(energy))?;

        let plot_files = vec![
            self.plot_file(plot_dir, "intensity", keyword),
            self.plot_file(plot_dir, "intensity_cuts", keyword),
            self.plot_file(plot_dir, "phase", keyword),
        ];
        self.plot_colormesh(
            &plot_files[0],
            mesh,
            &intensity,
            &format!("Intensity {keyword} Propagation"),
        )?;
        self.plot_cuts(
            &plot_files[1],
            mesh,
            (cut_x.as_slice(), cut_y.as_slice()),
            &format!("Intensity {keyword} Propagation"),
        )?;
        self.plot_colormesh(
            &plot_files[2],
            mesh,
            &phase,
            &format!("Phase {keyword} Propagation"),
        )?;
        for file in &plot_files {
            info!("plot written to {}", file.display());
        }
        Ok(plot_files)
    }
    fn plot_file(&self, plot_dir: &Path, quantity: &str, keyword: &str) -> PathBuf {
        let mut path = plot_dir.join(format!("{quantity}_{keyword}"));
        path.set_extension(self.format.as_ref());
        path
    }
    fn plot_colormesh(
        &self,
        path: &Path,
        mesh: &RadMesh,
        data: &[f64],
        title: &str,
    ) -> HermesResult<()> {
        if data.len() != mesh.nx() * mesh.ny() {
            return Err(HermesError::Report(format!(
                "map holds {} values, expected {}",
                data.len(),
                mesh.nx() * mesh.ny()
            )));
        }
        let x_ax = axis_mm(mesh.x_start(), mesh.x_fin(), mesh.nx());
        let y_ax = axis_mm(mesh.y_start(), mesh.y_fin(), mesh.ny());
        let z_dat = DMatrix::from_row_slice(mesh.ny(), mesh.nx(), data);
        match self.format {
            PlotFormat::Png => {
                let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
                draw_colormesh(&root, &x_ax, &y_ax, &z_dat, &TURBO, title)
            }
            PlotFormat::Svg => {
                let root = SVGBackend::new(path, FIG_SIZE).into_drawing_area();
                draw_colormesh(&root, &x_ax, &y_ax, &z_dat, &TURBO, title)
            }
        }
    }
    fn plot_cuts(
        &self,
        path: &Path,
        mesh: &RadMesh,
        (cut_x, cut_y): (&[f64], &[f64]),
        title: &str,
    ) -> HermesResult<()> {
        if cut_x.len() != mesh.nx() || cut_y.len() != mesh.ny() {
            return Err(HermesError::Report(
                "length of intensity cuts does not match the mesh".into(),
            ));
        }
        let x_ax = axis_mm(mesh.x_start(), mesh.x_fin(), mesh.nx());
        let y_ax = axis_mm(mesh.y_start(), mesh.y_fin(), mesh.ny());
        let series = [(X_LABEL, &x_ax, cut_x), (Y_LABEL, &y_ax, cut_y)];
        match self.format {
            PlotFormat::Png => {
                let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
                draw_lines(&root, &series, title)
            }
            PlotFormat::Svg => {
                let root = SVGBackend::new(path, FIG_SIZE).into_drawing_area();
                draw_lines(&root, &series, title)
            }
        }
    }
}

fn plot_error(e: impl Display) -> HermesError {
    HermesError::Report(format!("plotting failed: {e}"))
}

fn axis_mm(start: Length, fin: Length, n: usize) -> Vec<f64> {
    let (start, fin) = (start.get::<millimeter>(), fin.get::<millimeter>());
    if n < 2 {
        return vec![start];
    }
    let step = (fin - start) / usize_to_f64(n - 1);
    (0..n)
        .map(|i| usize_to_f64(i).mul_add(step, start))
        .collect()
}

/// Minimum and maximum of the finite values (`(0, 1)` if there are none), never collapsing to a single value.
fn finite_bounds<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(*v), max.max(*v))
        });
    if min > max {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON * max.abs().max(1.0) {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn tick_formatter(range: &(f64, f64)) -> impl Fn(&f64) -> String {
    let log_val = range
        .1
        .abs()
        .max(range.0.abs())
        .log10()
        .floor()
        .to_i32()
        .unwrap_or(0);
    move |v: &_| match log_val {
        -3 | -2 => format!("{v:.3}"),
        -1 | 0 => format!("{v:.2}"),
        1 => format!("{v:.1}"),
        2 => format!("{v:.0}"),
        _ => format!("{v:.2e}"),
    }
}

fn color(cmap: &Gradient, t: f64) -> ShapeStyle {
    let c = cmap.eval_continuous(t.clamp(0.0, 1.0));
    RGBAColor(c.r, c.g, c.b, 1.).filled()
}

fn draw_colormesh<B: DrawingBackend>(
    root: &DrawingArea<B, Shift>,
    x_ax: &[f64],
    y_ax: &[f64],
    z_dat: &DMatrix<f64>,
    cmap: &Gradient,
    title: &str,
) -> HermesResult<()> {
    root.fill(&WHITE).map_err(plot_error)?;
    let (main_root, cbar_root) = root.split_horizontally(FIG_SIZE.0 - COLORBAR_WIDTH);
    let x_bounds = finite_bounds(x_ax);
    let y_bounds = finite_bounds(y_ax);
    let (z_min, z_max) = finite_bounds(z_dat.iter());
    // half pixel, rectangles are centered on the mesh points
    let x_dist = 0.5 * (x_bounds.1 - x_bounds.0) / usize_to_f64(x_ax.len().max(2) - 1);
    let y_dist = 0.5 * (y_bounds.1 - y_bounds.0) / usize_to_f64(y_ax.len().max(2) - 1);

    let mut chart = ChartBuilder::on(&main_root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(30)
        .x_label_area_size(65)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (x_bounds.0 - x_dist)..(x_bounds.1 + x_dist),
            (y_bounds.0 - y_dist)..(y_bounds.1 + y_dist),
        )
        .map_err(plot_error)?;
    let x_format = tick_formatter(&x_bounds);
    let y_format = tick_formatter(&y_bounds);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_label_formatter(&x_format)
        .y_label_formatter(&y_format)
        .label_style(("sans-serif", 24).into_font())
        .draw()
        .map_err(plot_error)?;
    let z_span = z_max - z_min;
    let series = izip!(iproduct!(x_ax.iter(), y_ax.iter()), z_dat.iter()).map(|((x, y), z)| {
        Rectangle::new(
            [(x - x_dist, y + y_dist), (x + x_dist, y - y_dist)],
            color(cmap, (z - z_min) / z_span),
        )
    });
    chart.draw_series(series).map_err(plot_error)?;

    let mut cbar = ChartBuilder::on(&cbar_root)
        .margin(30)
        .margin_top(70)
        .y_label_area_size(100)
        .x_label_area_size(65)
        .build_cartesian_2d(0.0..1.0, z_min..z_max)
        .map_err(plot_error)?;
    let z_format = tick_formatter(&(z_min, z_max));
    cbar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&z_format)
        .label_style(("sans-serif", 24).into_font())
        .draw()
        .map_err(plot_error)?;
    let steps = 100;
    let step = z_span / f64::from(steps);
    cbar.draw_series((0..steps).map(|i| {
        let z = f64::from(i).mul_add(step, z_min);
        Rectangle::new(
            [(0.0, z), (1.0, z + step)],
            color(cmap, (z - z_min) / z_span),
        )
    }))
    .map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_lines<B: DrawingBackend>(
    root: &DrawingArea<B, Shift>,
    series: &[(&str, &Vec<f64>, &[f64])],
    title: &str,
) -> HermesResult<()> {
    root.fill(&WHITE).map_err(plot_error)?;
    let x_bounds = finite_bounds(series.iter().flat_map(|s| s.1.iter()));
    let y_bounds = finite_bounds(series.iter().flat_map(|s| s.2.iter()));
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(30)
        .x_label_area_size(65)
        .y_label_area_size(100)
        .build_cartesian_2d(x_bounds.0..x_bounds.1, y_bounds.0..y_bounds.1)
        .map_err(plot_error)?;
    let x_format = tick_formatter(&x_bounds);
    let y_format = tick_formatter(&y_bounds);
    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_desc("Position [mm]")
        .y_desc("Intensity")
        .x_label_formatter(&x_format)
        .y_label_formatter(&y_format)
        .label_style(("sans-serif", 24).into_font())
        .draw()
        .map_err(plot_error)?;
    for ((label, positions, values), line_color) in series.iter().zip([BLUE, RED]) {
        if positions.len() != values.len() {
            warn!("Shapes of x and y do not match! Skipping {label}.");
            continue;
        }
        chart
            .draw_series(LineSeries::new(
                positions.iter().copied().zip(values.iter().copied()),
                line_color.stroke_width(2),
            ))
            .map_err(plot_error)?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2))
            });
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(BLACK.mix(0.05))
        .border_style(BLACK)
        .label_font(("sans-serif", 20).into_font())
        .draw()
        .map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        electronvolt,
        engine::{DryRunEngine, EngineCall},
        magnetic_field::{MagneticFieldContainer, Undulator},
        meter, millimeter,
        precision::SrPrecision,
        tesla,
    };
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;

    fn wavefront(nx: usize, ny: usize) -> Wavefront {
        Wavefront::new(
            RadMesh::centered(
                electronvolt!(719.9),
                (millimeter!(5.0), millimeter!(5.0)),
                (nx, ny),
                meter!(18.151),
            )
            .unwrap(),
        )
    }
    #[test]
    fn info() {
        let info = WavefrontInfo::new(&wavefront(100, 100)).unwrap();
        assert_abs_diff_eq!(
            info.pitch().0.get::<micrometer>(),
            50.505_050_505,
            epsilon = 1e-8
        );
        assert_eq!(info.range().1, millimeter!(5.0));
    }
    #[test]
    fn info_display() {
        let mut wfr = wavefront(100, 100);
        wfr.set_radii(meter!(18.151), meter!(-3.5));
        assert_eq!(
            WavefrontInfo::new(&wfr).unwrap().to_string(),
            "Wavefront information:\n\
             Nx = 100, Ny = 100\n\
             dx = 50.5051 um, dy = 50.5051 um\n\
             range x = 5.0000 mm, range y = 5.0000 mm\n\
             Rx = 18.151000 m, Ry = -3.500000 m"
        );
    }
    #[test]
    fn info_single_pixel() {
        assert_matches!(
            WavefrontInfo::new(&wavefront(1, 100)),
            Err(HermesError::Mesh(_))
        );
    }
    #[test]
    fn non_primary_is_silent() {
        let dir = TempDir::new().unwrap();
        let reporter = Reporter::new(false, Some(dir.path().to_path_buf()), PlotFormat::Png);
        let mut engine = DryRunEngine::default();
        let mut out = Vec::new();
        let files = reporter
            .report(&mut engine, &wavefront(10, 10), "before", &mut out)
            .unwrap();
        assert!(files.is_empty());
        assert!(out.is_empty());
        assert!(engine.calls().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
    #[test]
    fn report_without_plots() {
        let reporter = Reporter::new(true, None, PlotFormat::Svg);
        let mut engine = DryRunEngine::default();
        let mut out = Vec::new();
        let files = reporter
            .report(&mut engine, &wavefront(100, 100), "before", &mut out)
            .unwrap();
        assert!(files.is_empty());
        assert!(engine.calls().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\nWavefront information:\nNx = 100, Ny = 100\n"));
    }
    #[test]
    fn report_with_plots() {
        let field = MagneticFieldContainer::single(
            Undulator::planar(millimeter!(64.0), 28, tesla!(0.176_894)).unwrap(),
        );
        for format in PlotFormat::iter() {
            let dir = TempDir::new().unwrap();
            let reporter = Reporter::new(true, Some(dir.path().to_path_buf()), format);
            let mut engine = DryRunEngine::default();
            let mut wfr = wavefront(20, 20);
            engine
                .calc_elec_field_sr(&mut wfr, &field, &SrPrecision::default())
                .unwrap();
            let mut out = Vec::new();
            let files = reporter
                .report(&mut engine, &wfr, "before", &mut out)
                .unwrap();
            let expected: Vec<PathBuf> = ["intensity", "intensity_cuts", "phase"]
                .iter()
                .map(|quantity| dir.path().join(format!("{quantity}_before.{format}")))
                .collect();
            assert_eq!(files, expected);
            for file in &files {
                assert!(std::fs::metadata(file).unwrap().len() > 0);
            }
            let requests: Vec<(u8, u8, u8)> = engine.calls()[1..]
                .iter()
                .map(|call| match call {
                    EngineCall::Intensity(r) => {
                        (r.polarization.code(), r.kind.code(), r.dependence.code())
                    }
                    other => panic!("unexpected engine call {other:?}"),
                })
                .collect();
            assert_eq!(requests, vec![(6, 0, 3), (6, 0, 1), (6, 0, 2), (0, 4, 3)]);
            assert!(String::from_utf8(out).unwrap().contains("Nx = 20, Ny = 20"));
        }
    }
    #[test]
    fn plot_file_names() {
        let reporter = Reporter::new(true, None, PlotFormat::Svg);
        assert_eq!(
            reporter.plot_file(Path::new("plots"), "phase", "after"),
            PathBuf::from("plots/phase_after.svg")
        );
        assert_eq!(PlotFormat::default().to_string(), "png");
    }
    #[test]
    fn plot_size_mismatch() {
        let reporter = Reporter::new(true, None, PlotFormat::Png);
        let wfr = wavefront(4, 4);
        assert_matches!(
            reporter.plot_colormesh(Path::new("unused.png"), wfr.mesh(), &[0.0; 15], "title"),
            Err(HermesError::Report(_))
        );
        assert!(reporter
            .plot_cuts(
                Path::new("unused.png"),
                wfr.mesh(),
                (&[0.0; 4][..], &[0.0; 3][..]),
                "title"
            )
            .is_err());
    }
    #[test]
    fn bounds() {
        assert_eq!(finite_bounds(&[1.0, f64::NAN, -2.0, 3.0]), (-2.0, 3.0));
        assert_eq!(finite_bounds(&[f64::NAN]), (0.0, 1.0));
        assert_eq!(finite_bounds(&[0.0, 0.0]), (-0.5, 0.5));
    }
    #[test]
    fn axis() {
        let ax = axis_mm(millimeter!(-2.5), millimeter!(2.5), 11);
        assert_eq!(ax.len(), 11);
        assert_abs_diff_eq!(ax[10], 2.5, epsilon = 1e-12);
        assert_eq!(axis_mm(millimeter!(1.0), millimeter!(1.0), 1), vec![1.0]);
    }
    #[test]
    fn ticks() {
        let fmt = tick_formatter(&(-2.5, 2.5));
        assert_eq!(fmt(&1.234), "1.23");
        let fmt = tick_formatter(&(0.0, 250.0));
        assert_eq!(fmt(&125.4), "125");
    }
}
