//! Gauge-field container: one SU(3) matrix per directed link.
//!
//! Links are stored in a flat vector keyed by `site × dims + direction`,
//! mirroring the site-index bijection of [`LatticeGeometry`]. The field is
//! owned exclusively by whatever drives the update; readers may share it,
//! and the sweep scheduler is the only writer during a run.
//!
//! Invariant: every stored matrix is unitary with unit determinant to within
//! tolerance, except transiently inside an in-flight update. The checked
//! setter enforces this; violations surface as `NumericalDivergence` with the
//! offending link, never a silent correction.

use num_complex::Complex64;
use rand::Rng;

use crate::error::SimulationError;
use crate::geometry::{LatticeGeometry, Sign};
use crate::sun::Matrix3;

/// One signed hop of a link path.
pub type Step = (usize, Sign);

/// Gauge-link configuration over a lattice geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeField {
    geometry: LatticeGeometry,
    links: Vec<Matrix3>,
}

impl GaugeField {
    /// Cold start: identity on every link, the maximally ordered
    /// (zero-temperature) configuration. Average plaquette is exactly 1.
    pub fn cold_start(geometry: LatticeGeometry) -> Self {
        let links = vec![Matrix3::identity(); geometry.link_count()];
        Self { geometry, links }
    }

    /// Hot start: Haar-random SU(3) on every link, the maximally disordered
    /// configuration. Used to verify that independent thermalization runs
    /// converge to the same equilibrium statistics.
    pub fn hot_start<R: Rng + ?Sized>(geometry: LatticeGeometry, rng: &mut R) -> Self {
        let links = (0..geometry.link_count())
            .map(|_| Matrix3::haar_random(rng))
            .collect();
        Self { geometry, links }
    }

    pub fn geometry(&self) -> &LatticeGeometry {
        &self.geometry
    }

    fn link_index(&self, site: usize, direction: usize) -> usize {
        debug_assert!(site < self.geometry.site_count());
        debug_assert!(direction < self.geometry.dims());
        site * self.geometry.dims() + direction
    }

    /// Current link matrix at (site, direction).
    pub fn link(&self, site: usize, direction: usize) -> &Matrix3 {
        &self.links[self.link_index(site, direction)]
    }

    /// Replace a link without validation. The caller owns the unitarity
    /// invariant; the update path goes through [`set_link_checked`].
    ///
    /// [`set_link_checked`]: GaugeField::set_link_checked
    pub fn set_link(&mut self, site: usize, direction: usize, matrix: Matrix3) {
        let idx = self.link_index(site, direction);
        self.links[idx] = matrix;
    }

    /// Replace a link, enforcing ‖U†U − I‖ and |det U − 1| below `tolerance`.
    pub fn set_link_checked(
        &mut self,
        site: usize,
        direction: usize,
        matrix: Matrix3,
        tolerance: f64,
    ) -> Result<(), SimulationError> {
        let deviation = matrix
            .unitarity_deviation()
            .max((matrix.determinant() - Complex64::new(1.0, 0.0)).norm());
        if deviation > tolerance {
            return Err(SimulationError::NumericalDivergence {
                site,
                direction,
                deviation,
            });
        }
        self.set_link(site, direction, matrix);
        Ok(())
    }

    /// Project every link back onto SU(3) by Gram–Schmidt.
    ///
    /// Explicit maintenance against floating-point drift over long runs;
    /// never invoked by the update path itself.
    pub fn reunitarize(&mut self) {
        for link in self.links.iter_mut() {
            *link = link.reunitarized();
        }
    }

    /// Ordered product of link matrices along a path of signed hops starting
    /// at `start`. A `Plus` hop multiplies the link leaving the current site;
    /// a `Minus` hop moves first and multiplies the adjoint of the link
    /// pointing back. Directions must be valid for the geometry.
    pub fn path_product(&self, start: usize, steps: &[Step]) -> Matrix3 {
        let mut out = Matrix3::identity();
        let mut site = start;
        for &(direction, sign) in steps {
            match sign {
                Sign::Plus => {
                    out = out * *self.link(site, direction);
                    site = self.geometry.shift(site, direction, Sign::Plus);
                }
                Sign::Minus => {
                    site = self.geometry.shift(site, direction, Sign::Minus);
                    out = out * self.link(site, direction).adjoint();
                }
            }
        }
        out
    }

    /// Largest entry-wise deviation between two fields over all links.
    /// Zero means bit-identical configurations.
    pub fn max_link_deviation(&self, other: &GaugeField) -> f64 {
        debug_assert_eq!(self.geometry, other.geometry);
        self.links
            .iter()
            .zip(other.links.iter())
            .map(|(a, b)| a.max_abs_diff(b))
            .fold(0.0, f64::max)
    }
}
