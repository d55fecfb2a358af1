//! Lattice gauge actions and their staple sums.
//!
//! The heatbath step only ever needs the **staple** Σ at a link: the sum of
//! the products of the other links closing every elementary loop through it,
//! defined here so that each loop is `U·Σ_term`. The local action is then
//! `−(β/3)·Re Tr(U·Σ)` and the conditional link distribution is
//! `P(U′) ∝ exp((β/3)·Re Tr(U′·Σ))`.
//!
//! Two action families share the single-staple contract: the Wilson
//! plaquette action and the rectangle-improved action (plaquette plus 2×1
//! rectangle loops with Lüscher–Weisz coefficients 5/3 and −1/12, with
//! tadpole factors 1/u₀⁴ and 1/u₀⁶).
//!
//! Action evaluation never mutates the field.

use crate::error::SimulationError;
use crate::field::GaugeField;
use crate::geometry::Sign;
use crate::sun::Matrix3;

/// A plaquette-based action functional, reduced to its staple contract.
pub trait GaugeAction: Send + Sync {
    /// Inverse coupling β.
    fn beta(&self) -> f64;

    /// Staple sum Σ at (site, direction), including action coefficients,
    /// defined so each closed loop reads `U·Σ_term`.
    fn staple(&self, field: &GaugeField, site: usize, direction: usize) -> Matrix3;

    /// Farthest same-direction link, in lattice hops, that `staple` reads.
    ///
    /// The sweep scheduler may batch equal-parity links only when the staple
    /// stays within one hop; wider staples reach equal-parity links and force
    /// a sequential sweep.
    fn staple_range(&self) -> usize {
        1
    }

    /// Local action contribution of one link: `−(β/3)·Re Tr(U·Σ)`.
    /// Diagnostic only; the update path works with the staple directly.
    fn local_action(&self, field: &GaugeField, site: usize, direction: usize) -> f64 {
        let w = *field.link(site, direction) * self.staple(field, site, direction);
        -(self.beta() / 3.0) * w.re_trace()
    }
}

/// Standard Wilson plaquette action.
#[derive(Debug, Clone)]
pub struct WilsonAction {
    beta: f64,
    u0: f64,
}

impl WilsonAction {
    /// β must be positive; u₀ is the tadpole coefficient (1.0 disables it).
    pub fn new(beta: f64, u0: f64) -> Result<Self, SimulationError> {
        check_couplings(beta, u0)?;
        Ok(Self { beta, u0 })
    }
}

impl GaugeAction for WilsonAction {
    fn beta(&self) -> f64 {
        self.beta
    }

    fn staple(&self, field: &GaugeField, site: usize, direction: usize) -> Matrix3 {
        plaquette_staple(field, site, direction).scale(1.0 / self.u0.powi(4))
    }
}

/// Rectangle-improved action: 5/3 plaquette − 1/12 rectangle, tadpole-scaled.
#[derive(Debug, Clone)]
pub struct RectangleImprovedAction {
    beta: f64,
    u0: f64,
}

impl RectangleImprovedAction {
    pub fn new(beta: f64, u0: f64) -> Result<Self, SimulationError> {
        check_couplings(beta, u0)?;
        Ok(Self { beta, u0 })
    }
}

impl GaugeAction for RectangleImprovedAction {
    fn beta(&self) -> f64 {
        self.beta
    }

    fn staple(&self, field: &GaugeField, site: usize, direction: usize) -> Matrix3 {
        let plaq = plaquette_staple(field, site, direction).scale(5.0 / 3.0 / self.u0.powi(4));
        let rect = rectangle_staple(field, site, direction).scale(1.0 / 12.0 / self.u0.powi(6));
        plaq - rect
    }

    fn staple_range(&self) -> usize {
        // Rectangle paths touch same-direction links two hops away
        2
    }
}

fn check_couplings(beta: f64, u0: f64) -> Result<(), SimulationError> {
    if !beta.is_finite() || beta <= 0.0 {
        return Err(SimulationError::Configuration(format!(
            "inverse coupling beta must be positive, got {beta}"
        )));
    }
    if !u0.is_finite() || u0 <= 0.0 {
        return Err(SimulationError::Configuration(format!(
            "tadpole coefficient u0 must be positive, got {u0}"
        )));
    }
    Ok(())
}

/// Unweighted plaquette staple: for each ν ≠ μ, the forward path
/// `+ν, −μ, −ν` and backward path `−ν, −μ, +ν` starting from the far end of
/// the link, x + μ̂.
fn plaquette_staple(field: &GaugeField, site: usize, mu: usize) -> Matrix3 {
    let geometry = field.geometry();
    let start = geometry.shift(site, mu, Sign::Plus);
    let mut sum = Matrix3::zero();
    for nu in 0..geometry.dims() {
        if nu == mu {
            continue;
        }
        sum = sum
            + field.path_product(start, &[(nu, Sign::Plus), (mu, Sign::Minus), (nu, Sign::Minus)])
            + field.path_product(start, &[(nu, Sign::Minus), (mu, Sign::Minus), (nu, Sign::Plus)]);
    }
    sum
}

/// Unweighted rectangle staple: the six five-link paths per orthogonal
/// direction closing a 2×1 loop through the link (side, far-side and tall
/// rectangles, each in both ν orientations).
fn rectangle_staple(field: &GaugeField, site: usize, mu: usize) -> Matrix3 {
    let geometry = field.geometry();
    let start = geometry.shift(site, mu, Sign::Plus);
    let mut sum = Matrix3::zero();
    for nu in 0..geometry.dims() {
        if nu == mu {
            continue;
        }
        for sign in [Sign::Plus, Sign::Minus] {
            let back = match sign {
                Sign::Plus => Sign::Minus,
                Sign::Minus => Sign::Plus,
            };
            // Link is the first leg of the doubled-μ side
            sum = sum
                + field.path_product(
                    start,
                    &[(mu, Sign::Plus), (nu, sign), (mu, Sign::Minus), (mu, Sign::Minus), (nu, back)],
                );
            // Link is the second leg of the doubled-μ side
            sum = sum
                + field.path_product(
                    start,
                    &[(nu, sign), (mu, Sign::Minus), (mu, Sign::Minus), (nu, back), (mu, Sign::Plus)],
                );
            // Link is the single rung of the ν-doubled rectangle
            sum = sum
                + field.path_product(
                    start,
                    &[(nu, sign), (nu, sign), (mu, Sign::Minus), (nu, back), (nu, back)],
                );
        }
    }
    sum
}

/// Plaquette observable `(1/3)·Re Tr` of the elementary μν loop at a site.
pub fn plaquette(field: &GaugeField, site: usize, mu: usize, nu: usize) -> f64 {
    let loop_product = field.path_product(
        site,
        &[(mu, Sign::Plus), (nu, Sign::Plus), (mu, Sign::Minus), (nu, Sign::Minus)],
    );
    loop_product.re_trace() / 3.0
}

/// 2×1 rectangle observable, doubled along μ.
pub fn rectangle(field: &GaugeField, site: usize, mu: usize, nu: usize) -> f64 {
    let loop_product = field.path_product(
        site,
        &[
            (mu, Sign::Plus),
            (mu, Sign::Plus),
            (nu, Sign::Plus),
            (mu, Sign::Minus),
            (mu, Sign::Minus),
            (nu, Sign::Minus),
        ],
    );
    loop_product.re_trace() / 3.0
}

/// Mean plaquette over all sites and unordered direction pairs.
/// Exactly 1.0 on a cold-start field; the standard equilibration monitor.
pub fn average_plaquette(field: &GaugeField) -> f64 {
    let geometry = field.geometry();
    let dims = geometry.dims();
    let mut total = 0.0;
    for site in 0..geometry.site_count() {
        for mu in 0..dims {
            for nu in (mu + 1)..dims {
                total += plaquette(field, site, mu, nu);
            }
        }
    }
    let loops_per_site = dims * (dims - 1) / 2;
    total / (geometry.site_count() * loops_per_site) as f64
}

/// Mean rectangle over all sites and ordered direction pairs.
/// Secondary equilibration cross-check (~0.26 at β = 5.5 on 4⁴).
pub fn average_rectangle(field: &GaugeField) -> f64 {
    let geometry = field.geometry();
    let dims = geometry.dims();
    let mut total = 0.0;
    for site in 0..geometry.site_count() {
        for mu in 0..dims {
            for nu in 0..dims {
                if nu != mu {
                    total += rectangle(field, site, mu, nu);
                }
            }
        }
    }
    total / (geometry.site_count() * dims * (dims - 1)) as f64
}
