//! Periodic hypercubic lattice geometry.
//!
//! The lattice is a regular, fully computable topology, so sites live in a
//! flat index space with an index ↔ coordinate bijection rather than a
//! pointer graph. The first extent varies slowest (lexicographic order).
//!
//! A **link** is a (site, direction) pair; there are `site_count × dims`
//! links in total. All methods are pure and safe for concurrent reads.

use smallvec::SmallVec;

use crate::error::SimulationError;

/// Coordinate vector; inline storage covers the usual 4D case.
pub type Coords = SmallVec<[usize; 4]>;

/// Orientation of a unit hop along a lattice axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// Immutable lattice extents with periodic neighbor lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeGeometry {
    extents: SmallVec<[usize; 4]>,
    site_count: usize,
}

impl LatticeGeometry {
    /// Create a geometry from per-dimension extents.
    ///
    /// Rejects an empty extent list and any extent below 1.
    pub fn new(extents: &[usize]) -> Result<Self, SimulationError> {
        if extents.is_empty() {
            return Err(SimulationError::Configuration(
                "lattice needs at least one dimension".into(),
            ));
        }
        if let Some(&bad) = extents.iter().find(|&&e| e < 1) {
            return Err(SimulationError::Configuration(format!(
                "lattice extent must be positive, got {bad}"
            )));
        }
        let site_count = extents.iter().product();
        Ok(Self {
            extents: SmallVec::from_slice(extents),
            site_count,
        })
    }

    /// Per-dimension extents.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Number of dimensions.
    pub fn dims(&self) -> usize {
        self.extents.len()
    }

    /// Total number of sites.
    pub fn site_count(&self) -> usize {
        self.site_count
    }

    /// Total number of links: one per site per direction.
    pub fn link_count(&self) -> usize {
        self.site_count * self.dims()
    }

    /// Convert a site index to its coordinate vector.
    pub fn site_to_coords(&self, site: usize) -> Coords {
        debug_assert!(site < self.site_count);
        let mut coords: Coords = SmallVec::from_elem(0, self.dims());
        let mut rest = site;
        for d in (0..self.dims()).rev() {
            coords[d] = rest % self.extents[d];
            rest /= self.extents[d];
        }
        coords
    }

    /// Convert a coordinate vector to a site index, wrapping each coordinate
    /// into its extent.
    pub fn coords_to_site(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.dims());
        let mut site = 0;
        for d in 0..self.dims() {
            site = site * self.extents[d] + coords[d] % self.extents[d];
        }
        site
    }

    /// Site reached by one hop in `direction` with periodic wraparound.
    ///
    /// Rejects an out-of-range direction index.
    pub fn neighbor(
        &self,
        site: usize,
        direction: usize,
        sign: Sign,
    ) -> Result<usize, SimulationError> {
        if direction >= self.dims() {
            return Err(SimulationError::Configuration(format!(
                "direction {direction} out of range for a {}-dimensional lattice",
                self.dims()
            )));
        }
        Ok(self.shift(site, direction, sign))
    }

    /// Unchecked hop; `direction` must already be validated against `dims()`.
    pub(crate) fn shift(&self, site: usize, direction: usize, sign: Sign) -> usize {
        debug_assert!(direction < self.dims());
        let extent = self.extents[direction];
        let mut coords = self.site_to_coords(site);
        coords[direction] = match sign {
            Sign::Plus => (coords[direction] + 1) % extent,
            Sign::Minus => (coords[direction] + extent - 1) % extent,
        };
        self.coords_to_site(&coords)
    }

    /// Checkerboard parity of a site: coordinate sum modulo 2.
    pub fn site_parity(&self, site: usize) -> usize {
        self.site_to_coords(site).iter().sum::<usize>() % 2
    }

    /// Whether the even/odd checkerboard is a valid two-coloring, i.e. every
    /// hop flips parity. Fails when any extent is odd (the wraparound hop
    /// then connects sites of equal parity).
    pub fn is_bipartite(&self) -> bool {
        self.extents.iter().all(|&e| e % 2 == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_coords_roundtrip() {
        let geo = LatticeGeometry::new(&[8, 4, 4, 4]).unwrap();
        assert_eq!(geo.site_count(), 512);
        assert_eq!(geo.link_count(), 2048);
        for site in 0..geo.site_count() {
            let coords = geo.site_to_coords(site);
            assert_eq!(geo.coords_to_site(&coords), site);
        }
    }

    #[test]
    fn test_rejects_bad_extents() {
        assert!(LatticeGeometry::new(&[]).is_err());
        assert!(LatticeGeometry::new(&[4, 0, 4]).is_err());
    }

    #[test]
    fn test_neighbor_wraparound() {
        let geo = LatticeGeometry::new(&[4, 4]).unwrap();
        let origin = geo.coords_to_site(&[0, 0]);
        let plus = geo.neighbor(origin, 0, Sign::Plus).unwrap();
        assert_eq!(geo.site_to_coords(plus).as_slice(), &[1, 0]);
        let minus = geo.neighbor(origin, 0, Sign::Minus).unwrap();
        assert_eq!(geo.site_to_coords(minus).as_slice(), &[3, 0]);
        // A full loop of hops returns home
        let mut site = origin;
        for _ in 0..4 {
            site = geo.neighbor(site, 1, Sign::Plus).unwrap();
        }
        assert_eq!(site, origin);
    }

    #[test]
    fn test_neighbor_rejects_bad_direction() {
        let geo = LatticeGeometry::new(&[8, 4, 4, 4]).unwrap();
        let err = geo.neighbor(0, 4, Sign::Plus);
        assert!(matches!(err, Err(SimulationError::Configuration(_))));
    }

    #[test]
    fn test_parity_flips_across_hops() {
        let geo = LatticeGeometry::new(&[4, 4, 4, 4]).unwrap();
        assert!(geo.is_bipartite());
        for site in 0..geo.site_count() {
            for d in 0..geo.dims() {
                let n = geo.neighbor(site, d, Sign::Plus).unwrap();
                assert_ne!(
                    geo.site_parity(site),
                    geo.site_parity(n),
                    "hop must flip checkerboard parity"
                );
            }
        }
    }

    #[test]
    fn test_odd_extent_not_bipartite() {
        let geo = LatticeGeometry::new(&[3, 4]).unwrap();
        assert!(!geo.is_bipartite());
    }
}
