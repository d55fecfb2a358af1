//! Hot-start vs cold-start convergence at fixed β.
//!
//! Both trajectories must settle on the same equilibrium average plaquette:
//! the cold start approaches it from above (ordered), the hot start from
//! below (disordered). Watching the two columns merge is the classic
//! detailed-balance sanity check.
//!
//! Run with: cargo run --release --example hot_vs_cold

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lattice_heatbath::prelude::*;

fn main() -> Result<(), SimulationError> {
    let geometry = LatticeGeometry::new(&[4, 4, 4, 4])?;
    let beta = 5.5;

    let mut cold = GaugeField::cold_start(geometry.clone());
    let mut cold_sched = SweepScheduler::new(
        &geometry,
        WilsonAction::new(beta, 1.0)?,
        SweepParams::new(101),
    );

    let mut start_rng = ChaCha8Rng::seed_from_u64(202);
    let mut hot = GaugeField::hot_start(geometry.clone(), &mut start_rng);
    let mut hot_sched = SweepScheduler::new(
        &geometry,
        WilsonAction::new(beta, 1.0)?,
        SweepParams::new(303),
    );

    println!("4^4 SU(3) Wilson action, beta = {beta}");
    println!("{:>6} {:>12} {:>12}", "sweep", "cold", "hot");
    for sweep in 1..=80 {
        let cold_plaq = cold_sched.sweep(&mut cold)?;
        let hot_plaq = hot_sched.sweep(&mut hot)?;
        if sweep % 4 == 0 {
            println!("{sweep:>6} {cold_plaq:>12.6} {hot_plaq:>12.6}");
        }
    }
    Ok(())
}
