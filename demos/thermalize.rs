//! Cold-start thermalization at β = 5.5 on a 4⁴ lattice.
//!
//! Prints the average plaquette after every sweep; the value starts at 1.0
//! and settles near the literature value ~0.50 within a few dozen sweeps.
//!
//! Run with: cargo run --release --example thermalize

use lattice_heatbath::prelude::*;

fn main() -> Result<(), SimulationError> {
    let geometry = LatticeGeometry::new(&[4, 4, 4, 4])?;
    let action = WilsonAction::new(5.5, 1.0)?;
    let mut field = GaugeField::cold_start(geometry.clone());
    let mut scheduler = SweepScheduler::new(&geometry, action, SweepParams::new(2024));

    println!("4^4 SU(3) Wilson action, beta = 5.5, cold start");
    println!("{:>6} {:>12} {:>12}", "sweep", "plaquette", "rectangle");
    println!("{:>6} {:>12.6} {:>12.6}", 0, average_plaquette(&field), average_rectangle(&field));

    for sweep in 1..=100 {
        let plaq = scheduler.sweep(&mut field)?;
        if sweep % 5 == 0 {
            println!(
                "{:>6} {:>12.6} {:>12.6}",
                sweep,
                plaq,
                average_rectangle(&field)
            );
        }
    }

    let history = scheduler.run(&mut field, 20)?;
    let tail = history.iter().sum::<f64>() / history.len() as f64;
    println!("tail average over 20 further sweeps: {tail:.6}");
    Ok(())
}
