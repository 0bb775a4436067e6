//! The `lake_core` crate computes the equilibria and trajectories of the shallow lake
//! phosphorus model `dP/dt = P^q / (1 + P^q) - b P + l`.
//!
//! Key components:
//! - **Model**: `LakeParameters` (b, q), the rate function and its derivative.
//! - **Polynomial**: the equilibrium polynomial and a companion-matrix root finder.
//! - **Classifier**: splits equilibria into oligotrophic, unstable and eutrophic branches.
//! - **Sweep**: scans the input `l` and records where each branch first appears.
//! - **Trajectory**: forward-Euler runs under constant or ramping inputs.
pub mod classifier;
pub mod error;
pub mod model;
pub mod polynomial;
pub mod solvers;
pub mod sweep;
pub mod trajectory;
pub mod traits;
