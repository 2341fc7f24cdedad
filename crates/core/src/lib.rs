//! Non-local pseudopotential operators (D, Q, Hubbard U) for a plane-wave
//! DFT solver: packed per-atom storage, chunked projector application, and
//! the orchestration routines sharing the projector inner products.

pub mod apply;
pub mod backend;
pub mod beta;
pub mod context;
pub mod hubbard;
pub mod io;
pub mod linalg;
pub mod mirror;
pub mod operator;
pub mod packed;
pub mod spin;
pub mod unit_cell;
pub mod wave_functions;

#[cfg(test)]
mod _tests_operator;
#[cfg(test)]
mod _tests_packed;
