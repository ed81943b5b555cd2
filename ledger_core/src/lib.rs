//! Pure normalization engine: decomposes enriched transactions into signed
//! per-asset movements relative to a managed wallet set and classifies each
//! transaction into a semantic type. No I/O; noisy upstream fields degrade
//! to zero/empty instead of erroring.

pub mod classify;
pub mod movement;
pub mod rows;

pub use classify::{derive_type, is_bubblegum_spam, is_self_transfer, DerivedType};
pub use movement::{decompose, lamports_to_sol, Movement};
pub use rows::{build_rows, LedgerRow};
