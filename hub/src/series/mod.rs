//! Multi-symbol alignment, EMA smoothing and base-100 indexing.

pub mod align;
pub mod ema;
pub mod index;

pub use align::{align, Observation};
pub use index::{index_series, IndexedRow};
