pub mod reconciler;

pub use reconciler::{ReconcileError, ReconcileOptions, Reconciler};
