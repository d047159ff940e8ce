pub mod export;
pub mod group;
pub mod reconcile;
pub mod validate;

pub use export::export_metadata;
pub use group::{ChannelGroup, ProvenanceDocument};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use validate::Validator;
