//! Application services for foreign server reconciliation.

mod reconciler;
mod settings;

pub use reconciler::{
    FdwReconciler, FdwReconcilerError, FdwReconcilerResult, ImportSchemaRequest,
};
pub use settings::load_settings;
