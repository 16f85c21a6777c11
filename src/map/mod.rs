//! Plant map: document model, map service, mirror reconciliation

pub mod models;
pub mod reconciler;
pub mod service;

pub use models::{MapSnapshot, StatusType, TaskType, Tracker};
pub use reconciler::MirrorReconciler;
pub use service::MapService;
