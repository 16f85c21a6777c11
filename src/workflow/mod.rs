//! Status-request workflow: submission, deduplication, admin decisions

pub mod manager;
pub mod models;

pub use manager::RequestWorkflow;
pub use models::{
    DecisionAction, RequestStatus, SubmitStatusRequest, TrackerStatusRequest,
};
