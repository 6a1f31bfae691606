// State module - spec outcomes and in-flight uploads

pub mod outcome;
pub mod pending;

pub use outcome::{Environment, SpecOutcome};
pub use pending::{PendingUploads, UploadId};
