pub mod calendar;
pub mod errors;
pub mod filters;
pub mod learning;
pub mod models;
pub mod queue;
pub mod repo;
pub mod scheduler;
pub mod session;
pub mod stats;

pub use calendar::*;
pub use errors::*;
pub use filters::*;
pub use learning::*;
pub use models::*;
pub use queue::*;
pub use repo::*;
pub use scheduler::*;
pub use session::*;
pub use stats::*;
