pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod log;
pub mod request;
pub mod transport;
pub mod workflow;

pub use catalog::{ModelCatalog, ModelEntry};
pub use dispatch::{Dispatcher, Outcome, RetryPolicy};
pub use error::{Error, Result};
pub use extract::RenderStyle;
pub use request::{Payload, TaskInput, TaskKind, TaskRequest};
pub use transport::{HttpTransport, ProviderResponse, Transport};
pub use workflow::{Assistant, Surface, WorkflowOutcome};
