//! Core types for the distillation service.

mod config;
mod project;
mod request;
mod source;
mod symbol;

pub use config::{DistillConfig, ServiceConfig};
pub use project::{AssembledFile, Project};
pub use request::{
    DistillJobStatus, DistillJobStatusResponse, DistillRequest, DistillResponse,
    FileResult, StartDistillJobRequest, StartDistillJobResponse,
};
pub use source::{fqn, SourceFile};
pub use symbol::{CallEdge, CodeSnippet, SymbolDefinition, SymbolKind};
