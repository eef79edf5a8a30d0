//! Schema-driven form engine: value state, live validation, derived field state, and submission.

mod instance;

pub use instance::{FormInstance, FormStatus, RenderedField};
