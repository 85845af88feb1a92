//! AI Provider Adapters.
//!
//! - `MockAIProvider` - Scripted provider for tests and local development

mod mock_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, RecordedCall};
