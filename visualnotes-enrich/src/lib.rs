pub mod config;
pub mod enricher;
pub mod error;
pub mod images;
pub mod result;
pub mod trivia;

pub use config::EnrichConfig;
pub use enricher::{Enricher, ProgressCallback};
pub use error::EnrichError;
pub use images::{ImageSource, NoImages, UnsplashClient};
pub use result::{EnrichSummary, Enrichment, FetchStatus};
pub use trivia::{AnthropicTrivia, NoTrivia, TriviaSource};
