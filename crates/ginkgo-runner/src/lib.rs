/*
[INPUT]:  Public API exports for the ginkgo runner crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod advisor;
pub mod config;
pub mod trader;

// Re-export main types for convenience
pub use advisor::ExpertAdvisor;
pub use config::GinkgoConfig;
pub use trader::Trader;
