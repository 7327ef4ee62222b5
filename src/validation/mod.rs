pub mod contract;
pub mod integration;
pub mod preflight;

pub use contract::{ContractReport, REQUIRED_SECTIONS};
pub use integration::IntegrationReport;
pub use preflight::{PreflightChecks, PreflightReport};
