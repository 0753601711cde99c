pub mod integration;

pub use integration::IntegrationService;
