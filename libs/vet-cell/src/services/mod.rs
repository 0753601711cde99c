pub mod vet;

pub use vet::VeterinarianService;
