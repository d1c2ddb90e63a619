pub mod directory;
pub mod slots;

pub use directory::DoctorService;
pub use slots::generate_slots;
