pub mod availability;
pub mod booking;
pub mod lifecycle;

pub use availability::check_availability;
pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
