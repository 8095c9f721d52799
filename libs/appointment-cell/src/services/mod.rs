pub mod booking;
pub mod conflict;
pub mod rules;

pub use booking::AppointmentBookingService;
