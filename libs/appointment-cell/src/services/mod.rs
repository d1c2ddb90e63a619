pub mod booking;
pub mod classifier;
pub mod guard;
pub mod payment;

pub use booking::BookingService;
pub use classifier::{bucket_of, classify};
pub use guard::check_selection;
pub use payment::PaymentService;
