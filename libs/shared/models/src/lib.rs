pub mod auth;
pub mod doctor;
pub mod envelope;
pub mod error;
pub mod notice;
pub mod profile;
pub mod slot_key;

pub use doctor::{Address, Doctor, SlotsBooked};
pub use envelope::{ApiEnvelope, Empty};
pub use error::ClientError;
pub use notice::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use profile::UserProfile;
pub use slot_key::{scheduled_at, DateKey, SlotKeyError, TimeLabel};
