use chrono::NaiveDateTime;

use crate::models::{Appointment, AppointmentBuckets, Bucket};

/// Cancellation wins over completion, and completion over the clock. An
/// appointment whose time has passed counts as completed even if the backend
/// never marked it so.
pub fn bucket_of(appointment: &Appointment, now: NaiveDateTime) -> Bucket {
    if appointment.cancelled {
        Bucket::Cancelled
    } else if appointment.is_completed || appointment.scheduled_at() < now {
        Bucket::Completed
    } else {
        Bucket::Upcoming
    }
}

pub fn classify<I>(appointments: I, now: NaiveDateTime) -> AppointmentBuckets
where
    I: IntoIterator<Item = Appointment>,
{
    let mut buckets = AppointmentBuckets::default();
    for appointment in appointments {
        match bucket_of(&appointment, now) {
            Bucket::Upcoming => buckets.upcoming.push(appointment),
            Bucket::Completed => buckets.completed.push(appointment),
            Bucket::Cancelled => buckets.cancelled.push(appointment),
        }
    }

    // stable: equal times keep input order
    buckets.upcoming.sort_by_key(Appointment::scheduled_at);
    buckets
        .completed
        .sort_by(|a, b| b.scheduled_at().cmp(&a.scheduled_at()));
    buckets
        .cancelled
        .sort_by(|a, b| b.scheduled_at().cmp(&a.scheduled_at()));

    buckets
}
