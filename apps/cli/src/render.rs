use chrono::NaiveDate;

use appointment_cell::{AppointmentBuckets, Bucket};
use doctor_cell::DaySlots;
use patient_cell::age_on;
use shared_config::ClientConfig;
use shared_models::{Doctor, UserProfile};

pub fn doctor_list(doctors: &[Doctor], config: &ClientConfig) {
    if doctors.is_empty() {
        println!("No doctors found.");
        return;
    }
    for doctor in doctors {
        println!(
            "{:<26} {:<22} {:<20} {:>8}  {}",
            doctor.id,
            doctor.name,
            doctor.speciality,
            config.format_amount(doctor.fees),
            if doctor.available { "Available" } else { "Not available" }
        );
    }
}

pub fn doctor_detail(doctor: &Doctor, config: &ClientConfig) {
    println!("{} ({})", doctor.name, doctor.id);
    println!("  {} - {}, {}", doctor.degree, doctor.speciality, doctor.experience);
    println!("  Appointment fee: {}", config.format_amount(doctor.fees));
    if !doctor.address.is_empty() {
        println!("  {}, {}", doctor.address.line1, doctor.address.line2);
    }
    if !doctor.about.is_empty() {
        println!();
        println!("  {}", doctor.about);
    }
}

pub fn related(doctors: &[Doctor]) {
    if doctors.is_empty() {
        return;
    }
    println!();
    println!("Related doctors:");
    for doctor in doctors {
        println!("  {:<26} {}", doctor.id, doctor.name);
    }
}

pub fn slot_grid(days: &[DaySlots]) {
    if days.is_empty() {
        println!("No slots available this week.");
        return;
    }
    for day in days {
        let times: Vec<String> = day
            .slots
            .iter()
            .map(|slot| {
                if slot.is_booked {
                    format!("[{}]", slot.time)
                } else {
                    slot.time.to_string()
                }
            })
            .collect();
        println!("{} {:<10} {}", day.weekday_label(), day.date_key, times.join("  "));
    }
    println!();
    println!("Times in [brackets] are already booked.");
}

pub fn appointments(buckets: &AppointmentBuckets, config: &ClientConfig) {
    if buckets.is_empty() {
        println!("You have no appointments.");
        return;
    }
    for bucket in [Bucket::Upcoming, Bucket::Completed, Bucket::Cancelled] {
        let list = buckets.get(bucket);
        if list.is_empty() {
            continue;
        }
        println!("{} ({})", bucket, list.len());
        for appointment in list {
            println!(
                "  {:<26} {} | {} | {:<22} {:>8}  {}",
                appointment.id,
                appointment.slot_date.display_date(),
                appointment.slot_time,
                appointment.doctor.name,
                config.format_amount(appointment.amount),
                appointment.status_label()
            );
        }
    }
}

pub fn profile(profile: &UserProfile, today: NaiveDate) {
    println!("{} <{}>", profile.name, profile.email);
    if !profile.phone.is_empty() {
        println!("  Phone:   {}", profile.phone);
    }
    if !profile.address.is_empty() {
        println!("  Address: {}, {}", profile.address.line1, profile.address.line2);
    }
    if !profile.gender.is_empty() {
        println!("  Gender:  {}", profile.gender);
    }
    match age_on(&profile.dob, today) {
        Some(age) => println!("  Born:    {} (age {})", profile.dob, age),
        None if !profile.dob.is_empty() => println!("  Born:    {}", profile.dob),
        None => {}
    }
}
