use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use reqwest::Url;

use appointment_cell::Appointment;
use patient_cell::{ProfileImage, ProfileUpdate};
use shared_models::auth::{LoginRequest, RegisterRequest};
use shared_models::DateKey;

use crate::app::App;
use crate::render;

#[derive(Parser, Debug)]
#[command(name = "booking", version, about = "Find doctors and manage your appointments")]
pub struct Cli {
    /// Backend base URL, overrides BACKEND_URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List doctors, optionally for one speciality
    Doctors {
        #[arg(short, long)]
        speciality: Option<String>,
    },
    /// Show one doctor and related doctors
    Doctor { doctor_id: String },
    /// Show a doctor's booking grid for the coming week
    Slots { doctor_id: String },
    /// Book a slot, e.g. `book doc1 5_6_2025 "10:30 AM"`
    Book {
        doctor_id: String,
        #[arg(value_parser = parse_date_key)]
        date: DateKey,
        time: String,
    },
    /// List your appointments grouped as upcoming, completed and cancelled
    Appointments,
    /// Cancel an appointment
    Cancel { appointment_id: String },
    /// Start an online payment and write the gateway form as HTML
    Pay {
        appointment_id: String,
        /// Write the form here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Handle the URL the payment gateway redirected back to
    PaymentReturn { url: String },
    /// Show your profile
    Profile,
    /// Edit your profile; omitted fields keep their current value
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        line1: Option<String>,
        #[arg(long)]
        line2: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        dob: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Sign in and print the session token
    Login { email: String, password: String },
    /// Create an account and print the session token
    Register {
        name: String,
        email: String,
        password: String,
    },
}

pub fn parse_date_key(value: &str) -> Result<DateKey, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid date '{}'. Expected day_month_year, e.g. 5_6_2025", value))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub async fn run(command: Command, app: &App) -> Result<()> {
    match command {
        Command::Doctors { speciality } => {
            app.doctors.refresh_directory().await?;
            let doctors = app.doctors.filter_by_speciality(speciality.as_deref()).await;
            render::doctor_list(&doctors, app.config());
        }
        Command::Doctor { doctor_id } => {
            app.doctors.refresh_directory().await?;
            let doctor = app
                .doctors
                .find(&doctor_id)
                .await
                .ok_or_else(|| anyhow!("Doctor {} not found", doctor_id))?;
            render::doctor_detail(&doctor, app.config());
            render::related(&app.doctors.related(&doctor).await);
        }
        Command::Slots { doctor_id } => {
            app.doctors.refresh_directory().await?;
            let days = app.doctors.slots_for(&doctor_id, now()).await?;
            render::slot_grid(&days);
        }
        Command::Book { doctor_id, date, time } => {
            app.doctors.refresh_directory().await?;
            app.booking.book(&doctor_id, &date, &time, now()).await?;
        }
        Command::Appointments => {
            let buckets = app.booking.classified(now()).await?;
            render::appointments(&buckets, app.config());
        }
        Command::Cancel { appointment_id } => {
            let appointment = find_appointment(app, &appointment_id).await?;
            let outcome = app.booking.cancel(&appointment).await?;
            if let Some(appointments) = outcome.appointments {
                let buckets = appointment_cell::classify(appointments, now());
                render::appointments(&buckets, app.config());
            }
        }
        Command::Pay { appointment_id, out } => {
            let appointment = find_appointment(app, &appointment_id).await?;
            let form = app.payment.initiate(&appointment).await?;
            let html = form.to_auto_submit_html();
            match out {
                Some(path) => {
                    tokio::fs::write(&path, html)
                        .await
                        .with_context(|| format!("writing payment form to {}", path.display()))?;
                    println!("Open {} in a browser to continue to payment.", path.display());
                }
                None => print!("{}", html),
            }
        }
        Command::PaymentReturn { url } => {
            let url = Url::parse(&url).with_context(|| format!("invalid URL {}", url))?;
            let cleaned = app.payment.handle_return(&url);
            println!("{}", cleaned);
        }
        Command::Profile => match app.profile.load_profile().await? {
            Some(profile) => render::profile(&profile, Local::now().date_naive()),
            None => bail!("Login to view your profile"),
        },
        Command::UpdateProfile {
            name,
            phone,
            line1,
            line2,
            dob,
            gender,
            image,
        } => {
            let current = app
                .profile
                .load_profile()
                .await?
                .ok_or_else(|| anyhow!("Login to edit your profile"))?;

            let mut update = ProfileUpdate::from_profile(&current);
            if let Some(name) = name {
                update.name = name;
            }
            if let Some(phone) = phone {
                update.phone = phone;
            }
            if let Some(line1) = line1 {
                update.address.line1 = line1;
            }
            if let Some(line2) = line2 {
                update.address.line2 = line2;
            }
            if let Some(dob) = dob {
                update.dob = dob;
            }
            if let Some(gender) = gender {
                update.gender = gender;
            }
            if let Some(path) = image {
                update.image = Some(read_image(&path).await?);
            }

            if !app.profile.update_profile(update).await {
                bail!("Profile was not updated");
            }
            if let Some(profile) = app.state.profile().await {
                render::profile(&profile, Local::now().date_naive());
            }
        }
        Command::Login { email, password } => {
            app.session.login(LoginRequest { email, password }).await?;
            print_token(app).await;
        }
        Command::Register { name, email, password } => {
            app.session
                .register(RegisterRequest { name, email, password })
                .await?;
            print_token(app).await;
        }
    }

    Ok(())
}

async fn find_appointment(app: &App, appointment_id: &str) -> Result<Appointment> {
    app.booking
        .my_appointments()
        .await?
        .into_iter()
        .find(|appointment| appointment.id == appointment_id)
        .ok_or_else(|| anyhow!("Appointment {} not found", appointment_id))
}

async fn read_image(path: &Path) -> Result<ProfileImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ProfileImage { file_name, bytes })
}

async fn print_token(app: &App) {
    if let Some(token) = app.state.token().await {
        println!("export BOOKING_AUTH_TOKEN={}", token);
    }
}
