use chrono::{Datelike, NaiveDate};
use mime_guess::Mime;
use serde::Deserialize;

pub use shared_models::{Address, UserProfile};

/// Placeholder the profile form uses for an unset date of birth.
pub const DOB_NOT_SELECTED: &str = "Not Selected";

#[derive(Debug, Default, Deserialize)]
pub struct ProfilePayload {
    #[serde(rename = "userData", default)]
    pub user_data: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProfileImage {
    /// Guessed from the file extension, `application/octet-stream` when unknown.
    pub fn content_type(&self) -> Mime {
        mime_guess::from_path(&self.file_name).first_or_octet_stream()
    }
}

/// The editable part of a profile. Email and id are not editable.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub address: Address,
    pub dob: String,
    pub gender: String,
    pub image: Option<ProfileImage>,
}

impl ProfileUpdate {
    /// Starts from the current profile so unchanged fields are resent as-is.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            dob: profile.dob.clone(),
            gender: profile.gender.clone(),
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.dob != DOB_NOT_SELECTED && !self.dob.is_empty() && parse_dob(&self.dob).is_none() {
            return Err(format!("Invalid date of birth: {}", self.dob));
        }
        Ok(())
    }
}

pub fn parse_dob(dob: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d").ok()
}

/// Whole years between `dob` and `today`; `None` when the date is unset or
/// in the future.
pub fn age_on(dob: &str, today: NaiveDate) -> Option<u32> {
    let born = parse_dob(dob)?;
    if born > today {
        return None;
    }
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
