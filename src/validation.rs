//! Pure input rules for bookings and document requests.
//!
//! These functions see only a snapshot of the submitted form and produce
//! typed command objects for the lifecycle modules. They know nothing
//! about persistence; "now" is injected so the date rules stay pure.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BookingType, DocumentKind, SupportingFileType};

/// Minimum purpose length for an appointment booking.
pub const MIN_BOOKING_PURPOSE: usize = 5;
/// Minimum purpose length for a document request.
pub const MIN_REQUEST_PURPOSE: usize = 10;
/// Per-file size cap for supporting documents.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Booking slots run every half hour from 09:00 to 16:30 inclusive.
const FIRST_SLOT_MINUTES: u32 = 9 * 60;
const LAST_SLOT_MINUTES: u32 = 16 * 60 + 30;
const SLOT_STEP_MINUTES: u32 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("date must be at least two days from today")]
    PastDate,

    #[error("time is not on the half-hour booking grid (09:00-16:30)")]
    BadTimeSlot,

    #[error("purpose must be at least {min} characters")]
    ShortPurpose { min: usize },

    #[error("at least one supporting file is required")]
    NoFiles,

    #[error("unsupported file type for {file}")]
    BadFileType { file: String },

    #[error("{file} exceeds the {max} byte limit")]
    FileTooLarge { file: String, max: u64 },
}

// ─── Appointment input ────────────────────────────────────────────────────────

/// Raw booking form as submitted. Unknown booking types are rejected at
/// deserialization; the time slot arrives as text ("10:00") and is parsed
/// against the grid here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentForm {
    pub booking_type: Option<BookingType>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub purpose: Option<String>,
}

/// Validated booking command consumed by the appointment lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub booking_type: BookingType,
    pub date: NaiveDate,
    pub time_slot: NaiveTime,
    pub purpose: String,
}

pub fn validate_appointment_input(
    form: &AppointmentForm,
    today: NaiveDate,
) -> Result<NewAppointment, ValidationError> {
    let booking_type = form
        .booking_type
        .ok_or(ValidationError::MissingField { field: "booking_type" })?;

    let date = form.date.ok_or(ValidationError::MissingField { field: "date" })?;
    check_bookable_date(date, today)?;

    let time = form
        .time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingField { field: "time" })?;
    let time_slot = parse_slot(time)?;

    let purpose = form
        .purpose
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::MissingField { field: "purpose" })?;
    if purpose.chars().count() < MIN_BOOKING_PURPOSE {
        return Err(ValidationError::ShortPurpose { min: MIN_BOOKING_PURPOSE });
    }

    Ok(NewAppointment {
        booking_type,
        date,
        time_slot,
        purpose: purpose.to_string(),
    })
}

/// Earliest date a booking may target: strictly after tomorrow 00:00,
/// so two calendar days out.
pub fn min_bookable_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(2)).unwrap_or(NaiveDate::MAX)
}

pub fn check_bookable_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date < min_bookable_date(today) {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}

/// Parse a submitted slot ("10:00" or "10:00:00") and check grid membership.
pub fn parse_slot(time: &str) -> Result<NaiveTime, ValidationError> {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| ValidationError::BadTimeSlot)?;
    check_slot(parsed)?;
    Ok(parsed)
}

pub fn check_slot(time: NaiveTime) -> Result<(), ValidationError> {
    use chrono::Timelike;
    let minutes = time.hour() * 60 + time.minute();
    let on_grid = time.second() == 0
        && minutes % SLOT_STEP_MINUTES == 0
        && (FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES).contains(&minutes);
    if on_grid {
        Ok(())
    } else {
        Err(ValidationError::BadTimeSlot)
    }
}

/// The full half-hour grid, for the booking form's slot picker.
pub fn time_slots() -> Vec<NaiveTime> {
    (FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES)
        .step_by(SLOT_STEP_MINUTES as usize)
        .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
        .collect()
}

// ─── Document request input ───────────────────────────────────────────────────

/// Declared metadata for one uploaded file. `file_type` is `None` when
/// the declared type is outside the accepted set.
#[derive(Debug, Clone)]
pub struct UploadMeta {
    pub file_name: String,
    pub file_type: Option<SupportingFileType>,
    pub size_bytes: u64,
}

/// Raw document request form as submitted.
#[derive(Debug, Clone, Default)]
pub struct DocumentRequestForm {
    pub document_kind: Option<DocumentKind>,
    pub purpose: Option<String>,
    pub files: Vec<UploadMeta>,
}

/// One accepted supporting file.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub file_name: String,
    pub file_type: SupportingFileType,
    pub size_bytes: u64,
}

/// Validated request command consumed by the document request lifecycle.
#[derive(Debug, Clone)]
pub struct NewDocumentRequest {
    pub document_kind: DocumentKind,
    pub purpose: String,
    pub files: Vec<AcceptedFile>,
}

pub fn validate_document_request_input(
    form: &DocumentRequestForm,
) -> Result<NewDocumentRequest, ValidationError> {
    let document_kind = form
        .document_kind
        .ok_or(ValidationError::MissingField { field: "document_kind" })?;

    let purpose = form
        .purpose
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::MissingField { field: "purpose" })?;
    if purpose.chars().count() < MIN_REQUEST_PURPOSE {
        return Err(ValidationError::ShortPurpose { min: MIN_REQUEST_PURPOSE });
    }

    if form.files.is_empty() {
        return Err(ValidationError::NoFiles);
    }

    let mut files = Vec::with_capacity(form.files.len());
    for meta in &form.files {
        let file_type = meta.file_type.ok_or_else(|| ValidationError::BadFileType {
            file: meta.file_name.clone(),
        })?;
        if meta.size_bytes > MAX_FILE_BYTES {
            return Err(ValidationError::FileTooLarge {
                file: meta.file_name.clone(),
                max: MAX_FILE_BYTES,
            });
        }
        files.push(AcceptedFile {
            file_name: meta.file_name.clone(),
            file_type,
            size_bytes: meta.size_bytes,
        });
    }

    Ok(NewDocumentRequest {
        document_kind,
        purpose: purpose.to_string(),
        files,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
