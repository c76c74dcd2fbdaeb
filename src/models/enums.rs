use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Rescheduled => "rescheduled",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl AppointmentStatus {
    /// `cancelled` and `completed` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

str_enum!(RequestStatus {
    Pending => "pending",
    Processing => "processing",
    Ready => "ready",
    PickedUp => "picked_up",
});

impl RequestStatus {
    /// Next stage along the forward-only sequence; `None` once picked up.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Processing),
            Self::Processing => Some(Self::Ready),
            Self::Ready => Some(Self::PickedUp),
            Self::PickedUp => None,
        }
    }
}

str_enum!(BookingType {
    Baptism => "baptism",
    Wedding => "wedding",
    FuneralService => "funeral_service",
    Confirmation => "confirmation",
    MassIntention => "mass_intention",
    HouseBlessing => "house_blessing",
    Counseling => "counseling",
    Other => "other",
});

str_enum!(DocumentKind {
    BaptismalCertificate => "baptismal_certificate",
    ConfirmationCertificate => "confirmation_certificate",
    MarriageContract => "marriage_contract",
    DeathCertificate => "death_certificate",
    Other => "other",
});

str_enum!(SupportingFileType {
    Pdf => "pdf",
    Jpeg => "jpeg",
    Png => "png",
    Doc => "doc",
    Docx => "docx",
});

impl SupportingFileType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Doc => "application/msword",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

str_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Cancelled => "cancelled",
});

str_enum!(NotificationKind {
    AppointmentBooked => "appointment_booked",
    AppointmentCancelled => "appointment_cancelled",
    AppointmentRescheduled => "appointment_rescheduled",
    AppointmentCompleted => "appointment_completed",
    RequestSubmitted => "request_submitted",
    RequestAdvanced => "request_advanced",
    PaymentRecorded => "payment_recorded",
});

str_enum!(UserRole {
    Admin => "admin",
    Staff => "staff",
    Parishioner => "parishioner",
});
