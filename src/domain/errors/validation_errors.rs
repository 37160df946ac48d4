use crate::domain::models::PhotoType;

/// Validation errors raised before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    // Event date range
    StartTooFarInPast {
        max_age_days: i64,
    },
    StartAfterEnd,
    EndInPast,
    EndTooFarInFuture {
        max_horizon_days: i64,
    },

    // Event fields
    EmptyTitle,
    UnknownEventType(String),
    UnknownPhotoType(String),

    // Photo payloads
    UnsupportedContentType {
        expected: String,
        actual: Option<String>,
    },
    NoPhotos,
    InvalidPhotoRole(PhotoType),
}

impl ValidationError {
    /// Name of the input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::StartTooFarInPast { .. } => "start_time",
            ValidationError::StartAfterEnd => "start_time",
            ValidationError::EndInPast | ValidationError::EndTooFarInFuture { .. } => "end_time",
            ValidationError::EmptyTitle => "title",
            ValidationError::UnknownEventType(_) => "type",
            ValidationError::UnknownPhotoType(_) | ValidationError::InvalidPhotoRole(_) => {
                "photo_type"
            }
            ValidationError::UnsupportedContentType { .. } | ValidationError::NoPhotos => "photos",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::StartTooFarInPast { max_age_days } => {
                write!(
                    f,
                    "Event start date & time must be less than {} days before now",
                    max_age_days
                )
            }
            ValidationError::StartAfterEnd => {
                write!(
                    f,
                    "Event start date & time must be before event end date & time"
                )
            }
            ValidationError::EndInPast => {
                write!(
                    f,
                    "Event end date & time must be after the current date & time"
                )
            }
            ValidationError::EndTooFarInFuture { max_horizon_days } => {
                write!(
                    f,
                    "Event end date must be within {} days from now",
                    max_horizon_days
                )
            }
            ValidationError::EmptyTitle => write!(f, "Event title cannot be empty"),
            ValidationError::UnknownEventType(value) => {
                write!(f, "Unknown event type: '{}'", value)
            }
            ValidationError::UnknownPhotoType(value) => {
                write!(f, "Unknown photo type: '{}'", value)
            }
            ValidationError::UnsupportedContentType { expected, actual } => {
                write!(
                    f,
                    "Invalid media type '{}'. Only {} files are allowed",
                    actual.as_deref().unwrap_or("none"),
                    expected
                )
            }
            ValidationError::NoPhotos => write!(f, "At least one photo is required"),
            ValidationError::InvalidPhotoRole(photo_type) => {
                write!(f, "Photos cannot be attached as {}", photo_type)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
