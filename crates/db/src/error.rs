use uuid::Uuid;

pub const EVENT_SLUG_CONSTRAINT: &str = "uq_events_slug";
pub const ATTENDEE_EMAIL_CONSTRAINT: &str = "uq_attendees_event_email";
pub const CHECK_IN_CONSTRAINT: &str = "uq_check_ins_attendee";

/// Errors surfaced by [`Store`](crate::Store) implementations.
///
/// Constraint verdicts are reported as dedicated variants so callers never
/// have to inspect driver-specific codes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint `{constraint}` violated")]
    UniqueViolation { constraint: String },

    #[error("event {event_id} has reached its maximum number of attendees")]
    CapacityExceeded { event_id: Uuid },

    #[error("referenced {entity} does not exist")]
    MissingReference { entity: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// `true` when this is a unique violation of the named constraint.
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }

    /// Classify a sqlx error on insert: unique (23505) and foreign-key (23503)
    /// violations become typed variants.
    pub(crate) fn classify(err: sqlx::Error, referenced: &'static str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return StoreError::UniqueViolation {
                        constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                    };
                }
                Some("23503") => {
                    return StoreError::MissingReference { entity: referenced };
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
