//! Borrow request model, its status state machine and date ranges

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Borrow request status
///
/// `Pending` is the only state with outgoing transitions; `Approved` and
/// `Denied` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Denied => "Denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Parse a librarian-supplied transition target (`Approved` or `Denied` only)
    pub fn parse_target(s: &str) -> AppResult<Self> {
        match s.parse::<RequestStatus>() {
            Ok(status) if status.is_terminal() => Ok(status),
            _ => Err(AppError::InvalidStatus(format!(
                "'{}' is not one of Approved, Denied",
                s
            ))),
        }
    }

    /// Whether `self -> target` is a legal lifecycle step
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        *self == RequestStatus::Pending && target.is_terminal()
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Denied" => Ok(RequestStatus::Denied),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion for RequestStatus (stored as text)
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Inclusive calendar date range, always `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if from > to {
            return Err(AppError::InvalidRange);
        }
        Ok(Self { from, to })
    }

    /// Parse two `YYYY-MM-DD` strings into a range
    pub fn parse(from: &str, to: &str) -> AppResult<Self> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        Self::new(from, to)
    }

    /// `[a,b]` and `[c,d]` overlap iff `a <= d && c <= b`
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }

    /// Intersection of two ranges, if any
    pub fn clip(&self, other: &DateRange) -> Option<DateRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(DateRange {
            from: self.from.max(other.from),
            to: self.to.min(other.to),
        })
    }
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| AppError::InvalidInput("Invalid date format. Use YYYY-MM-DD".to_string()))
}

/// Borrow request as stored in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl BorrowRequest {
    pub fn range(&self) -> DateRange {
        DateRange {
            from: self.date_from,
            to: self.date_to,
        }
    }
}

/// Validated data for a new ledger entry; always inserted as `Pending`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrowRequest {
    pub user_id: i32,
    pub book_id: i32,
    pub range: DateRange,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn range(from: &str, to: &str) -> DateRange {
        DateRange::new(d(from), d(to)).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(d("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(matches!(parse_date("2024/03/01"), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_date("2024-02-30"), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_date(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_date(" 2024-03-01 "), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        assert!(matches!(
            DateRange::parse("2024-01-20", "2024-01-10"),
            Err(AppError::InvalidRange)
        ));
        // Single-day loans are allowed
        assert!(DateRange::parse("2024-01-10", "2024-01-10").is_ok());
    }

    #[test]
    fn test_bad_format_wins_over_inverted_range() {
        assert!(matches!(
            DateRange::parse("2024-01-20", "yesterday"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overlaps() {
        let base = range("2024-01-10", "2024-01-20");
        assert!(base.overlaps(&range("2024-01-15", "2024-01-25")));
        assert!(base.overlaps(&range("2024-01-01", "2024-01-10")));
        assert!(base.overlaps(&range("2024-01-20", "2024-01-20")));
        // Containment in both directions
        assert!(base.overlaps(&range("2024-01-12", "2024-01-13")));
        assert!(base.overlaps(&range("2024-01-01", "2024-01-31")));
        assert!(!base.overlaps(&range("2024-01-21", "2024-01-25")));
        assert!(!base.overlaps(&range("2024-01-01", "2024-01-09")));
    }

    #[test]
    fn test_clip() {
        let base = range("2024-01-10", "2024-01-20");
        assert_eq!(
            base.clip(&range("2024-01-15", "2024-01-25")),
            Some(range("2024-01-15", "2024-01-20"))
        );
        assert_eq!(base.clip(&range("2024-02-01", "2024-02-02")), None);
    }

    #[test]
    fn test_status_targets() {
        assert_eq!(RequestStatus::parse_target("Approved").unwrap(), RequestStatus::Approved);
        assert_eq!(RequestStatus::parse_target("Denied").unwrap(), RequestStatus::Denied);
        assert!(matches!(RequestStatus::parse_target("Pending"), Err(AppError::InvalidStatus(_))));
        assert!(matches!(RequestStatus::parse_target("Maybe"), Err(AppError::InvalidStatus(_))));
        assert!(matches!(RequestStatus::parse_target("approved"), Err(AppError::InvalidStatus(_))));
    }

    #[test]
    fn test_only_pending_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Denied));
        assert!(!Pending.can_transition_to(Pending));
        for from in [Approved, Denied] {
            for to in [Pending, Approved, Denied] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_status_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&RequestStatus::Approved).unwrap(), "\"Approved\"");
    }
}
