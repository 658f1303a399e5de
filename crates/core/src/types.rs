/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Users are identified by the subject UUID issued by the identity provider.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (deadlines, expense dates) carry no time zone.
pub type Date = chrono::NaiveDate;
