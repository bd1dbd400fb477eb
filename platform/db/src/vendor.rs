use sea_orm::{DbBackend, DbErr, RuntimeErr};

/// Database family a vendor code belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vendor {
    Postgres,
    Sqlite,
    /// Kept for operators migrating from the Oracle HR schema; no driver is wired.
    Oracle,
}

impl Vendor {
    /// The vendor whose codes a connection reports. MySQL has no table here.
    pub fn of(backend: DbBackend) -> Option<Self> {
        match backend {
            DbBackend::Postgres => Some(Vendor::Postgres),
            DbBackend::Sqlite => Some(Vendor::Sqlite),
            DbBackend::MySql => None,
        }
    }
}

/// Stable classification of a failed statement, independent of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    ValueTooLong,
    NumericOverflow,
    CheckViolation,
    /// Raised by a trigger or routine; the message is meant for the caller.
    BusinessRule,
    /// A routine reported that its target row does not exist.
    NoData,
    Other,
}

/// The one place vendor codes are interpreted.
const VENDOR_CODES: &[(Vendor, &str, VendorErrorKind)] = &[
    (Vendor::Postgres, "23505", VendorErrorKind::UniqueViolation),
    (Vendor::Postgres, "23503", VendorErrorKind::ForeignKeyViolation),
    (Vendor::Postgres, "22001", VendorErrorKind::ValueTooLong),
    (Vendor::Postgres, "22003", VendorErrorKind::NumericOverflow),
    (Vendor::Postgres, "23514", VendorErrorKind::CheckViolation),
    (Vendor::Postgres, "P0001", VendorErrorKind::BusinessRule),
    (Vendor::Postgres, "HR100", VendorErrorKind::BusinessRule),
    (Vendor::Postgres, "HR101", VendorErrorKind::BusinessRule),
    (Vendor::Postgres, "HR102", VendorErrorKind::BusinessRule),
    (Vendor::Postgres, "P0002", VendorErrorKind::NoData),
    // SQLite extended result codes.
    (Vendor::Sqlite, "2067", VendorErrorKind::UniqueViolation),
    (Vendor::Sqlite, "1555", VendorErrorKind::UniqueViolation),
    (Vendor::Sqlite, "787", VendorErrorKind::ForeignKeyViolation),
    (Vendor::Sqlite, "275", VendorErrorKind::CheckViolation),
    (Vendor::Sqlite, "1811", VendorErrorKind::BusinessRule),
    (Vendor::Oracle, "ORA-00001", VendorErrorKind::UniqueViolation),
    (Vendor::Oracle, "ORA-02291", VendorErrorKind::ForeignKeyViolation),
    (Vendor::Oracle, "ORA-02292", VendorErrorKind::ForeignKeyViolation),
    (Vendor::Oracle, "ORA-12899", VendorErrorKind::ValueTooLong),
    (Vendor::Oracle, "ORA-01438", VendorErrorKind::NumericOverflow),
    (Vendor::Oracle, "ORA-02290", VendorErrorKind::CheckViolation),
    (Vendor::Oracle, "ORA-20100", VendorErrorKind::BusinessRule),
    (Vendor::Oracle, "ORA-20101", VendorErrorKind::BusinessRule),
    (Vendor::Oracle, "ORA-01403", VendorErrorKind::NoData),
];

/// A classified database failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorError {
    pub kind: VendorErrorKind,
    pub code: Option<String>,
    pub message: String,
}

pub fn lookup(vendor: Vendor, code: &str) -> VendorErrorKind {
    VENDOR_CODES
        .iter()
        .find(|(v, c, _)| *v == vendor && *c == code)
        .map(|(_, _, kind)| *kind)
        .unwrap_or(VendorErrorKind::Other)
}

/// Classify a sea-orm error by the vendor code of the underlying driver error.
/// Codes are only looked up in the table of `backend`'s vendor.
pub fn classify(err: &DbErr, backend: DbBackend) -> VendorError {
    let database_error = match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(inner)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(inner)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(inner))) => Some(inner),
        _ => None,
    };
    match database_error {
        Some(inner) => {
            let code = inner.code().map(|code| code.into_owned());
            let kind = match (Vendor::of(backend), code.as_deref()) {
                (Some(vendor), Some(code)) => lookup(vendor, code),
                _ => VendorErrorKind::Other,
            };
            VendorError {
                kind,
                code,
                message: inner.message().to_string(),
            }
        }
        None => VendorError {
            kind: VendorErrorKind::Other,
            code: None,
            message: err.to_string(),
        },
    }
}
