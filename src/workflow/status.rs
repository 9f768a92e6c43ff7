//! Place and transition names used by the shipped invoice graphs.

use std::fmt;

/// Status values for invoices and recurring invoices.
///
/// Entities store their status as a string so graphs loaded from
/// configuration may add places; these are the ones the crate relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    New,
    Draft,
    Pending,
    Overdue,
    Paid,
    Cancelled,
    Archived,
    Active,
    Paused,
    Complete,
}

impl InvoiceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialEq<str> for InvoiceStatus {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<InvoiceStatus> for str {
    fn eq(&self, other: &InvoiceStatus) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<String> for InvoiceStatus {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<InvoiceStatus> for String {
    fn eq(&self, other: &InvoiceStatus) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Transition names. `Accept` and `Activate` both move an invoice into its
/// live state but belong to different graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    New,
    Accept,
    Activate,
    Overdue,
    Pay,
    Cancel,
    Reopen,
    Archive,
    Unarchive,
    Pause,
    Complete,
}

impl Transition {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Accept => "accept",
            Self::Activate => "activate",
            Self::Overdue => "overdue",
            Self::Pay => "pay",
            Self::Cancel => "cancel",
            Self::Reopen => "reopen",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Pause => "pause",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Transition {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
