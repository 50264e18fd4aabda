//! Persistent entities produced by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored organization.
///
/// Identity is the `(name, region)` pair — never the numeric id or the
/// website URL. Created on a dedup miss; updated in place only when a
/// later candidate carries a strictly higher `relevance_score`; never
/// deleted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Store-assigned id.
    pub id: u64,

    /// Canonical organization name.
    pub name: String,

    /// Category the organization was discovered under.
    pub org_type: String,

    /// State/territory code or name.
    pub region: String,

    /// Website URL, if known.
    pub website: String,

    /// Certainty in the classification itself (0.0 to 1.0).
    pub confidence_score: f32,

    /// Fit to the target category (0.0 to 1.0). Distinct from
    /// `confidence_score`; the merge policy gates on this field only.
    pub relevance_score: f32,

    /// URL of the search hit that produced this record.
    pub source_url: String,

    /// How the record was discovered (e.g. "classified_search").
    pub discovery_method: String,

    /// When the record was first created.
    pub discovery_date: DateTime<Utc>,

    /// Classifier notes, if any.
    pub description: Option<String>,
}

/// Fields for a not-yet-persisted organization, as produced by
/// `batch_classify`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganization {
    pub name: String,
    pub org_type: String,
    pub region: String,
    pub website: String,
    pub confidence_score: f32,
    pub relevance_score: f32,
    pub source_url: String,
    pub discovery_method: String,
    pub description: Option<String>,
}

/// An extracted staff contact, pending validation and persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub organization_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    /// Certainty that this is a real contact (0.0 to 1.0).
    pub confidence: f32,
}

impl Contact {
    /// Whether the contact carries enough identity to persist at all:
    /// either a full name or an email address.
    pub fn is_identifiable(&self) -> bool {
        (!self.first_name.is_empty() && !self.last_name.is_empty()) || !self.email.is_empty()
    }
}

/// A URL discovered during a run, optionally linked to an organization.
///
/// Re-validation may clear the organization link but never deletes the
/// URL record itself.
#[derive(Debug, Clone)]
pub struct DiscoveredUrl {
    pub id: u64,
    pub url: String,
    pub title: String,
    /// The organization this URL is believed to belong to, if any.
    pub organization_id: Option<u64>,
}
