//! # Credential Model
//!
//! This module defines the types that describe a holder's educational
//! credentials: the diploma summary shown in listings, the verifiable form
//! produced on export, and the outcome of submitting a credential for
//! verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One educational credential record as served by the backend collection.
///
/// A diploma materializes from a list response without its verifiable `text`;
/// the text is fetched lazily when the credential is exported or viewed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Diploma {
    /// Server-assigned identifier (JSON-LD `@id`), unique within the
    /// holder's collection.
    #[serde(rename = "@id", default)]
    pub id: String,

    /// Title of the credential.
    #[serde(default)]
    pub name: String,

    /// Achievement level (eg. a master's degree).
    #[serde(rename = "educationalLevel", default)]
    pub educational_level: String,

    /// The date the credential is valid from.
    #[serde(rename = "validFrom", skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// The serialized verifiable form, present only after an export.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Diploma {
    /// Reduce a stored wallet presentation to the summary shape used by the
    /// listing. Subject claims map onto the summary fields; anything the
    /// presentation does not carry is left empty.
    #[must_use]
    pub fn from_presentation(presentation: &Value) -> Self {
        let null = Value::Null;
        let subject = presentation.get("credentialSubject").unwrap_or(&null);
        Self {
            id: string_claim(presentation, "id"),
            name: string_claim(subject, "studyProgram"),
            educational_level: string_claim(subject, "learningAchievement"),
            valid_from: subject
                .get("dateOfAchievement")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            text: None,
        }
    }
}

fn string_claim(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// The verifiable representation of a diploma returned by the export
/// endpoint. Extra fields in the response are tolerated and dropped.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerifiableForm {
    /// Identifier of the diploma the form was derived from.
    #[serde(rename = "@id", default)]
    pub id: String,

    /// Title of the credential.
    #[serde(default)]
    pub name: String,

    /// The serialized verifiable credential (JSON-LD, or a compact JWT when
    /// requested in that format).
    #[serde(default)]
    pub text: String,
}

impl VerifiableForm {
    /// Decode the embedded credential and reduce it to the summary fields
    /// the listing exposes.
    ///
    /// # Errors
    /// Will return an error if the embedded text is not a JSON credential
    /// (eg. it was exported in the compact JWT format).
    pub fn to_summary(&self) -> anyhow::Result<Diploma> {
        let credential: Value = serde_json::from_str(&self.text)?;
        Ok(Diploma::from_presentation(&credential))
    }
}

/// Outcome of submitting a credential for verification.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Nothing has been verified, or the last submission did not settle with
    /// a recognized outcome.
    #[default]
    Unverified,

    /// The last submitted credential verified successfully.
    Verified,

    /// The server rejected the last submitted credential.
    Rejected,
}

impl VerificationStatus {
    /// Numeric code used by presentation layers.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Unverified => 0,
            Self::Verified => 1,
            Self::Rejected => 90,
        }
    }
}

/// Get a string representation of the `VerificationStatus`.
impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => write!(f, "Unverified"),
            Self::Verified => write!(f, "Verified"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}
