//! The `<ocs>` response envelope.
//!
//! # Design
//! Every endpoint answers with the same document shape: a `<meta>` block
//! and a `<data>` block. The data block is an untagged union; which of its
//! fields is meaningful depends only on the operation that was called:
//!
//! | Operation | Field(s) |
//! |---|---|
//! | `list_users` | [`Data::users`] |
//! | `list_groups`, `list_user_groups` | [`Data::groups`] |
//! | `get_user` | profile fields and [`Data::quota`] |
//! | writes | nothing; check [`Meta`] |
//!
//! Decoding is lossy on purpose: unknown elements are skipped, missing
//! elements keep their zero value, and numbers or booleans that are empty
//! or unparseable become zero/false. Structurally broken XML, or a document
//! whose root is not `<ocs>`, is an error.

use serde::{Deserialize, Deserializer};

/// Parsed `<ocs>` document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename = "ocs", default)]
pub struct Ocs {
    pub meta: Meta,
    pub data: Data,
}

/// Status block of a response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub status: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub statuscode: i64,
    pub message: String,
    pub totalitems: String,
    pub itemsperpage: String,
}

impl Meta {
    /// Whether the remote reported success (100 for v1, 200 for v2).
    ///
    /// The client never calls this itself; a failure status still arrives
    /// as `Ok(Ocs)`.
    pub fn is_ok(&self) -> bool {
        self.statuscode == 100 || self.statuscode == 200
    }
}

/// Payload block of a response. See the module docs for which field each
/// operation fills in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Data {
    #[serde(deserialize_with = "element_list")]
    pub users: Vec<String>,
    #[serde(deserialize_with = "element_list")]
    pub groups: Vec<String>,
    /// Bare `<element>` children of `<data>`.
    #[serde(rename = "element")]
    pub elements: Vec<String>,

    pub id: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub enabled: bool,
    #[serde(rename = "storageLocation")]
    pub storage_location: String,
    #[serde(rename = "lastLogin", deserialize_with = "lenient_i64")]
    pub last_login: i64,
    pub backend: String,
    pub email: String,
    pub displayname: String,
    pub phone: String,
    pub address: String,
    pub website: String,
    pub twitter: String,
    pub quota: Quota,
}

/// Storage figures of a single user, in bytes except `relative` (percent).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Quota {
    #[serde(deserialize_with = "lenient_i64")]
    pub free: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub used: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub total: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub relative: f64,
    #[serde(deserialize_with = "lenient_i64")]
    pub quota: i64,
}

/// Top-level document. quick-xml selects the variant from the root tag, so
/// any root other than `<ocs>` is rejected.
#[derive(Deserialize)]
enum Document {
    #[serde(rename = "ocs")]
    Ocs(Ocs),
}

/// Decode a response body into an envelope.
pub fn decode(body: &str) -> Result<Ocs, quick_xml::DeError> {
    match quick_xml::de::from_str(body)? {
        Document::Ocs(ocs) => Ok(ocs),
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ElementList {
    element: Vec<String>,
}

fn element_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    ElementList::deserialize(deserializer).map(|list| list.element)
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse().unwrap_or_default())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse().unwrap_or_default())
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(raw.trim(), "1" | "t" | "T" | "true" | "True" | "TRUE"))
}
