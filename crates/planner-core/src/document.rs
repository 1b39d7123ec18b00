//! The canonical planner document.
//!
//! This is the current (version 2) schema. Older stored shapes are upgraded
//! into it by [`crate::migrate`]; nothing here tries to read legacy data.
//! Field names serialize in camelCase to stay compatible with documents the
//! browser pages have already written.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::{now_iso, uid};

/// Current life map schema version.
pub const LIFE_MAP_VERSION: u32 = 2;
/// Title given to new documents.
pub const DEFAULT_TITLE: &str = "Planner";
/// Life domains every new document starts with.
pub const DEFAULT_DOMAINS: [&str; 5] = ["Income", "Financial", "Home", "Health", "Relationships"];

/// Root persisted planner state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub meta: Meta,
    pub inbox: Vec<CaptureItem>,
    pub threads: Vec<Thread>,
    pub weekly: Weekly,
    pub life_map: LifeMap,
    pub income_map: IncomeMap,
    /// Top-level fields this version does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// A fresh document with default content and current timestamps.
    pub fn new() -> Self {
        Self {
            meta: Meta::new(),
            inbox: Vec::new(),
            threads: Vec::new(),
            weekly: Weekly::default(),
            life_map: LifeMap::seeded(),
            income_map: IncomeMap::default(),
            extra: Map::new(),
        }
    }

    /// Pretty-printed JSON, the format used for backups and the remote copy.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn thread_mut(&mut self, id: &str) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| t.id == id)
    }

    pub fn capture_mut(&mut self, id: &str) -> Option<&mut CaptureItem> {
        self.inbox.iter_mut().find(|c| c.id == id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created_at: String,
    /// Time of the last save. The only signal used to decide which copy wins.
    pub updated_at: String,
    pub title: String,
}

impl Meta {
    pub fn new() -> Self {
        let now = now_iso();
        Self {
            created_at: now.clone(),
            updated_at: now,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

/// An unprocessed inbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureItem {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub status: CaptureStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    #[default]
    Open,
    Archived,
}

impl CaptureStatus {
    /// Anything other than `archived` reads as open.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("archived") {
            Self::Archived
        } else {
            Self::Open
        }
    }
}

/// A persistent unit of ongoing work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub title: String,
    /// Legacy alias of `title`, kept in step when an older document had it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: ThreadStatus,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    /// Legacy alias of `updated_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_touched: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thread {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            id: uid(),
            title: title.into(),
            name: None,
            status: ThreadStatus::Active,
            domain: String::new(),
            next_action: String::new(),
            notes: String::new(),
            created_at: now.clone(),
            updated_at: now,
            last_touched: None,
            extra: Map::new(),
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }

    /// Refresh `updated_at` (and the legacy alias, if present).
    pub fn touch(&mut self) {
        let now = now_iso();
        if self.last_touched.is_some() {
            self.last_touched = Some(now.clone());
        }
        self.updated_at = now;
    }
}

/// Thread lifecycle status.
///
/// Known values are canonical. Free-text labels from older versions are kept
/// as [`ThreadStatus::Other`] and count as not archived. Synonyms of "done"
/// and "archived" collapse to [`ThreadStatus::Archived`] when parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ThreadStatus {
    #[default]
    Active,
    Paused,
    Archived,
    Other(String),
}

impl ThreadStatus {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "active" if raw == "active" => Self::Active,
            "paused" if raw == "paused" => Self::Paused,
            "archive" | "archived" | "done" | "completed" | "complete" => Self::Archived,
            _ if lowered.contains("archiv")
                || lowered.contains("done")
                || lowered.contains("complete") =>
            {
                Self::Archived
            }
            _ if raw.trim().is_empty() => Self::Active,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Archived => "archived",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl Display for ThreadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ThreadStatus {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThreadStatus {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(Self::parse(&s))
    }
}

/// The two threads in focus for the current week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weekly {
    pub slot1: Option<String>,
    pub slot2: Option<String>,
    /// `YYYY-MM-DD` of the Monday the slots belong to.
    pub week_of: Option<String>,
}

impl Weekly {
    pub fn contains(&self, thread_id: &str) -> bool {
        self.slot1.as_deref() == Some(thread_id) || self.slot2.as_deref() == Some(thread_id)
    }

    /// Clear any slot pointing at `thread_id`.
    pub fn release(&mut self, thread_id: &str) {
        if self.slot1.as_deref() == Some(thread_id) {
            self.slot1 = None;
        }
        if self.slot2.as_deref() == Some(thread_id) {
            self.slot2 = None;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeMap {
    /// `YYYY-MM-DD` start of the 12-week program.
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One of the three planning horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizonKind {
    Week,
    Month,
    Quarter,
}

impl HorizonKind {
    pub const ALL: [HorizonKind; 3] = [Self::Week, Self::Month, Self::Quarter];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Week => "This Week",
            Self::Month => "This Month",
            Self::Quarter => "This Quarter",
        }
    }
}

/// Goals grouped by domain for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub label: String,
    pub domains: BTreeMap<String, Vec<Goal>>,
}

impl Horizon {
    pub fn empty(kind: HorizonKind, domains: &[String]) -> Self {
        Self {
            label: kind.default_label().to_string(),
            domains: domains.iter().map(|d| (d.clone(), Vec::new())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizons {
    pub week: Horizon,
    pub month: Horizon,
    pub quarter: Horizon,
}

impl Horizons {
    pub fn get(&self, kind: HorizonKind) -> &Horizon {
        match kind {
            HorizonKind::Week => &self.week,
            HorizonKind::Month => &self.month,
            HorizonKind::Quarter => &self.quarter,
        }
    }

    pub fn get_mut(&mut self, kind: HorizonKind) -> &mut Horizon {
        match kind {
            HorizonKind::Week => &mut self.week,
            HorizonKind::Month => &mut self.month,
            HorizonKind::Quarter => &mut self.quarter,
        }
    }
}

/// Goals organised by domain and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeMap {
    pub version: u32,
    pub domains: Vec<String>,
    pub default_urgency: Urgency,
    pub horizons: Horizons,
}

impl LifeMap {
    /// Default domains with every horizon empty.
    pub fn empty() -> Self {
        let domains: Vec<String> = DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect();
        Self {
            version: LIFE_MAP_VERSION,
            horizons: Horizons {
                week: Horizon::empty(HorizonKind::Week, &domains),
                month: Horizon::empty(HorizonKind::Month, &domains),
                quarter: Horizon::empty(HorizonKind::Quarter, &domains),
            },
            domains,
            default_urgency: Urgency::Medium,
        }
    }

    /// Default domains with a starter set of example goals.
    pub fn seeded() -> Self {
        let mut map = Self::empty();
        let seed: [(HorizonKind, &str, &str, &str, Urgency); 6] = [
            (
                HorizonKind::Quarter,
                "Income",
                "Rebuild a steady income base",
                "Pick one or two income channels\nBuild a pipeline of leads\nReview traction every two weeks",
                Urgency::High,
            ),
            (
                HorizonKind::Month,
                "Income",
                "Ship one paid piece of work",
                "Scope a small offer\nReach out to five past contacts",
                Urgency::High,
            ),
            (
                HorizonKind::Quarter,
                "Financial",
                "Build a one-month buffer",
                "Track spending for two weeks\nCancel unused subscriptions\nAutomate a small weekly transfer",
                Urgency::Medium,
            ),
            (
                HorizonKind::Month,
                "Home",
                "Reset the living space",
                "Clear one surface per day\nDonate what has not been used in a year",
                Urgency::Low,
            ),
            (
                HorizonKind::Quarter,
                "Health",
                "Move every day",
                "Walk after lunch\nStretch before bed\nThree strength sessions a week",
                Urgency::Medium,
            ),
            (
                HorizonKind::Week,
                "Health",
                "Sleep before midnight",
                "Screens off at 23:00\nSame wake time every day",
                Urgency::Medium,
            ),
        ];

        for (kind, domain, title, notes, urgency) in seed {
            let mut goal = Goal::new(title, urgency);
            goal.notes = notes.to_string();
            map.horizons
                .get_mut(kind)
                .domains
                .entry(domain.to_string())
                .or_default()
                .push(goal);
        }
        map
    }

    /// Find a goal anywhere in the map.
    pub fn find_goal(&self, goal_id: &str) -> Option<(HorizonKind, &str, &Goal)> {
        HorizonKind::ALL.iter().find_map(|&kind| {
            self.horizons.get(kind).domains.iter().find_map(|(domain, goals)| {
                goals
                    .iter()
                    .find(|g| g.id == goal_id)
                    .map(|g| (kind, domain.as_str(), g))
            })
        })
    }
}

impl Default for LifeMap {
    fn default() -> Self {
        Self::seeded()
    }
}

/// A unit of aspiration in a domain and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    /// Free text; one sub-item per line.
    pub notes: String,
    pub urgency: Urgency,
    pub created_at: String,
    pub updated_at: String,
    pub linked_thread_ids: Vec<String>,
}

impl Goal {
    pub fn new(title: impl Into<String>, urgency: Urgency) -> Self {
        let now = now_iso();
        Self {
            id: uid(),
            title: title.into(),
            notes: String::new(),
            urgency,
            created_at: now.clone(),
            updated_at: now,
            linked_thread_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_status_canonical_values() {
        assert_eq!(ThreadStatus::parse("active"), ThreadStatus::Active);
        assert_eq!(ThreadStatus::parse("paused"), ThreadStatus::Paused);
        assert_eq!(ThreadStatus::parse("archived"), ThreadStatus::Archived);
    }

    #[test]
    fn test_thread_status_archive_synonyms() {
        for raw in ["Completed", "DONE", "archive", "Archived!", "complete", "all done"] {
            assert_eq!(ThreadStatus::parse(raw), ThreadStatus::Archived, "{raw}");
        }
    }

    #[test]
    fn test_thread_status_legacy_label_preserved() {
        let status = ThreadStatus::parse("Paused");
        assert_eq!(status, ThreadStatus::Other("Paused".into()));
        assert!(!status.is_archived());
        assert_eq!(status.as_str(), "Paused");
    }

    #[test]
    fn test_thread_status_serde() {
        let json = serde_json::to_string(&ThreadStatus::Other("waiting".into())).unwrap();
        assert_eq!(json, "\"waiting\"");
        let parsed: ThreadStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, ThreadStatus::Archived);
    }

    #[test]
    fn test_new_document_has_complete_horizons() {
        let doc = Document::new();
        for kind in HorizonKind::ALL {
            for domain in &doc.life_map.domains {
                assert!(doc.life_map.horizons.get(kind).domains.contains_key(domain));
            }
        }
        assert!(doc.life_map.horizons.quarter.domains["Relationships"].is_empty());
        assert!(!doc.life_map.horizons.quarter.domains["Income"].is_empty());
    }

    #[test]
    fn test_document_json_field_names() {
        let json = serde_json::to_value(Document::new()).unwrap();
        assert!(json.get("lifeMap").is_some());
        assert!(json.get("incomeMap").is_some());
        assert!(json["meta"].get("updatedAt").is_some());
        assert!(json["lifeMap"].get("defaultUrgency").is_some());
        assert!(json["weekly"]["slot1"].is_null());
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let mut doc = Document::new();
        doc.extra.insert("futureField".into(), Value::from(7));
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extra.get("futureField"), Some(&Value::from(7)));
    }

    #[test]
    fn test_weekly_release() {
        let mut weekly = Weekly {
            slot1: Some("a".into()),
            slot2: Some("b".into()),
            week_of: None,
        };
        weekly.release("b");
        assert!(weekly.contains("a"));
        assert!(!weekly.contains("b"));
    }

    #[test]
    fn test_find_goal() {
        let map = LifeMap::seeded();
        let id = map.horizons.week.domains["Health"][0].id.clone();
        let (kind, domain, goal) = map.find_goal(&id).unwrap();
        assert_eq!(kind, HorizonKind::Week);
        assert_eq!(domain, "Health");
        assert_eq!(goal.title, "Sleep before midnight");
    }
}
