//! Schema migration: upgrades whatever is in storage into a current [`Document`].
//!
//! Migration is total. It never fails for structurally unexpected input; each
//! field falls back to its default on its own, so one damaged section does not
//! cost the rest of the document. It is also idempotent: a document that is
//! already in the current schema comes back unchanged.
//!
//! The life map has the longest history. Stored life maps are classified into a
//! [`LifeMapShape`] and each shape has its own upgrade path:
//!
//! ```text
//! { horizons: {...}, domains: [..] }        -> Current      (repair gaps)
//! { domains: { Health: [goal, ..], .. } }   -> FlatMapping  (becomes the quarter bucket)
//! { domains: [{ name, notes | goals }] }    -> DomainList   (import notes/goals)
//! anything else                             -> Unrecognized (seeded default)
//! ```
//!
//! Detection order matters: a map with both `horizons` and `domains` is current.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::{
    CaptureItem, CaptureStatus, Document, Goal, Horizon, HorizonKind, IncomeMap, LifeMap, Meta,
    Thread, ThreadStatus, Urgency, Weekly, DEFAULT_DOMAINS, DEFAULT_TITLE,
};
use crate::time::{now_iso, uid};

/// Title of the goal created from a legacy domain's free-text notes.
pub const IMPORTED_NOTES_TITLE: &str = "Imported notes";

/// Parse stored JSON text and migrate it.
///
/// Only a JSON syntax error is reported; everything after parsing degrades to
/// defaults instead of failing.
pub fn parse_and_migrate(raw: &str) -> serde_json::Result<Document> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(migrate(value))
}

/// Upgrade any stored value into a current document.
pub fn migrate(value: Value) -> Document {
    let mut obj = match value {
        Value::Object(obj) => obj,
        Value::Null => return Document::new(),
        other => {
            warn!(kind = json_kind(&other), "stored planner data is not an object, starting fresh");
            return Document::new();
        }
    };

    let meta = migrate_meta(obj.remove("meta"));
    let inbox = migrate_inbox(obj.remove("inbox"));
    let threads = migrate_threads(obj.remove("threads"));
    let mut weekly = migrate_weekly(obj.remove("weekly"));
    let life_map = normalize_life_map(obj.remove("lifeMap"));
    let income_map = migrate_income_map(obj.remove("incomeMap"));

    repair_weekly(&mut weekly, &threads);

    Document {
        meta,
        inbox,
        threads,
        weekly,
        life_map,
        income_map,
        extra: obj,
    }
}

// ========== Field helpers ==========

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strings pass through; numbers and booleans are stringified; anything else is absent.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Remove `key` and return it as a string, if it is one.
fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    obj.remove(key).as_ref().and_then(scalar_string)
}

/// Like [`take_string`] but treats empty strings as missing.
fn take_text(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    take_string(obj, key).filter(|s| !s.trim().is_empty())
}

fn get_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(scalar_string)
        .filter(|s| !s.trim().is_empty())
}

/// First non-empty string among `keys`.
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| get_text(obj, key))
}

/// Free text that may be stored as a string or as a list of lines.
fn lines_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => first_text(obj, &["title", "text", "name"]),
                    other => scalar_string(other),
                })
                .collect();
            Some(lines.join("\n"))
        }
        other => scalar_string(other),
    }
}

/// Hand out `id` unless it is missing or already used, in which case mint a new one.
fn unique_id(id: Option<String>, seen: &mut HashSet<String>) -> String {
    let id = match id {
        Some(id) if !seen.contains(&id) => id,
        Some(dup) => {
            debug!(id = %dup, "duplicate identifier, assigning a new one");
            uid()
        }
        None => uid(),
    };
    seen.insert(id.clone());
    id
}

// ========== Top-level sections ==========

fn migrate_meta(value: Option<Value>) -> Meta {
    let Some(Value::Object(mut obj)) = value else {
        return Meta::new();
    };

    let created = take_text(&mut obj, "createdAt");
    let updated = take_text(&mut obj, "updatedAt");
    let (created_at, updated_at) = match (created, updated) {
        (Some(c), Some(u)) => (c, u),
        (Some(c), None) => (c.clone(), c),
        (None, Some(u)) => (u.clone(), u),
        (None, None) => {
            let now = now_iso();
            (now.clone(), now)
        }
    };

    Meta {
        created_at,
        updated_at,
        title: take_text(&mut obj, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    }
}

fn migrate_inbox(value: Option<Value>) -> Vec<CaptureItem> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| {
            let Value::Object(mut obj) = item else {
                debug!("dropping inbox entry that is not an object");
                return None;
            };
            Some(CaptureItem {
                id: unique_id(take_text(&mut obj, "id"), &mut seen),
                text: take_string(&mut obj, "text").unwrap_or_default(),
                created_at: take_text(&mut obj, "createdAt").unwrap_or_else(now_iso),
                status: take_string(&mut obj, "status")
                    .map(|s| CaptureStatus::parse(&s))
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn migrate_threads(value: Option<Value>) -> Vec<Thread> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| normalize_thread(item, &mut seen))
        .collect()
}

/// Bring one stored thread into the current shape.
///
/// `title`/`name` and `updatedAt`/`lastTouched` are legacy pairs: a missing
/// side is filled from the other. The legacy field is only written back when
/// the stored thread already had it.
fn normalize_thread(value: Value, seen: &mut HashSet<String>) -> Option<Thread> {
    let Value::Object(mut obj) = value else {
        debug!("dropping thread entry that is not an object");
        return None;
    };

    let id = unique_id(take_text(&mut obj, "id"), seen);

    let title = take_text(&mut obj, "title");
    let name = take_string(&mut obj, "name");
    let title = title
        .or_else(|| name.clone().filter(|n| !n.trim().is_empty()))
        .unwrap_or_default();
    let name = name.map(|n| if n.trim().is_empty() { title.clone() } else { n });

    let status = take_string(&mut obj, "status")
        .map(|s| ThreadStatus::parse(&s))
        .unwrap_or_default();

    let created = take_text(&mut obj, "createdAt");
    let updated = take_text(&mut obj, "updatedAt");
    let last_touched = take_string(&mut obj, "lastTouched");
    let updated_at = updated
        .or_else(|| last_touched.clone().filter(|t| !t.trim().is_empty()))
        .or_else(|| created.clone())
        .unwrap_or_else(now_iso);
    let last_touched = last_touched.map(|t| if t.trim().is_empty() { updated_at.clone() } else { t });
    let created_at = created.unwrap_or_else(|| updated_at.clone());

    Some(Thread {
        id,
        title,
        name,
        status,
        domain: take_string(&mut obj, "domain").unwrap_or_default(),
        next_action: take_string(&mut obj, "nextAction").unwrap_or_default(),
        notes: take_string(&mut obj, "notes").unwrap_or_default(),
        created_at,
        updated_at,
        last_touched,
        extra: obj,
    })
}

fn migrate_weekly(value: Option<Value>) -> Weekly {
    let Some(Value::Object(mut obj)) = value else {
        return Weekly::default();
    };
    Weekly {
        slot1: take_text(&mut obj, "slot1"),
        slot2: take_text(&mut obj, "slot2"),
        week_of: take_text(&mut obj, "weekOf"),
    }
}

/// Clear weekly slots that point at missing or archived threads.
fn repair_weekly(weekly: &mut Weekly, threads: &[Thread]) {
    for slot in [&mut weekly.slot1, &mut weekly.slot2] {
        let orphaned = slot.as_deref().is_some_and(|id| {
            threads
                .iter()
                .find(|t| t.id == id)
                .is_none_or(|t| t.is_archived())
        });
        if orphaned {
            debug!(thread_id = ?slot, "clearing weekly slot for missing or archived thread");
            *slot = None;
        }
    }
}

fn migrate_income_map(value: Option<Value>) -> IncomeMap {
    let Some(Value::Object(mut obj)) = value else {
        return IncomeMap::default();
    };
    IncomeMap {
        start_date: take_text(&mut obj, "startDate"),
    }
}

// ========== Life map ==========

/// The stored life map shapes this version knows how to read.
#[derive(Debug, Clone, PartialEq)]
pub enum LifeMapShape {
    /// Version 2: `horizons` object plus a list of domain names.
    Current(Map<String, Value>),
    /// Domain name to goal list, with no horizons. Holds the `domains` mapping.
    FlatMapping(Map<String, Value>),
    /// List of domain objects with free-text notes or nested goals.
    DomainList(Vec<Value>),
    /// Missing, null, or not recognizable.
    Unrecognized,
}

impl LifeMapShape {
    pub fn detect(value: Option<Value>) -> Self {
        let Some(Value::Object(mut obj)) = value else {
            return Self::Unrecognized;
        };
        if obj.get("horizons").is_some_and(Value::is_object) {
            return Self::Current(obj);
        }
        match obj.remove("domains") {
            Some(Value::Object(mapping)) => Self::FlatMapping(mapping),
            Some(Value::Array(list)) => Self::DomainList(list),
            _ => Self::Unrecognized,
        }
    }

    pub fn upgrade(self) -> LifeMap {
        let mut map = match self {
            Self::Current(obj) => upgrade_current(obj),
            Self::FlatMapping(mapping) => upgrade_flat_mapping(mapping),
            Self::DomainList(list) => upgrade_domain_list(list),
            Self::Unrecognized => return LifeMap::seeded(),
        };
        ensure_domain_entries(&mut map);
        map
    }
}

/// Bring any stored life map into the current schema.
pub fn normalize_life_map(value: Option<Value>) -> LifeMap {
    LifeMapShape::detect(value).upgrade()
}

/// Make sure every declared domain has a (possibly empty) list in every horizon.
pub fn ensure_domain_entries(map: &mut LifeMap) {
    for kind in HorizonKind::ALL {
        let horizon = map.horizons.get_mut(kind);
        for domain in &map.domains {
            horizon.domains.entry(domain.clone()).or_default();
        }
    }
}

fn coerce_domain_names(list: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    list.iter()
        .filter_map(|entry| match entry {
            Value::Object(obj) => first_text(obj, &["name", "title", "domain"]),
            other => scalar_string(other),
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

fn coerce_goal(value: &Value, fallback: Urgency, seen: &mut HashSet<String>) -> Option<Goal> {
    match value {
        Value::Object(obj) => {
            let created = get_text(obj, "createdAt");
            let updated = get_text(obj, "updatedAt");
            let updated_at = updated.or_else(|| created.clone()).unwrap_or_else(now_iso);
            let linked_thread_ids = match obj.get("linkedThreadIds") {
                Some(Value::Array(ids)) => ids.iter().filter_map(scalar_string).collect(),
                _ => Vec::new(),
            };
            Some(Goal {
                id: unique_id(get_text(obj, "id"), seen),
                title: first_text(obj, &["title", "name", "text"]).unwrap_or_default(),
                notes: ["notes", "sub", "items"]
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(lines_text))
                    .unwrap_or_default(),
                urgency: obj
                    .get("urgency")
                    .and_then(Value::as_str)
                    .and_then(Urgency::parse)
                    .unwrap_or(fallback),
                created_at: created.unwrap_or_else(|| updated_at.clone()),
                updated_at,
                linked_thread_ids,
            })
        }
        Value::String(title) if !title.trim().is_empty() => {
            let mut goal = Goal::new(title.trim(), fallback);
            goal.id = unique_id(Some(goal.id), seen);
            Some(goal)
        }
        _ => None,
    }
}

fn coerce_goal_list(value: &Value, fallback: Urgency, seen: &mut HashSet<String>) -> Vec<Goal> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| coerce_goal(item, fallback, seen))
            .collect(),
        _ => Vec::new(),
    }
}

fn imported_notes_goal(notes: &str, seen: &mut HashSet<String>) -> Goal {
    let mut goal = Goal::new(IMPORTED_NOTES_TITLE, Urgency::Medium);
    goal.notes = notes.to_string();
    goal.id = unique_id(Some(goal.id), seen);
    goal
}

fn push_goals(map: &mut LifeMap, kind: HorizonKind, domain: &str, goals: Vec<Goal>) {
    if !map.domains.iter().any(|d| d == domain) {
        map.domains.push(domain.to_string());
    }
    map.horizons
        .get_mut(kind)
        .domains
        .entry(domain.to_string())
        .or_default()
        .extend(goals);
}

fn upgrade_current(mut obj: Map<String, Value>) -> LifeMap {
    let domains = match obj.get("domains") {
        Some(Value::Array(list)) => coerce_domain_names(list),
        _ => DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
    };
    let default_urgency = obj
        .get("defaultUrgency")
        .and_then(Value::as_str)
        .and_then(Urgency::parse)
        .unwrap_or_default();

    let mut horizons = match obj.remove("horizons") {
        Some(Value::Object(h)) => h,
        _ => Map::new(),
    };
    if !horizons.contains_key("quarter") {
        if let Some(three_months) = horizons.remove("threeMonths") {
            debug!("renaming legacy threeMonths horizon to quarter");
            horizons.insert("quarter".to_string(), three_months);
        }
    }

    let mut map = LifeMap::empty();
    map.domains = domains;
    map.default_urgency = default_urgency;

    let mut seen = HashSet::new();
    for kind in HorizonKind::ALL {
        let stored = horizons.remove(kind.key());
        let stored = stored.as_ref().and_then(Value::as_object);

        let mut horizon = Horizon {
            label: stored
                .and_then(|h| get_text(h, "label"))
                .unwrap_or_else(|| kind.default_label().to_string()),
            domains: Default::default(),
        };

        if let Some(Value::Object(by_domain)) = stored.and_then(|h| h.get("domains")) {
            for (raw_name, goals) in by_domain {
                let name = raw_name.trim();
                let goals = coerce_goal_list(goals, default_urgency, &mut seen);
                if name.is_empty() {
                    if !goals.is_empty() {
                        warn!(count = goals.len(), "dropping goals filed under an empty domain name");
                    }
                    continue;
                }
                if !map.domains.iter().any(|d| d == name) {
                    if goals.is_empty() {
                        continue;
                    }
                    debug!(domain = name, "declaring domain that only existed in a horizon");
                    map.domains.push(name.to_string());
                }
                horizon.domains.entry(name.to_string()).or_default().extend(goals);
            }
        }

        *map.horizons.get_mut(kind) = horizon;
    }

    map
}

fn upgrade_flat_mapping(mapping: Map<String, Value>) -> LifeMap {
    debug!(domains = mapping.len(), "upgrading flat domain mapping into the quarter horizon");
    let mut map = LifeMap::empty();
    let mut seen = HashSet::new();

    for (raw_name, value) in mapping {
        let name = raw_name.trim();
        if name.is_empty() {
            continue;
        }
        let goals = match &value {
            Value::String(notes) if !notes.trim().is_empty() => {
                vec![imported_notes_goal(notes.trim(), &mut seen)]
            }
            other => coerce_goal_list(other, Urgency::Medium, &mut seen),
        };
        push_goals(&mut map, HorizonKind::Quarter, name, goals);
    }
    map
}

/// Pick the default domain a legacy free-text domain most likely meant.
pub fn keyword_domain(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    if name.contains("health") {
        Some("Health")
    } else if name.contains("home") {
        Some("Home")
    } else if name.contains("relat") {
        Some("Relationships")
    } else if name.contains("income") || name.contains("work") {
        Some("Income")
    } else if name.contains("fin") {
        Some("Financial")
    } else {
        None
    }
}

fn upgrade_domain_list(list: Vec<Value>) -> LifeMap {
    debug!(domains = list.len(), "upgrading legacy domain list");
    let mut map = LifeMap::empty();
    let mut seen = HashSet::new();

    for entry in list {
        let Value::Object(obj) = entry else {
            continue;
        };
        let name = first_text(&obj, &["name", "title", "domain"])
            .map(|n| n.trim().to_string())
            .unwrap_or_default();
        let notes = get_text(&obj, "notes").map(|n| n.trim().to_string());
        let nested = ["goals", "items"]
            .iter()
            .find_map(|key| obj.get(*key).filter(|v| v.is_array()));

        match nested {
            Some(goals) if !name.is_empty() => {
                let mut imported = coerce_goal_list(goals, Urgency::Medium, &mut seen);
                if let Some(notes) = notes {
                    imported.push(imported_notes_goal(&notes, &mut seen));
                }
                push_goals(&mut map, HorizonKind::Quarter, &name, imported);
            }
            _ => {
                let Some(notes) = notes else {
                    continue;
                };
                match keyword_domain(&name) {
                    Some(target) => {
                        let goal = imported_notes_goal(&notes, &mut seen);
                        push_goals(&mut map, HorizonKind::Quarter, target, vec![goal]);
                    }
                    None => {
                        warn!(domain = %name, "no matching domain for legacy notes, dropping them");
                    }
                }
            }
        }
    }
    map
}
