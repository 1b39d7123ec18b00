//! Planner operations on a loaded document.
//!
//! Every operation mutates the [`Document`] in memory only; callers persist
//! it afterwards with [`crate::PlannerStore::save`], which also stamps
//! `meta.updatedAt`.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::document::{
    CaptureItem, CaptureStatus, Document, Goal, HorizonKind, Thread, ThreadStatus, Urgency,
};
use crate::time::{monday_of, now_iso, parse_ymd, uid, week_number_from_start, ymd};

/// Longest thread title taken from a capture.
pub const THREAD_TITLE_MAX_CHARS: usize = 80;
/// Length of the income program in weeks.
pub const PROGRAM_WEEKS: u32 = 12;

/// Fixed income-program checkpoints.
pub const CHECKPOINTS: [(u32, &str); 4] = [
    (4, "Week 4: tighten focus, drop non-earning distractions"),
    (6, "Week 6: commit to 1-2 income channels, build pipeline"),
    (8, "Week 8: evaluate traction; escalate if stalled"),
    (10, "Week 10: decision runway for the next phase"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Capture not found: {0}")]
    CaptureNotFound(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("No open thread titled {0:?}")]
    NoMatchingThread(String),

    #[error("Domain already exists: {0}")]
    DomainExists(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Fields a user may edit on an existing thread. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ThreadUpdate {
    pub next_action: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ThreadStatus>,
}

/// Which weekly focus slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSlot {
    First,
    Second,
}

/// An income-program checkpoint and whether it has been reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    pub week: u32,
    pub label: &'static str,
    pub reached: bool,
}

/// Coarse category of a free-text domain, used to colour items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainCategory {
    Health,
    Home,
    WorkIncome,
    Relationships,
    CreativeMeaning,
    Other,
}

impl DomainCategory {
    /// Classify by keyword, first match wins.
    pub fn classify(domain: &str) -> Self {
        let d = domain.trim().to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| d.contains(w));
        if d.is_empty() {
            Self::Other
        } else if d.contains("health") {
            Self::Health
        } else if d.contains("home") {
            Self::Home
        } else if any(&["work", "income", "money", "job", "career"]) {
            Self::WorkIncome
        } else if any(&["relationship", "family", "social"]) {
            Self::Relationships
        } else if any(&["creative", "meaning", "writing", "art"]) {
            Self::CreativeMeaning
        } else {
            Self::Other
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Health => "domain-health",
            Self::Home => "domain-home",
            Self::WorkIncome => "domain-work-income",
            Self::Relationships => "domain-relationships",
            Self::CreativeMeaning => "domain-creative-meaning",
            Self::Other => "domain-other",
        }
    }
}

impl HorizonKind {
    /// The next shorter horizon (quarter -> month -> week).
    pub fn nearer(&self) -> Option<Self> {
        match self {
            Self::Quarter => Some(Self::Month),
            Self::Month => Some(Self::Week),
            Self::Week => None,
        }
    }

    /// The next longer horizon (week -> month -> quarter).
    pub fn further(&self) -> Option<Self> {
        match self {
            Self::Week => Some(Self::Month),
            Self::Month => Some(Self::Quarter),
            Self::Quarter => None,
        }
    }
}

fn non_empty(text: &str, err: PlannerError) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

impl Document {
    // ========== Capture ==========

    /// Add an open inbox item. Returns its id.
    pub fn capture(&mut self, text: &str) -> Result<String> {
        let text = non_empty(text, PlannerError::EmptyText)?;
        let item = CaptureItem {
            id: uid(),
            text,
            created_at: now_iso(),
            status: CaptureStatus::Open,
        };
        let id = item.id.clone();
        self.inbox.push(item);
        Ok(id)
    }

    pub fn archive_capture(&mut self, id: &str) -> Result<()> {
        let item = self
            .capture_mut(id)
            .ok_or_else(|| PlannerError::CaptureNotFound(id.to_string()))?;
        item.status = CaptureStatus::Archived;
        Ok(())
    }

    /// Archive every inbox item. Returns how many were still open.
    pub fn archive_all_captures(&mut self) -> usize {
        let mut archived = 0;
        for item in &mut self.inbox {
            if item.status == CaptureStatus::Open {
                archived += 1;
            }
            item.status = CaptureStatus::Archived;
        }
        archived
    }

    /// Open inbox items, newest first.
    pub fn open_captures(&self) -> Vec<&CaptureItem> {
        let mut open: Vec<_> = self
            .inbox
            .iter()
            .filter(|i| i.status == CaptureStatus::Open)
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        open
    }

    // ========== Triage ==========

    /// Turn a capture into a new active thread and archive the capture.
    /// Returns the thread id.
    pub fn promote_capture(&mut self, capture_id: &str) -> Result<String> {
        let item = self
            .capture_mut(capture_id)
            .ok_or_else(|| PlannerError::CaptureNotFound(capture_id.to_string()))?;
        item.status = CaptureStatus::Archived;
        let text = item.text.clone();

        let mut thread = Thread::new(text.chars().take(THREAD_TITLE_MAX_CHARS).collect::<String>());
        thread.notes = text;
        let id = thread.id.clone();
        self.threads.push(thread);
        debug!(capture_id, thread_id = %id, "promoted capture to thread");
        Ok(id)
    }

    /// Append a capture's text to the open thread whose title matches
    /// `thread_title` ignoring case, then archive the capture.
    pub fn append_capture_to_thread(&mut self, capture_id: &str, thread_title: &str) -> Result<String> {
        let text = self
            .inbox
            .iter()
            .find(|c| c.id == capture_id)
            .map(|c| c.text.clone())
            .ok_or_else(|| PlannerError::CaptureNotFound(capture_id.to_string()))?;

        let wanted = thread_title.to_lowercase();
        let thread = self
            .threads
            .iter_mut()
            .find(|t| !t.is_archived() && t.title.to_lowercase() == wanted)
            .ok_or_else(|| PlannerError::NoMatchingThread(thread_title.to_string()))?;

        if thread.notes.is_empty() {
            thread.notes = text;
        } else {
            thread.notes = format!("{}\n\n{}", thread.notes, text);
        }
        thread.touch();
        let thread_id = thread.id.clone();

        self.archive_capture(capture_id)?;
        Ok(thread_id)
    }

    // ========== Threads ==========

    /// Create an active thread. Returns its id.
    pub fn add_thread(&mut self, title: &str, domain: &str, next_action: &str) -> Result<String> {
        let mut thread = Thread::new(non_empty(title, PlannerError::EmptyTitle)?);
        thread.domain = domain.trim().to_string();
        thread.next_action = next_action.trim().to_string();
        let id = thread.id.clone();
        self.threads.push(thread);
        Ok(id)
    }

    /// Edit a thread. Archiving it also clears it from the weekly slots.
    pub fn update_thread(&mut self, id: &str, update: ThreadUpdate) -> Result<()> {
        let thread = self
            .thread_mut(id)
            .ok_or_else(|| PlannerError::ThreadNotFound(id.to_string()))?;
        if let Some(next_action) = update.next_action {
            thread.next_action = next_action.trim().to_string();
        }
        if let Some(notes) = update.notes {
            thread.notes = notes.trim().to_string();
        }
        if let Some(status) = update.status {
            thread.status = status;
        }
        thread.touch();

        if thread.is_archived() {
            self.weekly.release(id);
        }
        Ok(())
    }

    /// Threads that are not archived, most recently updated first.
    pub fn active_threads(&self) -> Vec<&Thread> {
        let mut active: Vec<_> = self.threads.iter().filter(|t| !t.is_archived()).collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        active
    }

    // ========== Weekly focus ==========

    /// Put a thread in focus: the first empty slot, or slot 2 when both are
    /// taken. A thread already in focus stays where it is.
    pub fn focus_thread(&mut self, id: &str) -> Result<()> {
        if self.thread(id).is_none() {
            return Err(PlannerError::ThreadNotFound(id.to_string()));
        }
        if self.weekly.contains(id) {
            return Ok(());
        }
        let slot = if self.weekly.slot1.is_none() {
            &mut self.weekly.slot1
        } else {
            &mut self.weekly.slot2
        };
        *slot = Some(id.to_string());
        Ok(())
    }

    /// Set or clear one slot directly.
    pub fn set_focus_slot(&mut self, slot: FocusSlot, thread_id: Option<&str>) -> Result<()> {
        if let Some(id) = thread_id {
            if self.thread(id).is_none() {
                return Err(PlannerError::ThreadNotFound(id.to_string()));
            }
        }
        let value = thread_id.map(str::to_string);
        match slot {
            FocusSlot::First => self.weekly.slot1 = value,
            FocusSlot::Second => self.weekly.slot2 = value,
        }
        Ok(())
    }

    /// Roll `weekOf` to the Monday of `today`'s week. Returns true if it changed.
    pub fn ensure_week_of(&mut self, today: NaiveDate) -> bool {
        let monday = ymd(monday_of(today));
        if self.weekly.week_of.as_deref() == Some(monday.as_str()) {
            return false;
        }
        self.weekly.week_of = Some(monday);
        true
    }

    // ========== Life map ==========

    /// Add a domain to the map and to every horizon.
    pub fn add_domain(&mut self, name: &str) -> Result<()> {
        let name = non_empty(name, PlannerError::EmptyTitle)?;
        if self.life_map.domains.iter().any(|d| d.eq_ignore_ascii_case(&name)) {
            return Err(PlannerError::DomainExists(name));
        }
        for kind in HorizonKind::ALL {
            self.life_map
                .horizons
                .get_mut(kind)
                .domains
                .entry(name.clone())
                .or_default();
        }
        self.life_map.domains.push(name);
        Ok(())
    }

    /// Remove a domain and its goals from every horizon. Returns the removed goals.
    pub fn remove_domain(&mut self, name: &str) -> Result<Vec<Goal>> {
        let pos = self
            .life_map
            .domains
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| PlannerError::DomainNotFound(name.to_string()))?;
        self.life_map.domains.remove(pos);

        let mut removed = Vec::new();
        for kind in HorizonKind::ALL {
            if let Some(goals) = self.life_map.horizons.get_mut(kind).domains.remove(name) {
                removed.extend(goals);
            }
        }
        Ok(removed)
    }

    /// Add a goal to one horizon of a domain. Returns its id.
    pub fn add_goal(
        &mut self,
        kind: HorizonKind,
        domain: &str,
        title: &str,
        urgency: Option<Urgency>,
    ) -> Result<String> {
        if !self.life_map.domains.iter().any(|d| d == domain) {
            return Err(PlannerError::DomainNotFound(domain.to_string()));
        }
        let goal = Goal::new(
            non_empty(title, PlannerError::EmptyTitle)?,
            urgency.unwrap_or(self.life_map.default_urgency),
        );
        let id = goal.id.clone();
        self.life_map
            .horizons
            .get_mut(kind)
            .domains
            .entry(domain.to_string())
            .or_default()
            .push(goal);
        Ok(id)
    }

    fn take_goal(&mut self, goal_id: &str) -> Result<(HorizonKind, String, Goal)> {
        let (kind, domain) = self
            .life_map
            .find_goal(goal_id)
            .map(|(kind, domain, _)| (kind, domain.to_string()))
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let goals = self
            .life_map
            .horizons
            .get_mut(kind)
            .domains
            .get_mut(&domain)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let pos = goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        Ok((kind, domain, goals.remove(pos)))
    }

    /// Move a goal to another horizon, keeping its domain.
    pub fn move_goal(&mut self, goal_id: &str, to: HorizonKind) -> Result<()> {
        let (from, domain, mut goal) = self.take_goal(goal_id)?;
        if from != to {
            goal.updated_at = now_iso();
        }
        self.life_map
            .horizons
            .get_mut(to)
            .domains
            .entry(domain)
            .or_default()
            .push(goal);
        Ok(())
    }

    /// Move a goal one horizon nearer. Returns the new horizon, or `None`
    /// when it is already in the week.
    pub fn promote_goal(&mut self, goal_id: &str) -> Result<Option<HorizonKind>> {
        self.shift_goal(goal_id, HorizonKind::nearer)
    }

    /// Move a goal one horizon further out. Returns the new horizon, or
    /// `None` when it is already in the quarter.
    pub fn demote_goal(&mut self, goal_id: &str) -> Result<Option<HorizonKind>> {
        self.shift_goal(goal_id, HorizonKind::further)
    }

    fn shift_goal(
        &mut self,
        goal_id: &str,
        step: fn(&HorizonKind) -> Option<HorizonKind>,
    ) -> Result<Option<HorizonKind>> {
        let (kind, _, _) = self
            .life_map
            .find_goal(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let Some(target) = step(&kind) else {
            return Ok(None);
        };
        self.move_goal(goal_id, target)?;
        Ok(Some(target))
    }

    pub fn remove_goal(&mut self, goal_id: &str) -> Result<Goal> {
        self.take_goal(goal_id).map(|(_, _, goal)| goal)
    }

    // ========== Income map ==========

    /// Set the program start date (`YYYY-MM-DD`), or clear it with `None`
    /// or an empty string.
    pub fn set_income_start(&mut self, start: Option<&str>) -> Result<()> {
        match start.map(str::trim).filter(|s| !s.is_empty()) {
            None => self.income_map.start_date = None,
            Some(raw) => {
                let date = parse_ymd(raw).ok_or_else(|| PlannerError::InvalidDate(raw.to_string()))?;
                self.income_map.start_date = Some(ymd(date));
            }
        }
        Ok(())
    }

    /// Current 1-based program week, `None` without a valid start date.
    pub fn income_week(&self, today: NaiveDate) -> Option<u32> {
        self.income_map
            .start_date
            .as_deref()
            .and_then(|start| week_number_from_start(start, today))
    }

    pub fn checkpoints(&self, today: NaiveDate) -> Vec<Checkpoint> {
        let week = self.income_week(today);
        CHECKPOINTS
            .iter()
            .map(|&(w, label)| Checkpoint {
                week: w,
                label,
                reached: week.is_some_and(|current| current >= w),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_ymd(s).unwrap()
    }

    #[test]
    fn test_capture_trims_and_rejects_empty() {
        let mut doc = Document::new();
        assert_eq!(doc.capture("   "), Err(PlannerError::EmptyText));
        let id = doc.capture("  call the bank ").unwrap();
        assert_eq!(doc.inbox[0].id, id);
        assert_eq!(doc.inbox[0].text, "call the bank");
        assert_eq!(doc.inbox[0].status, CaptureStatus::Open);
    }

    #[test]
    fn test_open_captures_newest_first() {
        let mut doc = Document::new();
        let a = doc.capture("a").unwrap();
        let b = doc.capture("b").unwrap();
        doc.inbox[0].created_at = "2024-01-01T00:00:00.000Z".into();
        doc.inbox[1].created_at = "2024-02-01T00:00:00.000Z".into();

        let open: Vec<_> = doc.open_captures().iter().map(|c| c.id.clone()).collect();
        assert_eq!(open, vec![b, a.clone()]);

        doc.archive_capture(&a).unwrap();
        assert_eq!(doc.open_captures().len(), 1);
        assert_eq!(doc.archive_all_captures(), 1);
        assert!(doc.open_captures().is_empty());
    }

    #[test]
    fn test_archive_missing_capture() {
        let mut doc = Document::new();
        assert_eq!(
            doc.archive_capture("nope"),
            Err(PlannerError::CaptureNotFound("nope".into()))
        );
    }

    #[test]
    fn test_promote_capture_truncates_title() {
        let mut doc = Document::new();
        let long = "x".repeat(100);
        let cid = doc.capture(&long).unwrap();
        let tid = doc.promote_capture(&cid).unwrap();

        let thread = doc.thread(&tid).unwrap();
        assert_eq!(thread.title.chars().count(), 80);
        assert_eq!(thread.notes, long);
        assert_eq!(thread.status, ThreadStatus::Active);
        assert_eq!(doc.inbox[0].status, CaptureStatus::Archived);
    }

    #[test]
    fn test_append_capture_matches_title_ignoring_case() {
        let mut doc = Document::new();
        let tid = doc.add_thread("Tax Return", "", "").unwrap();
        doc.update_thread(
            &tid,
            ThreadUpdate {
                notes: Some("first".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let cid = doc.capture("find receipts").unwrap();

        assert_eq!(doc.append_capture_to_thread(&cid, "tax return").unwrap(), tid);
        assert_eq!(doc.thread(&tid).unwrap().notes, "first\n\nfind receipts");
        assert_eq!(doc.inbox[0].status, CaptureStatus::Archived);
    }

    #[test]
    fn test_append_skips_archived_threads() {
        let mut doc = Document::new();
        let tid = doc.add_thread("Old", "", "").unwrap();
        doc.update_thread(
            &tid,
            ThreadUpdate {
                status: Some(ThreadStatus::Archived),
                ..Default::default()
            },
        )
        .unwrap();
        let cid = doc.capture("more").unwrap();
        assert_eq!(
            doc.append_capture_to_thread(&cid, "Old"),
            Err(PlannerError::NoMatchingThread("Old".into()))
        );
        assert_eq!(doc.inbox[0].status, CaptureStatus::Open);
    }

    #[test]
    fn test_archiving_thread_clears_focus() {
        let mut doc = Document::new();
        let a = doc.add_thread("A", "Home", "").unwrap();
        let b = doc.add_thread("B", "", "").unwrap();
        doc.focus_thread(&a).unwrap();
        doc.focus_thread(&b).unwrap();
        assert_eq!(doc.weekly.slot1.as_deref(), Some(a.as_str()));
        assert_eq!(doc.weekly.slot2.as_deref(), Some(b.as_str()));

        doc.update_thread(
            &b,
            ThreadUpdate {
                status: Some(ThreadStatus::parse("done")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(doc.weekly.slot2, None);
        assert_eq!(doc.active_threads().len(), 1);
    }

    #[test]
    fn test_focus_replaces_second_slot_when_full() {
        let mut doc = Document::new();
        let a = doc.add_thread("A", "", "").unwrap();
        let b = doc.add_thread("B", "", "").unwrap();
        let c = doc.add_thread("C", "", "").unwrap();
        doc.focus_thread(&a).unwrap();
        doc.focus_thread(&b).unwrap();
        doc.focus_thread(&c).unwrap();
        assert_eq!(doc.weekly.slot1.as_deref(), Some(a.as_str()));
        assert_eq!(doc.weekly.slot2.as_deref(), Some(c.as_str()));

        // Refocusing a focused thread is a no-op
        doc.focus_thread(&a).unwrap();
        assert_eq!(doc.weekly.slot2.as_deref(), Some(c.as_str()));

        doc.set_focus_slot(FocusSlot::First, None).unwrap();
        assert_eq!(doc.weekly.slot1, None);
        assert!(doc.set_focus_slot(FocusSlot::First, Some("ghost")).is_err());
    }

    #[test]
    fn test_ensure_week_of() {
        let mut doc = Document::new();
        assert!(doc.ensure_week_of(date("2024-05-09")));
        assert_eq!(doc.weekly.week_of.as_deref(), Some("2024-05-06"));
        assert!(!doc.ensure_week_of(date("2024-05-12")));
        assert!(doc.ensure_week_of(date("2024-05-13")));
    }

    #[test]
    fn test_add_and_remove_domain_keeps_horizons_in_sync() {
        let mut doc = Document::new();
        doc.add_domain(" Creative ").unwrap();
        assert_eq!(
            doc.add_domain("creative"),
            Err(PlannerError::DomainExists("creative".into()))
        );
        for kind in HorizonKind::ALL {
            assert!(doc.life_map.horizons.get(kind).domains.contains_key("Creative"));
        }

        doc.add_goal(HorizonKind::Week, "Creative", "Sketch", None).unwrap();
        let removed = doc.remove_domain("Creative").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(!doc.life_map.domains.contains(&"Creative".to_string()));
        for kind in HorizonKind::ALL {
            assert!(!doc.life_map.horizons.get(kind).domains.contains_key("Creative"));
        }
    }

    #[test]
    fn test_goal_promote_and_demote() {
        let mut doc = Document::new();
        let id = doc
            .add_goal(HorizonKind::Quarter, "Home", "Paint the hall", Some(Urgency::Low))
            .unwrap();

        assert_eq!(doc.promote_goal(&id).unwrap(), Some(HorizonKind::Month));
        assert_eq!(doc.promote_goal(&id).unwrap(), Some(HorizonKind::Week));
        assert_eq!(doc.promote_goal(&id).unwrap(), None);
        let (kind, domain, goal) = doc.life_map.find_goal(&id).unwrap();
        assert_eq!((kind, domain), (HorizonKind::Week, "Home"));
        assert_eq!(goal.urgency, Urgency::Low);

        assert_eq!(doc.demote_goal(&id).unwrap(), Some(HorizonKind::Month));
        let goal = doc.remove_goal(&id).unwrap();
        assert_eq!(goal.title, "Paint the hall");
        assert!(doc.life_map.find_goal(&id).is_none());
    }

    #[test]
    fn test_add_goal_requires_known_domain() {
        let mut doc = Document::new();
        assert_eq!(
            doc.add_goal(HorizonKind::Week, "Nowhere", "x", None),
            Err(PlannerError::DomainNotFound("Nowhere".into()))
        );
    }

    #[test]
    fn test_income_week_and_checkpoints() {
        let mut doc = Document::new();
        assert_eq!(doc.income_week(date("2024-03-01")), None);
        assert!(doc.checkpoints(date("2024-03-01")).iter().all(|c| !c.reached));

        doc.set_income_start(Some("2024-01-01")).unwrap();
        // 42 days in: week 7
        assert_eq!(doc.income_week(date("2024-02-12")), Some(7));
        let reached: Vec<_> = doc
            .checkpoints(date("2024-02-12"))
            .iter()
            .map(|c| (c.week, c.reached))
            .collect();
        assert_eq!(reached, vec![(4, true), (6, true), (8, false), (10, false)]);

        // Before the start clamps to week 1
        assert_eq!(doc.income_week(date("2023-12-01")), Some(1));

        assert!(doc.set_income_start(Some("01/02/2024")).is_err());
        doc.set_income_start(Some("")).unwrap();
        assert_eq!(doc.income_map.start_date, None);
    }

    #[test]
    fn test_domain_category() {
        assert_eq!(DomainCategory::classify("Mental Health"), DomainCategory::Health);
        assert_eq!(DomainCategory::classify("Home"), DomainCategory::Home);
        assert_eq!(DomainCategory::classify("Side income"), DomainCategory::WorkIncome);
        assert_eq!(DomainCategory::classify("Family"), DomainCategory::Relationships);
        assert_eq!(DomainCategory::classify("Writing"), DomainCategory::CreativeMeaning);
        assert_eq!(DomainCategory::classify(""), DomainCategory::Other);
        assert_eq!(DomainCategory::classify("Garden").css_class(), "domain-other");
    }
}
