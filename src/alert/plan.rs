//! The eclipse timetable derived from a totality window.
//!
//! Events run from first contact, through seven evenly spaced photo prompts
//! in each partial phase, to last contact. First and last contact sit at
//! fixed distances from totality instead of being computed from the eclipse
//! geometry, which is close enough near the middle of the path.
//!
//! Photo prompts and the two totality contacts get two notices, a minute
//! and half a minute ahead, then a `Time` countdown landing on the event.
//! Mid-totality and the cue to start video get a single warning.

use std::fmt;

use super::book::{AlertRecord, PageId};
use super::kind::AlertKind;
use crate::umbra::Totality;

/// Page the UI shows while counting down to an event.
pub const TOTALITY_PAGE: PageId = 1;

/// Seconds before a countdown event at which a notice sounds.
pub const CONTACT_NOTICES: [i64; 2] = [60, 30];

/// First contact, in seconds before totality begins.
pub const PARTIAL_BEFORE_SECS: i64 = 4622;

/// Last contact, in seconds after totality ends.
pub const PARTIAL_AFTER_SECS: i64 = 4589;

/// Each partial phase is split into this many equal steps.
pub const PARTIAL_STEPS: u32 = 8;

/// Video setup is cued this long after the sixth partial prompt.
pub const SETUP_VIDEO_AFTER: (u32, i64) = (6, 32);

/// What happens at a timetable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    FirstContact,
    /// Photo prompt during a partial phase, numbered 1 to 14 across both.
    Partial(u32),
    SetupVideo,
    TotalityStart,
    MidTotality,
    TotalityEnd,
    LastContact,
}

impl PlanStep {
    fn alerts(self, time: i64) -> Vec<(i64, AlertKind)> {
        match self {
            PlanStep::SetupVideo | PlanStep::MidTotality => vec![(time, AlertKind::Warning)],
            _ => CONTACT_NOTICES
                .iter()
                .map(|lead| (time - lead, AlertKind::Notice))
                .chain([(time, AlertKind::Time)])
                .collect(),
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::FirstContact => write!(f, "First contact photo"),
            PlanStep::Partial(n) => write!(f, "Partial photo {n}"),
            PlanStep::SetupVideo => write!(f, "Set up video"),
            PlanStep::TotalityStart => write!(f, "Totality begins"),
            PlanStep::MidTotality => write!(f, "Mid-totality"),
            PlanStep::TotalityEnd => write!(f, "Totality ends"),
            PlanStep::LastContact => write!(f, "Last contact photo"),
        }
    }
}

/// One timetable entry, in seconds since UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEvent {
    pub time: i64,
    pub step: PlanStep,
}

// Prompts strictly inside a partial phase; times truncate toward zero
fn partial_prompts(from: i64, length: i64) -> impl Iterator<Item = i64> {
    let step = length as f64 / f64::from(PARTIAL_STEPS);
    (1..PARTIAL_STEPS).map(move |k| (from as f64 + f64::from(k) * step) as i64)
}

/// The full timetable for one totality window, in time order.
pub fn totality_plan(totality: &Totality) -> Vec<PlanEvent> {
    let event = |time, step| PlanEvent { time, step };
    let first_contact = totality.start - PARTIAL_BEFORE_SECS;
    let (video_after, video_delay) = SETUP_VIDEO_AFTER;

    let mut events = vec![event(first_contact, PlanStep::FirstContact)];
    for (n, time) in (1..).zip(partial_prompts(first_contact, PARTIAL_BEFORE_SECS)) {
        events.push(event(time, PlanStep::Partial(n)));
        if n == video_after {
            events.push(event(time + video_delay, PlanStep::SetupVideo));
        }
    }

    events.push(event(totality.start, PlanStep::TotalityStart));
    events.push(event(
        totality.start + totality.duration() / 2,
        PlanStep::MidTotality,
    ));
    events.push(event(totality.end, PlanStep::TotalityEnd));

    for (n, time) in (PARTIAL_STEPS..).zip(partial_prompts(totality.end, PARTIAL_AFTER_SECS)) {
        events.push(event(time, PlanStep::Partial(n)));
    }
    events.push(event(
        totality.end + PARTIAL_AFTER_SECS,
        PlanStep::LastContact,
    ));

    events.sort_by_key(|e| e.time);
    events
}

/// Alert records for every event in [`totality_plan`], in time order.
pub fn totality_alerts(totality: &Totality, priority: i32) -> Vec<AlertRecord> {
    let mut records: Vec<AlertRecord> = totality_plan(totality)
        .into_iter()
        .flat_map(|event| event.step.alerts(event.time))
        .map(|(time, sound)| AlertRecord {
            time,
            priority,
            page: TOTALITY_PAGE,
            sound,
        })
        .collect();
    records.sort_by_key(|r| r.time);
    records
}
