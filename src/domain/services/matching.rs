//! Volunteer/event matching.
//!
//! Everything here is a pure function over snapshots handed in by the caller:
//! no I/O, no clock. Callers pass `today` explicitly.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use crate::domain::models::{
    assignment::Assignment,
    event::{EventRecord, Urgency},
    profile::VolunteerProfile,
    reference::SkillId,
};

/// Filter criteria a volunteer applies to the event list. Empty fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchQuery {
    pub dates: BTreeSet<NaiveDate>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub urgency: Option<Urgency>,
    pub skills: BTreeSet<SkillId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// High before Medium before Low, then soonest first.
    Urgency,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyDecision {
    Allowed,
    AlreadyApplied,
    EventClosed,
}

/// Events a volunteer may see for `query`, in input order.
///
/// `known_skills` is the full skill catalogue: selecting every known skill is the
/// same as selecting none, so the skill predicate only applies while at least one
/// known skill is left out. Ids outside the catalogue never count towards that.
pub fn visible_events<'a>(
    events: &'a [EventRecord],
    query: &MatchQuery,
    today: NaiveDate,
    known_skills: &BTreeSet<SkillId>,
) -> Vec<&'a EventRecord> {
    let filter_skills = !query.skills.is_empty() && !known_skills.is_subset(&query.skills);

    events
        .iter()
        .filter(|e| e.is_upcoming(today))
        .filter(|e| query.dates.is_empty() || query.dates.contains(&e.date))
        .filter(|e| match non_empty(&query.city) {
            Some(city) => e.location.city.trim().to_lowercase() == city.to_lowercase(),
            None => true,
        })
        .filter(|e| match non_empty(&query.state) {
            Some(state) => e.location.state == state,
            None => true,
        })
        .filter(|e| match non_empty(&query.zipcode) {
            Some(zip) => e.location.zipcode == zip,
            None => true,
        })
        .filter(|e| query.urgency.is_none_or(|u| e.urgency == u))
        .filter(|e| !filter_skills || e.required_skills.iter().any(|s| query.skills.contains(s)))
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn sort_events(events: &mut [&EventRecord], order: SortOrder) {
    match order {
        SortOrder::Urgency => events.sort_by(|a, b| {
            a.urgency.rank().cmp(&b.urgency.rank())
                .then(a.date.cmp(&b.date))
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortOrder::Date => events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id))),
    }
}

/// Whether `volunteer_id` may apply to `event`. Skills and availability are not checked.
pub fn can_apply(
    volunteer_id: &str,
    event: &EventRecord,
    existing: &[Assignment],
    today: NaiveDate,
) -> ApplyDecision {
    let applied = existing.iter().any(|a| {
        a.event_id == event.id && a.volunteer_id == volunteer_id && a.status.is_active()
    });

    if applied {
        ApplyDecision::AlreadyApplied
    } else if event.is_past(today) {
        ApplyDecision::EventClosed
    } else {
        ApplyDecision::Allowed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedVolunteer<'a> {
    pub volunteer: &'a VolunteerProfile,
    pub available: bool,
    pub matched_skills: usize,
    pub fully_qualified: bool,
}

/// Volunteers ordered by fit for `event`: available on the date first, then by
/// how many required skills they hold. Ties fall back to name, then id.
pub fn rank_volunteers<'a>(event: &EventRecord, volunteers: &'a [VolunteerProfile]) -> Vec<RankedVolunteer<'a>> {
    let mut ranked: Vec<RankedVolunteer<'a>> = volunteers
        .iter()
        .map(|v| {
            let available = v.is_available_on(event.date);
            let matched_skills = event.required_skills.iter().filter(|s| v.has_skill(**s)).count();
            RankedVolunteer {
                volunteer: v,
                available,
                matched_skills,
                fully_qualified: available && matched_skills == event.required_skills.len(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.available.cmp(&a.available)
            .then(b.matched_skills.cmp(&a.matched_skills))
            .then_with(|| cmp_names(a.volunteer, b.volunteer))
    });
    ranked
}

fn cmp_names(a: &VolunteerProfile, b: &VolunteerProfile) -> Ordering {
    a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{assignment::AssignmentStatus, event::Location};
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(id: &str, day: &str, city: &str, urgency: Urgency, skills: &[SkillId]) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            name: format!("Event {}", id),
            description: ".".to_string(),
            location: Location { city: city.to_string(), state: "TX".to_string(), zipcode: "77001".to_string() },
            required_skills: skills.iter().copied().collect(),
            urgency,
            date: date(day),
            created_at: Utc::now(),
        }
    }

    fn volunteer(id: &str, name: &str, skills: &[SkillId], days: &[&str]) -> VolunteerProfile {
        VolunteerProfile {
            id: id.to_string(),
            full_name: name.to_string(),
            address1: "1 Main St".to_string(),
            address2: None,
            city: "Houston".to_string(),
            state: "TX".to_string(),
            zipcode: "77001".to_string(),
            preferences: None,
            skills: skills.iter().copied().collect(),
            availability: days.iter().map(|d| date(d)).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalogue() -> BTreeSet<SkillId> {
        (1..=6).collect()
    }

    fn ids(events: &[&EventRecord]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn past_event_is_never_visible() {
        let events = vec![event("1", "2025-01-01", "Houston", Urgency::High, &[1])];
        let visible = visible_events(&events, &MatchQuery::default(), date("2025-06-01"), &catalogue());
        assert!(visible.is_empty());

        let query = MatchQuery { dates: [date("2025-01-01")].into(), ..Default::default() };
        assert!(visible_events(&events, &query, date("2025-06-01"), &catalogue()).is_empty());
    }

    #[test]
    fn event_today_is_visible() {
        let events = vec![event("1", "2025-06-01", "Houston", Urgency::Low, &[1])];
        let visible = visible_events(&events, &MatchQuery::default(), date("2025-06-01"), &catalogue());
        assert_eq!(ids(&visible), vec!["1"]);
    }

    #[test]
    fn city_match_ignores_case() {
        let events = vec![
            event("2", "2025-07-10", "Austin", Urgency::Medium, &[2]),
            event("3", "2025-07-10", "Houston", Urgency::Medium, &[2]),
        ];
        let query = MatchQuery { city: Some("austin".to_string()), ..Default::default() };
        let visible = visible_events(&events, &query, date("2025-06-01"), &catalogue());
        assert_eq!(ids(&visible), vec!["2"]);
    }

    #[test]
    fn city_match_folds_non_ascii_case() {
        let events = vec![event("4", "2025-07-10", "SAN JOSÉ", Urgency::Low, &[1])];
        let query = MatchQuery { city: Some("san josé".to_string()), ..Default::default() };
        let visible = visible_events(&events, &query, date("2025-06-01"), &catalogue());
        assert_eq!(ids(&visible), vec!["4"]);
    }

    #[test]
    fn skills_use_or_semantics() {
        let events = vec![event("1", "2025-07-10", "Austin", Urgency::High, &[1, 2])];
        let today = date("2025-06-01");

        let one = MatchQuery { skills: [1].into(), ..Default::default() };
        assert_eq!(visible_events(&events, &one, today, &catalogue()).len(), 1);

        let other = MatchQuery { skills: [3].into(), ..Default::default() };
        assert!(visible_events(&events, &other, today, &catalogue()).is_empty());
    }

    #[test]
    fn selecting_every_skill_disables_the_skill_filter() {
        let events = vec![event("1", "2025-07-10", "Austin", Urgency::High, &[5])];
        let query = MatchQuery { skills: [1, 2].into(), ..Default::default() };
        assert_eq!(visible_events(&events, &query, date("2025-06-01"), &[1, 2].into()).len(), 1);
        assert!(visible_events(&events, &query, date("2025-06-01"), &[1, 2, 3].into()).is_empty());
    }

    #[test]
    fn unknown_skill_ids_do_not_count_as_selected() {
        let events = vec![event("1", "2025-07-10", "Austin", Urgency::High, &[6])];
        let query = MatchQuery { skills: [1, 2, 3, 4, 5, 99].into(), ..Default::default() };
        assert!(visible_events(&events, &query, date("2025-06-01"), &catalogue()).is_empty());

        let every = MatchQuery { skills: [1, 2, 3, 4, 5, 6, 99].into(), ..Default::default() };
        assert_eq!(visible_events(&events, &every, date("2025-06-01"), &catalogue()).len(), 1);
    }

    #[test]
    fn all_predicates_combine() {
        let events = vec![
            event("1", "2025-07-10", "Austin", Urgency::High, &[1]),
            event("2", "2025-07-11", "Austin", Urgency::High, &[1]),
            event("3", "2025-07-10", "Austin", Urgency::Low, &[1]),
        ];
        let query = MatchQuery {
            dates: [date("2025-07-10")].into(),
            city: Some("AUSTIN".to_string()),
            state: Some("TX".to_string()),
            zipcode: Some("77001".to_string()),
            urgency: Some(Urgency::High),
            skills: [1].into(),
        };
        let visible = visible_events(&events, &query, date("2025-06-01"), &catalogue());
        assert_eq!(ids(&visible), vec!["1"]);

        let wrong_zip = MatchQuery { zipcode: Some("73301".to_string()), ..query };
        assert!(visible_events(&events, &wrong_zip, date("2025-06-01"), &catalogue()).is_empty());
    }

    #[test]
    fn filtering_is_repeatable() {
        let events = vec![
            event("1", "2025-07-10", "Austin", Urgency::High, &[1]),
            event("2", "2025-05-10", "Austin", Urgency::High, &[1]),
            event("3", "2025-08-10", "Dallas", Urgency::Low, &[2]),
        ];
        let query = MatchQuery { skills: [1, 2].into(), ..Default::default() };
        let today = date("2025-06-01");
        let first = ids(&visible_events(&events, &query, today, &catalogue()));
        let second = ids(&visible_events(&events, &query, today, &catalogue()));
        assert_eq!(first, second);
        assert_eq!(first, vec!["1", "3"]);
    }

    #[test]
    fn urgency_sort_ranks_high_first_then_date() {
        let events = vec![
            event("a", "2025-07-01", "X", Urgency::Low, &[]),
            event("b", "2025-07-03", "X", Urgency::High, &[]),
            event("c", "2025-07-02", "X", Urgency::Medium, &[]),
            event("d", "2025-07-01", "X", Urgency::High, &[]),
        ];
        let mut visible = visible_events(&events, &MatchQuery::default(), date("2025-06-01"), &catalogue());
        sort_events(&mut visible, SortOrder::Urgency);
        assert_eq!(ids(&visible), vec!["d", "b", "c", "a"]);

        sort_events(&mut visible, SortOrder::Date);
        assert_eq!(ids(&visible), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn can_apply_detects_duplicates_and_closed_events() {
        let today = date("2025-06-01");
        let open = event("5", "2025-07-10", "Austin", Urgency::High, &[1]);
        let closed = event("6", "2025-05-10", "Austin", Urgency::High, &[1]);

        assert_eq!(can_apply("v1", &open, &[], today), ApplyDecision::Allowed);
        assert_eq!(can_apply("v1", &closed, &[], today), ApplyDecision::EventClosed);

        let mut existing = Assignment::new("5".to_string(), "v1".to_string());
        assert_eq!(can_apply("v1", &open, &[existing.clone()], today), ApplyDecision::AlreadyApplied);
        assert_eq!(can_apply("v2", &open, &[existing.clone()], today), ApplyDecision::Allowed);

        existing.status = AssignmentStatus::Registered;
        assert_eq!(can_apply("v1", &open, &[existing], today), ApplyDecision::AlreadyApplied);
    }

    #[test]
    fn ranking_prefers_availability_then_skill_overlap() {
        let ev = event("1", "2025-07-10", "Houston", Urgency::High, &[1, 2]);
        let volunteers = vec![
            volunteer("v1", "Carol", &[1, 2], &["2025-07-11"]),
            volunteer("v2", "Bob", &[1], &["2025-07-10"]),
            volunteer("v3", "Alice", &[1, 2], &["2025-07-10"]),
            volunteer("v4", "Dave", &[], &["2025-07-10"]),
            volunteer("v5", "aaron", &[1], &["2025-07-10"]),
        ];

        let ranked = rank_volunteers(&ev, &volunteers);
        let order: Vec<&str> = ranked.iter().map(|r| r.volunteer.id.as_str()).collect();
        assert_eq!(order, vec!["v3", "v5", "v2", "v4", "v1"]);

        assert!(ranked[0].fully_qualified);
        assert!(!ranked[1].fully_qualified);
        assert!(!ranked[4].fully_qualified);
        assert_eq!(ranked[4].matched_skills, 2);
    }
}
