//! Structural validation for lineups.
//!
//! Checks the integrity of members, groups and jobs before (or after)
//! scheduling. Detects:
//! - Duplicate IDs
//! - References to members or groups that do not exist
//! - Inverted bounds (minimum above maximum)
//! - Members listed twice in one sequence
//! - Members that are both candidates and accepted, or accepted twice
//! - Members accepted into the set that does not match their manager flag
//! - One-sided group memberships

use crate::models::{Job, Lineup, MemberId, Role};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A group or job references a member that doesn't exist.
    UnknownMember,
    /// A member references a group that doesn't exist.
    UnknownGroup,
    /// A job's minimum exceeds its maximum.
    InvertedBounds,
    /// A member appears twice in the same sequence.
    DuplicateEntry,
    /// A member is in more than one of a job's pool/subscribers/managers.
    OverlappingSets,
    /// A member sits in the accepted set that doesn't match its flag.
    MisroutedMember,
    /// Group and member disagree about a membership.
    AsymmetricMembership,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a lineup.
///
/// Checks:
/// 1. No duplicate member, group or job IDs
/// 2. Every group member exists and lists the group back
/// 3. Every group a member lists exists and lists the member
/// 4. Job bounds are not inverted
/// 5. Job sequences reference existing members, once each
/// 6. Pool, subscribers and managers are pairwise disjoint
/// 7. Subscribers are non-managers and managers are managers
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_lineup(lineup: &Lineup) -> ValidationResult {
    let mut errors = Vec::new();

    let mut member_ids = HashSet::new();
    for m in lineup.members() {
        if !member_ids.insert(m.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate member ID: {}", m.id()),
            ));
        }
    }

    let mut group_ids = HashSet::new();
    for g in lineup.groups() {
        if !group_ids.insert(g.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate group ID: {}", g.id()),
            ));
        }
    }

    let mut job_ids = HashSet::new();
    for j in lineup.jobs() {
        if !job_ids.insert(j.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", j.id()),
            ));
        }
    }

    // Group side of the membership relation
    for g in lineup.groups() {
        check_unique(g.members(), &format!("group '{}'", g.id()), &mut errors);
        for &id in g.members() {
            match lineup.member(id) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownMember,
                    format!("Group '{}' references unknown member '{}'", g.id(), id),
                )),
                Some(m) if !m.groups().contains(&g.id()) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AsymmetricMembership,
                        format!("Member '{}' does not list group '{}'", id, g.id()),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    // Member side of the membership relation
    for m in lineup.members() {
        for &gid in m.groups() {
            match lineup.group(gid) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownGroup,
                    format!("Member '{}' references unknown group '{}'", m.id(), gid),
                )),
                Some(g) if !g.contains(m.id()) => errors.push(ValidationError::new(
                    ValidationErrorKind::AsymmetricMembership,
                    format!("Group '{}' does not list member '{}'", gid, m.id()),
                )),
                Some(_) => {}
            }
        }
    }

    for job in lineup.jobs() {
        check_job(lineup, job, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_job(lineup: &Lineup, job: &Job, errors: &mut Vec<ValidationError>) {
    for role in [Role::Subscriber, Role::Manager] {
        if job.minimum(role) > job.maximum(role) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedBounds,
                format!(
                    "Job '{}' has {:?} minimum {} above maximum {}",
                    job.id(),
                    role,
                    job.minimum(role),
                    job.maximum(role)
                ),
            ));
        }
    }

    let sequences = [
        ("candidates", job.possible_subscribers()),
        ("subscribers", job.subscribers()),
        ("managers", job.managers()),
    ];

    let mut seen: HashSet<MemberId> = HashSet::new();
    for (label, ids) in sequences {
        check_unique(ids, &format!("job '{}' {label}", job.id()), errors);
        let mut listed: HashSet<MemberId> = HashSet::new();
        for &id in ids {
            if !listed.insert(id) {
                continue;
            }
            if lineup.member(id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownMember,
                    format!("Job '{}' {label} reference unknown member '{}'", job.id(), id),
                ));
            }
            if !seen.insert(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingSets,
                    format!("Member '{}' appears in more than one set of job '{}'", id, job.id()),
                ));
            }
        }
    }

    for role in [Role::Subscriber, Role::Manager] {
        for &id in job.accepted(role) {
            if let Some(m) = lineup.member(id) {
                if Role::of(m) != role {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MisroutedMember,
                        format!("Member '{}' is accepted as {:?} in job '{}'", id, role, job.id()),
                    ));
                }
            }
        }
    }
}

fn check_unique(ids: &[MemberId], context: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateEntry,
                format!("Member '{id}' listed twice in {context}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, GroupId, Job, JobId, Member};
    use chrono::{TimeZone, Utc};

    fn sample_lineup() -> Lineup {
        let mut l = Lineup::new();
        let a = l.create_member("Ann", "Lee", false);
        let b = l.create_member("Bob", "Ray", true);
        let g = l.create_group("G");
        l.add_to_group(g, a).unwrap();
        l.add_to_group(g, b).unwrap();
        let j = l.create_job(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), "J");
        {
            let job = l.job_mut(j).unwrap();
            job.set_max_subscriber_count(2);
            job.set_max_manager_count(1);
        }
        l.offer(j, a).unwrap();
        l.subscribe(j, b).unwrap();
        l
    }

    fn has(lineup: &Lineup, kind: ValidationErrorKind) -> bool {
        validate_lineup(lineup)
            .unwrap_err()
            .iter()
            .any(|e| e.kind == kind)
    }

    #[test]
    fn test_valid_lineup() {
        assert!(validate_lineup(&sample_lineup()).is_ok());
        assert!(validate_lineup(&Lineup::new()).is_ok());
    }

    #[test]
    fn test_inverted_bounds() {
        let mut l = sample_lineup();
        l.job_mut(JobId(0)).unwrap().set_min_manager_count(3);
        assert!(has(&l, ValidationErrorKind::InvertedBounds));
    }

    #[test]
    fn test_unknown_member_in_pool() {
        let mut l = sample_lineup();
        let ghost = Member::new(MemberId(40), "ghost", "x");
        let job = Job::new(JobId(9)).with_candidates([&ghost]);
        l.insert_job(job).unwrap();
        assert!(has(&l, ValidationErrorKind::UnknownMember));
    }

    #[test]
    fn test_unknown_group_reference() {
        let mut l = sample_lineup();
        let mut m = Member::new(MemberId(7), "a", "b");
        Group::new(GroupId(30)).add_member(&mut m);
        l.insert_member(m).unwrap();
        assert!(has(&l, ValidationErrorKind::UnknownGroup));
    }

    #[test]
    fn test_asymmetric_membership() {
        let mut l = sample_lineup();
        // A group record that claims a member which never joined it.
        let mut stranger = Member::new(MemberId(0), "Ann", "Lee");
        let mut group = Group::new(GroupId(5));
        group.add_member(&mut stranger);
        l.insert_group(group).unwrap();
        assert!(has(&l, ValidationErrorKind::AsymmetricMembership));
    }

    #[test]
    fn test_misrouted_member() {
        let mut l = sample_lineup();
        // Flip the flag of an accepted manager behind the job's back.
        l.set_member_manager(MemberId(1), false).unwrap();
        assert!(has(&l, ValidationErrorKind::MisroutedMember));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut l = sample_lineup();
        l.insert_job(Job::new(JobId(4))).unwrap();
        assert!(validate_lineup(&l).is_ok());

        // Lineup refuses duplicates itself; build one through serde instead.
        let mut json: serde_json::Value = serde_json::to_value(&l).unwrap();
        let first = json["jobs"][0].clone();
        json["jobs"].as_array_mut().unwrap().push(first);
        let dup: Lineup = serde_json::from_value(json).unwrap();

        let errors = validate_lineup(&dup).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("job")));
    }

    #[test]
    fn test_overlapping_sets() {
        let l = sample_lineup();
        let mut json: serde_json::Value = serde_json::to_value(&l).unwrap();
        // Put the accepted manager back into the pool as well.
        json["jobs"][0]["possible_subscribers"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!(1));
        let broken: Lineup = serde_json::from_value(json).unwrap();

        assert!(has(&broken, ValidationErrorKind::OverlappingSets));
    }

    #[test]
    fn test_job_errors_follow_sequence_order() {
        let l = sample_lineup();
        let mut json: serde_json::Value = serde_json::to_value(&l).unwrap();
        let pool = json["jobs"][0]["possible_subscribers"].as_array_mut().unwrap();
        for id in [90, 1, 91, 92, 91] {
            pool.push(serde_json::json!(id));
        }
        let broken: Lineup = serde_json::from_value(json).unwrap();

        for _ in 0..5 {
            let messages: Vec<String> = validate_lineup(&broken)
                .unwrap_err()
                .into_iter()
                .filter(|e| {
                    matches!(
                        e.kind,
                        ValidationErrorKind::UnknownMember | ValidationErrorKind::OverlappingSets
                    )
                })
                .map(|e| e.message)
                .collect();
            assert_eq!(
                messages,
                vec![
                    "Job 'J0' candidates reference unknown member 'M90'",
                    "Job 'J0' candidates reference unknown member 'M91'",
                    "Job 'J0' candidates reference unknown member 'M92'",
                    "Member 'M1' appears in more than one set of job 'J0'",
                ]
            );
        }
    }

    #[test]
    fn test_multiple_errors() {
        let mut l = sample_lineup();
        l.job_mut(JobId(0)).unwrap().set_min_subscriber_count(5);
        l.set_member_manager(MemberId(1), false).unwrap();

        let errors = validate_lineup(&l).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
