//! The match engine: a pure, deterministic scoring function between one job
//! listing and one candidate profile.
//!
//! This is deliberately the only scoring implementation in the system. The
//! page-load path (orchestrator) and the job-post trigger path (pipeline)
//! both call [`score_job`], so the two call sites cannot drift.

use chrono::Utc;
use std::collections::HashSet;

use crate::matching::normalize::{normalize_string, normalize_tokens, sector_or_none, to_numeric};
use crate::models::job::{JobRecord, Location};
use crate::models::matching::{MatchBreakdown, MatchResult};
use crate::models::profile::UserProfile;

pub const ROLES_PRIMARY_POINTS: u32 = 50;
pub const ROLES_RELATED_POINTS: u32 = 25;
pub const ROLES_AI_POINTS: u32 = 15;
pub const SKILL_POINTS: u32 = 6;
pub const AI_SKILL_POINTS: u32 = 3;
pub const SKILLS_MAX: u32 = 30;
pub const SECTOR_POINTS: u32 = 30;
pub const LOCATION_POINTS: u32 = 10;
pub const EXPERIENCE_POINTS: u32 = 5;
pub const SALARY_POINTS: u32 = 5;
pub const EMPLOYMENT_TYPE_POINTS: u32 = 5;

/// Cap on roles + skills + sector before the remaining factors are added.
/// Keeps the three soft categories from saturating the score on their own.
pub const ROLES_SKILLS_SECTOR_CAP: u32 = 80;

pub const MAX_SCORE: u32 = 100;

/// Scores one job against one profile. Total is always in [0, 100]; malformed
/// or missing fields contribute zero rather than erroring.
pub fn score_job(job: &JobRecord, profile: &UserProfile) -> MatchResult {
    let target_roles = normalize_tokens(&profile.target_roles);
    let user_skills = normalize_tokens(&profile.cv_skills);

    let roles = score_roles(job, &target_roles);
    let skills = score_skills(job, &user_skills);
    let sector = score_sector(job, profile);
    let location = score_location(job, profile);
    let experience = score_experience(job, profile);
    let salary = score_salary(job, profile);
    let employment_type = score_employment_type(job, profile);

    let rs_capped = (roles + skills + sector).min(ROLES_SKILLS_SECTOR_CAP);
    let total = rs_capped + location + experience + salary + employment_type;
    let score = total.min(MAX_SCORE);

    MatchResult {
        score,
        breakdown: MatchBreakdown {
            roles,
            skills,
            sector,
            location,
            experience,
            salary,
            employment_type,
            rs_capped,
            total,
        },
        computed_at: Utc::now(),
    }
}

/// Three role tiers of descending priority; only the highest matching tier
/// counts, tiers never stack. The primary `role` field may be a comma-joined
/// multi-role string, which `normalize_tokens` splits.
fn score_roles(job: &JobRecord, target_roles: &HashSet<String>) -> u32 {
    if target_roles.is_empty() {
        return 0;
    }
    let primary = normalize_tokens([job.role.as_str()]);
    if intersects(&primary, target_roles) {
        return ROLES_PRIMARY_POINTS;
    }
    let related = normalize_tokens(&job.related_roles);
    if intersects(&related, target_roles) {
        return ROLES_RELATED_POINTS;
    }
    let ai = normalize_tokens(&job.ai_enhanced_roles);
    if intersects(&ai, target_roles) {
        return ROLES_AI_POINTS;
    }
    0
}

/// Required-skill matches earn 6 points each; AI-inferred matches then fill
/// toward the 30-point ceiling at 3 points each, never past it and never
/// re-counting a skill already credited as required.
fn score_skills(job: &JobRecord, user_skills: &HashSet<String>) -> u32 {
    if user_skills.is_empty() {
        return 0;
    }
    let required = normalize_tokens(&job.skills_required);
    let matched_required = required.intersection(user_skills).count() as u32;
    let mut subtotal = matched_required * SKILL_POINTS;

    if subtotal < SKILLS_MAX {
        let ai_skills = normalize_tokens(&job.ai_enhanced_skills);
        let matched_ai = ai_skills
            .intersection(user_skills)
            .filter(|s| !required.contains(*s))
            .count() as u32;
        let gap_slots = (SKILLS_MAX - subtotal) / AI_SKILL_POINTS;
        subtotal += matched_ai.min(gap_slots) * AI_SKILL_POINTS;
    }

    subtotal.min(SKILLS_MAX)
}

/// Exact normalized match only; no partial credit. The "null" sentinel from
/// onboarding counts as no declared sector.
fn score_sector(job: &JobRecord, profile: &UserProfile) -> u32 {
    let user_sector = sector_or_none(profile.sector.as_deref());
    let job_sector = sector_or_none(job.sector.as_deref());
    match (user_sector, job_sector) {
        (Some(u), Some(j)) if u == j => SECTOR_POINTS,
        _ => 0,
    }
}

/// Flattens the job location into tokens (city, state, country, and the
/// literal "remote" when flagged) and intersects with preferred locations.
fn score_location(job: &JobRecord, profile: &UserProfile) -> u32 {
    let preferred = normalize_tokens(&profile.preferred_locations);
    if preferred.is_empty() {
        return 0;
    }
    let job_tokens = location_tokens(job.location.as_ref());
    if intersects(&job_tokens, &preferred) {
        LOCATION_POINTS
    } else {
        0
    }
}

fn location_tokens(location: Option<&Location>) -> HashSet<String> {
    let mut tokens = HashSet::new();
    match location {
        Some(Location::Structured {
            city,
            state,
            country,
            remote,
        }) => {
            for part in [city, state, country].into_iter().flatten() {
                let token = normalize_string(part);
                if !token.is_empty() {
                    tokens.insert(token);
                }
            }
            if *remote {
                tokens.insert("remote".to_string());
            }
        }
        Some(Location::Freeform(s)) => {
            tokens = normalize_tokens([s.as_str()]);
        }
        None => {}
    }
    tokens
}

fn score_experience(job: &JobRecord, profile: &UserProfile) -> u32 {
    let job_level = normalize_string(job.experience_level.as_deref().unwrap_or(""));
    let user_level = normalize_string(profile.experience_level.as_deref().unwrap_or(""));
    if !job_level.is_empty() && job_level == user_level {
        EXPERIENCE_POINTS
    } else {
        0
    }
}

/// One-sided by design: checks only that the job's ceiling can reach the
/// user's floor ("can this job possibly pay what I need"), never the job's
/// floor against the user's ceiling. Preserve exactly; a symmetric overlap
/// check would change ranking outcomes.
fn score_salary(job: &JobRecord, profile: &UserProfile) -> u32 {
    let job_max = job
        .salary_range
        .as_ref()
        .and_then(|r| r.max.as_ref())
        .and_then(to_numeric);
    match (job_max, profile.salary_min) {
        (Some(job_max), Some(user_min)) if job_max >= user_min => SALARY_POINTS,
        _ => 0,
    }
}

fn score_employment_type(job: &JobRecord, profile: &UserProfile) -> u32 {
    let job_type = normalize_string(job.employment_type.as_deref().unwrap_or(""));
    if job_type.is_empty() {
        return 0;
    }
    if job_type == "any" {
        return EMPLOYMENT_TYPE_POINTS;
    }
    let user_type = normalize_string(profile.job_type.as_deref().unwrap_or(""));
    if !user_type.is_empty() && job_type == user_type {
        EMPLOYMENT_TYPE_POINTS
    } else {
        0
    }
}

fn intersects(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    a.intersection(b).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::job::SalaryRange;

    fn make_job() -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            role: String::new(),
            related_roles: vec![],
            ai_enhanced_roles: vec![],
            skills_required: vec![],
            ai_enhanced_skills: vec![],
            location: None,
            experience_level: None,
            salary_range: None,
            employment_type: None,
            sector: None,
            application: None,
            posted_at: Utc::now(),
        }
    }

    fn make_profile() -> UserProfile {
        UserProfile {
            user_id: Uuid::new_v4(),
            target_roles: vec![],
            cv_skills: vec![],
            preferred_locations: vec![],
            experience_level: None,
            salary_min: None,
            salary_max: None,
            job_type: None,
            sector: None,
        }
    }

    #[test]
    fn test_empty_inputs_score_zero_without_panicking() {
        let result = score_job(&make_job(), &make_profile());
        assert_eq!(result.score, 0);
        assert_eq!(result.breakdown.total, 0);
    }

    #[test]
    fn test_deterministic_repeated_calls() {
        let mut job = make_job();
        job.role = "Backend Engineer".to_string();
        job.skills_required = vec!["Rust".to_string(), "SQL".to_string()];
        let mut profile = make_profile();
        profile.target_roles = vec!["backend engineer".to_string()];
        profile.cv_skills = vec!["rust".to_string()];

        let a = score_job(&job, &profile);
        let b = score_job(&job, &profile);
        assert_eq!(a.score, b.score);
        assert_eq!(a.breakdown, b.breakdown);
    }

    #[test]
    fn test_primary_role_match_is_50_and_does_not_stack() {
        let mut job = make_job();
        job.role = "Data Engineer".to_string();
        job.related_roles = vec!["Data Engineer".to_string()];
        job.ai_enhanced_roles = vec!["Data Engineer".to_string()];
        let mut profile = make_profile();
        profile.target_roles = vec!["data engineer".to_string()];

        let result = score_job(&job, &profile);
        assert_eq!(result.breakdown.roles, 50);
    }

    #[test]
    fn test_comma_joined_primary_role_splits() {
        let mut job = make_job();
        job.role = "DevOps Engineer, Site Reliability Engineer".to_string();
        let mut profile = make_profile();
        profile.target_roles = vec!["site reliability engineer".to_string()];

        assert_eq!(score_job(&job, &profile).breakdown.roles, 50);
    }

    #[test]
    fn test_related_and_ai_role_tiers() {
        let mut job = make_job();
        job.role = "Platform Engineer".to_string();
        job.related_roles = vec!["DevOps Engineer".to_string()];
        job.ai_enhanced_roles = vec!["Cloud Engineer".to_string()];

        let mut profile = make_profile();
        profile.target_roles = vec!["devops engineer".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.roles, 25);

        profile.target_roles = vec!["cloud engineer".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.roles, 15);

        profile.target_roles = vec!["product manager".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.roles, 0);
    }

    #[test]
    fn test_skills_tiering_worked_example() {
        // 2 required matches (12) + gap 18 → up to 6 AI slots, 3 available → +9
        let mut job = make_job();
        job.skills_required = vec!["a".into(), "b".into(), "c".into()];
        job.ai_enhanced_skills = vec!["d".into(), "e".into(), "f".into(), "g".into()];
        let mut profile = make_profile();
        profile.cv_skills = vec!["a".into(), "b".into(), "d".into(), "e".into(), "f".into()];

        assert_eq!(score_job(&job, &profile).breakdown.skills, 21);
    }

    #[test]
    fn test_skills_capped_at_30() {
        let mut job = make_job();
        job.skills_required = (0..8).map(|i| format!("skill{i}")).collect();
        let mut profile = make_profile();
        profile.cv_skills = (0..8).map(|i| format!("skill{i}")).collect();

        // 8 × 6 = 48, capped to 30
        assert_eq!(score_job(&job, &profile).breakdown.skills, 30);
    }

    #[test]
    fn test_ai_skills_never_push_past_30() {
        // subtotal 28 leaves a 2-point gap: no whole 3-point AI slot fits
        let mut job = make_job();
        job.skills_required = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        job.ai_enhanced_skills = vec!["x".into(), "y".into()];
        let mut profile = make_profile();
        profile.cv_skills = vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
            "x".into(),
            "y".into(),
        ];

        // 4 × 6 = 24, gap 6 → 2 AI slots, 2 available → 24 + 6 = 30
        assert_eq!(score_job(&job, &profile).breakdown.skills, 30);
    }

    #[test]
    fn test_ai_skill_not_double_counted_with_required() {
        let mut job = make_job();
        job.skills_required = vec!["rust".into()];
        job.ai_enhanced_skills = vec!["rust".into()];
        let mut profile = make_profile();
        profile.cv_skills = vec!["rust".into()];

        assert_eq!(score_job(&job, &profile).breakdown.skills, 6);
    }

    #[test]
    fn test_sector_exact_match_after_normalization() {
        let mut job = make_job();
        job.sector = Some("technology ".to_string());
        let mut profile = make_profile();
        profile.sector = Some("Technology".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.sector, 30);

        job.sector = Some("Tech".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.sector, 0);
    }

    #[test]
    fn test_sector_null_sentinel_scores_zero() {
        let mut job = make_job();
        job.sector = Some("null".to_string());
        let mut profile = make_profile();
        profile.sector = Some("null".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.sector, 0);
    }

    #[test]
    fn test_location_structured_and_remote_token() {
        let mut job = make_job();
        job.location = Some(Location::Structured {
            city: Some("Berlin".to_string()),
            state: None,
            country: Some("Germany".to_string()),
            remote: true,
        });
        let mut profile = make_profile();
        profile.preferred_locations = vec!["remote".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.location, 10);

        profile.preferred_locations = vec!["berlin".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.location, 10);

        profile.preferred_locations = vec!["paris".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.location, 0);
    }

    #[test]
    fn test_location_freeform_string() {
        let mut job = make_job();
        job.location = Some(Location::Freeform("London, United Kingdom".to_string()));
        let mut profile = make_profile();
        profile.preferred_locations = vec!["london".to_string()];
        assert_eq!(score_job(&job, &profile).breakdown.location, 10);
    }

    #[test]
    fn test_experience_exact_equality() {
        let mut job = make_job();
        job.experience_level = Some("Mid-Level".to_string());
        let mut profile = make_profile();
        profile.experience_level = Some("mid-level".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.experience, 5);

        profile.experience_level = Some("senior".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.experience, 0);
    }

    #[test]
    fn test_salary_one_sided_threshold() {
        let mut job = make_job();
        job.salary_range = Some(SalaryRange {
            min: None,
            max: Some(json!(500000)),
            period: None,
            currency: None,
        });
        let mut profile = make_profile();
        profile.salary_min = Some(600000.0);
        assert_eq!(score_job(&job, &profile).breakdown.salary, 0);

        if let Some(range) = job.salary_range.as_mut() {
            range.max = Some(json!(700000));
        }
        assert_eq!(score_job(&job, &profile).breakdown.salary, 5);

        profile.salary_min = None;
        assert_eq!(score_job(&job, &profile).breakdown.salary, 0);
    }

    #[test]
    fn test_salary_max_as_formatted_string() {
        let mut job = make_job();
        job.salary_range = Some(SalaryRange {
            min: None,
            max: Some(json!("70,000")),
            period: Some("year".to_string()),
            currency: Some("GBP".to_string()),
        });
        let mut profile = make_profile();
        profile.salary_min = Some(65000.0);
        assert_eq!(score_job(&job, &profile).breakdown.salary, 5);
    }

    #[test]
    fn test_employment_type_any_matches_everyone() {
        let mut job = make_job();
        job.employment_type = Some("Any".to_string());
        let profile = make_profile();
        assert_eq!(score_job(&job, &profile).breakdown.employment_type, 5);
    }

    #[test]
    fn test_employment_type_exact_match() {
        let mut job = make_job();
        job.employment_type = Some("Full-Time".to_string());
        let mut profile = make_profile();
        profile.job_type = Some("full-time".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.employment_type, 5);

        profile.job_type = Some("contract".to_string());
        assert_eq!(score_job(&job, &profile).breakdown.employment_type, 0);
    }

    #[test]
    fn test_roles_skills_sector_capped_at_80() {
        // roles 50 + skills 30 + sector 30 = 110 → rs_capped must be 80
        let mut job = make_job();
        job.role = "Engineer".to_string();
        job.skills_required = (0..5).map(|i| format!("s{i}")).collect();
        job.sector = Some("Technology".to_string());
        let mut profile = make_profile();
        profile.target_roles = vec!["engineer".to_string()];
        profile.cv_skills = (0..5).map(|i| format!("s{i}")).collect();
        profile.sector = Some("Technology".to_string());

        let result = score_job(&job, &profile);
        assert_eq!(result.breakdown.roles, 50);
        assert_eq!(result.breakdown.skills, 30);
        assert_eq!(result.breakdown.sector, 30);
        assert_eq!(result.breakdown.rs_capped, 80);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_full_match_reaches_exactly_100() {
        let mut job = make_job();
        job.role = "Engineer".to_string();
        job.skills_required = (0..5).map(|i| format!("s{i}")).collect();
        job.sector = Some("Technology".to_string());
        job.location = Some(Location::Structured {
            city: None,
            state: None,
            country: None,
            remote: true,
        });
        job.experience_level = Some("senior".to_string());
        job.salary_range = Some(SalaryRange {
            min: None,
            max: Some(json!(200000)),
            period: None,
            currency: None,
        });
        job.employment_type = Some("any".to_string());

        let mut profile = make_profile();
        profile.target_roles = vec!["engineer".to_string()];
        profile.cv_skills = (0..5).map(|i| format!("s{i}")).collect();
        profile.sector = Some("Technology".to_string());
        profile.preferred_locations = vec!["Remote".to_string()];
        profile.experience_level = Some("Senior".to_string());
        profile.salary_min = Some(100000.0);

        let result = score_job(&job, &profile);
        assert_eq!(result.breakdown.rs_capped, 80);
        assert_eq!(result.breakdown.total, 100);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_score_never_exceeds_100() {
        // breakdown.total already includes the rs cap, so 100 is the ceiling
        let mut job = make_job();
        job.role = "A, B, C".to_string();
        job.skills_required = (0..20).map(|i| format!("s{i}")).collect();
        job.ai_enhanced_skills = (0..20).map(|i| format!("a{i}")).collect();
        job.sector = Some("x".to_string());
        job.employment_type = Some("any".to_string());
        let mut profile = make_profile();
        profile.target_roles = vec!["a".to_string()];
        profile.cv_skills = (0..20)
            .map(|i| format!("s{i}"))
            .chain((0..20).map(|i| format!("a{i}")))
            .collect();
        profile.sector = Some("x".to_string());

        let result = score_job(&job, &profile);
        assert!(result.score <= 100, "score was {}", result.score);
    }
}
