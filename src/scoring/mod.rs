// src/scoring/mod.rs
//! Résumé ↔ posting match scoring.
//!
//! The score is a weighted sum of keyword overlap, role fit, experience fit
//! and education fit, plus a bonus for the target role category. Weights live
//! in [`ScoringPolicy`]. Scoring is pure: same inputs, same `JobMatch`.

pub mod policy;
pub mod role;

use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use crate::keywords::{split_words, KeywordExtractor, PostingContext};
use crate::types::{JobMatch, JobPosting, Recommendation, ResumeData};

pub use policy::{HotReloadPolicy, ScoringPolicy, TargetRole};

/// Matched/missing lists exposed on a `JobMatch` are capped at this length.
pub const SKILL_LIST_CAP: usize = 15;
const REASON_LIST_CAP: usize = 5;
const MISSING_DETAIL_MAX: usize = 10;

fn years_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)").expect("years regex"))
}

/// Keyword overlap between one posting and one résumé.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordOverlap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub total: usize,
}

impl KeywordOverlap {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched.len() as f64 / self.total as f64
        }
    }
}

/// Exact, substring (either way), or word-level containment.
pub fn keywords_match(job_kw: &str, resume_kw: &str) -> bool {
    if job_kw == resume_kw || job_kw.contains(resume_kw) || resume_kw.contains(job_kw) {
        return true;
    }
    split_words(resume_kw).any(|rw| {
        split_words(job_kw).any(|jw| rw == jw || rw.contains(jw) || jw.contains(rw))
    })
}

/// Classify each job keyword as matched or missing against the résumé set.
pub fn keyword_overlap(job_keywords: &[String], resume_keywords: &[String]) -> KeywordOverlap {
    let mut out = KeywordOverlap {
        total: job_keywords.len(),
        ..Default::default()
    };
    for jk in job_keywords {
        if resume_keywords.iter().any(|rk| keywords_match(jk, rk)) {
            out.matched.push(jk.clone());
        } else {
            out.missing.push(jk.clone());
        }
    }
    out
}

/// 0.5 with no stated requirement, 0.3 with no résumé years, else tiered.
pub fn experience_match(resume: &ResumeData, job: &JobPosting) -> f64 {
    let Some(required) = first_years(&job.description) else {
        return 0.5;
    };
    let Some(have) = first_years(&resume.experience.join(" ")) else {
        return 0.3;
    };
    let (have, required) = (have as f64, required as f64);
    if have >= required {
        1.0
    } else if have >= required * 0.8 {
        0.8
    } else if have >= required * 0.6 {
        0.6
    } else {
        0.3
    }
}

fn first_years(text: &str) -> Option<u32> {
    years_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 1.0 when the job states no education need or the résumé lists some.
pub fn education_match(resume: &ResumeData, job: &JobPosting, education_terms: &[String]) -> f64 {
    let desc = job.description.to_lowercase();
    if !education_terms.iter().any(|t| desc.contains(t.as_str())) {
        return 1.0;
    }
    if resume.education.is_empty() {
        0.5
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct MatchScorer {
    extractor: KeywordExtractor,
    policy: Arc<ScoringPolicy>,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(KeywordExtractor::default(), Arc::new(ScoringPolicy::default()))
    }
}

impl MatchScorer {
    pub fn new(extractor: KeywordExtractor, policy: Arc<ScoringPolicy>) -> Self {
        Self { extractor, policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Job keywords drawn from description, requirements and title.
    pub fn job_keywords(&self, job: &JobPosting) -> Vec<String> {
        let text = format!(
            "{} {} {}",
            job.description,
            job.requirements.join(" "),
            job.title
        );
        let ctx = PostingContext {
            title: &job.title,
            company: &job.company,
        };
        self.extractor
            .prioritize(self.extractor.extract(&text, Some(ctx)))
    }

    pub fn resume_keywords(&self, resume: &ResumeData) -> Vec<String> {
        self.extractor
            .prioritize(self.extractor.extract(&resume.text, None))
    }

    pub fn score<'a>(&self, resume: &ResumeData, job: &'a JobPosting) -> JobMatch<'a> {
        let resume_keywords = self.resume_keywords(resume);
        self.score_with_keywords(resume, &resume_keywords, job)
    }

    /// Score every posting and sort by score, descending. Ties keep input order.
    pub fn score_all<'a>(&self, resume: &ResumeData, jobs: &'a [JobPosting]) -> Vec<JobMatch<'a>> {
        let resume_keywords = self.resume_keywords(resume);
        let mut out: Vec<JobMatch<'a>> = jobs
            .iter()
            .map(|j| self.score_with_keywords(resume, &resume_keywords, j))
            .collect();
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out
    }

    fn score_with_keywords<'a>(
        &self,
        resume: &ResumeData,
        resume_keywords: &[String],
        job: &'a JobPosting,
    ) -> JobMatch<'a> {
        let p = &*self.policy;
        let vocab = self.extractor.vocabulary();

        let job_keywords = self.job_keywords(job);
        let overlap = keyword_overlap(&job_keywords, resume_keywords);
        let ratio = overlap.ratio();
        let n_matched = overlap.matched.len();

        let role = role::role_match(resume, job, &vocab.role_categories);
        let experience = experience_match(resume, job);
        let education = education_match(resume, job, &vocab.education_terms);

        let title_lower = job.title.to_lowercase();
        let desc_lower = job.description.to_lowercase();
        let in_category = p.target_role.matches(&title_lower, &desc_lower);

        let mut raw = ratio * p.keyword_ratio_points
            + (p.per_match_points * n_matched as f64).min(p.match_points_cap)
            + role * p.role_points
            + experience * p.experience_points
            + education * p.education_points;
        if n_matched >= p.multi_match_min {
            raw += p.multi_match_bonus;
        }
        if in_category {
            raw += p.category_bonus;
        }
        let score = raw.round().clamp(0.0, 100.0) as u8;

        let recommendation =
            if score >= p.apply_threshold || (in_category && n_matched >= p.category_min_matches) {
                Recommendation::Apply
            } else {
                Recommendation::Skip
            };

        let reasons = build_reasons(&overlap, role, experience);

        JobMatch {
            job,
            score,
            recommendation,
            reasons,
            matched_skills: overlap.matched.into_iter().take(SKILL_LIST_CAP).collect(),
            missing_skills: overlap.missing.into_iter().take(SKILL_LIST_CAP).collect(),
        }
    }
}

fn preview(items: &[String]) -> String {
    let head = items
        .iter()
        .take(REASON_LIST_CAP)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > REASON_LIST_CAP {
        format!("{head}...")
    } else {
        head
    }
}

fn build_reasons(overlap: &KeywordOverlap, role: f64, experience: f64) -> Vec<String> {
    let mut reasons = Vec::new();
    let (m, t) = (overlap.matched.len(), overlap.total);
    let ratio = overlap.ratio();

    reasons.push(if ratio >= 0.8 {
        format!("Excellent keyword match: {m} out of {t} required keywords found")
    } else if ratio >= 0.6 {
        format!("Good keyword match: {m} out of {t} required keywords found")
    } else if ratio >= 0.4 {
        format!("Moderate keyword match: {m} out of {t} required keywords found")
    } else {
        format!("Limited keyword match: Only {m} out of {t} required keywords found")
    });

    if !overlap.matched.is_empty() {
        reasons.push(format!("Matched keywords: {}", preview(&overlap.matched)));
    }

    let n_missing = overlap.missing.len();
    if (1..=MISSING_DETAIL_MAX).contains(&n_missing) {
        reasons.push(format!(
            "Missing important keywords: {}",
            preview(&overlap.missing)
        ));
    } else if n_missing > MISSING_DETAIL_MAX {
        reasons.push(format!(
            "Missing many required keywords ({n_missing} total)"
        ));
    }

    if role >= 0.8 {
        reasons.push("Job role closely matches your background".to_string());
    } else if role < 0.3 {
        reasons.push("Job role may not match your background".to_string());
    }

    if experience > 0.8 {
        reasons.push("Experience level matches job requirements".to_string());
    }

    reasons
}
