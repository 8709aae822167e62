//! Role fit between a résumé and a posting, 0.0..=1.0.
//!
//! Layered fallback: declared résumé title, then résumé domain keywords,
//! then overlap of significant job-title words with the résumé text.

use crate::types::{JobPosting, ResumeData};
use crate::vocabulary::RoleCategory;

/// Job-title words must be longer than this to count in the last fallback.
const SIGNIFICANT_WORD_CHARS: usize = 3;
const PARTIAL_OVERLAP_SCORE: f64 = 0.4;

pub fn role_match(resume: &ResumeData, job: &JobPosting, categories: &[RoleCategory]) -> f64 {
    let job_title = job.title.to_lowercase();
    let job_desc = job.description.to_lowercase();

    if let Some(title) = resume.job_title.as_deref().filter(|t| !t.trim().is_empty()) {
        let resume_title = title.trim().to_lowercase();

        let first_word = job_title.split_whitespace().next().unwrap_or("");
        if job_title.contains(&resume_title)
            || (!first_word.is_empty() && resume_title.contains(first_word))
        {
            return 1.0;
        }

        for cat in categories {
            if !resume_title.contains(cat.name.as_str()) {
                continue;
            }
            let count = cat
                .synonyms
                .iter()
                .filter(|s| job_title.contains(s.as_str()) || job_desc.contains(s.as_str()))
                .count();
            if count > 0 {
                return (0.6 + 0.2 * count as f64).min(1.0);
            }
        }
    }

    if !resume.job_keywords.is_empty() {
        let job_text = format!("{job_title} {job_desc}");
        let count = resume
            .job_keywords
            .iter()
            .filter(|k| job_text.contains(&k.to_lowercase()))
            .count();
        if count > 0 {
            return (0.5 + 0.2 * count as f64).min(1.0);
        }
    }

    let resume_text = resume.text.to_lowercase();
    let words: Vec<&str> = job_title
        .split_whitespace()
        .filter(|w| w.chars().count() > SIGNIFICANT_WORD_CHARS)
        .collect();
    // A title with no significant words trivially meets the half-overlap bar.
    let hits = words.iter().filter(|w| resume_text.contains(**w)).count();
    if hits as f64 >= words.len() as f64 * 0.5 {
        PARTIAL_OVERLAP_SCORE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn job(title: &str, desc: &str) -> JobPosting {
        JobPosting {
            id: "j".into(),
            title: title.into(),
            company: "Co".into(),
            location: String::new(),
            description: desc.into(),
            requirements: vec![],
            posted_date: chrono::Utc::now(),
            url: String::new(),
            apply_url: String::new(),
            source: "Test".into(),
        }
    }

    fn resume(text: &str, title: Option<&str>, kws: &[&str]) -> ResumeData {
        ResumeData {
            text: text.into(),
            job_title: title.map(str::to_string),
            job_keywords: kws.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn cats() -> Vec<RoleCategory> {
        Vocabulary::default_seed().role_categories
    }

    #[test]
    fn title_containment_is_full_match() {
        let r = resume("", Some("Project Manager"), &[]);
        assert_eq!(role_match(&r, &job("Senior Project Manager", ""), &cats()), 1.0);
    }

    #[test]
    fn category_synonyms_scale_score() {
        let r = resume("", Some("IT Project Manager"), &[]);
        let j = job("Delivery Lead", "Looking for a program manager with PMP");
        // synonyms hit: program manager, pmp
        let s = role_match(&r, &j, &cats());
        assert!((s - 1.0).abs() < 1e-9, "{s}");
        let j2 = job("Delivery Lead", "scrum master wanted");
        assert!((role_match(&r, &j2, &cats()) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn keywords_fallback() {
        let r = resume("", None, &["pmp"]);
        let s = role_match(&r, &job("Delivery Lead", "PMP required"), &cats());
        assert!((s - 0.7).abs() < 1e-9, "{s}");
    }

    #[test]
    fn title_word_overlap_fallback() {
        let r = resume("Seasoned operations person", None, &[]);
        assert_eq!(role_match(&r, &job("Operations Director", ""), &cats()), 0.4);
        assert_eq!(role_match(&r, &job("Chemical Engineer", ""), &cats()), 0.0);
    }

    #[test]
    fn short_titles_meet_the_overlap_bar() {
        let r = resume("anything", None, &[]);
        assert_eq!(role_match(&r, &job("QA", ""), &cats()), 0.4);
        assert_eq!(role_match(&r, &job("CTO", ""), &cats()), 0.4);
    }
}
