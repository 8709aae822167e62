// src/resume.rs
//! Résumé parsing: document → text → `ResumeData`.

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::{Cursor, Read};

use crate::error::ExtractError;
use crate::types::ResumeData;

/// Turns uploaded document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8], mime: &str) -> Result<String, ExtractError>;
}

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const WORD_MIME: &str = "application/msword";

/// Plain text, PDF and Word (OOXML) documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract_text(&self, bytes: &[u8], mime: &str) -> Result<String, ExtractError> {
        // "text/plain; charset=utf-8" → "text/plain"
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractError::Unreadable(e.to_string())),
            DOCX_MIME | WORD_MIME => docx_text(bytes),
            m if m.starts_with("text/") => Ok(String::from_utf8_lossy(bytes).into_owned()),
            other => Err(ExtractError::UnsupportedFormat(if other.is_empty() {
                "unknown".to_string()
            } else {
                other.to_string()
            })),
        }
    }
}

fn unreadable(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Unreadable(e.to_string())
}

/// Body text of a `.docx`: the `w:t` runs of `word/document.xml`, one line per paragraph.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Unreadable(format!("not a Word document: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(unreadable)?
        .read_to_string(&mut xml)
        .map_err(unreadable)?;
    document_xml_text(&xml)
}

fn document_xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;
    loop {
        match reader.read_event().map_err(unreadable)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => out.push_str(&t.unescape().map_err(unreadable)?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out.trim_end().to_string())
}

const COMMON_SKILLS: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "Go", "Rust", "React", "Vue",
    "Angular", "Node.js", "Express", "Django", "Flask", "SQL", "MongoDB", "PostgreSQL", "MySQL",
    "Redis", "AWS", "Azure", "GCP", "Docker", "Kubernetes", "CI/CD", "Git", "GitHub", "GitLab",
    "Agile", "Scrum", "Machine Learning", "Data Science", "TensorFlow", "PyTorch", "REST API",
    "GraphQL", "HTML", "CSS", "SASS", "Tailwind", "Bootstrap", "Linux", "Unix", "Windows",
    "macOS", "Project Management", "Leadership", "Communication", "Teamwork",
];

// Case-sensitive on purpose: "MS" the degree, not "ms" inside words.
const EDUCATION_MARKERS: &[&str] = &[
    "Bachelor", "Master", "PhD", "Degree", "University", "College", "BS", "MS", "MBA",
];

const COMMON_TITLES: &[&str] = &[
    "Project Manager", "Product Manager", "Program Manager", "Software Engineer",
    "Senior Software Engineer", "Full Stack Developer", "Frontend Developer",
    "Backend Developer", "DevOps Engineer", "Data Scientist", "Data Analyst",
    "Business Analyst", "Product Designer", "UX Designer", "UI Designer", "Scrum Master",
    "Agile Coach", "Technical Lead", "Engineering Manager", "CTO", "VP Engineering",
    "Sales Manager", "Marketing Manager", "HR Manager", "Operations Manager", "Finance Manager",
];

const ROLE_DOMAINS: &[(&str, &[&str])] = &[
    (
        "project management",
        &["project management", "project manager", "pmp", "agile", "scrum", "kanban", "waterfall"],
    ),
    (
        "product management",
        &["product management", "product manager", "product owner", "roadmap", "backlog"],
    ),
    (
        "software engineering",
        &["software engineer", "developer", "programming", "coding", "software development"],
    ),
    (
        "data science",
        &["data science", "data scientist", "machine learning", "ml", "ai", "data analysis"],
    ),
    (
        "devops",
        &["devops", "ci/cd", "deployment", "infrastructure", "kubernetes", "docker"],
    ),
    (
        "design",
        &["ux design", "ui design", "user experience", "user interface", "designer"],
    ),
    (
        "business",
        &["business analyst", "business development", "strategy", "consulting"],
    ),
    ("sales", &["sales", "account executive", "business development", "revenue"]),
    (
        "marketing",
        &["marketing", "digital marketing", "content marketing", "seo", "sem"],
    ),
];

const TITLE_SUFFIX: &str = r"(?:Manager|Engineer|Developer|Director|Lead|Specialist|Analyst|Consultant|Coordinator|Administrator|Executive|Architect|Designer|Scrum|Product|Project|Program|Business|Data|Software|Systems|DevOps|QA|Test|Security|Network|Cloud|Full.?Stack|Front.?end|Back.?end|Mobile|iOS|Android|Machine.?Learning|Data.?Science|Sales|Marketing|HR|Finance|Operations)";

static EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)")
        .expect("experience regex")
});

static TITLE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)(?:current|present|role|position|title)[\s:]+([A-Z][a-zA-Z \t&]+{TITLE_SUFFIX})"),
        format!(r"(?i)(?:worked as|served as|held the position of|position of)[\s:]+([A-Z][a-zA-Z \t&]+{TITLE_SUFFIX})"),
        format!(r"(?m)^([A-Z][a-zA-Z \t&]+{TITLE_SUFFIX})"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("title regex"))
    .collect()
});

static PMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpmp\b|project management professional").expect("pmp regex")
});

pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    COMMON_SKILLS
        .iter()
        .filter(|s| lower.contains(&s.to_lowercase()))
        .map(|s| s.to_string())
        .collect()
}

pub fn extract_experience(text: &str) -> Vec<String> {
    EXPERIENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_education(text: &str) -> Vec<String> {
    EDUCATION_MARKERS
        .iter()
        .filter(|k| text.contains(*k))
        .map(|k| k.to_string())
        .collect()
}

/// Title from explicit patterns, else a known title in the first 10 lines.
pub fn extract_job_title(text: &str) -> Option<String> {
    for re in TITLE_RES.iter() {
        if let Some(m) = re.captures(text).and_then(|c| c.get(1)) {
            let t = m.as_str().trim();
            if !t.is_empty() {
                return Some(t.to_string());
            }
        }
    }

    for line in text.lines().take(10) {
        let line = line.to_lowercase();
        if let Some(t) = COMMON_TITLES
            .iter()
            .find(|t| line.contains(&t.to_lowercase()))
        {
            return Some(t.to_string());
        }
    }
    None
}

/// Role-domain tags, with PMP signals first.
pub fn extract_job_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut out = Vec::new();
    if PMP_RE.is_match(text) {
        out.extend(
            ["pmp", "pmp certified", "project management professional"]
                .iter()
                .map(|s| s.to_string()),
        );
    }
    for (domain, cues) in ROLE_DOMAINS {
        if cues.iter().any(|c| lower.contains(c)) {
            out.push(domain.to_string());
        }
    }
    out
}

impl ResumeData {
    /// Derive the structured fields from raw résumé text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            skills: extract_skills(&text),
            experience: extract_experience(&text),
            education: extract_education(&text),
            job_title: extract_job_title(&text),
            job_keywords: extract_job_keywords(&text),
            text,
        }
    }
}
