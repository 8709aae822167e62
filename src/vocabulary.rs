// src/vocabulary.rs
//! # Vocabulary
//!
//! Immutable keyword configuration shared by the extractor and the scorer.
//!
//! - `terms`: general skill/technology/methodology vocabulary.
//! - `priority`: project-management vocabulary that is emitted first and
//!   floated to the front of matched/missing lists.
//! - `role_categories`: résumé-title category → synonyms used for role fit.
//! - `education_terms`: degree words that mark an education requirement.
//!
//! Loads from TOML (`VOCABULARY_CONFIG_PATH` or `config/vocabulary.toml`).
//! Any missing section falls back to the built-in seed; a missing or broken
//! file falls back to `default_seed()` entirely.

use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_VOCABULARY_PATH: &str = "config/vocabulary.toml";
pub const ENV_VOCABULARY_PATH: &str = "VOCABULARY_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleCategory {
    pub name: String,
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vocabulary {
    #[serde(default = "seed_terms")]
    pub terms: Vec<String>,
    #[serde(default = "seed_priority")]
    pub priority: Vec<String>,
    #[serde(default = "seed_role_categories")]
    pub role_categories: Vec<RoleCategory>,
    #[serde(default = "seed_education_terms")]
    pub education_terms: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl Vocabulary {
    pub fn default_seed() -> Self {
        Self {
            terms: seed_terms(),
            priority: seed_priority(),
            role_categories: seed_role_categories(),
            education_terms: seed_education_terms(),
        }
    }

    /// Parse from TOML. Terms are lowercased and trimmed; empties dropped.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut v: Vocabulary = toml::from_str(s)?;
        v.terms = clean(v.terms);
        v.priority = clean(v.priority);
        v.education_terms = clean(v.education_terms);
        for c in &mut v.role_categories {
            c.name = c.name.trim().to_lowercase();
            c.synonyms = clean(std::mem::take(&mut c.synonyms));
        }
        Ok(v)
    }

    /// Load from a TOML file, falling back to the seed when unreadable.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, path = %path.display(), "vocabulary parse failed; using seed");
                Self::default_seed()
            }),
            Err(_) => Self::default_seed(),
        }
    }

    /// `$VOCABULARY_CONFIG_PATH`, then `config/vocabulary.toml`, then the seed.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_VOCABULARY_PATH)
            .unwrap_or_else(|_| DEFAULT_VOCABULARY_PATH.to_string());
        Self::load_from_file(path)
    }

    /// True if `keyword` contains a priority term or is contained in one.
    pub fn is_priority_keyword(&self, keyword: &str) -> bool {
        let kw = keyword.to_lowercase();
        if kw.is_empty() {
            return false;
        }
        self.priority
            .iter()
            .any(|p| kw.contains(p.as_str()) || p.contains(kw.as_str()))
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed_terms() -> Vec<String> {
    owned(&[
        // languages
        "javascript", "typescript", "python", "java", "c++", "c#", "go", "rust", "php", "ruby",
        "swift", "kotlin", "r programming", "matlab", "perl", "scala", "clojure", "haskell",
        // frameworks
        "react", "vue", "angular", "next.js", "nuxt", "svelte", "ember", "node.js", "express",
        "nest.js", "fastapi", "django", "flask", "spring", "spring boot", "laravel", "rails",
        "asp.net", ".net", "dotnet",
        // databases
        "sql", "nosql", "mongodb", "postgresql", "mysql", "redis", "cassandra", "dynamodb",
        "oracle", "sql server", "sqlite", "elasticsearch", "neo4j",
        // cloud & devops
        "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "k8s", "ci/cd", "jenkins",
        "terraform", "ansible", "chef", "puppet", "gitlab ci", "github actions", "serverless",
        "lambda", "ec2", "s3", "cloudformation",
        // tools
        "git", "github", "gitlab", "bitbucket", "jira", "confluence", "slack", "trello", "figma",
        "sketch", "adobe xd", "invision",
        // methodologies
        "agile", "scrum", "kanban", "waterfall", "devops", "lean", "six sigma",
        // ai/ml
        "machine learning", "ml", "deep learning", "neural networks", "tensorflow", "pytorch",
        "keras", "scikit-learn", "numpy", "pandas", "data science", "nlp",
        "natural language processing",
        // web
        "html", "html5", "css", "css3", "sass", "scss", "less", "tailwind", "bootstrap",
        "rest api", "graphql", "soap", "microservices", "api", "restful",
        // project management
        "project management", "pmp", "prince2", "agile project management", "scrum master",
        "product management", "product owner", "program management",
        // soft skills
        "leadership", "communication", "teamwork", "collaboration", "problem solving",
        "analytical", "strategic thinking", "stakeholder management",
        // platforms & disciplines
        "linux", "unix", "windows", "macos", "ios", "android", "backend", "frontend",
        "full stack", "fullstack", "mobile development", "ios development",
        "android development", "web development", "software development",
        "application development",
        // certifications & education
        "bachelor", "master", "phd", "degree", "bs", "ms", "mba", "certified", "certification",
        // experience
        "years of experience", "years experience", "yrs experience",
    ])
}

fn seed_priority() -> Vec<String> {
    owned(&[
        // core
        "project management", "program management", "agile", "scrum", "kanban",
        "risk mitigation", "stakeholder communication", "strategic planning",
        "resource forecasting", "budget forecasting", "project planning", "project execution",
        "project delivery", "project coordination", "project oversight", "project governance",
        "pmp", "project management professional", "prince2", "pmi",
        "project management institute",
        // workforce
        "workforce management", "staffing optimization", "global headcount planning",
        "headcount planning", "kpi monitoring", "kpi tracking", "key performance indicators",
        "performance metrics", "workforce planning", "resource management", "talent management",
        "capacity planning",
        // compliance
        "compliance", "regulatory compliance", "compliance management", "audit", "governance",
        "risk management", "risk assessment",
        // collaboration & leadership
        "cross-functional leadership", "cross-functional collaboration",
        "stakeholder management", "stakeholder engagement", "vendor management",
        "vendor relations", "process optimization", "process improvement",
        "executive reporting", "executive communication", "leadership", "team leadership",
        "collaboration", "team collaboration", "change management", "organizational change",
        // tools
        "jira", "confluence", "microsoft office", "microsoft office suite", "microsoft excel",
        "microsoft word", "microsoft powerpoint", "microsoft project", "ms project", "ldap",
        "powershell", "sharepoint", "servicenow", "slack", "trello", "asana", "monday.com",
        "smartsheet",
        // data & forecasting
        "excel", "sql", "predictive modeling", "data visualization", "tableau", "power bi",
        "business intelligence", "reporting", "dashboards", "data analysis", "forecasting",
        "statistical analysis", "data interpretation",
    ])
}

fn seed_role_categories() -> Vec<RoleCategory> {
    let cat = |name: &str, syn: &[&str]| RoleCategory {
        name: name.to_string(),
        synonyms: owned(syn),
    };
    vec![
        cat(
            "project manager",
            &["project manager", "program manager", "pmp", "agile project", "scrum master"],
        ),
        cat(
            "product manager",
            &["product manager", "product owner", "product lead"],
        ),
        cat(
            "software engineer",
            &["software engineer", "developer", "programmer", "software developer"],
        ),
        cat(
            "data scientist",
            &["data scientist", "data analyst", "machine learning engineer"],
        ),
        cat(
            "designer",
            &["designer", "ux designer", "ui designer", "user experience"],
        ),
        cat(
            "business analyst",
            &["business analyst", "analyst", "business intelligence"],
        ),
        cat("sales", &["sales", "account executive", "business development"]),
        cat(
            "marketing",
            &["marketing", "digital marketing", "marketing manager"],
        ),
        cat(
            "devops",
            &["devops", "site reliability", "sre", "infrastructure engineer"],
        ),
    ]
}

fn seed_education_terms() -> Vec<String> {
    owned(&["bachelor", "master", "phd", "degree", "bs", "ms", "mba"])
}
