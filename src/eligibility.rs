// src/eligibility.rs
//! Business-rule eligibility checks on job postings.
//!
//! A posting is eligible when it is full-time, not from a staffing agency,
//! not explicitly paid below the salary floor, and mentions benefits.
//! All checks are pure substring/regex tests on lowercased text.

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

use crate::types::JobPosting;

pub const DEFAULT_ELIGIBILITY_PATH: &str = "config/eligibility.toml";
pub const ENV_ELIGIBILITY_PATH: &str = "ELIGIBILITY_CONFIG_PATH";

/// Human-readable list of the filters `filter_jobs` applies.
pub const FILTER_NAMES: [&str; 5] = [
    "Full-time only",
    "No staffing/recruiting companies",
    "Salary >= $100k per annum (or not specified)",
    "Benefits mentioned",
    "End-client companies only",
];

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityRules {
    #[serde(default = "seed_staffing")]
    pub staffing_denylist: Vec<String>,
    #[serde(default = "seed_full_time_exclude")]
    pub full_time_exclude: Vec<String>,
    #[serde(default = "seed_full_time_include")]
    pub full_time_include: Vec<String>,
    #[serde(default = "seed_benefits")]
    pub benefits: Vec<String>,
    /// Annual salary floor in thousands of USD.
    #[serde(default = "default_salary_floor_k")]
    pub salary_floor_k: f64,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            staffing_denylist: seed_staffing(),
            full_time_exclude: seed_full_time_exclude(),
            full_time_include: seed_full_time_include(),
            benefits: seed_benefits(),
            salary_floor_k: default_salary_floor_k(),
        }
    }
}

impl EligibilityRules {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut r: EligibilityRules = toml::from_str(s)?;
        for list in [
            &mut r.staffing_denylist,
            &mut r.full_time_exclude,
            &mut r.full_time_include,
            &mut r.benefits,
        ] {
            list.iter_mut().for_each(|t| *t = t.trim().to_lowercase());
            list.retain(|t| !t.is_empty());
        }
        Ok(r)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, path = %path.display(), "eligibility rules parse failed; using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn load_default() -> Self {
        let path = std::env::var(ENV_ELIGIBILITY_PATH)
            .unwrap_or_else(|_| DEFAULT_ELIGIBILITY_PATH.to_string());
        Self::load_from_file(path)
    }
}

/// Why a posting was excluded.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NotFullTime,
    StaffingCompany,
    SalaryBelowFloor(f64),
    NoBenefits,
}

impl Rejection {
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::NotFullTime => "not_full_time",
            Rejection::StaffingCompany => "staffing_company",
            Rejection::SalaryBelowFloor(_) => "salary_below_floor",
            Rejection::NoBenefits => "no_benefits",
        }
    }
}

/// Outcome of running every check on one posting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Eligibility {
    pub salary_k: Option<f64>,
    pub rejections: Vec<Rejection>,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        self.rejections.is_empty()
    }
}

fn salary_patterns() -> &'static [Regex] {
    static RE: OnceCell<Vec<Regex>> = OnceCell::new();
    RE.get_or_init(|| {
        [
            r"(?i)\$(\d{1,3})(?:k|,000)",
            r"(?i)(\d{1,3})(?:k|,000)\s*(?:per\s*)?(?:year|annum|annually|yr)",
            r"(?i)salary[:\s]+(?:range[:\s]+)?\$?(\d{1,3})(?:k|,000)",
            r"(?i)(\d{1,3})(?:k|,000)\s*-\s*\$?(\d{1,3})(?:k|,000)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("salary regex"))
        .collect()
    })
}

#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    rules: EligibilityRules,
}

impl EligibilityFilter {
    pub fn new(rules: EligibilityRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &EligibilityRules {
        &self.rules
    }

    pub fn is_staffing_company(&self, company: &str) -> bool {
        let c = company.trim().to_lowercase();
        self.rules
            .staffing_denylist
            .iter()
            .any(|s| c.contains(s.as_str()))
    }

    /// Exclusion terms win over inclusion terms; no signal means full-time.
    pub fn is_full_time(&self, description: &str, title: &str) -> bool {
        let text = format!("{description} {title}").to_lowercase();
        if self
            .rules
            .full_time_exclude
            .iter()
            .any(|t| text.contains(t.as_str()))
        {
            return false;
        }
        if self
            .rules
            .full_time_include
            .iter()
            .any(|t| text.contains(t.as_str()))
        {
            return true;
        }
        true
    }

    /// Highest salary figure mentioned, in thousands. `None` if nothing found.
    pub fn extract_salary(&self, description: &str) -> Option<f64> {
        extract_salary(description)
    }

    pub fn has_benefits(&self, description: &str) -> bool {
        let d = description.to_lowercase();
        self.rules.benefits.iter().any(|b| d.contains(b.as_str()))
    }

    /// Run every check and report all failures.
    pub fn evaluate(&self, job: &JobPosting) -> Eligibility {
        let mut rejections = Vec::new();
        if !self.is_full_time(&job.description, &job.title) {
            rejections.push(Rejection::NotFullTime);
        }
        if self.is_staffing_company(&job.company) {
            rejections.push(Rejection::StaffingCompany);
        }
        let salary_k = self.extract_salary(&job.description);
        if let Some(s) = salary_k {
            if s < self.rules.salary_floor_k {
                rejections.push(Rejection::SalaryBelowFloor(s));
            }
        }
        if !self.has_benefits(&job.description) {
            rejections.push(Rejection::NoBenefits);
        }
        Eligibility {
            salary_k,
            rejections,
        }
    }

    pub fn is_eligible(&self, job: &JobPosting) -> bool {
        self.is_full_time(&job.description, &job.title)
            && !self.is_staffing_company(&job.company)
            && self
                .extract_salary(&job.description)
                .map_or(true, |s| s >= self.rules.salary_floor_k)
            && self.has_benefits(&job.description)
    }

    /// Keep eligible postings in their original order. Idempotent.
    pub fn filter_jobs(&self, jobs: Vec<JobPosting>) -> Vec<JobPosting> {
        let before = jobs.len();
        let kept: Vec<JobPosting> = jobs
            .into_iter()
            .filter(|job| {
                let e = self.evaluate(job);
                for r in &e.rejections {
                    counter!("eligibility_rejected_total", "reason" => r.label()).increment(1);
                }
                if let Some(first) = e.rejections.first() {
                    debug!(
                        target: "eligibility",
                        title = %job.title, company = %job.company,
                        reason = first.label(), "excluded"
                    );
                }
                e.is_eligible()
            })
            .collect();
        debug!(target: "eligibility", before, after = kept.len(), "filtered postings");
        kept
    }
}

/// Salary extraction shared by the filter and tools.
pub fn extract_salary(description: &str) -> Option<f64> {
    let mut max_k = 0.0_f64;
    for re in salary_patterns() {
        for caps in re.captures_iter(description) {
            let first = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
            let second = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
            let Some(mut salary) = (match (first, second) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, _) => a,
            }) else {
                continue;
            };
            if salary > 1000.0 {
                salary /= 1000.0;
            }
            max_k = max_k.max(salary);
        }
    }
    (max_k > 0.0).then_some(max_k)
}

fn default_salary_floor_k() -> f64 {
    100.0
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed_staffing() -> Vec<String> {
    owned(&[
        "robert half", "roberthalf", "randstad", "adecco", "manpower", "kelly services",
        "kellyservices", "allegis", "allegis group", "aerotek", "teksystems", "insight global",
        "insightglobal", "kforce", "modis", "harvey nash", "harveynash", "hays", "michael page",
        "michaelpage", "page group", "hudson", "hudson global", "hudsonrpo", "volt",
        "volt workforce", "voltworkforce", "staffing solutions", "staffingsolutions",
        "talent solutions", "recruiting", "recruiter", "recruitment", "staffing agency",
        "temporary", "temp", "contractor", "contract", "consulting firm", "wipro", "infosys",
        "tcs", "tata consultancy", "cognizant", "accenture", "deloitte", "pwc", "ey", "kpmg",
        "capgemini", "hcl", "tech mahindra", "lti", "mindtree", "mphasis", "genpact",
        "dxc technology", "atos", "atos syntel", "collabera", "cybercoders", "cyber coders",
        "apex systems", "apexsystems", "actalent", "talentburst", "talent burst", "yoh",
        "yoh services", "judge group", "judgegroup", "planet technology", "planetech",
        "bridgeview", "apex", "mason frank", "masonfrank", "franklin covey", "talent",
        "talent acquisition", "recruiting solutions", "recruiting services",
        "staffing services", "it staffing", "tech staffing", "engineering staffing",
        "contract staffing", "temporary staffing", "contingent workforce",
    ])
}

fn seed_full_time_exclude() -> Vec<String> {
    owned(&[
        "part-time", "part time", "contract", "temporary", "temp", "freelance", "consultant",
    ])
}

fn seed_full_time_include() -> Vec<String> {
    owned(&["full-time", "full time", "fulltime", "permanent", "ft"])
}

fn seed_benefits() -> Vec<String> {
    owned(&[
        "benefits", "benefit package", "benefits package", "health insurance",
        "medical insurance", "dental insurance", "vision insurance", "401k", "401(k)",
        "retirement plan", "pension", "paid time off", "pto", "vacation", "sick leave",
        "holiday pay", "life insurance", "disability insurance", "flexible spending account",
        "fsa", "hsa", "health savings account", "tuition reimbursement", "education assistance",
        "employee assistance program", "eap", "wellness program", "gym membership", "fitness",
        "stock options", "equity", "bonus", "incentive", "remote work", "work from home",
        "flexible schedule", "maternity leave", "paternity leave", "parental leave",
    ])
}
