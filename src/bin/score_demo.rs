//! Offline demo: filter fixture postings and rank them against a résumé.
//!
//! Usage: score_demo <resume.txt> <postings.json>

use anyhow::{bail, Context, Result};
use job_match_assistant::{
    ingest::{normalize::normalize_batch, normalize::FIXTURE},
    EligibilityFilter, MatchScorer, ResumeData,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [resume_path, postings_path] = args.as_slice() else {
        bail!("usage: score_demo <resume.txt> <postings.json>");
    };

    let text = std::fs::read_to_string(resume_path)
        .with_context(|| format!("reading résumé from {resume_path}"))?;
    let raw = std::fs::read_to_string(postings_path)
        .with_context(|| format!("reading postings from {postings_path}"))?;
    let items: Vec<serde_json::Value> =
        serde_json::from_str(&raw).context("postings file must be a JSON array")?;

    let postings = normalize_batch(&FIXTURE, &items, chrono::Utc::now());
    let total = postings.len();
    let eligible = EligibilityFilter::default().filter_jobs(postings);
    let resume = ResumeData::from_text(text);
    let matches = MatchScorer::default().score_all(&resume, &eligible);

    println!(
        "{} of {total} postings eligible; résumé title: {}",
        eligible.len(),
        resume.job_title.as_deref().unwrap_or("-")
    );
    for m in &matches {
        println!(
            "{:>3}  {:<5}  {} @ {}",
            m.score,
            if m.should_apply() { "APPLY" } else { "skip" },
            m.job.title,
            m.job.company
        );
        for r in &m.reasons {
            println!("       - {r}");
        }
    }
    Ok(())
}
