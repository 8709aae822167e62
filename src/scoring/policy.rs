//! Scoring weights and thresholds with hot-reload from config/scoring.json.
//!
//! JSON shape (every field optional, defaults shown):
//! {
//!   "keyword_ratio_points": 50.0,
//!   "per_match_points": 3.0,
//!   "match_points_cap": 30.0,
//!   "multi_match_bonus": 10.0,
//!   "multi_match_min": 3,
//!   "role_points": 15.0,
//!   "experience_points": 10.0,
//!   "education_points": 5.0,
//!   "category_bonus": 15.0,
//!   "apply_threshold": 40,
//!   "category_min_matches": 2,
//!   "target_role": { "name": "project manager", "titles": ["project manager", "program manager"] }
//! }
//!
//! On each `current()` call we check the file's modified time and reload if changed.

use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};

pub const DEFAULT_SCORING_POLICY_PATH: &str = "config/scoring.json";
pub const ENV_SCORING_POLICY_PATH: &str = "SCORING_POLICY_PATH";

/// Role category whose postings earn the category bonus.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TargetRole {
    pub name: String,
    pub titles: Vec<String>,
}

impl Default for TargetRole {
    fn default() -> Self {
        Self {
            name: "project manager".into(),
            titles: vec!["project manager".into(), "program manager".into()],
        }
    }
}

impl TargetRole {
    /// True if the posting's title or description names one of the titles.
    pub fn matches(&self, title_lower: &str, description_lower: &str) -> bool {
        self.titles.iter().any(|t| {
            let t = t.to_lowercase();
            title_lower.contains(&t) || description_lower.contains(&t)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub keyword_ratio_points: f64,
    pub per_match_points: f64,
    pub match_points_cap: f64,
    pub multi_match_bonus: f64,
    pub multi_match_min: usize,
    pub role_points: f64,
    pub experience_points: f64,
    pub education_points: f64,
    pub category_bonus: f64,
    pub apply_threshold: u8,
    pub category_min_matches: usize,
    pub target_role: TargetRole,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            keyword_ratio_points: 50.0,
            per_match_points: 3.0,
            match_points_cap: 30.0,
            multi_match_bonus: 10.0,
            multi_match_min: 3,
            role_points: 15.0,
            experience_points: 10.0,
            education_points: 5.0,
            category_bonus: 15.0,
            apply_threshold: 40,
            category_min_matches: 2,
            target_role: TargetRole::default(),
        }
    }
}

/// Hot-reload wrapper: reloads when the config file mtime changes.
#[derive(Debug)]
pub struct HotReloadPolicy {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    policy: Arc<ScoringPolicy>,
    last_modified: Option<SystemTime>,
}

impl HotReloadPolicy {
    /// Create with a path (defaults to "config/scoring.json" if `None`).
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORING_POLICY_PATH));
        Self {
            path,
            inner: RwLock::new(State {
                policy: Arc::new(ScoringPolicy::default()),
                last_modified: None,
            }),
        }
    }

    /// `$SCORING_POLICY_PATH` or the default path.
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_SCORING_POLICY_PATH).ok().map(PathBuf::from);
        Self::new(path.as_deref())
    }

    /// Get the latest policy, reloading if the config file changed.
    pub fn current(&self) -> Arc<ScoringPolicy> {
        let mtime = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            // No file: keep whatever we have.
            Err(_) => return self.snapshot(),
        };

        let changed = match self.inner.read() {
            Ok(g) => g.last_modified != Some(mtime),
            Err(_) => false,
        };
        if !changed {
            return self.snapshot();
        }

        let Ok(mut guard) = self.inner.write() else {
            return Arc::new(ScoringPolicy::default());
        };
        // Double-check in case of races.
        if guard.last_modified != Some(mtime) {
            match load_policy_file(&self.path) {
                Ok(p) => {
                    tracing::info!(target: "scoring", path = %self.path.display(), "scoring policy reloaded");
                    guard.policy = Arc::new(p);
                }
                Err(e) => {
                    tracing::warn!(target: "scoring", error = ?e, "scoring policy reload failed; keeping previous");
                }
            }
            guard.last_modified = Some(mtime);
        }
        guard.policy.clone()
    }

    fn snapshot(&self) -> Arc<ScoringPolicy> {
        self.inner
            .read()
            .map(|g| g.policy.clone())
            .unwrap_or_else(|_| Arc::new(ScoringPolicy::default()))
    }
}

/// Load a policy directly (no caching). Public for tests/tools.
pub fn load_policy_file(path: &Path) -> io::Result<ScoringPolicy> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, thread, time::Duration};

    #[test]
    fn partial_json_keeps_defaults() {
        let p: ScoringPolicy = serde_json::from_str(r#"{"apply_threshold": 55}"#).unwrap();
        assert_eq!(p.apply_threshold, 55);
        assert_eq!(p.keyword_ratio_points, 50.0);
        assert_eq!(p.target_role, TargetRole::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let hot = HotReloadPolicy::new(Some(Path::new("no/such/scoring.json")));
        assert_eq!(*hot.current(), ScoringPolicy::default());
    }

    #[test]
    fn loads_and_hot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.json");

        {
            let mut f = fs::File::create(&path).unwrap();
            write!(f, r#"{{"apply_threshold": 60, "category_bonus": 5.0}}"#).unwrap();
            f.sync_all().unwrap();
        }

        let hot = HotReloadPolicy::new(Some(&path));
        let p1 = hot.current();
        assert_eq!(p1.apply_threshold, 60);
        assert_eq!(p1.category_bonus, 5.0);

        // Ensure different mtime on coarse filesystems.
        thread::sleep(Duration::from_millis(1100));

        {
            let mut f = fs::File::create(&path).unwrap();
            write!(
                f,
                r#"{{"target_role": {{"name": "data scientist", "titles": ["data scientist"]}}}}"#
            )
            .unwrap();
            f.sync_all().unwrap();
        }

        let p2 = hot.current();
        assert_eq!(p2.apply_threshold, 40);
        assert_eq!(p2.target_role.name, "data scientist");
    }

    #[test]
    fn broken_file_keeps_previous_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.json");
        fs::write(&path, "{ not json").unwrap();
        let hot = HotReloadPolicy::new(Some(&path));
        assert_eq!(*hot.current(), ScoringPolicy::default());
    }
}
