use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a refresh job when it is enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Per-job lifecycle. A failed fetch still ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Done,
}

/// A point-in-time credential snapshot for one owner's refresh.
///
/// The credentials live only as long as the job. `Debug` never prints them.
#[derive(Clone)]
pub struct RefreshJob {
    pub id: JobId,
    pub owner: String,
    token: String,
    secret: String,
}

impl RefreshJob {
    pub fn new(id: JobId, owner: &str, token: &str, secret: &str) -> Self {
        Self {
            id,
            owner: owner.to_string(),
            token: token.to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for RefreshJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshJob")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_credentials() {
        let job = RefreshJob::new(JobId(7), "42", "tok-abc", "sec-xyz");
        let debug = format!("{:?}", job);
        assert!(debug.contains("42"));
        assert!(!debug.contains("tok-abc"));
        assert!(!debug.contains("sec-xyz"));
    }

    #[test]
    fn test_credentials_accessible() {
        let job = RefreshJob::new(JobId(1), "42", "tok", "sec");
        assert_eq!(job.token(), "tok");
        assert_eq!(job.secret(), "sec");
    }

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId(3).to_string(), "job-3");
    }
}
