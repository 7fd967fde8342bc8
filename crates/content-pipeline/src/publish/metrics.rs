//! JSONL metrics log
//!
//! One line per cycle with the verdict, breakdown and running totals.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use content_vetting::{RewardBreakdown, RewardTotals};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::CycleReport;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub candidate_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub chars: usize,
    pub source_trends: Vec<String>,
    pub accepted: bool,
    pub reason: String,
    pub breakdown: RewardBreakdown,
    pub delta: RewardTotals,
    pub totals: RewardTotals,
    pub score: i64,
    pub published_to: Vec<String>,
}

impl From<&CycleReport> for MetricsRecord {
    fn from(report: &CycleReport) -> Self {
        Self {
            candidate_id: report.candidate.id,
            created_at: report.candidate.created_at,
            text: report.candidate.text.clone(),
            chars: report.candidate.char_len(),
            source_trends: report.candidate.source_trends.clone(),
            accepted: report.vetting.accepted,
            reason: report.vetting.reason.clone(),
            breakdown: report.evaluation.breakdown.clone(),
            delta: report.evaluation.delta,
            totals: report.evaluation.totals,
            score: report.evaluation.score(),
            published_to: report
                .published
                .iter()
                .filter(|o| o.success)
                .map(|o| o.sink.clone())
                .collect(),
        }
    }
}

pub struct MetricsLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetricsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, record: &MetricsRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every record in the log, oldest first
    pub async fn read_all(&self) -> Result<Vec<MetricsRecord>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(Into::into))
            .collect()
    }
}
