//! Durable weight and photo log.
//!
//! Entries are kept in memory and mirrored to a [`KeyValueStore`] under a
//! single key as one JSON document. Every mutation serializes the whole
//! would-be collection first and only commits to memory once the durable
//! write succeeded, so a quota rejection leaves both sides unchanged.

pub mod photo;
pub mod store;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use photo::{CompressedPhoto, CompressionSettings, PhotoError, compress_file, compress_image};
pub use store::{DEFAULT_CAPACITY_BYTES, FileStore, KeyValueStore, StorageError};

/// Store key holding the serialized log.
pub const PROGRESS_KEY: &str = "progress";

/// Serialized size above which a write still succeeds but warns.
pub const SOFT_LIMIT_BYTES: usize = 4_500_000;

/// Current durable format version.
pub const FORMAT_VERSION: u32 = 1;

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m";

pub const EMPTY_CHART_MESSAGE: &str = "Add at least 2 entries to see the chart.";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Optional front/back/side photos, each a JPEG data URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

impl PhotoSet {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none() && self.side.is_none()
    }

    /// Names of the attached slots, in front/back/side order.
    pub fn attached(&self) -> Vec<&'static str> {
        [
            ("front", &self.front),
            ("back", &self.back),
            ("side", &self.side),
        ]
        .into_iter()
        .filter(|(_, photo)| photo.is_some())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub id: String,
    pub date: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<PhotoSet>,
}

/// Input to [`ProgressLog::record`].
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub weight: f64,
    pub notes: Option<String>,
    pub photos: PhotoSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWarning {
    /// The log is close to the store capacity; the write went through.
    NearCapacity { bytes: usize, soft_limit: usize },
}

impl std::fmt::Display for StorageWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NearCapacity { .. } => write!(
                f,
                "storage is almost full; consider removing old photos"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub entry: ProgressEntry,
    pub warning: Option<StorageWarning>,
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("weight must be a positive number, got {0}")]
    InvalidWeight(f64),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize progress log: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Chart projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Empty { message: &'static str },
    Series {
        points: Vec<ChartPoint>,
        y_min: f64,
        y_max: f64,
    },
}

// ---------------------------------------------------------------------------
// Durable format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    entries: Vec<ProgressEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredLog {
    Versioned(Envelope),
    Legacy(Vec<ProgressEntry>),
}

fn decode(raw: &str) -> Result<Vec<ProgressEntry>, String> {
    match serde_json::from_str::<StoredLog>(raw).map_err(|e| e.to_string())? {
        StoredLog::Versioned(env) if env.version == FORMAT_VERSION => Ok(env.entries),
        StoredLog::Versioned(env) => Err(format!("unsupported format version {}", env.version)),
        StoredLog::Legacy(entries) => Ok(entries),
    }
}

// ---------------------------------------------------------------------------
// ProgressLog
// ---------------------------------------------------------------------------

pub struct ProgressLog {
    store: Box<dyn KeyValueStore>,
    entries: Vec<ProgressEntry>,
    date_format: String,
}

impl std::fmt::Debug for ProgressLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressLog")
            .field("entries", &self.entries.len())
            .field("date_format", &self.date_format)
            .finish_non_exhaustive()
    }
}

impl ProgressLog {
    /// Load the log from `store`. Missing or unreadable data yields an
    /// empty log.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let entries = match store.get(PROGRESS_KEY) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => decode(&raw).unwrap_or_else(|error| {
                tracing::error!(%error, "stored progress log is unreadable, starting empty");
                Vec::new()
            }),
            Err(error) => {
                tracing::error!(%error, "failed to read progress log, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(entries = entries.len(), "progress log loaded");

        Self {
            store,
            entries,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Override the `chrono` format used for entry dates.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent first.
    pub fn history(&self) -> impl Iterator<Item = &ProgressEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&ProgressEntry> {
        self.entries.last()
    }

    pub fn record(&mut self, new: NewEntry) -> Result<RecordOutcome, ProgressError> {
        self.record_at(new, Local::now())
    }

    /// [`record`](Self::record) with an explicit timestamp.
    pub fn record_at(
        &mut self,
        new: NewEntry,
        now: DateTime<Local>,
    ) -> Result<RecordOutcome, ProgressError> {
        if !new.weight.is_finite() || new.weight <= 0.0 {
            return Err(ProgressError::InvalidWeight(new.weight));
        }

        let entry = ProgressEntry {
            id: self.next_id(now.timestamp_millis()),
            date: now.format(&self.date_format).to_string(),
            weight: new.weight,
            notes: new
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            photos: (!new.photos.is_empty()).then_some(new.photos),
        };

        let mut updated = self.entries.clone();
        updated.push(entry.clone());
        let warning = self.persist(&updated)?;
        self.entries = updated;

        tracing::info!(id = %entry.id, weight = entry.weight, "progress entry recorded");
        Ok(RecordOutcome { entry, warning })
    }

    /// Remove the durable key and forget every entry.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(PROGRESS_KEY)?;
        self.entries.clear();
        tracing::info!("progress log cleared");
        Ok(())
    }

    pub fn chart(&self) -> ChartView {
        if self.entries.len() < 2 {
            return ChartView::Empty {
                message: EMPTY_CHART_MESSAGE,
            };
        }

        let points: Vec<ChartPoint> = self
            .entries
            .iter()
            .map(|e| ChartPoint {
                label: e.date.clone(),
                weight: e.weight,
            })
            .collect();
        let min = points.iter().map(|p| p.weight).fold(f64::INFINITY, f64::min);
        let max = points
            .iter()
            .map(|p| p.weight)
            .fold(f64::NEG_INFINITY, f64::max);

        ChartView::Series {
            points,
            y_min: min - 2.0,
            y_max: max + 2.0,
        }
    }

    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.entries.iter().any(|e| e.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn persist(&self, entries: &[ProgressEntry]) -> Result<Option<StorageWarning>, ProgressError> {
        let serialized = serde_json::to_string(&Envelope {
            version: FORMAT_VERSION,
            entries: entries.to_vec(),
        })?;

        let warning = (serialized.len() > SOFT_LIMIT_BYTES).then(|| {
            tracing::warn!(bytes = serialized.len(), "progress log is near storage capacity");
            StorageWarning::NearCapacity {
                bytes: serialized.len(),
                soft_limit: SOFT_LIMIT_BYTES,
            }
        });

        if let Err(error) = self.store.set(PROGRESS_KEY, &serialized) {
            tracing::error!(%error, "failed to persist progress log");
            return Err(error.into());
        }
        Ok(warning)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
