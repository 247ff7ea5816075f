#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`PageProgram`] over a [`SimulatedPage`] and
//! records every input, time step and frame. [`replay`] feeds a recorded
//! trace through a fresh program and checks that every frame produces the
//! same navigation state.
//!
//! # Trace format
//!
//! One JSON object per line, tagged by `"record"`:
//!
//! - **header**: schema version, viewport size, document height and the
//!   registered sections with their extents.
//! - **input**: a [`PageEvent`] and the time it was queued.
//! - **tick**: the absolute clock value after a time advance.
//! - **frame**: the active section, the scrolled flag, an FNV-1a checksum of
//!   the full [`NavSnapshot`] and a running checksum chain.
//! - **summary**: total frames and the final chain.
//!
//! # Determinism contract
//!
//! Time only moves through tick records and events only arrive through input
//! records, so the same trace yields the same checksums on every run.

use core::time::Duration;

use pagenav_core::event::PageEvent;
use pagenav_core::geometry::Extent;
use serde::{Deserialize, Serialize};

use crate::config::NavConfig;
use crate::page_program::{NavSnapshot, PageProgram, StepResult};
use crate::simulated::SimulatedPage;
use crate::{NavError, PageHost};

/// Schema version written to trace headers.
pub const SCHEMA_VERSION: &str = "pagenav-trace-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64(hash, &next.to_le_bytes())
}

/// Checksum of everything a frame renders from.
#[must_use]
pub fn snapshot_checksum(snapshot: &NavSnapshot) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    match &snapshot.active_section {
        Some(id) => {
            hash = fnv1a64(hash, &[1]);
            hash = fnv1a64(hash, id.as_bytes());
        }
        None => hash = fnv1a64(hash, &[0]),
    }
    hash = fnv1a64(
        hash,
        &[
            u8::from(snapshot.scrolled),
            u8::from(snapshot.programmatic_scroll),
            u8::from(snapshot.menu_open),
            snapshot.form as u8,
        ],
    );
    hash = fnv1a64(hash, &snapshot.scroll_y.to_bits().to_le_bytes());
    for key in &snapshot.revealed {
        hash = fnv1a64(hash, key.as_bytes());
        hash = fnv1a64(hash, &[0xff]);
    }
    hash
}

/// A registered section as laid out when recording started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSection {
    pub id: String,
    /// Document top, or `None` if the element was absent.
    pub top: Option<f64>,
    pub height: f64,
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema_version: String,
        viewport_width: f64,
        viewport_height: f64,
        document_height: f64,
        sections: Vec<TraceSection>,
    },
    /// An event queued at `ts_ns`.
    Input { ts_ns: u64, event: PageEvent },
    /// The clock moved to `ts_ns`.
    Tick { ts_ns: u64 },
    /// State after a step.
    Frame {
        frame_idx: u64,
        ts_ns: u64,
        active_section: Option<String>,
        scrolled: bool,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_frames: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of frame checkpoints in the trace.
    pub fn frame_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Frame { .. }))
            .count() as u64
    }

    /// Final checksum chain from the summary record.
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Check the structure: one header first, one summary last, frame
    /// indices contiguous from zero, and a summary that agrees with the frames.
    pub fn validate(&self) -> Result<(), TraceValidationError> {
        let (first, rest) = self
            .records
            .split_first()
            .ok_or(TraceValidationError::EmptyTrace)?;
        match first {
            TraceRecord::Header { schema_version, .. } if schema_version != SCHEMA_VERSION => {
                return Err(TraceValidationError::UnsupportedSchema(
                    schema_version.clone(),
                ));
            }
            TraceRecord::Header { .. } => {}
            _ if self
                .records
                .iter()
                .any(|r| matches!(r, TraceRecord::Header { .. })) =>
            {
                return Err(TraceValidationError::HeaderNotFirst);
            }
            _ => return Err(TraceValidationError::MissingHeader),
        }

        let mut frames: u64 = 0;
        let mut chain: u64 = 0;
        let mut summary: Option<(usize, u64, u64)> = None;

        for (offset, record) in rest.iter().enumerate() {
            let idx = offset + 1;
            if let Some((summary_index, ..)) = summary {
                return Err(TraceValidationError::SummaryNotLast { summary_index });
            }
            match record {
                TraceRecord::Header { .. } => return Err(TraceValidationError::MultipleHeaders),
                TraceRecord::Frame {
                    frame_idx,
                    checksum_chain,
                    ..
                } => {
                    if *frame_idx != frames {
                        return Err(TraceValidationError::FrameIndexMismatch {
                            expected: frames,
                            actual: *frame_idx,
                        });
                    }
                    frames += 1;
                    chain = *checksum_chain;
                }
                TraceRecord::Summary {
                    total_frames,
                    final_checksum_chain,
                } => summary = Some((idx, *total_frames, *final_checksum_chain)),
                TraceRecord::Input { .. } | TraceRecord::Tick { .. } => {}
            }
        }

        let Some((_, total_frames, final_chain)) = summary else {
            return Err(TraceValidationError::MissingSummary);
        };
        if total_frames != frames {
            return Err(TraceValidationError::SummaryFrameCountMismatch {
                expected: frames,
                actual: total_frames,
            });
        }
        if final_chain != chain {
            return Err(TraceValidationError::SummaryChecksumChainMismatch {
                expected: chain,
                actual: final_chain,
            });
        }
        Ok(())
    }

    /// Serialize as JSONL, one record per line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSONL. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, TraceParseError> {
        let mut records = Vec::new();
        for (line_num, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|err| TraceParseError {
                line: line_num + 1,
                message: err.to_string(),
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Parse and validate JSONL.
    pub fn from_jsonl_validated(input: &str) -> Result<Self, TraceLoadError> {
        let trace = Self::from_jsonl(input)?;
        trace.validate()?;
        Ok(trace)
    }
}

/// Records a page session for deterministic replay.
pub struct SessionRecorder {
    program: PageProgram<SimulatedPage>,
    sections: Vec<String>,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    frames: u64,
}

impl SessionRecorder {
    /// Start recording over `page`, which will register `sections`.
    #[must_use]
    pub fn new<I, S>(page: SimulatedPage, config: NavConfig, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections: Vec<String> = sections.into_iter().map(Into::into).collect();
        let header = TraceRecord::Header {
            schema_version: SCHEMA_VERSION.to_string(),
            viewport_width: page.viewport_width(),
            viewport_height: page.viewport_height(),
            document_height: page.document_height(),
            sections: sections
                .iter()
                .map(|id| {
                    let extent = page.element_extent(id);
                    TraceSection {
                        id: id.clone(),
                        top: extent.map(|e| e.top),
                        height: extent.map_or(0.0, |e| e.height),
                    }
                })
                .collect(),
        };
        Self {
            program: PageProgram::new(page, config),
            sections,
            records: vec![header],
            checksum_chain: 0,
            frames: 0,
        }
    }

    /// Register sections and record the initial frame.
    pub fn init(&mut self) -> Result<(), NavError> {
        self.program.init(self.sections.iter().cloned())?;
        self.record_frame();
        Ok(())
    }

    /// Record and queue an event.
    pub fn push_event(&mut self, event: PageEvent) {
        self.records.push(TraceRecord::Input {
            ts_ns: nanos(self.program.now()),
            event: event.clone(),
        });
        self.program.push_event(event);
    }

    /// Record and apply a time advance.
    pub fn advance_time(&mut self, dt: Duration) {
        self.program.advance_time(dt);
        self.records.push(TraceRecord::Tick {
            ts_ns: nanos(self.program.now()),
        });
    }

    /// Step the program and record the resulting frame.
    pub fn step(&mut self) -> StepResult {
        let result = self.program.step();
        if result.running {
            self.record_frame();
        }
        result
    }

    /// Finish recording and return the trace.
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_frames: self.frames,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    pub fn program(&self) -> &PageProgram<SimulatedPage> {
        &self.program
    }

    fn record_frame(&mut self) {
        let snapshot = self.program.snapshot();
        let checksum = snapshot_checksum(&snapshot);
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Frame {
            frame_idx: self.frames,
            ts_ns: nanos(self.program.now()),
            active_section: snapshot.active_section,
            scrolled: snapshot.scrolled,
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.frames += 1;
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_frames: u64,
    pub final_checksum_chain: u64,
    /// First frame whose state differed from the recording.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether every frame matched.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// A frame whose checksum differed during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub frame_idx: u64,
    pub expected: u64,
    pub actual: u64,
    /// Active section the recording saw.
    pub expected_active: Option<String>,
    /// Active section the replay produced.
    pub actual_active: Option<String>,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// The trace violates structural invariants.
    InvalidTrace(TraceValidationError),
    /// Section registration failed while rebuilding the page.
    Nav(NavError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidTrace(e) => write!(f, "invalid trace: {e}"),
            Self::Nav(e) => write!(f, "navigation error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<NavError> for ReplayError {
    fn from(e: NavError) -> Self {
        Self::Nav(e)
    }
}

/// Replay `trace` through a fresh program configured with `config`.
///
/// Input and tick records are fed in order; each frame record after the first
/// triggers one step, so event batching matches the recording.
pub fn replay(config: NavConfig, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    trace.validate().map_err(ReplayError::InvalidTrace)?;
    let Some(TraceRecord::Header {
        viewport_width,
        viewport_height,
        document_height,
        sections,
        ..
    }) = trace.records.first()
    else {
        return Err(ReplayError::InvalidTrace(TraceValidationError::MissingHeader));
    };

    let mut page = SimulatedPage::new(*viewport_height);
    page.resize(*viewport_width, *viewport_height);
    page.set_document_height(*document_height);
    for section in sections {
        if let Some(top) = section.top {
            page.insert_element(section.id.clone(), Extent::new(top, section.height));
        }
    }

    let mut program = PageProgram::new(page, config);
    program.init(sections.iter().map(|s| s.id.clone()))?;

    let mut frames: u64 = 0;
    let mut chain: u64 = 0;
    let mut first_mismatch = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { event, .. } => program.push_event(event.clone()),
            TraceRecord::Tick { ts_ns } => program.set_time(Duration::from_nanos(*ts_ns)),
            TraceRecord::Frame {
                frame_idx,
                checksum,
                active_section,
                ..
            } => {
                // Frame 0 was produced by init().
                if frames > 0 {
                    program.step();
                }
                let snapshot = program.snapshot();
                let actual = snapshot_checksum(&snapshot);
                chain = fnv1a64_pair(chain, actual);
                if actual != *checksum && first_mismatch.is_none() {
                    first_mismatch = Some(ReplayMismatch {
                        frame_idx: *frame_idx,
                        expected: *checksum,
                        actual,
                        expected_active: active_section.clone(),
                        actual_active: snapshot.active_section,
                    });
                }
                frames += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_frames: frames,
        final_checksum_chain: chain,
        first_mismatch,
    })
}

/// Error parsing a JSONL trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParseError {
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for TraceParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TraceParseError {}

/// Structural problems found by [`SessionTrace::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceValidationError {
    EmptyTrace,
    MissingHeader,
    HeaderNotFirst,
    MultipleHeaders,
    UnsupportedSchema(String),
    MissingSummary,
    SummaryNotLast { summary_index: usize },
    FrameIndexMismatch { expected: u64, actual: u64 },
    SummaryFrameCountMismatch { expected: u64, actual: u64 },
    SummaryChecksumChainMismatch { expected: u64, actual: u64 },
}

impl core::fmt::Display for TraceValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyTrace => f.write_str("trace is empty"),
            Self::MissingHeader => f.write_str("trace is missing header"),
            Self::HeaderNotFirst => f.write_str("trace header is not the first record"),
            Self::MultipleHeaders => f.write_str("trace contains multiple headers"),
            Self::UnsupportedSchema(v) => write!(f, "unsupported trace schema {v:?}"),
            Self::MissingSummary => f.write_str("trace is missing summary"),
            Self::SummaryNotLast { summary_index } => {
                write!(f, "trace summary at index {summary_index} is not the final record")
            }
            Self::FrameIndexMismatch { expected, actual } => {
                write!(f, "frame index mismatch: expected {expected}, got {actual}")
            }
            Self::SummaryFrameCountMismatch { expected, actual } => write!(
                f,
                "summary frame-count mismatch: expected {expected}, got {actual}"
            ),
            Self::SummaryChecksumChainMismatch { expected, actual } => write!(
                f,
                "summary checksum-chain mismatch: expected {expected:016x}, got {actual:016x}"
            ),
        }
    }
}

impl std::error::Error for TraceValidationError {}

/// Parse or validation failure when loading a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLoadError {
    Parse(TraceParseError),
    Validation(TraceValidationError),
}

impl core::fmt::Display for TraceLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TraceLoadError {}

impl From<TraceParseError> for TraceLoadError {
    fn from(value: TraceParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<TraceValidationError> for TraceLoadError {
    fn from(value: TraceValidationError) -> Self {
        Self::Validation(value)
    }
}
