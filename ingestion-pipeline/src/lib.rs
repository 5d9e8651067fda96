#![allow(clippy::missing_docs_in_private_items)]

pub mod chunker;
pub mod extract;
pub mod pipeline;
pub mod source;

pub use pipeline::{IngestReport, IngestionPipeline, IngestionTuning, RecordFailure};
pub use source::{DrugLabelRecord, LabelBatch};
