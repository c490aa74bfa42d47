//! Data layer: frame types, loading, filtering and statistics.
//!
//! Architecture:
//! ```text
//!   .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → Vec<FrameRecord>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────┐
//!   │ FrameSeries │  offset-trimmed frames, windowed queries
//!   └─────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  IntervalFilter (VAD) → FilteredFrameSeries
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats   │  mean / std / range per field
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
