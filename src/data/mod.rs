//! Data layer: core types, loading, row selection and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawRecord → AppRecord (bad rows dropped)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<AppRecord>, read-only
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐      ┌───────────┐
//!   │ aggregate │ ───▶ │  filter    │  allowlist / rated-only indices
//!   └──────────┘      └───────────┘
//!        │
//!        ▼
//!   derived tables (per chart)
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
