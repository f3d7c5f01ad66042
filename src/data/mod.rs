//! Data layer: core types, loading, filtering and querying.
//!
//! Architecture:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  store    │  load once, hand out Arc<Dataset>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  record predicates → filtered indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  query    │  sort / group-by-sum → result table
//!   └──────────┘
//! ```
pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
pub mod store;
