/// Data layer: core types, loading, cleaning and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → VehicleTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cleaner  │  coerce numerics, drop incomplete rows, derive Vehicle Type
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  viewer selections → visible row indices
///   └──────────┘
/// ```

pub mod cleaner;
pub mod filter;
pub mod loader;
pub mod model;
