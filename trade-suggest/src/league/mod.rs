// League data: tradeable assets, the per-league asset pool, and ingestion of
// raw roster rows into validated assets.

pub mod asset;
pub mod ingest;
pub mod pool;
