pub mod export;
pub mod game_parse;
pub mod ingest;
pub mod metrics;
pub mod persist;
pub mod roster;
pub mod season;
