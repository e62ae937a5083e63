pub mod celestrak;
pub mod ingest;
pub mod local;
pub mod sink;
pub mod spacetrack;
pub mod tle;
