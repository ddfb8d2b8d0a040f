/// Background jobs
///
/// - `keywords`: keyword extraction queued on Redis and consumed by the
///   `keyword-worker` binary
pub mod keywords;
