pub mod prelude;

pub mod job_cache;
pub mod jobs;
pub mod search_term_jobs;
pub mod search_terms;
