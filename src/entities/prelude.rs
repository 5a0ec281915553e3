pub use super::job_cache::Entity as JobCache;
pub use super::jobs::Entity as Jobs;
pub use super::search_term_jobs::Entity as SearchTermJobs;
pub use super::search_terms::Entity as SearchTerms;
