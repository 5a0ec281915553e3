pub mod sweep {

    /// Decayed search terms fall back to this count, never below it.
    pub const SEARCH_COUNT_FLOOR: i32 = 1;

    /// Longest accepted staleness or orphan threshold, about a century.
    pub const MAX_THRESHOLD_DAYS: u32 = 36_500;
}
