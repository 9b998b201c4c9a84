/// Event category labels shared across crates
pub const CATEGORY_SCHOOL: &str = "school";
pub const CATEGORY_AFTER_SCHOOL: &str = const_str::concat!("after-", CATEGORY_SCHOOL);
pub const CATEGORY_FAMILY: &str = "family";

/// Timezone used for rendering when none is configured
pub const DEFAULT_RENDERING_TZ: &str = "UTC";

/// Upper bound on occurrences produced by a single expansion
pub const DEFAULT_MAX_INSTANCES: usize = 10_000;
