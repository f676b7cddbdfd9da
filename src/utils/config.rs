//! Configuration and constants for the engine and the CLI.

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Maximum gap between two samples of the same frame that still merges them
/// into one call, in microseconds.
pub const SAMPLING_INTERVAL_US: i64 = 200;

/// The only code type a call frame may declare when code types are filtered.
/// Frames without a code type are always allowed.
pub const ALLOWED_CODE_TYPE: &str = "JS";

/// URL prefixes of frames that never show up in samples (browser extensions)
pub const BANNED_URL_PREFIXES: &[&str] = &["chrome-extension://", "extensions::"];

/// Name of the top-level task event used for long-task reporting
pub const RUN_TASK_EVENT: &str = "RunTask";

// Defaults for the analyze command
pub const DEFAULT_HOT_FUNCTION_COUNT: usize = 10;
pub const DEFAULT_LONG_TASK_THRESHOLD_MS: u64 = 50;

/// Which checks the call-frame filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    /// Reject frames whose code type is set and is not `JS`
    pub filter_code_types: bool,

    /// Reject frames whose URL starts with a banned prefix
    pub filter_urls: bool,
}

impl FilterOptions {
    /// Admit every frame.
    pub fn none() -> Self {
        Self::default()
    }

    /// Apply both checks.
    pub fn all() -> Self {
        Self {
            filter_code_types: true,
            filter_urls: true,
        }
    }
}

/// Configuration for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Filter used when admitting chain links into the stack-trace tree
    pub tree_filter: FilterOptions,

    /// Filter used when resolving a sample to its topmost allowed frame
    pub sample_filter: FilterOptions,

    /// Merge gap threshold in microseconds
    pub sampling_interval_us: i64,
}

impl Default for EngineConfig {
    /// Every frame enters the tree; samples walk past filtered frames to
    /// their nearest allowed ancestor.
    fn default() -> Self {
        Self {
            tree_filter: FilterOptions::none(),
            sample_filter: FilterOptions::all(),
            sampling_interval_us: SAMPLING_INTERVAL_US,
        }
    }
}

impl EngineConfig {
    /// Filter frames at tree admission as well as at sample resolution.
    pub fn strict() -> Self {
        Self {
            tree_filter: FilterOptions::all(),
            ..Self::default()
        }
    }

    pub fn with_sample_filter(mut self, filter: FilterOptions) -> Self {
        self.sample_filter = filter;
        self
    }

    pub fn with_tree_filter(mut self, filter: FilterOptions) -> Self {
        self.tree_filter = filter;
        self
    }
}
