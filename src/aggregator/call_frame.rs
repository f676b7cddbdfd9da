//! Call-frame admission filter.
//!
//! Decides whether a stack frame may appear in the reconstructed tree and
//! whether a sample may be attributed to it.

use crate::parser::CallFrame;
use crate::utils::config::{FilterOptions, ALLOWED_CODE_TYPE, BANNED_URL_PREFIXES};

/// Check a call frame against the enabled filter checks
///
/// **Public** - used by the tree builder and the sample collector
///
/// A frame fails when code types are filtered and it declares a code type
/// other than `JS`, or when URLs are filtered and its URL belongs to a
/// browser extension. Frames without a code type or URL pass both checks.
pub fn is_allowed(call_frame: &CallFrame, options: FilterOptions) -> bool {
    if options.filter_code_types && !is_allowed_code_type(call_frame.code_type.as_deref()) {
        return false;
    }

    !(options.filter_urls && is_banned_url(call_frame.url.as_deref()))
}

fn is_allowed_code_type(code_type: Option<&str>) -> bool {
    match code_type {
        None => true,
        Some(code_type) => code_type == ALLOWED_CODE_TYPE,
    }
}

fn is_banned_url(url: Option<&str>) -> bool {
    url.is_some_and(|url| BANNED_URL_PREFIXES.iter().any(|prefix| url.starts_with(prefix)))
}
