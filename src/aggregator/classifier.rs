//! Static classification of known trace-event names.
//!
//! Only the category matters to the engine: it decides which complete
//! events act as merge boundaries. Labels are carried for presentation.

use serde::{Deserialize, Serialize};

/// Coarse category of a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Other,
    Load,
    Parse,
    V8,
    Js,
    Gc,
    Layout,
    Paint,
}

/// Categories whose events samples are never merged across
pub const BOUNDARY_CATEGORIES: &[Category] = &[Category::Other, Category::V8, Category::Js, Category::Gc];

impl Category {
    /// Whether events of this category split merged calls
    pub fn is_boundary(self) -> bool {
        BOUNDARY_CATEGORIES.contains(&self)
    }
}

/// Category and display label of a known event name
pub fn lookup(name: &str) -> Option<(Category, &'static str)> {
    use Category::*;

    let known = match name {
        "Program" => (Other, "Other"),
        "RunTask" => (Other, "Run Task"),
        "AsyncTask" => (Other, "Async Task"),
        "XHRLoad" => (Load, "Load"),
        "XHRReadyStateChange" => (Load, "ReadyStateChange"),
        "ParseHTML" => (Parse, "Parse HTML"),
        "ParseAuthorStyleSheet" => (Parse, "Parse StyleSheet"),
        "V8.CompileScript" => (V8, "Compile Script"),
        "V8.CompileCode" => (V8, "Compile Code"),
        "V8.CompileModule" => (V8, "Compile Module"),
        "V8.OptimizeCode" => (V8, "Optimize"),
        "v8.wasm.streamFromResponseCallback" => (Js, "Streaming Wasm Response"),
        "v8.wasm.compiledModule" => (Js, "Compiled Wasm Module"),
        "v8.wasm.cachedModule" => (Js, "Cached Wasm Module"),
        "v8.wasm.moduleCacheHit" => (Js, "Wasm Module Cache Hit"),
        "v8.wasm.moduleCacheInvalid" => (Js, "Wasm Module Cache Invalid"),
        "RunMicrotasks" => (Js, "Run Microtasks"),
        "EvaluateScript" => (Js, "Evaluate Script"),
        "FunctionCall" => (Js, "Function Call"),
        "EventDispatch" => (Js, "Event"),
        "RequestMainThreadFrame" => (Js, "Request Main Thread Frame"),
        "RequestAnimationFrame" => (Js, "Request Animation Frame"),
        "CancelAnimationFrame" => (Js, "Cancel Animation Frame"),
        "FireAnimationFrame" => (Js, "Animation Frame"),
        "RequestIdleCallback" => (Js, "Request Idle Callback"),
        "CancelIdleCallback" => (Js, "Cancel Idle Callback"),
        "FireIdleCallback" => (Js, "Idle Callback"),
        "TimerInstall" => (Js, "Timer Installed"),
        "TimerRemove" => (Js, "Timer Removed"),
        "TimerFire" => (Js, "Timer Fired"),
        "WebSocketCreate" => (Js, "Create WebSocket"),
        "WebSocketSendHandshakeRequest" => (Js, "Send WebSocket Handshake"),
        "WebSocketReceiveHandshakeResponse" => (Js, "Receive WebSocket Handshake"),
        "WebSocketDestroy" => (Js, "Destroy WebSocket"),
        "DoEncrypt" => (Js, "Crypto Encrypt"),
        "DoEncryptReply" => (Js, "Crypto Encrypt Reply"),
        "DoDecrypt" => (Js, "Crypto Decrypt"),
        "DoDecryptReply" => (Js, "Crypto Decrypt Reply"),
        "DoDigest" => (Js, "Crypto Digest"),
        "DoDigestReply" => (Js, "Crypto Digest Reply"),
        "DoSign" => (Js, "Crypto Sign"),
        "DoSignReply" => (Js, "Crypto Sign Reply"),
        "DoVerify" => (Js, "Crypto Verify"),
        "DoVerifyReply" => (Js, "Crypto Verify Reply"),
        "GCEvent" => (Gc, "GC"),
        "BlinkGC.AtomicPhase" => (Gc, "DOM GC"),
        "V8.GCIncrementalMarking" => (Gc, "Incremental GC"),
        "MajorGC" => (Gc, "Major GC"),
        "MinorGC" => (Gc, "Minor GC"),
        "ScheduleStyleRecalculation" => (Layout, "Schedule Recalculate Style"),
        "RecalculateStyles" => (Layout, "Recalculate Style"),
        "Layout" => (Layout, "Layout"),
        "UpdateLayoutTree" => (Layout, "Recalculate Style"),
        "InvalidateLayout" => (Layout, "Invalidate Layout"),
        "LayoutInvalidationTracking" => (Layout, "Layout Invalidation"),
        "ComputeIntersections" => (Paint, "Compute Intersections"),
        "HitTest" => (Layout, "Hit Test"),
        "PrePaint" => (Layout, "Pre-Paint"),
        "ScrollLayer" => (Paint, "Scroll"),
        "UpdateLayer" => (Paint, "Update Layer"),
        "PaintSetup" => (Paint, "Paint Setup"),
        "Paint" => (Paint, "Paint"),
        "PaintImage" => (Paint, "Paint Image"),
        "Commit" => (Paint, "Commit"),
        "CompositeLayers" => (Paint, "Composite Layers"),
        "RasterTask" => (Paint, "Raster"),
        "ImageDecodeTask" => (Paint, "Decode Image Task"),
        "ImageUploadTask" => (Paint, "Upload Image Task"),
        "Decode Image" => (Paint, "Decode Image"),
        "Resize Image" => (Paint, "Resize Image"),
        "Draw LazyPixelRef" => (Paint, "Draw LazyPixelRef"),
        "Decode LazyPixelRef" => (Paint, "Decode LazyPixelRef"),
        "GPUTask" => (Paint, "GPU Task"),
        _ => return None,
    };
    Some(known)
}

/// Category of an event name, `Other` when the name is unknown
pub fn category(name: &str) -> Category {
    lookup(name).map_or(Category::Other, |(category, _)| category)
}

/// Display label of an event name, the name itself when unknown
pub fn label(name: &str) -> &str {
    lookup(name).map_or(name, |(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert_eq!(category("RunTask"), Category::Other);
        assert_eq!(category("V8.CompileCode"), Category::V8);
        assert_eq!(category("FunctionCall"), Category::Js);
        assert_eq!(category("MinorGC"), Category::Gc);
        assert_eq!(category("Layout"), Category::Layout);
        assert_eq!(category("Paint"), Category::Paint);
        assert_eq!(category("ParseHTML"), Category::Parse);
        assert_eq!(category("XHRLoad"), Category::Load);
    }

    #[test]
    fn test_unknown_defaults_to_other() {
        assert_eq!(category("SomethingNew"), Category::Other);
        assert!(category("SomethingNew").is_boundary());
    }

    #[test]
    fn test_boundary_membership() {
        assert!(Category::Js.is_boundary());
        assert!(Category::Gc.is_boundary());
        assert!(!Category::Layout.is_boundary());
        assert!(!Category::Paint.is_boundary());
        assert!(!Category::Load.is_boundary());
        assert!(!Category::Parse.is_boundary());
    }

    #[test]
    fn test_labels() {
        assert_eq!(label("RunTask"), "Run Task");
        assert_eq!(label("Custom"), "Custom");
    }
}
