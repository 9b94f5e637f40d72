//! Encoding options, and their process-wide default.

use std::sync::atomic::{AtomicBool, Ordering};

/// The process-wide default of [`EncodeOptions::empty_variant_as_object`].
///
/// This is shared by every union and every thread:
/// while one thread holds an [`AmbientGuard`], encodes on all other threads see its setting too.
/// Callers wanting per-call behavior pass [`EncodeOptions`] explicitly instead.
static EMPTY_VARIANT_AS_OBJECT: AtomicBool = AtomicBool::new(false);

/// Options affecting how union values are encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Encode payload-less variants of externally tagged unions as `{wire_name: null}`
    /// rather than as the bare string `wire_name`.
    pub empty_variant_as_object: bool,
}

impl EncodeOptions {
    /// Returns the options currently in effect for the process.
    ///
    /// Read at each encode, never captured when a codec is built.
    pub fn ambient() -> Self {
        Self {
            empty_variant_as_object: EMPTY_VARIANT_AS_OBJECT.load(Ordering::Acquire),
        }
    }
}

/// Restores the previous process-wide default when dropped.
#[must_use = "the setting is reverted as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AmbientGuard {
    previous: bool,
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        EMPTY_VARIANT_AS_OBJECT.store(self.previous, Ordering::Release);
    }
}

/// Sets whether payload-less variants of externally tagged unions
/// encode as `{wire_name: null}`, for as long as the returned guard lives.
///
/// ```ignore
/// let _guard = always_serialize_empty_as_object(true);
/// assert_eq!(ts.encode(&bar)?, json!({"Bar": null}));
/// ```
pub fn always_serialize_empty_as_object(enabled: bool) -> AmbientGuard {
    let previous = EMPTY_VARIANT_AS_OBJECT.swap(enabled, Ordering::AcqRel);
    log::debug!("empty variants encode as objects: {enabled} (was {previous})");
    AmbientGuard { previous }
}
