use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analyze::convert::PdfConverter;
use crate::builder::store::BuilderStore;
use crate::export::raster::DocumentRasterizer;
use crate::platform::{AiClient, BlobStore, KvStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub ai: Arc<dyn AiClient>,
    pub converter: Arc<dyn PdfConverter>,
    pub rasterizer: Arc<dyn DocumentRasterizer>,
    pub builder: Arc<BuilderStore>,
    pub flags: Arc<InFlightFlags>,
}

/// Advisory in-flight flags for export and evaluation. They gate the
/// triggering endpoints, not the operations themselves; single-user
/// execution makes that enough.
#[derive(Default)]
pub struct InFlightFlags {
    exporting: AtomicBool,
    evaluating: AtomicBool,
}

impl InFlightFlags {
    pub fn try_begin_export(&self) -> Option<FlagGuard<'_>> {
        FlagGuard::acquire(&self.exporting)
    }

    pub fn try_begin_evaluation(&self) -> Option<FlagGuard<'_>> {
        FlagGuard::acquire(&self.evaluating)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating.load(Ordering::SeqCst)
    }
}

/// Clears its flag on drop, so the in-flight marker can never leak past
/// the handler, whatever path it exits through.
pub struct FlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(FlagGuard { flag })
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_guard_excludes_and_clears() {
        let flags = InFlightFlags::default();
        let guard = flags.try_begin_export().expect("first acquire");
        assert!(flags.is_exporting());
        assert!(flags.try_begin_export().is_none());
        // evaluation is independent
        assert!(flags.try_begin_evaluation().is_some());

        drop(guard);
        assert!(!flags.is_exporting());
        assert!(flags.try_begin_export().is_some());
    }
}
