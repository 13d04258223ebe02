//! Tracing targets used by this crate.
//!
//! Install a `tracing` subscriber in your application to see them:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_glyph::engine=debug")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Engine bring-up, font loading and unloading, rasterization.
    pub const ENGINE: &str = "horizon_lattice_glyph::engine";
    /// Font facade creation and release.
    pub const FONT: &str = "horizon_lattice_glyph::font";
    /// Cache misses in memoizing fonts.
    pub const CACHE: &str = "horizon_lattice_glyph::cache";
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::targets;
    use crate::engine::fake::{self, FakeEngine};
    use crate::{FontCached, LoadOptions};

    #[derive(Clone, Default)]
    struct TargetRecorder(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for TargetRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().push(event.metadata().target().to_string());
        }
    }

    #[test]
    fn events_use_exported_targets() {
        let recorder = TargetRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let engine = Arc::new(FakeEngine::new());
            let mut font =
                FontCached::with_engine(engine, fake::FONT, LoadOptions::default()).unwrap();
            font.rasterize('g', 17.0).unwrap();
            font.release();
        });

        let seen = recorder.0.lock();
        assert!(seen.iter().any(|t| t == targets::FONT));
        assert!(seen.iter().any(|t| t == targets::CACHE));
        assert!(
            seen.iter()
                .all(|t| [targets::ENGINE, targets::FONT, targets::CACHE].contains(&t.as_str()))
        );
    }

    #[test]
    fn targets_share_crate_prefix() {
        for target in [targets::ENGINE, targets::FONT, targets::CACHE] {
            assert!(target.starts_with("horizon_lattice_glyph::"));
        }
    }
}
