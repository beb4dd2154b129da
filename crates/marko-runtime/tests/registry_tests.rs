//! Registry behavior tests: lazy resolution, re-registration, pending
//! hydration, and loader fallbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use marko_runtime::{
    ComponentDef, Hydrator, LegacyLoader, Mount, PathLoader, PendingDef, Registry, RegistryError,
};

fn renderer(output: &'static str) -> ComponentDef {
    ComponentDef::from_renderer(Arc::new(move |out: &mut String| out.push_str(output)))
}

fn render(registry: &Registry, type_name: &str) -> String {
    let instance = registry.create(type_name, "c0", false).unwrap();
    let mut out = String::new();
    instance.render(&mut out);
    out
}

#[test]
fn resolve_memoizes_and_tags_the_class() {
    let registry = Registry::new();
    registry.register("app/button.marko", || renderer("<button/>"));

    let class = registry.resolve("app/button.marko", false).unwrap();
    assert_eq!(class.type_name(), Some("app/button.marko"));

    let again = registry.resolve("app/button.marko", false).unwrap();
    assert_eq!(again.type_name(), Some("app/button.marko"));
}

#[test]
fn create_instantiates_with_the_given_id() {
    let registry = Registry::new();
    registry.register("app/button.marko", || renderer("<button/>"));

    let instance = registry.create("app/button.marko", "b4-7", false).unwrap();
    assert_eq!(instance.id, "b4-7");
    assert_eq!(instance.type_name(), Some("app/button.marko"));

    let mut out = String::new();
    instance.render(&mut out);
    assert_eq!(out, "<button/>");
}

#[test]
fn re_registration_discards_the_memoized_class() {
    let registry = Registry::new();
    registry.register("app/button.marko", || renderer("old"));
    assert_eq!(render(&registry, "app/button.marko"), "old");

    registry.register("app/button.marko", || renderer("new"));
    assert_eq!(render(&registry, "app/button.marko"), "new");
}

#[test]
fn factories_are_invoked_lazily_and_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let counted = calls.clone();
    registry.register("app/button.marko", move || {
        counted.fetch_add(1, Ordering::SeqCst);
        renderer("x")
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    registry.resolve("app/button.marko", false).unwrap();
    registry.resolve("app/button.marko", false).unwrap();
    registry.create("app/button.marko", "c1", false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_component_is_a_resolution_error() {
    let registry = Registry::new();
    let err = registry.create("app/missing.marko", "c0", false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Component not found: app/missing.marko"
    );
    assert!(matches!(err, RegistryError::ComponentNotFound(_)));
}

struct CountingHydrator {
    attempts: AtomicUsize,
    mounts: Arc<AtomicUsize>,
}

impl CountingHydrator {
    fn new() -> Self {
        CountingHydrator {
            attempts: AtomicUsize::new(0),
            mounts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Hydrator for CountingHydrator {
    fn try_hydrate(&self, _def: &PendingDef, type_name: &str) -> Option<Mount> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if type_name == "never-mounts" {
            return None;
        }
        let mounts = self.mounts.clone();
        Some(Box::new(move || {
            mounts.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

#[test]
fn pending_defs_are_flushed_exactly_once() {
    let hydrator = Arc::new(CountingHydrator::new());
    let registry = Registry::new().with_hydrator(hydrator.clone());

    registry.add_pending_def(PendingDef::new("w0"), "app/x.marko");
    assert_eq!(hydrator.attempts.load(Ordering::SeqCst), 0);

    registry.register("app/x.marko", || renderer("x"));
    assert_eq!(hydrator.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(hydrator.mounts.load(Ordering::SeqCst), 1);

    // The queue drained: a later registration re-attempts nothing.
    registry.register("app/y.marko", || renderer("y"));
    assert_eq!(hydrator.attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn hydration_attempt_without_a_mount_is_skipped_silently() {
    let hydrator = Arc::new(CountingHydrator::new());
    let registry = Registry::new().with_hydrator(hydrator.clone());

    registry.add_pending_def(PendingDef::new("w0"), "never-mounts");
    registry.register("never-mounts", || renderer("x"));

    assert_eq!(hydrator.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(hydrator.mounts.load(Ordering::SeqCst), 0);
}

#[test]
fn has_pending_def_reports_registration_not_queue_membership() {
    let registry = Registry::new();

    registry.add_pending_def(PendingDef::new("w0"), "app/x.marko");
    assert!(!registry.has_pending_def("app/x.marko"));

    registry.register("app/x.marko", || renderer("x"));
    assert!(registry.has_pending_def("app/x.marko"));
}

struct FixedLoader(&'static str);

impl LegacyLoader for FixedLoader {
    fn load(&self, _type_name: &str) -> Option<ComponentDef> {
        Some(renderer(self.0))
    }
}

impl PathLoader for FixedLoader {
    fn load(&self, _type_name: &str) -> Option<ComponentDef> {
        Some(renderer(self.0))
    }
}

#[test]
fn legacy_mode_falls_back_to_the_legacy_loader() {
    let registry = Registry::new().with_legacy_loader(Arc::new(FixedLoader("legacy")));
    assert_eq!(
        {
            let instance = registry.create("old/widget", "c0", true).unwrap();
            let mut out = String::new();
            instance.render(&mut out);
            out
        },
        "legacy"
    );
    // Without legacy mode there is no path loader, so resolution fails.
    assert!(registry.create("old/widget2", "c0", false).is_err());
}

#[test]
fn path_loader_is_the_last_resort() {
    let registry = Registry::new().with_path_loader(Arc::new(FixedLoader("from-path")));
    assert_eq!(render(&registry, "some/path.marko"), "from-path");
}

#[cfg(debug_assertions)]
#[test]
fn debug_builds_synthesize_a_display_name() {
    let registry = Registry::new();
    registry.register("/components/app-button/index.marko", || renderer("x"));
    let class = registry
        .resolve("/components/app-button/index.marko", false)
        .unwrap();
    assert_eq!(class.display_name(), Some("AppButton"));
}
