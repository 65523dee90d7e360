use hbsd_extattr::{MemoryStore, StoreOp};
use hbsd_pax::{
    ControlOptions, FeatureControl, FeatureDescriptor, FeatureRegistry, FeatureStatus, PaxError,
    Polarity, ResolvedState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BIN: &str = "/usr/local/bin/firefox";

fn setup() -> (Arc<MemoryStore>, FeatureControl<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::new());
    store.add_file(BIN);
    let control = FeatureControl::new(Arc::clone(&store), ControlOptions::default());
    (store, control)
}

#[test]
fn enable_attribute_alone_reports_enabled() {
    let (store, control) = setup();
    store.insert_raw(BIN, "hbsd.pax.aslr", b"1");

    let states = control.list(Path::new(BIN)).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].feature(), "aslr");
    assert_eq!(states[0].resolved, ResolvedState::Enabled);
}

#[test]
fn both_attributes_set_reports_conflict() {
    let (store, control) = setup();
    store.insert_raw(BIN, "hbsd.pax.noaslr", b"1");
    store.insert_raw(BIN, "hbsd.pax.aslr", b"1");

    let states = control.list(Path::new(BIN)).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].resolved, ResolvedState::Conflict);
}

#[test]
fn disable_writes_both_attributes_then_reads_disabled() {
    let (store, control) = setup();
    let file = Path::new(BIN);

    control.set_state(file, "segvguard", Polarity::Disable).unwrap();

    let journal = store.journal();
    assert_eq!(journal.len(), 2);
    assert!(journal.contains(&StoreOp::Set {
        file: PathBuf::from(BIN),
        attribute: "hbsd.pax.segvguard".to_owned(),
        value: 0,
    }));
    assert!(journal.contains(&StoreOp::Set {
        file: PathBuf::from(BIN),
        attribute: "hbsd.pax.nosegvguard".to_owned(),
        value: 1,
    }));

    let states = control.list(file).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].feature(), "segvguard");
    assert_eq!(states[0].resolved, ResolvedState::Disabled);
}

#[test]
fn reset_deletes_both_and_omits_feature() {
    let (store, control) = setup();
    let file = Path::new(BIN);
    store.insert_raw(BIN, "hbsd.pax.mprotect", b"1");
    store.insert_raw(BIN, "hbsd.pax.aslr", b"1");

    control.reset(file, "mprotect").unwrap();

    assert_eq!(
        store.journal(),
        vec![
            StoreOp::Delete { file: PathBuf::from(BIN), attribute: "hbsd.pax.nomprotect".to_owned() },
            StoreOp::Delete { file: PathBuf::from(BIN), attribute: "hbsd.pax.mprotect".to_owned() },
        ]
    );
    let names: Vec<_> = control.list(file).unwrap().iter().map(|s| s.feature().to_owned()).collect();
    assert_eq!(names, ["aslr"]);
    assert_eq!(control.status(file, "mprotect").unwrap(), FeatureStatus::Unset);
}

#[test]
fn unrelated_attributes_coexist() {
    let (store, control) = setup();
    store.insert_raw(BIN, "md5", b"d41d8cd98f00b204e9800998ecf8427e");
    store.insert_raw(BIN, "hbsd.pax.ASLR", b"1");
    store.insert_raw(BIN, "hbsd.pax.nopageexec", b"1");

    let states = control.list(Path::new(BIN)).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].feature(), "pageexec");
    assert_eq!(states[0].resolved, ResolvedState::Disabled);
}

#[test]
fn half_applied_mutation_reads_back_as_conflict() {
    let (store, control) = setup();
    let file = Path::new(BIN);
    control.set_state(file, "shlibrandom", Polarity::Disable).unwrap();

    store.fail_writes_to("hbsd.pax.noshlibrandom");
    let err = control.set_state(file, "shlibrandom", Polarity::Enable).unwrap_err();
    assert!(matches!(err, PaxError::AttributeStore { .. }));

    assert_eq!(
        control.status(file, "shlibrandom").unwrap(),
        FeatureStatus::Resolved(ResolvedState::Conflict)
    );
}

#[test]
fn reset_all_clears_every_feature() {
    let (store, control) = setup();
    let file = Path::new(BIN);
    for feature in ["aslr", "pageexec", "disallow_map32bit"] {
        control.set_state(file, feature, Polarity::Enable).unwrap();
    }
    store.insert_raw(BIN, "user.keep", b"x");

    control.reset_all(file).unwrap();

    assert!(control.list(file).unwrap().is_empty());
    assert_eq!(store.attribute_names(file), ["user.keep"]);
}

#[test]
fn custom_registry() {
    let registry = FeatureRegistry::new([FeatureDescriptor::new(
        "nx",
        "example.nonx",
        "example.nx",
    )])
    .unwrap();
    let store = MemoryStore::new();
    store.insert_raw(BIN, "example.nonx", b"1");
    store.insert_raw(BIN, "hbsd.pax.aslr", b"1");

    let control = FeatureControl::with_registry(&store, registry, ControlOptions::default());
    let states = control.list(Path::new(BIN)).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].feature(), "nx");
    assert_eq!(states[0].resolved, ResolvedState::Disabled);
    assert!(matches!(control.reset(Path::new(BIN), "aslr"), Err(PaxError::UnknownFeature { .. })));
}
