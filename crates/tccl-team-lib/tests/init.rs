//! End-to-end initialization against in-memory team libraries.

use std::path::{Path, PathBuf};

use tccl_core::TcclStatus;
use tccl_core::config::{MalformedNamePolicy, TcclConfig};
use tccl_core::types::{CapabilityDimension, CapabilityRequest, CapabilitySet};
use tccl_team_lib::mock::{MockEvent, MockLoader};
use tccl_team_lib::{OverridePath, PathResolver, ProcessModules, TcclLib, TeamLibError};

fn resolver_for(dir: &Path) -> PathResolver {
    PathResolver::new(vec![Box::new(OverridePath::new(Some(dir.to_path_buf())))])
}

fn repro(mask: u64) -> CapabilitySet {
    CapabilitySet::default().with(CapabilityDimension::Reproducibility, mask)
}

#[test]
fn test_filters_by_reproducibility() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new()
        .with_team_lib("foo", repro(0x1))
        .with_team_lib("bar", repro(0x2));
    loader.write_files(dir.path()).expect("write");

    let config = TcclConfig {
        capabilities: CapabilityRequest::any().with(CapabilityDimension::Reproducibility, 0x1),
        ..Default::default()
    };
    let lib = TcclLib::init_with(&config, &resolver_for(dir.path()), &loader).expect("init");

    assert_eq!(lib.team_libs().names(), vec!["foo"]);
    assert_eq!(lib.lib_path(), dir.path());
    assert_eq!(
        lib.filter_report().disqualified,
        vec![("bar".to_string(), CapabilityDimension::Reproducibility)]
    );
}

#[test]
fn test_unresolvable_path_fails() {
    let resolver = PathResolver::new(vec![
        Box::new(OverridePath::new(None)),
        Box::new(ProcessModules::new("libno-such-core-library.so", "tccl")),
    ]);
    let loader = MockLoader::new().with_team_lib("foo", repro(1));

    let result = TcclLib::init_with(&TcclConfig::default(), &resolver, &loader);
    assert_eq!(TcclStatus::of(&result), TcclStatus::ErrNoMessage);
    let err = result.expect_err("no path");
    assert!(matches!(err, TeamLibError::PathResolution { .. }));
    assert!(err.to_string().contains("TCCL_TEAM_LIB_PATH"));
    assert!(loader.events().is_empty());
}

#[test]
fn test_empty_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("README"), b"").expect("write");

    let err = TcclLib::init_with(&TcclConfig::default(), &resolver_for(dir.path()), &MockLoader::new())
        .expect_err("nothing to load");
    match err {
        TeamLibError::NoPluginsFound { dir: searched } => assert_eq!(searched, dir.path()),
        other => panic!("expected NoPluginsFound, got {other:?}"),
    }
}

#[test]
fn test_only_unloadable_candidates_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new()
        .with_broken_module("a", "wrong ELF class")
        .with_missing_symbol("b");
    loader.write_files(dir.path()).expect("write");

    let err = TcclLib::init_with(&TcclConfig::default(), &resolver_for(dir.path()), &loader)
        .expect_err("nothing usable");
    assert!(matches!(err, TeamLibError::NoPluginsFound { .. }));
    // The module that opened was closed again.
    assert_eq!(
        loader.events(),
        vec![
            MockEvent::Opened(MockLoader::file_name("b")),
            MockEvent::Closed(MockLoader::file_name("b")),
        ]
    );
}

#[test]
fn test_empty_survivor_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new().with_team_lib("foo", repro(0x2));
    loader.write_files(dir.path()).expect("write");

    let mut config = TcclConfig {
        capabilities: CapabilityRequest::any().with(CapabilityDimension::Reproducibility, 0x1),
        ..Default::default()
    };
    let lib = TcclLib::init_with(&config, &resolver_for(dir.path()), &loader).expect("init");
    assert!(lib.is_empty());

    config.require_survivors = true;
    let err = TcclLib::init_with(&config, &resolver_for(dir.path()), &loader).expect_err("strict");
    assert!(matches!(err, TeamLibError::NoPluginsFound { .. }));
}

#[test]
fn test_context_drop_releases_each_team_lib_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new()
        .with_team_lib("foo", repro(1))
        .with_team_lib("bar", repro(1));
    loader.write_files(dir.path()).expect("write");

    let lib = TcclLib::init_with(&TcclConfig::default(), &resolver_for(dir.path()), &loader)
        .expect("init");
    assert_eq!(lib.len(), 2);
    drop(lib);

    for name in ["foo", "bar"] {
        let events = loader.events();
        let finalized = events
            .iter()
            .position(|e| *e == MockEvent::Finalized(name.to_string()))
            .expect("finalized");
        let closed = events
            .iter()
            .position(|e| *e == MockEvent::Closed(MockLoader::file_name(name)))
            .expect("closed");
        assert!(finalized < closed);
        assert_eq!(
            events.iter().filter(|e| **e == MockEvent::Finalized(name.to_string())).count(),
            1
        );
    }
}

#[test]
fn test_bare_prefix_file_does_not_abort_init() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new()
        .with_team_lib("foo", repro(1))
        .with_missing_symbol("");
    loader.write_files(dir.path()).expect("write");

    let lib = TcclLib::init_with(&TcclConfig::default(), &resolver_for(dir.path()), &loader)
        .expect("init");
    assert_eq!(lib.team_libs().names(), vec!["foo"]);
    assert!(loader.events().contains(&MockEvent::Closed(MockLoader::file_name(""))));
}

#[test]
fn test_malformed_candidate_under_skip_policy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new().with_team_lib("foo", repro(1));
    loader.write_files(dir.path()).expect("write");

    // Discovery never yields malformed names, so feed the loader directly.
    let mut registry = tccl_team_lib::TeamLibRegistry::new();
    let candidates = vec![
        PathBuf::from("/tl/libsomething.so"),
        dir.path().join(MockLoader::file_name("foo")),
    ];
    tccl_team_lib::loader::load_all(&loader, candidates, MalformedNamePolicy::Skip, &mut registry)
        .expect("skip");
    assert_eq!(registry.names(), vec!["foo"]);
}

#[test]
fn test_config_override_feeds_default_resolver() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loader = MockLoader::new().with_team_lib("foo", repro(1));
    loader.write_files(dir.path()).expect("write");

    let config = TcclConfig {
        team_lib_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let lib = TcclLib::init_with(&config, &PathResolver::from_config(&config), &loader)
        .expect("init");
    assert_eq!(lib.lib_path(), dir.path());
    assert_eq!(lib.len(), 1);
}
