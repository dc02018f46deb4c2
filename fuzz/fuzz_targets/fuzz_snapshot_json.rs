#![no_main]

use installed_apps::InstalledApplicationLister;
use installed_apps::lister::{LabelPolicy, QueryOptions};
use installed_apps::registry::InMemoryRegistry;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(registry) = InMemoryRegistry::from_snapshot_json(s) else {
        return;
    };

    let lister = InstalledApplicationLister::new(Arc::new(registry)).with_options(QueryOptions {
        label_policy: LabelPolicy::PackageNameFallback,
        ..QueryOptions::default()
    });

    // Any parsed snapshot must list without error and without repeated identifiers
    let apps = lister
        .list_installed_applications()
        .expect("fallback policy never fails on a snapshot");
    let distinct: HashSet<&str> = apps.iter().map(|r| r.package_name()).collect();
    assert_eq!(distinct.len(), apps.len());
});
