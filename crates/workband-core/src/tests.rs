use semver::Version;

use super::*;

fn manifest(input: &str) -> WorkloadManifest {
    WorkloadManifest::from_toml_str(input).expect("manifest must parse")
}

#[test]
fn feature_band_truncates_sdk_patch_to_hundred() {
    let version = Version::parse("8.0.203").expect("version must parse");
    let band = FeatureBand::from_sdk_version(&version);
    assert_eq!(band.to_string(), "8.0.200");
}

#[test]
fn feature_band_ignores_prerelease_and_build_metadata() {
    let version = Version::parse("9.0.100-preview.7.24407.12+sha.abc").expect("version must parse");
    let band = FeatureBand::from_sdk_version(&version);
    assert_eq!(band.to_string(), "9.0.100");
}

#[test]
fn feature_band_keeps_exact_hundred_boundary() {
    let version = Version::parse("8.0.100").expect("version must parse");
    assert_eq!(FeatureBand::from_sdk_version(&version).to_string(), "8.0.100");

    let version = Version::parse("8.0.299").expect("version must parse");
    assert_eq!(FeatureBand::from_sdk_version(&version).to_string(), "8.0.200");
}

#[test]
fn feature_band_parses_and_round_trips() {
    let band: FeatureBand = "8.0.400".parse().expect("band must parse");
    assert_eq!(band, FeatureBand::new(8, 0, 400));
    assert_eq!(band.to_string(), "8.0.400");
}

#[test]
fn feature_band_rejects_malformed_input() {
    assert!("8.0".parse::<FeatureBand>().is_err());
    assert!("8.0.100.1".parse::<FeatureBand>().is_err());
    assert!("8.x.100".parse::<FeatureBand>().is_err());
    assert!("".parse::<FeatureBand>().is_err());
}

#[test]
fn feature_band_orders_numerically() {
    let older: FeatureBand = "8.0.200".parse().expect("band must parse");
    let newer: FeatureBand = "8.0.1000".parse().expect("band must parse");
    assert!(older < newer);
}

#[test]
fn parses_manifest_with_workloads_and_packs() {
    let parsed = manifest(
        r#"
id = "sdk.android"
version = "34.0.1"
feature_band = "8.0.100"

[workloads.android]
description = "Android SDK workload"
packs = ["android.sdk", "android.templates"]

[workloads."android-full"]
extends = ["android"]
packs = ["android.emulator"]

[packs."android.sdk"]
version = "34.0.1"
kind = "sdk"
[packs."android.sdk".paths]
"linux-x64" = "packs/android.sdk/linux-x64"
"win-x64" = "packs/android.sdk/win-x64"

[packs."android.templates"]
version = "34.0.1"
kind = "template"

[packs."android.emulator"]
version = "34.0.1"
kind = "tool"
"#,
    );

    assert_eq!(parsed.id, "sdk.android");
    assert_eq!(parsed.feature_band.to_string(), "8.0.100");
    assert_eq!(parsed.workloads.len(), 2);
    assert_eq!(parsed.packs.len(), 3);
    assert!(!parsed.overrides);

    let full = &parsed.workloads["android-full"];
    assert_eq!(full.extends, vec!["android"]);
    assert_eq!(full.packs, vec!["android.emulator"]);

    let sdk_pack = &parsed.packs["android.sdk"];
    assert_eq!(sdk_pack.kind, PackKind::Sdk);
    assert_eq!(
        sdk_pack.path_for_rid("linux-x64"),
        Some("packs/android.sdk/linux-x64")
    );
    assert_eq!(sdk_pack.path_for_rid("osx-arm64"), None);
}

#[test]
fn parses_abstract_workload_marker() {
    let parsed = manifest(
        r#"
id = "sdk.mobile"
version = "1.0.0"
feature_band = "8.0.100"

[workloads."mobile-base"]
abstract = true
packs = ["mobile.runtime"]

[packs."mobile.runtime"]
version = "1.0.0"
kind = "library"
"#,
    );

    assert!(parsed.workloads["mobile-base"].is_abstract);
}

#[test]
fn rejects_workload_that_extends_itself() {
    let err = WorkloadManifest::from_toml_str(
        r#"
id = "sdk.broken"
version = "1.0.0"
feature_band = "8.0.100"

[workloads.android]
extends = ["android"]
"#,
    )
    .expect_err("must reject self-extending workload");
    assert!(err.to_string().contains("extends itself"));
}

#[test]
fn rejects_empty_pack_reference() {
    let err = WorkloadManifest::from_toml_str(
        r#"
id = "sdk.broken"
version = "1.0.0"
feature_band = "8.0.100"

[workloads.android]
packs = [""]
"#,
    )
    .expect_err("must reject empty pack reference");
    assert!(err.to_string().contains("empty pack reference"));
}

#[test]
fn rejects_unknown_pack_kind() {
    let err = WorkloadManifest::from_toml_str(
        r#"
id = "sdk.broken"
version = "1.0.0"
feature_band = "8.0.100"

[packs."some.pack"]
version = "1.0.0"
kind = "firmware"
"#,
    )
    .expect_err("must reject unknown pack kind");
    assert!(err.to_string().contains("failed to parse workload manifest"));
}

#[test]
fn rejects_malformed_feature_band_in_manifest() {
    let err = WorkloadManifest::from_toml_str(
        r#"
id = "sdk.broken"
version = "1.0.0"
feature_band = "8.0"
"#,
    )
    .expect_err("must reject malformed feature band");
    assert!(err.to_string().contains("failed to parse workload manifest"));
}

#[test]
fn overrides_marker_round_trips() {
    let parsed = manifest(
        r#"
id = "sdk.pinned"
version = "2.0.0"
feature_band = "8.0.100"
overrides = true
"#,
    );
    assert!(parsed.overrides);

    let serialized = toml::to_string(&parsed).expect("manifest must serialize");
    let reparsed = manifest(&serialized);
    assert_eq!(parsed, reparsed);
}

#[test]
fn pack_kind_tokens_are_stable() {
    assert_eq!(PackKind::Sdk.as_str(), "sdk");
    assert_eq!(PackKind::Template.as_str(), "template");
    assert_eq!(PackKind::Library.as_str(), "library");
    assert_eq!(PackKind::Tool.as_str(), "tool");
}
