//! Property tests for specifier classification, version ordering and
//! coordinate construction.

use proptest::prelude::*;
use setup_mandrel_core::artifact::{artifact_identifier, download_url, tool_name};
use setup_mandrel_core::tools::{Arch, Os, Platform};
use setup_mandrel_core::{ReleaseVersion, ToolchainConfig, VersionSpecifier};

fn components(min: usize, max: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..1000, min..=max)
}

fn dotted(parts: &[u64]) -> String {
    parts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn config() -> impl Strategy<Value = ToolchainConfig> {
    (
        prop_oneof![Just(Os::Linux), Just(Os::Macos), Just(Os::Windows)],
        prop_oneof![Just(Arch::Amd64), Just(Arch::Aarch64)],
    )
        .prop_map(|(os, arch)| ToolchainConfig::mandrel(Platform::new(os, arch)))
}

proptest! {
    #[test]
    fn short_dotted_strings_are_prefixes(parts in components(1, 3)) {
        let raw = dotted(&parts);
        let classified = VersionSpecifier::classify(&raw, "mandrel-").unwrap();
        prop_assert_eq!(classified, VersionSpecifier::Prefix(raw));
    }

    #[test]
    fn long_dotted_strings_are_fully_qualified(parts in components(4, 6)) {
        let raw = dotted(&parts);
        let classified = VersionSpecifier::classify(&raw, "mandrel-").unwrap();
        prop_assert!(!classified.needs_lookup());
        prop_assert_eq!(classified.as_str(), raw.as_str());
    }

    #[test]
    fn ordering_follows_numeric_components(a in components(3, 5), b in components(3, 5)) {
        let va = ReleaseVersion::parse(&dotted(&a)).unwrap();
        let vb = ReleaseVersion::parse(&dotted(&b)).unwrap();
        prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
    }

    #[test]
    fn prerelease_sorts_below_release(parts in components(3, 4), pre in "[a-z]{1,8}") {
        let release = ReleaseVersion::parse(&dotted(&parts)).unwrap();
        let candidate = ReleaseVersion::parse(&format!("{}-{pre}", dotted(&parts))).unwrap();
        prop_assert!(candidate < release);
    }

    #[test]
    fn tool_name_excludes_version_and_arch(
        config in config(),
        parts in components(4, 4),
        java in 8u32..40,
    ) {
        let version = format!("{}-Final", dotted(&parts));
        let java = java.to_string();
        let name = tool_name(&config, &java);
        prop_assert!(!name.contains(&version));
        prop_assert!(!name.contains(&config.platform.arch.to_string()));
        prop_assert_eq!(name, tool_name(&config, &java));
    }

    #[test]
    fn download_url_shape(config in config(), parts in components(4, 4), java in 8u32..40) {
        let version = dotted(&parts);
        let identifier = artifact_identifier(&config, &version, &java.to_string());
        let url = download_url(&config, &version, &identifier);
        let expected_prefix = format!("{}/mandrel-{version}/", config.download_base);
        prop_assert!(url.starts_with(&expected_prefix));
        prop_assert!(url.ends_with(config.file_extension()));
        prop_assert!(url.contains(&identifier));
    }
}
