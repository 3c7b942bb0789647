// pathsafe-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use pathsafe_core::config::{
    self, ConfigOverrides, ExactReplacement, ReplacementMode, RootMode, SanitizerConfig,
};
use pathsafe_core::{PathSanitizer, SanitizationEngine};

#[test]
fn test_load_builtin_presets() {
    let universal = SanitizerConfig::universal().unwrap();
    assert_eq!(universal.name, "universal");
    assert_eq!(universal.root_mode, RootMode::AllowAllRoots);
    assert!(!universal.quick_replacements.is_empty());

    let posix = SanitizerConfig::posix().unwrap();
    assert_eq!(posix.root_mode, RootMode::SeparatorOnly);
    assert!(posix.possible_separators.is_empty());
}

#[test]
fn test_load_from_file() -> Result<()> {
    let yaml_content = r#"
name: archive
fixed_separator: "\\"
possible_separators: ["/"]
root_mode: remove_all_roots
replacement_mode: exact_then_quick
remove_redundant_separators: false
quick_replacements:
  - '#'
exact_replacements:
  - from: " "
    to: "_"
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;

    let config = SanitizerConfig::load_from_file(file.path())?;
    assert_eq!(config.name, "archive");
    assert_eq!(config.fixed_separator, "\\");
    assert_eq!(config.replacement_mode, ReplacementMode::ExactThenQuick);
    assert!(!config.remove_redundant_separators);
    // Fields missing from the file fall back to their defaults.
    assert!(config.auto_rebuild_quick_replacements);
    assert!(!config.fully_qualify);

    let sanitizer = PathSanitizer::new(config)?;
    assert_eq!(sanitizer.sanitize("/data/my #1 file")?, r"data\my_1_file");
    Ok(())
}

#[test]
fn test_load_from_file_rejects_invalid_token() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"quick_replacements:\n  - '[a-'\n")?;
    let err = SanitizerConfig::load_from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("[a-"));
    Ok(())
}

#[test]
fn test_load_from_missing_file_has_context() {
    let err = SanitizerConfig::load_from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_merge_configs_user_overrides() -> Result<()> {
    let base = SanitizerConfig::universal()?;
    let base_token_count = base.quick_replacements.len();
    let user = ConfigOverrides {
        root_mode: Some(RootMode::RemoveAllRoots),
        quick_replacements: vec![base.quick_replacements[0].clone(), "~".to_string()],
        exact_replacements: vec![ExactReplacement::new("&", "and")],
        ..Default::default()
    };

    let merged = config::merge_configs(base, Some(user));
    assert_eq!(merged.name, "universal");
    assert_eq!(merged.root_mode, RootMode::RemoveAllRoots);
    assert_eq!(merged.possible_separators, vec!["\\".to_string()]);
    assert_eq!(merged.quick_replacements.len(), base_token_count + 1);
    assert_eq!(merged.quick_replacements.last().map(String::as_str), Some("~"));
    assert_eq!(merged.exact_replacements, vec![ExactReplacement::new("&", "and")]);
    Ok(())
}

#[test]
fn test_merge_configs_overrides_exact_pairs_in_place() {
    let base = SanitizerConfig {
        exact_replacements: vec![ExactReplacement::new("a", "1"), ExactReplacement::new("b", "2")],
        ..Default::default()
    };
    let user = ConfigOverrides {
        exact_replacements: vec![ExactReplacement::new("a", "9"), ExactReplacement::new("c", "3")],
        ..Default::default()
    };
    let merged = config::merge_configs(base, Some(user));
    let keys: Vec<(&str, &str)> = merged
        .exact_replacements
        .iter()
        .map(|p| (p.from.as_str(), p.to.as_str()))
        .collect();
    assert_eq!(keys, vec![("a", "9"), ("b", "2"), ("c", "3")]);
}

#[test]
fn test_partial_user_file_keeps_preset_policy() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"exact_replacements:\n  - from: \"~\"\n    to: \"-\"\n")?;

    let overrides = ConfigOverrides::load_from_file(file.path())?;
    let merged = config::merge_configs(SanitizerConfig::posix()?, Some(overrides));
    assert_eq!(merged.name, "posix");
    assert_eq!(merged.root_mode, RootMode::SeparatorOnly);
    assert!(merged.possible_separators.is_empty());
    assert_eq!(merged.exact_replacements, vec![ExactReplacement::new("~", "-")]);

    let sanitizer = PathSanitizer::new(merged)?;
    assert_eq!(sanitizer.sanitize(r"C:/a\b")?, r"a\b");
    Ok(())
}

#[test]
fn test_full_config_overrides_every_field() -> Result<()> {
    let posix = SanitizerConfig::posix()?;
    let merged = config::merge_configs(SanitizerConfig::universal()?, Some(posix.clone().into()));
    assert_eq!(merged.root_mode, posix.root_mode);
    assert_eq!(merged.possible_separators, posix.possible_separators);
    assert_eq!(merged.name, "posix");
    Ok(())
}

#[test]
fn test_overrides_file_rejects_invalid_token() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"quick_replacements:\n  - '(open'\n")?;
    let err = ConfigOverrides::load_from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("(open"));
    Ok(())
}

#[test]
fn test_merge_without_user_returns_base() -> Result<()> {
    let base = SanitizerConfig::posix()?;
    let merged = config::merge_configs(base.clone(), None);
    assert_eq!(merged, base);
    Ok(())
}

#[test]
fn test_config_round_trips_through_yaml() -> Result<()> {
    let config = SanitizerConfig::universal()?;
    let yaml = serde_yml::to_string(&config)?;
    let back: SanitizerConfig = serde_yml::from_str(&yaml)?;
    assert_eq!(back, config);
    Ok(())
}
