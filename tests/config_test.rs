// 設定ファイル解析とページ範囲パーサのテスト

use std::io::Write;
use std::path::PathBuf;

use pdf_mono::config::{ColorMode, OverwritePolicy, Settings, load_settings, load_settings_near};
use pdf_mono::pages::parse_page_range;

// ============================================================
// 1. ページ範囲パーサ
// ============================================================

#[test]
fn test_parse_empty_expression_selects_all_pages() {
    assert_eq!(parse_page_range("", 5), vec![0, 1, 2, 3, 4]);
    assert_eq!(parse_page_range("   ", 5), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_parse_single_page() {
    assert_eq!(parse_page_range("1", 1), vec![0]);
    assert_eq!(parse_page_range("5", 10), vec![4]);
}

#[test]
fn test_parse_mixed_terms() {
    assert_eq!(parse_page_range("1-3,5", 10), vec![0, 1, 2, 4]);
    assert_eq!(parse_page_range("1, 3, 5-7", 10), vec![0, 2, 4, 5, 6]);
}

#[test]
fn test_parse_range_clamped_to_document() {
    assert_eq!(parse_page_range("8-20", 10), vec![7, 8, 9]);
}

#[test]
fn test_parse_open_ended_ranges() {
    // 始端省略は1ページ目から、終端省略は最終ページまで
    assert_eq!(parse_page_range("-3", 5), vec![0, 1, 2]);
    assert_eq!(parse_page_range("5-", 10), vec![4, 5, 6, 7, 8, 9]);
    assert_eq!(parse_page_range("-", 3), vec![0, 1, 2]);
}

#[test]
fn test_parse_invalid_terms_are_dropped() {
    assert_eq!(parse_page_range("abc,2", 5), vec![1]);
    assert_eq!(parse_page_range("abc", 5), Vec::<u32>::new());
    assert_eq!(parse_page_range("1,,3", 5), vec![0, 2]);
}

#[test]
fn test_parse_zero_singleton_dropped_but_open_start_kept() {
    // 単独の "0" は範囲外、"-3" の欠けた始端は 1 に補われる
    assert_eq!(parse_page_range("0,-3", 5), vec![0, 1, 2]);
    assert_eq!(parse_page_range("0", 5), Vec::<u32>::new());
}

#[test]
fn test_parse_out_of_range_singleton_dropped() {
    assert_eq!(parse_page_range("99", 5), Vec::<u32>::new());
    assert_eq!(parse_page_range("99,3", 5), vec![2]);
}

#[test]
fn test_parse_reversed_range_contributes_nothing() {
    assert_eq!(parse_page_range("10-5", 20), Vec::<u32>::new());
    assert_eq!(parse_page_range("10-5,2", 20), vec![1]);
}

#[test]
fn test_parse_result_sorted_and_deduplicated() {
    assert_eq!(parse_page_range("3,1,3", 5), vec![0, 2]);
    assert_eq!(parse_page_range("2-4,3-5", 10), vec![1, 2, 3, 4]);
}

#[test]
fn test_parse_whitespace_around_terms() {
    assert_eq!(parse_page_range(" 1 , 3 ", 5), vec![0, 2]);
    assert_eq!(parse_page_range(" 2 - 4 ", 5), vec![1, 2, 3]);
}

#[test]
fn test_parse_empty_document() {
    assert_eq!(parse_page_range("", 0), Vec::<u32>::new());
    assert_eq!(parse_page_range("1-5", 0), Vec::<u32>::new());
}

#[test]
fn test_parse_huge_range_end_clamped() {
    // u32を超える値でもクランプで処理される
    assert_eq!(parse_page_range("1-99999999999", 3), vec![0, 1, 2]);
}

// ============================================================
// 2. Settings 構造体のデシリアライズ
// ============================================================

#[test]
fn test_settings_full_yaml() {
    let yaml = r#"
threshold: 128
dpi: 600
mode: grayscale
quality: 80
page_range: "1-3"
overwrite: skip
output_dir: "/tmp/out"
output_suffix: "_mono"
append_timestamp: true
open_after: true
"#;
    let settings = Settings::from_yaml(yaml).expect("should parse full YAML");
    assert_eq!(settings.threshold, 128);
    assert_eq!(settings.dpi, 600);
    assert_eq!(settings.mode, ColorMode::Grayscale);
    assert_eq!(settings.quality, 80);
    assert_eq!(settings.page_range, "1-3");
    assert_eq!(settings.overwrite, OverwritePolicy::Skip);
    assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/out")));
    assert_eq!(settings.output_suffix, "_mono");
    assert!(settings.append_timestamp);
    assert!(settings.open_after);
}

#[test]
fn test_settings_empty_yaml() {
    // 空YAML（"{}" はserde_ymlで空のマッピングを意味する）
    let settings = Settings::from_yaml("{}").expect("should use defaults for empty YAML");
    assert_eq!(settings.threshold, 180);
    assert_eq!(settings.dpi, 300);
    assert_eq!(settings.mode, ColorMode::Bitonal);
    assert_eq!(settings.quality, 95);
    assert_eq!(settings.page_range, "");
    assert_eq!(settings.overwrite, OverwritePolicy::Ask);
    assert_eq!(settings.output_dir, None);
    assert_eq!(settings.output_suffix, "_SW");
    assert!(!settings.append_timestamp);
    assert!(!settings.open_after);
}

#[test]
fn test_settings_partial_yaml() {
    let yaml = r#"
dpi: 150
"#;
    let settings = Settings::from_yaml(yaml).expect("should fill missing with defaults");
    assert_eq!(settings.dpi, 150);
    // 残りはデフォルト値
    assert_eq!(settings.threshold, 180);
    assert_eq!(settings.mode, ColorMode::Bitonal);
    assert_eq!(settings.quality, 95);
    assert_eq!(settings.output_suffix, "_SW");
}

#[test]
fn test_settings_unknown_mode_fails() {
    let result = Settings::from_yaml("mode: sepia");
    assert!(result.is_err(), "unknown mode should fail to parse");
}

// ============================================================
// 3. 値域チェック
// ============================================================

#[test]
fn test_validate_defaults_ok() {
    Settings::default().validate().expect("defaults should pass");
}

#[test]
fn test_validate_rejects_zero_dpi() {
    let settings = Settings {
        dpi: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_validate_rejects_quality_out_of_range() {
    for quality in [0, 101] {
        let settings = Settings {
            quality,
            ..Settings::default()
        };
        assert!(settings.validate().is_err(), "quality {quality} should fail");
    }
    let settings = Settings {
        quality: 100,
        ..Settings::default()
    };
    settings.validate().expect("quality 100 is valid");
}

// ============================================================
// 4. 列挙型のFromStr / Display
// ============================================================

#[test]
fn test_color_mode_from_str() {
    assert_eq!("bitonal".parse::<ColorMode>().expect("parse"), ColorMode::Bitonal);
    assert_eq!(
        "grayscale".parse::<ColorMode>().expect("parse"),
        ColorMode::Grayscale
    );
    assert!("rgb".parse::<ColorMode>().is_err());
}

#[test]
fn test_overwrite_policy_from_str() {
    assert_eq!("ask".parse::<OverwritePolicy>().expect("parse"), OverwritePolicy::Ask);
    assert_eq!(
        "overwrite".parse::<OverwritePolicy>().expect("parse"),
        OverwritePolicy::Overwrite
    );
    assert_eq!(
        "skip".parse::<OverwritePolicy>().expect("parse"),
        OverwritePolicy::Skip
    );
    assert!("maybe".parse::<OverwritePolicy>().is_err());
}

#[test]
fn test_enum_display_round_trips() {
    for mode in [ColorMode::Bitonal, ColorMode::Grayscale] {
        assert_eq!(mode.to_string().parse::<ColorMode>().expect("parse"), mode);
    }
    for policy in [
        OverwritePolicy::Ask,
        OverwritePolicy::Overwrite,
        OverwritePolicy::Skip,
    ] {
        assert_eq!(
            policy.to_string().parse::<OverwritePolicy>().expect("parse"),
            policy
        );
    }
}

// ============================================================
// 5. pdf_mono.yaml自動検出
// ============================================================

#[test]
fn test_auto_detect_settings_yaml_exists() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let settings_path = dir.path().join("pdf_mono.yaml");

    let mut f = std::fs::File::create(&settings_path).expect("create pdf_mono.yaml");
    f.write_all(b"dpi: 450\n").expect("write settings");

    let settings = load_settings_near(dir.path()).expect("should load settings");
    assert_eq!(settings.dpi, 450);
}

#[test]
fn test_auto_detect_settings_yaml_missing() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let settings = load_settings_near(dir.path()).expect("should return defaults");
    assert_eq!(
        settings.dpi, 300,
        "should use default when pdf_mono.yaml absent"
    );
}

#[test]
fn test_explicit_settings_file_must_exist() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing = dir.path().join("no_such.yaml");

    let result = load_settings(Some(missing.as_path()));
    assert!(result.is_err(), "explicit settings path must exist");
}

#[test]
fn test_explicit_settings_file_loaded() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "threshold: 200\nmode: grayscale\n").expect("write settings");

    let settings = load_settings(Some(path.as_path())).expect("should load");
    assert_eq!(settings.threshold, 200);
    assert_eq!(settings.mode, ColorMode::Grayscale);
}

#[test]
fn test_settings_file_with_invalid_yaml_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "dpi: [not a number\n").expect("write settings");

    assert!(load_settings(Some(path.as_path())).is_err());
}
