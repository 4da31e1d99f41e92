pub mod settings;

pub use settings::{ColorMode, OverwritePolicy, Settings};

use std::path::Path;

/// カレントディレクトリで自動検出される設定ファイル名。
pub const SETTINGS_FILE_NAME: &str = "pdf_mono.yaml";

/// 設定を読み込む。
///
/// `explicit` が指定されていればそのファイルを読み込み、存在しなければエラー。
/// 未指定の場合はカレントディレクトリの `pdf_mono.yaml` を自動検出し、
/// 存在しなければデフォルト設定を返す。
pub fn load_settings(explicit: Option<&Path>) -> crate::error::Result<Settings> {
    match explicit {
        Some(path) => Settings::from_file(path),
        None => load_settings_near(Path::new(".")),
    }
}

/// 指定ディレクトリから `pdf_mono.yaml` を探して読み込む。
/// 存在しなければデフォルト設定を返す。
pub fn load_settings_near(dir: &Path) -> crate::error::Result<Settings> {
    let settings_path = dir.join(SETTINGS_FILE_NAME);

    if settings_path.exists() {
        Settings::from_file(&settings_path)
    } else {
        Ok(Settings::default())
    }
}
