use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 変換モード。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 白黒2値 (CCITT G4)
    Bitonal,
    /// グレースケール (JPEG)
    Grayscale,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Bitonal => write!(f, "bitonal"),
            ColorMode::Grayscale => write!(f, "grayscale"),
        }
    }
}

impl FromStr for ColorMode {
    type Err = crate::error::PdfMonoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bitonal" => Ok(ColorMode::Bitonal),
            "grayscale" => Ok(ColorMode::Grayscale),
            other => Err(crate::error::PdfMonoError::config(format!(
                "Unknown mode '{other}' (expected 'bitonal' or 'grayscale')"
            ))),
        }
    }
}

/// 出力ファイルが既に存在する場合の動作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// ホストに上書き確認を問い合わせる
    Ask,
    /// 常に上書きする
    Overwrite,
    /// スキップして次のファイルへ進む
    Skip,
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Ask => write!(f, "ask"),
            OverwritePolicy::Overwrite => write!(f, "overwrite"),
            OverwritePolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for OverwritePolicy {
    type Err = crate::error::PdfMonoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ask" => Ok(OverwritePolicy::Ask),
            "overwrite" => Ok(OverwritePolicy::Overwrite),
            "skip" => Ok(OverwritePolicy::Skip),
            other => Err(crate::error::PdfMonoError::config(format!(
                "Unknown overwrite policy '{other}' (expected 'ask', 'overwrite' or 'skip')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 2値化しきい値 (0-255)。この値未満の画素が黒になる。
    pub threshold: u8,
    pub dpi: u32,
    pub mode: ColorMode,
    /// グレースケールモードのJPEG品質 (1-100)。
    pub quality: u8,
    /// ページ範囲式。空文字列は全ページ。
    pub page_range: String,
    pub overwrite: OverwritePolicy,
    /// 出力先ディレクトリ。未指定なら入力ファイルと同じディレクトリ。
    pub output_dir: Option<PathBuf>,
    pub output_suffix: String,
    pub append_timestamp: bool,
    pub open_after: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            threshold: 180,
            dpi: 300,
            mode: ColorMode::Bitonal,
            quality: 95,
            page_range: String::new(),
            overwrite: OverwritePolicy::Ask,
            output_dir: None,
            output_suffix: "_SW".to_string(),
            append_timestamp: false,
            open_after: false,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::PdfMonoError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 値域チェック。しきい値はu8で常に有効。
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.dpi == 0 {
            return Err(crate::error::PdfMonoError::config(
                "dpi must be a positive integer",
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(crate::error::PdfMonoError::config(format!(
                "quality must be 1-100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}
