/// ページ範囲文字列をパースして0始まりのページ番号ベクタに変換する。
///
/// 形式:
/// - 空文字列 / 空白のみ: 全ページ
/// - 単一ページ: `"5"` (1始まり)
/// - 範囲: `"5-10"` (5〜10ページ)
/// - 端の省略: `"-3"` は 1〜3、`"5-"` は 5〜最終ページ
/// - 混合（カンマ区切り）: `"1, 3, 5-10"`
///
/// 範囲の端は [1, page_count] にクランプされる。数値として読めない断片や
/// 範囲外の単一ページ指定は黙って無視する（式全体は失敗しない）。
/// 単独の `"0"` は範囲外として落ちるが、`"-3"` の欠けた始端は 1 に
/// 補われる。この非対称は意図された仕様。
///
/// 結果はソート済み・重複なし。全断片が無効なら空ベクタを返す。
pub fn parse_page_range(expr: &str, page_count: u32) -> Vec<u32> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return (0..page_count).collect();
    }

    let mut pages: Vec<u32> = Vec::new();

    for term in trimmed.split(',') {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = term.split_once('-') {
            let start_str = start_str.trim();
            let end_str = end_str.trim();

            let start = if start_str.is_empty() {
                Some(1)
            } else {
                start_str.parse::<u64>().ok()
            };
            let end = if end_str.is_empty() {
                Some(u64::from(page_count))
            } else {
                end_str.parse::<u64>().ok()
            };

            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            let start = start.max(1);
            let end = end.min(u64::from(page_count));
            // クランプ後に start > end となった範囲は何も加えない
            for page in start..=end {
                pages.push(page as u32 - 1);
            }
        } else {
            let Ok(page) = term.parse::<u64>() else {
                continue;
            };
            if page >= 1 && page <= u64::from(page_count) {
                pages.push(page as u32 - 1);
            }
        }
    }

    pages.sort_unstable();
    pages.dedup();
    pages
}
