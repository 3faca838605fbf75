use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::{info, warn};
use tokio::fs;

use crate::time_entry::{Project, ReportRow};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// レポートをファイルに書き出す。
#[derive(Clone, Debug)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// 新しい`ReportWriter`を返す。
    ///
    /// # Arguments
    ///
    /// * `output_dir` - 出力先のディレクトリ。存在しない場合は書き出し時に作成する。
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 行をヘッダー付きのCSVとして書き出す。
    pub async fn write_csv(&self, file_name: &str, rows: &[ReportRow]) -> Result<PathBuf> {
        let csv = rows_to_csv(rows).with_context(|| format!("Failed to serialize {}", file_name))?;
        self.write_artifact(file_name, &csv).await
    }

    /// テキストを書き出す。
    pub async fn write_text(&self, file_name: &str, text: &str) -> Result<PathBuf> {
        self.write_artifact(file_name, text.as_bytes()).await
    }

    /// 一時ファイルに書いてからリネームし、途中までの内容が残らないようにする。
    ///
    /// 一時ファイル名は書き出しごとに異なる。
    async fn write_artifact(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let path = self.output_dir.join(file_name);
        let tmp_path = self.output_dir.join(format!(
            ".{}.{}-{}.tmp",
            file_name,
            process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp_path, contents)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("Failed to move report to {}", path.display()));
        }
        info!("Wrote {}", path.display());

        Ok(path)
    }
}

/// プロジェクト名からCSVのファイル名を作る。
///
/// パス区切り文字は`_`に置き換える。
pub fn project_file_name(project_name: &str) -> String {
    let name: String = project_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{}.csv", name)
}

/// 各プロジェクトのCSVファイル名を重複しないように決める。
///
/// 先に出現したプロジェクトが`{name}.csv`を使い、重複したものや`reserved`と衝突するものは
/// `{name}-{id}.csv`にする。それでも衝突する場合は連番を付ける。
/// 大文字小文字だけが異なる名前も衝突とみなす。
pub fn unique_project_file_names(projects: &[Project], reserved: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = reserved.iter().map(|name| name.to_lowercase()).collect();

    projects
        .iter()
        .map(|project| {
            let base = project_file_name(&project.name);
            let stem = base.strip_suffix(".csv").unwrap_or(&base).to_string();
            let name = std::iter::once(base)
                .chain(std::iter::once(format!("{}-{}.csv", stem, project.id)))
                .chain((2..).map(|n| format!("{}-{}-{}.csv", stem, project.id, n)))
                .find(|candidate| !taken.contains(&candidate.to_lowercase()))
                .unwrap_or_default();
            if !name.eq_ignore_ascii_case(&project_file_name(&project.name)) {
                warn!(
                    "Project {} ({}) is written to {} to avoid a file name clash",
                    project.name, project.id, name
                );
            }
            taken.insert(name.to_lowercase());
            name
        })
        .collect()
}

/// 行をCSVにする。行が無い場合もヘッダーは出力する。
pub fn rows_to_csv(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(vec![]);
    wtr.write_record(ReportRow::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush csv")
}
