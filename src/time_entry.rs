use chrono::NaiveDate;
use serde::Serialize;

/// 残業として扱うエントリーに付与されるタグ。
pub const OVERTIME_TAG: &str = "Overtime";

/// My Hoursから取得した1件のtime entry。
#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub project_id: i64,
    pub project_name: String,
    pub task_name: Option<String>,
    pub note: Option<String>,
    pub tags: Option<String>,
    pub billable_hours: f64,
    pub start_end_time: String,
}

impl TimeEntry {
    /// 残業タグが付いているかを返す。
    ///
    /// タグ文字列全体が`Overtime`と一致する場合のみ残業とみなす。
    pub fn is_overtime(&self) -> bool {
        self.tags.as_deref() == Some(OVERTIME_TAG)
    }

    /// CSVの`Description`列に使う`{task} {note}`形式の文字列を返す。
    pub fn task_description(&self) -> String {
        format!(
            "{} {}",
            self.task_name.as_deref().unwrap_or_default(),
            self.note.as_deref().unwrap_or_default()
        )
    }
}

/// My Hoursのプロジェクト。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// CSVレポートの1行。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Hours")]
    pub hours: String,
}

impl ReportRow {
    /// CSVのヘッダー行。
    pub const HEADERS: [&'static str; 3] = ["Date", "Description", "Hours"];
}

/// CSVやレポートで使う`dd-MM-yyyy`形式に日付を変換する。
pub fn format_report_date(date: &NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}
