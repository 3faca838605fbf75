use crate::clock::hours_to_clock;
use crate::grouping::group_by_key;
use crate::time_entry::{format_report_date, Project, ReportRow, TimeEntry};

/// 1プロジェクト分のレポート。
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectReport {
    pub project: Project,
    pub rows: Vec<ReportRow>,
}

/// 全プロジェクトのレポートを作成する。
///
/// 残業タグの付いたエントリーは含めない。エントリーが無いプロジェクトも空のレポートとして返す。
pub fn build_project_reports(projects: &[Project], entries: &[TimeEntry]) -> Vec<ProjectReport> {
    projects
        .iter()
        .map(|project| ProjectReport {
            project: project.clone(),
            rows: build_project_rows(project, entries),
        })
        .collect()
}

/// 1プロジェクト分の行を日付ごとに集計して作成する。
///
/// 各日付の`Description`はその日の最初のエントリーから取る。
pub fn build_project_rows(project: &Project, entries: &[TimeEntry]) -> Vec<ReportRow> {
    let mapped = entries
        .iter()
        .filter(|entry| entry.project_id == project.id && !entry.is_overtime())
        .map(|entry| {
            let description = match entry.task_name.as_deref() {
                Some(task) if !task.is_empty() => entry.task_description(),
                _ => project.name.clone(),
            };
            (format_report_date(&entry.date), description, entry.billable_hours)
        });

    group_by_key(mapped, |(date, _, _)| date.clone())
        .into_iter()
        .map(|(date, rows)| {
            let hours: f64 = rows.iter().map(|(_, _, hours)| hours).sum();
            let description = rows
                .into_iter()
                .next()
                .map(|(_, description, _)| description)
                .unwrap_or_default();
            ReportRow {
                date,
                description,
                hours: hours_to_clock(hours),
            }
        })
        .collect()
}
