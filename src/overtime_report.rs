use crate::clock::hours_to_clock;
use crate::time_entry::{format_report_date, ReportRow, TimeEntry};

/// 残業レポートのファイル名。
pub const OVERTIME_FILE_NAME: &str = "Extra.csv";

/// 残業タグの付いたエントリーを1件1行でレポートにする。
///
/// 日付でのまとめは行わず、取得した順に並べる。
pub fn build_overtime_rows(entries: &[TimeEntry]) -> Vec<ReportRow> {
    entries
        .iter()
        .filter(|entry| entry.is_overtime())
        .map(|entry| ReportRow {
            date: format_report_date(&entry.date),
            description: entry.task_description(),
            hours: hours_to_clock(entry.billable_hours),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_overtime_rows;
    use crate::project_report::build_project_rows;
    use crate::time_entry::fixtures::entry;
    use crate::time_entry::{Project, ReportRow, TimeEntry};

    fn overtime(date: &str, task: &str, hours: f64) -> TimeEntry {
        let mut e = entry(date, (1, "P"), Some(task), hours);
        e.tags = Some("Overtime".to_string());
        e
    }

    #[test]
    fn test_overtime_entry_becomes_row() {
        let entries = vec![overtime("2023-01-03", "OT1", 1.0)];

        let rows = build_overtime_rows(&entries);

        assert_eq!(
            rows,
            vec![ReportRow {
                date: "03-01-2023".to_string(),
                description: "OT1 ".to_string(),
                hours: "1:00:00".to_string(),
            }]
        );
    }

    /// 同じ日の残業でもまとめず、取得順のまま出力する。
    #[test]
    fn test_overtime_rows_are_not_grouped() {
        let mut noted = overtime("2023-01-03", "OT2", 0.5);
        noted.note = Some("deploy".to_string());
        let entries = vec![
            overtime("2023-01-04", "OT1", 1.0),
            entry("2023-01-03", (1, "P"), Some("A"), 8.0),
            noted,
            overtime("2023-01-04", "OT3", 2.0),
        ];

        let rows = build_overtime_rows(&entries);
        let descriptions: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();

        assert_eq!(descriptions, vec!["OT1 ", "OT2 deploy", "OT3 "]);
        assert_eq!(rows[1].hours, "0:30:00");
    }

    /// 全エントリーはプロジェクトレポートと残業レポートのどちらか一方にだけ入る。
    #[test]
    fn test_entries_are_partitioned_between_reports() {
        let project = Project {
            id: 1,
            name: "P".to_string(),
        };
        let mut tagged = entry("2023-01-05", (1, "P"), Some("C"), 1.0);
        tagged.tags = Some("Billable".to_string());
        let entries = vec![
            entry("2023-01-02", (1, "P"), Some("A"), 1.0),
            overtime("2023-01-03", "OT1", 1.0),
            entry("2023-01-04", (1, "P"), Some("B"), 1.0),
            tagged,
            overtime("2023-01-06", "OT2", 1.0),
        ];

        let project_rows = build_project_rows(&project, &entries);
        let overtime_rows = build_overtime_rows(&entries);

        assert_eq!(project_rows.len() + overtime_rows.len(), entries.len());
        for row in &overtime_rows {
            assert!(project_rows.iter().all(|p| p.date != row.date));
        }
    }
}
