use std::fmt::{self, Display};

use chrono::NaiveDate;

use crate::clock::hours_to_clock;
use crate::datetime::{is_weekend, DateRange};
use crate::grouping::group_by_key;
use crate::markdown::markdown_to_text;
use crate::time_entry::{format_report_date, TimeEntry};

/// 日報のファイル名。
pub const DAILY_FILE_NAME: &str = "logs-to-send.txt";

const SEPARATOR: &str = "------------------------------";

/// 日報全体。日付の新しい順に並ぶ。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyNarrative {
    pub days: Vec<DayBlock>,
}

/// 1日分のブロック。
#[derive(Clone, Debug, PartialEq)]
pub struct DayBlock {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub projects: Vec<ProjectBlock>,
}

/// 1日の中の1プロジェクト分のブロック。
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectBlock {
    pub name: String,
    pub total_hours: f64,
    pub tasks: Vec<TaskBlock>,
}

/// 同じtask名のエントリーをまとめたブロック。
#[derive(Clone, Debug, PartialEq)]
pub struct TaskBlock {
    pub lines: Vec<TaskLine>,
    /// 最初のエントリーのnoteをプレーンテキストにしたもの。
    pub note: Option<String>,
}

/// エントリー1件分の行。
#[derive(Clone, Debug, PartialEq)]
pub struct TaskLine {
    pub task_name: String,
    pub start_end_time: String,
    pub has_note: bool,
}

impl DailyNarrative {
    /// 指定した範囲のエントリーから日報を組み立てる。
    ///
    /// 土日はブロックを作らない。エントリーが無い平日も合計0のブロックになる。
    pub fn build(entries: &[TimeEntry], range: &DateRange) -> Self {
        let days = range
            .days_desc()
            .filter(|day| !is_weekend(day))
            .map(|day| {
                let day_entries: Vec<&TimeEntry> =
                    entries.iter().filter(|entry| entry.date == day).collect();
                DayBlock::build(day, day_entries)
            })
            .collect();

        Self { days }
    }
}

impl DayBlock {
    fn build(date: NaiveDate, entries: Vec<&TimeEntry>) -> Self {
        let total_hours = sum_hours(&entries);
        let projects = group_by_key(entries, |entry| entry.project_name.clone())
            .into_iter()
            .map(|(name, entries)| ProjectBlock::build(name, entries))
            .collect();

        Self {
            date,
            total_hours,
            projects,
        }
    }
}

impl ProjectBlock {
    fn build(name: String, entries: Vec<&TimeEntry>) -> Self {
        let total_hours = sum_hours(&entries);
        let tasks = group_by_key(entries, |entry| entry.task_name.clone())
            .into_iter()
            .map(|(_, entries)| TaskBlock::build(&entries))
            .collect();

        Self {
            name,
            total_hours,
            tasks,
        }
    }
}

impl TaskBlock {
    fn build(entries: &[&TimeEntry]) -> Self {
        let lines = entries
            .iter()
            .map(|entry| TaskLine {
                task_name: entry.task_name.clone().unwrap_or_default(),
                start_end_time: entry.start_end_time.clone(),
                has_note: entry.note.is_some(),
            })
            .collect();
        // 2件目以降のnoteは使わない
        let note = entries
            .first()
            .and_then(|entry| entry.note.as_deref())
            .map(markdown_to_text);

        Self { lines, note }
    }
}

fn sum_hours(entries: &[&TimeEntry]) -> f64 {
    entries.iter().map(|entry| entry.billable_hours).sum()
}

impl Display for DailyNarrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.days.iter().try_for_each(|day| write!(f, "{}", day))
    }
}

impl Display for DayBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Date: {} [{}]",
            format_report_date(&self.date),
            hours_to_clock(self.total_hours)
        )?;
        writeln!(f, "{}", SEPARATOR)?;
        for project in &self.projects {
            write!(f, "{}", project)?;
        }
        write!(f, " \n\n")
    }
}

impl Display for ProjectBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: [{}] ", self.name, hours_to_clock(self.total_hours))?;
        for task in &self.tasks {
            write!(f, "{}", task)?;
        }
        Ok(())
    }
}

impl Display for TaskBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            let prefix = if line.has_note { "" } else { "- " };
            writeln!(f, "{}{} [{}]", prefix, line.task_name, line.start_end_time)?;
        }
        writeln!(f, "{}", self.note.as_deref().unwrap_or_default())
    }
}
