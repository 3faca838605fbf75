use std::fmt::{self, Display};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{error, info, warn};
use tokio::task::JoinSet;

use crate::daily_report::{DailyNarrative, DAILY_FILE_NAME};
use crate::datetime::{parse_date, DateRange};
use crate::myhours::{fetch_snapshot, MyHoursRepository, Snapshot};
use crate::overtime_report::{build_overtime_rows, OVERTIME_FILE_NAME};
use crate::project_report::build_project_reports;
use crate::report_writer::{unique_project_file_names, ReportWriter};

/// レポート出力に共通する引数。
#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    #[clap(
        short = 'f',
        long = "from",
        global = true,
        help = "First day of the range in the format YYYY-MM-DD (defaults to the start of this month)",
        parse(try_from_str = parse_date),
    )]
    pub from: Option<NaiveDate>,

    #[clap(
        short = 't',
        long = "to",
        global = true,
        help = "Last day of the range in the format YYYY-MM-DD (defaults to the end of this month)",
        parse(try_from_str = parse_date),
    )]
    pub to: Option<NaiveDate>,

    #[clap(
        short = 'o',
        long = "out-dir",
        global = true,
        default_value = "logs",
        help = "Directory the reports are written to"
    )]
    pub out_dir: PathBuf,
}

/// 出力するレポートの種類。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    Projects,
    Overtime,
    Daily,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Projects, ReportKind::Overtime, ReportKind::Daily];
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Projects => write!(f, "projects"),
            ReportKind::Overtime => write!(f, "overtime"),
            ReportKind::Daily => write!(f, "daily"),
        }
    }
}

/// 1種類のレポートの書き出し結果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSummary {
    pub kind: ReportKind,
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

impl PipelineSummary {
    fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            written: vec![],
            failed: 0,
        }
    }

    fn record(&mut self, result: Result<PathBuf>) {
        match result {
            Ok(path) => self.written.push(path),
            Err(e) => {
                error!("Failed to write {} report: {:#}", self.kind, e);
                self.failed += 1;
            }
        }
    }
}

pub struct ReportCommand<'a, T: MyHoursRepository> {
    repository: &'a T,
}

impl<'a, T: MyHoursRepository> ReportCommand<'a, T> {
    /// 新しい`ReportCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - My Hours APIと通信するためのリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// 指定された種類のレポートを出力する。
    ///
    /// データは1度だけ取得し、各レポートはそのスナップショットから並行して作成する。
    /// 取得に失敗した場合はエラーを返し、何も書き出さない。
    /// 書き出しの失敗はレポートごとに記録し、他のレポートの書き出しは続ける。
    ///
    /// # Arguments
    ///
    /// * `args` - 範囲と出力先
    /// * `kinds` - 出力するレポートの種類
    pub async fn run(&self, args: &ReportArgs, kinds: &[ReportKind]) -> Result<Vec<PipelineSummary>> {
        let range = DateRange::new(args.from, args.to).context("Invalid date range")?;
        info!("From: {}, To: {}", range.from, range.to);

        let snapshot = fetch_snapshot(self.repository, &range)
            .await
            .context("Failed to fetch time logs")?;
        let writer = ReportWriter::new(&args.out_dir);
        info!("Writing reports to {}", writer.output_dir().display());

        let selected = |kind: ReportKind| kinds.contains(&kind);
        let (projects, overtime, daily) = tokio::join!(
            async {
                if selected(ReportKind::Projects) {
                    Some(write_project_reports(&writer, &snapshot).await)
                } else {
                    None
                }
            },
            async {
                if selected(ReportKind::Overtime) {
                    Some(write_overtime_report(&writer, &snapshot).await)
                } else {
                    None
                }
            },
            async {
                if selected(ReportKind::Daily) {
                    Some(write_daily_report(&writer, &snapshot, &range).await)
                } else {
                    None
                }
            },
        );

        let summaries: Vec<PipelineSummary> =
            [projects, overtime, daily].into_iter().flatten().collect();
        for summary in &summaries {
            info!(
                "{} report: {} written, {} failed",
                summary.kind,
                summary.written.len(),
                summary.failed
            );
        }

        Ok(summaries)
    }
}

/// プロジェクトごとのCSVを書き出す。
///
/// 各プロジェクトの書き出しは独立したタスクで並行に行う。
/// ファイル名は他のプロジェクトや他のレポートと重ならないように先に決めておく。
pub async fn write_project_reports(writer: &ReportWriter, snapshot: &Snapshot) -> PipelineSummary {
    let mut summary = PipelineSummary::new(ReportKind::Projects);
    let mut tasks = JoinSet::new();
    let file_names =
        unique_project_file_names(&snapshot.projects, &[OVERTIME_FILE_NAME, DAILY_FILE_NAME]);

    let reports = build_project_reports(&snapshot.projects, &snapshot.entries);
    for (report, file_name) in reports.into_iter().zip(file_names) {
        if report.rows.is_empty() {
            warn!("No time logs for project {}", report.project.name);
        }
        let writer = writer.clone();
        tasks.spawn(async move { writer.write_csv(&file_name, &report.rows).await });
    }

    while let Some(joined) = tasks.join_next().await {
        summary.record(joined.context("Project report task panicked").and_then(|r| r));
    }
    summary.written.sort();

    summary
}

/// 残業のCSVを書き出す。
pub async fn write_overtime_report(writer: &ReportWriter, snapshot: &Snapshot) -> PipelineSummary {
    let mut summary = PipelineSummary::new(ReportKind::Overtime);
    let rows = build_overtime_rows(&snapshot.entries);
    summary.record(writer.write_csv(OVERTIME_FILE_NAME, &rows).await);
    summary
}

/// 日報のテキストを書き出す。
pub async fn write_daily_report(
    writer: &ReportWriter,
    snapshot: &Snapshot,
    range: &DateRange,
) -> PipelineSummary {
    let mut summary = PipelineSummary::new(ReportKind::Daily);
    let narrative = DailyNarrative::build(&snapshot.entries, range);
    summary.record(writer.write_text(DAILY_FILE_NAME, &narrative.to_string()).await);
    summary
}
