use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::ACCEPT, Client};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::datetime::DateRange;
use crate::time_entry::{Project, TimeEntry};

/// ログインAPIのリクエストボディ。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    grant_type: &'a str,
    email: &'a str,
    password: &'a str,
    client_id: &'a str,
}

/// ログインAPIのレスポンス。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

/// My Hours APIのプロジェクト情報をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct MyHoursProject {
    id: i64,
    name: String,
}

/// My Hours APIのactivityレポートの1件。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyHoursLog {
    date: String,
    project_id: Option<i64>,
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default)]
    task_name: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    billable_hours: Option<f64>,
    #[serde(default)]
    start_end_time: Option<String>,
}

impl MyHoursLog {
    fn into_time_entry(self) -> Result<TimeEntry> {
        let date = parse_log_date(&self.date)?;
        if self.project_id.is_none() {
            debug!(
                "Time log on {} has no project: {:?}",
                self.date,
                self.task_name.as_deref().unwrap_or_default()
            );
        }
        Ok(TimeEntry {
            date,
            project_id: self.project_id.unwrap_or_default(),
            project_name: self.project_name.unwrap_or_default(),
            task_name: self.task_name,
            note: self.note,
            tags: self.tags,
            billable_hours: self.billable_hours.unwrap_or_default(),
            start_end_time: self.start_end_time.unwrap_or_default(),
        })
    }
}

/// APIの日付文字列から日付部分を取り出す。
///
/// 時刻やタイムゾーン付きの形式も受け付ける。
fn parse_log_date(s: &str) -> Result<NaiveDate> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse time log date: {}", s))
}

/// 取得したプロジェクトとtime entryのスナップショット。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub entries: Vec<TimeEntry>,
}

/// My Hoursからデータを取得するためのリポジトリ。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MyHoursRepository {
    /// ログインしてアクセストークンを返す。
    async fn login(&self) -> Result<String>;

    /// 全プロジェクトを取得する。
    async fn read_projects(&self, token: &str) -> Result<Vec<Project>>;

    /// 指定した範囲のtime entryを取得する。
    async fn read_time_entries(&self, token: &str, range: &DateRange) -> Result<Vec<TimeEntry>>;
}

/// ログインし、プロジェクトと範囲内のtime entryをまとめて取得する。
pub async fn fetch_snapshot<R: MyHoursRepository + ?Sized>(
    repository: &R,
    range: &DateRange,
) -> Result<Snapshot> {
    let token = repository.login().await.context("Failed to log in to My Hours")?;
    let projects = repository
        .read_projects(&token)
        .await
        .context("Failed to get project list from My Hours")?;
    let entries = repository
        .read_time_entries(&token, range)
        .await
        .context("Failed to retrieve time entries")?;
    info!(
        "Fetched {} projects and {} time entries.",
        projects.len(),
        entries.len()
    );

    Ok(Snapshot { projects, entries })
}

/// My Hours APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = MyHoursClient::new(config);
/// let token = client.login().await?;
/// let projects = client.read_projects(&token).await?;
/// ```
pub struct MyHoursClient {
    client: Client,
    config: Config,
}

impl MyHoursClient {
    /// 新しい`MyHoursClient`を返す。
    pub fn new(config: Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl MyHoursRepository for MyHoursClient {
    async fn login(&self) -> Result<String> {
        let url = self.url("tokens/login");
        let body = LoginRequest {
            grant_type: "password",
            email: &self.config.email,
            password: &self.config.password,
            client_id: "api",
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to My Hours API at {}", url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<LoginResponse>()
            .await
            .context("Failed to deserialize response")?;
        debug!("Logged in as {}", self.config.email);

        Ok(response.access_token)
    }

    async fn read_projects(&self, token: &str) -> Result<Vec<Project>> {
        let url = self.url("Projects/getAll");
        let projects = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to My Hours API at {}", url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<MyHoursProject>>()
            .await
            .context("Failed to deserialize response")?;

        Ok(projects
            .into_iter()
            .map(|project| Project {
                id: project.id,
                name: project.name,
            })
            .collect())
    }

    async fn read_time_entries(&self, token: &str, range: &DateRange) -> Result<Vec<TimeEntry>> {
        let url = self.url("Reports/activity");
        let logs = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .query(&[
                ("DateFrom", range.from.format("%Y-%m-%d").to_string()),
                ("DateTo", range.to.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to My Hours API at {}", url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<MyHoursLog>>()
            .await
            .context("Failed to deserialize response")?;
        info!("length of time logs: {}", logs.len());

        logs.into_iter().map(MyHoursLog::into_time_entry).collect()
    }
}
