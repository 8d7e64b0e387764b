use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use common::config::StorageConfig;
use common::{
    Contest, ContestLink, ContestParticipation, ContestStatus, Profile, Submission, TikTokProfile,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BackendError, Result};

/// Table names of the hosted storage API.
pub mod tables {
    pub const CONTESTS: &str = "contests";
    pub const CONTEST_LINKS: &str = "contest_links";
    pub const CONTEST_PARTICIPANTS: &str = "contest_participants";
    pub const PROFILES: &str = "profiles";
    pub const SUBMISSIONS: &str = "submissions";
    pub const TIKTOK_PROFILES: &str = "tiktok_profiles";
}

/// A read query against one table, rendered as PostgREST query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl TableQuery {
    /// Select every column of `table`.
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            params: vec![("select".into(), "*".into())],
        }
    }

    /// Replace the selected columns, e.g. `joined_at,contests(*)` to embed a relation.
    pub fn select(mut self, columns: &str) -> Self {
        self.params[0].1 = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self
    }

    pub fn is_in<V: Display>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let list = values
            .into_iter()
            .map(|v| quote_list_value(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.into(), format!("in.({list})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{column}.{dir}")));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// PostgREST list values containing reserved characters must be double-quoted.
fn quote_list_value(v: &str) -> String {
    if v.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        v.to_string()
    }
}

/// Read access to the hosted contest tables.
#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Contests whose stored status is one of `statuses`, newest first.
    async fn list_contests(&self, statuses: &[ContestStatus]) -> Result<Vec<Contest>>;

    async fn find_contest(&self, id: Uuid) -> Result<Option<Contest>>;

    /// Every contest entry `user_id` has linked.
    async fn user_submissions(&self, user_id: Uuid) -> Result<Vec<ContestLink>>;

    /// The entry `user_id` linked for one contest, if any.
    async fn user_submission(&self, contest_id: Uuid, user_id: Uuid)
    -> Result<Option<ContestLink>>;

    /// Contests `user_id` registered for, with the contest row embedded, newest first.
    async fn joined_contests(&self, user_id: Uuid) -> Result<Vec<ContestParticipation>>;

    /// Rows of `submissions` owned by `user_id` with the contest name embedded,
    /// newest first.
    async fn profile_submissions(&self, user_id: Uuid) -> Result<Vec<Submission>>;

    async fn tiktok_profile(&self, user_id: Uuid) -> Result<Option<TikTokProfile>>;

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
}

/// [`ContestStore`] backed by a Supabase project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    timeout: Duration,
}

impl SupabaseStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        static APP_USER_AGENT: &str =
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            timeout: config.timeout(),
        })
    }

    /// Run a query and decode every returned row.
    pub async fn select<T: DeserializeOwned>(&self, query: &TableQuery) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.rest_url, query.table());
        debug!(table = query.table(), params = ?query.params(), "Storage query");

        let res = self
            .http
            .get(&url)
            .query(query.params())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BackendError::from_send(e, self.timeout))?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                service: "storage",
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Run a query expected to match at most one row.
    pub async fn maybe_single<T: DeserializeOwned>(&self, query: TableQuery) -> Result<Option<T>> {
        let rows: Vec<T> = self.select(&query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ContestStore for SupabaseStore {
    async fn list_contests(&self, statuses: &[ContestStatus]) -> Result<Vec<Contest>> {
        let query = TableQuery::from(tables::CONTESTS)
            .is_in("status", statuses.iter().map(|s| s.as_str()))
            .order("created_at", false);
        self.select(&query).await
    }

    async fn find_contest(&self, id: Uuid) -> Result<Option<Contest>> {
        self.maybe_single(TableQuery::from(tables::CONTESTS).eq("id", id))
            .await
    }

    async fn user_submissions(&self, user_id: Uuid) -> Result<Vec<ContestLink>> {
        let query = TableQuery::from(tables::CONTEST_LINKS)
            .eq("created_by", user_id)
            .eq("is_contest_submission", true);
        self.select(&query).await
    }

    async fn user_submission(
        &self,
        contest_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ContestLink>> {
        self.maybe_single(
            TableQuery::from(tables::CONTEST_LINKS)
                .eq("contest_id", contest_id)
                .eq("created_by", user_id)
                .eq("is_contest_submission", true),
        )
        .await
    }

    async fn joined_contests(&self, user_id: Uuid) -> Result<Vec<ContestParticipation>> {
        let query = TableQuery::from(tables::CONTEST_PARTICIPANTS)
            .select("joined_at,contests(*)")
            .eq("user_id", user_id)
            .order("joined_at", false);
        self.select(&query).await
    }

    async fn profile_submissions(&self, user_id: Uuid) -> Result<Vec<Submission>> {
        let query = TableQuery::from(tables::SUBMISSIONS)
            .select("*,contests(name)")
            .eq("user_id", user_id)
            .order("created_at", false);
        self.select(&query).await
    }

    async fn tiktok_profile(&self, user_id: Uuid) -> Result<Option<TikTokProfile>> {
        self.maybe_single(TableQuery::from(tables::TIKTOK_PROFILES).eq("user_id", user_id))
            .await
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.maybe_single(TableQuery::from(tables::PROFILES).eq("id", user_id))
            .await
    }
}
