use std::env;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, REFERER};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use url::Url;

use prep_core::model::Credentials;

use crate::error::SyncError;

pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";

/// Page size used by both syncs.
pub const SYNC_BATCH_SIZE: usize = 50;

const QUESTION_LIST_QUERY: &str = r"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(
    categorySlug: $categorySlug
    limit: $limit
    skip: $skip
    filters: $filters
  ) {
    total: totalNum
    questions: data {
      title
      status
      isPaidOnly
    }
  }
}
";

const USER_STATUS_QUERY: &str = r"
query globalData {
  userStatus {
    username
    isSignedIn
    isPremium
  }
}
";

/// Which slice of the remote question list to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    /// Every question; used to learn premium flags.
    All,
    /// Questions with an accepted submission on the account.
    Solved,
}

impl ListFilter {
    fn variables(self) -> Value {
        match self {
            Self::All => json!({}),
            Self::Solved => json!({ "status": "AC" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
    pub filter: ListFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuestion {
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_paid_only: bool,
}

impl RemoteQuestion {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: None,
            is_paid_only: false,
        }
    }

    #[must_use]
    pub fn paid_only(mut self, paid: bool) -> Self {
        self.is_paid_only = paid;
        self
    }
}

/// One page of the remote list. `total` is absent when the server omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPage {
    pub total: Option<usize>,
    pub items: Vec<RemoteQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_signed_in: bool,
    #[serde(default)]
    pub is_premium: bool,
}

impl UserProfile {
    /// Username, only when the account is actually signed in.
    #[must_use]
    pub fn signed_in_username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|name| self.is_signed_in && !name.trim().is_empty())
    }
}

/// Authenticated, paginated access to the remote question list.
#[async_trait]
pub trait QuestionListSource: Send + Sync {
    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` on transport failures, non-success statuses or
    /// server-reported query errors.
    async fn fetch_page(
        &self,
        credentials: &Credentials,
        request: PageRequest,
    ) -> Result<QuestionPage, SyncError>;

    /// Ask the remote who the credential belongs to.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`QuestionListSource::fetch_page`].
    async fn fetch_user_profile(&self, credentials: &Credentials)
    -> Result<UserProfile, SyncError>;
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub endpoint: Url,
    pub referer: String,
}

impl RemoteConfig {
    /// Build a config for `endpoint`; the referer is the endpoint's origin.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidEndpoint` if `endpoint` is not a URL.
    pub fn new(endpoint: &str) -> Result<Self, SyncError> {
        let endpoint = Url::parse(endpoint)?;
        let referer = endpoint.origin().ascii_serialization();
        Ok(Self { endpoint, referer })
    }

    /// Read `PREP_API_URL`, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidEndpoint` if the variable is not a URL.
    pub fn from_env() -> Result<Self, SyncError> {
        let endpoint = env::var("PREP_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.into());
        Self::new(endpoint.trim())
    }
}

/// GraphQL client for the remote question list.
#[derive(Clone)]
pub struct LeetCodeClient {
    client: Client,
    config: RemoteConfig,
}

impl LeetCodeClient {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_client(client: Client, config: RemoteConfig) -> Self {
        Self { client, config }
    }

    async fn post<T>(
        &self,
        credentials: &Credentials,
        payload: &GraphQlRequest<'_>,
    ) -> Result<T, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header(COOKIE, cookie_header(credentials))
            .header("x-csrftoken", credentials.csrf())
            .header(REFERER, &self.config.referer)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }

        let body: GraphQlResponse<T> = response.json().await?;
        if let Some(first) = body.errors.and_then(|errs| errs.into_iter().next()) {
            return Err(SyncError::Remote(first.message));
        }
        body.data.ok_or(SyncError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionListSource for LeetCodeClient {
    async fn fetch_page(
        &self,
        credentials: &Credentials,
        request: PageRequest,
    ) -> Result<QuestionPage, SyncError> {
        let payload = GraphQlRequest {
            query: QUESTION_LIST_QUERY,
            variables: Some(json!({
                "categorySlug": "",
                "limit": request.limit,
                "skip": request.skip,
                "filters": request.filter.variables(),
            })),
        };
        let data: QuestionListData = self.post(credentials, &payload).await?;
        let list = data.problemset_question_list.unwrap_or_default();
        Ok(QuestionPage {
            total: list.total,
            items: list.questions.unwrap_or_default(),
        })
    }

    async fn fetch_user_profile(
        &self,
        credentials: &Credentials,
    ) -> Result<UserProfile, SyncError> {
        let payload = GraphQlRequest {
            query: USER_STATUS_QUERY,
            variables: None,
        };
        let data: UserStatusData = self.post(credentials, &payload).await?;
        Ok(data.user_status.unwrap_or_default())
    }
}

/// The raw cookie string wins; otherwise session and CSRF cookies are built.
fn cookie_header(credentials: &Credentials) -> String {
    credentials.all_cookies().map_or_else(
        || {
            format!(
                "LEETCODE_SESSION={}; csrftoken={}",
                credentials.session(),
                credentials.csrf()
            )
        },
        str::to_owned,
    )
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionListData {
    problemset_question_list: Option<QuestionListBody>,
}

#[derive(Debug, Default, Deserialize)]
struct QuestionListBody {
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    questions: Option<Vec<RemoteQuestion>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatusData {
    user_status: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_prefers_raw_cookies() {
        let creds = Credentials::new("s", "c").unwrap();
        assert_eq!(cookie_header(&creds), "LEETCODE_SESSION=s; csrftoken=c");
        let creds = creds.with_all_cookies("a=1; b=2");
        assert_eq!(cookie_header(&creds), "a=1; b=2");
    }

    #[test]
    fn referer_is_endpoint_origin() {
        let config = RemoteConfig::new("https://leetcode.com/graphql").unwrap();
        assert_eq!(config.referer, "https://leetcode.com");
        assert!(RemoteConfig::new("not a url").is_err());
    }

    #[test]
    fn question_list_payload_decodes() {
        let raw = r#"{
            "data": {"problemsetQuestionList": {
                "total": 2,
                "questions": [
                    {"title": "A", "status": "ac", "isPaidOnly": false},
                    {"title": "B", "status": null, "isPaidOnly": null}
                ]
            }}
        }"#;
        let body: GraphQlResponse<QuestionListData> = serde_json::from_str(raw).unwrap();
        let list = body.data.unwrap().problemset_question_list.unwrap();
        assert_eq!(list.total, Some(2));
        let questions = list.questions.unwrap();
        assert_eq!(questions[0].status.as_deref(), Some("ac"));
        assert!(!questions[1].is_paid_only);
    }

    #[test]
    fn graphql_errors_decode() {
        let raw = r#"{"data": null, "errors": [{"message": "rate limited"}]}"#;
        let body: GraphQlResponse<QuestionListData> = serde_json::from_str(raw).unwrap();
        assert_eq!(body.errors.unwrap()[0].message, "rate limited");
    }

    #[test]
    fn profile_username_requires_sign_in() {
        let profile = UserProfile {
            username: Some("alice".into()),
            is_signed_in: false,
            is_premium: false,
        };
        assert_eq!(profile.signed_in_username(), None);
        let profile = UserProfile {
            is_signed_in: true,
            ..profile
        };
        assert_eq!(profile.signed_in_username(), Some("alice"));
    }

    #[test]
    fn filters_match_wire_format() {
        assert_eq!(ListFilter::Solved.variables(), json!({"status": "AC"}));
        assert_eq!(ListFilter::All.variables(), json!({}));
    }
}
