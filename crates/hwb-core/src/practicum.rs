//! Practicum homework status API client.
//!
//! `GET <endpoint>?from_date=<ts>` with `Authorization: OAuth <token>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{ports::HomeworkSource, utils::truncate_text, Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

const ERROR_BODY_MAX: usize = 200;

#[derive(Clone, Debug)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    fn connection_error(&self, from_date: i64, e: reqwest::Error) -> Error {
        Error::ApiConnection {
            url: self.endpoint.clone(),
            from_date,
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<serde_json::Value> {
        tracing::info!(url = %self.endpoint, from_date, "requesting homework statuses");

        let resp = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.connection_error(from_date, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::IncorrectAnswer {
                status: status.as_u16(),
                body: truncate_text(&body, ERROR_BODY_MAX),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| self.connection_error(from_date, e))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("API response is not JSON: {e}")))
    }
}
