use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use super::models::auth::{LoginForm, LoginFormBody, LoginResponse, LogoutResponse};
use crate::error::ClientError;

/// 服务端认证接口
///
/// 会话缓存只关心登录/登出两个端点，其余接口由服务端自行校验会话。
pub trait AuthGateway: Send + Sync {
    fn login(
        &self,
        form: &LoginForm,
    ) -> impl Future<Output = Result<LoginResponse, ClientError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<LogoutResponse, ClientError>> + Send;
}

/// 基于 reqwest 的认证客户端
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AuthGateway for AuthClient {
    async fn login(&self, form: &LoginForm) -> Result<LoginResponse, ClientError> {
        tracing::debug!("POST {}", self.url("/login"));
        let response = self
            .http
            .post(self.url("/login"))
            .form(&LoginFormBody::from(form))
            .send()
            .await?;
        read_json(response).await
    }

    async fn logout(&self) -> Result<LogoutResponse, ClientError> {
        tracing::debug!("GET {}", self.url("/logout"));
        let response = self
            .http
            .get(self.url("/logout"))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        // 服务端登出后可能直接重定向到首页（HTML），同样视为登出成功
        match read_json(response).await {
            Err(ClientError::NotJson(content_type)) => {
                tracing::debug!("Logout answered with {}, using default redirect", content_type);
                Ok(LogoutResponse::default())
            }
            other => other,
        }
    }
}

// 只接受 JSON 响应，登录失败时服务端也会返回带 message 的 JSON；
// 非 2xx 的非 JSON 响应报 UnexpectedStatus，2xx 的报 NotJson
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !content_type.contains("application/json") {
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }
        return Err(ClientError::NotJson(content_type));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))
}
