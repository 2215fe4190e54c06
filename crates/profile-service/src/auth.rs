//! 身份认证
//!
//! 本服务不签发也不解析 Token，只把 Bearer Token 转交身份服务的 `/users/current`，
//! 返回的用户 id 即为当前请求的身份。

use std::time::Duration;

use async_trait::async_trait;
use profile_shared::config::IdentityConfig;
use profile_shared::error::{ProfileError, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// 已认证的调用方，由认证中间件注入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// 只有档案本人才能修改自己的数据
    pub fn ensure_owner(&self, user_id: &str, operation: &str) -> Result<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            warn!(
                caller = %self.user_id,
                target = %user_id,
                operation,
                "拒绝修改他人档案"
            );
            Err(ProfileError::forbidden(operation))
        }
    }
}

/// Token 校验接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 返回 Token 对应的用户 id；Token 无效时返回 Unauthorized
    async fn current_user(&self, token: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    #[serde(default)]
    id: String,
}

/// 身份服务 HTTP 客户端
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProfileError::Internal(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn current_user_url(&self) -> String {
        format!("{}/users/current", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for AuthClient {
    async fn current_user(&self, token: &str) -> Result<String> {
        let response = self
            .http
            .get(self.current_user_url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProfileError::ExternalServiceTimeout {
                        service: "identity".to_string(),
                    }
                } else {
                    ProfileError::ExternalService {
                        service: "identity".to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "身份服务拒绝了 Token");
            return Err(ProfileError::Unauthorized);
        }

        let body: CurrentUserResponse = response.json().await.map_err(|e| {
            ProfileError::ExternalService {
                service: "identity".to_string(),
                message: format!("响应解析失败: {e}"),
            }
        })?;

        if body.id.trim().is_empty() {
            return Err(ProfileError::Unauthorized);
        }

        Ok(body.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        let caller = AuthUser::new("user-1");
        assert!(caller.ensure_owner("user-1", "update_points").is_ok());

        let err = caller.ensure_owner("user-2", "update_points").unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn test_current_user_url_trims_trailing_slash() {
        let client = AuthClient::new(&IdentityConfig {
            base_url: "http://identity:8080/".to_string(),
            timeout_ms: 100,
        })
        .unwrap();
        assert_eq!(client.current_user_url(), "http://identity:8080/users/current");
    }

    #[tokio::test]
    async fn test_unreachable_identity_service_is_an_error() {
        let client = AuthClient::new(&IdentityConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
        })
        .unwrap();

        let err = client.current_user("token").await.unwrap_err();
        assert!(matches!(
            err,
            ProfileError::ExternalService { .. } | ProfileError::ExternalServiceTimeout { .. }
        ));
    }
}
