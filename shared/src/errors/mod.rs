//! Business error codes and their localized texts

use crate::types::Language;

/// Machine-readable business codes returned in the `code` field of every response
pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const SERVER_ERROR: i32 = 10001;
    pub const TOO_MANY_REQUESTS: i32 = 10002;
    pub const AUTHORIZATION_ERROR: i32 = 10003;
    pub const PARAM_BIND_ERROR: i32 = 10004;
    pub const TOKEN_EXPIRED: i32 = 10005;
    pub const REFRESH_TOKEN_ERROR: i32 = 10012;
    pub const SERVICE_UNAVAILABLE: i32 = 10016;
}

/// Human-readable text for a business code
pub fn code_text(code: i32, lang: Language) -> &'static str {
    use error_codes::*;

    match (code, lang) {
        (SUCCESS, Language::Chinese) => "成功",
        (SUCCESS, Language::English) => "Success",
        (SERVER_ERROR, Language::Chinese) => "服务器错误",
        (SERVER_ERROR, Language::English) => "Internal server error",
        (TOO_MANY_REQUESTS, Language::Chinese) => "请求发送过多",
        (TOO_MANY_REQUESTS, Language::English) => "Too many requests",
        (AUTHORIZATION_ERROR, Language::Chinese) => "token验证失败",
        (AUTHORIZATION_ERROR, Language::English) => "Token verification failed",
        (PARAM_BIND_ERROR, Language::Chinese) => "参数无效",
        (PARAM_BIND_ERROR, Language::English) => "Invalid parameters",
        (TOKEN_EXPIRED, Language::Chinese) => "token过期",
        (TOKEN_EXPIRED, Language::English) => "Token expired or not yet valid",
        (REFRESH_TOKEN_ERROR, Language::Chinese) => "刷新token失败",
        (REFRESH_TOKEN_ERROR, Language::English) => "Refresh token invalid",
        (SERVICE_UNAVAILABLE, Language::Chinese) => "服务暂不可用",
        (SERVICE_UNAVAILABLE, Language::English) => "Service temporarily unavailable",
        (_, Language::Chinese) => "未知错误",
        (_, Language::English) => "Unknown error",
    }
}
