mod auth;
mod health_check;

pub use auth::{
    current_session, login, refresh_token, register_candidate, register_company,
    REFRESH_TOKEN_COOKIE,
};
pub use health_check::health_check;
