pub mod aws_session_provider;
pub mod sso_login;
pub mod static_provider;

pub use aws_session_provider::{AwsSessionProvider, DEFAULT_MAX_ATTEMPTS};
pub use sso_login::{SsoLogin, DEFAULT_LOGIN_TIMEOUT};
pub use static_provider::StaticSessionProvider;
