mod session_provider;

pub use session_provider::{AwsAccount, Session, SessionProvider};
