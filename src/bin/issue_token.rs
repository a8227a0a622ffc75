//! Issue a token pair against the configured session store.
//!
//! $ cargo run --bin issue_token -- --user-id 232345 --role USER

use boardsignal_auth::api::v1::refresh_cookie;
use boardsignal_auth::domain_model::{Role, Subject};
use boardsignal_auth::server::Server;
use boardsignal_auth::settings::{Parser, parse_settings};
use chrono::Utc;
use serde_json::json;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    settings: Option<String>,
    #[arg(long)]
    user_id: String,
    #[arg(long, default_value = "USER")]
    role: Role,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = parse_settings(args.settings.as_deref())?;
    let server = Server::try_new(&settings).await?;

    let subject = Subject::new(args.user_id, args.role);
    let token = server.auth_service.issue(&subject, Utc::now()).await?;
    let cookie = refresh_cookie(&token.refresh_token_id, server.refresh_ttl, server.cookie_secure);

    let out = json!({
        "accessToken": token.access_token,
        "refreshTokenId": token.refresh_token_id,
        "setCookie": cookie.to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    server.shutdown().await;
    Ok(())
}
