mod cli;

use std::io;

use clap::Parser;
use cli::{Opts, make_web_opts};
use duct::cmd;
use epistula_client::{ApiError, BackendClient};
use epistula_core::{AuthContext, TokenClaims, config};
use epistula_util_error::WhateverResult;
use epistula_web_ui::{Server, WebUiServerError};
use serde_json::json;
use snafu::{FromString, ResultExt, Snafu, Whatever};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "epistula::cli";

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("WebUI Server error: {source}"))]
    WebUiServer { source: WebUiServerError },
    #[snafu(display("Backend error: {source}"))]
    Backend { source: ApiError },
    #[snafu(display("Miscellaneous error: {source}"))]
    Whatever { source: Whatever },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[snafu::report]
#[tokio::main]
async fn main() -> CliResult<()> {
    init_logging().context(WhateverSnafu)?;

    let opts = Opts::parse();
    let v = handle_cmd(opts).await?;
    if !v.is_null() {
        println!("{}", serde_json::to_string_pretty(&v).expect("Can't fail"));
    }
    Ok(())
}

async fn handle_cmd(opts: Opts) -> CliResult<serde_json::Value> {
    Ok(match opts.cmd {
        cli::OptsCmd::Dev(cmd) => match cmd {
            cli::DevCmd::DecodeToken { token } => describe_token(token),
            cli::DevCmd::Login { email, password } => {
                let email = email.unwrap_or_else(config::root_email_from_env);
                let client = BackendClient::builder()
                    .base_url(opts.global.backend_url())
                    .build()
                    .context(BackendSnafu)?;

                let token = client.login(&email, &password).await.context(BackendSnafu)?;
                info!(target: LOG_TARGET, %email, "Logged in");

                describe_token(token)
            }
        },
        cli::OptsCmd::WebUi(ref web_opts) => {
            let server = Server::init(make_web_opts(&opts.global, web_opts))
                .await
                .context(WebUiServerSnafu)?;

            if !web_opts.skip_xdg_open {
                if cmd!(
                    "xdg-open",
                    format!("http://{}", server.addr().context(WebUiServerSnafu)?)
                )
                .run()
                .is_err()
                {
                    warn!(target: LOG_TARGET, "Failed to open browser");
                };
            }

            server.run().await.context(WebUiServerSnafu)?;

            serde_json::Value::Null
        }
    })
}

fn describe_token(token: String) -> serde_json::Value {
    let claims = TokenClaims::decode(&token).map(TokenClaims::into_map);
    let auth = AuthContext::from_token(Some(token));

    json!({
        "claims": claims,
        "user_id": auth.user_id(),
        "is_root": auth.is_root(),
        "token": auth.token(),
    })
}

pub fn init_logging() -> WhateverResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| Whatever::without_source("Failed to initialize logging".to_string()))?;

    Ok(())
}
