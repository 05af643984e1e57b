use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use epistula_core::config;

/// Command line options of the Epistula web frontend
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// Global options that apply to all commands
    #[command(flatten)]
    pub global: GlobalOpts,

    /// The specific command to execute
    #[command(subcommand)]
    pub cmd: OptsCmd,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL [default: $NEXT_PUBLIC_BACKEND_URL, $BACKEND_URL or
    /// http://localhost:8000]
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

impl GlobalOpts {
    pub fn backend_url(&self) -> String {
        match self.backend_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => config::backend_url_from_env(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// Serve the web UI
    WebUi(WebUiOpts),

    /// Development and debugging commands
    #[command(subcommand)]
    Dev(DevCmd),
}

#[derive(Debug, Args)]
pub struct WebUiOpts {
    #[arg(long)]
    pub skip_xdg_open: bool,

    /// Listen address
    #[arg(long, short, default_value = "127.0.0.1:3000", env = "EPISTULA_LISTEN")]
    pub listen: String,

    /// Set SO_REUSEPORT
    #[arg(long, env = "EPISTULA_REUSEPORT")]
    pub reuseport: bool,

    /// Cors origin settings
    #[arg(long, env = "EPISTULA_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Root directory of the assets dir
    #[arg(long, env = "EPISTULA_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Email of the root account, shown as the login hint
    /// [default: $NEXT_PUBLIC_ROOT_EMAIL, $EPISTULA_ROOT_EMAIL or
    /// root@localhost.localdomain]
    #[arg(long)]
    pub root_email: Option<String>,
}

pub fn make_web_opts(global: &GlobalOpts, opts: &WebUiOpts) -> epistula_web_ui::Opts {
    epistula_web_ui::Opts::new(
        opts.listen.clone(),
        opts.cors_origin.clone(),
        opts.assets_dir.clone(),
        opts.reuseport,
        global.backend_url(),
        opts.root_email
            .clone()
            .unwrap_or_else(config::root_email_from_env),
    )
}

/// Development and debugging commands
#[derive(Debug, Subcommand)]
pub enum DevCmd {
    /// Show the (unverified) claims of a token and what the UI derives from
    /// them
    DecodeToken {
        token: String,
    },
    /// Log in against the backend and print the token with its claims
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "EPISTULA_ROOT_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
