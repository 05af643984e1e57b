mod auth;
mod components;
mod cookies;
mod error;
mod layout;
mod markdown;
mod routes;
mod serde_util;

use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr as _;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderValue, Method};
use epistula_client::{ApiError, BackendClient};
use epistula_core::AuthContext;
use snafu::{ResultExt as _, Snafu};
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::CompressionLevel;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

pub const LOG_TARGET: &str = "epistula::web-ui";

/// Items per page on list pages.
pub const PAGE_SIZE: usize = 12;

fn default_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

#[derive(Clone, Debug)]
pub struct Opts {
    pub listen: String,
    pub cors_origin: Option<String>,
    assets_dir: PathBuf,
    pub reuseport: bool,
    pub backend_url: String,
    pub root_email: String,
}

impl Opts {
    pub fn new(
        listen: String,
        cors_origin: Option<String>,
        assets_dir: Option<PathBuf>,
        reuseport: bool,
        backend_url: String,
        root_email: String,
    ) -> Self {
        Self {
            listen,
            cors_origin,
            assets_dir: assets_dir.unwrap_or_else(default_assets_dir),
            reuseport,
            backend_url,
            root_email,
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn cors_origin(&self, listen: SocketAddr) -> Result<HeaderValue, InvalidHeaderValue> {
        match &self.cors_origin {
            Some(origin) => HeaderValue::from_str(origin),
            None => HeaderValue::from_str(&format!("http://{listen}")),
        }
    }
}

pub struct UiState {
    backend: BackendClient,
    opts: Opts,
}

impl UiState {
    /// Backend client acting on behalf of the user of `auth`.
    pub fn backend(&self, auth: &AuthContext) -> BackendClient {
        match auth.token() {
            Some(token) => self.backend.with_token(token),
            None => self.backend.clone(),
        }
    }

    pub fn backend_url(&self) -> &str {
        self.backend.base_url()
    }

    pub fn root_email(&self) -> &str {
        &self.opts.root_email
    }
}

pub type SharedState = Arc<UiState>;

#[derive(Debug, Snafu)]
pub enum WebUiServerError {
    #[snafu(transparent)]
    IO { source: io::Error },
    ListenAddr { source: AddrParseError },
    #[snafu(display("cors_origin does not parse as an http value"))]
    Cors { source: InvalidHeaderValue },
    Backend { source: ApiError },
    #[snafu(display("Server task panicked"))]
    Join { source: tokio::task::JoinError },
}

pub type ServerResult<T> = std::result::Result<T, WebUiServerError>;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
    opts: Opts,
}

impl Server {
    pub async fn init(opts: Opts) -> ServerResult<Server> {
        let listener = Self::get_listener(&opts).await?;

        let backend = BackendClient::builder()
            .base_url(opts.backend_url.clone())
            .build()
            .context(BackendSnafu)?;
        info!(target: LOG_TARGET, backend = %backend.base_url(), "Using backend");

        let state = Arc::new(UiState {
            backend,
            opts: opts.clone(),
        });

        info!(target: LOG_TARGET, addr = %listener.local_addr()?, "Listening");
        Ok(Self {
            listener,
            state,
            opts,
        })
    }

    pub async fn get_listener(opts: &Opts) -> ServerResult<TcpListener> {
        let socket = {
            let addr = SocketAddr::from_str(&opts.listen).context(ListenAddrSnafu)?;

            let socket = if addr.is_ipv4() {
                TcpSocket::new_v4()?
            } else {
                TcpSocket::new_v6()?
            };
            if opts.reuseport {
                #[cfg(unix)]
                socket.set_reuseport(true)?;
            }
            socket.set_nodelay(true)?;

            socket.bind(addr)?;

            socket
        };

        Ok(socket.listen(1024)?)
    }

    pub fn addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    fn router(&self) -> ServerResult<Router> {
        let assets_dir = self.opts.assets_dir();
        let listen = self.addr()?;

        Ok(Router::new()
            .merge(routes::route_handler(self.state.clone()))
            .nest_service("/assets", ServeDir::new(assets_dir))
            .route_service("/sw.js", ServeFile::new(assets_dir.join("sw.js")))
            .layer(axum::middleware::from_fn(routes::cache_control))
            .layer(
                ServiceBuilder::new()
                    .layer(cors_layer(&self.opts, listen)?)
                    .layer(compression_layer())
                    .layer(CookieManagerLayer::new()),
            ))
    }

    /// Serve until Ctrl+C / SIGTERM.
    pub async fn run(self) -> ServerResult<()> {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        let router = self.router()?;

        info!(target: LOG_TARGET, "Starting server");
        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        Ok(())
    }
}

/// A server running in a background task.
pub struct UiServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<ServerResult<()>>,
}

impl UiServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(self) -> ServerResult<()> {
        let _ = self.shutdown.send(());
        self.task.await.context(JoinSnafu)?
    }
}

/// Start the web UI in a background task.
pub async fn start_ui(opts: Opts) -> ServerResult<UiServer> {
    let server = Server::init(opts).await?;
    let addr = server.addr()?;
    let (shutdown, rx) = oneshot::channel();
    let task = tokio::spawn(server.run_until(async move {
        let _ = rx.await;
    }));

    Ok(UiServer {
        addr,
        shutdown,
        task,
    })
}

fn compression_layer() -> CompressionLayer<SizeAbove> {
    CompressionLayer::new()
        .quality(CompressionLevel::Precise(4))
        .compress_when(SizeAbove::new(512))
}

fn cors_layer(opts: &Opts, listen: SocketAddr) -> ServerResult<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
        .allow_origin(opts.cors_origin(listen).context(CorsSnafu)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
