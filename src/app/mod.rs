pub mod serve;

// re-export
pub use serve::{router, serve};

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::AppConfig, mailchimp::ListClient, MailchimpClient, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
    pub static_dir: PathBuf,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener, static_dir: PathBuf) -> Self {
        App {
            app_state,
            listener,
            static_dir,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let mc_config = config.mailchimp_config;
        let creds = mc_config.credentials()?;

        let list_client = MailchimpClient::new(
            mc_config.api_base_url(&creds.server),
            creds.list_id,
            creds.api_key,
            mc_config.timeout(),
        )?;
        info!(
            "{:<20} - {}",
            "Mailchimp API:",
            list_client.url.as_str()
        );
        let app_state = AppState::new(list_client);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener, config.net_config.static_dir);
        Ok(app)
    }
}

pub struct InternalState {
    pub list_client: Box<dyn ListClient>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(list_client: impl ListClient + 'static) -> Self {
        AppState(Arc::new(InternalState {
            list_client: Box::new(list_client),
        }))
    }
}
