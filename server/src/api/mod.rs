pub mod rest;

use crate::album::AlbumService;
use crate::config::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub album: Arc<AlbumService>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let album = AlbumService::new(&config)?;
        Ok(Self {
            config,
            album: Arc::new(album),
        })
    }
}
