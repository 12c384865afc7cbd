/// Once-only loading of the player platform
use super::PlayerPlatform;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Loads the embeddable player capability (script injection, FFI, ...)
#[async_trait]
pub trait PlatformLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn PlayerPlatform>>;
}

/// Hands out the player platform, loading it at most once
///
/// Concurrent callers wait on the same load. A failed load is cached too, so
/// the platform stays unavailable for the lifetime of the provider.
pub struct PlatformProvider {
    loader: Box<dyn PlatformLoader>,
    platform: OnceCell<Option<Arc<dyn PlayerPlatform>>>,
}

impl PlatformProvider {
    pub fn new(loader: impl PlatformLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            platform: OnceCell::new(),
        }
    }

    /// Provider that is already loaded with `platform`
    pub fn ready(platform: Arc<dyn PlayerPlatform>) -> Self {
        Self {
            loader: Box::new(Preloaded(platform.clone())),
            platform: OnceCell::new_with(Some(Some(platform))),
        }
    }

    /// Load the platform if needed and return it, or `None` when unavailable
    pub async fn ensure_loaded(&self) -> Option<Arc<dyn PlayerPlatform>> {
        self.platform
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(platform) => {
                        info!("🎬 Player platform loaded: {}", platform.name());
                        Some(platform)
                    }
                    Err(e) => {
                        warn!("❌ Player platform failed to load: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether a load has completed, successfully or not
    pub fn is_initialized(&self) -> bool {
        self.platform.initialized()
    }
}

struct Preloaded(Arc<dyn PlayerPlatform>);

#[async_trait]
impl PlatformLoader for Preloaded {
    async fn load(&self) -> Result<Arc<dyn PlayerPlatform>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SimulatedLoader;

    #[tokio::test]
    async fn test_concurrent_waiters_share_one_load() {
        let loader = SimulatedLoader::new();
        let loads = loader.load_counter();
        let provider = Arc::new(PlatformProvider::new(loader));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.ensure_loaded().await.is_some() })
            })
            .collect();

        for result in futures::future::join_all(waiters).await {
            assert!(result.unwrap());
        }
        assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_load_is_cached() {
        let loader = SimulatedLoader::failing();
        let loads = loader.load_counter();
        let provider = PlatformProvider::new(loader);

        assert!(provider.ensure_loaded().await.is_none());
        assert!(provider.ensure_loaded().await.is_none());
        assert_eq!(loads.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
