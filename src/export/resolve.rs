//! Background image loading for exports.
//!
//! Root-relative paths (`/images/1.jpg`) are read from the asset directory;
//! `http(s)://` URLs are downloaded when the host is allowed. Decoded images
//! are cached under their normalized source and expire when idle.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use image::DynamicImage;
use reqwest::Url;

use crate::error::TripcardError;

/// Upper bound on decoded images held at once.
pub const MAX_CACHED_IMAGES: usize = 32;

/// Which `http(s)` hosts may be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteImages {
    /// Any host (local CLI use).
    Any,
    /// Only these hosts; empty disables downloads.
    Hosts(Vec<String>),
}

impl RemoteImages {
    fn allows(&self, url: &Url) -> bool {
        match self {
            RemoteImages::Any => true,
            RemoteImages::Hosts(hosts) => url
                .host_str()
                .is_some_and(|host| hosts.iter().any(|h| h.eq_ignore_ascii_case(host))),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedImage {
    image: DynamicImage,
    last_accessed: Instant,
}

/// Where a source points once normalized.
#[derive(Debug, Clone, PartialEq)]
enum ImageSource {
    Local(PathBuf),
    Remote(Url),
}

impl ImageSource {
    fn cache_key(&self) -> String {
        match self {
            ImageSource::Local(path) => format!("file:{}", path.display()),
            ImageSource::Remote(url) => url.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    asset_dir: Option<PathBuf>,
    remote: RemoteImages,
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedImage>>>,
}

impl ImageResolver {
    /// Create a resolver. Without an asset directory, only URLs resolve.
    pub fn new(asset_dir: Option<PathBuf>) -> Result<Self, TripcardError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tripcard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripcardError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            asset_dir,
            remote: RemoteImages::Any,
            http_client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Restrict which hosts remote backgrounds may come from.
    pub fn with_remote_images(mut self, remote: RemoteImages) -> Self {
        self.remote = remote;
        self
    }

    pub fn asset_dir(&self) -> Option<&Path> {
        self.asset_dir.as_deref()
    }

    /// Load and decode `source`, using the cache when possible.
    pub async fn load(&self, source: &str) -> Result<DynamicImage, TripcardError> {
        let resolved = self.resolve(source)?;
        let key = resolved.cache_key();

        if let Some(entry) = self.cache.write().await.get_mut(&key) {
            entry.last_accessed = Instant::now();
            return Ok(entry.image.clone());
        }

        let bytes = match &resolved {
            ImageSource::Remote(url) => self.download(url).await?,
            ImageSource::Local(path) => tokio::fs::read(path).await.map_err(|e| {
                TripcardError::Image(format!("Failed to read {}: {}", path.display(), e))
            })?,
        };

        let image = image::load_from_memory(&bytes)
            .map_err(|e| TripcardError::Image(format!("Failed to decode {}: {}", source, e)))?;
        self.insert(key, image.clone()).await;
        Ok(image)
    }

    /// Like [`load`](Self::load), but a failure is logged and yields `None`.
    pub async fn load_best_effort(&self, source: &str) -> Option<DynamicImage> {
        match self.load(source).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(source, error = %e, "background image unavailable, exporting without it");
                None
            }
        }
    }

    /// Drop images not used for at least `expiration`; returns how many went.
    pub async fn expire(&self, now: Instant, expiration: Duration) -> usize {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|_, entry| now.saturating_duration_since(entry.last_accessed) < expiration);
        before - cache.len()
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn insert(&self, key: String, image: DynamicImage) {
        let mut cache = self.cache.write().await;
        while cache.len() >= MAX_CACHED_IMAGES {
            let Some(oldest) = cache
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            cache.remove(&oldest);
        }
        cache.insert(
            key,
            CachedImage {
                image,
                last_accessed: Instant::now(),
            },
        );
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, TripcardError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TripcardError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(TripcardError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TripcardError::Image(format!("Failed to read image data: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn resolve(&self, source: &str) -> Result<ImageSource, TripcardError> {
        if is_remote(source) {
            let url = Url::parse(source)
                .map_err(|e| TripcardError::Image(format!("invalid image URL {}: {}", source, e)))?;
            if !self.remote.allows(&url) {
                return Err(TripcardError::Image(format!(
                    "remote images from {} are not allowed",
                    url.host_str().unwrap_or("<none>")
                )));
            }
            return Ok(ImageSource::Remote(url));
        }
        self.local_path(source).map(ImageSource::Local)
    }

    /// Map a root-relative source onto the asset directory.
    fn local_path(&self, source: &str) -> Result<PathBuf, TripcardError> {
        let dir = self.asset_dir.as_ref().ok_or_else(|| {
            TripcardError::Image(format!("no asset directory configured for {}", source))
        })?;
        let mut relative = PathBuf::new();
        for component in Path::new(source.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                _ => {
                    return Err(TripcardError::Image(format!("invalid asset path {}", source)));
                }
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(TripcardError::Image(format!("invalid asset path {}", source)));
        }
        Ok(dir.join(relative))
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn temp_assets(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tripcard-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("images")).unwrap();
        dir
    }

    #[test]
    fn local_paths_stay_inside_the_asset_dir() {
        let resolver = ImageResolver::new(Some(PathBuf::from("/srv/assets"))).unwrap();
        assert_eq!(
            resolver.local_path("/images/1.jpg").unwrap(),
            PathBuf::from("/srv/assets/images/1.jpg")
        );
        assert!(resolver.local_path("/images/../../etc/passwd").is_err());
        assert!(ImageResolver::new(None).unwrap().local_path("/images/1.jpg").is_err());
    }

    #[tokio::test]
    async fn loads_and_caches_local_images() {
        let dir = temp_assets("load");
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        img.save(dir.join("images/bg.png")).unwrap();

        let resolver = ImageResolver::new(Some(dir.clone())).unwrap();
        let loaded = resolver.load("/images/bg.png").await.unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));

        // served from cache after the file is gone
        std::fs::remove_file(dir.join("images/bg.png")).unwrap();
        assert!(resolver.load("/images/bg.png").await.is_ok());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn spellings_of_one_file_share_a_cache_entry() {
        let dir = temp_assets("spellings");
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        img.save(dir.join("images/bg.png")).unwrap();

        let resolver = ImageResolver::new(Some(dir.clone())).unwrap();
        for n in 1..=20 {
            let source = format!("{}images{}bg.png", "/".repeat(n), "/".repeat(n));
            resolver.load(&source).await.unwrap();
        }
        assert_eq!(resolver.cached_len().await, 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn idle_images_expire() {
        let dir = temp_assets("expire");
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        img.save(dir.join("images/bg.png")).unwrap();

        let resolver = ImageResolver::new(Some(dir.clone())).unwrap();
        resolver.load("/images/bg.png").await.unwrap();
        let ttl = Duration::from_secs(60);
        assert_eq!(resolver.expire(Instant::now(), ttl).await, 0);
        assert_eq!(resolver.expire(Instant::now() + ttl, ttl).await, 1);
        assert_eq!(resolver.cached_len().await, 0);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn cache_is_bounded() {
        let dir = temp_assets("bounded");
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        for i in 0..MAX_CACHED_IMAGES + 5 {
            img.save(dir.join(format!("images/{}.png", i))).unwrap();
        }

        let resolver = ImageResolver::new(Some(dir.clone())).unwrap();
        for i in 0..MAX_CACHED_IMAGES + 5 {
            resolver.load(&format!("/images/{}.png", i)).await.unwrap();
        }
        assert_eq!(resolver.cached_len().await, MAX_CACHED_IMAGES);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn remote_hosts_must_be_allowed() {
        let resolver = ImageResolver::new(None)
            .unwrap()
            .with_remote_images(RemoteImages::Hosts(vec!["cdn.example.com".into()]));
        let err = resolver.load("http://169.254.169.254/latest/bg.jpg").await.unwrap_err();
        assert!(err.to_string().contains("not allowed"), "{}", err);

        let closed = ImageResolver::new(None)
            .unwrap()
            .with_remote_images(RemoteImages::Hosts(Vec::new()));
        assert!(closed.resolve("https://cdn.example.com/bg.jpg").is_err());
        assert!(matches!(
            resolver.resolve("https://CDN.example.com/bg.jpg"),
            Ok(ImageSource::Remote(_))
        ));
    }

    #[tokio::test]
    async fn failures_are_best_effort() {
        let dir = temp_assets("missing");
        let resolver = ImageResolver::new(Some(dir.clone())).unwrap();
        assert!(resolver.load_best_effort("/images/nope.jpg").await.is_none());
        let _ = std::fs::remove_dir_all(dir);
    }
}
