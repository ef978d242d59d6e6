//! Application configuration management.
//!
//! Values are layered: built-in defaults, then `config/default`, then
//! `config/{RUN_MODE}`, then `IMAGEBOARD__*` environment variables. Secrets
//! (S3 keys, database and redis passwords, the cookie secret) are expected to
//! arrive through the last layer.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable prefix for overrides, e.g. `IMAGEBOARD__S3__BUCKET`.
pub const ENV_PREFIX: &str = "IMAGEBOARD";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment mode; drives storage backend selection.
    pub environment: Environment,
    /// Site identity.
    pub site: SiteConfig,
    /// API bind and public address.
    pub api: ApiConfig,
    /// Local storage paths.
    pub storage: StorageSettings,
    /// CDN base URLs for stored files.
    pub cdn: CdnConfig,
    /// S3 credentials and buckets.
    pub s3: S3Config,
    /// Database connection.
    pub database: DatabaseConfig,
    /// Redis connection.
    pub redis: RedisConfig,
    /// Image proxy.
    pub proxy: ProxyConfig,
    /// Content limits.
    pub limits: LimitsConfig,
    /// Hashing and session settings.
    pub security: SecurityConfig,
    /// User account settings.
    pub users: UsersConfig,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; files go to the local filesystem.
    #[default]
    #[serde(alias = "dev")]
    Development,
    /// Anything deployed; files go to S3.
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    /// Whether this is the development mode.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Lowercase name, as accepted in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Canonical site URL, used in the user agent.
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Yiff Rocks".to_string(),
            description: "An image board made by furries, for furries.".to_string(),
            url: "https://yiff.rocks".to_string(),
        }
    }
}

/// API bind and public address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether the public address is served over TLS.
    pub public_secure: bool,
    /// Publicly visible host.
    pub public_host: String,
    /// Publicly visible port.
    pub public_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3333,
            public_secure: true,
            public_host: "localhost".to_string(),
            public_port: 3333,
        }
    }
}

impl ApiConfig {
    /// Externally visible API URL. The port is left out when it is the
    /// default for the scheme.
    #[must_use]
    pub fn public_url(&self) -> String {
        let (scheme, default_port) = if self.public_secure {
            ("https", 443)
        } else {
            ("http", 80)
        };
        if self.public_port == default_port {
            format!("{scheme}://{}", self.public_host)
        } else {
            format!("{scheme}://{}:{}", self.public_host, self.public_port)
        }
    }
}

/// Local storage paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Scratch directory. Falls back to the OS temporary directory.
    pub tmp_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolved scratch directory.
    #[must_use]
    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Where in-flight uploads are staged.
    #[must_use]
    pub fn upload_dir(&self) -> PathBuf {
        self.tmp_dir().join("uploads")
    }

    /// Root of the development file store.
    #[must_use]
    pub fn public_root(&self) -> PathBuf {
        self.tmp_dir().join("public")
    }

    /// Root of the development store for protected files. A sibling of
    /// [`Self::public_root`], never inside it.
    #[must_use]
    pub fn protected_root(&self) -> PathBuf {
        self.tmp_dir().join("protected")
    }
}

/// CDN base URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Base URL for publicly visible files.
    pub public_url: String,
    /// Base URL for access-restricted files.
    pub protected_url: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            public_url: "https://cdn.yiff.rocks".to_string(),
            protected_url: "https://protected.cdn.yiff.rocks".to_string(),
        }
    }
}

/// S3 credentials and buckets.
///
/// Everything is optional at load time; the storage selector refuses to
/// build a remote backend when a value it needs is missing.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Endpoint URL.
    pub endpoint_url: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Bucket for public files.
    pub bucket: Option<String>,
    /// Bucket for protected files.
    pub protected_bucket: Option<String>,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redact(self.secret_access_key.as_ref()))
            .field("bucket", &self.bucket)
            .field("protected_bucket", &self.protected_bucket)
            .finish()
    }
}

/// Database connection.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Host.
    pub host: String,
    /// Port.
    pub port: u16,
    /// User.
    pub user: String,
    /// Password.
    pub password: Option<String>,
    /// Require TLS.
    pub ssl: bool,
    /// Database name.
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "yiffrocks".to_string(),
            password: None,
            ssl: false,
            database: "yiffrocks".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Postgres connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        let user = urlencoding::encode(&self.user);
        let auth = match &self.password {
            Some(password) => format!("{user}:{}", urlencoding::encode(password)),
            None => user.into_owned(),
        };
        let sslmode = if self.ssl { "require" } else { "disable" };
        format!(
            "postgres://{auth}@{}:{}/{}?sslmode={sslmode}",
            self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &redact(self.password.as_ref()))
            .field("ssl", &self.ssl)
            .field("database", &self.database)
            .finish()
    }
}

/// Redis connection.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Host.
    pub host: String,
    /// Port.
    pub port: u16,
    /// ACL user.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Logical database index.
    pub db: u8,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            user: None,
            password: None,
            db: 0,
        }
    }
}

impl RedisConfig {
    /// Redis connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        let auth = match (&self.user, &self.password) {
            (None, None) => String::new(),
            (user, password) => format!(
                "{}:{}@",
                urlencoding::encode(user.as_deref().unwrap_or_default()),
                urlencoding::encode(password.as_deref().unwrap_or_default())
            ),
        };
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &redact(self.password.as_ref()))
            .field("db", &self.db)
            .finish()
    }
}

/// Image proxy.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy URL.
    pub url: Option<String>,
    /// Shared auth token.
    pub auth: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("auth", &redact(self.auth.as_ref()))
            .finish()
    }
}

/// Content limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Fewest tags a post may carry.
    pub min_post_tags: usize,
    /// Most tags a post may carry.
    pub max_post_tags: usize,
    /// Longest post description.
    pub max_description_length: usize,
    /// Longest post title.
    pub max_title_length: usize,
    /// Longest single source URL.
    pub max_source_length: usize,
    /// Most sources per post.
    pub max_sources: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_post_tags: 10,
            max_post_tags: 250,
            max_description_length: 5000,
            max_title_length: 100,
            max_source_length: 256,
            max_sources: 10,
        }
    }
}

impl LimitsConfig {
    /// Upper bound on the combined length of all sources, with slack for
    /// separators.
    #[must_use]
    pub const fn max_total_sources_length(&self) -> usize {
        self.max_source_length * self.max_sources + 50
    }
}

/// Hashing and session settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt cost factor.
    pub bcrypt_rounds: u32,
    /// Session cookie signing secret.
    pub cookie_secret: Option<String>,
    /// Session cookie name.
    pub session_cookie_name: String,
    /// Session cookie lifetime in milliseconds.
    pub session_max_age_ms: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_rounds: 12,
            cookie_secret: None,
            session_cookie_name: "yiff-rocks".to_string(),
            session_max_age_ms: 86_400_000, // 24 hours
        }
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("bcrypt_rounds", &self.bcrypt_rounds)
            .field("cookie_secret", &redact(self.cookie_secret.as_ref()))
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_max_age_ms", &self.session_max_age_ms)
            .finish()
    }
}

/// User account settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    /// Whether new accounts may be created.
    pub enable_registrations: bool,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            enable_registrations: true,
        }
    }
}

fn redact(value: Option<&String>) -> &'static str {
    if value.is_some() { "<redacted>" } else { "<unset>" }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl AppConfig {
    /// Loads configuration for the mode named by `RUN_MODE`
    /// (default `development`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> ConfigResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load_for(&run_mode)
    }

    /// Loads configuration for an explicit run mode.
    ///
    /// The run mode also seeds `environment`, so `RUN_MODE=production` is
    /// enough to select the remote storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_for(run_mode: &str) -> ConfigResult<Self> {
        let config = config::Config::builder()
            .set_default("environment", run_mode)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks cross-field consistency.
    ///
    /// Storage credentials are not checked here; the storage selector
    /// validates what the chosen backend needs.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api.port == 0 {
            return Err(ConfigError::invalid("api.port", "must be non-zero"));
        }
        if self.api.public_port == 0 {
            return Err(ConfigError::invalid("api.public_port", "must be non-zero"));
        }
        if self.limits.max_post_tags < self.limits.min_post_tags {
            return Err(ConfigError::invalid(
                "limits.max_post_tags",
                format!(
                    "{} is below limits.min_post_tags ({})",
                    self.limits.max_post_tags, self.limits.min_post_tags
                ),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_rounds) {
            return Err(ConfigError::invalid(
                "security.bcrypt_rounds",
                "must be between 4 and 31",
            ));
        }
        if !self.environment.is_development() && is_blank(self.security.cookie_secret.as_ref()) {
            return Err(ConfigError::missing("security.cookie_secret"));
        }
        Ok(())
    }

    /// Whether new accounts must confirm their email address.
    #[must_use]
    pub const fn enable_email_verification(&self) -> bool {
        !self.environment.is_development()
    }

    /// Domain the session cookie is scoped to.
    #[must_use]
    pub fn cookie_domain(&self) -> String {
        format!(".{}", self.api.public_host)
    }

    /// User agent for outbound requests, e.g.
    /// `YiffRocks/1.2.0 (https://yiff.rocks)`.
    #[must_use]
    pub fn user_agent(&self, version: &str) -> String {
        let product: String = self
            .site
            .name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        format!("{product}/{version} ({})", self.site.url)
    }
}
