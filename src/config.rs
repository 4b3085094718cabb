use tracing::debug;

pub const ENV_USER: &str = "KOBO_USER";
pub const ENV_PASSWORD: &str = "KOBO_PASSW";
pub const ENV_ASSET: &str = "KOBO_ASSET";
pub const ENV_URL: &str = "KOBO_URL";

pub const DEFAULT_USER: &str = "username";
pub const DEFAULT_PASSWORD: &str = "password";
pub const DEFAULT_ASSET: &str = "koboassetid";
pub const DEFAULT_URL: &str = "https://kobo.humanitarianresponse.info/";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Account used for HTTP basic authentication.
    pub user: String,
    pub password: String,
    /// Asset (form) whose exports are created and listed.
    pub asset_id: String,
    /// API root, e.g. `https://kf.kobotoolbox.org/`.
    pub base_url: String,
}

/// Values that take precedence over the environment, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub user: Option<String>,
    pub password: Option<String>,
    pub asset_id: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    /// Resolves configuration from `KOBO_*` environment variables, falling back
    /// to the compiled-in defaults for anything unset.
    pub fn from_env() -> Self {
        Self::resolve(ConfigOverrides::default())
    }

    /// Resolves configuration using (in order of precedence):
    /// - explicit overrides
    /// - environment variables `KOBO_USER` / `KOBO_PASSW` / `KOBO_ASSET` / `KOBO_URL`
    /// - compiled-in defaults
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let env = Self::from_lookup(|name| std::env::var(name).ok());
        Self {
            user: overrides.user.unwrap_or(env.user),
            password: overrides.password.unwrap_or(env.password),
            asset_id: overrides.asset_id.unwrap_or(env.asset_id),
            base_url: overrides.base_url.unwrap_or(env.base_url),
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |name: &str, default: &str| match lookup(name) {
            Some(v) => {
                debug!("{} taken from environment", name);
                v
            }
            None => default.to_string(),
        };

        Self {
            user: pick(ENV_USER, DEFAULT_USER),
            password: pick(ENV_PASSWORD, DEFAULT_PASSWORD),
            asset_id: pick(ENV_ASSET, DEFAULT_ASSET),
            base_url: pick(ENV_URL, DEFAULT_URL),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Keeps the password out of `{:?}` output and therefore out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("asset_id", &self.asset_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg.user, DEFAULT_USER);
        assert_eq!(cfg.password, DEFAULT_PASSWORD);
        assert_eq!(cfg.asset_id, DEFAULT_ASSET);
        assert_eq!(cfg.base_url, DEFAULT_URL);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_variables_override_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            (ENV_USER, "alice"),
            (ENV_PASSWORD, "secret"),
            (ENV_ASSET, "aBcD123"),
            (ENV_URL, "https://kf.kobotoolbox.org/"),
        ]));
        assert_eq!(cfg.user, "alice");
        assert_eq!(cfg.password, "secret");
        assert_eq!(cfg.asset_id, "aBcD123");
        assert_eq!(cfg.base_url, "https://kf.kobotoolbox.org/");
    }

    #[test]
    fn partial_environment_mixes_with_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[(ENV_ASSET, "aBcD123")]));
        assert_eq!(cfg.asset_id, "aBcD123");
        assert_eq!(cfg.user, DEFAULT_USER);
        assert_eq!(cfg.base_url, DEFAULT_URL);
    }

    #[test]
    fn empty_values_are_not_validated() {
        let cfg = Config::from_lookup(lookup_from(&[(ENV_USER, ""), (ENV_URL, "not a url")]));
        assert_eq!(cfg.user, "");
        assert_eq!(cfg.base_url, "not a url");
    }

    #[test]
    fn debug_output_hides_password() {
        let cfg = Config::from_lookup(lookup_from(&[(ENV_PASSWORD, "hunter2")]));
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }
}
