/*!
 * Process configuration taken from the environment.  This is read once in
 * main() and handed to whatever needs it.
 */

pub const DEFAULT_REGION: &str = "ap-southeast-2";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_NO_VERIFY_SSL: &str = "AWS_NO_VERIFY_SSL";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub region: String,
    /**
     * Skip TLS certificate (and host name) verification when talking to the
     * object store.  Only ever turned on explicitly.
     */
    pub no_verify_ssl: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            region: DEFAULT_REGION.to_string(),
            no_verify_ssl: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(region) = lookup(ENV_REGION).filter(|r| !r.is_empty()) {
            config.region = region;
        }

        if let Some(value) = lookup(ENV_NO_VERIFY_SSL).filter(|v| !v.is_empty())
        {
            config.no_verify_ssl = match parse_bool(&value) {
                Some(b) => b,
                None => {
                    log::warn!(
                        "ignoring {}={:?}: not a boolean",
                        ENV_NO_VERIFY_SSL,
                        value
                    );
                    false
                }
            };
        }

        config
    }
}

/*
 * Accepts the usual spellings of a boolean flag: "1", "t", "true" and friends.
 */
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::Config;
    use super::DEFAULT_REGION;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<String, String>>();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(!config.no_verify_ssl);

        let config = config_with(&[("AWS_REGION", ""), ("AWS_NO_VERIFY_SSL", "")]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_region_override() {
        let config = config_with(&[("AWS_REGION", "us-west-2")]);
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn test_no_verify_ssl() {
        for value in &["1", "t", "TRUE", "true", "True"] {
            let config = config_with(&[("AWS_NO_VERIFY_SSL", *value)]);
            assert!(config.no_verify_ssl, "value {:?}", value);
        }
        for value in &["0", "f", "false", "yes", "on", "2"] {
            let config = config_with(&[("AWS_NO_VERIFY_SSL", *value)]);
            assert!(!config.no_verify_ssl, "value {:?}", value);
        }
    }
}
