use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url(&profile));

        Self {
            database_url,
            profile,
        }
    }
}

fn default_database_url(profile: &str) -> String {
    if profile == "default" {
        "sqlite://marketplace.db?mode=rwc".to_string()
    } else {
        format!("sqlite://marketplace_{}.db?mode=rwc", profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_uses_plain_file() {
        assert_eq!(
            default_database_url("default"),
            "sqlite://marketplace.db?mode=rwc"
        );
    }

    #[test]
    fn named_profile_gets_its_own_file() {
        assert_eq!(
            default_database_url("staging"),
            "sqlite://marketplace_staging.db?mode=rwc"
        );
    }
}
