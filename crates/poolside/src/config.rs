//! Resolve the active profile and CLI overrides into an
//! `AccountConfig`.

use std::time::Duration;

use secrecy::SecretString;

use poolside_core::AccountConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile name selected by flags, config, or the "default"
/// fallback.
pub fn active_profile_name(global: &GlobalOpts, cfg: &poolside_config::Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build an `AccountConfig` from the config file, profile, and CLI
/// overrides.
pub fn build_account_config(global: &GlobalOpts) -> Result<AccountConfig, CliError> {
    let cfg = poolside_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut account = poolside_config::profile_to_account_config(profile, &profile_name)?;
        if let Some(ref username) = global.username {
            account.username = username.clone();
        }
        if let Some(ref password) = global.password {
            account.password = SecretString::from(password.clone());
        }
        account.timeout = Duration::from_secs(global.timeout);
        return Ok(account);
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let username = global.username.clone().ok_or_else(|| CliError::NoConfig {
        path: poolside_config::config_path().display().to_string(),
    })?;
    let password = global
        .password
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let mut account = AccountConfig::new(username, password);
    account.timeout = Duration::from_secs(global.timeout);
    Ok(account)
}
