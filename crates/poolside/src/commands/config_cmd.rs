//! Config management commands. These never open a cloud session.

use poolside_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &poolside_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::SetCredentials { profile, username } => {
            set_credentials(&profile, &username, global)
        }
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = poolside_config::load_config_or_default();

    // Never echo password material, wherever it came from.
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }

    let rendered = output::render_single(
        &global.output,
        &cfg,
        |c| toml::to_string_pretty(c).unwrap_or_default(),
        |c| c.default_profile.clone().unwrap_or_default(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn set_credentials(profile_name: &str, username: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let password = match global.password {
        Some(ref pw) => pw.clone(),
        None => rpassword::prompt_password("Fluidra account password: ")?,
    };

    // Password goes to the keyring; only the username lands in the
    // config file.
    poolside_config::store_password(profile_name, &password)?;

    let mut cfg: Config = poolside_config::load_config_or_default();
    let profile = cfg
        .profiles
        .entry(profile_name.to_owned())
        .or_insert_with(Profile::default);
    profile.username = Some(username.to_owned());
    profile.password = None;

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.to_owned());
    }

    poolside_config::save_config(&cfg)?;
    output::print_output(
        &format!("credentials stored for profile '{profile_name}'"),
        global.quiet,
    );
    Ok(())
}
