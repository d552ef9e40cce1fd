//! Account metadata: who is signed in and which pools they can reach.

use tabled::Tabled;

use poolside_core::{Account, UserPoolResponse};

use crate::cli::GlobalOpts;
use crate::config::build_account_config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&UserPoolResponse> for PoolRow {
    fn from(p: &UserPoolResponse) -> Self {
        Self {
            pool: p.pool_id.clone().unwrap_or_default(),
            access: p.access_level.clone().unwrap_or_default(),
            role: p.role.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_account_config(global)?;
    let username = config.username.clone();

    let (profile, pools) = Account::oneshot(config, |account| async move {
        let profile = account.user_profile().await?;
        let pools = account.user_pools().await?;
        Ok((profile, pools))
    })
    .await?;

    let email = profile.email.unwrap_or(username);
    output::print_output(&format!("signed in as {email}"), global.quiet);

    let rendered = output::render_list(&global.output, &pools, |p| PoolRow::from(p), |p| {
        p.pool_id.clone().unwrap_or_default()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}
