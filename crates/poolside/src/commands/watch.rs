//! Watch mode: keep the session alive and print each snapshot as the
//! poll loop publishes it.

use std::time::Duration;

use owo_colors::OwoColorize;

use poolside_core::{Account, Availability, EntityValue};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::config::build_account_config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = build_account_config(global)?;
    if let Some(minutes) = args.interval {
        config.update_interval = Duration::from_secs(minutes * 60);
    }

    let account = Account::new(config);
    account.connect().await.map_err(CliError::from)?;

    let color = output::should_color(&global.color);
    let mut snapshots = account.snapshots();
    let mut seen: u64 = 0;

    // The first snapshot is already in the store after connect().
    if let Some(snapshot) = snapshots.current() {
        print_snapshot(&account, &snapshot.fetched_at.to_rfc3339(), color);
        seen += 1;
    }

    let limit = args.count.unwrap_or(u64::MAX);
    while seen < limit {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                let Some(snapshot) = changed else { break };
                print_snapshot(&account, &snapshot.fetched_at.to_rfc3339(), color);
                seen += 1;
            }
        }
    }

    account.shutdown().await;
    Ok(())
}

fn print_snapshot(account: &Account, fetched_at: &str, color: bool) {
    let entities = account.entities();

    let availability = match account.availability() {
        Availability::Available => "available".to_owned(),
        Availability::Unavailable { since } => format!("UNAVAILABLE since {since}"),
        Availability::ReauthRequired => "REAUTH REQUIRED".to_owned(),
        Availability::Unknown => "unknown".to_owned(),
    };

    if color {
        println!("{} {}", fetched_at.bold(), availability.dimmed());
    } else {
        println!("{fetched_at} {availability}");
    }

    for climate in &entities.climate {
        let line = format!(
            "  {}  preset={}  target={}  water={}  power={}",
            climate.device_id,
            climate.preset,
            climate.target_temperature,
            climate.water_temperature,
            climate.power,
        );
        // Highlight unknown values -- they mean the cloud sent
        // something the mapper refused to guess about.
        if color && climate.preset == EntityValue::Unknown {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
}
