//! Heat-pump climate control commands.

use std::str::FromStr;

use tabled::Tabled;

use poolside_core::{Account, ClimateEntity, Command, HeatPumpMode, Setpoint};

use crate::cli::{ClimateArgs, ClimateCommand, GlobalOpts};
use crate::config::build_account_config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ClimateRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Preset")]
    preset: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Water")]
    water: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Action")]
    action: String,
}

impl From<&ClimateEntity> for ClimateRow {
    fn from(c: &ClimateEntity) -> Self {
        Self {
            device: c.device_id.clone(),
            preset: c.preset.to_string(),
            target: c.target_temperature.to_string(),
            water: c.water_temperature.to_string(),
            power: c.power.to_string(),
            action: format!("{:?}", c.action),
        }
    }
}

#[derive(Tabled, serde::Serialize)]
struct ModeRow {
    #[tabled(rename = "Code")]
    code: u8,
    #[tabled(rename = "Preset")]
    preset: String,
}

pub async fn handle(args: ClimateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ClimateCommand::Status => status(global).await,
        ClimateCommand::Modes => {
            let rows: Vec<ModeRow> = HeatPumpMode::all()
                .map(|m| ModeRow {
                    code: m.code(),
                    preset: m.to_string(),
                })
                .collect();
            let rendered =
                output::render_list(&global.output, &rows, |r| ModeRow {
                    code: r.code,
                    preset: r.preset.clone(),
                }, |r| r.preset.clone());
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
        ClimateCommand::SetMode { device_id, mode } => {
            // Accept either a preset name or a bare wire code.
            let mode = HeatPumpMode::from_str(&mode)
                .ok()
                .or_else(|| mode.parse::<i64>().ok().and_then(HeatPumpMode::from_code))
                .ok_or_else(|| CliError::Validation {
                    field: "mode".into(),
                    reason: format!(
                        "'{mode}' is not a preset; see `poolside climate modes`"
                    ),
                })?;
            run_command(global, Command::SetPresetMode { device_id, mode }).await
        }
        ClimateCommand::SetTemp { device_id, celsius } => {
            // Validated locally -- an out-of-range value never reaches
            // the network.
            let setpoint = Setpoint::new(celsius).map_err(|e| CliError::Validation {
                field: "celsius".into(),
                reason: e.to_string(),
            })?;
            run_command(
                global,
                Command::SetTargetTemperature {
                    device_id,
                    setpoint,
                },
            )
            .await
        }
        ClimateCommand::On { device_id } => {
            run_command(global, Command::SetPower { device_id, on: true }).await
        }
        ClimateCommand::Off { device_id } => {
            run_command(global, Command::SetPower { device_id, on: false }).await
        }
    }
}

async fn status(global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_account_config(global)?;

    let climate: Vec<ClimateEntity> =
        Account::oneshot(config, |account| async move { Ok(account.entities().climate) })
            .await?;

    let rendered = output::render_list(&global.output, &climate, |c| ClimateRow::from(c), |c| {
        c.unique_id.clone()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}

async fn run_command(global: &GlobalOpts, command: Command) -> Result<(), CliError> {
    let config = build_account_config(global)?;
    let quick_delay = config.quick_poll_delay;

    Account::oneshot(config, |account| async move {
        account.execute(command).await?;
        // Stay connected long enough for the quick poll to land, so
        // the success message reflects observed (not assumed) state.
        let mut snapshots = account.snapshots();
        let _ = tokio::time::timeout(quick_delay * 2, snapshots.changed()).await;
        Ok(())
    })
    .await?;

    output::print_output("ok", global.quiet);
    Ok(())
}
