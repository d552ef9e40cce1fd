//! Device command handlers.

use tabled::Tabled;

use poolside_core::{Account, ConnectionStatus, Device};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::config::build_account_config;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Connection")]
    connection: String,
    #[tabled(rename = "Alarms")]
    alarms: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone().unwrap_or_default(),
            model: d.model.clone().unwrap_or_default(),
            serial: d.serial_number.clone().unwrap_or_default(),
            firmware: d.firmware_version.clone().unwrap_or_default(),
            connection: connection_label(d.connection.status).to_owned(),
            alarms: if d.alarm.is_active() {
                format!("{} ({:?})", d.alarm.count, d.alarm.status)
            } else {
                "-".into()
            },
        }
    }
}

fn connection_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "connected",
        ConnectionStatus::Disconnected => "disconnected",
        ConnectionStatus::Unknown => "unknown",
        _ => "unknown",
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:         {}", d.id),
        format!("Name:       {}", d.name.as_deref().unwrap_or("-")),
        format!("Serial:     {}", d.serial_number.as_deref().unwrap_or("-")),
        format!("Model:      {}", d.model.as_deref().unwrap_or("-")),
        format!("Firmware:   {}", d.firmware_version.as_deref().unwrap_or("-")),
        format!("Pool:       {}", d.pool_id.as_deref().unwrap_or("-")),
        format!("Connection: {}", connection_label(d.connection.status)),
    ];
    if let Some(ref session) = d.connection.session_id {
        lines.push(format!("Session:    {session}"));
    }
    if d.alarm.is_active() {
        lines.push(format!(
            "Alarms:     {} ({})",
            d.alarm.count,
            d.alarm.error_code.as_deref().unwrap_or("warning")
        ));
        if let Some(ref msg) = d.alarm.error_message {
            lines.push(format!("Error:      {msg}"));
        }
    }
    lines.push(format!("Components: {}", d.components.len()));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_account_config(global)?;

    let devices: Vec<Device> = Account::oneshot(config, |account| async move {
        Ok(account
            .snapshot()
            .map(|s| s.devices.values().cloned().collect())
            .unwrap_or_default())
    })
    .await?;

    if let Some(ref wanted) = args.device_id {
        let device = devices
            .iter()
            .find(|d| &d.id == wanted || d.serial_number.as_deref() == Some(wanted))
            .ok_or_else(|| CliError::DeviceNotFound {
                identifier: wanted.clone(),
            })?;
        let rendered = output::render_single(&global.output, device, detail, |d| d.id.clone());
        output::print_output(&rendered, global.quiet);
        return Ok(());
    }

    let rendered = output::render_list(&global.output, &devices, |d| DeviceRow::from(d), |d| {
        d.id.clone()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}
