//! Entity listing: the mapped view the automation boundary would see.

use tabled::Tabled;

use poolside_core::{Account, Entity, EntityKind, EntitySet};

use crate::cli::{EntitiesArgs, GlobalOpts, OutputFormat};
use crate::config::build_account_config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Entity> for EntityRow {
    fn from(e: &Entity) -> Self {
        Self {
            unique_id: e.unique_id.clone(),
            kind: kind_label(e.kind).to_owned(),
            name: e.name.clone(),
            value: e.value.to_string(),
        }
    }
}

fn kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Sensor => "sensor",
        EntityKind::BinarySensor => "binary_sensor",
        EntityKind::Switch => "switch",
    }
}

fn climate_summary(set: &EntitySet) -> String {
    set.climate
        .iter()
        .map(|c| {
            format!(
                "{}  preset={}  target={}  water={}  power={}  action={:?}",
                c.unique_id,
                c.preset,
                c.target_temperature,
                c.water_temperature,
                c.power,
                c.action
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(args: EntitiesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_account_config(global)?;

    let mut set: EntitySet =
        Account::oneshot(config, |account| async move { Ok(account.entities()) }).await?;

    if let Some(ref device) = args.device {
        set.climate.retain(|c| &c.device_id == device);
        set.sensors.retain(|e| &e.device_id == device);
        set.binary_sensors.retain(|e| &e.device_id == device);
        set.switches.retain(|e| &e.device_id == device);
    }

    // Structured formats carry the whole set; the table view prints the
    // climate summary above the flat entity table.
    if matches!(global.output, OutputFormat::Table) {
        let mut out = String::new();
        if !set.climate.is_empty() {
            out.push_str(&climate_summary(&set));
            out.push('\n');
        }
        let flat: Vec<Entity> = set
            .sensors
            .iter()
            .chain(&set.binary_sensors)
            .chain(&set.switches)
            .cloned()
            .collect();
        out.push_str(&output::render_list(
            &OutputFormat::Table,
            &flat,
            |e| EntityRow::from(e),
            |e| e.unique_id.clone(),
        ));
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let rendered = output::render_single(&global.output, &set, |_| String::new(), |_| {
        String::new()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}
