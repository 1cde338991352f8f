use std::process::ExitCode;

use floorplan::canvas::MemoryCanvas;
use floorplan::config::{FloorPlanConfig, env_parse};
use floorplan::session::FloorPlanSession;
use floorplan::storage::FileStorage;
use tracing::{error, info};

const DEFAULT_PLAN_ID: &str = "default";

/// Open a stored floor plan and print its booking units.
///
/// Usage: `floorplan [PLAN_ID] [QUERY]`. The plan id falls back to
/// `FLOORPLAN_PLAN_ID`.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = match FloorPlanConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut args = std::env::args().skip(1);
    let plan_id = args
        .next()
        .unwrap_or_else(|| env_parse("FLOORPLAN_PLAN_ID", DEFAULT_PLAN_ID.to_owned()));
    let query = args.next().unwrap_or_default();

    let storage = FileStorage::new(config.storage_dir.clone());
    let mut session = FloorPlanSession::new(storage, &config);
    session.open_plan_with(&plan_id, |stored| stored.map_or_else(MemoryCanvas::new, MemoryCanvas::from_plan));

    let rows = session.side_panel(&query);
    info!(plan_id, units = rows.len(), view_mode = config.view_mode, "plan ready");
    for row in rows {
        let badge = row.price_badge.unwrap_or_default();
        println!(
            "{:<8} {:<24} {:>14}  days:{}  children:{}",
            row.short_id, row.name, badge, row.working_day_count, row.child_count
        );
    }

    // Flush anything still pending before exit.
    session.autosave().await;
    ExitCode::SUCCESS
}
