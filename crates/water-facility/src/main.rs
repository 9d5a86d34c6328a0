use registry_framework::tracing::setup_tracing;
use registry_framework::RegistryConfig;
use serde_json::json;
use tracing::{error, info, Instrument};
use water_facility::bulk::{BulkImporter, ProgressLog};
use water_facility::lifecycle::{default_config, RegistrySystem};
use water_facility::model::WATER_FACILITY;

/// Environment variable naming an optional JSON configuration file.
const CONFIG_ENV: &str = "REGISTRY_CONFIG";

/// Environment variable naming an optional CSV export to register in bulk.
const BULK_CSV_ENV: &str = "BULK_CSV";

/// Environment variable naming the progress log; defaults to [`DEFAULT_PROGRESS_LOG`].
const PROGRESS_LOG_ENV: &str = "BULK_PROGRESS_LOG";

const DEFAULT_PROGRESS_LOG: &str = "upload_progress.txt";

fn load_config() -> Result<RegistryConfig, String> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!(%path, "Loading registry configuration");
            RegistryConfig::from_path(&path).map_err(|e| e.to_string())
        }
        Err(_) => Ok(default_config()),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting water facility registry");

    let config = load_config()?;
    let system = RegistrySystem::new(config).map_err(|e| e.to_string())?;
    system.save_id_formats().await.map_err(|e| e.to_string())?;

    let facility = json!({
        "WaterFacility": {
            "geoCode": "xvksf3s",
            "waterPointType": "Tube well or borehole",
            "location": {
                "county": "Nimba",
                "district": "Sanniquellie Mahn",
                "community": "Kpaytuo Town"
            }
        }
    });

    let span = tracing::info_span!("facility_registration");
    let osid = async {
        info!("Registering water facility");
        system
            .add_entity(facility.clone())
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let stored = system
        .get_entity(WATER_FACILITY, &osid)
        .await
        .map_err(|e| e.to_string())?;
    info!(%osid, wf_id = %stored["wfId"], "Water facility registered");

    // Same geoCode, type and location with different spacing and case.
    let resubmitted = json!({
        "WaterFacility": {
            "geoCode": "XVKSF3S",
            "waterPointType": "Tube well or borehole",
            "location": {
                "county": " nimba ",
                "district": "Sanniquellie  Mahn",
                "community": "Kpaytuo Town"
            }
        }
    });

    let span = tracing::info_span!("duplicate_registration");
    let duplicate = async {
        info!("Registering the same facility again");
        system.add_entity(resubmitted).await
    }
    .instrument(span)
    .await;

    match duplicate {
        Ok(osid) => error!(%osid, "Duplicate facility was accepted"),
        Err(e) => info!(error = %e, "Duplicate facility rejected"),
    }

    if let Ok(csv_path) = std::env::var(BULK_CSV_ENV) {
        let log_path =
            std::env::var(PROGRESS_LOG_ENV).unwrap_or_else(|_| DEFAULT_PROGRESS_LOG.to_string());
        let importer = BulkImporter::new(&system, ProgressLog::new(log_path));
        let previous = importer.log().stats().map_err(|e| e.to_string())?;
        info!(
            success = previous.success,
            duplicates = previous.duplicate,
            failed = previous.failed,
            "Progress log so far"
        );

        let summary = importer
            .import_path(&csv_path)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            %csv_path,
            total = summary.total,
            skipped = summary.skipped,
            success = summary.stats.success,
            "Bulk registration finished"
        );
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
