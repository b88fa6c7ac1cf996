//! Log in, list flights, then either print them or download every track
//! concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dhv_xc_client::utils::{UNDATED_DIR, igc_file_path};
use dhv_xc_client::{Credentials, Flight, XcClient, XcError};
use tokio::task::JoinSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncOptions {
    pub target_dir: PathBuf,
    /// Print the listing instead of downloading.
    pub list_only: bool,
    /// Only fetch this flight.
    pub flight_id: Option<u64>,
}

/// A single planned IGC download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub flight_id: String,
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Flights returned by the listing.
    pub listed: usize,
    /// Tracks written to disk.
    pub saved: usize,
}

/// One line of `--list` output.
pub fn describe_flight(flight: &Flight) -> String {
    format!(
        "Flight ID: [{}] Takeoff: [{}] Date: [{}]",
        flight.id.as_deref().unwrap_or("-"),
        flight.takeoff.as_deref().unwrap_or("-"),
        flight.date
    )
}

/// Work out which tracks to fetch and where they go.
///
/// Without a filter every listed flight is planned and a flight lacking an ID
/// is an error. With a filter only the matching flight is planned; when the
/// listing does not contain it, the requested ID is still fetched and saved
/// under the undated directory.
pub fn plan_downloads(
    flights: &[Flight],
    dir: &Path,
    wanted: Option<u64>,
) -> Result<Vec<Download>, XcError> {
    let Some(wanted) = wanted.filter(|id| *id != 0) else {
        return flights
            .iter()
            .map(|f| -> Result<Download, XcError> {
                let id = f.id.as_deref().map(str::trim).ok_or_else(|| {
                    XcError::InvalidInput(format!("flight dated [{}] has no id", f.date))
                })?;
                Ok(Download {
                    path: igc_file_path(dir, &f.date, id)?,
                    flight_id: id.to_string(),
                })
            })
            .collect();
    };

    let id = wanted.to_string();
    let date = match flights.iter().find(|f| f.numeric_id() == Some(wanted)) {
        Some(f) => f.date.as_str(),
        None => {
            tracing::warn!("flight [{}] not in listing, saving under [{}]", id, UNDATED_DIR);
            UNDATED_DIR
        }
    };
    Ok(vec![Download {
        path: igc_file_path(dir, date, &id)?,
        flight_id: id,
    }])
}

/// Run one sync against `client`.
pub async fn run(
    client: Arc<dyn XcClient>,
    credentials: &Credentials,
    options: &SyncOptions,
) -> anyhow::Result<SyncReport> {
    tokio::fs::create_dir_all(&options.target_dir)
        .await
        .with_context(|| {
            format!(
                "Unable to create target dir: [{}]",
                options.target_dir.display()
            )
        })?;

    let token = client.fetch_token().await?;
    tracing::info!("Got token");
    tracing::debug!("token: [{}]", token);

    client.login(credentials).await?;
    tracing::info!("Logged in as [{}]", credentials.user);

    let flights = client.list_flights().await?;
    let mut report = SyncReport {
        listed: flights.len(),
        saved: 0,
    };
    tracing::debug!("listing returned {} flights", report.listed);

    if options.list_only {
        for flight in &flights {
            println!("{}", describe_flight(flight));
        }
        return Ok(report);
    }

    let plan = plan_downloads(&flights, &options.target_dir, options.flight_id)?;
    report.saved = download_all(client, plan).await?;
    tracing::info!("Saved [{}] flights", report.saved);
    Ok(report)
}

/// Spawn one task per download and wait for all of them. The first failure
/// is returned; dropping the set aborts whatever is still running.
async fn download_all(client: Arc<dyn XcClient>, plan: Vec<Download>) -> anyhow::Result<usize> {
    let mut tasks = JoinSet::new();
    for job in plan {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            client
                .download_igc(&job.flight_id, &job.path)
                .await
                .with_context(|| format!("downloading flight [{}]", job.flight_id))?;
            tracing::info!(
                "Saving flight: [{}] to: [{}]",
                job.flight_id,
                job.path.display()
            );
            Ok::<_, anyhow::Error>(())
        });
    }

    let mut saved = 0;
    while let Some(joined) = tasks.join_next().await {
        joined.context("download task panicked")??;
        saved += 1;
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(id: Option<&str>, date: &str) -> Flight {
        Flight {
            id: id.map(String::from),
            date: date.to_string(),
            takeoff: Some("Brauneck".to_string()),
        }
    }

    #[test]
    fn describe_matches_listing_format() {
        let f = flight(Some("1001"), "2022-05-14");
        assert_eq!(
            describe_flight(&f),
            "Flight ID: [1001] Takeoff: [Brauneck] Date: [2022-05-14]"
        );
        let f = Flight {
            id: None,
            date: "2022-05-14".into(),
            takeoff: None,
        };
        assert_eq!(
            describe_flight(&f),
            "Flight ID: [-] Takeoff: [-] Date: [2022-05-14]"
        );
    }

    #[test]
    fn plan_all_flights_by_date() {
        let flights = vec![
            flight(Some("1001"), "2022-05-14"),
            flight(Some("1002"), "15.05.2022"),
        ];
        let plan = plan_downloads(&flights, Path::new("out"), None).unwrap();
        assert_eq!(
            plan,
            vec![
                Download {
                    flight_id: "1001".into(),
                    path: PathBuf::from("out/2022-05-14/1001.igc"),
                },
                Download {
                    flight_id: "1002".into(),
                    path: PathBuf::from("out/2022-05-15/1002.igc"),
                },
            ]
        );
    }

    #[test]
    fn plan_zero_id_means_no_filter() {
        let flights = vec![flight(Some("1"), "2022-05-14"), flight(Some("2"), "2022-05-14")];
        let plan = plan_downloads(&flights, Path::new("out"), Some(0)).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn plan_missing_id_fails() {
        let flights = vec![flight(Some("1"), "2022-05-14"), flight(None, "2022-05-15")];
        let res = plan_downloads(&flights, Path::new("out"), None);
        assert!(matches!(res, Err(XcError::InvalidInput(_))));
    }

    #[test]
    fn plan_filter_uses_matching_flight_date() {
        let flights = vec![flight(Some("1001"), "2022-05-14"), flight(Some("1002"), "2022-06-01")];
        let plan = plan_downloads(&flights, Path::new("out"), Some(1002)).unwrap();
        assert_eq!(
            plan,
            vec![Download {
                flight_id: "1002".into(),
                path: PathBuf::from("out/2022-06-01/1002.igc"),
            }]
        );
    }

    #[test]
    fn plan_filter_falls_back_to_undated_dir() {
        let flights = vec![flight(Some("1001"), "2022-05-14")];
        let plan = plan_downloads(&flights, Path::new("out"), Some(77)).unwrap();
        assert_eq!(
            plan,
            vec![Download {
                flight_id: "77".into(),
                path: PathBuf::from("out/today/77.igc"),
            }]
        );
    }

    #[test]
    fn plan_empty_listing_is_empty() {
        assert!(plan_downloads(&[], Path::new("out"), None).unwrap().is_empty());
    }
}
