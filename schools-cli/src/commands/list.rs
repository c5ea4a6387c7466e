use anyhow::{Context, Result};
use schools::geojson::{ranked_to_feature_collection, schools_to_feature_collection};
use schools::{Coordinate, RankedSchool, School};

use super::StoreOptions;

pub async fn run(
    store: &StoreOptions,
    point: Option<(f64, f64)>,
    json: bool,
    geojson: bool,
) -> Result<()> {
    let service = store.connect().await?;

    match point {
        Some((lat, lon)) => {
            let source = Coordinate::validated(lat, lon)?;
            let ranked = service
                .list_by_distance(source)
                .await
                .context("Failed to list schools")?;
            service.close().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if geojson {
                let collection = ranked_to_feature_collection(&ranked);
                println!("{}", serde_json::to_string_pretty(&collection)?);
            } else {
                print_ranked(&ranked);
            }
        }
        None => {
            let schools = service
                .list_all()
                .await
                .context("Failed to list schools")?;
            service.close().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&schools)?);
            } else if geojson {
                let collection = schools_to_feature_collection(&schools);
                println!("{}", serde_json::to_string_pretty(&collection)?);
            } else {
                print_schools(&schools);
            }
        }
    }

    Ok(())
}

fn print_schools(schools: &[School]) {
    if schools.is_empty() {
        println!("No schools registered");
        return;
    }

    println!("{:<36} {:>10} {:>11}  {}", "ID", "LAT", "LON", "NAME / ADDRESS");
    println!("{}", "-".repeat(80));
    for school in schools {
        println!(
            "{:<36} {:>10.5} {:>11.5}  {} / {}",
            school.id, school.latitude, school.longitude, school.name, school.address
        );
    }
    println!("{}", "-".repeat(80));
    println!("Total: {} schools", schools.len());
}

fn print_ranked(ranked: &[RankedSchool]) {
    if ranked.is_empty() {
        println!("No schools registered");
        return;
    }

    println!("{:>12}  {:<36}  {}", "DISTANCE", "ID", "NAME / ADDRESS");
    println!("{}", "-".repeat(80));
    for entry in ranked {
        println!(
            "{:>9.3} km  {:<36}  {} / {}",
            entry.distance, entry.school.id, entry.school.name, entry.school.address
        );
    }
    println!("{}", "-".repeat(80));
    println!("Total: {} schools", ranked.len());
}
