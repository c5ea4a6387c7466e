use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use schools::{NewSchool, SchoolError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::StoreOptions;

/// CSV column names for each school field.
pub struct Columns {
    pub name: String,
    pub address: String,
    pub lat: String,
    pub lon: String,
}

/// Column positions resolved against the CSV header.
#[derive(Debug, PartialEq)]
struct ColumnIndices {
    name: usize,
    address: usize,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn resolve(&self, headers: &csv::StringRecord) -> Result<ColumnIndices> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .with_context(|| format!("Column '{}' not found in CSV", column))
        };

        Ok(ColumnIndices {
            name: find(&self.name)?,
            address: find(&self.address)?,
            lat: find(&self.lat)?,
            lon: find(&self.lon)?,
        })
    }
}

/// Build a school from a CSV row. Name and address are checked by the service.
fn parse_row(record: &csv::StringRecord, columns: &ColumnIndices) -> Result<NewSchool> {
    let field = |idx: usize, label: &str| {
        record
            .get(idx)
            .with_context(|| format!("Missing {}", label))
    };

    let lat: f64 = field(columns.lat, "latitude")?
        .trim()
        .parse()
        .context("Invalid latitude")?;
    let lon: f64 = field(columns.lon, "longitude")?
        .trim()
        .parse()
        .context("Invalid longitude")?;

    Ok(NewSchool::new(
        field(columns.name, "name")?,
        field(columns.address, "address")?,
        lat,
        lon,
    ))
}

pub async fn run(store: &StoreOptions, input: &Path, columns: &Columns) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let indices = columns.resolve(&headers)?;

    // Collect records for progress bar
    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let total = records.len() as u64;

    let service = store.connect().await?;

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut imported = 0u64;
    let mut skipped = 0u64;

    for (i, record) in records.iter().enumerate() {
        // Header is line 1
        let line = i + 2;

        let outcome = match parse_row(record, &indices) {
            Ok(school) => service.create(school).await,
            Err(e) => {
                pb.println(format!("Skipping line {}: {:#}", line, e));
                skipped += 1;
                pb.inc(1);
                continue;
            }
        };

        match outcome {
            Ok(_) => imported += 1,
            Err(SchoolError::Validation(e)) => {
                pb.println(format!("Skipping line {}: {}", line, e));
                skipped += 1;
            }
            Err(e) => {
                pb.abandon();
                service.close().await;
                bail!("Failed to store line {}: {}", line, e);
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    service.close().await;

    println!("Imported {} schools ({} skipped)", imported, skipped);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Columns {
        Columns {
            name: "name".to_string(),
            address: "address".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
        }
    }

    #[test]
    fn test_resolve_columns_in_any_order() {
        let headers = csv::StringRecord::from(vec!["lon", "address", "lat", "name", "extra"]);
        let indices = columns().resolve(&headers).unwrap();
        assert_eq!(
            indices,
            ColumnIndices {
                name: 3,
                address: 1,
                lat: 2,
                lon: 0,
            }
        );
    }

    #[test]
    fn test_resolve_missing_column() {
        let headers = csv::StringRecord::from(vec!["name", "address", "lat"]);
        let err = columns().resolve(&headers).unwrap_err();
        assert!(err.to_string().contains("'lon'"));
    }

    #[test]
    fn test_parse_row() {
        let headers = csv::StringRecord::from(vec!["name", "address", "lat", "lon"]);
        let indices = columns().resolve(&headers).unwrap();

        let record = csv::StringRecord::from(vec!["Oak", "1 Oak St", " 40.0", "-75.5 "]);
        let school = parse_row(&record, &indices).unwrap();
        assert_eq!(school, NewSchool::new("Oak", "1 Oak St", 40.0, -75.5));

        let record = csv::StringRecord::from(vec!["Oak", "1 Oak St", "north", "-75.5"]);
        assert!(parse_row(&record, &indices).is_err());
    }

    #[tokio::test]
    async fn test_import_skips_invalid_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv_path = dir.path().join("schools.csv");
        std::fs::write(
            &csv_path,
            "name,address,latitude,longitude\n\
             Oak,1 Oak St,40.0,-75.0\n\
             ,2 Blank St,41.0,-74.0\n\
             Pine,3 Pine Rd,abc,-74.0\n\
             Birch,4 Birch Ave,39.5,-76.0\n",
        )
        .unwrap();

        let store = StoreOptions {
            database_url: format!("sqlite://{}", dir.path().join("schools.db").display()),
            max_connections: 1,
            strict: false,
        };
        let columns = Columns {
            name: "name".to_string(),
            address: "address".to_string(),
            lat: "latitude".to_string(),
            lon: "longitude".to_string(),
        };

        run(&store, &csv_path, &columns).await.unwrap();

        let service = store.connect().await.unwrap();
        let names: Vec<_> = service
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Birch", "Oak"]);
    }
}
