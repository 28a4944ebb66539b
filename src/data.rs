use crate::types::{Dataset, DatasetRecord, FileIssue, NamedUpload, GEOMETRY_COLUMN, WGS84_CRS};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::Geometry;
use serde_json::Value as JsonValue;
use wkt::TryFromWkt;

/// Result of running the pipeline over one batch of uploads.
///
/// Datasets keep file processing order; a later file whose derived name
/// collides with an earlier one replaces it in place.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub datasets: Vec<Dataset>,
    pub issues: Vec<FileIssue>,
}

impl IngestOutcome {
    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    fn insert(&mut self, dataset: Dataset) {
        if let Some(existing) = self.datasets.iter_mut().find(|d| d.name == dataset.name) {
            *existing = dataset;
        } else {
            self.datasets.push(dataset);
        }
    }
}

/// Parse every upload into a named dataset of WKT-backed records.
///
/// A file that fails to parse is recorded as an issue and skipped; it never
/// aborts the rest of the batch. A file whose rows all lose their geometry
/// yields no dataset at all.
pub fn ingest_uploads(uploads: &[NamedUpload]) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    for upload in uploads {
        let name = derive_dataset_name(&upload.file_name);
        match load_dataset(name, &upload.bytes) {
            Ok(dataset) => {
                if dataset.records.is_empty() {
                    continue;
                }
                outcome.insert(dataset);
            }
            Err(e) => outcome.issues.push(FileIssue {
                file: upload.file_name.clone(),
                message: format!("{:#}", e),
            }),
        }
    }

    outcome
}

/// Dataset name is the text before the first `.` of the file name.
pub fn derive_dataset_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

fn load_dataset(name: &str, bytes: &[u8]) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().from_reader(bytes);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();

    let geometry_idx = headers
        .iter()
        .position(|h| h == GEOMETRY_COLUMN)
        .ok_or_else(|| anyhow!("Column '{}' not found in CSV", GEOMETRY_COLUMN))?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != geometry_idx)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for result in rdr.records() {
        let record = result.context("Failed to read CSV record")?;

        // Rows with absent or unparseable geometry are dropped without
        // individual errors; the count is the only trace they leave.
        let geometry = match parse_geometry(record.get(geometry_idx).unwrap_or("")) {
            Some(g) => g,
            None => {
                skipped_rows += 1;
                continue;
            }
        };

        let mut attributes = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            if i == geometry_idx {
                continue;
            }
            attributes.insert(header.to_string(), infer_value(record.get(i).unwrap_or("")));
        }

        records.push(DatasetRecord {
            attributes,
            geometry,
        });
    }

    Ok(Dataset {
        name: name.to_string(),
        crs: WGS84_CRS,
        columns,
        records,
        skipped_rows,
    })
}

/// Empty text means the row has no geometry; anything else must be WKT.
fn parse_geometry(text: &str) -> Option<Geometry<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Geometry::try_from_wkt_str(text).ok()
}

/// Attribute cells arrive as text; surface them as numbers where they parse
/// as numbers so tooltips and GeoJSON consumers see typed values.
fn infer_value(raw: &str) -> JsonValue {
    if raw.is_empty() {
        return JsonValue::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return JsonValue::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return JsonValue::from(f);
        }
    }
    JsonValue::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, body: &str) -> NamedUpload {
        NamedUpload {
            file_name: name.to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn derive_name_takes_text_before_first_dot() {
        assert_eq!(derive_dataset_name("roads.csv"), "roads");
        assert_eq!(derive_dataset_name("areas.geo.csv"), "areas");
        assert_eq!(derive_dataset_name("noext"), "noext");
    }

    #[test]
    fn keeps_only_rows_with_valid_geometry() {
        let outcome = ingest_uploads(&[upload(
            "roads.csv",
            "name,geometry\nMain St,\"LINESTRING(0 0, 1 1)\"\nBad,\n",
        )]);

        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.datasets.len(), 1);

        let dataset = &outcome.datasets[0];
        assert_eq!(dataset.name, "roads");
        assert_eq!(dataset.crs, WGS84_CRS);
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.skipped_rows, 1);
        assert_eq!(
            dataset.records[0].attributes.get("name"),
            Some(&JsonValue::String("Main St".to_string()))
        );
        assert!(matches!(
            dataset.records[0].geometry,
            Geometry::LineString(_)
        ));
    }

    #[test]
    fn unparseable_wkt_is_dropped_silently() {
        let outcome = ingest_uploads(&[upload(
            "mixed.csv",
            "name,geometry\nGood,POINT(1 2)\nBad,not wkt at all\n",
        )]);

        assert!(outcome.issues.is_empty());
        let dataset = &outcome.datasets[0];
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.skipped_rows, 1);
    }

    #[test]
    fn later_duplicate_name_overwrites_earlier() {
        let outcome = ingest_uploads(&[
            upload("areas.csv", "id,geometry\n1,POINT(0 0)\n"),
            upload("areas.geo.csv", "id,geometry\n2,POINT(1 1)\n3,POINT(2 2)\n"),
        ]);

        assert_eq!(outcome.datasets.len(), 1);
        let dataset = &outcome.datasets[0];
        assert_eq!(dataset.name, "areas");
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(
            dataset.records[0].attributes.get("id"),
            Some(&JsonValue::from(2))
        );
    }

    #[test]
    fn dataset_with_no_surviving_rows_is_dropped() {
        let outcome = ingest_uploads(&[upload(
            "empty.csv",
            "name,geometry\nA,\nB,garbage\n",
        )]);

        assert!(outcome.datasets.is_empty());
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn missing_geometry_column_is_reported_per_file() {
        let outcome = ingest_uploads(&[
            upload("bad.csv", "a,b\n1,2\n"),
            upload("good.csv", "name,geometry\nA,POINT(3 4)\n"),
        ]);

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].file, "bad.csv");
        assert!(outcome.issues[0].message.contains("geometry"));

        assert_eq!(outcome.datasets.len(), 1);
        assert_eq!(outcome.datasets[0].name, "good");
    }

    #[test]
    fn malformed_csv_skips_the_file_but_not_the_batch() {
        // second row has too few fields, which fails the whole file
        let outcome = ingest_uploads(&[
            upload("broken.csv", "name,geometry\nA\n"),
            upload("ok.csv", "name,geometry\nA,POINT(1 2)\n"),
        ]);

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].file, "broken.csv");
        assert_eq!(outcome.datasets.len(), 1);
        assert_eq!(outcome.datasets[0].name, "ok");
    }

    #[test]
    fn attribute_values_are_type_inferred() {
        assert_eq!(infer_value(""), JsonValue::Null);
        assert_eq!(infer_value("12"), JsonValue::from(12));
        assert_eq!(infer_value("1.5"), JsonValue::from(1.5));
        assert_eq!(
            infer_value("Main St"),
            JsonValue::String("Main St".to_string())
        );
    }

    #[test]
    fn geometry_parsing_accepts_wkt_and_rejects_noise() {
        assert!(parse_geometry("POINT(1 2)").is_some());
        assert!(parse_geometry("POLYGON((0 0, 1 0, 1 1, 0 0))").is_some());
        assert!(parse_geometry("").is_none());
        assert!(parse_geometry("   ").is_none());
        assert!(parse_geometry("POINT(a b)").is_none());
    }
}
