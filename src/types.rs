use geo::Geometry;
use serde::Serialize;
use serde_json::{Map, Value};

/// All datasets are pinned to plain longitude/latitude. Uploads carry no
/// reference system of their own and nothing reprojects.
pub const WGS84_CRS: &str = "EPSG:4326";

/// The distinguished CSV column holding well-known-text geometry.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// One uploaded file, held only for the duration of a single request.
#[derive(Debug, Clone)]
pub struct NamedUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One CSV row that survived geometry materialization.
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    // Non-geometry columns, values inferred as number/string/null
    pub attributes: Map<String, Value>,
    pub geometry: Geometry<f64>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub crs: &'static str,
    /// Non-geometry header names in file order; drives tooltip field order.
    pub columns: Vec<String>,
    pub records: Vec<DatasetRecord>,
    /// Rows dropped for absent or unparseable geometry.
    pub skipped_rows: usize,
}

/// A file that could not be ingested at all, reported to the user by name.
#[derive(Debug, Clone, Serialize)]
pub struct FileIssue {
    pub file: String,
    pub message: String,
}
