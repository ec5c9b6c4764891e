//! CSV export for points, paths, regions and pair distances
//!
//! Writes the current annotation set with its measurements for reporting and
//! spreadsheets. Rows follow creation order, the same order the list views use.

use crate::geo::GeoCoordinate;
use crate::store::AnnotationStore;
use crate::view::{PairDistance, PathView, PointView, RegionView};
use std::io::Write;

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

fn csv_writer_for<W: Write>(writer: W, config: &CsvExportConfig) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer)
}

/// Export points
///
/// Columns: ID, Seq, Name, Color, Latitude, Longitude
pub fn export_points_csv<W: Write>(
    writer: W,
    points: &[PointView],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv_writer_for(writer, config);

    if config.include_headers {
        csv_writer.write_record(["ID", "Seq", "Name", "Color", "Latitude", "Longitude"])?;
    }

    for point in points {
        csv_writer.write_record(&[
            point.id.to_string(),
            point.seq.to_string(),
            point.name.clone(),
            point.color.to_hex(),
            point.coordinate.lat.to_string(),
            point.coordinate.lon.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export paths
///
/// Columns: ID, Seq, Name, Color, Origin, Vertices, Length (m), Length
pub fn export_paths_csv<W: Write>(
    writer: W,
    paths: &[PathView],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv_writer_for(writer, config);

    if config.include_headers {
        csv_writer.write_record([
            "ID",
            "Seq",
            "Name",
            "Color",
            "Origin",
            "Vertices",
            "Length (m)",
            "Length",
        ])?;
    }

    for path in paths {
        let origin = match path.origin {
            crate::annotation::PathOrigin::Connected { .. } => "connected",
            crate::annotation::PathOrigin::Drawn => "drawn",
        };
        csv_writer.write_record(&[
            path.id.to_string(),
            path.seq.to_string(),
            path.name.clone(),
            path.color.to_hex(),
            origin.to_string(),
            format_vertices(&path.vertices),
            format!("{:.3}", path.length_m),
            path.length_label.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export regions
///
/// Columns: ID, Seq, Name, Color, SW Lat, SW Lon, NE Lat, NE Lon,
/// Width (m), Height (m), Width, Height
pub fn export_regions_csv<W: Write>(
    writer: W,
    regions: &[RegionView],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv_writer_for(writer, config);

    if config.include_headers {
        csv_writer.write_record([
            "ID",
            "Seq",
            "Name",
            "Color",
            "SW Lat",
            "SW Lon",
            "NE Lat",
            "NE Lon",
            "Width (m)",
            "Height (m)",
            "Width",
            "Height",
        ])?;
    }

    for region in regions {
        csv_writer.write_record(&[
            region.id.to_string(),
            region.seq.to_string(),
            region.name.clone(),
            region.color.to_hex(),
            region.sw.lat.to_string(),
            region.sw.lon.to_string(),
            region.ne.lat.to_string(),
            region.ne.lon.to_string(),
            format!("{:.3}", region.width_m),
            format!("{:.3}", region.height_m),
            region.width_label.clone(),
            region.height_label.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export the all-pairs distance matrix
///
/// Columns: From, To, Distance (m), Distance
pub fn export_pair_distances_csv<W: Write>(
    writer: W,
    pairs: &[PairDistance],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv_writer_for(writer, config);

    if config.include_headers {
        csv_writer.write_record(["From", "To", "Distance (m)", "Distance"])?;
    }

    for pair in pairs {
        csv_writer.write_record(&[
            pair.from.to_string(),
            pair.to.to_string(),
            format!("{:.3}", pair.meters),
            pair.label.clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export the whole store as four CSV sections separated by blank lines
///
/// Each section starts with a `# points` / `# paths` / `# regions` /
/// `# pair distances` marker line.
pub fn export_store_csv<W: Write>(
    mut writer: W,
    store: &AnnotationStore,
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    writeln!(writer, "# points")?;
    export_points_csv(&mut writer, &store.list_points(), config)?;
    writeln!(writer, "\n# paths")?;
    export_paths_csv(&mut writer, &store.list_paths(), config)?;
    writeln!(writer, "\n# regions")?;
    export_regions_csv(&mut writer, &store.list_regions(), config)?;
    writeln!(writer, "\n# pair distances")?;
    export_pair_distances_csv(&mut writer, &store.all_pairs_distances(), config)?;
    Ok(())
}

/// Format vertices as `lat lon;lat lon;...`
fn format_vertices(vertices: &[GeoCoordinate]) -> String {
    vertices
        .iter()
        .map(|v| format!("{} {}", v.lat, v.lon))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Color;

    fn coord(lat: f64, lon: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, lon).unwrap()
    }

    fn sample_store() -> AnnotationStore {
        let mut store = AnnotationStore::new();
        let a = store
            .add_point(coord(0.0, 0.0), Some("Inlet".to_string()), None)
            .unwrap();
        let b = store.add_point(coord(0.0, 1.0), None, None).unwrap();
        store
            .connect_points(a, b, Some("Feed".to_string()), Some(Color::YELLOW))
            .unwrap();
        store
            .add_region(coord(0.0, 0.0), coord(1.0, 1.0), None, None)
            .unwrap();
        store
    }

    fn to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> CsvExportResult<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).expect("export should succeed");
        String::from_utf8(buffer).expect("csv output should be utf-8")
    }

    #[test]
    fn test_export_points() {
        let store = sample_store();
        let points = store.list_points();
        let csv = to_string(|buf| export_points_csv(buf, &points, &CsvExportConfig::default()));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Seq,Name,Color,Latitude,Longitude");
        assert_eq!(lines[1], format!("{},1,Inlet,#0000FF,0,0", points[0].id));
        assert_eq!(lines[2], format!("{},2,Point 2,#0000FF,0,1", points[1].id));
    }

    #[test]
    fn test_export_paths() {
        let store = sample_store();
        let paths = store.list_paths();
        let csv = to_string(|buf| export_paths_csv(buf, &paths, &CsvExportConfig::default()));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID,Seq,Name,Color,Origin"));
        assert_eq!(
            lines[1],
            format!("{},1,Feed,#FFFF00,connected,0 0;0 1,111194.927,111.19 km", paths[0].id)
        );
    }

    #[test]
    fn test_export_regions_without_headers() {
        let store = sample_store();
        let regions = store.list_regions();
        let config = CsvExportConfig {
            include_headers: false,
            delimiter: b';',
        };
        let csv = to_string(|buf| export_regions_csv(buf, &regions, &config));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split(';').collect();
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[2], "Region 1");
        assert_eq!(fields[3], "#00FF00");
        assert_eq!(fields[10], "111.19 km");
    }

    #[test]
    fn test_export_pair_distances() {
        let store = sample_store();
        let pairs = store.all_pairs_distances();
        let csv =
            to_string(|buf| export_pair_distances_csv(buf, &pairs, &CsvExportConfig::default()));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "From,To,Distance (m),Distance");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(",111194.927,111.19 km"));
    }

    #[test]
    fn test_export_store_sections() {
        let store = sample_store();
        let csv = to_string(|buf| export_store_csv(buf, &store, &CsvExportConfig::default()));

        let markers: Vec<&str> = csv.lines().filter(|l| l.starts_with("# ")).collect();
        assert_eq!(markers, vec!["# points", "# paths", "# regions", "# pair distances"]);
    }

    #[test]
    fn test_names_with_delimiters_are_quoted() {
        let mut store = AnnotationStore::new();
        store
            .add_point(coord(1.0, 2.0), Some("Valve, north".to_string()), None)
            .unwrap();
        let csv = to_string(|buf| {
            export_points_csv(buf, &store.list_points(), &CsvExportConfig::default())
        });
        assert!(csv.contains("\"Valve, north\""));
    }
}
