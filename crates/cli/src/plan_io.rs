//! `global_plan.csv`: one row per pose.
//!
//! Columns: `graph_id, pose_type, x, y, heading, drillhole_id, connections`,
//! where `connections` is a `;`-separated list of neighbour ids. Reading goes
//! through polars with every column as text so id lists are never mistyped.

use anyhow::{bail, Context, Result};
use drillroute::api::PoseRecord;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

const COLUMNS: [&str; 7] = [
    "graph_id",
    "pose_type",
    "x",
    "y",
    "heading",
    "drillhole_id",
    "connections",
];

pub fn records_to_frame(records: &[PoseRecord]) -> Result<DataFrame> {
    let ids: Vec<u64> = records.iter().map(|r| r.id as u64).collect();
    let kinds: Vec<&str> = records.iter().map(|r| r.pose_type.as_str()).collect();
    let xs: Vec<f64> = records.iter().map(|r| r.x).collect();
    let ys: Vec<f64> = records.iter().map(|r| r.y).collect();
    let headings: Vec<f64> = records.iter().map(|r| r.heading).collect();
    let holes: Vec<Option<i64>> = records.iter().map(|r| r.drillhole_id).collect();
    let connections: Vec<String> = records
        .iter()
        .map(|r| {
            r.neighbors
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(";")
        })
        .collect();
    let df = df!(
        COLUMNS[0] => ids,
        COLUMNS[1] => kinds,
        COLUMNS[2] => xs,
        COLUMNS[3] => ys,
        COLUMNS[4] => headings,
        COLUMNS[5] => holes,
        COLUMNS[6] => connections,
    )?;
    Ok(df)
}

pub fn write_plan_csv(path: &Path, records: &[PoseRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let mut df = records_to_frame(records)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(rows = df.height(), path = %path.display(), "plan written");
    Ok(())
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(df
        .column(name)
        .with_context(|| format!("missing column {name}"))?
        .str()?)
}

fn parse<T: std::str::FromStr>(row: usize, name: &str, cell: Option<&str>) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text = cell.map(str::trim).unwrap_or_default();
    text.parse::<T>()
        .with_context(|| format!("row {row}: bad {name} value {text:?}"))
}

pub fn frame_to_records(df: &DataFrame) -> Result<Vec<PoseRecord>> {
    let [ids, kinds, xs, ys, headings, holes, connections] = COLUMNS.map(|c| text_column(df, c));
    let (ids, kinds, xs, ys, headings, holes, connections) =
        (ids?, kinds?, xs?, ys?, headings?, holes?, connections?);

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let drillhole_id = match holes.get(row).map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(parse::<i64>(row, "drillhole_id", Some(text))?),
        };
        let neighbors = connections
            .get(row)
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse::<usize>(row, "connections", Some(s)))
            .collect::<Result<Vec<_>>>()?;
        let Some(pose_type) = kinds.get(row) else {
            bail!("row {row}: missing pose_type");
        };
        records.push(PoseRecord {
            id: parse(row, "graph_id", ids.get(row))?,
            pose_type: pose_type.trim().to_string(),
            x: parse(row, "x", xs.get(row))?,
            y: parse(row, "y", ys.get(row))?,
            heading: parse(row, "heading", headings.get(row))?,
            drillhole_id,
            neighbors,
            lat: None,
            lon: None,
        });
    }
    Ok(records)
}

pub fn read_plan_csv(path: &Path) -> Result<Vec<PoseRecord>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let records = frame_to_records(&df)?;
    tracing::info!(rows = records.len(), path = %path.display(), "plan read");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<PoseRecord> {
        let rec =
            |id: usize, kind: &str, x: f64, hole: Option<i64>, neighbors: Vec<usize>| PoseRecord {
                id,
                pose_type: kind.to_string(),
                x,
                y: 0.25,
                heading: 0.1 * id as f64,
                drillhole_id: hole,
                neighbors,
                lat: None,
                lon: None,
            };
        vec![
            rec(0, "home", 0.0, None, vec![1]),
            rec(1, "street", 1.5, None, vec![0, 2]),
            rec(2, "hole", 3.0, Some(42), vec![1]),
            rec(3, "transit_street", 9.0, None, vec![]),
        ]
    }

    #[test]
    fn csv_round_trip_keeps_every_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("global_plan.csv");
        write_plan_csv(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("graph_id,pose_type,x,y,heading,drillhole_id,connections"));
        assert_eq!(read_plan_csv(&path).unwrap(), sample());
    }

    #[test]
    fn hand_written_rows_are_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        fs::write(
            &path,
            "graph_id,pose_type,x,y,heading,drillhole_id,connections\n\
             0,home_pose,0,0,0,,1\n\
             1,hole,2.5,0,0,7,0\n",
        )
        .unwrap();
        let records = read_plan_csv(&path).unwrap();
        assert_eq!(records[0].pose_type, "home_pose");
        assert_eq!(records[0].neighbors, vec![1]);
        assert_eq!(records[1].drillhole_id, Some(7));
        assert_eq!(records[1].x, 2.5);
    }

    #[test]
    fn bad_cells_name_the_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        fs::write(
            &path,
            "graph_id,pose_type,x,y,heading,drillhole_id,connections\n\
             0,home,zero,0,0,,\n",
        )
        .unwrap();
        let err = read_plan_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 0"));
    }
}
