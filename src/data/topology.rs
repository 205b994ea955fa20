//! TopoJSON decoding.
//!
//! A topology stores every boundary once as an arc; polygons reference arcs
//! by index (a negative index `~i` means arc `i` walked backwards). Arcs of
//! a quantized topology are delta-encoded integers that the `transform`
//! maps back to longitude/latitude.

use std::collections::HashMap;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Deserialize;

use crate::error::{LoadError, LoadResult};

type Point = [f64; 2];

/// Quantization transform of a topology.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Point {
        [
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

/// A geometry object as stored inside the topology, before arc stitching.
#[derive(Debug, Deserialize)]
pub struct GeometryObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<JsonObject>,
    #[serde(default)]
    pub arcs: Option<serde_json::Value>,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
    #[serde(default)]
    pub geometries: Vec<GeometryObject>,
}

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub objects: HashMap<String, GeometryObject>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
}

impl Topology {
    /// Parse a topology document. The buffer is used as scratch space by the
    /// SIMD parser.
    pub fn from_slice(bytes: &mut [u8]) -> Result<Self, simd_json::Error> {
        simd_json::serde::from_slice(bytes)
    }

    /// Convert the named object into a feature collection, one feature per
    /// member geometry.
    pub fn feature_collection(&self, object: &str) -> LoadResult<FeatureCollection> {
        if self.kind != "Topology" {
            return Err(LoadError::Topology(format!(
                "expected type Topology, found {}",
                self.kind
            )));
        }

        let root = self.objects.get(object).ok_or_else(|| {
            LoadError::Topology(format!("no object named '{object}' in topology"))
        })?;

        let decoder = Decoder::new(self);
        let features = if root.kind.as_deref() == Some("GeometryCollection") {
            root.geometries
                .iter()
                .map(|o| decoder.feature(o))
                .collect::<LoadResult<Vec<_>>>()?
        } else {
            vec![decoder.feature(root)?]
        };

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

struct Decoder {
    arcs: Vec<Vec<Point>>,
    transform: Option<Transform>,
}

impl Decoder {
    fn new(topology: &Topology) -> Self {
        let transform = topology.transform;
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            t.apply(x, y)
                        }
                        None => [p[0], p[1]],
                    })
                    .collect()
            })
            .collect();

        Self { arcs, transform }
    }

    fn feature(&self, object: &GeometryObject) -> LoadResult<Feature> {
        let id = object.id.as_ref().and_then(|value| match value {
            serde_json::Value::String(s) => Some(Id::String(s.clone())),
            serde_json::Value::Number(n) => Some(Id::Number(n.clone())),
            _ => None,
        });

        Ok(Feature {
            bbox: None,
            geometry: self.geometry(object)?,
            id,
            properties: Some(object.properties.clone().unwrap_or_default()),
            foreign_members: None,
        })
    }

    fn geometry(&self, object: &GeometryObject) -> LoadResult<Option<Geometry>> {
        let Some(kind) = object.kind.as_deref() else {
            return Ok(None);
        };

        let value = match kind {
            "Point" => Value::Point(self.position(&decode::<Vec<f64>>(&object.coordinates, kind)?)),
            "MultiPoint" => Value::MultiPoint(
                decode::<Vec<Vec<f64>>>(&object.coordinates, kind)?
                    .iter()
                    .map(|p| self.position(p))
                    .collect(),
            ),
            "LineString" => Value::LineString(self.line(&decode::<Vec<i64>>(&object.arcs, kind)?)?),
            "MultiLineString" => Value::MultiLineString(
                decode::<Vec<Vec<i64>>>(&object.arcs, kind)?
                    .iter()
                    .map(|refs| self.line(refs))
                    .collect::<LoadResult<_>>()?,
            ),
            "Polygon" => Value::Polygon(self.polygon(&decode::<Vec<Vec<i64>>>(&object.arcs, kind)?)?),
            "MultiPolygon" => Value::MultiPolygon(
                decode::<Vec<Vec<Vec<i64>>>>(&object.arcs, kind)?
                    .iter()
                    .map(|rings| self.polygon(rings))
                    .collect::<LoadResult<_>>()?,
            ),
            "GeometryCollection" => {
                let mut members = Vec::with_capacity(object.geometries.len());
                for member in &object.geometries {
                    if let Some(geometry) = self.geometry(member)? {
                        members.push(geometry);
                    }
                }
                Value::GeometryCollection(members)
            }
            other => {
                return Err(LoadError::Topology(format!("unknown geometry type '{other}'")));
            }
        };

        Ok(Some(Geometry::new(value)))
    }

    /// Points are quantized but not delta-encoded.
    fn position(&self, raw: &[f64]) -> Vec<f64> {
        let (x, y) = (
            raw.first().copied().unwrap_or_default(),
            raw.get(1).copied().unwrap_or_default(),
        );
        match self.transform {
            Some(t) => t.apply(x, y).to_vec(),
            None => vec![x, y],
        }
    }

    /// Stitch arcs end to end; consecutive arcs share their joint point.
    fn stitch(&self, refs: &[i64]) -> LoadResult<Vec<Point>> {
        let mut points: Vec<Point> = Vec::new();
        for &r in refs {
            let (index, reversed) = if r < 0 { (!r as usize, true) } else { (r as usize, false) };
            let arc = self.arcs.get(index).ok_or_else(|| {
                LoadError::Topology(format!("arc index {r} out of range ({} arcs)", self.arcs.len()))
            })?;

            points.pop();
            if reversed {
                points.extend(arc.iter().rev());
            } else {
                points.extend(arc.iter());
            }
        }
        Ok(points)
    }

    fn line(&self, refs: &[i64]) -> LoadResult<Vec<Vec<f64>>> {
        let mut points = self.stitch(refs)?;
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points.into_iter().map(|p| p.to_vec()).collect())
    }

    /// Rings are padded to at least four points so they stay valid polygons.
    fn ring(&self, refs: &[i64]) -> LoadResult<Vec<Vec<f64>>> {
        let mut points = self.stitch(refs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points.into_iter().map(|p| p.to_vec()).collect())
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> LoadResult<Vec<Vec<Vec<f64>>>> {
        rings.iter().map(|refs| self.ring(refs)).collect()
    }
}

fn decode<T>(value: &Option<serde_json::Value>, kind: &str) -> LoadResult<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(v) => T::deserialize(v)
            .map_err(|e| LoadError::Topology(format!("bad {kind} payload: {e}"))),
    }
}
