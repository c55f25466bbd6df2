use crate::{Diagnostic, Diagnostics, Error, Result};
use geojson::{Feature, FeatureCollection, Geometry, PolygonType, feature::Id};
use serde_json::{Map, Value};

/// Turns a decoded backend response into a GeoJSON feature collection.
///
/// Every entry of the response's `Items` array becomes a [Feature]:
///
/// - `id` moves to the feature id. Records without a UUID id are dropped.
/// - `coordinates` becomes a polygon geometry, unless `skip_geometry` is set.
///   It may be an array or a string that encodes one. Records without usable
///   coordinates are kept with a `null` geometry.
/// - Everything else becomes the feature's properties.
///
/// Dropped records and missing geometries are reported to `diagnostics`.
///
/// Always returns a collection, even for a single feature. Returns
/// [Error::NoData] if there are no features.
///
/// # Examples
///
/// ```
/// use geocore::{TracingDiagnostics, assemble};
/// use serde_json::json;
///
/// let decoded = json!({
///     "Items": [{
///         "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
///         "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
///         "name": "A"
///     }]
/// });
/// let serde_json::Value::Object(decoded) = decoded else { unreachable!() };
/// let collection = assemble(decoded, false, &TracingDiagnostics).unwrap();
/// assert_eq!(collection.features.len(), 1);
/// ```
pub fn assemble(
    mut decoded: Map<String, Value>,
    skip_geometry: bool,
    diagnostics: &dyn Diagnostics,
) -> Result<FeatureCollection> {
    let items = match decoded.shift_remove("Items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let mut features = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(record) = item else {
            diagnostics.emit(Diagnostic::InvalidRecord(item));
            continue;
        };
        if let Some(feature) = to_feature(record, skip_geometry, diagnostics) {
            features.push(feature);
        }
    }
    if features.is_empty() {
        return Err(Error::NoData);
    }
    tracing::debug!("returning feature collection of {} feature(s)", features.len());
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn to_feature(
    mut record: Map<String, Value>,
    skip_geometry: bool,
    diagnostics: &dyn Diagnostics,
) -> Option<Feature> {
    let id = match record.shift_remove("id") {
        Some(Value::String(id)) if crate::is_uuid(&id) => id,
        id => {
            diagnostics.emit(Diagnostic::InvalidId {
                id: id.unwrap_or(Value::Null),
            });
            return None;
        }
    };
    let coordinates = record.shift_remove("coordinates");
    let geometry = if skip_geometry {
        tracing::debug!("skipped geometry");
        None
    } else {
        polygon(&id, coordinates, diagnostics)
    };
    Some(Feature {
        bbox: None,
        geometry,
        id: Some(Id::String(id)),
        properties: Some(record),
        foreign_members: None,
    })
}

fn polygon(
    id: &str,
    coordinates: Option<Value>,
    diagnostics: &dyn Diagnostics,
) -> Option<Geometry> {
    let invalid = |message: String| {
        diagnostics.emit(Diagnostic::InvalidCoordinates {
            id: id.to_string(),
            message,
        })
    };
    let missing = || {
        diagnostics.emit(Diagnostic::MissingGeometry { id: id.to_string() });
    };
    let coordinates = match coordinates {
        None | Some(Value::Null) => {
            missing();
            return None;
        }
        Some(Value::String(s)) => {
            tracing::debug!("try convert coordinates to an array");
            match serde_json::from_str::<Value>(&s) {
                Ok(coordinates) => coordinates,
                Err(err) => {
                    invalid(err.to_string());
                    return None;
                }
            }
        }
        Some(coordinates) => coordinates,
    };
    let rings: PolygonType = match serde_json::from_value(coordinates) {
        Ok(rings) => rings,
        Err(err) => {
            invalid(err.to_string());
            return None;
        }
    };
    if rings.iter().all(Vec::is_empty) {
        missing();
        None
    } else if rings.iter().any(Vec::is_empty) {
        invalid("empty linear ring".to_string());
        None
    } else if rings.iter().flatten().any(|position| position.len() < 2) {
        invalid("every position needs at least an x and a y".to_string());
        None
    } else {
        Some(Geometry::new(geojson::Value::Polygon(rings)))
    }
}
