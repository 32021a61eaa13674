use crate::datasource::{Datasource, DatasourceError, Feature, Parameters};
use mapstyle_types::{Box2d, Coord};

/// An in-memory datasource.
///
/// Features are either pushed programmatically or given as a JSON array in
/// the `inline` parameter, which lets map documents embed small datasets.
#[derive(Debug, Clone)]
pub struct MemoryDatasource {
    params: Parameters,
    features: Vec<Feature>,
}

impl Default for MemoryDatasource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatasource {
    pub const TYPE: &'static str = "memory";

    pub fn new() -> Self {
        let mut params = Parameters::new();
        params.insert("type".to_string(), Self::TYPE.to_string());
        Self {
            params,
            features: Vec::new(),
        }
    }

    /// Creates a datasource from document parameters.
    ///
    /// # Errors
    ///
    /// Returns `DatasourceError::InvalidParameter` if `inline` is not a JSON
    /// array of features.
    pub fn from_params(params: &Parameters) -> Result<Self, DatasourceError> {
        let features = match params.get("inline") {
            Some(inline) => serde_json::from_str::<Vec<Feature>>(inline).map_err(|e| {
                DatasourceError::InvalidParameter {
                    name: "inline".to_string(),
                    message: e.to_string(),
                }
            })?,
            None => Vec::new(),
        };
        Ok(Self {
            params: params.clone(),
            features,
        })
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Datasource for MemoryDatasource {
    fn envelope(&self) -> Box2d {
        let mut iter = self.features.iter();
        let Some(first) = iter.next() else {
            return Box2d::default();
        };
        iter.fold(first.envelope, |mut acc, f| {
            acc.expand_to_include(&f.envelope);
            acc
        })
    }

    fn features_at_point(&self, at: Coord) -> Result<Vec<Feature>, DatasourceError> {
        Ok(self
            .features
            .iter()
            .filter(|f| f.envelope.contains_coord(&at))
            .cloned()
            .collect())
    }

    fn features_in_box(&self, bbox: &Box2d) -> Result<Vec<Feature>, DatasourceError> {
        Ok(self
            .features
            .iter()
            .filter(|f| f.envelope.intersects(bbox))
            .cloned()
            .collect())
    }

    fn params(&self) -> &Parameters {
        &self.params
    }

    fn name(&self) -> &'static str {
        "MemoryDatasource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::Value;

    #[test]
    fn test_memory_datasource_queries() {
        let mut ds = MemoryDatasource::new();
        assert!(ds.is_empty());
        assert_eq!(ds.envelope(), Box2d::default());

        ds.push(Feature::new(1, Box2d::new(0.0, 0.0, 10.0, 10.0)).with("name", "a"));
        ds.push(Feature::point(2, Coord::new(20.0, 20.0)).with("name", "b"));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.envelope(), Box2d::new(0.0, 0.0, 20.0, 20.0));

        let hits = ds.features_at_point(Coord::new(5.0, 5.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let hits = ds.features_in_box(&Box2d::new(9.0, 9.0, 25.0, 25.0)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(ds.params().get("type").map(String::as_str), Some("memory"));
    }

    #[test]
    fn test_from_inline_params() {
        let mut params = Parameters::new();
        params.insert("type".into(), "memory".into());
        params.insert(
            "inline".into(),
            r#"[{"id": 7, "envelope": {"minx": 1, "miny": 1, "maxx": 2, "maxy": 2},
                 "properties": {"name": "x"}}]"#
                .into(),
        );
        let ds = MemoryDatasource::from_params(&params).unwrap();
        assert_eq!(ds.len(), 1);
        let hits = ds.features_at_point(Coord::new(1.5, 1.5)).unwrap();
        assert_eq!(hits[0].get("name"), Some(&Value::from("x")));

        params.insert("inline".into(), "not json".into());
        assert!(matches!(
            MemoryDatasource::from_params(&params),
            Err(DatasourceError::InvalidParameter { .. })
        ));
    }
}
