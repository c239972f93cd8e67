use ahash::AHashMap;
use geo::Point;

use crate::geom::Geometries;

/// One administrative unit and the attributes attached to it by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub id: String,
    pub name: Option<String>,
    /// Parent-region label the district was selected by.
    pub region: String,
    /// Outcome share as a fraction, when a parsable election row matched.
    pub vote_share: Option<f64>,
    /// Distance from the centroid to the nearest facility.
    pub dist_to_mine_km: Option<f64>,
    /// Centroid in the planar distance CRS.
    pub centroid: Option<Point<f64>>,
    /// Row index of the nearest facility, with its status and kind.
    pub nearest_facility: Option<usize>,
    pub nearest_status: Option<String>,
    pub nearest_kind: Option<String>,
}

impl District {
    pub fn new(id: impl Into<String>, name: Option<String>, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name,
            region: region.into(),
            vote_share: None,
            dist_to_mine_km: None,
            centroid: None,
            nearest_facility: None,
            nearest_status: None,
            nearest_kind: None,
        }
    }
}

/// Districts in file order, paired one-to-one with their polygons in the boundary CRS.
///
/// Stages never modify a layer in place; each returns a new layer with more attributes filled in.
#[derive(Debug, Clone)]
pub struct DistrictLayer {
    districts: Vec<District>,
    /// id -> position; the first occurrence wins until the merge rejects duplicates.
    index: AHashMap<String, usize>,
    geoms: Geometries,
}

impl DistrictLayer {
    pub fn new(districts: Vec<District>, geoms: Geometries) -> anyhow::Result<Self> {
        anyhow::ensure!(districts.len() == geoms.len(),
            "[district] {} districts but {} geometries", districts.len(), geoms.len());
        let mut index = AHashMap::with_capacity(districts.len());
        for (i, district) in districts.iter().enumerate() {
            index.entry(district.id.clone()).or_insert(i);
        }
        Ok(Self { districts, index, geoms })
    }

    #[inline] pub fn len(&self) -> usize { self.districts.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.districts.is_empty() }

    #[inline] pub fn districts(&self) -> &[District] { &self.districts }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    /// EPSG code of the district polygons.
    #[inline] pub fn epsg(&self) -> u32 { self.geoms.epsg() }

    /// Look up a district by id.
    pub fn get(&self, id: &str) -> Option<&District> {
        self.index.get(id).map(|&i| &self.districts[i])
    }

    pub fn vote_shares(&self) -> Vec<Option<f64>> {
        self.districts.iter().map(|d| d.vote_share).collect()
    }

    pub fn distances_km(&self) -> Vec<Option<f64>> {
        self.districts.iter().map(|d| d.dist_to_mine_km).collect()
    }

    /// Copy the layer, applying `f` to every district; ids and geometry are kept unchanged.
    pub(crate) fn map_districts(&self, mut f: impl FnMut(usize, &District) -> District) -> Self {
        Self {
            districts: self.districts.iter().enumerate()
                .map(|(i, d)| District { id: d.id.clone(), ..f(i, d) })
                .collect(),
            index: self.index.clone(),
            geoms: self.geoms.clone(),
        }
    }
}
