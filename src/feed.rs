use std::path::Path;

use serde::Deserialize;

use crate::{
    data::{Leg, Point, Route},
    error::Result,
};

#[derive(Deserialize, Debug)]
pub struct LegRow {
    pub distance: f64,
    pub duration: f64,
}

#[derive(Deserialize, Debug)]
pub struct PointRow {
    pub lng: f64,
    pub lat: f64,
}

/// A precomputed route as exported by a routing service: one file of legs, one of vertices.
#[derive(Debug)]
pub struct RouteFeed {
    pub legs: Vec<LegRow>,
    pub polyline: Vec<PointRow>,
}

fn deserialize_into<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    csv::Reader::from_path(path)?
        .deserialize()
        .map(|parse_result| parse_result.map_err(Into::into))
        .collect()
}

impl RouteFeed {
    pub fn from_paths(legs: impl AsRef<Path>, polyline: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            legs: deserialize_into(legs.as_ref())?,
            polyline: deserialize_into(polyline.as_ref())?,
        })
    }
}

impl From<RouteFeed> for Route {
    fn from(feed: RouteFeed) -> Self {
        let legs: Vec<Leg> = feed
            .legs
            .into_iter()
            .map(|row| Leg {
                distance: row.distance,
                duration: row.duration,
            })
            .collect();

        Route {
            distance: legs.iter().map(|leg| leg.distance).sum(),
            duration: legs.iter().map(|leg| leg.duration).sum(),
            coordinates: feed
                .polyline
                .into_iter()
                .map(|row| Point(row.lng, row.lat))
                .collect(),
            legs,
        }
    }
}
