//! Greedy marker clustering.
//!
//! For renderers without a cluster plugin of their own. Seeds are taken in
//! marker order; each seed absorbs every unassigned marker within the
//! configured radius, found through an R-tree neighbour query.

use rstar::RTree;
use rstar::primitives::GeomWithData;
use survey_map_spatial_models::{ClusterConfig, MarkerCluster, MarkerSet};

/// A marker position (`[lng, lat]`) tagged with its index in the set.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Groups markers per `config`.
///
/// When clustering is disabled (or the radius is not positive) every
/// marker becomes its own cluster. Cluster positions are the mean of their
/// members; members keep marker order.
#[must_use]
pub fn cluster_markers(markers: &MarkerSet, config: &ClusterConfig) -> Vec<MarkerCluster> {
    if !config.clustering_enabled || config.radius_deg <= 0.0 {
        return markers
            .iter()
            .map(|marker| MarkerCluster {
                latitude: marker.latitude,
                longitude: marker.longitude,
                members: vec![marker.record_id.clone()],
            })
            .collect();
    }

    let tree: RTree<IndexedPoint> = RTree::bulk_load(
        markers
            .iter()
            .enumerate()
            .map(|(index, marker)| IndexedPoint::new([marker.longitude, marker.latitude], index))
            .collect(),
    );

    let max_distance_2 = config.radius_deg * config.radius_deg;
    let mut assigned = vec![false; markers.len()];
    let mut clusters = Vec::new();

    for (seed_index, seed) in markers.iter().enumerate() {
        if assigned[seed_index] {
            continue;
        }

        let mut member_indices: Vec<usize> = tree
            .locate_within_distance([seed.longitude, seed.latitude], max_distance_2)
            .map(|point| point.data)
            .filter(|&index| !assigned[index])
            .collect();
        member_indices.sort_unstable();

        for &index in &member_indices {
            assigned[index] = true;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = member_indices.len() as f64;
        let (lat_sum, lng_sum) = member_indices.iter().fold((0.0, 0.0), |(lat, lng), &index| {
            let marker = &markers.markers[index];
            (lat + marker.latitude, lng + marker.longitude)
        });

        clusters.push(MarkerCluster {
            latitude: lat_sum / count,
            longitude: lng_sum / count,
            members: member_indices
                .iter()
                .map(|&index| markers.markers[index].record_id.clone())
                .collect(),
        });
    }

    log::debug!(
        "Grouped {} markers into {} clusters at zoom {}",
        markers.len(),
        clusters.len(),
        config.zoom
    );

    clusters
}
