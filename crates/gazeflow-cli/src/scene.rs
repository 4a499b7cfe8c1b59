//! Target sets built from the layout configuration

use gazeflow_config::AppConfig;
use gazeflow_core::layout::{seeded_rng, star_field};
use gazeflow_core::TargetRegistry;

pub fn mosaic_targets(config: &AppConfig) -> TargetRegistry {
    let mut rng = seeded_rng(config.mosaic.seed);
    let points = config
        .mosaic
        .layout
        .positions(config.mosaic.tile_count, &mut rng);
    TargetRegistry::from_points(&points, config.mosaic.tile_radius, 0)
}

pub fn star_targets(config: &AppConfig) -> TargetRegistry {
    let mut rng = seeded_rng(config.stars.seed);
    let points = star_field(
        config.stars.count,
        config.stars.min_distance,
        config.stars.max_distance,
        &mut rng,
    );
    TargetRegistry::from_points(&points, config.stars.radius, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenes_follow_config() {
        let mut config = AppConfig::default();
        config.mosaic.tile_count = 5;
        config.stars.count = 3;

        assert_eq!(mosaic_targets(&config).len(), 5);
        assert_eq!(star_targets(&config).ids(), vec![0, 1, 2]);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let config = AppConfig::default();
        let a: Vec<_> = star_targets(&config).iter().map(|t| t.bounds).collect();
        let b: Vec<_> = star_targets(&config).iter().map(|t| t.bounds).collect();
        assert_eq!(a, b);
    }
}
