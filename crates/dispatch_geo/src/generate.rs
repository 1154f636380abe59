use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    coordinate::{Coordinate, EARTH_RADIUS_KM},
    error::GeometryError,
};

/// Linear congruential generator (Numerical Recipes constants). Scenario
/// construction must be reproducible from a seed across platforms, so the
/// seeded path does not go through `rand`.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        // Fold the high half in so every seed bit affects the sequence.
        Lcg {
            state: (seed ^ (seed >> 32)) as u32,
        }
    }

    fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        f64::from(self.state) / f64::from(u32::MAX)
    }
}

enum UnitSampler {
    Seeded(Lcg),
    Os(SmallRng),
}

impl UnitSampler {
    fn next_unit(&mut self) -> f64 {
        match self {
            UnitSampler::Seeded(lcg) => lcg.next_unit(),
            UnitSampler::Os(rng) => rng.random_range(0.0..1.0),
        }
    }
}

/// Generates `count` coordinates uniformly distributed within `radius_km` of
/// `center`. Deterministic when a seed is supplied.
pub fn generate_within_radius(
    center: &Coordinate,
    radius_km: f64,
    count: usize,
    seed: Option<u64>,
) -> Result<Vec<Coordinate>, GeometryError> {
    center.validate()?;

    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius_km));
    }

    let mut sampler = match seed {
        Some(seed) => UnitSampler::Seeded(Lcg::new(seed)),
        None => UnitSampler::Os(SmallRng::from_os_rng()),
    };

    let cos_lat = center.latitude().to_radians().cos().max(1e-9);

    let mut coordinates = Vec::with_capacity(count);
    for _ in 0..count {
        // sqrt keeps the density uniform over the disk area.
        let distance_km = radius_km * sampler.next_unit().sqrt();
        let bearing = sampler.next_unit() * std::f64::consts::TAU;

        let delta_lat = (distance_km * bearing.cos() / EARTH_RADIUS_KM).to_degrees();
        let delta_lon = (distance_km * bearing.sin() / EARTH_RADIUS_KM).to_degrees() / cos_lat;

        let latitude = (center.latitude() + delta_lat).clamp(-90.0, 90.0);
        let longitude = (center.longitude() + delta_lon).clamp(-180.0, 180.0);

        coordinates.push(Coordinate::new(latitude, longitude));
    }

    Ok(coordinates)
}
