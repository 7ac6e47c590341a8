//! Packaged ears geometry descriptors.
//!
//! The two variants (regular and slim arm model) are compiled in from the
//! crate's assets, live for the process lifetime and are never mutated.
//! Selecting between them is pure and infallible.

/// Geometry descriptor for the regular (4px arm) ears model.
const EARS_GEOMETRY: &str = include_str!("../assets/geometry.humanoid.ears.json");

/// Geometry descriptor for the slim (3px arm) ears model.
const EARS_GEOMETRY_SLIM: &str = include_str!("../assets/geometry.humanoid.ears_slim.json");

/// An opaque geometry pair as consumed by the host skin model: the resource
/// name header selecting the geometry, and the geometry data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinGeometry {
    pub geometry_name: String,
    pub geometry_data: &'static str,
}

/// Selects the ears geometry for the given arm model.
#[must_use]
pub fn ears_geometry(slim: bool) -> SkinGeometry {
    let variant = if slim { "Slim" } else { "" };

    SkinGeometry {
        geometry_name: format!(
            "{{\"geometry\" :{{\"default\" :\"geometry.humanoid.ears{variant}\"}}}}"
        ),
        geometry_data: if slim {
            EARS_GEOMETRY_SLIM
        } else {
            EARS_GEOMETRY
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_matches_the_arm_model() {
        let regular = ears_geometry(false);
        let slim = ears_geometry(true);

        assert!(regular.geometry_name.contains("geometry.humanoid.ears\""));
        assert!(slim.geometry_name.contains("geometry.humanoid.earsSlim"));
        assert_ne!(regular.geometry_data, slim.geometry_data);
    }

    #[test]
    fn descriptors_are_valid_json_naming_their_geometry() {
        for (slim, key) in [(false, "geometry.humanoid.ears"), (true, "geometry.humanoid.earsSlim")] {
            let geometry = ears_geometry(slim);

            let data: serde_json::Value =
                serde_json::from_str(geometry.geometry_data).expect("geometry data should parse");
            assert!(data.get(key).is_some(), "missing {key}");

            let name: serde_json::Value =
                serde_json::from_str(&geometry.geometry_name).expect("geometry name should parse");
            assert_eq!(name["geometry"]["default"], key);
        }
    }
}
