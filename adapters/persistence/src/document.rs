//! Level document codec.
//!
//! The document is walked as a [`Value`] tree so that a malformed node only
//! costs its own contents. References are stored as identifier strings and
//! resolved to pool indices once every array has been read.

use serde_json::{json, Map, Value};
use skyweave_core::{
    Choreography, Formation, FormationIndex, FormationSection, Level, Path, PathIndex, ShipModel,
    Vec3, Wave, Waypoint,
};

use crate::PersistenceError;

const PATHS_KEY: &str = "paths";
const FORMATIONS_KEY: &str = "formations";
const LEVELS_KEY: &str = "levels";

/// Formation section whose path is still referenced by identifier.
struct RawSection {
    path_id: String,
    ship_count: u32,
    model: ShipModel,
}

struct RawFormation {
    id: String,
    sections: Vec<RawSection>,
}

struct RawWave {
    spawn_time_s: f32,
    formation_id: String,
}

#[derive(Default)]
struct RawDocument {
    paths: Vec<Path>,
    formations: Vec<RawFormation>,
    levels: Vec<Vec<RawWave>>,
}

impl RawDocument {
    /// Replaces identifier references with indices into the final pools.
    ///
    /// The first entry carrying an identifier wins; unknown identifiers fall
    /// back to the sentinel. The empty identifier names the sentinel itself.
    fn resolve(self) -> Choreography {
        let formations = self
            .formations
            .iter()
            .map(|formation| {
                let sections = formation
                    .sections
                    .iter()
                    .map(|section| {
                        let path = resolve_id(&section.path_id, self.paths.iter().map(Path::id))
                            .map_or(PathIndex::SENTINEL, PathIndex::new);
                        if path == PathIndex::SENTINEL && !section.path_id.is_empty() {
                            log::warn!(
                                "formation {:?} references unknown path {:?}",
                                formation.id,
                                section.path_id
                            );
                        }
                        FormationSection::new(path, section.ship_count, section.model)
                    })
                    .collect();
                Formation::new(formation.id.clone(), sections)
            })
            .collect();

        let levels = self
            .levels
            .iter()
            .enumerate()
            .map(|(position, waves)| {
                let waves = waves
                    .iter()
                    .map(|wave| {
                        let formation = resolve_id(
                            &wave.formation_id,
                            self.formations.iter().map(|formation| formation.id.as_str()),
                        )
                        .map_or(FormationIndex::SENTINEL, FormationIndex::new);
                        if formation == FormationIndex::SENTINEL && !wave.formation_id.is_empty()
                        {
                            log::warn!(
                                "level {position} references unknown formation {:?}",
                                wave.formation_id
                            );
                        }
                        Wave::new(wave.spawn_time_s, formation)
                    })
                    .collect();
                Level::new(waves)
            })
            .collect();

        Choreography::from_parts(self.paths, formations, levels)
    }
}

/// Pool index of the first identifier equal to `id`, offset past the sentinel.
fn resolve_id<'a>(id: &str, mut ids: impl Iterator<Item = &'a str>) -> Option<usize> {
    ids.position(|candidate| candidate == id)
        .map(|position| position + 1)
}

/// Parses a level document into a fully resolved store.
pub(crate) fn decode(text: &str) -> Result<Choreography, PersistenceError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Array(nodes) = root else {
        return Err(PersistenceError::NotADocument);
    };

    let mut document = RawDocument::default();
    for node in &nodes {
        let Some(object) = node.as_object() else {
            log::warn!("skipping non-object top-level node");
            continue;
        };
        for (key, value) in object {
            match key.as_str() {
                PATHS_KEY => document.paths.extend(decode_list(value, key, decode_path)),
                FORMATIONS_KEY => document
                    .formations
                    .extend(decode_list(value, key, decode_formation)),
                LEVELS_KEY => document.levels.extend(decode_list(value, key, decode_level)),
                other => log::warn!("ignoring unknown top-level key {other:?}"),
            }
        }
    }

    Ok(document.resolve())
}

/// Decodes every element of an array node, skipping the malformed ones.
fn decode_list<T>(value: &Value, what: &str, decode: fn(&Value) -> Option<T>) -> Vec<T> {
    let Some(items) = value.as_array() else {
        log::warn!("expected {what} to be an array, skipping it");
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let decoded = decode(item);
            if decoded.is_none() {
                log::warn!("skipping malformed entry {position} of {what}");
            }
            decoded
        })
        .collect()
}

fn decode_path(value: &Value) -> Option<Path> {
    let object = value.as_object()?;
    let id = decode_id(object)?;
    let waypoints = nested_list(object, "waypoints", decode_waypoint);
    Some(Path::new(id, waypoints))
}

/// Identifier of a path or formation. The empty identifier is reserved for
/// sentinel references and never names a stored entry.
fn decode_id(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("id")?
        .as_str()
        .filter(|id| !id.is_empty())
}

fn decode_waypoint(value: &Value) -> Option<Waypoint> {
    let object = value.as_object()?;
    let point = decode_vec3(object.get("waypoint")?)?;
    let control = decode_vec3(object.get("control")?)?;
    Some(Waypoint::new(point, control))
}

fn decode_vec3(value: &Value) -> Option<Vec3> {
    match value.as_array()?.as_slice() {
        [x, y, z] => Some(Vec3::new(
            x.as_f64()? as f32,
            y.as_f64()? as f32,
            z.as_f64()? as f32,
        )),
        _ => None,
    }
}

fn decode_formation(value: &Value) -> Option<RawFormation> {
    let object = value.as_object()?;
    let id = decode_id(object)?.to_owned();
    let sections = nested_list(object, "sections", decode_section);
    Some(RawFormation { id, sections })
}

fn decode_section(value: &Value) -> Option<RawSection> {
    let object = value.as_object()?;
    let path_id = object.get("pathId")?.as_str()?.to_owned();
    let ship_count = u32::try_from(object.get("numShips")?.as_u64()?).ok()?;
    let model = match object.get("model").and_then(Value::as_u64) {
        Some(index) => ShipModel::from_index(index).unwrap_or_else(|| {
            log::warn!("unknown ship model {index}, using the default");
            ShipModel::default()
        }),
        None => ShipModel::default(),
    };
    Some(RawSection {
        path_id,
        ship_count,
        model,
    })
}

fn decode_level(value: &Value) -> Option<Vec<RawWave>> {
    let object = value.as_object()?;
    Some(nested_list(object, "waves", decode_wave))
}

fn decode_wave(value: &Value) -> Option<RawWave> {
    let object = value.as_object()?;
    let spawn_time_s = object.get("spawnTimeS")?.as_f64()? as f32;
    if !spawn_time_s.is_finite() || spawn_time_s < 0.0 {
        return None;
    }
    let formation_id = object.get("formationId")?.as_str()?.to_owned();
    Some(RawWave {
        spawn_time_s,
        formation_id,
    })
}

/// Decodes an optional array field; a missing field yields no elements.
fn nested_list<T>(
    object: &Map<String, Value>,
    key: &str,
    decode: fn(&Value) -> Option<T>,
) -> Vec<T> {
    object
        .get(key)
        .map(|value| decode_list(value, key, decode))
        .unwrap_or_default()
}

/// Serialises every editable entry, writing references as identifiers.
pub(crate) fn encode(choreography: &Choreography) -> Value {
    let path_id = |path: PathIndex| choreography.path(path).map_or("", Path::id);
    let formation_id =
        |formation: FormationIndex| choreography.formation(formation).map_or("", Formation::id);

    let paths: Vec<Value> = choreography
        .editable_paths()
        .map(|(_, path)| {
            let waypoints: Vec<Value> = path
                .waypoints()
                .iter()
                .map(|waypoint| {
                    json!({
                        "waypoint": waypoint.point.to_array(),
                        "control": waypoint.control.to_array(),
                    })
                })
                .collect();
            json!({ "id": path.id(), "waypoints": waypoints })
        })
        .collect();

    let formations: Vec<Value> = choreography
        .editable_formations()
        .map(|(_, formation)| {
            let sections: Vec<Value> = formation
                .sections()
                .iter()
                .map(|section| {
                    json!({
                        "pathId": path_id(section.path),
                        "numShips": section.ship_count,
                        "model": section.model.index(),
                    })
                })
                .collect();
            json!({ "id": formation.id(), "sections": sections })
        })
        .collect();

    let levels: Vec<Value> = choreography
        .levels()
        .iter()
        .map(|level| {
            let waves: Vec<Value> = level
                .waves()
                .iter()
                .map(|wave| {
                    json!({
                        "spawnTimeS": wave.spawn_time_s,
                        "formationId": formation_id(wave.formation),
                    })
                })
                .collect();
            json!({ "waves": waves })
        })
        .collect();

    json!([
        { "paths": paths },
        { "formations": formations },
        { "levels": levels },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_identifier_wins() {
        let ids = ["a", "b", "a"];
        assert_eq!(resolve_id("a", ids.into_iter()), Some(1));
        assert_eq!(resolve_id("b", ids.into_iter()), Some(2));
        assert_eq!(resolve_id("c", ids.into_iter()), None);
    }

    #[test]
    fn empty_identifiers_are_malformed() {
        assert!(decode_path(&json!({ "id": "", "waypoints": [] })).is_none());
        assert!(decode_formation(&json!({ "id": "", "sections": [] })).is_none());
        assert!(decode_path(&json!({ "id": "p" })).is_some());
    }

    #[test]
    fn vectors_need_exactly_three_numbers() {
        assert_eq!(
            decode_vec3(&json!([1, 2.5, -3])),
            Some(Vec3::new(1.0, 2.5, -3.0))
        );
        assert_eq!(decode_vec3(&json!([1, 2])), None);
        assert_eq!(decode_vec3(&json!([1, "2", 3])), None);
        assert_eq!(decode_vec3(&json!({"x": 1})), None);
    }

    #[test]
    fn sentinel_only_store_encodes_empty_arrays() {
        let value = encode(&Choreography::new());
        assert_eq!(
            value,
            json!([{ "paths": [] }, { "formations": [] }, { "levels": [] }])
        );
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let section = decode_section(&json!({ "pathId": "p", "numShips": 2, "model": 42 }))
            .expect("section decodes");
        assert_eq!(section.model, ShipModel::default());
        assert_eq!(section.ship_count, 2);
    }

    #[test]
    fn negative_spawn_time_is_malformed() {
        assert!(decode_wave(&json!({ "spawnTimeS": -1.0, "formationId": "f" })).is_none());
        assert!(decode_wave(&json!({ "spawnTimeS": 1.5, "formationId": "f" })).is_some());
    }
}
