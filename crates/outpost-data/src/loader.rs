//! Resolution pipeline: reads data files, resolves cross-references, builds
//! the core's in-memory providers.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_game_data`] and [`load_plan`] on
//! top of them.

use crate::schema::*;
use outpost_core::empire::{EmpireContext, Faction};
use outpost_core::extraction::ResourceType;
use outpost_core::id::{CogcProgram, ExpertiseType, PerWorkforce, UnknownKey, WorkforceType};
use outpost_core::plan::{Plan, MAX_PERMITS, MIN_PERMITS};
use outpost_core::price::{CxPreferences, ExchangeEntry, MarketData};
use outpost_core::registry::{
    Building, BuildingType, Material, MaterialAmount, Planet, PlanetResource, Recipe, Registry,
    RegistryBuilder, RegistryError,
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The resolved data failed registry validation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataLoadError {
    fn unknown_key(file: &Path, err: UnknownKey) -> Self {
        DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: err.value,
            expected_kind: err.kind,
        }
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Enum names
// ===========================================================================

fn parse_building_type(name: &str, file: &Path) -> Result<BuildingType, DataLoadError> {
    match name {
        "INFRASTRUCTURE" => Ok(BuildingType::Infrastructure),
        "PLANETARY" => Ok(BuildingType::Planetary),
        "PRODUCTION" => Ok(BuildingType::Production),
        _ => Err(DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind: "building type",
        }),
    }
}

fn parse_resource_type(name: &str, file: &Path) -> Result<ResourceType, DataLoadError> {
    match name {
        "MINERAL" => Ok(ResourceType::Mineral),
        "GASEOUS" => Ok(ResourceType::Gaseous),
        "LIQUID" => Ok(ResourceType::Liquid),
        _ => Err(DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind: "resource type",
        }),
    }
}

fn parse_faction(name: &str, file: &Path) -> Result<Faction, DataLoadError> {
    match name {
        "ANTARES" => Ok(Faction::Antares),
        "BENTEN" => Ok(Faction::Benten),
        "HORTUS" => Ok(Faction::Hortus),
        "MORIA" => Ok(Faction::Moria),
        _ => Err(DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind: "faction",
        }),
    }
}

fn resolve_workforce(
    map: &BTreeMap<String, u32>,
    file: &Path,
) -> Result<PerWorkforce<u32>, DataLoadError> {
    let mut table = PerWorkforce::default();
    for (name, &count) in map {
        let wf: WorkforceType = name
            .parse()
            .map_err(|e| DataLoadError::unknown_key(file, e))?;
        table[wf] = count;
    }
    Ok(table)
}

fn resolve_amounts(
    amounts: &[AmountData],
    materials: &HashMap<String, Material>,
    file: &Path,
) -> Result<Vec<MaterialAmount>, DataLoadError> {
    amounts
        .iter()
        .map(|a| {
            let material = resolve_name(materials, a.ticker(), file, "material")?;
            Ok(MaterialAmount::new(&material.ticker, a.amount()))
        })
        .collect()
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Everything loaded from a data directory.
#[derive(Debug)]
pub struct GameData {
    pub registry: Registry,
    pub market: MarketData,
    pub empires: HashMap<String, EmpireContext>,
}

fn load_materials(dir: &Path) -> Result<HashMap<String, Material>, DataLoadError> {
    let path = require_data_file(dir, "materials")?;
    let data: Vec<MaterialData> = deserialize_list(&path, "materials")?;
    let mut materials = HashMap::new();
    for m in data {
        check_duplicate(&materials, &m.ticker, &path)?;
        let name = if m.name.is_empty() { m.ticker.clone() } else { m.name };
        materials.insert(
            m.ticker.clone(),
            Material {
                ticker: m.ticker,
                name,
                category: m.category,
                weight: m.weight,
                volume: m.volume,
            },
        );
    }
    Ok(materials)
}

fn load_buildings(
    dir: &Path,
    materials: &HashMap<String, Material>,
) -> Result<HashMap<String, Building>, DataLoadError> {
    let path = require_data_file(dir, "buildings")?;
    let data: Vec<BuildingData> = deserialize_list(&path, "buildings")?;
    let mut buildings = HashMap::new();
    for b in data {
        check_duplicate(&buildings, &b.ticker, &path)?;
        let expertise = b
            .expertise
            .as_deref()
            .map(|name| name.parse::<ExpertiseType>())
            .transpose()
            .map_err(|e| DataLoadError::unknown_key(&path, e))?;
        let habitation = b
            .habitation
            .as_ref()
            .map(|map| resolve_workforce(map, &path))
            .transpose()?;
        let name = if b.name.is_empty() { b.ticker.clone() } else { b.name.clone() };
        buildings.insert(
            b.ticker.clone(),
            Building {
                ticker: b.ticker.clone(),
                name,
                building_type: parse_building_type(&b.building_type, &path)?,
                expertise,
                area_cost: b.area_cost,
                workforce: resolve_workforce(&b.workforce, &path)?,
                habitation,
                construction_materials: resolve_amounts(&b.construction_materials, materials, &path)?,
            },
        );
    }
    Ok(buildings)
}

fn load_recipes(
    dir: &Path,
    materials: &HashMap<String, Material>,
    buildings: &HashMap<String, Building>,
) -> Result<Vec<Recipe>, DataLoadError> {
    let path = require_data_file(dir, "recipes")?;
    let data: Vec<RecipeData> = deserialize_list(&path, "recipes")?;
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut recipes = Vec::with_capacity(data.len());
    for r in data {
        check_duplicate(&seen, &r.recipe_id, &path)?;
        seen.insert(r.recipe_id.clone(), ());
        let building = resolve_name(buildings, &r.building, &path, "building")?;
        recipes.push(Recipe {
            recipe_id: r.recipe_id,
            building_ticker: building.ticker.clone(),
            inputs: resolve_amounts(&r.inputs, materials, &path)?,
            outputs: resolve_amounts(&r.outputs, materials, &path)?,
            time_ms: r.time_ms,
        });
    }
    Ok(recipes)
}

fn load_planets(
    dir: &Path,
    materials: &HashMap<String, Material>,
) -> Result<Vec<Planet>, DataLoadError> {
    let path = require_data_file(dir, "planets")?;
    let data: Vec<PlanetData> = deserialize_list(&path, "planets")?;
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut planets = Vec::with_capacity(data.len());
    for p in data {
        check_duplicate(&seen, &p.planet_id, &path)?;
        seen.insert(p.planet_id.clone(), ());
        let resources = p
            .resources
            .iter()
            .map(|r| {
                let material = resolve_name(materials, &r.ticker, &path, "material")?;
                Ok(PlanetResource {
                    ticker: material.ticker.clone(),
                    resource_type: parse_resource_type(&r.resource_type, &path)?,
                    daily_extraction: r.daily_extraction,
                })
            })
            .collect::<Result<Vec<_>, DataLoadError>>()?;
        let cogc_program = match p.cogc_program.as_deref() {
            None => CogcProgram::None,
            Some(raw) => raw
                .parse()
                .map_err(|e| DataLoadError::unknown_key(&path, e))?,
        };
        let name = if p.name.is_empty() { p.planet_id.clone() } else { p.name };
        planets.push(Planet {
            planet_id: p.planet_id,
            name,
            surface: p.surface,
            gravity: p.gravity,
            pressure: p.pressure,
            temperature: p.temperature,
            fertility: p.fertility,
            resources,
            cogc_program,
        });
    }
    Ok(planets)
}

fn load_market(dir: &Path) -> Result<MarketData, DataLoadError> {
    let mut market = MarketData::new();
    if let Some(path) = find_data_file(dir, "exchanges")? {
        let entries: Vec<ExchangeEntry> = deserialize_list(&path, "exchanges")?;
        for entry in entries {
            market.insert_exchange(entry);
        }
    }
    if let Some(path) = find_data_file(dir, "preferences")? {
        let preferences: Vec<CxPreferences> = deserialize_list(&path, "preferences")?;
        let mut seen: HashMap<String, ()> = HashMap::new();
        for cx in preferences {
            check_duplicate(&seen, &cx.id, &path)?;
            seen.insert(cx.id.clone(), ());
            market.insert_preferences(cx);
        }
    }
    Ok(market)
}

fn load_empires(dir: &Path) -> Result<HashMap<String, EmpireContext>, DataLoadError> {
    let mut empires = HashMap::new();
    let Some(path) = find_data_file(dir, "empires")? else {
        return Ok(empires);
    };
    let data: Vec<EmpireData> = deserialize_list(&path, "empires")?;
    for e in data {
        check_duplicate(&empires, &e.empire_id, &path)?;
        empires.insert(
            e.empire_id,
            EmpireContext {
                faction: parse_faction(&e.faction, &path)?,
                permits_used: e.permits_used,
                permits_total: e.permits_total,
            },
        );
    }
    Ok(empires)
}

/// Load a data directory.
///
/// `materials`, `buildings`, `recipes` and `planets` are required;
/// `exchanges`, `preferences` and `empires` are optional and default to
/// empty. Each may be `.ron`, `.toml` or `.json`, but only one per name.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let materials = load_materials(dir)?;
    let buildings = load_buildings(dir, &materials)?;
    let recipes = load_recipes(dir, &materials, &buildings)?;
    let planets = load_planets(dir, &materials)?;
    let market = load_market(dir)?;
    let empires = load_empires(dir)?;

    let mut builder = RegistryBuilder::new();
    for material in materials.into_values() {
        builder.register_material(material);
    }
    for building in buildings.into_values() {
        builder.register_building(building);
    }
    for recipe in recipes {
        builder.register_recipe(recipe);
    }
    for planet in planets {
        builder.register_planet(planet);
    }
    let registry = builder.build()?;

    log::debug!(
        "loaded {} materials, {} buildings, {} recipes, {} planets, {} quotes, {} CX, {} empires from {}",
        registry.material_count(),
        registry.building_count(),
        registry.recipe_count(),
        registry.planet_count(),
        market.exchange_count(),
        market.preference_count(),
        empires.len(),
        dir.display()
    );

    Ok(GameData {
        registry,
        market,
        empires,
    })
}

/// Load a single plan file.
pub fn load_plan(path: &Path) -> Result<Plan, DataLoadError> {
    let plan: Plan = deserialize_file(path)?;
    let permits = plan.data.planet.permits;
    if !(MIN_PERMITS..=MAX_PERMITS).contains(&permits) {
        log::warn!(
            "plan {} has {permits} permits, outside {MIN_PERMITS}..={MAX_PERMITS}",
            path.display()
        );
    }
    Ok(plan)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "outpost_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const MATERIALS_RON: &str = r#"[
        (ticker: "BSE", category: "construction prefabs", weight: 0.3, volume: 0.5),
        (ticker: "MCG", weight: 0.24, volume: 0.1),
        (ticker: "FEO", weight: 5.9, volume: 1.0),
        (ticker: "FE", weight: 7.8, volume: 1.0),
    ]"#;

    const BUILDINGS_RON: &str = r#"[
        (
            ticker: "SME",
            type: "PRODUCTION",
            expertise: Some("METALLURGY"),
            area_cost: 17,
            workforce: {"PIONEER": 50},
            construction_materials: [("BSE", 6.0)],
        ),
        (
            ticker: "EXT",
            type: "PRODUCTION",
            expertise: Some("RESOURCE_EXTRACTION"),
            area_cost: 25,
            workforce: {"PIONEER": 60},
        ),
        (
            ticker: "HB1",
            type: "INFRASTRUCTURE",
            area_cost: 10,
            habitation: Some({"PIONEER": 100}),
        ),
    ]"#;

    const RECIPES_JSON: &str = r#"[
        {"recipe_id": "2xFEO=>1xFE", "building": "SME",
         "inputs": [["FEO", 2]], "outputs": [["FE", 1]], "time_ms": 21600000}
    ]"#;

    const PLANETS_TOML: &str = r#"
[[planets]]
planet_id = "XX-001a"
name = "Test"
surface = true
gravity = 1.0
pressure = 1.0
temperature = 20.0
cogc_program = "METALLURGY"
resources = [{ ticker = "FEO", type = "MINERAL", daily_extraction = 30.0 }]
"#;

    fn write_required(dir: &Path) {
        fs::write(dir.join("materials.ron"), MATERIALS_RON).unwrap();
        fs::write(dir.join("buildings.ron"), BUILDINGS_RON).unwrap();
        fs::write(dir.join("recipes.json"), RECIPES_JSON).unwrap();
        fs::write(dir.join("planets.toml"), PLANETS_TOML).unwrap();
    }

    // -----------------------------------------------------------------------
    // detect_format / find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("materials.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("materials.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("materials.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("materials.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("materials")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "materials").unwrap(), None);

        fs::write(dir.join("materials.json"), "[]").unwrap();
        assert_eq!(
            find_data_file(&dir, "materials").unwrap(),
            Some(dir.join("materials.json"))
        );

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("materials.ron"), "[]").unwrap();
        fs::write(dir.join("materials.json"), "[]").unwrap();

        let result = find_data_file(&dir, "materials");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");

        let err = require_data_file(&dir, "planets").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingRequired { ref file, .. } if file == "planets"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // deserialize_list
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_toml_and_missing_key() {
        let dir = make_test_dir("list_toml");
        let path = dir.join("planets.toml");
        fs::write(&path, PLANETS_TOML).unwrap();

        let planets: Vec<PlanetData> = deserialize_list(&path, "planets").unwrap();
        assert_eq!(planets.len(), 1);
        assert_eq!(planets[0].resources[0].ticker, "FEO");

        let result: Result<Vec<PlanetData>, _> = deserialize_list(&path, "worlds");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("deser_parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<Vec<MaterialData>, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_game_data
    // -----------------------------------------------------------------------

    #[test]
    fn load_mixed_formats() {
        let dir = make_test_dir("load_mixed");
        write_required(&dir);

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.registry.material_count(), 4);
        assert_eq!(data.registry.building_count(), 3);
        assert_eq!(data.registry.recipe_count(), 1);
        assert_eq!(data.registry.planet_count(), 1);
        assert_eq!(data.market.exchange_count(), 0);
        assert!(data.empires.is_empty());

        use outpost_core::registry::GameDataProvider;
        let planet = data.registry.planet("XX-001a").unwrap();
        assert_eq!(
            planet.cogc_program,
            CogcProgram::Advertising(ExpertiseType::Metallurgy)
        );
        assert_eq!(planet.fertility, -1.0);
        let hb1 = data.registry.building("HB1").unwrap();
        assert_eq!(hb1.habitation.unwrap().pioneer, 100);
        let sme = data.registry.building("SME").unwrap();
        assert_eq!(sme.construction_materials, vec![MaterialAmount::new("BSE", 6.0)]);

        cleanup(&dir);
    }

    #[test]
    fn load_optional_market_and_empires() {
        let dir = make_test_dir("load_optional");
        write_required(&dir);
        fs::write(
            dir.join("exchanges.json"),
            r#"[{"ticker": "FE", "exchange_code": "PP30D_UNIVERSE", "price_average": 400.0},
                {"ticker": "FE", "exchange_code": "AI1", "ask": 420.0, "bid": 380.0,
                 "price_average": 401.0, "supply": 10, "demand": 20}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("preferences.ron"),
            r#"[(id: "cx-1", empire_exchanges: [(type: BOTH, exchange: "AI1_BUY")])]"#,
        )
        .unwrap();
        fs::write(
            dir.join("empires.toml"),
            r#"
[[empires]]
empire_id = "e1"
faction = "MORIA"
permits_used = 2
permits_total = 6
"#,
        )
        .unwrap();

        let data = load_game_data(&dir).unwrap();
        assert_eq!(data.market.exchange_count(), 2);
        assert_eq!(data.market.preference_count(), 1);
        assert_eq!(data.empires["e1"].faction, Faction::Moria);

        cleanup(&dir);
    }

    #[test]
    fn unresolved_material_is_reported_with_file() {
        let dir = make_test_dir("load_unresolved");
        write_required(&dir);
        fs::write(
            dir.join("recipes.json"),
            r#"[{"recipe_id": "x", "building": "SME", "outputs": [["SLAG", 1]], "time_ms": 1000}]"#,
        )
        .unwrap();

        let err = load_game_data(&dir).unwrap_err();
        match err {
            DataLoadError::UnresolvedRef {
                file,
                name,
                expected_kind,
            } => {
                assert_eq!(name, "SLAG");
                assert_eq!(expected_kind, "material");
                assert!(file.ends_with("recipes.json"));
            }
            other => panic!("unexpected error: {other}"),
        }

        cleanup(&dir);
    }

    #[test]
    fn unknown_expertise_and_workforce_names() {
        let dir = make_test_dir("load_unknown_key");
        write_required(&dir);
        fs::write(
            dir.join("buildings.ron"),
            r#"[(ticker: "SME", type: "PRODUCTION", expertise: Some("ALCHEMY"), area_cost: 1)]"#,
        )
        .unwrap();
        let err = load_game_data(&dir).unwrap_err();
        assert!(err.to_string().contains("ALCHEMY"));

        fs::write(
            dir.join("buildings.ron"),
            r#"[(ticker: "SME", type: "PRODUCTION", area_cost: 1, workforce: {"ROBOT": 5})]"#,
        )
        .unwrap();
        let err = load_game_data(&dir).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::UnresolvedRef { expected_kind: "workforce type", .. }
        ));

        cleanup(&dir);
    }

    #[test]
    fn duplicate_ticker_is_rejected() {
        let dir = make_test_dir("load_duplicate");
        write_required(&dir);
        fs::write(
            dir.join("materials.ron"),
            r#"[(ticker: "FE", weight: 1.0, volume: 1.0), (ticker: "FE", weight: 2.0, volume: 1.0)]"#,
        )
        .unwrap();
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "FE"
        ));

        cleanup(&dir);
    }

    #[test]
    fn missing_required_file() {
        let dir = make_test_dir("load_missing");
        write_required(&dir);
        fs::remove_file(dir.join("planets.toml")).unwrap();
        assert!(matches!(
            load_game_data(&dir),
            Err(DataLoadError::MissingRequired { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display
    // -----------------------------------------------------------------------

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }

    #[test]
    fn registry_error_converts() {
        let err: DataLoadError = RegistryError::not_loaded("building", "SME").into();
        assert_eq!(err.to_string(), "building 'SME' not loaded");
    }
}
