// Copyright 2025 Neil Henderson, Blue Tarp Media.

//! Build script to generate integration test cases based on the scenario scripts in the `tests/scenarios` directory.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::path::PathBuf;

use glob::glob;

const SCENARIO_TEST_CASES_FILENAME: &str = "generated_scenario_tests.rs";
const EXPECTED_COUNTERS_JSON_FILENAME: &str = "expected_counters.json";

fn main() {
    generate_scenario_tests();

    // We want cargo to rerun our build.rs script if any of the scenario files change.
    println!("cargo:rerun-if-changed=tests");
}

/// Generate a test function for each scenario script. The error and warning counts the scenario is expected to
/// produce are read from the JSON file next to the scripts and baked into the generated test.
fn generate_scenario_tests() {
    let out_dir = std::env::var("OUT_DIR").unwrap(); // Set by cargo when running `cargo test`
    let generated_rs_filename = Path::new(&out_dir).join(SCENARIO_TEST_CASES_FILENAME);
    let mut writer = BufWriter::new(File::create(generated_rs_filename).expect("Failed to create file"));

    let scenarios_dir = scenarios_directory();
    let expected_counters =
        read_expected_counters_as_map(&scenarios_dir.join(EXPECTED_COUNTERS_JSON_FILENAME)).unwrap_or_default();

    let pattern = scenarios_dir.join("**").join("*.scn");
    for entry in glob(&pattern.to_string_lossy()).expect("Failed to read glob pattern") {
        match entry {
            Ok(script_path) => {
                let test_case_name = scenario_test_name(&scenarios_dir, &script_path);
                let script_filename = script_path.into_os_string().into_string().expect("Invalid path");

                let (errors, warnings) = expected_counters.get(&test_case_name).copied().unwrap_or((0, 0));

                let test_case_code = &format!(
                    r#"
                        #[test]
                        #[allow(non_snake_case)]
                        fn {test_case_name}() {{
                            run_scenario_and_compare("{script_filename}", {errors}, {warnings});
                        }}
                    "#
                );

                let res = writer.write_all(test_case_code.as_bytes());
                assert!(res.is_ok());
            }
            Err(e) => println!("{:?}", e),
        }
    }
}

/// Reads `{ "scenario": { "errors": N, "warnings": N }, ... }`.
fn read_expected_counters_as_map(json_path: &Path) -> Option<HashMap<String, (u32, u32)>> {
    let reader = BufReader::new(File::open(json_path).ok()?);

    let v: serde_json::Value = serde_json::from_reader(reader).ok()?;

    let map = v
        .as_object()?
        .iter()
        .filter_map(|(key, item)| {
            let errors = u32::try_from(item.get("errors")?.as_u64()?).ok()?;
            let warnings = u32::try_from(item.get("warnings")?.as_u64()?).ok()?;
            Some((key.clone(), (errors, warnings)))
        })
        .collect();

    Some(map)
}

/// The test name is the script's path below the scenarios directory, without its extension, with every char
/// that cannot appear in a Rust identifier replaced by '_'.
fn scenario_test_name(scenarios_dir: &Path, script_path: &Path) -> String {
    let relative = script_path.strip_prefix(scenarios_dir).unwrap_or(script_path);

    relative
        .with_extension("")
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn scenarios_directory() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("scenarios") // Only set when using `cargo ...`
}
