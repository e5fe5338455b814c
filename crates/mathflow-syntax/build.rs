use std::fmt::Write;
use std::path::Path;

/// Generates one parse-snapshot test per `src/snapshots/*.md` fixture, so
/// each fixture shows up under its own name in the test runner.
fn main() {
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest = Path::new(&out_dir).join("snapshot_tests.rs");

    let mut fixtures: Vec<_> = std::fs::read_dir("src/snapshots")
        .expect("src/snapshots exists")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    fixtures.sort();

    let mut code = String::from("mod parse_snapshots {\n    use super::snapshot_test;\n");
    for path in &fixtures {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        write!(
            code,
            r#"
    #[test]
    fn {name}() {{
        snapshot_test("{name}");
    }}
"#
        )
        .expect("writing to a String");
    }
    code.push_str("}\n");

    std::fs::write(&dest, code).expect("write generated snapshot tests");

    println!("cargo::rerun-if-changed=src/snapshots");
}
