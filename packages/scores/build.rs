use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions of the two notations the engine reads.
const SCORE_EXTENSIONS: [&str; 2] = ["abc", "notes"];

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("scores.rs");

    let mut code = String::new();
    code.push_str("/// Embedded score files as (relative path, content)\n");
    code.push_str("pub static SCORES: &[(&str, &str)] = &[\n");

    let scores_dir = Path::new("library");

    if scores_dir.exists() {
        for entry in WalkDir::new(scores_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SCORE_EXTENSIONS.contains(&ext))
            })
        {
            let path = entry.path();
            let name = path.strip_prefix(scores_dir)?.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(path)?;
            // Debug formatting yields valid Rust string literals
            code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
        }
    }

    code.push_str("];\n");
    fs::write(&dest_path, code)?;

    println!("cargo:rerun-if-changed=library");
    Ok(())
}
