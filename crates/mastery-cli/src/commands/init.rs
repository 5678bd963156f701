//! The `mastery init` command.

use std::path::Path;

use anyhow::Result;

use mastery_core::graph::default_curriculum;
use mastery_core::parser::to_curriculum_toml;

pub fn execute() -> Result<()> {
    if Path::new("mastery.toml").exists() {
        println!("mastery.toml already exists, skipping.");
    } else {
        std::fs::write("mastery.toml", SAMPLE_CONFIG)?;
        println!("Created mastery.toml");
    }

    let curriculum = Path::new("curriculum.toml");
    if curriculum.exists() {
        println!("curriculum.toml already exists, skipping.");
    } else {
        let content = format!(
            "# Topics and prerequisite edges (parent -> child).\n\n{}",
            to_curriculum_toml(&default_curriculum())
        );
        std::fs::write(curriculum, content)?;
        println!("Created curriculum.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit curriculum.toml to fit your roadmap");
    println!("  2. Run: mastery graph --curriculum curriculum.toml");
    println!("  3. Run: mastery sync --handle <your handle>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mastery configuration

bucket_width_days = 14
parallelism = 4
store_dir = "mastery-data"
curriculum = "curriculum.toml"

[history]
type = "codeforces"
base_url = "https://codeforces.com"
timeout_secs = 30

# Extra judge tag -> topic mappings
[tags]
"games" = "math"
"#;
