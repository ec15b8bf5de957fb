//! Ids command - list the landmark IDs the detectors read.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use drowse_core::domain::ids;
use drowse_core::REQUIRED_LANDMARKS;
use serde_json::json;

/// Arguments for the ids command.
#[derive(Args, Clone)]
pub struct IdsArgs {
    /// Print a JSON object instead of a table
    #[arg(long)]
    pub json: bool,

    /// Include the overlay-only lip outline
    #[arg(long)]
    pub overlay: bool,
}

/// Run the ids command.
pub fn run(args: &IdsArgs) -> Result<()> {
    let mut groups: Vec<(&str, &[u32])> = vec![
        ("left_eye", &ids::LEFT_EYE),
        ("right_eye", &ids::RIGHT_EYE),
        (
            "mouth",
            &[
                ids::MOUTH_TOP,
                ids::MOUTH_BOTTOM,
                ids::MOUTH_LEFT,
                ids::MOUTH_RIGHT,
            ],
        ),
        ("upper_lip", &ids::UPPER_LIP),
        ("lower_lip", &ids::LOWER_LIP),
    ];
    if args.overlay {
        groups.push(("lip_outline", &ids::LIP_OUTLINE));
    }
    groups.push(("required", &REQUIRED_LANDMARKS));

    let mut out = io::stdout().lock();
    if args.json {
        let map: serde_json::Map<String, serde_json::Value> = groups
            .iter()
            .map(|(name, group)| ((*name).to_string(), json!(group)))
            .collect();
        writeln!(out, "{}", serde_json::Value::Object(map))?;
    } else {
        for (name, group) in groups {
            let list: Vec<String> = group.iter().map(u32::to_string).collect();
            writeln!(out, "{name:<12} {}", list.join(" "))?;
        }
    }
    Ok(())
}
