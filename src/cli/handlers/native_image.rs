// src/cli/handlers/native_image.rs

use anyhow::Result;
use clap::Parser;

use super::commons::{self, AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct NativeImageArgs {
    /// The candidate, normally `java`.
    candidate: String,
    /// An installed GraalVM version, e.g. `21.0.2-graalce`.
    version: String,
}

pub fn handle(args: Vec<String>, ctx: &AppContext) -> Result<()> {
    let native_args = NativeImageArgs::try_parse_from(&args)?;
    commons::load_catalog(ctx)?;
    commons::run_native_image(ctx, &native_args.candidate, &native_args.version)
}
