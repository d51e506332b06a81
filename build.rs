use anyhow::Result;
use vergen::EmitBuilder;

// VERGEN_GIT_SHA feeds the --debug banner. Outside a git checkout vergen
// emits a placeholder instead of failing.
fn main() -> Result<()> {
    EmitBuilder::builder().git_sha(true).emit()?;
    Ok(())
}
