use anyhow::Result;
use vergen::EmitBuilder;

// Stamps VERGEN_GIT_SHA / VERGEN_GIT_COMMIT_DATE for `nmea-gps --version`.
// Outside a git checkout vergen emits placeholder values instead of failing.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()?;
    Ok(())
}
