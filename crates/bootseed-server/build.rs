use vergen_gitcl::{BuildBuilder, CargoBuilder, Emitter, GitclBuilder, RustcBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut emitter = Emitter::default();
    emitter
        .add_instructions(&BuildBuilder::all_build()?)?
        .add_instructions(&CargoBuilder::all_cargo()?)?
        .add_instructions(&RustcBuilder::all_rustc()?)?;

    match GitclBuilder::all_git() {
        Ok(git) => {
            emitter.add_instructions(&git)?;
        }
        Err(_) => {
            // No git repository (container or CI builds from a tarball):
            // take the values from build args instead.
            for (var, fallback) in [
                ("VERGEN_GIT_SHA", "unknown"),
                ("VERGEN_GIT_BRANCH", "unknown"),
                ("VERGEN_GIT_COMMIT_TIMESTAMP", "unknown"),
                ("VERGEN_GIT_DIRTY", "false"),
            ] {
                println!(
                    "cargo::rustc-env={}={}",
                    var,
                    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
                );
            }
        }
    }

    emitter.emit()?;
    Ok(())
}
