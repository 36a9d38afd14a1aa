use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::{write_inventory, ExportOptions};

use super::{load_checked_inventory, print_inventory_stats, ExportArgs};

pub(crate) fn run_export(args: ExportArgs) -> Result<()> {
    ensure_output_is_not_input(&args.r#in, &args.out)?;

    let inventory = load_checked_inventory(&args.r#in)?;
    if !args.force && args.out.exists() {
        bail!(
            "Output file already exists: {} (use --force to overwrite)",
            args.out.display()
        );
    }

    let options = ExportOptions {
        skip_derived: args.no_derived,
    };
    replace_file(&args.out, |file| write_inventory(&inventory, file, &options))?;

    println!("Export completed successfully!");
    print_inventory_stats(&inventory);
    println!("Output written to: {}", args.out.display());
    Ok(())
}

/// Where `path` points once symlinks and `..` are resolved. A file that does
/// not exist yet is resolved through its parent directory.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(path) = fs::canonicalize(path) {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => fs::canonicalize(dir)
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

fn ensure_output_is_not_input(input: &Path, output: &Path) -> Result<()> {
    let input = resolved(input);
    let output = resolved(output);
    if input == output {
        bail!(
            "Output path must be different from input path (refusing to overwrite input).\nInput:  {}\nOutput: {}",
            input.display(),
            output.display()
        );
    }
    Ok(())
}

/// Write into a sibling temp file, then move it over `target`. The target is
/// never left half written; the temp file is removed on failure.
fn replace_file<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let staging = target.with_extension(format!("tmp.{}", std::process::id()));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staging)
        .with_context(|| format!("Failed to create temporary output file: {}", staging.display()))?;

    let written = write(&mut file).and_then(|()| {
        file.sync_all()
            .with_context(|| format!("Failed to sync temporary output file: {}", staging.display()))
    });
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    if target.exists() {
        fs::remove_file(target).with_context(|| {
            format!("Failed to remove existing output file: {}", target.display())
        })?;
    }
    fs::rename(&staging, target)
        .with_context(|| format!("Failed to replace output file: {}", target.display()))
}
