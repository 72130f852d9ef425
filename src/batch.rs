use crate::{config::ConversionOptions, conversion::convert_with};
use anyhow::{Context, Result};
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

const MSD_EXTENSION: &str = "msd";
const SMF_EXTENSION: &str = "mid";

pub fn is_msd_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case(MSD_EXTENSION))
}

/// Lists the MSD files directly inside `dir`, sorted by path.
pub fn find_msd_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if is_msd_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// A directory expands to its MSD files; anything else is taken as a single input.
pub fn inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        find_msd_files(input)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let output = input.with_extension(SMF_EXTENSION);
    match (output_dir, output.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => output,
    }
}

/// Converts one file, returning the SMF bytes that were written.
pub fn convert_file(input: &Path, output: &Path, options: &ConversionOptions) -> Result<Vec<u8>> {
    let msd = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let smf = convert_with(&msd, options)?;
    fs::write(output, &smf).with_context(|| format!("Failed to write {}", output.display()))?;
    debug!(
        "Wrote {} bytes to {} from {} bytes of MSD",
        smf.len(),
        output.display(),
        msd.len()
    );
    Ok(smf)
}
