use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use docqa_core::types::Upload;

/// Read every file named in `paths`, descending into directories in file-name order.
pub fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("{} does not exist", path.display());
        }
    }

    files
        .into_iter()
        .map(|file| {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            Ok(Upload::new(file.to_string_lossy(), bytes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directories_are_walked_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.txt"), "bravo").unwrap();
        fs::write(tmp.path().join("a.md"), "alpha").unwrap();
        fs::write(tmp.path().join("sub").join("c.pdf"), "not really a pdf").unwrap();
        let single = tmp.path().join("b.txt");

        let uploads = collect_uploads(&[tmp.path().to_path_buf(), single]).unwrap();
        let names: Vec<&str> = uploads
            .iter()
            .map(|u| u.name.rsplit(['/', '\\']).next().unwrap())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.pdf", "b.txt"]);
        assert_eq!(uploads[0].bytes, b"alpha");
    }

    #[test]
    fn missing_paths_are_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(collect_uploads(&[tmp.path().join("nope.txt")]).is_err());
    }
}
