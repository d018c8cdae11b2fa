use crate::prelude::*;

pub fn existing_directory(value: &str) -> Result<PathBuf> {
    match PathBuf::from(value) {
        path if path.is_dir() => Ok(path),
        path => Err(anyhow!("{} is not a directory", path.display())),
    }
}
