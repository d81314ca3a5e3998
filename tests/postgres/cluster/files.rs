//! Reads settings the cluster writes to disk back into [`Settings`].

use super::{BoxError, boxed};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::io::ErrorKind;

pub(super) fn open_dir(path: &Utf8Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(boxed)
}

/// Splits `path` into an opened parent directory and the file name.
pub(super) fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), BoxError> {
    let name = path
        .file_name()
        .ok_or_else(|| boxed(std::io::Error::other("path must include a file name")))?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    Ok((open_dir(parent)?, name))
}

/// Reads `name` in `dir`, treating a missing file as `None`.
fn read_optional(dir: &Dir, name: &str) -> Result<Option<String>, BoxError> {
    match dir.read_to_string(name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(boxed(err)),
    }
}

/// Uses the generated superuser password when one was written.
pub(super) fn adopt_password_file(settings: &mut Settings) -> Result<(), BoxError> {
    let lossy = settings.password_file.to_string_lossy();
    let (dir, name) = open_parent(Utf8Path::new(lossy.as_ref()))?;
    if let Some(contents) = read_optional(&dir, name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Uses the port recorded on line four of `postmaster.pid`, if present.
pub(super) fn adopt_postmaster_port(settings: &mut Settings) -> Result<(), BoxError> {
    let lossy = settings.data_dir.to_string_lossy();
    let data_dir = open_dir(Utf8Path::new(lossy.as_ref()))?;
    let Some(contents) = read_optional(&data_dir, "postmaster.pid")? else {
        return Ok(());
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
