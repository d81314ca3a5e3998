//! Finds the `pg_worker` binary and stages a copy an unprivileged user can
//! execute.

use super::files::open_parent;
use super::{BoxError, boxed};
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use cap_std::fs::{Permissions, PermissionsExt};
use std::env;
use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::sync::OnceLock;

const WORKER_NAME: &str = "pg_worker";

static STAGED: OnceLock<Utf8PathBuf> = OnceLock::new();

fn utf8(value: &OsStr) -> Option<Utf8PathBuf> {
    value.to_str().map(Utf8PathBuf::from)
}

/// Looks for the worker in Cargo's build output first, then on `PATH`.
pub(super) fn locate_pg_worker() -> Option<Utf8PathBuf> {
    env::var_os("CARGO_BIN_EXE_pg_worker")
        .and_then(|path| utf8(&path))
        .or_else(beside_test_binary)
        .or_else(on_path)
}

fn beside_test_binary() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let deps = utf8(exe.as_os_str())?.parent()?.to_path_buf();
    let candidate = deps.parent()?.join(WORKER_NAME);
    candidate.is_file().then_some(candidate)
}

fn on_path() -> Option<Utf8PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .filter_map(|entry| utf8(entry.as_os_str()))
        .map(|dir| dir.join(WORKER_NAME))
        .find(|candidate| candidate.is_file())
}

/// Copies the worker into the temp directory behind a wrapper script that
/// drops to `nobody` when invoked as root.
///
/// The build directory is usually unreadable by `nobody`, so the worker is
/// run from the copy. Staging happens once per test binary.
pub(super) fn stage_pg_worker(source: &Utf8Path) -> Result<Utf8PathBuf, BoxError> {
    if let Some(staged) = STAGED.get() {
        return Ok(staged.clone());
    }

    let temp = Utf8PathBuf::try_from(env::temp_dir()).map_err(boxed)?;
    let wrapper = temp.join(format!("pg_worker_{}", std::process::id()));
    let binary = wrapper.with_extension("bin");

    let (source_dir, source_name) = open_parent(source)?;
    let (wrapper_dir, wrapper_name) = open_parent(&wrapper)?;
    let (binary_dir, binary_name) = open_parent(&binary)?;
    remove_if_present(&wrapper_dir, wrapper_name)?;
    remove_if_present(&binary_dir, binary_name)?;

    source_dir
        .copy(source_name, &binary_dir, binary_name)
        .map_err(boxed)?;
    let script = format!(
        concat!(
            "#!/bin/sh\n",
            "if [ \"$(id -u)\" -eq 0 ]; then\n",
            "  exec /usr/sbin/runuser -u nobody -- {binary} \"$@\"\n",
            "fi\n",
            "exec {binary} \"$@\"\n",
        ),
        binary = binary.as_str()
    );
    wrapper_dir
        .create(wrapper_name)
        .and_then(|mut file| file.write_all(script.as_bytes()))
        .map_err(boxed)?;

    #[cfg(unix)]
    {
        for (dir, name) in [(&wrapper_dir, wrapper_name), (&binary_dir, binary_name)] {
            dir.set_permissions(name, Permissions::from_mode(0o755))
                .map_err(boxed)?;
        }
    }

    Ok(STAGED.get_or_init(|| wrapper).clone())
}

fn remove_if_present(dir: &cap_std::fs_utf8::Dir, name: &str) -> Result<(), BoxError> {
    match dir.remove_file(name) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(boxed(err)),
    }
}
