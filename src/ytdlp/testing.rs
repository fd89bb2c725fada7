//! Stand-in yt-dlp executables for tests

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `yt-dlp` into `dir`
pub fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();

    path
}

/// A stub that appends its proxy flag to `log`, is refused by the target
/// on its first run, and succeeds on every later run
pub fn write_reject_once_stub(dir: &Path, log: &Path) -> PathBuf {
    let state = dir.join("rejected-once");
    write_stub(
        dir,
        &format!(
            "echo \"$3\" >> '{log}'\n\
             if [ -f '{state}' ]; then echo '[download] 100%'; exit 0; fi\n\
             touch '{state}'\n\
             echo 'ERROR: HTTP Error 403: Forbidden'\n\
             exit 1",
            log = log.display(),
            state = state.display(),
        ),
    )
}

/// Read back the proxy flags recorded by a stub, one per run
pub fn recorded_proxies(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}
