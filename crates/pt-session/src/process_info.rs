// ABOUTME: Platform-specific process information queries.
// ABOUTME: Used to name local sessions after their shell's working directory.

use std::path::PathBuf;

/// Working directory of process `pid`, or `None` when it is gone or unreadable
#[cfg(target_os = "linux")]
pub fn get_process_cwd(pid: u32) -> Option<PathBuf> {
    std::fs::read_link(format!("/proc/{}/cwd", pid)).ok()
}

#[cfg(target_os = "macos")]
pub fn get_process_cwd(pid: u32) -> Option<PathBuf> {
    use std::ffi::CStr;

    // sys/proc_info.h
    const PROC_PIDVNODEPATHINFO: libc::c_int = 9;
    const MAXPATHLEN: usize = 1024;
    const VNODE_INFO_LEN: usize = 152;

    #[repr(C)]
    struct VnodeInfoPath {
        info: [u8; VNODE_INFO_LEN],
        path: [libc::c_char; MAXPATHLEN],
    }

    #[repr(C)]
    struct VnodePathInfo {
        cwd: VnodeInfoPath,
        root: VnodeInfoPath,
    }

    extern "C" {
        fn proc_pidinfo(
            pid: libc::c_int,
            flavor: libc::c_int,
            arg: u64,
            buffer: *mut libc::c_void,
            buffersize: libc::c_int,
        ) -> libc::c_int;
    }

    let mut info = std::mem::MaybeUninit::<VnodePathInfo>::zeroed();
    let size = std::mem::size_of::<VnodePathInfo>() as libc::c_int;
    let written = unsafe {
        proc_pidinfo(
            pid as libc::c_int,
            PROC_PIDVNODEPATHINFO,
            0,
            info.as_mut_ptr().cast(),
            size,
        )
    };
    if written < size {
        return None;
    }

    let info = unsafe { info.assume_init() };
    let path = unsafe { CStr::from_ptr(info.cwd.path.as_ptr()) };
    path.to_str().ok().filter(|p| !p.is_empty()).map(PathBuf::from)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn get_process_cwd(_pid: u32) -> Option<PathBuf> {
    // No cheap query here; titles fall back to the session name
    None
}
