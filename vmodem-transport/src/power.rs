//! DPRAM phone power-control requests
//!
//! The vdpram tty device accepts three device-specific control
//! requests built from the `'h'` magic: power the phone on, power it
//! off, and query its status. The status query is advisory; `open()`
//! issues it once as a liveness probe and ignores the reported value.

use std::io;
use std::os::unix::io::RawFd;

const IOC_MZ_MAGIC: libc::c_ulong = b'h' as libc::c_ulong;

// Linux _IOC encoding: dir(2) | size(14) | type(8) | nr(8)
const IOC_READ: libc::c_ulong = 2;

const fn io_none(nr: libc::c_ulong) -> libc::c_ulong {
    (IOC_MZ_MAGIC << 8) | nr
}

const fn io_read(nr: libc::c_ulong, size: usize) -> libc::c_ulong {
    (IOC_READ << 30) | ((size as libc::c_ulong) << 16) | (IOC_MZ_MAGIC << 8) | nr
}

/// `_IO('h', 0xd0)` — assert phone power
pub const DPRAM_PHONE_ON: libc::c_ulong = io_none(0xd0);
/// `_IO('h', 0xd1)` — deassert phone power
pub const DPRAM_PHONE_OFF: libc::c_ulong = io_none(0xd1);
/// `_IOR('h', 0xd2, u32)` — read phone status word
pub const DPRAM_PHONE_GETSTATUS: libc::c_ulong = io_read(0xd2, std::mem::size_of::<u32>());

/// Assert CP power on the vdpram device
pub fn phone_power_on(fd: RawFd) -> bool {
    let rc = unsafe { libc::ioctl(fd, DPRAM_PHONE_ON as _, std::ptr::null_mut::<libc::c_void>()) };
    if rc < 0 {
        log::error!(
            "phone power on failed - fd: [{}] error: [{}]",
            fd,
            io::Error::last_os_error()
        );
        false
    } else {
        log::debug!("phone power on - fd: [{}]", fd);
        true
    }
}

/// Deassert CP power on the vdpram device
pub fn phone_power_off(fd: RawFd) -> bool {
    let rc = unsafe { libc::ioctl(fd, DPRAM_PHONE_OFF as _, std::ptr::null_mut::<libc::c_void>()) };
    if rc < 0 {
        log::error!(
            "phone power off failed - fd: [{}] error: [{}]",
            fd,
            io::Error::last_os_error()
        );
        false
    } else {
        log::debug!("phone power off - fd: [{}]", fd);
        true
    }
}

/// Read the phone status word
pub fn phone_get_status(fd: RawFd) -> io::Result<u32> {
    let mut status: u32 = 0;
    let rc = unsafe { libc::ioctl(fd, DPRAM_PHONE_GETSTATUS as _, &mut status as *mut u32) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_numbers() {
        assert_eq!(DPRAM_PHONE_ON, 0x68d0);
        assert_eq!(DPRAM_PHONE_OFF, 0x68d1);
        assert_eq!(DPRAM_PHONE_GETSTATUS, 0x8004_68d2);
    }
}
