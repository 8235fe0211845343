//! Linux framebuffer access: open the device, read its geometry and map its
//! pixel memory for direct writes.

use std::ffi::c_void;
use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use nix::sys::mman::{MapFlags, ProtFlags, mmap, munmap};
use tracing::{info, warn};

use crate::error::{Error, Result};

const FBIOGET_VSCREENINFO: u16 = 0x4600;

/// Dimensions and depth of the target surface. Acquired once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

impl ScreenGeometry {
    /// Bytes needed to hold one full frame.
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel as usize
    }

    /// Bytes in one screen row.
    #[must_use]
    pub const fn row_len(&self) -> usize {
        self.width as usize * self.bytes_per_pixel as usize
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// Mirror of the kernel's `struct fb_var_screeninfo`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

mod ioctl {
    use super::{FBIOGET_VSCREENINFO, FbVarScreenInfo};

    nix::ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreenInfo);
}

/// An opened framebuffer device together with its geometry.
#[derive(Debug)]
pub struct Framebuffer {
    file: File,
    path: PathBuf,
    geometry: ScreenGeometry,
}

impl Framebuffer {
    /// Open `path` read/write and query its variable screen info.
    ///
    /// # Errors
    /// [`Error::Setup`] when the device cannot be opened or queried,
    /// [`Error::UnsupportedPixelFormat`] for anything but 32 bits per pixel.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| Error::setup(format!("failed to open {}", path.display()), err))?;

        let mut info = FbVarScreenInfo::default();
        // SAFETY: `info` is a correctly sized `fb_var_screeninfo` and the fd is open.
        unsafe { ioctl::fbioget_vscreeninfo(file.as_raw_fd(), &mut info) }.map_err(|errno| {
            Error::setup(
                format!("FBIOGET_VSCREENINFO failed on {}", path.display()),
                errno,
            )
        })?;

        let geometry = geometry_from_bits(info.xres, info.yres, info.bits_per_pixel)?;
        info!(
            device = %path.display(),
            width = geometry.width,
            height = geometry.height,
            bytes_per_pixel = geometry.bytes_per_pixel,
            "screen information"
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            geometry,
        })
    }

    pub const fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// Map the whole visible frame as a shared read/write region.
    ///
    /// # Errors
    /// [`Error::Setup`] when the mapping is refused.
    pub fn map(&self) -> Result<MappedBuffer> {
        let len = NonZeroUsize::new(self.geometry.buffer_len()).ok_or_else(|| {
            Error::setup(
                format!("{} reports an empty frame", self.path.display()),
                std::io::Error::from(std::io::ErrorKind::InvalidData),
            )
        })?;
        // SAFETY: fresh mapping over an fd we own; the region is only
        // reachable through the returned guard.
        let ptr = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &self.file,
                0,
            )
        }
        .map_err(|errno| Error::setup(format!("failed to map {}", self.path.display()), errno))?;

        Ok(MappedBuffer {
            ptr,
            len: len.get(),
        })
    }
}

fn geometry_from_bits(width: u32, height: u32, bits_per_pixel: u32) -> Result<ScreenGeometry> {
    if bits_per_pixel != 32 {
        return Err(Error::UnsupportedPixelFormat { bits_per_pixel });
    }
    Ok(ScreenGeometry {
        width,
        height,
        bytes_per_pixel: bits_per_pixel / 8,
    })
}

/// Shared mapping of device memory, unmapped on drop.
#[derive(Debug)]
pub struct MappedBuffer {
    ptr: NonNull<c_void>,
    len: usize,
}

impl MappedBuffer {
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: `ptr` covers `len` bytes for as long as `self` lives and the
        // exclusive borrow prevents aliasing from this process.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<u8>(), self.len) }
    }
}

impl Drop for MappedBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` come from a successful mmap and are unmapped once.
        if let Err(err) = unsafe { munmap(self.ptr, self.len) } {
            warn!(error = %err, "failed to unmap framebuffer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_requires_32_bits() {
        let g = geometry_from_bits(1920, 1080, 32).unwrap();
        assert_eq!(g.bytes_per_pixel, 4);
        assert_eq!(g.buffer_len(), 1920 * 1080 * 4);
        assert_eq!(g.row_len(), 1920 * 4);

        let err = geometry_from_bits(1920, 1080, 16).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat { bits_per_pixel: 16 }));
    }

    #[test]
    fn screeninfo_matches_kernel_layout() {
        assert_eq!(std::mem::size_of::<FbVarScreenInfo>(), 160);
    }

    #[test]
    fn missing_device_is_setup_error() {
        let err = Framebuffer::open(Path::new("/nonexistent/fb9")).unwrap_err();
        assert!(matches!(err, Error::Setup { .. }));
    }
}
