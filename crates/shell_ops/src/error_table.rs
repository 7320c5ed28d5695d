//! Error translation table
//!
//! Every backend reports failures in its own numbering: Win32 error codes,
//! `SHFileOperationW` private codes, or `errno` values wrapped in
//! `std::io::Error`. They are normalized into [`ErrorCode`] at the backend
//! boundary and turned into human-readable text by [`translate`].

use std::borrow::Cow;
use std::io;

/// Platform-native status code as reported by the OS
pub type OsCode = i32;

/// Win32 error numbers used by the translation tables.
///
/// Kept platform-independent so the tables can be checked anywhere.
pub mod win32 {
    pub const ERROR_SUCCESS: u32 = 0;
    pub const ERROR_FILE_NOT_FOUND: u32 = 2;
    pub const ERROR_PATH_NOT_FOUND: u32 = 3;
    pub const ERROR_ACCESS_DENIED: u32 = 5;
    pub const ERROR_NOT_ENOUGH_MEMORY: u32 = 8;
    pub const ERROR_BAD_FORMAT: u32 = 11;
    pub const ERROR_OUTOFMEMORY: u32 = 14;
    pub const ERROR_NOT_SAME_DEVICE: u32 = 17;
    pub const ERROR_WRITE_PROTECT: u32 = 19;
    pub const ERROR_GEN_FAILURE: u32 = 31;
    pub const ERROR_SHARING_VIOLATION: u32 = 32;
    pub const ERROR_FILE_EXISTS: u32 = 80;
    pub const ERROR_INVALID_PARAMETER: u32 = 87;
    pub const ERROR_BUFFER_OVERFLOW: u32 = 111;
    pub const ERROR_DISK_FULL: u32 = 112;
    pub const ERROR_DIR_NOT_EMPTY: u32 = 145;
    pub const ERROR_BAD_PATHNAME: u32 = 161;
    pub const ERROR_ALREADY_EXISTS: u32 = 183;
    pub const ERROR_FILENAME_EXCED_RANGE: u32 = 206;
    pub const ERROR_DIRECTORY: u32 = 267;
    pub const ERROR_NO_ASSOCIATION: u32 = 1155;
    pub const ERROR_CANCELLED: u32 = 1223;
}

/// `errno` values for the codes the spawn backend reports itself.
///
/// The low numbers are identical on every Unix; the rest differ between
/// Linux and the BSD family.
#[cfg(not(windows))]
mod errno {
    pub const ENOENT: i32 = 2;
    pub const ENOEXEC: i32 = 8;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const EXDEV: i32 = 18;
    pub const ENOTDIR: i32 = 20;
    pub const EISDIR: i32 = 21;
    pub const EINVAL: i32 = 22;
    pub const ENOSPC: i32 = 28;
    pub const EROFS: i32 = 30;
    pub const EIO: i32 = 5;

    #[cfg(target_os = "linux")]
    pub const ENAMETOOLONG: i32 = 36;
    #[cfg(not(target_os = "linux"))]
    pub const ENAMETOOLONG: i32 = 63;

    #[cfg(target_os = "linux")]
    pub const ENOTEMPTY: i32 = 39;
    #[cfg(not(target_os = "linux"))]
    pub const ENOTEMPTY: i32 = 66;

    #[cfg(target_os = "linux")]
    pub const ECANCELED: i32 = 125;
    #[cfg(not(target_os = "linux"))]
    pub const ECANCELED: i32 = 89;
}

/// Normalized error code shared by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    InvalidParameter,
    FileNotFound,
    PathNotFound,
    AccessDenied,
    NotSameDevice,
    Cancelled,
    BadPathname,
    BufferOverflow,
    AlreadyExists,
    WriteProtected,
    DiskFull,
    GeneralFailure,
    OutOfMemory,
    BadFormat,
    NoAssociation,
    SharingViolation,
    DirectoryNotEmpty,
    NotADirectory,
    IsADirectory,
    /// A platform code with no normalized counterpart
    Unknown(OsCode),
}

impl ErrorCode {
    /// Normalize a Win32 error number
    pub fn from_win32(code: u32) -> Self {
        use win32::*;

        match code {
            ERROR_SUCCESS => Self::Success,
            ERROR_FILE_NOT_FOUND => Self::FileNotFound,
            ERROR_PATH_NOT_FOUND => Self::PathNotFound,
            ERROR_ACCESS_DENIED => Self::AccessDenied,
            ERROR_NOT_ENOUGH_MEMORY | ERROR_OUTOFMEMORY => Self::OutOfMemory,
            ERROR_BAD_FORMAT => Self::BadFormat,
            ERROR_NOT_SAME_DEVICE => Self::NotSameDevice,
            ERROR_WRITE_PROTECT => Self::WriteProtected,
            ERROR_GEN_FAILURE => Self::GeneralFailure,
            ERROR_SHARING_VIOLATION => Self::SharingViolation,
            ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => Self::AlreadyExists,
            ERROR_INVALID_PARAMETER => Self::InvalidParameter,
            ERROR_BUFFER_OVERFLOW | ERROR_FILENAME_EXCED_RANGE => Self::BufferOverflow,
            ERROR_DISK_FULL => Self::DiskFull,
            ERROR_DIR_NOT_EMPTY => Self::DirectoryNotEmpty,
            ERROR_BAD_PATHNAME => Self::BadPathname,
            ERROR_DIRECTORY => Self::NotADirectory,
            ERROR_NO_ASSOCIATION => Self::NoAssociation,
            ERROR_CANCELLED => Self::Cancelled,
            other => Self::Unknown(other as OsCode),
        }
    }

    /// Normalize an I/O error produced by `std` or a spawn attempt
    pub fn from_io(err: &io::Error) -> Self {
        #[cfg(windows)]
        {
            if let Some(raw) = err.raw_os_error() {
                return Self::from_win32(raw as u32);
            }
        }

        #[cfg(not(windows))]
        {
            match err.raw_os_error() {
                Some(errno::ENOEXEC) => return Self::BadFormat,
                Some(errno::ECANCELED) => return Self::Cancelled,
                Some(errno::ENAMETOOLONG) => return Self::BufferOverflow,
                _ => {}
            }
        }

        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound,
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::InvalidInput => Self::InvalidParameter,
            io::ErrorKind::OutOfMemory => Self::OutOfMemory,
            io::ErrorKind::ReadOnlyFilesystem => Self::WriteProtected,
            io::ErrorKind::StorageFull => Self::DiskFull,
            io::ErrorKind::CrossesDevices => Self::NotSameDevice,
            io::ErrorKind::DirectoryNotEmpty => Self::DirectoryNotEmpty,
            io::ErrorKind::NotADirectory => Self::NotADirectory,
            io::ErrorKind::IsADirectory => Self::IsADirectory,
            io::ErrorKind::InvalidFilename => Self::BadPathname,
            io::ErrorKind::ResourceBusy => Self::SharingViolation,
            _ => match err.raw_os_error() {
                Some(raw) => Self::Unknown(raw),
                None => Self::GeneralFailure,
            },
        }
    }

    /// Best native status code for a normalized code.
    ///
    /// Used when the core itself produces a failure (validation, missing
    /// paths) and no OS call reported one.
    pub fn native_code(self) -> OsCode {
        #[cfg(windows)]
        {
            use win32::*;

            let code = match self {
                Self::Success => ERROR_SUCCESS,
                Self::InvalidParameter => ERROR_INVALID_PARAMETER,
                Self::FileNotFound => ERROR_FILE_NOT_FOUND,
                Self::PathNotFound => ERROR_PATH_NOT_FOUND,
                Self::AccessDenied => ERROR_ACCESS_DENIED,
                Self::NotSameDevice => ERROR_NOT_SAME_DEVICE,
                Self::Cancelled => ERROR_CANCELLED,
                Self::BadPathname => ERROR_BAD_PATHNAME,
                Self::BufferOverflow => ERROR_BUFFER_OVERFLOW,
                Self::AlreadyExists => ERROR_ALREADY_EXISTS,
                Self::WriteProtected => ERROR_WRITE_PROTECT,
                Self::DiskFull => ERROR_DISK_FULL,
                Self::GeneralFailure => ERROR_GEN_FAILURE,
                Self::OutOfMemory => ERROR_OUTOFMEMORY,
                Self::BadFormat => ERROR_BAD_FORMAT,
                Self::NoAssociation => ERROR_NO_ASSOCIATION,
                Self::SharingViolation => ERROR_SHARING_VIOLATION,
                Self::DirectoryNotEmpty => ERROR_DIR_NOT_EMPTY,
                Self::NotADirectory => ERROR_DIRECTORY,
                Self::IsADirectory => ERROR_ACCESS_DENIED,
                Self::Unknown(raw) => return raw,
            };
            code as OsCode
        }

        #[cfg(not(windows))]
        {
            use errno::*;

            match self {
                Self::Success => 0,
                Self::InvalidParameter => EINVAL,
                Self::FileNotFound | Self::PathNotFound => ENOENT,
                Self::AccessDenied => EACCES,
                Self::NotSameDevice => EXDEV,
                Self::Cancelled => ECANCELED,
                Self::BadPathname => EINVAL,
                Self::BufferOverflow => ENAMETOOLONG,
                Self::AlreadyExists => EEXIST,
                Self::WriteProtected => EROFS,
                Self::DiskFull => ENOSPC,
                Self::GeneralFailure => EIO,
                Self::OutOfMemory => ENOMEM,
                Self::BadFormat => ENOEXEC,
                Self::NoAssociation => ENOENT,
                Self::SharingViolation => EBUSY,
                Self::DirectoryNotEmpty => ENOTEMPTY,
                Self::NotADirectory => ENOTDIR,
                Self::IsADirectory => EISDIR,
                Self::Unknown(raw) => raw,
            }
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Human-readable message for a normalized code. Total: every code has one.
pub fn translate(code: ErrorCode) -> Cow<'static, str> {
    let text = match code {
        ErrorCode::Success => "The operation completed successfully",
        ErrorCode::InvalidParameter => "The parameter is incorrect",
        ErrorCode::FileNotFound => "The specified file was not found",
        ErrorCode::PathNotFound => "The specified path was not found",
        ErrorCode::AccessDenied => "The operating system denied access to the specified file",
        ErrorCode::NotSameDevice => "The file cannot be moved to a different disk drive",
        ErrorCode::Cancelled => "The operation was cancelled",
        ErrorCode::BadPathname => "The specified path is invalid",
        ErrorCode::BufferOverflow => "The file name or path is too long",
        ErrorCode::AlreadyExists => "Cannot create a file when that file already exists",
        ErrorCode::WriteProtected => "The media is write protected",
        ErrorCode::DiskFull => "There is not enough space on the disk",
        ErrorCode::GeneralFailure => "The operation failed",
        ErrorCode::OutOfMemory => "There was not enough memory to complete the operation",
        ErrorCode::BadFormat => "The executable file is invalid",
        ErrorCode::NoAssociation => {
            "There is no application associated with the given file name extension"
        }
        ErrorCode::SharingViolation => "A sharing violation occurred",
        ErrorCode::DirectoryNotEmpty => "The directory is not empty",
        ErrorCode::NotADirectory => "The path is not a directory",
        ErrorCode::IsADirectory => "The path is a directory",
        ErrorCode::Unknown(raw) => return Cow::Owned(format!("Unknown error {}", raw)),
    };

    Cow::Borrowed(text)
}

/// Map a private `SHFileOperationW` return code onto the Win32 error space.
///
/// Codes outside the table are already Win32 errors and pass through.
pub fn remap_batch_code(code: i32) -> u32 {
    use win32::*;

    match code {
        // 0x71 same file, 0x72 many sources to one destination
        0x71 | 0x72 | 0x74 | 0x7A | 0x7D => ERROR_INVALID_PARAMETER,
        0x73 => ERROR_NOT_SAME_DEVICE,
        0x75 => ERROR_CANCELLED,
        0x76 | 0x7C => ERROR_BAD_PATHNAME,
        0x78 => ERROR_ACCESS_DENIED,
        // 0x79 path exceeds MAX_PATH
        0x79 | 0x81 | 0xB7 => ERROR_BUFFER_OVERFLOW,
        0x7E | 0x80 => ERROR_ALREADY_EXISTS,
        0x82 | 0x83 | 0x84 | 0x86 | 0x87 | 0x88 => ERROR_WRITE_PROTECT,
        0x85 => ERROR_DISK_FULL,
        0x402 => ERROR_PATH_NOT_FOUND,
        0x10000 => ERROR_GEN_FAILURE,
        other => other as u32,
    }
}

/// System description of a native code, formatted as `message (0xhex)`.
///
/// Falls back to the bare hex code when the OS has no text for it.
pub fn format_system_message(code: OsCode) -> String {
    let description = io::Error::from_raw_os_error(code).to_string();
    let description = match description.find(" (os error ") {
        Some(pos) => description[..pos].trim().to_string(),
        None => description.trim().to_string(),
    };

    format_message(code, &description)
}

fn format_message(code: OsCode, message: &str) -> String {
    if message.is_empty() {
        format!("0x{:x}", code)
    } else {
        format!("{} (0x{:x})", message, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REMAPPED: &[(i32, u32)] = &[
        (0x71, win32::ERROR_INVALID_PARAMETER),
        (0x72, win32::ERROR_INVALID_PARAMETER),
        (0x73, win32::ERROR_NOT_SAME_DEVICE),
        (0x74, win32::ERROR_INVALID_PARAMETER),
        (0x75, win32::ERROR_CANCELLED),
        (0x76, win32::ERROR_BAD_PATHNAME),
        (0x78, win32::ERROR_ACCESS_DENIED),
        (0x79, win32::ERROR_BUFFER_OVERFLOW),
        (0x7A, win32::ERROR_INVALID_PARAMETER),
        (0x7C, win32::ERROR_BAD_PATHNAME),
        (0x7D, win32::ERROR_INVALID_PARAMETER),
        (0x7E, win32::ERROR_ALREADY_EXISTS),
        (0x80, win32::ERROR_ALREADY_EXISTS),
        (0x81, win32::ERROR_BUFFER_OVERFLOW),
        (0x82, win32::ERROR_WRITE_PROTECT),
        (0x83, win32::ERROR_WRITE_PROTECT),
        (0x84, win32::ERROR_WRITE_PROTECT),
        (0x85, win32::ERROR_DISK_FULL),
        (0x86, win32::ERROR_WRITE_PROTECT),
        (0x87, win32::ERROR_WRITE_PROTECT),
        (0x88, win32::ERROR_WRITE_PROTECT),
        (0xB7, win32::ERROR_BUFFER_OVERFLOW),
        (0x402, win32::ERROR_PATH_NOT_FOUND),
        (0x10000, win32::ERROR_GEN_FAILURE),
    ];

    #[test]
    fn test_remap_table() {
        for &(private, standard) in REMAPPED {
            assert_eq!(remap_batch_code(private), standard, "code 0x{:x}", private);
        }
    }

    #[test]
    fn test_remap_passthrough() {
        assert_eq!(remap_batch_code(0), 0);
        assert_eq!(remap_batch_code(5), 5);
        assert_eq!(remap_batch_code(0x77), 0x77);
        assert_eq!(remap_batch_code(0x7F), 0x7F);
    }

    #[test]
    fn test_remapped_messages_match_standard() {
        for &(private, standard) in REMAPPED {
            let remapped = translate(ErrorCode::from_win32(remap_batch_code(private)));
            let direct = translate(ErrorCode::from_win32(standard));
            assert_eq!(remapped, direct);
            assert!(!matches!(
                ErrorCode::from_win32(standard),
                ErrorCode::Unknown(_)
            ));
        }

        assert_eq!(
            ErrorCode::from_win32(remap_batch_code(0x85)),
            ErrorCode::DiskFull
        );
        assert_eq!(
            ErrorCode::from_win32(remap_batch_code(0x71)),
            ErrorCode::InvalidParameter
        );
    }

    #[test]
    fn test_translate_unknown() {
        assert_eq!(translate(ErrorCode::Unknown(4242)), "Unknown error 4242");
        assert!(!translate(ErrorCode::GeneralFailure).is_empty());
    }

    #[test]
    fn test_from_io() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(ErrorCode::from_io(&err), ErrorCode::FileNotFound);

        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(ErrorCode::from_io(&err), ErrorCode::AccessDenied);

        let err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(ErrorCode::from_io(&err), ErrorCode::GeneralFailure);
    }

    #[test]
    fn test_native_code_round_trip() {
        for code in [
            ErrorCode::InvalidParameter,
            ErrorCode::AccessDenied,
            ErrorCode::AlreadyExists,
            ErrorCode::DiskFull,
        ] {
            let err = io::Error::from_raw_os_error(code.native_code());
            assert_eq!(ErrorCode::from_io(&err), code);
        }
    }

    #[test]
    fn test_format_system_message() {
        let msg = format_system_message(ErrorCode::FileNotFound.native_code());
        assert!(msg.ends_with(&format!(
            "(0x{:x})",
            ErrorCode::FileNotFound.native_code()
        )));
        assert!(!msg.contains("os error"));
        assert_eq!(format_message(0x1f, ""), "0x1f");
    }
}
