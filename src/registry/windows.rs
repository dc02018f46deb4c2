//! Package registry backed by the WinRT `PackageManager`
//!
//! Enumerates the packages registered for the current user via the
//! `Management.Deployment` namespace:
//!
//! 1. Create a `PackageManager` instance
//! 2. Call `FindPackagesByUserSecurityId("")` (empty SID = current user, no elevation required)
//! 3. Map each package to [`PackageMetadata`]:
//!    - `Package.Id.FamilyName` - stable identifier reported to callers
//!    - `Package.Id.FullName` - lookup key for label resolution
//!    - `Package.SignatureKind` - `System` marks OS-provided packages
//!
//! Framework and resource packages are runtime dependencies shipped with the
//! platform or with other apps, so they are reported as system packages as well.

use super::{PackageMetadata, PackageRegistry};
use crate::error::RegistryError;
use windows::ApplicationModel::{Package, PackageSignatureKind};
use windows::Management::Deployment::PackageManager;
use windows::core::{HRESULT, HSTRING};

/// `E_ACCESSDENIED`
const ACCESS_DENIED: HRESULT = HRESULT(0x8007_0005_u32.cast_signed());

fn platform_error(e: windows::core::Error) -> RegistryError {
    if e.code() == ACCESS_DENIED {
        RegistryError::PermissionDenied(e.message())
    } else {
        RegistryError::Platform(Box::new(e))
    }
}

/// WinRT package registry for the current user
pub struct WinRtPackageRegistry {
    manager: PackageManager,
}

impl WinRtPackageRegistry {
    /// Create a registry bound to a new `PackageManager` instance
    pub fn new() -> Result<Self, RegistryError> {
        let manager = PackageManager::new().map_err(platform_error)?;
        Ok(Self { manager })
    }
}

/// Whether the package ships with Windows or only exists to support other packages
fn is_system_package(package: &Package) -> Result<bool, RegistryError> {
    let signature = package.SignatureKind().map_err(platform_error)?;
    if signature == PackageSignatureKind::System {
        return Ok(true);
    }
    let is_framework = package.IsFramework().map_err(platform_error)?;
    let is_resource = package.IsResourcePackage().map_err(platform_error)?;
    Ok(is_framework || is_resource)
}

fn extract_metadata(package: &Package) -> Result<PackageMetadata, RegistryError> {
    let id = package.Id().map_err(platform_error)?;
    let family_name = id.FamilyName().map_err(platform_error)?.to_string();
    let full_name = id.FullName().map_err(platform_error)?.to_string();

    Ok(PackageMetadata {
        package_name: family_name,
        is_system: is_system_package(package)?,
        lookup_key: Some(full_name),
    })
}

// PackageManager is an agile WinRT object; its methods may be called from any thread.
#[expect(unsafe_code, reason = "PackageManager is marshal-agile")]
unsafe impl Send for WinRtPackageRegistry {}
#[expect(unsafe_code, reason = "PackageManager is marshal-agile")]
unsafe impl Sync for WinRtPackageRegistry {}

impl PackageRegistry for WinRtPackageRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        let packages = self
            .manager
            .FindPackagesByUserSecurityId(&HSTRING::new())
            .map_err(platform_error)?;

        let mut result = Vec::new();
        for package in packages {
            result.push(extract_metadata(&package)?);
        }

        tracing::debug!("WinRT registry reported {} packages", result.len());
        Ok(result)
    }

    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError> {
        // Access denial concerns the whole registry, not this package
        let label_error = |e: windows::core::Error| {
            if e.code() == ACCESS_DENIED {
                return platform_error(e);
            }
            RegistryError::LabelUnresolved {
                package_name: package.package_name.clone(),
                message: e.message(),
            }
        };

        let found = self
            .manager
            .FindPackageByUserSecurityIdPackageFullName(
                &HSTRING::new(),
                &HSTRING::from(package.lookup_key()),
            )
            .map_err(label_error)?;

        Ok(found.DisplayName().map_err(label_error)?.to_string())
    }
}
